//! Mark and sweep over the string and object arenas.
//!
//! The arenas own the payload storage; signatures only hold handles into
//! them. A collection marks everything reachable from the supplied root
//! signatures (plus everything parked in the pool), closes over object
//! edges, then sweeps both arenas.

use crate::{ObjectRef, StrHandle, Visitor};

/// Outcome of one collection cycle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct GcStats {
    pub strings_live: usize,
    pub strings_swept: usize,
    pub objects_live: usize,
    pub objects_swept: usize,
}

/// Visitor accumulating the mark sets for one cycle.
pub(crate) struct Marker {
    strings: Vec<bool>,
    objects: Vec<bool>,
}

impl Marker {
    pub(crate) fn new(string_slots: usize, object_slots: usize) -> Self {
        Self {
            strings: vec![false; string_slots],
            objects: vec![false; object_slots],
        }
    }

    /// Indices of every marked object slot.
    pub(crate) fn marked_objects(&self) -> Vec<usize> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(index, &marked)| marked.then_some(index))
            .collect()
    }

    pub(crate) fn string_marks(&self) -> &[bool] {
        &self.strings
    }

    pub(crate) fn object_marks(&self) -> &[bool] {
        &self.objects
    }
}

impl Visitor for Marker {
    fn visit_string(&mut self, handle: StrHandle) {
        if !handle.is_null() {
            if let Some(mark) = self.strings.get_mut(handle.index()) {
                *mark = true;
            }
        }
    }

    fn visit_object(&mut self, reference: ObjectRef) {
        if !reference.is_null() {
            if let Some(mark) = self.objects.get_mut(reference.index()) {
                *mark = true;
            }
        }
    }
}

#[cfg(test)]
mod gc_tests {
    use crate::{Runtime, RuntimeSettings, Signature};

    fn runtime() -> Runtime {
        Runtime::new(RuntimeSettings::default())
    }

    #[test]
    fn rooted_payloads_survive_collection() {
        let mut rt = runtime();
        let text = rt.strings.intern("alive");
        let obj = rt.objects.box_int(1);

        let mut sig = Signature::new();
        sig.push_str(text);
        sig.push_obj(obj);

        let stats = rt.collect(&[&sig]);
        assert_eq!(stats.strings_live, 1);
        assert_eq!(stats.objects_live, 1);
        assert_eq!(rt.strings.resolve(text), Some("alive"));
        assert!(rt.objects.body(obj).is_some());
    }

    #[test]
    fn unrooted_payloads_are_reclaimed() {
        let mut rt = runtime();
        let text = rt.strings.intern("gone");
        let obj = rt.objects.box_int(1);

        let stats = rt.collect(&[]);
        assert_eq!(stats.strings_swept, 1);
        assert_eq!(stats.objects_swept, 1);
        assert_eq!(rt.strings.resolve(text), None);
        assert!(rt.objects.body(obj).is_none());
    }

    #[test]
    fn named_keys_and_descriptor_are_roots() {
        let mut rt = runtime();
        let key = rt.strings.intern("key");
        let sig_text = rt.strings.intern("I->I");

        let mut sig = Signature::new();
        sig.push_int_named(key, 1);
        sig.set_short_sig(sig_text);

        rt.collect(&[&sig]);
        assert_eq!(rt.strings.resolve(key), Some("key"));
        assert_eq!(rt.strings.resolve(sig_text), Some("I->I"));
    }

    #[test]
    fn boxed_string_keeps_its_string_alive_transitively() {
        let mut rt = runtime();
        let text = rt.strings.intern("held");
        let obj = rt.objects.box_str(text);

        let mut sig = Signature::new();
        sig.push_obj(obj);

        // only the object is a direct edge; the string must survive
        // through it
        rt.collect(&[&sig]);
        assert_eq!(rt.strings.resolve(text), Some("held"));
    }

    #[test]
    fn parked_signatures_are_traced() {
        let mut rt = runtime();
        let text = rt.strings.intern("parked");

        // a populated signature dropped into the pool without reset would
        // lose its contents; park it unreset via the raw guard to model a
        // signature between call completion and recycling
        let mut sig = Signature::new();
        sig.push_str(text);
        rt.pool.parked().push(sig);

        rt.collect(&[]);
        assert_eq!(rt.strings.resolve(text), Some("parked"));
    }

    #[test]
    fn freed_signature_releases_its_payloads() {
        let mut rt = runtime();
        let text = rt.strings.intern("released");

        let mut sig = Signature::new();
        sig.push_str(text);
        rt.collect(&[&sig]);
        assert_eq!(rt.strings.resolve(text), Some("released"));

        drop(sig);
        let stats = rt.collect(&[]);
        assert_eq!(stats.strings_swept, 1);
        assert_eq!(rt.strings.resolve(text), None);
    }
}

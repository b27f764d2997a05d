//! Liveness reporting between call structures and the collector.
//!
//! The signature's own storage is plain Rust ownership; only string and
//! object handles live in collector-managed arenas. `Visitable` is the
//! explicit hook the collector calls to learn about those external
//! references while a structure is reachable from a call frame or parked
//! in the pool.

use crate::{Cell, ObjectRef, Signature, StrHandle};

pub trait Visitor: Sized {
    fn visit_string(&mut self, handle: StrHandle) {
        let _ = handle;
    }
    fn visit_object(&mut self, reference: ObjectRef) {
        let _ = reference;
    }
}

pub trait Visitable {
    fn visit_edges(&self, visitor: &mut impl Visitor);
}

impl Visitable for Cell {
    #[inline]
    fn visit_edges(&self, visitor: &mut impl Visitor) {
        match *self {
            Cell::Str(handle) => {
                if !handle.is_null() {
                    visitor.visit_string(handle);
                }
            }
            Cell::Obj(reference) => {
                if !reference.is_null() {
                    visitor.visit_object(reference);
                }
            }
            // unboxed kinds carry no external references
            Cell::Int(_) | Cell::Float(_) => {}
        }
    }
}

impl Visitable for Signature {
    fn visit_edges(&self, visitor: &mut impl Visitor) {
        for cell in self.positional_cells() {
            cell.visit_edges(visitor);
        }
        for (key, cell) in self.named_entries() {
            visitor.visit_string(key);
            cell.visit_edges(visitor);
        }
        if !self.short_sig().is_null() {
            visitor.visit_string(self.short_sig());
        }
    }
}

#[cfg(test)]
mod visitor_tests {
    use super::*;
    use crate::Strings;

    #[derive(Default)]
    struct Recorder {
        strings: Vec<StrHandle>,
        objects: Vec<ObjectRef>,
    }

    impl Visitor for Recorder {
        fn visit_string(&mut self, handle: StrHandle) {
            self.strings.push(handle);
        }
        fn visit_object(&mut self, reference: ObjectRef) {
            self.objects.push(reference);
        }
    }

    #[test]
    fn unboxed_cells_report_no_edges() {
        let mut recorder = Recorder::default();
        Cell::Int(5).visit_edges(&mut recorder);
        Cell::Float(5.0).visit_edges(&mut recorder);
        Cell::Str(StrHandle::NULL).visit_edges(&mut recorder);
        Cell::Obj(ObjectRef::NULL).visit_edges(&mut recorder);
        assert!(recorder.strings.is_empty());
        assert!(recorder.objects.is_empty());
    }

    #[test]
    fn signature_reports_positionals_named_keys_and_descriptor() {
        let mut strings = Strings::new();
        let text = strings.intern("value");
        let key = strings.intern("key");
        let sig_text = strings.intern("IS->I");

        let mut sig = Signature::new();
        sig.push_int(1);
        sig.push_str(text);
        sig.push_int_named(key, 2);
        sig.set_short_sig(sig_text);

        let mut recorder = Recorder::default();
        sig.visit_edges(&mut recorder);
        assert!(recorder.strings.contains(&text));
        assert!(recorder.strings.contains(&key));
        assert!(recorder.strings.contains(&sig_text));
        assert!(recorder.objects.is_empty());
    }
}

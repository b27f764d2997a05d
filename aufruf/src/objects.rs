//! Object-reference arena: the polymorphic side of the coercion matrix.
//!
//! Only the surface the marshalling core needs exists here — boxing a
//! primitive into a fresh object and asking an object for its primitive
//! views. Method dispatch, slots and inheritance live elsewhere.

use crate::{StrHandle, Strings, Visitor};

/// Non-owning handle to an object in the [`Objects`] arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef(u32);

impl ObjectRef {
    pub const NULL: ObjectRef = ObjectRef(u32::MAX);

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(!self.is_null(), "null reference has no slot");
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "object arena slot overflow");
        Self(index as u32)
    }
}

/// Payload of an autoboxed object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ObjectBody {
    BoxedInt(i64),
    BoxedFloat(f64),
    BoxedStr(StrHandle),
}

pub struct Objects {
    entries: Vec<Option<ObjectBody>>,
    free: Vec<u32>,
}

impl Objects {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    // ── Boxing ────────────────────────────────────────────────────────

    pub fn box_int(&mut self, value: i64) -> ObjectRef {
        self.alloc(ObjectBody::BoxedInt(value))
    }

    pub fn box_float(&mut self, value: f64) -> ObjectRef {
        self.alloc(ObjectBody::BoxedFloat(value))
    }

    pub fn box_str(&mut self, value: StrHandle) -> ObjectRef {
        self.alloc(ObjectBody::BoxedStr(value))
    }

    fn alloc(&mut self, body: ObjectBody) -> ObjectRef {
        match self.free.pop() {
            Some(slot) => {
                self.entries[slot as usize] = Some(body);
                ObjectRef(slot)
            }
            None => {
                let reference = ObjectRef::from_index(self.entries.len());
                self.entries.push(Some(body));
                reference
            }
        }
    }

    pub fn body(&self, reference: ObjectRef) -> Option<&ObjectBody> {
        if reference.is_null() {
            return None;
        }
        self.entries
            .get(reference.index())
            .and_then(|slot| slot.as_ref())
    }

    pub fn live_count(&self) -> usize {
        self.entries.len() - self.free.len()
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.entries.len()
    }

    // ── Primitive views ───────────────────────────────────────────────
    //
    // A null or reclaimed reference has no primitive views; that is this
    // subsystem's runtime error, not a defaulted read.

    pub fn get_int(&self, strings: &Strings, reference: ObjectRef) -> i64 {
        match self.live_body(reference) {
            ObjectBody::BoxedInt(value) => *value,
            ObjectBody::BoxedFloat(value) => *value as i64,
            ObjectBody::BoxedStr(handle) => strings.to_int(*handle),
        }
    }

    pub fn get_float(&self, strings: &Strings, reference: ObjectRef) -> f64 {
        match self.live_body(reference) {
            ObjectBody::BoxedInt(value) => *value as f64,
            ObjectBody::BoxedFloat(value) => *value,
            ObjectBody::BoxedStr(handle) => strings.to_float(*handle),
        }
    }

    pub fn get_string(&self, strings: &mut Strings, reference: ObjectRef) -> StrHandle {
        match self.live_body(reference) {
            ObjectBody::BoxedInt(value) => strings.from_int(*value),
            ObjectBody::BoxedFloat(value) => strings.from_float(*value),
            ObjectBody::BoxedStr(handle) => *handle,
        }
    }

    fn live_body(&self, reference: ObjectRef) -> &ObjectBody {
        match self.body(reference) {
            Some(body) => body,
            None => panic!("primitive value requested from a null object reference"),
        }
    }

    // ── Collector interface ───────────────────────────────────────────

    /// Report the outgoing edges of one live slot.
    pub(crate) fn visit_slot_edges(&self, index: usize, visitor: &mut impl Visitor) {
        if let Some(Some(ObjectBody::BoxedStr(handle))) = self.entries.get(index) {
            if !handle.is_null() {
                visitor.visit_string(*handle);
            }
        }
    }

    /// Drop every slot not set in `live`. Returns `(live, swept)` counts.
    pub(crate) fn sweep(&mut self, live: &[bool]) -> (usize, usize) {
        let mut swept = 0;
        for (index, slot) in self.entries.iter_mut().enumerate() {
            if live.get(index).copied().unwrap_or(false) {
                continue;
            }
            if slot.take().is_some() {
                self.free.push(index as u32);
                swept += 1;
            }
        }
        (self.live_count(), swept)
    }
}

impl Default for Objects {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod object_tests {
    use super::*;

    #[test]
    fn boxed_primitives_report_their_views() {
        let mut strings = Strings::new();
        let mut objects = Objects::new();

        let i = objects.box_int(42);
        assert_eq!(objects.get_int(&strings, i), 42);
        assert_eq!(objects.get_float(&strings, i), 42.0);
        let s = objects.get_string(&mut strings, i);
        assert_eq!(strings.resolve(s), Some("42"));

        let f = objects.box_float(-1.5);
        assert_eq!(objects.get_int(&strings, f), -1);
        assert_eq!(objects.get_float(&strings, f), -1.5);

        let text = strings.intern("3.5kg");
        let o = objects.box_str(text);
        assert_eq!(objects.get_int(&strings, o), 3);
        assert_eq!(objects.get_float(&strings, o), 3.5);
        assert_eq!(objects.get_string(&mut strings, o), text);
    }

    #[test]
    #[should_panic(expected = "null object reference")]
    fn null_reference_has_no_integer_view() {
        let strings = Strings::new();
        let objects = Objects::new();
        objects.get_int(&strings, ObjectRef::NULL);
    }

    #[test]
    fn sweep_reclaims_and_reuses_slots() {
        let mut objects = Objects::new();
        let keep = objects.box_int(1);
        let drop = objects.box_int(2);

        let mut live = vec![false; objects.slot_count()];
        live[keep.index()] = true;
        let (live_count, swept) = objects.sweep(&live);
        assert_eq!((live_count, swept), (1, 1));
        assert!(objects.body(drop).is_none());
        assert_eq!(objects.body(keep), Some(&ObjectBody::BoxedInt(1)));

        let reused = objects.box_int(3);
        assert_eq!(reused.index(), drop.index());
    }
}

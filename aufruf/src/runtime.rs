//! The runtime aggregate: both payload arenas, the signature pool, and
//! the collection entry point.

use log::debug;

use crate::{GcStats, Objects, Signature, SignaturePool, Strings, Visitable, gc::Marker};

/// Sizing knobs for a [`Runtime`].
#[derive(Debug, Copy, Clone)]
pub struct RuntimeSettings {
    /// Initial slot capacity of the string arena.
    pub string_capacity: usize,
    /// Initial slot capacity of the object arena.
    pub object_capacity: usize,
    /// Maximum number of signatures parked for reuse.
    pub pool_limit: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            string_capacity: 256,
            object_capacity: 256,
            pool_limit: 32,
        }
    }
}

impl RuntimeSettings {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.string_capacity == 0 || self.object_capacity == 0 {
            return Err("arena capacities must be > 0");
        }
        Ok(())
    }
}

pub struct Runtime {
    pub strings: Strings,
    pub objects: Objects,
    pub pool: SignaturePool,
    collections: usize,
}

impl Runtime {
    pub fn new(settings: RuntimeSettings) -> Self {
        match Self::try_new(settings) {
            Ok(runtime) => runtime,
            Err(reason) => panic!("invalid runtime settings: {reason}"),
        }
    }

    pub fn try_new(settings: RuntimeSettings) -> Result<Self, &'static str> {
        settings.validate()?;
        Ok(Self {
            strings: Strings::with_capacity(settings.string_capacity),
            objects: Objects::with_capacity(settings.object_capacity),
            pool: SignaturePool::new(settings.pool_limit),
            collections: 0,
        })
    }

    /// Number of completed collection cycles.
    pub fn collections(&self) -> usize {
        self.collections
    }

    /// One mark-and-sweep cycle.
    ///
    /// `roots` are the signatures reachable from active call frames;
    /// everything parked in the pool is traced as well. Payload slots
    /// unreachable from either are reclaimed.
    pub fn collect(&mut self, roots: &[&Signature]) -> GcStats {
        let mut marker = Marker::new(self.strings.slot_count(), self.objects.slot_count());

        for signature in roots {
            signature.visit_edges(&mut marker);
        }
        {
            let parked = self.pool.parked();
            for signature in parked.iter() {
                signature.visit_edges(&mut marker);
            }
        }

        // close over object edges: a boxed string keeps its string alive
        for index in marker.marked_objects() {
            self.objects.visit_slot_edges(index, &mut marker);
        }

        let (strings_live, strings_swept) = self.strings.sweep(marker.string_marks());
        let (objects_live, objects_swept) = self.objects.sweep(marker.object_marks());

        self.collections += 1;
        let stats = GcStats {
            strings_live,
            strings_swept,
            objects_live,
            objects_swept,
        };
        debug!(
            "collection {}: strings {}/{} live, objects {}/{} live",
            self.collections,
            stats.strings_live,
            stats.strings_live + stats.strings_swept,
            stats.objects_live,
            stats.objects_live + stats.objects_swept,
        );
        stats
    }
}

#[cfg(test)]
mod runtime_tests {
    use super::*;

    #[test]
    fn default_settings_validate() {
        assert!(RuntimeSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let settings = RuntimeSettings {
            string_capacity: 0,
            ..Default::default()
        };
        assert!(Runtime::try_new(settings).is_err());
    }

    #[test]
    fn collections_are_counted() {
        let mut rt = Runtime::new(RuntimeSettings::default());
        rt.collect(&[]);
        rt.collect(&[]);
        assert_eq!(rt.collections(), 2);
    }
}

//! # Area set module
//!
//! This module defines the vehicle-side representation of controller areas
//! and the registry which owns them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::info;
use nalgebra::Point2;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

// Internal
use comms_if::area::AreaData;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A labelled polygonal region with behavioural effect parameters.
///
/// An area's fields are never mutated after construction, replacing an area
/// means building a new one from fresh wire data. Per-area evaluation state
/// (such as whether the vehicle is currently inside the effect) deliberately
/// lives in the evaluator rather than here, so a registry update cannot race
/// with the hysteresis bookkeeping.
#[derive(Debug, Clone)]
pub struct Area {
    /// Unique identifier within the registry
    pub id: String,

    /// Display label
    pub label: String,

    /// Display-only kind tag
    pub kind: String,

    /// Boundary ring in (lon, lat) map coordinates, implicitly closed
    pub boundary: Vec<Point2<f64>>,

    /// Flips the inside/outside sense of the area's effect
    pub reversed: bool,

    /// Bound on how far the gear may be throttled while affected
    pub slowing_factor: u32,

    /// If set the operator's inputs are disabled while affected
    pub disables_inputs: bool,
}

/// Shared registry of all areas currently pushed by the controller.
///
/// Handles are cheaply cloneable, the inbound event thread holds one while
/// the control loop holds another. Readers take point-in-time snapshots and
/// never observe a partially-updated area.
#[derive(Debug, Clone, Default)]
pub struct AreaRegistry {
    inner: Arc<Mutex<HashMap<String, Arc<Area>>>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Area {
    /// Build an area from its wire form.
    ///
    /// Degenerate boundaries are accepted here and skipped with an error at
    /// evaluation time instead, keeping the area available for a corrected
    /// update to replace.
    pub fn from_data(data: AreaData) -> Self {
        Self {
            id: data.id,
            label: data.label,
            kind: data.kind,
            boundary: data
                .boundary
                .iter()
                .map(|p| Point2::new(p[0], p[1]))
                .collect(),
            reversed: data.props.reversed,
            slowing_factor: data.props.slowing_factor,
            disables_inputs: data.props.disables_inputs,
        }
    }
}

impl From<AreaData> for Area {
    fn from(data: AreaData) -> Self {
        Area::from_data(data)
    }
}

impl AreaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an area, fully replacing any existing area with the same id.
    pub fn upsert(&self, area: Area) {
        let mut map = self.lock();

        match map.insert(area.id.clone(), Arc::new(area)) {
            Some(old) => info!("Override old area: {}", old.id),
            None => (),
        }
    }

    /// Insert a batch of areas, each replacing as for `upsert`.
    pub fn upsert_many(&self, areas: Vec<Area>) {
        let mut map = self.lock();

        for area in areas {
            match map.insert(area.id.clone(), Arc::new(area)) {
                Some(old) => info!("Override old area: {}", old.id),
                None => (),
            }
        }
    }

    /// Remove the area with the given id. Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) {
        let mut map = self.lock();

        match map.remove(id) {
            Some(area) => info!("Remove area: {} and label: {}", area.id, area.label),
            None => (),
        }
    }

    /// Return a point-in-time copy of the area set, safe to iterate while
    /// concurrent upserts and removes occur elsewhere.
    pub fn snapshot(&self) -> Vec<Arc<Area>> {
        self.lock().values().cloned().collect()
    }

    /// Number of areas currently in the registry.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Acquire the inner lock, recovering it if a writer panicked while
    /// holding it. Area values are immutable behind `Arc` so a poisoned lock
    /// cannot expose a half-updated area.
    fn lock(&self) -> MutexGuard<HashMap<String, Arc<Area>>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::area::AreaProps;

    fn square_data(id: &str, size: f64, slowing_factor: u32) -> AreaData {
        AreaData {
            id: String::from(id),
            label: format!("area_{}", id),
            kind: String::new(),
            boundary: vec![[0.0, 0.0], [0.0, size], [size, size], [size, 0.0]],
            props: AreaProps {
                reversed: false,
                slowing_factor,
                disables_inputs: false,
            },
        }
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let registry = AreaRegistry::new();

        registry.upsert(Area::from_data(square_data("1", 5.0, 3)));
        registry.upsert(Area::from_data(square_data("1", 20.0, 1)));

        assert_eq!(registry.len(), 1);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot[0].slowing_factor, 1);
        assert_eq!(snapshot[0].boundary[2], Point2::new(20.0, 20.0));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let registry = AreaRegistry::new();
        registry.upsert(Area::from_data(square_data("1", 5.0, 0)));

        registry.remove("not_an_id");
        assert_eq!(registry.len(), 1);

        registry.remove("1");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_during_concurrent_upserts() {
        let registry = AreaRegistry::new();
        let writer_handle = registry.clone();

        let writer = std::thread::spawn(move || {
            for i in 0..500 {
                writer_handle.upsert(Area::from_data(square_data(
                    &format!("{}", i % 7),
                    5.0,
                    i,
                )));
            }
        });

        // Every snapshot must contain fully-built areas only
        for _ in 0..100 {
            for area in registry.snapshot() {
                assert_eq!(area.boundary.len(), 4);
                assert_eq!(area.label, format!("area_{}", area.id));
            }
        }

        writer.join().unwrap();
    }
}

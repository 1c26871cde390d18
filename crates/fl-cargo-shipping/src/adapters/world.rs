//! In-memory game world.
//!
//! Implements `ObjectLifecycle` over a map of object ids. Used by tests and
//! by hosts that track shipped goods outside a real world simulation.

use crate::domain::{ItemRef, LocalKind, Location, WorldError};
use crate::ports::outbound::ObjectLifecycle;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Clone, Debug)]
struct WorldObject {
    kind: LocalKind,
    location: Location,
}

/// World objects held in memory.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    objects: RwLock<HashMap<u64, WorldObject>>,
    refused: RwLock<HashSet<LocalKind>>,
    next_id: AtomicU64,
}

impl InMemoryWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new object at the world origin.
    pub fn spawn(&self, kind: impl Into<LocalKind>) -> ItemRef {
        self.spawn_at(kind, Location::default())
    }

    /// Place a new object at `location`.
    pub fn spawn_at(&self, kind: impl Into<LocalKind>, location: Location) -> ItemRef {
        let kind = kind.into();
        let object_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.objects.write().insert(
            object_id,
            WorldObject {
                kind: kind.clone(),
                location,
            },
        );
        ItemRef { object_id, kind }
    }

    /// Make `construct` fail for `kind`.
    pub fn refuse(&self, kind: impl Into<LocalKind>) {
        self.refused.write().insert(kind.into());
    }

    /// Whether the object exists.
    pub fn contains(&self, object_id: u64) -> bool {
        self.objects.read().contains_key(&object_id)
    }

    /// Current location of an object.
    pub fn location_of(&self, object_id: u64) -> Option<Location> {
        self.objects.read().get(&object_id).map(|o| o.location)
    }

    /// Number of objects of `kind`.
    pub fn count_of(&self, kind: &str) -> usize {
        self.objects
            .read()
            .values()
            .filter(|o| o.kind.as_str() == kind)
            .count()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the world is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl ObjectLifecycle for InMemoryWorld {
    fn destroy(&self, item: &ItemRef) {
        if self.objects.write().remove(&item.object_id).is_none() {
            debug!(object_id = item.object_id, "Destroy of missing object ignored");
        }
    }

    fn relocate(&self, item: &ItemRef, location: Location) {
        match self.objects.write().get_mut(&item.object_id) {
            Some(object) => object.location = location,
            None => debug!(object_id = item.object_id, "Relocate of missing object ignored"),
        }
    }

    fn construct(&self, kind: &LocalKind, location: Location) -> Result<ItemRef, WorldError> {
        if self.refused.read().contains(kind) {
            return Err(WorldError::UnknownKind(kind.clone()));
        }
        Ok(self.spawn_at(kind.clone(), location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_destroy() {
        let world = InMemoryWorld::new();
        let item = world.spawn("iron_ore");
        assert!(world.contains(item.object_id));
        world.destroy(&item);
        assert!(!world.contains(item.object_id));
        // Idempotent
        world.destroy(&item);
        assert!(world.is_empty());
    }

    #[test]
    fn test_relocate() {
        let world = InMemoryWorld::new();
        let item = world.spawn("iron_ore");
        let target = Location::new(1.0, 2.0, 3.0);
        world.relocate(&item, target);
        assert_eq!(world.location_of(item.object_id), Some(target));
    }

    #[test]
    fn test_construct_refused_kind() {
        let world = InMemoryWorld::new();
        world.refuse("oak_log");
        let result = world.construct(&LocalKind::new("oak_log"), Location::default());
        assert!(matches!(result, Err(WorldError::UnknownKind(_))));
        assert!(world
            .construct(&LocalKind::new("iron_ore"), Location::default())
            .is_ok());
        assert_eq!(world.count_of("iron_ore"), 1);
    }
}

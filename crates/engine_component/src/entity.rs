//! Entity type and allocation utilities.
//!
//! An [`Entity`] is a lightweight `u64` identifier with no inherent data.
//! Components are attached under it; once they are all detached the
//! identifier is released back to the [`EntityAllocator`].

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// A unique entity identifier.
///
/// Entities are pure identifiers and carry no data of their own. Components
/// are attached to entities to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// The null / invalid entity sentinel.
    pub const INVALID: Entity = Entity(0);

    /// Create an entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates entity IDs and recycles released ones.
///
/// Fresh IDs increase monotonically from 1 (0 is reserved for
/// [`Entity::INVALID`]). Released IDs are handed out again in the order they
/// were released, before any fresh ID.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
    free: VecDeque<Entity>,
    alive: HashSet<Entity>,
}

impl EntityAllocator {
    /// Creates a new allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            free: VecDeque::new(),
            alive: HashSet::new(),
        }
    }

    /// Allocates an entity ID, reusing a released one if available.
    pub fn allocate(&mut self) -> Entity {
        let entity = self.free.pop_front().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            Entity(id)
        });
        self.alive.insert(entity);
        entity
    }

    /// Releases `entity` for reuse.
    ///
    /// Returns `false` if the entity was not alive.
    pub fn release(&mut self, entity: Entity) -> bool {
        if !self.alive.remove(&entity) {
            return false;
        }
        self.free.push_back(entity);
        true
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.contains(&entity)
    }

    /// Returns the number of entities currently alive.
    #[must_use]
    pub fn count(&self) -> usize {
        self.alive.len()
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let e = Entity::from_raw(42);
        assert_eq!(e.id(), 42);
        assert!(e.is_valid());
    }

    #[test]
    fn test_entity_invalid() {
        assert!(!Entity::INVALID.is_valid());
        assert_eq!(Entity::INVALID.id(), 0);
    }

    #[test]
    fn test_allocator_produces_unique_ids() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        let e3 = alloc.allocate();
        assert_eq!(e1.id(), 1);
        assert_eq!(e2.id(), 2);
        assert_eq!(e3.id(), 3);
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn test_released_ids_are_reused_in_order() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        assert!(alloc.release(e2));
        assert!(alloc.release(e1));
        assert_eq!(alloc.count(), 0);

        assert_eq!(alloc.allocate(), e2);
        assert_eq!(alloc.allocate(), e1);
        assert_eq!(alloc.allocate().id(), 3);
    }

    #[test]
    fn test_release_unknown_entity() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(alloc.release(e));
        assert!(!alloc.release(e));
        assert!(!alloc.release(Entity::from_raw(99)));
    }

    #[test]
    fn test_entity_serialization_roundtrip() {
        let entity = Entity::from_raw(999);
        let json = serde_json::to_string(&entity).unwrap();
        let restored: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(entity, restored);
    }
}

//! Entity storage on top of hecs
//!
//! hecs provides the generational handles; every live row holds exactly one
//! [`Entity`] record which in turn owns that entity's components.

use super::entity::{Entity, EntityId};

/// Storage for all entities of a scene
pub struct World {
    /// The underlying hecs world
    inner: hecs::World,
}

impl World {
    /// Create a new empty world
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an empty entity with the given name
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        let id = self.inner.reserve_entity();
        self.inner.spawn_at(id, (Entity::new(id, name),));
        id
    }

    /// Despawn an entity, dropping all of its components.
    ///
    /// Returns false if the handle was stale.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.inner.despawn(id).is_ok()
    }

    /// Get an entity
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<hecs::Ref<'_, Entity>> {
        self.inner.get::<&Entity>(id).ok()
    }

    /// Get an entity mutably
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.inner.query_one_mut::<&mut Entity>(id).ok()
    }

    /// Check if an entity exists
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.inner.contains(id)
    }

    /// Get the number of entities
    #[must_use]
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all entities from the world
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_get() {
        let mut world = World::new();
        let id = world.spawn("Camera");

        let entity = world.get(id).unwrap();
        assert_eq!(entity.name(), "Camera");
        assert_eq!(entity.id(), id);
        drop(entity);

        assert_eq!(world.len(), 1);
        assert!(world.contains(id));
    }

    #[test]
    fn test_stale_handle() {
        let mut world = World::new();
        let id = world.spawn("Temp");

        assert!(world.despawn(id));
        assert!(!world.despawn(id));
        assert!(world.get(id).is_none());
        assert!(world.get_mut(id).is_none());

        // The slot may be reused, but the old handle must not see the new entity
        let reused = world.spawn("Other");
        assert_ne!(reused, id);
        assert!(world.get(id).is_none());
        assert!(!world.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut world = World::new();
        world.spawn("A");
        world.spawn("B");

        world.clear();
        assert!(world.is_empty());
    }
}

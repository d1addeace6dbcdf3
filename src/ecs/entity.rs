//! Entities and their owned components

use std::any::TypeId;

use smallvec::SmallVec;

use super::component::{Component, ComponentError, ComponentType};
use crate::core::debug::{DebugHooks, DebugInspector};

/// Generation-checked entity handle.
///
/// A handle to a destroyed entity never resolves to a different entity.
pub type EntityId = hecs::Entity;

/// Errors raised by entity operations.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// The entity already owns a component of this type.
    #[error("entity '{entity}' already has a '{component}' component")]
    AlreadyAttached {
        /// Entity name
        entity: String,
        /// Component type name
        component: &'static str,
    },

    /// The component was created for a different entity.
    #[error("component '{component}' belongs to another entity than '{entity}'")]
    ForeignComponent {
        /// Entity name
        entity: String,
        /// Component type name
        component: &'static str,
    },

    /// A freshly created component failed its type check.
    #[error(transparent)]
    Component(#[from] ComponentError),
}

/// A component together with its lifecycle state.
struct ComponentSlot {
    type_id: TypeId,
    component: Box<dyn Component>,
    initialized: bool,
    /// Disabled components are skipped by updates
    enabled: bool,
}

/// A named identity owning at most one component of each concrete type.
///
/// Components are kept in attachment order, which is also the order they
/// are initialized, updated and saved in.
pub struct Entity {
    /// Handle of this entity
    id: EntityId,
    /// Unique name inside the scene
    name: String,
    /// Disabled entities are skipped by scene updates
    enabled: bool,
    /// User tags
    tags: SmallVec<[String; 4]>,
    /// Owned components
    components: Vec<ComponentSlot>,
}

impl Entity {
    /// Create an empty entity.
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            tags: SmallVec::new(),
            components: Vec::new(),
        }
    }

    /// Get the entity handle
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Get the entity name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the entity is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the entity
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    // -------------------------------------------------------------------------
    // Tags
    // -------------------------------------------------------------------------

    /// Get all tags
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Check for a tag
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag.
    ///
    /// Returns false if the entity already had it.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            log::warn!(
                "Tag {tag} not added to entity {} because the entity already has this tag",
                self.name
            );
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove a tag.
    ///
    /// Returns true if the tag was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
            true
        } else {
            false
        }
    }

    // -------------------------------------------------------------------------
    // Components
    // -------------------------------------------------------------------------

    /// Create and attach a default component of type `T`.
    ///
    /// The component is not initialized; attach through the scene to run
    /// [`Component::init`].
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::AlreadyAttached`] if a `T` is already present
    pub fn create_component<T: ComponentType>(&mut self) -> Result<&mut T, EntityError> {
        let component = self.attach(Box::new(T::new(self.id)))?;
        Ok(component.expect_type_mut::<T>()?)
    }

    /// Attach an already constructed component.
    ///
    /// # Errors
    ///
    /// Returns an error if a component of the same concrete type is already
    /// attached, or if the component was constructed for another entity
    pub fn attach(
        &mut self,
        component: Box<dyn Component>,
    ) -> Result<&mut dyn Component, EntityError> {
        let type_name = component.type_name();

        if component.owner() != self.id {
            return Err(EntityError::ForeignComponent {
                entity: self.name.clone(),
                component: type_name,
            });
        }

        let type_id = component.as_ref().as_any().type_id();
        if self.components.iter().any(|slot| slot.type_id == type_id) {
            return Err(EntityError::AlreadyAttached {
                entity: self.name.clone(),
                component: type_name,
            });
        }

        log::debug!("Attached {type_name} to entity {}", self.name);
        let index = self.components.len();
        self.components.push(ComponentSlot {
            type_id,
            component,
            initialized: false,
            enabled: true,
        });

        Ok(self.components[index].component.as_mut())
    }

    /// Get a component by type.
    ///
    /// Returns `None` if no `T` is attached; never constructs one.
    #[must_use]
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        let type_id = TypeId::of::<T>();
        self.components
            .iter()
            .find(|slot| slot.type_id == type_id)
            .and_then(|slot| slot.component.as_ref().downcast_ref::<T>())
    }

    /// Get a component by type mutably.
    #[must_use]
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        let type_id = TypeId::of::<T>();
        self.components
            .iter_mut()
            .find(|slot| slot.type_id == type_id)
            .and_then(|slot| slot.component.as_mut().downcast_mut::<T>())
    }

    /// Check if a component of type `T` is attached
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.components.iter().any(|slot| slot.type_id == type_id)
    }

    /// Get a component by its type name
    #[must_use]
    pub fn component_by_name(&self, type_name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .map(|slot| slot.component.as_ref())
            .find(|c| c.type_name() == type_name)
    }

    /// Get a component by its type name mutably
    #[must_use]
    pub fn component_by_name_mut(&mut self, type_name: &str) -> Option<&mut dyn Component> {
        self.components
            .iter_mut()
            .map(|slot| slot.component.as_mut())
            .find(|c| c.type_name() == type_name)
    }

    /// Check if the component of type `T` is enabled.
    ///
    /// Returns `None` if no `T` is attached.
    #[must_use]
    pub fn is_component_enabled<T: Component>(&self) -> Option<bool> {
        let type_id = TypeId::of::<T>();
        self.components
            .iter()
            .find(|slot| slot.type_id == type_id)
            .map(|slot| slot.enabled)
    }

    /// Enable or disable the component of type `T`.
    ///
    /// Returns false if no `T` is attached.
    pub fn set_component_enabled<T: Component>(&mut self, enabled: bool) -> bool {
        let type_id = TypeId::of::<T>();
        match self.components.iter_mut().find(|slot| slot.type_id == type_id) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Iterate over enabled components in attachment order
    pub fn enabled_components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components
            .iter()
            .filter(|slot| slot.enabled)
            .map(|slot| slot.component.as_ref())
    }

    /// Iterate over components in attachment order
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|slot| slot.component.as_ref())
    }

    /// Get the number of attached components
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Run `init` on every component that has not been initialized yet.
    ///
    /// Hooks are registered only when an inspector is given. A component
    /// whose `init` fails is detached and its inspector fields are removed;
    /// components initialized before it stay initialized.
    pub(crate) fn initialize(
        &mut self,
        mut inspector: Option<&mut DebugInspector>,
    ) -> Result<(), (&'static str, ComponentError)> {
        let mut index = 0;
        while index < self.components.len() {
            let slot = &mut self.components[index];
            if slot.initialized {
                index += 1;
                continue;
            }

            let type_name = slot.component.type_name();
            let mut hooks =
                DebugHooks::new(inspector.as_deref_mut(), self.id, &self.name, type_name);
            match slot.component.init(&mut hooks) {
                Ok(()) => {
                    slot.initialized = true;
                    index += 1;
                }
                Err(e) => {
                    self.components.remove(index);
                    if let Some(inspector) = inspector.as_deref_mut() {
                        inspector.remove_component(self.id, type_name);
                    }
                    log::warn!("Detached {type_name} from entity {} after init failed: {e}", self.name);
                    return Err((type_name, e));
                }
            }
        }
        Ok(())
    }

    /// Check if every component has been initialized
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.components.iter().all(|slot| slot.initialized)
    }

    pub(crate) fn update(&mut self, delta_time: f32, total_time: f32) {
        for slot in self.components.iter_mut().filter(|slot| slot.enabled) {
            slot.component.update(delta_time, total_time);
        }
    }

    pub(crate) fn late_update(&mut self, delta_time: f32, total_time: f32) {
        for slot in self.components.iter_mut().filter(|slot| slot.enabled) {
            slot.component.late_update(delta_time, total_time);
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("tags", &self.tags)
            .field(
                "components",
                &self.components().map(|c| c.type_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{MeshRenderComponent, Transform};
    use glam::Vec3;

    fn spawn_entity(name: &str) -> (hecs::World, Entity) {
        let mut world = hecs::World::new();
        let id = world.spawn(());
        (world, Entity::new(id, name))
    }

    #[test]
    fn test_create_and_get_component() {
        let (_world, mut entity) = spawn_entity("Player");

        let transform = entity.create_component::<Transform>().unwrap();
        transform.set_position(Vec3::new(1.0, 2.0, 3.0));

        let transform = entity.get_component::<Transform>().unwrap();
        assert_eq!(transform.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.owner(), entity.id());
        assert!(entity.has_component::<Transform>());
    }

    #[test]
    fn test_second_component_of_same_type_rejected() {
        let (_world, mut entity) = spawn_entity("Player");

        entity.create_component::<Transform>().unwrap();
        let err = entity.create_component::<Transform>().unwrap_err();

        assert!(matches!(
            err,
            EntityError::AlreadyAttached {
                component: "Transform",
                ..
            }
        ));
        assert_eq!(entity.component_count(), 1);
    }

    #[test]
    fn test_absent_component_is_none() {
        let (_world, mut entity) = spawn_entity("Empty");
        entity.create_component::<Transform>().unwrap();

        assert!(entity.get_component::<MeshRenderComponent>().is_none());
        assert!(entity.get_component_mut::<MeshRenderComponent>().is_none());
        assert!(entity.component_by_name("MeshRenderComponent").is_none());
        // Lookup never creates on demand
        assert_eq!(entity.component_count(), 1);
    }

    #[test]
    fn test_foreign_component_rejected() {
        let mut world = hecs::World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let mut entity = Entity::new(a, "A");

        let err = entity.attach(Box::new(Transform::new(b))).unwrap_err();
        assert!(matches!(err, EntityError::ForeignComponent { .. }));
    }

    #[test]
    fn test_component_order_and_lookup_by_name() {
        let (_world, mut entity) = spawn_entity("Cube");
        entity.create_component::<MeshRenderComponent>().unwrap();
        entity.create_component::<Transform>().unwrap();

        let names: Vec<_> = entity.components().map(|c| c.type_name()).collect();
        assert_eq!(names, ["MeshRenderComponent", "Transform"]);

        let by_name = entity.component_by_name("Transform").unwrap();
        assert!(by_name.is::<Transform>());
    }

    #[test]
    fn test_initialize_runs_once() {
        let (_world, mut entity) = spawn_entity("Cube");
        let mut inspector = DebugInspector::new();

        entity.create_component::<Transform>().unwrap();
        assert!(!entity.is_initialized());

        entity.initialize(Some(&mut inspector)).unwrap();
        assert!(entity.is_initialized());
        let registered = inspector.len();
        assert_eq!(registered, 3);

        // A second pass must not re-register anything
        entity.initialize(Some(&mut inspector)).unwrap();
        assert_eq!(inspector.len(), registered);
    }

    #[test]
    fn test_component_enabled_flag() {
        let (_world, mut entity) = spawn_entity("Cube");
        entity.create_component::<Transform>().unwrap();
        entity.create_component::<MeshRenderComponent>().unwrap();

        assert_eq!(entity.is_component_enabled::<MeshRenderComponent>(), Some(true));
        assert!(entity.set_component_enabled::<MeshRenderComponent>(false));
        assert_eq!(entity.is_component_enabled::<MeshRenderComponent>(), Some(false));

        let enabled: Vec<_> = entity.enabled_components().map(|c| c.type_name()).collect();
        assert_eq!(enabled, ["Transform"]);
        // Disabled components are still attached and reachable
        assert!(entity.get_component::<MeshRenderComponent>().is_some());
    }

    #[test]
    fn test_component_enabled_flag_absent() {
        let (_world, mut entity) = spawn_entity("Empty");
        assert_eq!(entity.is_component_enabled::<Transform>(), None);
        assert!(!entity.set_component_enabled::<Transform>(false));
    }

    #[test]
    fn test_tags() {
        let (_world, mut entity) = spawn_entity("Lamp");

        assert!(entity.add_tag("light"));
        assert!(!entity.add_tag("light"));
        assert!(entity.has_tag("light"));
        assert_eq!(entity.tags(), ["light".to_string()]);

        assert!(entity.remove_tag("light"));
        assert!(!entity.remove_tag("light"));
        assert!(entity.tags().is_empty());
    }
}

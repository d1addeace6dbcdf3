//! Scenes and scene persistence
//!
//! A [`Scene`] owns a set of uniquely named entities, the debug inspector
//! their components publish fields to, and a shared handle to the component
//! registry used to load and save them.
//!
//! Scene documents are plain serde types and can be written as JSON or RON:
//!
//! ```json
//! {
//!   "name": "Main",
//!   "entities": [
//!     {
//!       "name": "Cube",
//!       "enabled": true,
//!       "tags": ["static"],
//!       "components": [
//!         { "type": "Transform", "data": { "position": { "x": 0, "y": 1, "z": 0 } } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::config::SceneConfig;
use crate::core::debug::{DebugError, DebugHooks, DebugInspector, FieldValue};
use crate::ecs::{
    Component, ComponentError, ComponentRegistry, ComponentType, Entity, EntityError, EntityId,
    RegistryError, World,
};

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during scene operations
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Another entity already uses this name.
    #[error("an entity named '{0}' already exists")]
    DuplicateEntityName(String),

    /// The handle refers to a destroyed entity.
    #[error("entity {0:?} no longer exists")]
    StaleEntity(EntityId),

    /// The entity has no component of the requested type.
    #[error("entity '{entity}' has no '{component}' component")]
    MissingComponent {
        /// Entity name
        entity: String,
        /// Component type name
        component: String,
    },

    /// Attaching a component failed.
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// A registry lookup failed outside of loading or saving.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A component could not be created or loaded from its document.
    #[error("failed to load '{component}' on entity '{entity}': {source}")]
    Load {
        /// Entity name
        entity: String,
        /// Component type name
        component: String,
        /// Underlying failure
        #[source]
        source: RegistryError,
    },

    /// A component could not be saved.
    #[error("failed to save '{component}' on entity '{entity}': {source}")]
    Save {
        /// Entity name
        entity: String,
        /// Component type name
        component: String,
        /// Underlying failure
        #[source]
        source: RegistryError,
    },

    /// A component's `init` failed.
    #[error("failed to initialize '{component}' on entity '{entity}': {source}")]
    Init {
        /// Entity name
        entity: String,
        /// Component type name
        component: &'static str,
        /// Underlying failure
        #[source]
        source: ComponentError,
    },

    /// Reading or writing an inspector field failed.
    #[error(transparent)]
    Debug(#[from] DebugError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

// ============================================================================
// Scene Documents
// ============================================================================

fn default_enabled() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// A serialized component: its registry type name and its data object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocument {
    /// Registry type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Component fields
    #[serde(default = "empty_object")]
    pub data: Value,
}

/// A serialized entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    /// Unique entity name
    pub name: String,
    /// Whether the entity is updated
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// User tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Components in attachment order
    #[serde(default)]
    pub components: Vec<ComponentDocument>,
}

/// A serialized scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Scene name
    #[serde(default)]
    pub name: String,
    /// Entities in creation order
    #[serde(default)]
    pub entities: Vec<EntityDocument>,
}

impl SceneDocument {
    /// Serialize to a pretty-printed JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json_string(&self) -> Result<String, SceneError> {
        serde_json::to_string_pretty(self).map_err(|e| SceneError::Serialize(e.to_string()))
    }

    /// Parse from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid scene document
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        serde_json::from_str(json).map_err(|e| SceneError::Deserialize(e.to_string()))
    }

    /// Save the document to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Load a document from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Save the document to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))?;
        fs::write(path, ron_string)?;
        Ok(())
    }

    /// Load a document from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path)?;
        ron::from_str(&content).map_err(|e| SceneError::Deserialize(e.to_string()))
    }
}

// ============================================================================
// Scene
// ============================================================================

/// A set of uniquely named entities with their components.
pub struct Scene {
    config: SceneConfig,
    registry: Arc<ComponentRegistry>,
    world: World,
    /// Entities in creation order
    order: Vec<EntityId>,
    names: FxHashMap<String, EntityId>,
    inspector: DebugInspector,
}

impl Scene {
    /// Create an empty scene
    #[must_use]
    pub fn new(config: SceneConfig, registry: Arc<ComponentRegistry>) -> Self {
        Self {
            config,
            registry,
            world: World::new(),
            order: Vec::new(),
            names: FxHashMap::default(),
            inspector: DebugInspector::new(),
        }
    }

    /// Get the scene name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Get the scene configuration
    #[must_use]
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Get the component registry
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Get the debug inspector
    #[must_use]
    pub const fn inspector(&self) -> &DebugInspector {
        &self.inspector
    }

    // -------------------------------------------------------------------------
    // Entities
    // -------------------------------------------------------------------------

    /// Create an empty entity.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::DuplicateEntityName`] if the name is taken
    pub fn create_entity(&mut self, name: impl Into<String>) -> Result<EntityId, SceneError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(SceneError::DuplicateEntityName(name));
        }

        let id = self.world.spawn(name.clone());
        log::info!("Created entity {name}");
        self.names.insert(name, id);
        self.order.push(id);
        Ok(id)
    }

    /// Destroy an entity together with all of its components and inspector
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleEntity`] if the entity is already gone
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<(), SceneError> {
        let name = self
            .world
            .get(id)
            .map(|entity| entity.name().to_string())
            .ok_or(SceneError::StaleEntity(id))?;

        let removed = self.inspector.remove_entity(id);
        self.world.despawn(id);
        self.names.remove(&name);
        self.order.retain(|e| *e != id);

        log::debug!("Destroyed entity {name} ({removed} debug variables removed)");
        Ok(())
    }

    /// Get an entity
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<hecs::Ref<'_, Entity>> {
        self.world.get(id)
    }

    /// Get an entity mutably.
    ///
    /// Components attached through this reference are not initialized until
    /// [`init_entity`](Self::init_entity) is called.
    #[must_use]
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.world.get_mut(id)
    }

    /// Find an entity by name
    #[must_use]
    pub fn find_entity(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Get every entity carrying a tag, in creation order
    #[must_use]
    pub fn entities_with_tag(&self, tag: &str) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.world.get(*id).is_some_and(|e| e.has_tag(tag)))
            .collect()
    }

    /// Get all entities in creation order
    #[must_use]
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Get the number of entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the scene has no entities
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Destroy every entity
    pub fn clear(&mut self) {
        self.world.clear();
        self.order.clear();
        self.names.clear();
        self.inspector.clear();
    }

    // -------------------------------------------------------------------------
    // Components
    // -------------------------------------------------------------------------

    fn initialize(
        entity: &mut Entity,
        inspector: Option<&mut DebugInspector>,
    ) -> Result<(), SceneError> {
        entity
            .initialize(inspector)
            .map_err(|(component, source)| SceneError::Init {
                entity: entity.name().to_string(),
                component,
                source,
            })
    }

    /// Create, attach and initialize a component of type `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is gone, already has a `T`, or `init`
    /// fails
    pub fn add_component<T: ComponentType>(&mut self, id: EntityId) -> Result<&mut T, SceneError> {
        let inspector = self
            .config
            .install_debug_hooks
            .then_some(&mut self.inspector);
        let entity = self.world.get_mut(id).ok_or(SceneError::StaleEntity(id))?;

        entity.create_component::<T>()?;
        Self::initialize(entity, inspector)?;

        let name = entity.name().to_string();
        entity
            .get_component_mut::<T>()
            .ok_or(SceneError::MissingComponent {
                entity: name,
                component: T::TYPE_NAME.to_string(),
            })
    }

    /// Create, attach and initialize a component by its registry name.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown, the entity is gone or already
    /// has one, or `init` fails
    pub fn add_component_by_name(
        &mut self,
        id: EntityId,
        type_name: &str,
    ) -> Result<&mut dyn Component, SceneError> {
        let component = self.registry.create(type_name, id)?;

        let inspector = self
            .config
            .install_debug_hooks
            .then_some(&mut self.inspector);
        let entity = self.world.get_mut(id).ok_or(SceneError::StaleEntity(id))?;

        entity.attach(component)?;
        Self::initialize(entity, inspector)?;

        let name = entity.name().to_string();
        entity
            .component_by_name_mut(type_name)
            .ok_or(SceneError::MissingComponent {
                entity: name,
                component: type_name.to_string(),
            })
    }

    /// Initialize components attached directly through [`entity_mut`](Self::entity_mut).
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is gone or a component's `init` fails
    pub fn init_entity(&mut self, id: EntityId) -> Result<(), SceneError> {
        let inspector = self
            .config
            .install_debug_hooks
            .then_some(&mut self.inspector);
        let entity = self.world.get_mut(id).ok_or(SceneError::StaleEntity(id))?;
        Self::initialize(entity, inspector)
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    /// Update every enabled entity, then late-update every enabled entity.
    pub fn update(&mut self, delta_time: f32, total_time: f32) {
        for id in &self.order {
            if let Some(entity) = self.world.get_mut(*id) {
                if entity.is_enabled() {
                    entity.update(delta_time, total_time);
                }
            }
        }

        for id in &self.order {
            if let Some(entity) = self.world.get_mut(*id) {
                if entity.is_enabled() {
                    entity.late_update(delta_time, total_time);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Debug Editing
    // -------------------------------------------------------------------------

    /// Read an inspector field.
    ///
    /// # Errors
    ///
    /// Returns an error if no such field exists or its component is gone
    pub fn read_debug_field(
        &self,
        instance: &str,
        category: &str,
        label: &str,
    ) -> Result<FieldValue, SceneError> {
        let variable = self.inspector.find(instance, category, label).ok_or_else(|| {
            DebugError::UnknownVariable {
                instance: instance.to_string(),
                category: category.to_string(),
                label: label.to_string(),
            }
        })?;

        let target = variable.target();
        let entity = self
            .world
            .get(target.entity)
            .ok_or(SceneError::StaleEntity(target.entity))?;
        let component =
            entity
                .component_by_name(target.component)
                .ok_or_else(|| SceneError::MissingComponent {
                    entity: entity.name().to_string(),
                    component: target.component.to_string(),
                })?;

        Ok(variable.get(component)?)
    }

    /// Write an inspector field through its component's typed setter.
    ///
    /// # Errors
    ///
    /// Returns an error if no such field exists, its component is gone, or
    /// the value has the wrong kind
    pub fn write_debug_field(
        &mut self,
        instance: &str,
        category: &str,
        label: &str,
        value: FieldValue,
    ) -> Result<(), SceneError> {
        let variable = self.inspector.find(instance, category, label).ok_or_else(|| {
            DebugError::UnknownVariable {
                instance: instance.to_string(),
                category: category.to_string(),
                label: label.to_string(),
            }
        })?;

        let target = variable.target();
        let entity = self
            .world
            .get_mut(target.entity)
            .ok_or(SceneError::StaleEntity(target.entity))?;
        let name = entity.name().to_string();
        let component =
            entity
                .component_by_name_mut(target.component)
                .ok_or(SceneError::MissingComponent {
                    entity: name,
                    component: target.component.to_string(),
                })?;

        variable.set(component, value)?;
        Ok(())
    }

    /// Rebuild the inspector from scratch using each type's registered
    /// debug installer.
    ///
    /// # Errors
    ///
    /// Returns an error if an installer fails
    pub fn reinstall_debug_hooks(&mut self) -> Result<(), SceneError> {
        self.inspector.clear();
        if !self.config.install_debug_hooks {
            return Ok(());
        }

        for id in &self.order {
            let Some(entity) = self.world.get(*id) else {
                continue;
            };
            for component in entity.components() {
                let type_name = component.type_name();
                let mut hooks =
                    DebugHooks::new(Some(&mut self.inspector), *id, entity.name(), type_name);
                if self.registry.contains(type_name) {
                    self.registry
                        .install_debug_hooks(type_name, component, &mut hooks)?;
                } else {
                    component.install_debug_hooks(&mut hooks)?;
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Serialize every entity into a document.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Save`] if a component type is not registered
    pub fn to_document(&self) -> Result<SceneDocument, SceneError> {
        let mut entities = Vec::with_capacity(self.order.len());

        for id in &self.order {
            let entity = self.world.get(*id).ok_or(SceneError::StaleEntity(*id))?;

            let mut components = Vec::with_capacity(entity.component_count());
            for component in entity.components() {
                let type_name = component.type_name();
                let mut writer = Map::new();
                self.registry
                    .save_component(type_name, component, &mut writer)
                    .map_err(|source| SceneError::Save {
                        entity: entity.name().to_string(),
                        component: type_name.to_string(),
                        source,
                    })?;
                components.push(ComponentDocument {
                    type_name: type_name.to_string(),
                    data: Value::Object(writer),
                });
            }

            entities.push(EntityDocument {
                name: entity.name().to_string(),
                enabled: entity.is_enabled(),
                tags: entity.tags().to_vec(),
                components,
            });
        }

        log::info!("Saved scene {} ({} entities)", self.config.name, entities.len());
        Ok(SceneDocument {
            name: self.config.name.clone(),
            entities,
        })
    }

    /// Replace the scene's contents with a document.
    ///
    /// The scene is cleared first. On failure it is cleared again, so a
    /// partially loaded scene is never observable.
    ///
    /// # Errors
    ///
    /// Returns an error naming the entity and component that failed
    pub fn load_document(&mut self, document: &SceneDocument) -> Result<(), SceneError> {
        self.clear();

        if let Err(e) = self.populate(document) {
            log::error!("Failed to load scene {}: {e}", document.name);
            self.clear();
            return Err(e);
        }

        if !document.name.is_empty() {
            self.config.name.clone_from(&document.name);
        }
        log::info!(
            "Loaded scene {} ({} entities)",
            self.config.name,
            self.order.len()
        );
        Ok(())
    }

    fn populate(&mut self, document: &SceneDocument) -> Result<(), SceneError> {
        let registry = Arc::clone(&self.registry);

        for entity_doc in &document.entities {
            let id = self.create_entity(entity_doc.name.clone())?;
            let entity = self.world.get_mut(id).ok_or(SceneError::StaleEntity(id))?;
            entity.set_enabled(entity_doc.enabled);
            for tag in &entity_doc.tags {
                entity.add_tag(tag.clone());
            }

            // Every component exists and holds its data before any init runs
            for component_doc in &entity_doc.components {
                let type_name = component_doc.type_name.as_str();
                if self.config.skip_unknown_components && !registry.contains(type_name) {
                    log::warn!(
                        "Skipping unknown component type {type_name} on entity {}",
                        entity_doc.name
                    );
                    continue;
                }

                let load_error = |source| SceneError::Load {
                    entity: entity_doc.name.clone(),
                    component: type_name.to_string(),
                    source,
                };
                let mut component = registry.create(type_name, id).map_err(load_error)?;
                registry
                    .load_component(type_name, component.as_mut(), &component_doc.data)
                    .map_err(load_error)?;
                entity.attach(component)?;
            }

            self.init_entity(id)?;
        }
        Ok(())
    }
}

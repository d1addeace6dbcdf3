//! Component registry
//!
//! Maps a component type name to the functions that create, load, save and
//! introspect that type. Scene files and editors only know type names; the
//! registry turns those names back into concrete components.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ComponentRegistry::new();
//! registry.register_type::<Transform>()?;
//!
//! let component = registry.create("Transform", entity_id)?;
//! registry.load_component("Transform", component.as_mut(), &data)?;
//! ```

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::component::{Component, ComponentError, ComponentType};
use super::entity::EntityId;
use super::mesh_render::MeshRenderComponent;
use super::transform::Transform;
use crate::core::debug::DebugHooks;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by registry lookups and registration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The type name was registered twice.
    #[error("component type '{0}' is already registered")]
    DuplicateType(String),

    /// The type name was never registered.
    #[error("unknown component type '{0}'")]
    UnknownType(String),

    /// A factory produced a component whose type name differs from its key.
    #[error("factory for '{registered}' produced a '{produced}'")]
    NameMismatch {
        /// Key the factory was registered under
        registered: String,
        /// Type name of the component it produced
        produced: &'static str,
    },

    /// The loader, saver or debug installer failed.
    #[error(transparent)]
    Component(#[from] ComponentError),
}

// ============================================================================
// Registration
// ============================================================================

/// Constructs a default component for an entity.
pub type ComponentFactory = fn(EntityId) -> Box<dyn Component>;

/// Populates a component from its document.
pub type ComponentLoader = fn(&mut dyn Component, &Value) -> Result<(), ComponentError>;

/// Writes a component's fields into an open object.
pub type ComponentSaver = fn(&dyn Component, &mut Map<String, Value>) -> Result<(), ComponentError>;

/// Registers a component's fields with the debug inspector.
pub type DebugInstaller = fn(&dyn Component, &mut DebugHooks<'_>) -> Result<(), ComponentError>;

/// Capability set of one component type.
#[derive(Clone, Copy)]
struct ComponentRegistration {
    factory: ComponentFactory,
    loader: ComponentLoader,
    saver: ComponentSaver,
    debug_installer: DebugInstaller,
}

fn create_typed<T: ComponentType>(owner: EntityId) -> Box<dyn Component> {
    Box::new(T::new(owner))
}

fn load_typed<T: ComponentType>(
    component: &mut dyn Component,
    data: &Value,
) -> Result<(), ComponentError> {
    component.expect_type_mut::<T>()?.load_from_json(data)
}

fn save_typed<T: ComponentType>(
    component: &dyn Component,
    writer: &mut Map<String, Value>,
) -> Result<(), ComponentError> {
    component.expect_type::<T>()?.save_to_json(writer);
    Ok(())
}

fn install_typed<T: ComponentType>(
    component: &dyn Component,
    hooks: &mut DebugHooks<'_>,
) -> Result<(), ComponentError> {
    component.expect_type::<T>()?.install_debug_hooks(hooks)?;
    Ok(())
}

// ============================================================================
// Registry
// ============================================================================

/// Type-name keyed table of component capabilities.
///
/// Populate it once at startup, then share it read-only (typically behind an
/// `Arc`) with every scene.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: FxHashMap<String, ComponentRegistration>,
}

impl ComponentRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in component type registered
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateType`] if two built-ins share a name
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_builtins()?;
        Ok(registry)
    }

    /// Register every built-in component type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateType`] if a built-in is already registered
    pub fn register_builtins(&mut self) -> Result<(), RegistryError> {
        self.register_type::<Transform>()?;
        self.register_type::<MeshRenderComponent>()
    }

    /// Register a component type by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateType`] if `type_name` is taken
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        factory: ComponentFactory,
        loader: ComponentLoader,
        saver: ComponentSaver,
        debug_installer: DebugInstaller,
    ) -> Result<(), RegistryError> {
        let type_name = type_name.into();
        if self.entries.contains_key(&type_name) {
            return Err(RegistryError::DuplicateType(type_name));
        }

        log::debug!("Registered component type {type_name}");
        self.entries.insert(
            type_name,
            ComponentRegistration {
                factory,
                loader,
                saver,
                debug_installer,
            },
        );
        Ok(())
    }

    /// Register a statically known component type under its `TYPE_NAME`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateType`] if the name is taken
    pub fn register_type<T: ComponentType>(&mut self) -> Result<(), RegistryError> {
        self.register(
            T::TYPE_NAME,
            create_typed::<T>,
            load_typed::<T>,
            save_typed::<T>,
            install_typed::<T>,
        )
    }

    fn entry(&self, type_name: &str) -> Result<&ComponentRegistration, RegistryError> {
        self.entries
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))
    }

    /// Construct a default component of the named type for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownType`] for unregistered names and
    /// [`RegistryError::NameMismatch`] if the factory is inconsistent
    pub fn create(
        &self,
        type_name: &str,
        owner: EntityId,
    ) -> Result<Box<dyn Component>, RegistryError> {
        let component = (self.entry(type_name)?.factory)(owner);
        if component.type_name() != type_name {
            return Err(RegistryError::NameMismatch {
                registered: type_name.to_string(),
                produced: component.type_name(),
            });
        }
        Ok(component)
    }

    /// Load a component from its document using the named type's loader.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the data is malformed
    pub fn load_component(
        &self,
        type_name: &str,
        component: &mut dyn Component,
        data: &Value,
    ) -> Result<(), RegistryError> {
        (self.entry(type_name)?.loader)(component, data)?;
        Ok(())
    }

    /// Save a component using the named type's saver.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the component has another type
    pub fn save_component(
        &self,
        type_name: &str,
        component: &dyn Component,
        writer: &mut Map<String, Value>,
    ) -> Result<(), RegistryError> {
        (self.entry(type_name)?.saver)(component, writer)?;
        Ok(())
    }

    /// Install a component's debug hooks using the named type's installer.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or a variable cannot be added
    pub fn install_debug_hooks(
        &self,
        type_name: &str,
        component: &dyn Component,
        hooks: &mut DebugHooks<'_>,
    ) -> Result<(), RegistryError> {
        (self.entry(type_name)?.debug_installer)(component, hooks)?;
        Ok(())
    }

    /// Check if a type name is registered
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Get all registered type names, sorted
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no types are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::debug::DebugInspector;
    use glam::Vec3;
    use serde_json::json;

    /// Minimal component used to exercise registration by hand
    #[derive(Debug)]
    struct Foo {
        owner: EntityId,
        value: f32,
    }

    impl Component for Foo {
        fn type_name(&self) -> &'static str {
            "Foo"
        }

        fn owner(&self) -> EntityId {
            self.owner
        }

        fn load_from_json(&mut self, data: &Value) -> Result<(), ComponentError> {
            if let Some(v) = data.get("value").and_then(Value::as_f64) {
                self.value = v as f32;
            }
            Ok(())
        }

        fn save_to_json(&self, writer: &mut Map<String, Value>) {
            writer.insert("value".into(), Value::from(f64::from(self.value)));
        }
    }

    fn create_foo(owner: EntityId) -> Box<dyn Component> {
        Box::new(Foo { owner, value: 0.0 })
    }

    fn load_foo(component: &mut dyn Component, data: &Value) -> Result<(), ComponentError> {
        component.load_from_json(data)
    }

    fn save_foo(component: &dyn Component, writer: &mut Map<String, Value>) -> Result<(), ComponentError> {
        component.save_to_json(writer);
        Ok(())
    }

    fn install_nothing(_: &dyn Component, _: &mut DebugHooks<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    fn spawn_id() -> EntityId {
        hecs::World::new().spawn(())
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = ComponentRegistry::new();
        registry
            .register("Foo", create_foo, load_foo, save_foo, install_nothing)
            .unwrap();

        let owner = spawn_id();
        let component = registry.create("Foo", owner).unwrap();
        assert_eq!(component.type_name(), "Foo");
        assert_eq!(component.owner(), owner);
        assert!(component.as_ref().is::<Foo>());
    }

    #[test]
    fn test_unknown_type() {
        let registry = ComponentRegistry::new();
        let err = registry.create("Bar", spawn_id()).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownType(ref name) if name == "Bar"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ComponentRegistry::new();
        registry
            .register("Foo", create_foo, load_foo, save_foo, install_nothing)
            .unwrap();
        let err = registry
            .register("Foo", create_foo, load_foo, save_foo, install_nothing)
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateType(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_name_mismatch() {
        let mut registry = ComponentRegistry::new();
        registry
            .register("Baz", create_foo, load_foo, save_foo, install_nothing)
            .unwrap();
        let err = registry.create("Baz", spawn_id()).unwrap_err();
        assert!(matches!(err, RegistryError::NameMismatch { produced: "Foo", .. }));
    }

    #[test]
    fn test_builtins() {
        let registry = ComponentRegistry::with_builtins().unwrap();
        assert_eq!(registry.type_names(), ["MeshRenderComponent", "Transform"]);
        assert!(registry.contains("Transform"));
        assert!(!registry.contains("Camera"));
    }

    #[test]
    fn test_register_builtins_twice() {
        let mut registry = ComponentRegistry::with_builtins().unwrap();
        let err = registry.register_builtins().unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateType(ref name) if name == "Transform"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_load_and_save_dispatch() {
        let registry = ComponentRegistry::with_builtins().unwrap();
        let mut component = registry.create("Transform", spawn_id()).unwrap();

        let data = json!({ "position": { "x": 1.0, "y": 2.0, "z": 3.0 } });
        registry
            .load_component("Transform", component.as_mut(), &data)
            .unwrap();

        let transform = component.as_ref().downcast_ref::<Transform>().unwrap();
        assert_eq!(transform.position(), Vec3::new(1.0, 2.0, 3.0));

        let mut writer = Map::new();
        registry
            .save_component("Transform", component.as_ref(), &mut writer)
            .unwrap();
        assert_eq!(writer["position"], json!({ "x": 1.0, "y": 2.0, "z": 3.0 }));
    }

    #[test]
    fn test_loader_rejects_other_type() {
        let registry = ComponentRegistry::with_builtins().unwrap();
        let mut mesh = registry.create("MeshRenderComponent", spawn_id()).unwrap();

        let err = registry
            .load_component("Transform", mesh.as_mut(), &json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Component(ComponentError::TypeMismatch {
                expected: "Transform",
                found: "MeshRenderComponent"
            })
        ));
    }

    #[test]
    fn test_install_debug_hooks_dispatch() {
        let registry = ComponentRegistry::with_builtins().unwrap();
        let owner = spawn_id();
        let component = registry.create("Transform", owner).unwrap();
        let mut inspector = DebugInspector::new();

        let mut hooks = DebugHooks::new(Some(&mut inspector), owner, "Cube", "Transform");
        registry
            .install_debug_hooks("Transform", component.as_ref(), &mut hooks)
            .unwrap();
        drop(hooks);

        assert_eq!(inspector.len(), 3);
        assert!(inspector.find("Cube", "Transform", "Rotation").is_some());
    }
}

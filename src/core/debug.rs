//! Debug inspector registry
//!
//! Components publish editable fields here during `init`. An external
//! inspector UI never sees concrete component types: each variable carries a
//! boxed getter/setter pair that downcasts internally and goes through the
//! component's typed accessors.
//!
//! # Threading
//!
//! The inspector is owned by its scene and is only read or written from the
//! thread driving that scene. Loading or editing one scene from several
//! threads at once is not supported.

use std::fmt;

use glam::Vec3;

use crate::ecs::{Component, ComponentType, EntityId};

// ============================================================================
// Field Values
// ============================================================================

/// Semantic type of an inspector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Boolean toggle
    Bool,
    /// Three floats
    Vec3,
    /// Free text
    Text,
}

/// A value read from or written to an inspector field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Boolean toggle
    Bool(bool),
    /// Three floats
    Vec3(Vec3),
    /// Free text
    Text(String),
}

impl FieldValue {
    /// Get the kind of this value
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Vec3(_) => FieldKind::Vec3,
            Self::Text(_) => FieldKind::Text,
        }
    }

    fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn into_vec3(self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(v),
            _ => None,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by the debug inspector.
#[derive(Debug, thiserror::Error)]
pub enum DebugError {
    /// A variable with the same key is already registered.
    #[error("debug variable '{label}' already exists for {category} on '{instance}'")]
    DuplicateVariable {
        /// Entity name
        instance: String,
        /// Component type name
        category: &'static str,
        /// Field label
        label: String,
    },

    /// No variable matches the key.
    #[error("no debug variable '{label}' for {category} on '{instance}'")]
    UnknownVariable {
        /// Entity name
        instance: String,
        /// Component type name
        category: String,
        /// Field label
        label: String,
    },

    /// A value of the wrong kind was written.
    #[error("expected a {expected:?} value, got {found:?}")]
    KindMismatch {
        /// Kind of the field
        expected: FieldKind,
        /// Kind of the value supplied
        found: FieldKind,
    },

    /// A callback was invoked on the wrong component type.
    #[error("debug callback for '{expected}' invoked on '{found}'")]
    WrongComponent {
        /// Type the callback was built for
        expected: &'static str,
        /// Type it was invoked on
        found: &'static str,
    },
}

// ============================================================================
// Variables
// ============================================================================

/// Reads a field from a type-erased component.
pub type DebugGetter = Box<dyn Fn(&dyn Component) -> Result<FieldValue, DebugError> + Send + Sync>;

/// Writes a field on a type-erased component through its typed setter.
pub type DebugSetter =
    Box<dyn Fn(&mut dyn Component, FieldValue) -> Result<(), DebugError> + Send + Sync>;

/// Non-owning back-reference from a variable to its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugTarget {
    /// Owning entity
    pub entity: EntityId,
    /// Component type name on that entity
    pub component: &'static str,
}

/// One editable field.
pub struct DebugVariable {
    kind: FieldKind,
    label: String,
    category: &'static str,
    instance: String,
    getter: DebugGetter,
    setter: DebugSetter,
    target: DebugTarget,
}

impl DebugVariable {
    /// Semantic type of the field
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Field label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Component type name
    #[must_use]
    pub const fn category(&self) -> &'static str {
        self.category
    }

    /// Entity name
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Component this variable reads and writes
    #[must_use]
    pub const fn target(&self) -> DebugTarget {
        self.target
    }

    /// Read the field.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::WrongComponent`] if `component` is not of the
    /// type the variable was registered for
    pub fn get(&self, component: &dyn Component) -> Result<FieldValue, DebugError> {
        (self.getter)(component)
    }

    /// Write the field.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` has the wrong kind or `component` has the
    /// wrong type
    pub fn set(&self, component: &mut dyn Component, value: FieldValue) -> Result<(), DebugError> {
        if value.kind() != self.kind {
            return Err(DebugError::KindMismatch {
                expected: self.kind,
                found: value.kind(),
            });
        }
        (self.setter)(component, value)
    }

    fn matches(&self, instance: &str, category: &str, label: &str) -> bool {
        self.instance == instance && self.category == category && self.label == label
    }
}

impl fmt::Debug for DebugVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugVariable")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("category", &self.category)
            .field("instance", &self.instance)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Inspector
// ============================================================================

/// Registry of editable component fields, grouped by entity and component.
#[derive(Debug, Default)]
pub struct DebugInspector {
    variables: Vec<DebugVariable>,
}

impl DebugInspector {
    /// Create an empty inspector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::DuplicateVariable`] if the same
    /// (instance, category, label) key is already registered
    #[allow(clippy::too_many_arguments)]
    pub fn add_variable_with_callbacks(
        &mut self,
        kind: FieldKind,
        label: impl Into<String>,
        category: &'static str,
        instance: impl Into<String>,
        getter: DebugGetter,
        setter: DebugSetter,
        target: DebugTarget,
    ) -> Result<(), DebugError> {
        let label = label.into();
        let instance = instance.into();

        if self.find(&instance, category, &label).is_some() {
            return Err(DebugError::DuplicateVariable {
                instance,
                category,
                label,
            });
        }

        self.variables.push(DebugVariable {
            kind,
            label,
            category,
            instance,
            getter,
            setter,
            target,
        });
        Ok(())
    }

    /// Find a field by key
    #[must_use]
    pub fn find(&self, instance: &str, category: &str, label: &str) -> Option<&DebugVariable> {
        self.variables
            .iter()
            .find(|v| v.matches(instance, category, label))
    }

    /// Iterate over all fields in registration order
    pub fn variables(&self) -> impl Iterator<Item = &DebugVariable> {
        self.variables.iter()
    }

    /// Iterate over the fields of one entity
    pub fn variables_for<'a>(&'a self, instance: &'a str) -> impl Iterator<Item = &'a DebugVariable> {
        self.variables.iter().filter(move |v| v.instance == instance)
    }

    /// Drop every field pointing at `entity`.
    ///
    /// Returns the number of fields removed.
    pub fn remove_entity(&mut self, entity: EntityId) -> usize {
        let before = self.variables.len();
        self.variables.retain(|v| v.target.entity != entity);
        before - self.variables.len()
    }

    /// Drop every field pointing at one component of `entity`.
    ///
    /// Returns the number of fields removed.
    pub fn remove_component(&mut self, entity: EntityId, component: &str) -> usize {
        let before = self.variables.len();
        self.variables
            .retain(|v| v.target.entity != entity || v.target.component != component);
        before - self.variables.len()
    }

    /// Get the number of registered fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if no fields are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Remove every field
    pub fn clear(&mut self) {
        self.variables.clear();
    }
}

// ============================================================================
// Hooks Context
// ============================================================================

/// Registration context handed to a component's `init`.
///
/// Carries the owning entity's handle and name so components can register
/// fields without holding a reference to their entity. Without an inspector
/// every registration is a no-op.
pub struct DebugHooks<'a> {
    inspector: Option<&'a mut DebugInspector>,
    entity: EntityId,
    entity_name: &'a str,
    type_name: &'static str,
}

impl<'a> DebugHooks<'a> {
    /// Create a context for one component.
    #[must_use]
    pub fn new(
        inspector: Option<&'a mut DebugInspector>,
        entity: EntityId,
        entity_name: &'a str,
        type_name: &'static str,
    ) -> Self {
        Self {
            inspector,
            entity,
            entity_name,
            type_name,
        }
    }

    /// Register a field with explicit callbacks.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::DuplicateVariable`] on a repeated label
    pub fn add_variable(
        &mut self,
        kind: FieldKind,
        label: &str,
        getter: DebugGetter,
        setter: DebugSetter,
    ) -> Result<(), DebugError> {
        let Some(inspector) = self.inspector.as_deref_mut() else {
            return Ok(());
        };

        inspector.add_variable_with_callbacks(
            kind,
            label,
            self.type_name,
            self.entity_name,
            getter,
            setter,
            DebugTarget {
                entity: self.entity,
                component: self.type_name,
            },
        )
    }

    /// Register a three-float field backed by typed accessors.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::DuplicateVariable`] on a repeated label
    pub fn add_vec3<T: ComponentType>(
        &mut self,
        label: &str,
        get: fn(&T) -> Vec3,
        set: fn(&mut T, Vec3),
    ) -> Result<(), DebugError> {
        let (getter, setter) = vec3_accessors(get, set);
        self.add_variable(FieldKind::Vec3, label, getter, setter)
    }

    /// Register a text field backed by typed accessors.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::DuplicateVariable`] on a repeated label
    pub fn add_text<T: ComponentType>(
        &mut self,
        label: &str,
        get: fn(&T) -> String,
        set: fn(&mut T, String),
    ) -> Result<(), DebugError> {
        let (getter, setter) = text_accessors(get, set);
        self.add_variable(FieldKind::Text, label, getter, setter)
    }
}

// ============================================================================
// Accessor Adapters
// ============================================================================

fn accessors<T, V>(
    kind: FieldKind,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
    wrap: fn(V) -> FieldValue,
    unwrap: fn(FieldValue) -> Option<V>,
) -> (DebugGetter, DebugSetter)
where
    T: ComponentType,
    V: 'static,
{
    let getter: DebugGetter = Box::new(move |component: &dyn Component| {
        let typed = component
            .downcast_ref::<T>()
            .ok_or(DebugError::WrongComponent {
                expected: T::TYPE_NAME,
                found: component.type_name(),
            })?;
        Ok(wrap(get(typed)))
    });

    let setter: DebugSetter = Box::new(move |component: &mut dyn Component, value: FieldValue| {
        let found = component.type_name();
        let typed = component
            .downcast_mut::<T>()
            .ok_or(DebugError::WrongComponent {
                expected: T::TYPE_NAME,
                found,
            })?;
        let found_kind = value.kind();
        let value = unwrap(value).ok_or(DebugError::KindMismatch {
            expected: kind,
            found: found_kind,
        })?;
        set(typed, value);
        Ok(())
    });

    (getter, setter)
}

/// Build callbacks for a boolean field.
#[must_use]
pub fn bool_accessors<T: ComponentType>(
    get: fn(&T) -> bool,
    set: fn(&mut T, bool),
) -> (DebugGetter, DebugSetter) {
    accessors(FieldKind::Bool, get, set, FieldValue::Bool, FieldValue::into_bool)
}

/// Build callbacks for a three-float field.
#[must_use]
pub fn vec3_accessors<T: ComponentType>(
    get: fn(&T) -> Vec3,
    set: fn(&mut T, Vec3),
) -> (DebugGetter, DebugSetter) {
    accessors(FieldKind::Vec3, get, set, FieldValue::Vec3, FieldValue::into_vec3)
}

/// Build callbacks for a text field.
#[must_use]
pub fn text_accessors<T: ComponentType>(
    get: fn(&T) -> String,
    set: fn(&mut T, String),
) -> (DebugGetter, DebugSetter) {
    accessors(FieldKind::Text, get, set, FieldValue::Text, FieldValue::into_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{MeshRenderComponent, Transform};

    fn spawn_ids(count: usize) -> Vec<EntityId> {
        let mut world = hecs::World::new();
        (0..count).map(|_| world.spawn(())).collect()
    }

    fn position_accessors() -> (DebugGetter, DebugSetter) {
        vec3_accessors::<Transform>(Transform::position, Transform::set_position)
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let ids = spawn_ids(1);
        let mut inspector = DebugInspector::new();
        let target = DebugTarget {
            entity: ids[0],
            component: "Transform",
        };

        let (g, s) = position_accessors();
        inspector
            .add_variable_with_callbacks(FieldKind::Vec3, "Position", "Transform", "Cube", g, s, target)
            .unwrap();

        let (g, s) = position_accessors();
        let err = inspector
            .add_variable_with_callbacks(FieldKind::Vec3, "Position", "Transform", "Cube", g, s, target)
            .unwrap_err();
        assert!(matches!(err, DebugError::DuplicateVariable { .. }));

        // Same label on another entity is fine
        let (g, s) = position_accessors();
        inspector
            .add_variable_with_callbacks(FieldKind::Vec3, "Position", "Transform", "Lamp", g, s, target)
            .unwrap();
        assert_eq!(inspector.len(), 2);
    }

    #[test]
    fn test_kind_mismatch() {
        let ids = spawn_ids(1);
        let mut inspector = DebugInspector::new();
        let mut transform = Transform::new(ids[0]);
        {
            let mut hooks = DebugHooks::new(Some(&mut inspector), ids[0], "Cube", "Transform");
            transform.install_debug_hooks(&mut hooks).unwrap();
        }

        let scale = inspector.find("Cube", "Transform", "Scale").unwrap();
        let err = scale
            .set(&mut transform, FieldValue::Bool(true))
            .unwrap_err();
        assert!(matches!(
            err,
            DebugError::KindMismatch {
                expected: FieldKind::Vec3,
                found: FieldKind::Bool
            }
        ));
        assert_eq!(transform.scale(), Vec3::ONE);
    }

    #[test]
    fn test_wrong_component() {
        let ids = spawn_ids(1);
        let (getter, setter) = position_accessors();
        let mut mesh = MeshRenderComponent::new(ids[0]);

        let err = getter(&mesh as &dyn Component).unwrap_err();
        assert!(matches!(
            err,
            DebugError::WrongComponent {
                expected: "Transform",
                found: "MeshRenderComponent"
            }
        ));
        assert!(setter(&mut mesh as &mut dyn Component, FieldValue::Vec3(Vec3::ONE)).is_err());
    }

    #[test]
    fn test_remove_entity() {
        let ids = spawn_ids(2);
        let mut inspector = DebugInspector::new();

        for (id, name) in ids.iter().zip(["A", "B"]) {
            let transform = Transform::new(*id);
            let mut hooks = DebugHooks::new(Some(&mut inspector), *id, name, "Transform");
            transform.install_debug_hooks(&mut hooks).unwrap();
        }
        assert_eq!(inspector.len(), 6);

        assert_eq!(inspector.remove_entity(ids[0]), 3);
        assert_eq!(inspector.variables_for("A").count(), 0);
        assert_eq!(inspector.variables_for("B").count(), 3);
    }

    #[test]
    fn test_remove_component() {
        let ids = spawn_ids(1);
        let mut inspector = DebugInspector::new();
        let transform = Transform::new(ids[0]);
        let mesh = MeshRenderComponent::new(ids[0]);
        {
            let mut hooks = DebugHooks::new(Some(&mut inspector), ids[0], "Cube", "Transform");
            transform.install_debug_hooks(&mut hooks).unwrap();
        }
        {
            let mut hooks =
                DebugHooks::new(Some(&mut inspector), ids[0], "Cube", "MeshRenderComponent");
            mesh.install_debug_hooks(&mut hooks).unwrap();
        }
        assert_eq!(inspector.len(), 6);

        assert_eq!(inspector.remove_component(ids[0], "MeshRenderComponent"), 3);
        assert!(inspector.find("Cube", "MeshRenderComponent", "Mesh").is_none());
        assert!(inspector.find("Cube", "Transform", "Position").is_some());
        assert_eq!(inspector.remove_component(ids[0], "MeshRenderComponent"), 0);
    }

    #[test]
    fn test_hooks_without_inspector() {
        let ids = spawn_ids(1);
        let transform = Transform::new(ids[0]);
        let mut hooks = DebugHooks::new(None, ids[0], "Cube", "Transform");

        transform.install_debug_hooks(&mut hooks).unwrap();
        assert!(hooks.inspector.is_none());
    }
}

//! Component traits and JSON field helpers
//!
//! A component is a unit of state attached to exactly one entity. Components
//! are dispatched polymorphically through [`dyn Component`](Component) and
//! identified on disk and in the debug inspector by their type name.

use std::any::Any;
use std::fmt;

use glam::Vec3;
use serde_json::{Map, Value};

use super::entity::EntityId;
use crate::core::debug::{DebugError, DebugHooks};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while loading, saving or introspecting a component.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A field was present in the document but had the wrong shape.
    #[error("field '{field}' is malformed: expected {expected}")]
    MalformedField {
        /// Path of the offending field (e.g. `position.x`)
        field: String,
        /// Description of the expected shape
        expected: &'static str,
    },

    /// The component data itself was not a JSON object.
    #[error("component data must be an object, found {found}")]
    NotAnObject {
        /// JSON type that was found instead
        found: &'static str,
    },

    /// A typed callback was handed a component of another concrete type.
    #[error("expected component '{expected}', found '{found}'")]
    TypeMismatch {
        /// Type the callback was registered for
        expected: &'static str,
        /// Type of the component it received
        found: &'static str,
    },

    /// Installing debug hooks failed.
    #[error(transparent)]
    Debug(#[from] DebugError),
}

// ============================================================================
// Component Traits
// ============================================================================

/// Access to a value as [`Any`], implemented for every sized `'static` type.
///
/// Always call through `&dyn Component`; calling on a `Box<dyn Component>`
/// resolves to the box itself.
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Object-safe component contract.
///
/// The lifecycle is: construction (via factory or [`ComponentType::new`]),
/// attachment to an entity, optional [`load_from_json`](Self::load_from_json),
/// then [`init`](Self::init) exactly once after every sibling created in the
/// same batch exists. The component is dropped together with its entity.
pub trait Component: AsAny + fmt::Debug + Send + Sync {
    /// Stable type name, used as registry key and inspector category.
    fn type_name(&self) -> &'static str;

    /// Handle of the owning entity.
    fn owner(&self) -> EntityId;

    /// Called once after attachment. Installs debug hooks by default.
    ///
    /// # Errors
    ///
    /// Returns an error if a debug variable cannot be registered
    fn init(&mut self, hooks: &mut DebugHooks<'_>) -> Result<(), ComponentError> {
        self.install_debug_hooks(hooks)?;
        Ok(())
    }

    /// Register this component's editable fields with the inspector.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable with the same key already exists
    fn install_debug_hooks(&self, _hooks: &mut DebugHooks<'_>) -> Result<(), DebugError> {
        Ok(())
    }

    /// Per-frame update.
    fn update(&mut self, _delta_time: f32, _total_time: f32) {}

    /// Per-frame update, run after every entity has been updated.
    fn late_update(&mut self, _delta_time: f32, _total_time: f32) {}

    /// Populate state from a component document.
    ///
    /// Absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns an error if a present field has the wrong shape
    fn load_from_json(&mut self, data: &Value) -> Result<(), ComponentError>;

    /// Write state as key/value pairs into an already open object.
    fn save_to_json(&self, writer: &mut Map<String, Value>);
}

/// Statically known component type.
pub trait ComponentType: Component + Sized {
    /// Type name, must equal [`Component::type_name`].
    const TYPE_NAME: &'static str;

    /// Construct a component in its default state for `owner`.
    fn new(owner: EntityId) -> Self;
}

impl dyn Component {
    /// Check the concrete type.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to a concrete component type.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete component type mutably.
    #[must_use]
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Downcast or report which type was found.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::TypeMismatch`] if the component is not a `T`
    pub fn expect_type<T: ComponentType>(&self) -> Result<&T, ComponentError> {
        let found = self.type_name();
        self.downcast_ref::<T>()
            .ok_or(ComponentError::TypeMismatch {
                expected: T::TYPE_NAME,
                found,
            })
    }

    /// Mutable variant of [`expect_type`](Self::expect_type).
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::TypeMismatch`] if the component is not a `T`
    pub fn expect_type_mut<T: ComponentType>(&mut self) -> Result<&mut T, ComponentError> {
        let found = self.type_name();
        self.downcast_mut::<T>()
            .ok_or(ComponentError::TypeMismatch {
                expected: T::TYPE_NAME,
                found,
            })
    }
}

// ============================================================================
// JSON Field Helpers
// ============================================================================

/// Name of a JSON value's type, for diagnostics.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// View component data as an object.
///
/// # Errors
///
/// Returns [`ComponentError::NotAnObject`] for any other JSON type
pub fn as_object(data: &Value) -> Result<&Map<String, Value>, ComponentError> {
    data.as_object().ok_or(ComponentError::NotAnObject {
        found: json_type_name(data),
    })
}

/// Read an optional `{"x": f, "y": f, "z": f}` field.
///
/// # Errors
///
/// Returns [`ComponentError::MalformedField`] if the field is present but is
/// not an object, or any of its three members is missing or not a number
pub fn read_vec3(object: &Map<String, Value>, key: &str) -> Result<Option<Vec3>, ComponentError> {
    let Some(value) = object.get(key) else {
        return Ok(None);
    };

    let fields = value.as_object().ok_or_else(|| ComponentError::MalformedField {
        field: key.to_string(),
        expected: "object with x, y, z",
    })?;

    let axis = |name: &str| -> Result<f32, ComponentError> {
        fields
            .get(name)
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .ok_or_else(|| ComponentError::MalformedField {
                field: format!("{key}.{name}"),
                expected: "number",
            })
    };

    Ok(Some(Vec3::new(axis("x")?, axis("y")?, axis("z")?)))
}

/// Read an optional string field.
///
/// # Errors
///
/// Returns [`ComponentError::MalformedField`] if the field is not a string
pub fn read_string(object: &Map<String, Value>, key: &str) -> Result<Option<String>, ComponentError> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ComponentError::MalformedField {
            field: key.to_string(),
            expected: "string",
        }),
    }
}

/// Write a vector as `{"x": f, "y": f, "z": f}`.
///
/// Non-finite values have no JSON representation and are written as `null`.
pub fn write_vec3(writer: &mut Map<String, Value>, key: &str, v: Vec3) {
    let mut fields = Map::new();
    fields.insert("x".into(), Value::from(f64::from(v.x)));
    fields.insert("y".into(), Value::from(f64::from(v.y)));
    fields.insert("z".into(), Value::from(f64::from(v.z)));
    writer.insert(key.into(), Value::Object(fields));
}

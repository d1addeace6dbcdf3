//! Mesh render component
//!
//! Names the mesh and material an entity is drawn with. Both are opaque
//! asset identifiers resolved by the renderer; nothing here loads assets.

use serde_json::{Map, Value};

use super::component::{self, Component, ComponentError, ComponentType};
use super::entity::EntityId;
use crate::core::debug::{self, DebugError, DebugHooks, FieldKind};

/// Draws the owning entity with a mesh and material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRenderComponent {
    owner: EntityId,
    /// Mesh asset identifier (empty for none)
    mesh_id: String,
    /// Material asset identifier (empty for the default material)
    material_id: String,
    /// Whether the mesh is drawn into shadow maps
    cast_shadows: bool,
}

impl ComponentType for MeshRenderComponent {
    const TYPE_NAME: &'static str = "MeshRenderComponent";

    fn new(owner: EntityId) -> Self {
        Self {
            owner,
            mesh_id: String::new(),
            material_id: String::new(),
            cast_shadows: true,
        }
    }
}

impl MeshRenderComponent {
    /// Get the mesh identifier
    #[must_use]
    pub fn mesh_id(&self) -> &str {
        &self.mesh_id
    }

    /// Set the mesh identifier
    pub fn set_mesh(&mut self, mesh_id: impl Into<String>) {
        self.mesh_id = mesh_id.into();
    }

    /// Get the material identifier
    #[must_use]
    pub fn material_id(&self) -> &str {
        &self.material_id
    }

    /// Set the material identifier
    pub fn set_material(&mut self, material_id: impl Into<String>) {
        self.material_id = material_id.into();
    }

    /// Check if the mesh casts shadows
    #[must_use]
    pub const fn casts_shadows(&self) -> bool {
        self.cast_shadows
    }

    /// Enable or disable shadow casting
    pub fn set_cast_shadows(&mut self, cast_shadows: bool) {
        self.cast_shadows = cast_shadows;
    }
}

impl Component for MeshRenderComponent {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn install_debug_hooks(&self, hooks: &mut DebugHooks<'_>) -> Result<(), DebugError> {
        hooks.add_text::<Self>("Mesh", |c| c.mesh_id.clone(), |c, v| c.set_mesh(v))?;
        hooks.add_text::<Self>("Material", |c| c.material_id.clone(), |c, v| c.set_material(v))?;

        let (getter, setter) =
            debug::bool_accessors::<Self>(Self::casts_shadows, Self::set_cast_shadows);
        hooks.add_variable(FieldKind::Bool, "Cast Shadows", getter, setter)
    }

    fn load_from_json(&mut self, data: &Value) -> Result<(), ComponentError> {
        let object = component::as_object(data)?;

        let mesh = component::read_string(object, "mesh")?;
        let material = component::read_string(object, "material")?;
        let cast_shadows = match object.get("castShadows") {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                return Err(ComponentError::MalformedField {
                    field: "castShadows".into(),
                    expected: "bool",
                });
            }
        };

        if let Some(mesh) = mesh {
            self.set_mesh(mesh);
        }
        if let Some(material) = material {
            self.set_material(material);
        }
        if let Some(cast_shadows) = cast_shadows {
            self.set_cast_shadows(cast_shadows);
        }
        Ok(())
    }

    fn save_to_json(&self, writer: &mut Map<String, Value>) {
        writer.insert("mesh".into(), Value::from(self.mesh_id.as_str()));
        writer.insert("material".into(), Value::from(self.material_id.as_str()));
        writer.insert("castShadows".into(), Value::from(self.cast_shadows));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::debug::{DebugInspector, FieldValue};
    use serde_json::json;

    fn new_component() -> MeshRenderComponent {
        let mut world = hecs::World::new();
        MeshRenderComponent::new(world.spawn(()))
    }

    #[test]
    fn test_defaults() {
        let c = new_component();
        assert_eq!(c.mesh_id(), "");
        assert_eq!(c.material_id(), "");
        assert!(c.casts_shadows());
    }

    #[test]
    fn test_json_round_trip() {
        let mut c = new_component();
        c.set_mesh("torus");
        c.set_material("cracks");
        c.set_cast_shadows(false);

        let mut writer = Map::new();
        c.save_to_json(&mut writer);

        let mut loaded = new_component();
        loaded.load_from_json(&Value::Object(writer)).unwrap();
        assert_eq!(loaded.mesh_id(), "torus");
        assert_eq!(loaded.material_id(), "cracks");
        assert!(!loaded.casts_shadows());
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let mut c = new_component();
        let err = c
            .load_from_json(&json!({ "mesh": "cube", "castShadows": "yes" }))
            .unwrap_err();
        assert!(matches!(err, ComponentError::MalformedField { ref field, .. } if field == "castShadows"));
        assert_eq!(c.mesh_id(), "");
    }

    #[test]
    fn test_debug_hooks() {
        let mut world = hecs::World::new();
        let id = world.spawn(());
        let mut c = MeshRenderComponent::new(id);
        let mut inspector = DebugInspector::new();
        {
            let mut hooks = DebugHooks::new(Some(&mut inspector), id, "Cone", MeshRenderComponent::TYPE_NAME);
            c.install_debug_hooks(&mut hooks).unwrap();
        }

        let mesh = inspector.find("Cone", "MeshRenderComponent", "Mesh").unwrap();
        mesh.set(&mut c, FieldValue::Text("cone".into())).unwrap();
        assert_eq!(c.mesh_id(), "cone");
        assert_eq!(mesh.get(&c).unwrap(), FieldValue::Text("cone".into()));

        let shadows = inspector
            .find("Cone", "MeshRenderComponent", "Cast Shadows")
            .unwrap();
        shadows.set(&mut c, FieldValue::Bool(false)).unwrap();
        assert!(!c.casts_shadows());
    }
}

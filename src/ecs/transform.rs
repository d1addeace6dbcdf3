//! Transform component with eagerly cached matrices
//!
//! Position, rotation and scale each own a cached matrix. Every mutator
//! updates exactly one of the three fields, rebuilds that field's matrix and
//! then the world matrix before returning, so every getter is always valid
//! to read.
//!
//! # Conventions
//!
//! - Rotation is stored as Euler angles in radians. Every public angle
//!   (setters, `rotate_local*`, the inspector and the persisted document)
//!   is in degrees.
//! - The rotation matrix applies roll (z), then pitch (x), then yaw (y).
//! - Forward is +Z, right is +X, up is +Y.
//! - Points are scaled first, rotated second and translated last. glam uses
//!   column vectors, so the world matrix is the product
//!   `translation * rotation * scale`.
//! - There is no parent/child hierarchy: every transform is world-absolute.

use glam::{EulerRot, Mat4, Vec3};
use serde_json::{Map, Value};

use super::component::{self, Component, ComponentError, ComponentType};
use super::entity::EntityId;
use crate::core::debug::{DebugError, DebugHooks};

/// Spatial transform of an entity.
#[derive(Debug, Clone)]
pub struct Transform {
    /// Owning entity
    owner: EntityId,

    /// Position in world space
    position: Vec3,
    /// Euler angles in radians
    rotation: Vec3,
    /// Scale factors
    scale: Vec3,

    translation_matrix: Mat4,
    rotation_matrix: Mat4,
    scale_matrix: Mat4,
    world_matrix: Mat4,
}

impl ComponentType for Transform {
    const TYPE_NAME: &'static str = "Transform";

    fn new(owner: EntityId) -> Self {
        Self {
            owner,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            translation_matrix: Mat4::IDENTITY,
            rotation_matrix: Mat4::IDENTITY,
            scale_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    // -------------------------------------------------------------------------
    // Getters
    // -------------------------------------------------------------------------

    /// Get the position.
    #[must_use]
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Get the rotation in radians.
    #[must_use]
    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Get the rotation in degrees.
    #[must_use]
    pub fn rotation_degrees(&self) -> Vec3 {
        Vec3::new(
            self.rotation.x.to_degrees(),
            self.rotation.y.to_degrees(),
            self.rotation.z.to_degrees(),
        )
    }

    /// Get the scale.
    #[must_use]
    #[inline]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Get the cached translation matrix.
    #[must_use]
    #[inline]
    pub fn translation_matrix(&self) -> Mat4 {
        self.translation_matrix
    }

    /// Get the cached rotation matrix.
    #[must_use]
    #[inline]
    pub fn rotation_matrix(&self) -> Mat4 {
        self.rotation_matrix
    }

    /// Get the cached scale matrix.
    #[must_use]
    #[inline]
    pub fn scale_matrix(&self) -> Mat4 {
        self.scale_matrix
    }

    /// Get the cached world matrix.
    ///
    /// This is what the renderer reads every frame.
    #[must_use]
    #[inline]
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Local right direction (+X through the rotation only).
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation_matrix.transform_vector3(Vec3::X)
    }

    /// Local up direction (+Y through the rotation only).
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation_matrix.transform_vector3(Vec3::Y)
    }

    /// Local forward direction (+Z through the rotation only).
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation_matrix.transform_vector3(Vec3::Z)
    }

    // -------------------------------------------------------------------------
    // Setters
    // -------------------------------------------------------------------------

    /// Set the position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.calc_translation_matrix();
    }

    /// Set the rotation from Euler angles in degrees.
    pub fn set_rotation(&mut self, degrees: Vec3) {
        self.rotation = Vec3::new(
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
        self.calc_rotation_matrix();
    }

    /// Set the scale.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.calc_scale_matrix();
    }

    // -------------------------------------------------------------------------
    // World-space movement
    // -------------------------------------------------------------------------

    /// Move by a world-space delta.
    pub fn move_by(&mut self, delta: Vec3) {
        self.position += delta;
        self.calc_translation_matrix();
    }

    /// Move along world X.
    pub fn move_x(&mut self, delta: f32) {
        self.move_by(Vec3::X * delta);
    }

    /// Move along world Y.
    pub fn move_y(&mut self, delta: f32) {
        self.move_by(Vec3::Y * delta);
    }

    /// Move along world Z.
    pub fn move_z(&mut self, delta: f32) {
        self.move_by(Vec3::Z * delta);
    }

    // -------------------------------------------------------------------------
    // Local movement and rotation
    // -------------------------------------------------------------------------

    /// Move along the current right/up/forward basis.
    ///
    /// `delta.x` goes along [`right`](Self::right), `delta.y` along
    /// [`up`](Self::up) and `delta.z` along [`forward`](Self::forward).
    /// The result is added to the world-space position.
    pub fn move_local(&mut self, delta: Vec3) {
        let offset = self.right() * delta.x + self.up() * delta.y + self.forward() * delta.z;
        self.position += offset;
        self.calc_translation_matrix();
    }

    /// Move along the current right direction.
    pub fn move_local_x(&mut self, delta: f32) {
        self.position += self.right() * delta;
        self.calc_translation_matrix();
    }

    /// Move along the current up direction.
    pub fn move_local_y(&mut self, delta: f32) {
        self.position += self.up() * delta;
        self.calc_translation_matrix();
    }

    /// Move along the current forward direction.
    pub fn move_local_z(&mut self, delta: f32) {
        self.position += self.forward() * delta;
        self.calc_translation_matrix();
    }

    /// Add Euler angles in degrees to the stored rotation.
    ///
    /// Angles accumulate per axis; this matches a composed rotation only for
    /// rotations about a single axis.
    pub fn rotate_local(&mut self, degrees: Vec3) {
        self.rotation += Vec3::new(
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
        self.calc_rotation_matrix();
    }

    /// Add degrees to the pitch.
    pub fn rotate_local_x(&mut self, degrees: f32) {
        self.rotation.x += degrees.to_radians();
        self.calc_rotation_matrix();
    }

    /// Add degrees to the yaw.
    pub fn rotate_local_y(&mut self, degrees: f32) {
        self.rotation.y += degrees.to_radians();
        self.calc_rotation_matrix();
    }

    /// Add degrees to the roll.
    pub fn rotate_local_z(&mut self, degrees: f32) {
        self.rotation.z += degrees.to_radians();
        self.calc_rotation_matrix();
    }

    // -------------------------------------------------------------------------
    // Scaling (additive)
    // -------------------------------------------------------------------------

    /// Add `delta` to the scale.
    pub fn scale_by(&mut self, delta: Vec3) {
        self.scale += delta;
        self.calc_scale_matrix();
    }

    /// Add `delta` to the X scale.
    pub fn scale_x(&mut self, delta: f32) {
        self.scale_by(Vec3::X * delta);
    }

    /// Add `delta` to the Y scale.
    pub fn scale_y(&mut self, delta: f32) {
        self.scale_by(Vec3::Y * delta);
    }

    /// Add `delta` to the Z scale.
    pub fn scale_z(&mut self, delta: f32) {
        self.scale_by(Vec3::Z * delta);
    }

    // -------------------------------------------------------------------------
    // Matrix recomputation
    // -------------------------------------------------------------------------

    fn calc_translation_matrix(&mut self) {
        self.translation_matrix = Mat4::from_translation(self.position);
        self.calc_world_matrix();
    }

    fn calc_rotation_matrix(&mut self) {
        self.rotation_matrix = Mat4::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        );
        self.calc_world_matrix();
    }

    fn calc_scale_matrix(&mut self) {
        self.scale_matrix = Mat4::from_scale(self.scale);
        self.calc_world_matrix();
    }

    fn calc_world_matrix(&mut self) {
        self.world_matrix = self.translation_matrix * self.rotation_matrix * self.scale_matrix;
    }
}

impl Component for Transform {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn install_debug_hooks(&self, hooks: &mut DebugHooks<'_>) -> Result<(), DebugError> {
        hooks.add_vec3::<Self>("Position", debug_get_position, debug_set_position)?;
        hooks.add_vec3::<Self>("Rotation", debug_get_rotation, debug_set_rotation)?;
        hooks.add_vec3::<Self>("Scale", debug_get_scale, debug_set_scale)?;
        Ok(())
    }

    fn load_from_json(&mut self, data: &Value) -> Result<(), ComponentError> {
        let object = component::as_object(data)?;

        // Validate everything before touching state
        let position = component::read_vec3(object, "position")?;
        let rotation = component::read_vec3(object, "rotation")?;
        let scale = component::read_vec3(object, "scale")?;

        if let Some(position) = position {
            self.set_position(position);
        }
        if let Some(rotation) = rotation {
            self.set_rotation(rotation);
        }
        if let Some(scale) = scale {
            self.set_scale(scale);
        }
        Ok(())
    }

    fn save_to_json(&self, writer: &mut Map<String, Value>) {
        component::write_vec3(writer, "position", self.position);
        component::write_vec3(writer, "rotation", self.rotation_degrees());
        component::write_vec3(writer, "scale", self.scale);
    }
}

// ============================================================================
// Debug Adapters
// ============================================================================

fn debug_get_position(transform: &Transform) -> Vec3 {
    transform.position()
}

fn debug_set_position(transform: &mut Transform, position: Vec3) {
    transform.set_position(position);
}

fn debug_get_rotation(transform: &Transform) -> Vec3 {
    transform.rotation_degrees()
}

fn debug_set_rotation(transform: &mut Transform, degrees: Vec3) {
    transform.set_rotation(degrees);
}

fn debug_get_scale(transform: &Transform) -> Vec3 {
    transform.scale()
}

fn debug_set_scale(transform: &mut Transform, scale: Vec3) {
    transform.set_scale(scale);
}

//! An entity/component scene graph built in Rust
//!
//! This crate provides:
//! - Entities owning polymorphic components, addressed by generation-checked handles
//! - A component registry for creating, loading and saving components by type name
//! - A cached Transform component (position, rotation, scale, world matrix)
//! - A debug inspector that edits component fields without knowing their types
//! - Scene persistence to JSON and RON

pub mod core;
pub mod ecs;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{
        DebugInspector, FieldKind, FieldValue, Scene, SceneConfig, SceneDocument, SceneError,
    };
    pub use crate::ecs::{
        Component, ComponentRegistry, ComponentType, Entity, EntityId, MeshRenderComponent,
        Transform,
    };
    pub use glam::{Mat4, Vec3};
}

//! Entity Component System module
//!
//! Entities are stored in a hecs world and own their components as trait
//! objects. Components are created and persisted by type name through the
//! [`ComponentRegistry`].

pub mod component;
mod entity;
mod mesh_render;
mod registry;
mod transform;
mod world;

pub use component::{AsAny, Component, ComponentError, ComponentType};
pub use entity::{Entity, EntityError, EntityId};
pub use mesh_render::MeshRenderComponent;
pub use registry::{
    ComponentFactory, ComponentLoader, ComponentRegistry, ComponentSaver, DebugInstaller,
    RegistryError,
};
pub use transform::Transform;
pub use world::World;

//! Core scene module
//!
//! Contains the Scene, its configuration and the debug inspector

pub mod config;
pub mod debug;
pub mod scene;

pub use config::SceneConfig;
pub use debug::{
    DebugError, DebugHooks, DebugInspector, DebugTarget, DebugVariable, FieldKind, FieldValue,
};
pub use scene::{ComponentDocument, EntityDocument, Scene, SceneDocument, SceneError};

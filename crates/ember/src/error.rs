//! Error types.
//!
//! Two families, matching how failures are treated at runtime:
//!
//! - [`EcsError`] describes *programmer errors*: asking for a component or a
//!   system that was never stored. The panicking accessors
//!   ([`ComponentStore::get`](crate::ecs::ComponentStore::get),
//!   [`SystemRegistry::get`](crate::ecs::SystemRegistry::get)) format one of
//!   these into their panic message; the `fetch`-style accessors hand it back.
//! - [`AssetError`] describes *recoverable* load failures. The resource
//!   system logs them and substitutes a fallback so the frame keeps going.

use std::path::PathBuf;

use crate::ecs::Entity;

/// Lookup failures inside the ECS core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// No entity has ever stored a component of this type, so its sub-table
    /// does not exist.
    #[error("component type `{type_name}` has no storage (never inserted)")]
    ComponentTypeNotRegistered { type_name: &'static str },

    /// The sub-table exists but this entity has no entry in it.
    #[error("entity {entity} has no `{type_name}` component")]
    ComponentMissing {
        entity: Entity,
        type_name: &'static str,
    },

    /// `get::<T>()` on a system type that was never registered.
    #[error("system `{type_name}` not registered")]
    SystemNotRegistered { type_name: &'static str },

    /// A system was registered before one of its declared dependencies.
    #[error("system `{system}` registered before its dependency `{dependency}`")]
    MissingDependency {
        system: &'static str,
        dependency: &'static str,
    },
}

/// Failures while loading meshes, textures, materials or shaders from disk.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse OBJ '{}': {reason}", path.display())]
    Obj { path: PathBuf, reason: String },

    #[error("failed to decode image '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("mesh '{}' contains no geometry", path.display())]
    EmptyMesh { path: PathBuf },

    #[error("material directory '{}' does not exist", path.display())]
    NotADirectory { path: PathBuf },
}

/// Failures while reading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecs_error_messages_name_the_type() {
        let err = EcsError::ComponentTypeNotRegistered { type_name: "Light" };
        assert_eq!(
            err.to_string(),
            "component type `Light` has no storage (never inserted)"
        );

        let err = EcsError::SystemNotRegistered {
            type_name: "CameraSystem",
        };
        assert!(err.to_string().contains("CameraSystem"));
    }

    #[test]
    fn asset_error_includes_path() {
        let err = AssetError::EmptyMesh {
            path: PathBuf::from("models/empty.obj"),
        };
        assert!(err.to_string().contains("models/empty.obj"));
    }
}

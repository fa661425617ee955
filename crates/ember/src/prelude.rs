//! Convenience re-exports: `use ember::prelude::*` for the common items.

pub use crate::app::Engine;
pub use crate::asset::{
    Material, MaterialHandle, Mesh, MeshHandle, ResourceSystem, Shader, ShaderHandle, TextureHandle,
    TextureMap,
};
pub use crate::camera::{Camera, CameraSystem};
pub use crate::components::{Light, LightKind, Model, Name};
pub use crate::config::{CameraDefaults, EngineConfig, ShaderPaths};
pub use crate::ecs::{ComponentStore, Entity, System, SystemRegistry, World};
pub use crate::error::{AssetError, ConfigError, EcsError};
pub use crate::input::{Action, InputSystem, KeyCode, MouseButton};
pub use crate::light::LightSystem;
pub use crate::math::{Mat3, Mat4, Quat, Transform, Vec2, Vec3};
pub use crate::render::{RecordingRenderer, RenderSystem, Renderer};
pub use crate::time::TimeSystem;
pub use crate::ui::{SceneStats, StatsPanel, UiPanel};

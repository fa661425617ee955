//! Engine configuration.
//!
//! [`EngineConfig`] is plain serde data. Every field has a default, so a
//! JSON file only needs the keys it wants to change:
//!
//! ```json
//! { "screen_width": 1920, "camera": { "move_speed": 5.0 } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Vertex and fragment source locations of one shader program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Tuning for newly created cameras.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDefaults {
    /// World units per second.
    pub move_speed: f32,
    /// Degrees of rotation per unit of mouse motion.
    pub mouse_sensitivity: f32,
    /// Divides mouse motion; values above 1 slow rotation down.
    pub smooth_factor: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            mouse_sensitivity: 0.1,
            smooth_factor: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub shadow_map_size: u32,
    pub base_shader: ShaderPaths,
    pub shadow_shader: ShaderPaths,
    pub camera: CameraDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 720,
            shadow_map_size: 2048,
            base_shader: ShaderPaths::new("shaders/base.vert", "shaders/base.frag"),
            shadow_shader: ShaderPaths::new("shaders/shadow.vert", "shaders/shadow.frag"),
            camera: CameraDefaults::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    /// Width over height, guarding against a zero height.
    pub fn aspect_ratio(&self) -> f32 {
        self.screen_width as f32 / self.screen_height.max(1) as f32
    }
}

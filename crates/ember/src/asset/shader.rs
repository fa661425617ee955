//! # Shader: Sources and Uniform State
//!
//! Compiling GLSL/WGSL is the renderer backend's job. What the engine core
//! owns is the *description* of a shader program (its two source files) and
//! the uniform values systems want bound when it is used. The renderer reads
//! [`Shader::uniforms`] when it binds the program.
//!
//! A shader whose sources could not be read stays registered under its
//! handle but reports [`Shader::is_valid`] `== false`; the render system
//! skips drawing with it. That is the "fails silently into a non-rendering
//! entity" behaviour: logged once at load, invisible afterwards.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::math::{Mat3, Mat4, Vec3};

/// Handle to a shader owned by the [`ResourceSystem`](super::ResourceSystem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub(crate) u32);

impl ShaderHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ShaderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader:{}", self.0)
    }
}

/// A value bound to a named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// Something uniforms can be written into.
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_mat3(&mut self, name: &str, value: Mat3) {
        self.set_uniform(name, UniformValue::Mat3(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }
}

/// A vertex + fragment program description with its pending uniforms.
#[derive(Debug, Clone, Default)]
pub struct Shader {
    vertex_path: PathBuf,
    fragment_path: PathBuf,
    vertex_source: String,
    fragment_source: String,
    uniforms: HashMap<String, UniformValue>,
    valid: bool,
}

impl Shader {
    /// Read both stages from disk.
    pub fn from_files(vertex_path: &Path, fragment_path: &Path) -> Result<Self, AssetError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| AssetError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let vertex_source = read(vertex_path)?;
        let fragment_source = read(fragment_path)?;
        Ok(Self::from_sources(vertex_source, fragment_source)
            .with_paths(vertex_path, fragment_path))
    }

    /// Build from in-memory sources. Empty sources produce an invalid shader.
    pub fn from_sources(
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        let vertex_source = vertex_source.into();
        let fragment_source = fragment_source.into();
        let valid = !vertex_source.trim().is_empty() && !fragment_source.trim().is_empty();
        Self {
            vertex_source,
            fragment_source,
            valid,
            ..Self::default()
        }
    }

    /// A shader that never renders. Used as the lookup fallback and in place
    /// of shaders that failed to load.
    pub fn invalid() -> Self {
        Self::default()
    }

    fn with_paths(mut self, vertex_path: &Path, fragment_path: &Path) -> Self {
        self.vertex_path = vertex_path.to_path_buf();
        self.fragment_path = fragment_path.to_path_buf();
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn vertex_path(&self) -> &Path {
        &self.vertex_path
    }

    pub fn fragment_path(&self) -> &Path {
        &self.fragment_path
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.uniforms.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl UniformSink for Shader {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if let Some(slot) = self.uniforms.get_mut(name) {
            *slot = value;
        } else {
            self.uniforms.insert(name.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_make_a_valid_shader() {
        let shader = Shader::from_sources("void main() {}", "void main() {}");
        assert!(shader.is_valid());
        assert!(!Shader::from_sources("", "void main() {}").is_valid());
        assert!(!Shader::invalid().is_valid());
    }

    #[test]
    fn uniforms_overwrite() {
        let mut shader = Shader::from_sources("v", "f");
        shader.set_int("numLights", 1);
        shader.set_int("numLights", 3);
        shader.set_vec3("lights[0].color", Vec3::ONE);
        assert_eq!(shader.uniform("numLights"), Some(UniformValue::Int(3)));
        assert_eq!(
            shader.uniform("lights[0].color"),
            Some(UniformValue::Vec3(Vec3::ONE))
        );
        assert_eq!(shader.uniforms().count(), 2);
        assert_eq!(shader.uniform("missing"), None);
    }

    #[test]
    fn from_files_reports_missing_stage() {
        let (vert, frag) = (Path::new("/nope/base.vert"), Path::new("/nope/base.frag"));
        let err = Shader::from_files(vert, frag).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn from_files_reads_both_stages() {
        let dir = std::env::temp_dir().join(format!("ember-shader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let vert = dir.join("base.vert");
        let frag = dir.join("base.frag");
        std::fs::write(&vert, "#version 330 core\nvoid main() {}\n").unwrap();
        std::fs::write(&frag, "#version 330 core\nout vec4 c;\nvoid main() {}\n").unwrap();

        let shader = Shader::from_files(&vert, &frag).unwrap();
        assert!(shader.is_valid());
        assert!(shader.fragment_source().contains("out vec4"));
        assert_eq!(shader.vertex_path(), vert.as_path());
    }
}

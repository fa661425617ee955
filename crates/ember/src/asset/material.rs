//! # Material: Texture Maps and Shading Parameters
//!
//! A [`Material`] is four texture handles (diffuse, specular, normal,
//! emission), a shininess exponent, and the shader to draw with.
//!
//! ## Directory Convention
//!
//! [`ResourceSystem::load_material`](super::ResourceSystem::load_material)
//! reads a directory and looks for each map by base name, probing the
//! extensions in [`TEXTURE_EXTENSIONS`] in order:
//!
//! ```text
//! textures/crate/
//!   diffuse.png    ← found, loaded
//!   specular.jpg   ← found, loaded
//!   (no normal.*)  ← flat-normal fallback (128,128,255)
//!   (no emission.*)← black fallback
//! ```
//!
//! A map file that exists but fails to decode becomes magenta instead, so it
//! stands out on screen.

use std::path::{Path, PathBuf};

use super::shader::ShaderHandle;
use super::texture::TextureHandle;

/// Extensions probed, in order, for each texture map.
pub const TEXTURE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tga"];

/// Shininess of the built-in default material.
pub const DEFAULT_SHININESS: f32 = 16.0;

/// Shininess of materials loaded from a texture directory.
pub const LOADED_SHININESS: f32 = 32.0;

/// One of the four texture slots of a [`Material`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureMap {
    Diffuse,
    Specular,
    Normal,
    Emission,
}

impl TextureMap {
    pub const ALL: [Self; 4] = [Self::Diffuse, Self::Specular, Self::Normal, Self::Emission];

    /// File base name looked up inside a material directory.
    pub fn base_name(self) -> &'static str {
        match self {
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
            Self::Normal => "normal",
            Self::Emission => "emission",
        }
    }

    /// Colour of the 1x1 texture used when this map is absent.
    pub fn fallback_color(self) -> [u8; 3] {
        match self {
            Self::Diffuse => [128, 128, 128],
            Self::Specular => [64, 64, 64],
            Self::Normal => [128, 128, 255],
            Self::Emission => [0, 0, 0],
        }
    }
}

/// Surface description referenced by submeshes through a
/// [`MaterialHandle`](super::MaterialHandle).
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: TextureHandle,
    pub specular: TextureHandle,
    pub normal: TextureHandle,
    pub emission: TextureHandle,
    pub shininess: f32,
    /// `None` draws with the render system's base shader.
    pub shader: Option<ShaderHandle>,
}

impl Material {
    pub fn texture(&self, map: TextureMap) -> TextureHandle {
        match map {
            TextureMap::Diffuse => self.diffuse,
            TextureMap::Specular => self.specular,
            TextureMap::Normal => self.normal,
            TextureMap::Emission => self.emission,
        }
    }

    pub fn set_texture(&mut self, map: TextureMap, handle: TextureHandle) {
        match map {
            TextureMap::Diffuse => self.diffuse = handle,
            TextureMap::Specular => self.specular = handle,
            TextureMap::Normal => self.normal = handle,
            TextureMap::Emission => self.emission = handle,
        }
    }
}

/// Find `<dir>/<base>.<ext>` for the first extension that exists on disk.
pub fn probe_texture(dir: &Path, base: &str) -> Option<PathBuf> {
    TEXTURE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{base}.{ext}")))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_respects_extension_order() {
        let dir = std::env::temp_dir().join(format!("ember-probe-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("diffuse.jpg"), b"x").unwrap();
        std::fs::write(dir.join("diffuse.tga"), b"x").unwrap();

        assert_eq!(
            probe_texture(&dir, "diffuse"),
            Some(dir.join("diffuse.jpg"))
        );
        assert_eq!(probe_texture(&dir, "normal"), None);
    }

    #[test]
    fn texture_slots_round_trip() {
        let mut material = Material {
            diffuse: TextureHandle(1),
            specular: TextureHandle(2),
            normal: TextureHandle(3),
            emission: TextureHandle(4),
            shininess: DEFAULT_SHININESS,
            shader: None,
        };
        material.set_texture(TextureMap::Normal, TextureHandle(9));
        assert_eq!(material.texture(TextureMap::Normal), TextureHandle(9));
        assert_eq!(material.texture(TextureMap::Diffuse), TextureHandle(1));
    }

    #[test]
    fn fallback_colours() {
        assert_eq!(TextureMap::Normal.fallback_color(), [128, 128, 255]);
        assert_eq!(TextureMap::Emission.fallback_color(), [0, 0, 0]);
        assert_eq!(TextureMap::ALL.len(), 4);
    }
}

//! # Texture: CPU-Side Image Data
//!
//! Textures are decoded with the `image` crate into tightly packed RGBA8 and
//! kept here; uploading them to the GPU is the renderer's business.
//!
//! ## Path Cache
//!
//! [`TextureStore::load`] keys by path. Asking twice for the same file
//! returns the same [`TextureHandle`] and decodes the image once.
//!
//! ## Fallbacks
//!
//! Entry 0 is always a 1x1 **magenta** pixel. Anything that fails to load
//! resolves to it, so a broken asset is loud on screen but never fatal.
//! Solid-colour textures (the PBR fallback set used by materials) are cached
//! by colour so every material shares the same four 1x1 entries.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::AssetError;

/// The "missing texture" colour.
pub const MAGENTA: [u8; 3] = [255, 0, 255];

/// Handle to a texture in the [`TextureStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    /// The magenta fallback texture.
    pub const MISSING: Self = Self(0);

    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture:{}", self.0)
    }
}

/// Decoded RGBA8 image data.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Texture {
    /// A 1x1 opaque texture of the given colour.
    pub fn solid(rgb: [u8; 3]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![rgb[0], rgb[1], rgb[2], 255],
        }
    }

    /// Decode an image file. Rows are flipped so that V=0 is the bottom row,
    /// matching OBJ texture coordinates.
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let img = image::open(path).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let img = img.flipv().to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            data: img.into_raw(),
        })
    }

    /// RGBA of the pixel at `(x, y)` in storage order.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Stores every loaded texture. Pre-populated with the magenta fallback.
pub(crate) struct TextureStore {
    entries: Vec<Texture>,
    path_cache: HashMap<PathBuf, TextureHandle>,
    solid_cache: HashMap<[u8; 3], TextureHandle>,
}

impl TextureStore {
    pub fn new() -> Self {
        let mut store = Self {
            entries: Vec::new(),
            path_cache: HashMap::new(),
            solid_cache: HashMap::new(),
        };
        let missing = store.solid(MAGENTA);
        debug_assert_eq!(missing, TextureHandle::MISSING);
        store
    }

    fn push(&mut self, texture: Texture) -> TextureHandle {
        let handle = TextureHandle(self.entries.len() as u32);
        self.entries.push(texture);
        handle
    }

    /// A cached 1x1 texture of the given colour.
    pub fn solid(&mut self, rgb: [u8; 3]) -> TextureHandle {
        if let Some(&handle) = self.solid_cache.get(&rgb) {
            return handle;
        }
        let handle = self.push(Texture::solid(rgb));
        self.solid_cache.insert(rgb, handle);
        handle
    }

    /// Load a texture by path, reusing the cached handle if this path was
    /// loaded before. Failures are not cached.
    pub fn try_load(&mut self, path: &Path) -> Result<TextureHandle, AssetError> {
        if let Some(&handle) = self.path_cache.get(path) {
            return Ok(handle);
        }
        let texture = Texture::from_file(path)?;
        log::debug!(
            "Loaded texture '{}' ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        let handle = self.push(texture);
        self.path_cache.insert(path.to_path_buf(), handle);
        Ok(handle)
    }

    /// Like [`try_load`](Self::try_load), but logs the failure and returns the
    /// magenta fallback instead.
    pub fn load(&mut self, path: &Path) -> TextureHandle {
        match self.try_load(path) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("{e}. Using magenta fallback.");
                TextureHandle::MISSING
            }
        }
    }

    /// Get a texture. Unknown handles resolve to the magenta fallback.
    pub fn get(&self, handle: TextureHandle) -> &Texture {
        self.entries
            .get(handle.0 as usize)
            .unwrap_or(&self.entries[TextureHandle::MISSING.0 as usize])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ember-tex-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn entry_zero_is_magenta() {
        let store = TextureStore::new();
        let tex = store.get(TextureHandle::MISSING);
        assert_eq!(tex.pixel(0, 0), [255, 0, 255, 255]);
    }

    #[test]
    fn solid_colours_are_shared() {
        let mut store = TextureStore::new();
        let a = store.solid([1, 2, 3]);
        let b = store.solid([1, 2, 3]);
        assert_eq!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.solid(MAGENTA), TextureHandle::MISSING);
    }

    #[test]
    fn same_path_loads_once() {
        let dir = scratch_dir("cache");
        let path = dir.join("checker.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let mut store = TextureStore::new();
        let first = store.load(&path);
        let count = store.len();
        let second = store.load(&path);
        assert_eq!(first, second);
        assert_ne!(first, TextureHandle::MISSING);
        assert_eq!(store.len(), count);
        assert_eq!(store.get(first).pixel(1, 1), [10, 20, 30, 255]);
    }

    #[test]
    fn missing_file_falls_back_to_magenta() {
        let mut store = TextureStore::new();
        let handle = store.load(Path::new("/definitely/not/here.png"));
        assert_eq!(handle, TextureHandle::MISSING);
        let missing = Path::new("/definitely/not/here.png");
        assert!(store.try_load(missing).is_err());
    }

    #[test]
    fn unknown_handle_resolves_to_fallback() {
        let store = TextureStore::new();
        assert_eq!(store.get(TextureHandle(99)).pixel(0, 0), [255, 0, 255, 255]);
    }

    #[test]
    fn from_file_flips_rows() {
        let dir = scratch_dir("flip");
        let path = dir.join("gradient.png");
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let tex = Texture::from_file(&path).unwrap();
        assert_eq!(tex.pixel(0, 0), [0, 0, 255, 255]);
        assert_eq!(tex.pixel(0, 1), [255, 0, 0, 255]);
    }
}

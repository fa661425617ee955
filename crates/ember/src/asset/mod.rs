//! # Resource System: Handle-Indexed Asset Ownership
//!
//! Meshes, materials, shaders and textures are heavyweight and shared. Rather
//! than embedding them in components, the [`ResourceSystem`] owns every one
//! of them and hands out small `Copy` handles. A [`Model`](crate::components::Model)
//! component is just a mesh handle plus one material handle per submesh.
//!
//! ```text
//!  Model { mesh: mesh:1, materials: [material:2, material:2] }
//!                  │                      │           │
//!                  ▼                      └─────┬─────┘
//!  ResourceSystem  meshes[1]        materials[2]  (shared by two submeshes)
//!                                         │
//!                                         ▼
//!                                  textures (path-cached)
//! ```
//!
//! ## Reserved Handles
//!
//! Handle counters start at 1. Material handle 0 is the **default material**:
//! created with the registry, built from the fallback texture set, and never
//! removable. Newly spawned submeshes with no material point at it.
//!
//! ## Missing Handles
//!
//! Looking up a handle that is not (or no longer) loaded is not fatal. The
//! lookup logs an error and returns a fallback: an empty mesh, the default
//! material, an invalid (non-rendering) shader, or the magenta texture. The
//! frame keeps rendering with visibly wrong output instead of aborting.
//!
//! ## Copy-on-Write Materials
//!
//! Submeshes of one model may share a material handle. Before editing a
//! submesh's material, [`ResourceSystem::make_unique`] counts how many
//! siblings reference the same handle. If it is shared (or is the default
//! material), the material is cloned into a fresh handle and only that
//! submesh is repointed:
//!
//! ```text
//! before: [m2, m2, m2]   edit submesh 1
//! after:  [m2, m5, m2]   m5 = clone of m2, then mutated
//! ```
//!
//! The share count is a linear scan over the sibling list, so an edit costs
//! O(submeshes).

pub mod material;
pub mod mesh;
pub mod shader;
pub mod texture;

use std::collections::HashMap;
use std::path::Path;

pub use material::{Material, TextureMap};
pub use mesh::{Mesh, MeshHandle, MeshLoader, ObjLoader, Submesh, Vertex};
pub use shader::{Shader, ShaderHandle, UniformSink, UniformValue};
pub use texture::{Texture, TextureHandle};

use crate::ecs::System;
use crate::error::AssetError;
use material::{DEFAULT_SHININESS, LOADED_SHININESS};
use texture::TextureStore;

/// Handle to a material owned by the [`ResourceSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub(crate) u32);

impl MaterialHandle {
    /// The built-in default material. Always valid, never unloaded.
    pub const DEFAULT: Self = Self(0);

    pub fn id(self) -> u32 {
        self.0
    }

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

impl std::fmt::Display for MaterialHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "material:{}", self.0)
    }
}

/// How many entries of `handles` reference `handle`.
pub fn share_count(handles: &[MaterialHandle], handle: MaterialHandle) -> usize {
    handles.iter().filter(|&&h| h == handle).count()
}

/// Owner of every mesh, material, shader and texture.
pub struct ResourceSystem {
    meshes: HashMap<MeshHandle, Mesh>,
    materials: HashMap<MaterialHandle, Material>,
    shaders: HashMap<ShaderHandle, Shader>,
    textures: TextureStore,
    next_mesh: u32,
    next_material: u32,
    next_shader: u32,
    loader: Box<dyn MeshLoader>,
    fallback_mesh: Mesh,
    fallback_shader: Shader,
}

impl System for ResourceSystem {}

impl ResourceSystem {
    /// A registry that reads meshes as Wavefront OBJ.
    pub fn new() -> Self {
        Self::with_loader(Box::new(ObjLoader))
    }

    /// A registry that reads meshes through a custom loader.
    pub fn with_loader(loader: Box<dyn MeshLoader>) -> Self {
        let mut textures = TextureStore::new();
        let mut materials = HashMap::new();
        materials.insert(MaterialHandle::DEFAULT, fallback_material(&mut textures));

        Self {
            meshes: HashMap::new(),
            materials,
            shaders: HashMap::new(),
            textures,
            next_mesh: 1,
            next_material: 1,
            next_shader: 1,
            loader,
            fallback_mesh: Mesh::default(),
            fallback_shader: Shader::invalid(),
        }
    }

    // ---- meshes ----

    /// Load a mesh file into a new handle.
    pub fn load_mesh(&mut self, path: impl AsRef<Path>) -> Result<MeshHandle, AssetError> {
        let path = path.as_ref();
        let mesh = self.loader.load(path).inspect_err(|e| log::error!("{e}"))?;
        let handle = self.insert_mesh(mesh);
        log::info!("Loaded mesh '{}' as {handle}", path.display());
        Ok(handle)
    }

    /// Take ownership of an already built mesh.
    pub fn insert_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(handle, mesh);
        handle
    }

    /// The mesh for `handle`, or the empty fallback mesh if it is not loaded.
    pub fn mesh(&self, handle: MeshHandle) -> &Mesh {
        self.meshes.get(&handle).unwrap_or_else(|| {
            log::error!("Mesh {handle} not found. Using empty fallback mesh.");
            &self.fallback_mesh
        })
    }

    pub fn has_mesh(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(&handle)
    }

    /// Free a mesh. Returns `false` if the handle was not loaded.
    pub fn unload_mesh(&mut self, handle: MeshHandle) -> bool {
        let removed = self.meshes.remove(&handle).is_some();
        if removed {
            log::debug!("Unloaded {handle}");
        }
        removed
    }

    // ---- materials ----

    /// A new material with the fallback texture set.
    pub fn create_material(&mut self) -> MaterialHandle {
        let material = fallback_material(&mut self.textures);
        self.insert_material(material)
    }

    /// Take ownership of an already built material.
    pub fn insert_material(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.next_material);
        self.next_material += 1;
        self.materials.insert(handle, material);
        handle
    }

    /// Build a material from a texture directory.
    ///
    /// Each map is looked up as `<dir>/<map>.<ext>`. Missing maps get their
    /// fallback colour; maps that exist but fail to decode become magenta.
    pub fn load_material(&mut self, dir: impl AsRef<Path>) -> Result<MaterialHandle, AssetError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            let err = AssetError::NotADirectory {
                path: dir.to_path_buf(),
            };
            log::error!("{err}");
            return Err(err);
        }

        let mut material = Material {
            diffuse: TextureHandle::MISSING,
            specular: TextureHandle::MISSING,
            normal: TextureHandle::MISSING,
            emission: TextureHandle::MISSING,
            shininess: LOADED_SHININESS,
            shader: None,
        };
        for map in TextureMap::ALL {
            let texture = match material::probe_texture(dir, map.base_name()) {
                Some(path) => self.textures.load(&path),
                None => {
                    log::debug!(
                        "No {} map in '{}'. Using fallback.",
                        map.base_name(),
                        dir.display()
                    );
                    self.textures.solid(map.fallback_color())
                }
            };
            material.set_texture(map, texture);
        }

        let handle = self.insert_material(material);
        log::info!("Loaded material '{}' as {handle}", dir.display());
        Ok(handle)
    }

    /// The material for `handle`, or the default material if it is not loaded.
    pub fn material(&self, handle: MaterialHandle) -> &Material {
        self.materials.get(&handle).unwrap_or_else(|| {
            log::error!("Material {handle} not found. Using default material.");
            &self.materials[&MaterialHandle::DEFAULT]
        })
    }

    /// Mutable access to a loaded material. Editing the default material
    /// changes every submesh that still points at it; use
    /// [`make_unique`](Self::make_unique) to edit a single submesh.
    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(&handle)
    }

    pub fn has_material(&self, handle: MaterialHandle) -> bool {
        self.materials.contains_key(&handle)
    }

    /// Free a material. The default material is never freed.
    pub fn unload_material(&mut self, handle: MaterialHandle) -> bool {
        if handle.is_default() {
            log::error!("Refusing to unload the default material ({handle}).");
            return false;
        }
        let removed = self.materials.remove(&handle).is_some();
        if removed {
            log::debug!("Unloaded {handle}");
        }
        removed
    }

    /// Load one texture into one slot of a material. On failure the slot
    /// keeps its previous texture and `false` is returned.
    pub fn set_material_texture(
        &mut self,
        handle: MaterialHandle,
        map: TextureMap,
        path: impl AsRef<Path>,
    ) -> bool {
        if !self.materials.contains_key(&handle) {
            log::error!(
                "Material {handle} not found. Cannot set {} map.",
                map.base_name()
            );
            return false;
        }
        let texture = match self.textures.try_load(path.as_ref()) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{e}. Keeping previous {} map.", map.base_name());
                return false;
            }
        };
        if let Some(material) = self.materials.get_mut(&handle) {
            material.set_texture(map, texture);
        }
        true
    }

    /// Make `handles[index]` point at a material no sibling shares.
    ///
    /// If the handle is the default material or appears more than once in
    /// `handles`, its material is cloned into a fresh handle and
    /// `handles[index]` is repointed. Returns the handle now safe to mutate,
    /// or `None` if `index` is out of range.
    pub fn make_unique(
        &mut self,
        handles: &mut [MaterialHandle],
        index: usize,
    ) -> Option<MaterialHandle> {
        let current = *handles.get(index)?;
        if !current.is_default() && share_count(handles, current) <= 1 {
            return Some(current);
        }

        let copy = self.material(current).clone();
        let fresh = self.insert_material(copy);
        handles[index] = fresh;
        log::debug!("Copied {current} to {fresh} for submesh {index}");
        Some(fresh)
    }

    // ---- shaders ----

    /// Read a shader program. A program that cannot be read is still stored
    /// under the returned handle, flagged invalid, so it never draws.
    pub fn load_shader(
        &mut self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> ShaderHandle {
        let shader = match Shader::from_files(vertex_path.as_ref(), fragment_path.as_ref()) {
            Ok(shader) => shader,
            Err(e) => {
                log::error!("{e}. Shader will not render.");
                Shader::invalid()
            }
        };
        let handle = self.insert_shader(shader);
        log::info!(
            "Loaded shader '{}' + '{}' as {handle}",
            vertex_path.as_ref().display(),
            fragment_path.as_ref().display()
        );
        handle
    }

    /// Take ownership of an already built shader.
    pub fn insert_shader(&mut self, shader: Shader) -> ShaderHandle {
        let handle = ShaderHandle(self.next_shader);
        self.next_shader += 1;
        self.shaders.insert(handle, shader);
        handle
    }

    /// The shader for `handle`, or an invalid fallback if it is not loaded.
    pub fn shader(&self, handle: ShaderHandle) -> &Shader {
        self.shaders.get(&handle).unwrap_or_else(|| {
            log::error!("Shader {handle} not found. Using invalid fallback shader.");
            &self.fallback_shader
        })
    }

    pub fn shader_mut(&mut self, handle: ShaderHandle) -> Option<&mut Shader> {
        self.shaders.get_mut(&handle)
    }

    pub fn unload_shader(&mut self, handle: ShaderHandle) -> bool {
        let removed = self.shaders.remove(&handle).is_some();
        if removed {
            log::debug!("Unloaded {handle}");
        }
        removed
    }

    // ---- textures ----

    /// Load a texture, cached by path. Failures log and return the magenta
    /// fallback.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> TextureHandle {
        self.textures.load(path.as_ref())
    }

    /// Like [`load_texture`](Self::load_texture) but hands back the error.
    pub fn try_load_texture(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<TextureHandle, AssetError> {
        self.textures.try_load(path.as_ref())
    }

    pub fn texture(&self, handle: TextureHandle) -> &Texture {
        self.textures.get(handle)
    }

    // ---- statistics ----

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of materials, including the default material.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Number of textures, including the fallback set.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

/// A material made of the per-map fallback colours.
fn fallback_material(textures: &mut TextureStore) -> Material {
    let mut material = Material {
        diffuse: TextureHandle::MISSING,
        specular: TextureHandle::MISSING,
        normal: TextureHandle::MISSING,
        emission: TextureHandle::MISSING,
        shininess: DEFAULT_SHININESS,
        shader: None,
    };
    for map in TextureMap::ALL {
        material.set_texture(map, textures.solid(map.fallback_color()));
    }
    material
}

impl Default for ResourceSystem {
    fn default() -> Self {
        Self::new()
    }
}

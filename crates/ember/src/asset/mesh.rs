//! # Mesh: Vertex Data and Submeshes
//!
//! A [`Mesh`] is CPU-side geometry: one vertex array, one flat index array,
//! and a list of [`Submesh`] ranges into the index array. Each submesh is
//! drawn with its own material, which is why a
//! [`Model`](crate::components::Model) keeps one material handle per submesh.
//!
//! ```text
//! indices:   [0 1 2 3 4 5 | 6 7 8 9 10 11 12 13 14]
//! submeshes:  {start 0, count 6}  {start 6, count 9}
//! ```
//!
//! ## Loading
//!
//! Files are read through the [`MeshLoader`] trait so tests and tools can
//! supply geometry without touching disk. The default [`ObjLoader`] reads
//! Wavefront OBJ with `tobj`: faces are triangulated, every `o`/`g` block
//! becomes one submesh, and texture V is flipped to match the bottom-up
//! texture rows produced by [`Texture::from_file`](super::texture::Texture::from_file).

use std::fmt;
use std::path::Path;

use crate::error::AssetError;

/// Handle to a mesh owned by the [`ResourceSystem`](super::ResourceSystem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub(crate) u32);

impl MeshHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh:{}", self.0)
    }
}

/// Interleaved vertex layout: position, normal, texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// A contiguous range of the mesh's index array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submesh {
    pub index_start: u32,
    pub index_count: u32,
}

impl Submesh {
    pub const fn new(index_start: u32, index_count: u32) -> Self {
        Self {
            index_start,
            index_count,
        }
    }
}

/// Geometry ready to hand to a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    submeshes: Vec<Submesh>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, submeshes: Vec<Submesh>) -> Self {
        Self {
            vertices,
            indices,
            submeshes,
        }
    }

    /// A mesh with a single submesh covering every index.
    pub fn single(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let submesh = Submesh {
            index_start: 0,
            index_count: indices.len() as u32,
        };
        Self::new(vertices, indices, vec![submesh])
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// `true` for the fallback mesh and anything else with nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The slice of indices belonging to `submesh`.
    pub fn submesh_indices(&self, submesh: &Submesh) -> &[u32] {
        let start = submesh.index_start as usize;
        let end = start + submesh.index_count as usize;
        &self.indices[start.min(self.indices.len())..end.min(self.indices.len())]
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Produces a [`Mesh`] from a file.
pub trait MeshLoader {
    fn load(&self, path: &Path) -> Result<Mesh, AssetError>;
}

/// Wavefront OBJ loader backed by `tobj`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    fn load(&self, path: &Path) -> Result<Mesh, AssetError> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        // Material libraries are ignored; materials come from texture directories.
        let (models, _materials) =
            tobj::load_obj(path, &options).map_err(|e| AssetError::Obj {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut submeshes = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;
            let index_start = indices.len() as u32;

            for i in 0..mesh.positions.len() / 3 {
                let normal = if mesh.normals.len() >= i * 3 + 3 {
                    [mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]]
                } else {
                    [0.0; 3]
                };
                let uv = if mesh.texcoords.len() >= i * 2 + 2 {
                    [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0; 2]
                };
                vertices.push(Vertex {
                    position: [
                        mesh.positions[i * 3],
                        mesh.positions[i * 3 + 1],
                        mesh.positions[i * 3 + 2],
                    ],
                    normal,
                    uv,
                });
            }

            indices.extend(mesh.indices.iter().map(|&i| base + i));
            let index_count = indices.len() as u32 - index_start;
            if index_count > 0 {
                submeshes.push(Submesh {
                    index_start,
                    index_count,
                });
            }
        }

        if indices.is_empty() {
            return Err(AssetError::EmptyMesh {
                path: path.to_path_buf(),
            });
        }

        log::debug!(
            "Loaded OBJ '{}': {} vertices, {} submeshes",
            path.display(),
            vertices.len(),
            submeshes.len()
        );
        Ok(Mesh::new(vertices, indices, submeshes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TRIANGLES: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 0.25
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
o second
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
vn 0 0 1
f 4//2 5//2 6//2 7//2
";

    fn write_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ember-mesh-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn obj_shapes_become_submeshes() {
        let path = write_obj("two.obj", TWO_TRIANGLES);
        let mesh = ObjLoader.load(&path).unwrap();

        // Triangle + triangulated quad.
        assert_eq!(mesh.submeshes().len(), 2);
        assert_eq!(mesh.submeshes()[0], Submesh::new(0, 3));
        assert_eq!(mesh.submeshes()[1], Submesh::new(3, 6));
        assert_eq!(mesh.index_count(), 9);

        let second = mesh.submesh_indices(&mesh.submeshes()[1]);
        assert!(second.iter().all(|&i| (i as usize) < mesh.vertices().len()));
        assert!(second.iter().all(|&i| i >= 3));
    }

    #[test]
    fn obj_texcoords_are_flipped() {
        let path = write_obj("flip.obj", TWO_TRIANGLES);
        let mesh = ObjLoader.load(&path).unwrap();
        let top = mesh
            .vertices()
            .iter()
            .find(|v| v.position == [0.0, 1.0, 0.0])
            .unwrap();
        assert_eq!(top.uv, [0.0, 0.75]);
        assert_eq!(top.normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_obj_is_an_error() {
        let err = ObjLoader.load(Path::new("/no/such/model.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Obj { .. }));
    }

    #[test]
    fn obj_without_faces_is_empty() {
        let path = write_obj("points.obj", "v 0 0 0\nv 1 0 0\n");
        let err = ObjLoader.load(&path).unwrap_err();
        assert!(matches!(err, AssetError::EmptyMesh { .. }));
    }

    #[test]
    fn single_covers_all_indices() {
        let mesh = Mesh::single(vec![Vertex::default(); 3], vec![0, 1, 2]);
        assert_eq!(mesh.submeshes(), &[Submesh::new(0, 3)]);
        assert_eq!(mesh.vertex_bytes().len(), 3 * std::mem::size_of::<Vertex>());
        assert!(Mesh::default().is_empty());
    }
}

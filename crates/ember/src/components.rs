//! Built-in component types.
//!
//! Components are plain data. [`Transform`](crate::math::Transform) lives in
//! [`math`](crate::math) and [`Camera`](crate::camera::Camera) next to the
//! system that drives it.

use crate::asset::{MaterialHandle, MeshHandle};
use crate::math::Vec3;

/// Display name of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A drawable mesh and one material per submesh.
///
/// `materials[i]` shades submesh `i`. Several entries may hold the same
/// handle; edit through
/// [`World::submesh_material_mut`](crate::ecs::World::submesh_material_mut)
/// so a shared material is copied first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub mesh: MeshHandle,
    pub materials: Vec<MaterialHandle>,
}

impl Model {
    /// Material for submesh `index`. Submeshes without an entry use the
    /// default material.
    pub fn material(&self, index: usize) -> MaterialHandle {
        self.materials
            .get(index)
            .copied()
            .unwrap_or(MaterialHandle::DEFAULT)
    }
}

/// Light type. The discriminant is the value uploaded as `lights[i].type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightKind {
    Directional = 0,
    #[default]
    Point = 1,
    Spot = 2,
}

/// A light source.
///
/// `position` matters for point and spot lights, `direction` for directional
/// and spot lights. Spot cutoffs are stored as cosines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub ambient: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl Light {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn directional(direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            direction,
            ..Self::default()
        }
    }

    pub fn point(position: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            ..Self::default()
        }
    }

    /// A spot light with cutoff angles given in degrees.
    pub fn spot(position: Vec3, direction: Vec3, inner_deg: f32, outer_deg: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            direction,
            ..Self::default()
        }
        .with_cutoff_degrees(inner_deg, outer_deg)
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_cutoff_degrees(mut self, inner_deg: f32, outer_deg: f32) -> Self {
        self.cut_off = inner_deg.to_radians().cos();
        self.outer_cut_off = outer_deg.to_radians().cos();
        self
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            intensity: 1.0,
            ambient: 0.2,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            cut_off: 12.5_f32.to_radians().cos(),
            outer_cut_off: 17.5_f32.to_radians().cos(),
        }
    }
}

//! # Scene: Entity-Level Create and Destroy
//!
//! Creating a scene object touches several places at once: the entity
//! registry, the component store, a category index kept by a system, and
//! possibly the resource system. These `impl World` methods do all of it in
//! one call.
//!
//! | Category | Components           | Index                          |
//! |----------|----------------------|--------------------------------|
//! | Camera   | `Camera`             | `CameraSystem` active camera   |
//! | Model    | `Name` `Transform` `Model` | `RenderSystem` render queue |
//! | Light    | `Name` `Light`       | `LightSystem` light index      |
//!
//! ## Destroy
//!
//! [`World::destroy_entity`] is the single way to tear an object down. It
//! removes the entity from every category index whether or not it still
//! carries the matching component, clears the active camera if needed, then
//! purges every component and releases the id. Destroying a dead entity does
//! nothing.

use std::path::Path;

use crate::asset::{Material, MaterialHandle, MeshHandle, ResourceSystem};
use crate::camera::CameraSystem;
use crate::components::{Light, Model, Name};
use crate::ecs::{Entity, World};
use crate::error::AssetError;
use crate::light::LightSystem;
use crate::math::{Transform, Vec3};
use crate::render::RenderSystem;

impl World {
    /// Spawn a camera and make it the active one. A previously active camera
    /// stays alive but is no longer driven.
    ///
    /// # Panics
    ///
    /// Panics if [`CameraSystem`] is not registered.
    pub fn create_camera(&mut self, position: Vec3, yaw: f32, pitch: f32, fov: f32) -> Entity {
        let camera = self
            .system::<CameraSystem>()
            .build_camera(position, yaw, pitch, fov);
        let entity = self.spawn_empty();
        self.components_mut().insert(entity, camera);
        self.system_mut::<CameraSystem>().set_active(entity);
        log::debug!("Created camera {entity}");
        entity
    }

    /// Load a mesh and a material directory, then spawn a model using them.
    /// Every submesh starts out sharing the loaded material.
    ///
    /// If either load fails nothing is spawned and no resource is leaked.
    ///
    /// # Panics
    ///
    /// Panics if [`ResourceSystem`] or [`RenderSystem`] is not registered.
    pub fn create_model(
        &mut self,
        name: &str,
        mesh_path: impl AsRef<Path>,
        material_dir: impl AsRef<Path>,
        transform: Transform,
    ) -> Result<Entity, AssetError> {
        let resources = self.system_mut::<ResourceSystem>();
        let mesh = resources.load_mesh(mesh_path)?;
        let material = match resources.load_material(material_dir) {
            Ok(material) => material,
            Err(e) => {
                resources.unload_mesh(mesh);
                return Err(e);
            }
        };
        let submeshes = resources.mesh(mesh).submeshes().len().max(1);

        let materials = vec![material; submeshes];
        Ok(self.spawn_model(name, mesh, materials, transform))
    }

    /// Spawn a model from already loaded handles.
    ///
    /// # Panics
    ///
    /// Panics if [`RenderSystem`] is not registered.
    pub fn spawn_model(
        &mut self,
        name: &str,
        mesh: MeshHandle,
        materials: Vec<MaterialHandle>,
        transform: Transform,
    ) -> Entity {
        let entity = self.spawn_empty();
        let components = self.components_mut();
        components.insert(entity, Name::new(name));
        components.insert(entity, transform);
        components.insert(entity, Model { mesh, materials });
        self.system_mut::<RenderSystem>().add(entity);
        log::debug!("Created model '{name}' as {entity}");
        entity
    }

    /// Spawn a light and append it to the light index.
    ///
    /// # Panics
    ///
    /// Panics if [`LightSystem`] is not registered.
    pub fn create_light(&mut self, name: &str, light: Light) -> Entity {
        let entity = self.spawn_empty();
        let components = self.components_mut();
        components.insert(entity, Name::new(name));
        components.insert(entity, light);
        let lights = self.system_mut::<LightSystem>();
        lights.add(entity);
        log::debug!(
            "Created {:?} light '{name}' as {entity} (slot {})",
            light.kind,
            lights.len() - 1
        );
        entity
    }

    /// Remove `entity` from every category index, purge its components and
    /// release its id. Returns `false` if it was not alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let systems = self.systems_mut();
        if let Some(lights) = systems.try_get_mut::<LightSystem>() {
            lights.remove(entity);
        }
        if let Some(render) = systems.try_get_mut::<RenderSystem>() {
            render.remove(entity);
        }
        if let Some(cameras) = systems.try_get_mut::<CameraSystem>()
            && cameras.active() == Some(entity)
        {
            cameras.clear_active();
        }

        self.purge(entity);
        log::debug!("Destroyed {entity}");
        true
    }

    /// The material of one submesh of a model, ready to edit.
    ///
    /// If the submesh shares its material with a sibling, or uses the default
    /// material, the material is copied into a new handle first, so the edit
    /// only affects this submesh. Returns `None` if the entity has no model
    /// or `index` is past the last submesh.
    pub fn submesh_material_mut(&mut self, entity: Entity, index: usize) -> Option<&mut Material> {
        let (components, systems) = self.split_mut();
        let model = components.try_get_mut::<Model>(entity)?;
        let resources = systems.try_get_mut::<ResourceSystem>()?;

        let submeshes = resources.mesh(model.mesh).submeshes().len();
        if index >= submeshes {
            return None;
        }
        if model.materials.len() < submeshes {
            model.materials.resize(submeshes, MaterialHandle::DEFAULT);
        }

        let handle = resources.make_unique(&mut model.materials, index)?;
        resources.material_mut(handle)
    }

    /// Point one submesh at an existing material, shared or not.
    pub fn set_submesh_material(
        &mut self,
        entity: Entity,
        index: usize,
        material: MaterialHandle,
    ) -> bool {
        let Some(model) = self.components_mut().try_get_mut::<Model>(entity) else {
            return false;
        };
        if model.materials.len() <= index {
            model.materials.resize(index + 1, MaterialHandle::DEFAULT);
        }
        model.materials[index] = material;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Mesh, Submesh, Vertex};
    use crate::camera::Camera;
    use crate::config::CameraDefaults;
    use crate::input::InputSystem;
    use crate::render::RecordingRenderer;

    fn world() -> World {
        let mut world = World::new();
        let systems = world.systems_mut();
        systems.insert(InputSystem::new()).unwrap();
        systems.insert(ResourceSystem::new()).unwrap();
        let renderer = Box::new(RecordingRenderer::new());
        systems.insert(RenderSystem::new(renderer, 800, 600)).unwrap();
        systems
            .insert(CameraSystem::new(CameraDefaults::default(), 4.0 / 3.0))
            .unwrap();
        systems.insert(LightSystem::new()).unwrap();
        world
    }

    fn three_part_mesh(world: &mut World) -> MeshHandle {
        world.system_mut::<ResourceSystem>().insert_mesh(Mesh::new(
            vec![Vertex::default(); 3],
            vec![0, 1, 2, 0, 1, 2, 0, 1, 2],
            vec![Submesh::new(0, 3), Submesh::new(3, 3), Submesh::new(6, 3)],
        ))
    }

    #[test]
    fn camera_becomes_active_and_front_is_computed() {
        let mut world = world();
        let first = world.create_camera(Vec3::ZERO, 0.0, 0.0, 90.0);
        let second = world.create_camera(Vec3::ONE, 90.0, 0.0, 60.0);

        assert_eq!(world.system::<CameraSystem>().active(), Some(second));
        assert!(world.is_alive(first));
        let cam = world.components().get::<Camera>(second);
        assert!((cam.front - Vec3::X).length() < 1e-5);
        assert_eq!(cam.aspect, 4.0 / 3.0);
    }

    #[test]
    fn destroying_active_camera_clears_it() {
        let mut world = world();
        let old = world.create_camera(Vec3::ZERO, 0.0, 0.0, 90.0);
        let active = world.create_camera(Vec3::ZERO, 0.0, 0.0, 90.0);

        world.destroy_entity(old);
        assert_eq!(world.system::<CameraSystem>().active(), Some(active));

        world.destroy_entity(active);
        assert_eq!(world.system::<CameraSystem>().active(), None);
    }

    #[test]
    fn light_lifecycle_updates_index() {
        let mut world = world();
        let a = world.create_light("a", Light::default());
        let b = world.create_light("b", Light::default());
        assert_eq!(world.system::<LightSystem>().slot_of(b), Some(1));

        assert!(world.destroy_entity(a));
        assert_eq!(world.system::<LightSystem>().lights(), &[b]);
        assert!(!world.components().has::<Light>(a));
        assert!(!world.components().has::<Name>(a));
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut world = world();
        let e = world.create_light("l", Light::default());
        assert!(world.destroy_entity(e));
        assert!(!world.destroy_entity(e));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn destroy_cleans_indices_after_component_removal() {
        let mut world = world();
        let light = world.create_light("l", Light::default());
        let mesh = three_part_mesh(&mut world);
        let model = world.spawn_model("m", mesh, vec![], Transform::IDENTITY);
        let camera = world.create_camera(Vec3::ZERO, 0.0, 0.0, 90.0);

        world.components_mut().remove::<Light>(light);
        world.components_mut().remove::<Model>(model);
        world.components_mut().remove::<Camera>(camera);
        assert!(world.destroy_entity(light));
        assert!(world.destroy_entity(model));
        assert!(world.destroy_entity(camera));

        assert!(world.system::<LightSystem>().is_empty());
        assert!(world.system::<RenderSystem>().queue().is_empty());
        assert_eq!(world.system::<CameraSystem>().active(), None);
    }

    #[test]
    fn destroy_works_without_systems() {
        let mut world = World::new();
        let e = world.spawn_empty();
        world.components_mut().insert(e, Light::default());
        assert!(world.destroy_entity(e));
        assert!(!world.is_alive(e));
    }

    #[test]
    fn spawned_model_is_queued_and_destroy_dequeues() {
        let mut world = world();
        let mesh = three_part_mesh(&mut world);
        let e = world.spawn_model("crate", mesh, vec![], Transform::IDENTITY);

        assert!(world.system::<RenderSystem>().contains(e));
        assert_eq!(world.components().get::<Name>(e).as_str(), "crate");

        world.destroy_entity(e);
        assert!(!world.system::<RenderSystem>().contains(e));
        assert!(!world.components().has::<Model>(e));
    }

    #[test]
    fn failed_model_load_spawns_nothing() {
        let mut world = world();
        let result = world.create_model("ghost", "/nope.obj", "/nope", Transform::IDENTITY);
        assert!(result.is_err());
        assert_eq!(world.entity_count(), 0);
        assert!(world.system::<RenderSystem>().queue().is_empty());
    }

    #[test]
    fn editing_a_shared_submesh_material_copies_it() {
        let mut world = world();
        let mesh = three_part_mesh(&mut world);
        let shared = world.system_mut::<ResourceSystem>().create_material();
        let e = world.spawn_model("m", mesh, vec![shared; 3], Transform::IDENTITY);

        world.submesh_material_mut(e, 1).unwrap().shininess = 128.0;

        let model = world.components().get::<Model>(e).clone();
        let resources = world.system::<ResourceSystem>();
        assert_eq!(model.materials[0], shared);
        assert_eq!(model.materials[2], shared);
        assert_ne!(model.materials[1], shared);
        assert_eq!(resources.material(model.materials[1]).shininess, 128.0);
        assert_eq!(resources.material(shared).shininess, 16.0);
    }

    #[test]
    fn editing_an_unshared_material_keeps_the_handle() {
        let mut world = world();
        let mesh = three_part_mesh(&mut world);
        let e = world.spawn_model("m", mesh, vec![], Transform::IDENTITY);

        // Default material: always copied.
        world.submesh_material_mut(e, 0).unwrap().shininess = 8.0;
        let first = world.components().get::<Model>(e).materials[0];
        assert!(!first.is_default());

        // Now unique: edited in place.
        world.submesh_material_mut(e, 0).unwrap().shininess = 4.0;
        assert_eq!(world.components().get::<Model>(e).materials[0], first);
        assert_eq!(
            world.system::<ResourceSystem>().material(MaterialHandle::DEFAULT).shininess,
            16.0
        );
        assert!(world.submesh_material_mut(e, 3).is_none());
    }

    #[test]
    fn set_submesh_material_shares_a_handle() {
        let mut world = world();
        let mesh = three_part_mesh(&mut world);
        let e = world.spawn_model("m", mesh, vec![], Transform::IDENTITY);
        let m = world.system_mut::<ResourceSystem>().create_material();
        assert!(world.set_submesh_material(e, 2, m));
        assert_eq!(
            world.components().get::<Model>(e).materials,
            vec![MaterialHandle::DEFAULT, MaterialHandle::DEFAULT, m]
        );
    }
}

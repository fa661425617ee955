//! # Render: Shadow + Geometry Passes over the Render Queue
//!
//! GPU work is behind the [`Renderer`] trait. The engine core decides *what*
//! is drawn and in which order; a backend decides *how*. The
//! [`RecordingRenderer`] backend records calls instead of drawing, which is
//! what headless runs and tests use.
//!
//! ## Frame Layout
//!
//! ```text
//!  begin_frame
//!  ├─ begin_shadow_pass
//!  │    use shadow shader, lightSpaceMatrix
//!  │    for entity in queue: model → draw_mesh
//!  ├─ end_shadow_pass
//!  │
//!  │  use base shader
//!  │    lights[i].*, numLights, view, projection, viewPos
//!  │    for entity in queue:
//!  │      model, normalMatrix
//!  │      for submesh i: bind material(i) textures → draw_submesh
//!  ├─ (UI)
//!  end_frame
//! ```
//!
//! ## Render Queue
//!
//! Only entities in the [`RenderSystem`] queue are drawn. Scene code adds a
//! model when it is created and removes it when it is destroyed, so drawing
//! never scans the whole component store.
//!
//! ## Extract / Reinsert
//!
//! [`render_scene`] needs the render system mutably while reading the
//! resource, light and camera systems from the same registry. It takes the
//! render system out with [`SystemRegistry::take`](crate::ecs::SystemRegistry::take),
//! draws, and restores it.

mod recording;

use std::any::Any;

pub use recording::{RecordedCall, RecordingRenderer};

use crate::asset::{
    Material, Mesh, MeshHandle, ResourceSystem, Shader, ShaderHandle, Submesh, Texture,
    TextureHandle, TextureMap, UniformSink,
};
use crate::camera::{Camera, CameraSystem};
use crate::components::{Light, LightKind, Model};
use crate::ecs::{ComponentStore, Dependency, Entity, System, World};
use crate::light::LightSystem;
use crate::math::{Mat4, Transform, Vec3};

/// Texture unit the shadow map is bound to in the geometry pass.
pub const SHADOW_MAP_UNIT: i32 = 4;

/// Half extent of the orthographic box used for directional shadows.
const SHADOW_EXTENT: f32 = 10.0;

/// A graphics backend.
///
/// Uniform writes go to the program bound by the last
/// [`use_shader`](Self::use_shader).
pub trait Renderer: UniformSink {
    fn begin_frame(&mut self);
    fn end_frame(&mut self);
    fn begin_shadow_pass(&mut self);
    fn end_shadow_pass(&mut self);
    fn set_viewport_size(&mut self, width: u32, height: u32);
    /// Resolution of the square depth map the shadow pass renders into.
    fn set_shadow_map_size(&mut self, size: u32);

    /// Bind a program and apply the uniforms stored on it.
    fn use_shader(&mut self, handle: ShaderHandle, shader: &Shader);
    fn bind_texture(&mut self, unit: u32, handle: TextureHandle, texture: &Texture);
    fn draw_mesh(&mut self, handle: MeshHandle, mesh: &Mesh);
    fn draw_submesh(&mut self, handle: MeshHandle, mesh: &Mesh, submesh: &Submesh);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Counters from one [`RenderSystem::draw`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub shadow_draws: usize,
    pub submesh_draws: usize,
    /// Submeshes not drawn because their shader is invalid.
    pub skipped: usize,
}

/// Owns the renderer backend and the render queue.
pub struct RenderSystem {
    queue: Vec<Entity>,
    renderer: Box<dyn Renderer>,
    base_shader: Option<ShaderHandle>,
    shadow_shader: Option<ShaderHandle>,
    viewport: (u32, u32),
    last_stats: RenderStats,
}

impl System for RenderSystem {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::of::<ResourceSystem>()]
    }
}

impl RenderSystem {
    pub fn new(renderer: Box<dyn Renderer>, width: u32, height: u32) -> Self {
        let mut system = Self {
            queue: Vec::new(),
            renderer,
            base_shader: None,
            shadow_shader: None,
            viewport: (width, height),
            last_stats: RenderStats::default(),
        };
        system.renderer.set_viewport_size(width, height);
        system
    }

    /// Add an entity to the render queue. Already queued entities stay put.
    pub fn add(&mut self, entity: Entity) {
        if !self.queue.contains(&entity) {
            self.queue.push(entity);
        }
    }

    /// Remove an entity from the render queue. Returns whether it was queued.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.queue.len();
        self.queue.retain(|&e| e != entity);
        self.queue.len() != before
    }

    pub fn queue(&self) -> &[Entity] {
        &self.queue
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.queue.contains(&entity)
    }

    pub fn set_shaders(&mut self, base: ShaderHandle, shadow: ShaderHandle) {
        self.base_shader = Some(base);
        self.shadow_shader = Some(shadow);
    }

    pub fn base_shader(&self) -> Option<ShaderHandle> {
        self.base_shader
    }

    pub fn shadow_shader(&self) -> Option<ShaderHandle> {
        self.shadow_shader
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.renderer.set_viewport_size(width, height);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn set_shadow_map_size(&mut self, size: u32) {
        self.renderer.set_shadow_map_size(size);
    }

    pub fn begin_frame(&mut self) {
        self.renderer.begin_frame();
    }

    pub fn end_frame(&mut self) {
        self.renderer.end_frame();
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Run the shadow pass and the geometry pass over the queue.
    pub fn draw(
        &mut self,
        components: &ComponentStore,
        resources: &ResourceSystem,
        lights: &LightSystem,
        camera: Option<&Camera>,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let light_space = light_space_matrix(lights, components);
        let renderer = self.renderer.as_mut();

        renderer.begin_shadow_pass();
        if let Some(handle) = self.shadow_shader {
            let shader = resources.shader(handle);
            if shader.is_valid() {
                renderer.use_shader(handle, shader);
                renderer.set_mat4("lightSpaceMatrix", light_space);
                for &entity in &self.queue {
                    let Some(model) = components.try_get::<Model>(entity) else {
                        continue;
                    };
                    let transform = transform_of(components, entity);
                    let mesh = resources.mesh(model.mesh);
                    if mesh.is_empty() {
                        continue;
                    }
                    renderer.set_mat4("model", transform.matrix());
                    renderer.draw_mesh(model.mesh, mesh);
                    stats.shadow_draws += 1;
                }
            }
        }
        renderer.end_shadow_pass();

        let frame = FrameUniforms {
            light_space,
            camera,
        };
        let mut bound: Option<ShaderHandle> = None;
        for &entity in &self.queue {
            let Some(model) = components.try_get::<Model>(entity) else {
                log::warn!("Render queue holds {entity} without a Model component");
                continue;
            };
            let transform = transform_of(components, entity);
            let mesh = resources.mesh(model.mesh);

            for (index, submesh) in mesh.submeshes().iter().enumerate() {
                let material = resources.material(model.material(index));
                let Some(handle) = material.shader.or(self.base_shader) else {
                    stats.skipped += 1;
                    continue;
                };
                if bound != Some(handle) {
                    let shader = resources.shader(handle);
                    if !shader.is_valid() {
                        stats.skipped += 1;
                        continue;
                    }
                    renderer.use_shader(handle, shader);
                    frame.apply(renderer, lights, components);
                    bound = Some(handle);
                }

                renderer.set_mat4("model", transform.matrix());
                renderer.set_mat3("normalMatrix", transform.normal_matrix());
                bind_material(renderer, material, resources);
                renderer.draw_submesh(model.mesh, mesh, submesh);
                stats.submesh_draws += 1;
            }
        }

        self.last_stats = stats;
        stats
    }
}

/// Per-frame uniforms set whenever a program is bound in the geometry pass.
struct FrameUniforms<'a> {
    light_space: Mat4,
    camera: Option<&'a Camera>,
}

impl FrameUniforms<'_> {
    fn apply(
        &self,
        renderer: &mut dyn Renderer,
        lights: &LightSystem,
        components: &ComponentStore,
    ) {
        lights.upload(renderer, components);
        renderer.set_mat4("lightSpaceMatrix", self.light_space);
        renderer.set_int("shadowMap", SHADOW_MAP_UNIT);
        if let Some(camera) = self.camera {
            renderer.set_mat4("view", camera.view_matrix());
            renderer.set_mat4("projection", camera.projection_matrix());
            renderer.set_vec3("viewPos", camera.position);
        }
    }
}

fn bind_material(renderer: &mut dyn Renderer, material: &Material, resources: &ResourceSystem) {
    for (unit, map) in TextureMap::ALL.into_iter().enumerate() {
        let handle = material.texture(map);
        renderer.bind_texture(unit as u32, handle, resources.texture(handle));
        renderer.set_int(&format!("material.{}", map.base_name()), unit as i32);
    }
    renderer.set_float("material.shininess", material.shininess);
}

fn transform_of(components: &ComponentStore, entity: Entity) -> Transform {
    components
        .try_get::<Transform>(entity)
        .copied()
        .unwrap_or_default()
}

/// View-projection from the first directional light, or identity when
/// there is none.
pub fn light_space_matrix(lights: &LightSystem, components: &ComponentStore) -> Mat4 {
    let Some(light) = lights
        .lights()
        .iter()
        .filter_map(|&e| components.try_get::<Light>(e))
        .find(|l| l.kind == LightKind::Directional)
    else {
        return Mat4::IDENTITY;
    };

    let direction = light.direction.normalize_or(Vec3::NEG_Y);
    let eye = -direction * SHADOW_EXTENT;
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, up);
    let projection = Mat4::orthographic_rh(
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        1.0,
        SHADOW_EXTENT * 3.0,
    );
    projection * view
}

/// Draw the queued scene with the registered systems.
pub fn render_scene(world: &mut World) -> RenderStats {
    let (components, systems) = world.split_mut();
    let Some(mut render) = systems.take::<RenderSystem>() else {
        log::error!("render_scene called without a RenderSystem");
        return RenderStats::default();
    };

    let stats = render.draw(
        components,
        systems.get::<ResourceSystem>(),
        systems.get::<LightSystem>(),
        systems.get::<CameraSystem>().active_camera(components),
    );

    systems.restore(render);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{MaterialHandle, Vertex};
    use crate::ecs::EntityRegistry;

    fn triangle() -> Mesh {
        Mesh::single(vec![Vertex::default(); 3], vec![0, 1, 2])
    }

    fn two_part() -> Mesh {
        Mesh::new(
            vec![Vertex::default(); 6],
            vec![0, 1, 2, 3, 4, 5],
            vec![Submesh::new(0, 3), Submesh::new(3, 3)],
        )
    }

    struct Scene {
        entities: EntityRegistry,
        components: ComponentStore,
        resources: ResourceSystem,
        lights: LightSystem,
        render: RenderSystem,
    }

    fn scene() -> Scene {
        let mut resources = ResourceSystem::new();
        let base = resources.insert_shader(Shader::from_sources("base", "base"));
        let shadow = resources.insert_shader(Shader::from_sources("shadow", "shadow"));
        let mut render = RenderSystem::new(Box::new(RecordingRenderer::new()), 640, 480);
        render.set_shaders(base, shadow);
        Scene {
            entities: EntityRegistry::new(),
            components: ComponentStore::new(),
            resources,
            lights: LightSystem::new(),
            render,
        }
    }

    fn recording(render: &RenderSystem) -> &RecordingRenderer {
        render
            .renderer()
            .as_any()
            .downcast_ref::<RecordingRenderer>()
            .unwrap()
    }

    #[test]
    fn queue_add_and_remove() {
        let mut s = scene();
        let e = s.entities.create();
        s.render.add(e);
        s.render.add(e);
        assert_eq!(s.render.queue(), &[e]);
        assert!(s.render.remove(e));
        assert!(!s.render.remove(e));
        assert!(s.render.queue().is_empty());
    }

    #[test]
    fn shadow_pass_runs_before_geometry() {
        let mut s = scene();
        let e = s.entities.create();
        let mesh = s.resources.insert_mesh(triangle());
        let materials = vec![MaterialHandle::DEFAULT];
        s.components.insert(e, Model { mesh, materials });
        s.render.add(e);

        let stats = s.render.draw(&s.components, &s.resources, &s.lights, None);
        assert_eq!(
            stats,
            RenderStats {
                shadow_draws: 1,
                submesh_draws: 1,
                skipped: 0,
            }
        );

        let calls = recording(&s.render).calls();
        let shadow_end = calls
            .iter()
            .position(|c| *c == RecordedCall::EndShadowPass)
            .unwrap();
        let submesh = calls
            .iter()
            .position(|c| matches!(c, RecordedCall::DrawSubmesh { .. }))
            .unwrap();
        assert!(matches!(calls[shadow_end - 1], RecordedCall::DrawMesh(_)));
        assert!(submesh > shadow_end);
    }

    #[test]
    fn every_submesh_is_drawn_with_its_material() {
        let mut s = scene();
        let e = s.entities.create();
        let mesh = s.resources.insert_mesh(two_part());
        let a = s.resources.create_material();
        let b = s.resources.create_material();
        s.resources.material_mut(b).unwrap().shininess = 99.0;
        let materials = vec![a, b];
        s.components.insert(e, Model { mesh, materials });
        s.render.add(e);

        let stats = s.render.draw(&s.components, &s.resources, &s.lights, None);
        assert_eq!(stats.submesh_draws, 2);
        let rec = recording(&s.render);
        assert_eq!(
            rec.uniform("material.shininess"),
            Some(crate::asset::UniformValue::Float(99.0))
        );
        assert_eq!(
            rec.uniform("material.normal"),
            Some(crate::asset::UniformValue::Int(2))
        );
    }

    #[test]
    fn invalid_material_shader_skips_draw() {
        let mut s = scene();
        let broken = s.resources.insert_shader(Shader::invalid());
        let e = s.entities.create();
        let mesh = s.resources.insert_mesh(triangle());
        let material = s.resources.create_material();
        s.resources.material_mut(material).unwrap().shader = Some(broken);
        let materials = vec![material];
        s.components.insert(e, Model { mesh, materials });
        s.render.add(e);

        let stats = s.render.draw(&s.components, &s.resources, &s.lights, None);
        assert_eq!(stats.submesh_draws, 0);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn lights_and_camera_reach_the_base_shader() {
        let mut s = scene();
        let sun = s.entities.create();
        s.components.insert(sun, Light::directional(Vec3::new(-1.0, -1.0, -1.0)));
        s.lights.add(sun);

        let e = s.entities.create();
        let mesh = s.resources.insert_mesh(triangle());
        let materials = Vec::new();
        s.components.insert(e, Model { mesh, materials });
        s.render.add(e);

        let camera = Camera::new(Vec3::new(0.0, 1.0, 3.0), 0.0, 0.0, 60.0);
        s.render.draw(&s.components, &s.resources, &s.lights, Some(&camera));

        let rec = recording(&s.render);
        assert_eq!(
            rec.uniform("numLights"),
            Some(crate::asset::UniformValue::Int(1))
        );
        assert_eq!(
            rec.uniform("viewPos"),
            Some(crate::asset::UniformValue::Vec3(Vec3::new(0.0, 1.0, 3.0)))
        );
        assert_ne!(
            rec.uniform("lightSpaceMatrix"),
            Some(crate::asset::UniformValue::Mat4(Mat4::IDENTITY))
        );
    }

    #[test]
    fn light_space_is_identity_without_directional_light() {
        let mut entities = EntityRegistry::new();
        let mut components = ComponentStore::new();
        let mut lights = LightSystem::new();
        let lamp = entities.create();
        components.insert(lamp, Light::point(Vec3::ONE));
        lights.add(lamp);
        assert_eq!(light_space_matrix(&lights, &components), Mat4::IDENTITY);
    }

    #[test]
    fn straight_down_light_has_valid_matrix() {
        let mut entities = EntityRegistry::new();
        let mut components = ComponentStore::new();
        let mut lights = LightSystem::new();
        let sun = entities.create();
        components.insert(sun, Light::directional(Vec3::NEG_Y));
        lights.add(sun);
        let m = light_space_matrix(&lights, &components);
        assert!(m.is_finite());
    }

    #[test]
    fn viewport_is_forwarded() {
        let mut s = scene();
        s.render.set_viewport_size(1024, 768);
        assert_eq!(s.render.viewport(), (1024, 768));
        assert_eq!(recording(&s.render).viewport(), (1024, 768));
    }
}

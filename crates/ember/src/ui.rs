//! UI hook.
//!
//! An editor or debug overlay implements [`UiPanel`]. It runs after the scene
//! is drawn and gets the same `&mut World` any other caller has: it can read
//! the stores for display and call the scene create/destroy operations, but
//! nothing more.

use crate::asset::ResourceSystem;
use crate::ecs::World;
use crate::light::LightSystem;
use crate::render::RenderSystem;

/// A panel drawn on top of the scene each frame.
pub trait UiPanel {
    fn begin_frame(&mut self) {}
    fn render(&mut self, world: &mut World);
    fn end_frame(&mut self) {}
}

/// Counts shown by a stats overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub entities: usize,
    pub component_types: usize,
    pub renderables: usize,
    pub lights: usize,
    pub meshes: usize,
    pub materials: usize,
    pub shaders: usize,
    pub textures: usize,
}

impl SceneStats {
    /// Read the counts from `world`. Systems that are not registered count
    /// as zero.
    pub fn collect(world: &World) -> Self {
        let systems = world.systems();
        let mut stats = Self {
            entities: world.entity_count(),
            component_types: world.components().type_count(),
            ..Self::default()
        };
        if let Some(render) = systems.try_get::<RenderSystem>() {
            stats.renderables = render.queue().len();
        }
        if let Some(lights) = systems.try_get::<LightSystem>() {
            stats.lights = lights.len();
        }
        if let Some(resources) = systems.try_get::<ResourceSystem>() {
            stats.meshes = resources.mesh_count();
            stats.materials = resources.material_count();
            stats.shaders = resources.shader_count();
            stats.textures = resources.texture_count();
        }
        stats
    }
}

/// A panel that keeps the latest [`SceneStats`] and logs them when they
/// change.
#[derive(Debug, Default)]
pub struct StatsPanel {
    latest: SceneStats,
    frames: u64,
}

impl StatsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> SceneStats {
        self.latest
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl UiPanel for StatsPanel {
    fn render(&mut self, world: &mut World) {
        let stats = SceneStats::collect(world);
        if stats != self.latest {
            log::info!(
                "Scene: {} entities, {} renderables, {} lights, {} meshes, {} materials",
                stats.entities,
                stats.renderables,
                stats.lights,
                stats.meshes,
                stats.materials
            );
            self.latest = stats;
        }
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_on_empty_world() {
        let mut world = World::new();
        world.spawn_empty();
        let stats = SceneStats::collect(&world);
        assert_eq!(stats.entities, 1);
        assert_eq!(stats.meshes, 0);
        assert_eq!(stats.lights, 0);
    }

    #[test]
    fn stats_panel_tracks_latest() {
        let mut world = World::new();
        world.systems_mut().insert(ResourceSystem::new()).unwrap();
        let mut panel = StatsPanel::new();
        panel.begin_frame();
        panel.render(&mut world);
        panel.end_frame();
        assert_eq!(panel.latest().materials, 1);
        assert_eq!(panel.frames(), 1);
    }
}

//! # Engine: System Registration and the Frame Loop
//!
//! The [`Engine`] builds a [`World`], registers the stateful systems in
//! dependency order, loads the base and shadow shaders, and runs one frame
//! at a time:
//!
//! ```text
//! register:  InputSystem → TimeSystem → ResourceSystem → RenderSystem
//!            → CameraSystem → LightSystem
//!
//! frame:     input → time → camera
//!            → begin frame → (UI begin) → shadow + geometry passes
//!            → UI render → (UI end) → end frame
//! ```
//!
//! Window creation and the event loop belong to the caller. Forward winit
//! events with [`Engine::handle_window_event`] /
//! [`Engine::handle_device_event`] and call [`Engine::frame`] once per
//! redraw. Headless callers use [`Engine::step`] with a fixed delta.
//!
//! ## Example
//!
//! ```ignore
//! use ember::prelude::*;
//!
//! Engine::init_logging();
//! let mut engine = Engine::new(EngineConfig::default(), Box::new(RecordingRenderer::new()))?;
//! let world = engine.world_mut();
//! world.create_camera(Vec3::new(0.0, 1.0, 5.0), 0.0, 0.0, 90.0);
//! world.create_light("sun", Light::directional(Vec3::new(-1.0, -1.0, -1.0)));
//! while engine.frame(None) {}
//! ```

use std::time::Duration;

use winit::event::{DeviceEvent, WindowEvent};

use crate::asset::ResourceSystem;
use crate::camera::CameraSystem;
use crate::config::EngineConfig;
use crate::ecs::World;
use crate::error::EcsError;
use crate::input::InputSystem;
use crate::light::LightSystem;
use crate::render::{self, RenderStats, RenderSystem, Renderer};
use crate::time::TimeSystem;
use crate::ui::UiPanel;

/// Owns the world and drives frames.
pub struct Engine {
    world: World,
    config: EngineConfig,
}

impl Engine {
    /// Install `env_logger` with an `info` default. Safe to call twice.
    pub fn init_logging() {
        let env = env_logger::Env::default().default_filter_or("info");
        let _ = env_logger::Builder::from_env(env).try_init();
    }

    /// Register every system with OBJ mesh loading.
    pub fn new(config: EngineConfig, renderer: Box<dyn Renderer>) -> Result<Self, EcsError> {
        Self::with_resources(config, renderer, ResourceSystem::new())
    }

    /// Register every system around a preconfigured resource system.
    pub fn with_resources(
        config: EngineConfig,
        renderer: Box<dyn Renderer>,
        resources: ResourceSystem,
    ) -> Result<Self, EcsError> {
        let mut world = World::new();
        let systems = world.systems_mut();

        systems.register(|_| InputSystem::new())?;
        systems.register(|_| TimeSystem::new())?;
        systems.register(|_| resources)?;
        systems.register(|_| {
            RenderSystem::new(renderer, config.screen_width, config.screen_height)
        })?;
        systems.register(|_| CameraSystem::new(config.camera, config.aspect_ratio()))?;
        systems.register(|_| LightSystem::new())?;

        let resources = systems.get_mut::<ResourceSystem>();
        let (base, shadow) = (&config.base_shader, &config.shadow_shader);
        let base = resources.load_shader(&base.vertex, &base.fragment);
        let shadow = resources.load_shader(&shadow.vertex, &shadow.fragment);
        let render = systems.get_mut::<RenderSystem>();
        render.set_shaders(base, shadow);
        render.set_shadow_map_size(config.shadow_map_size);

        log::info!(
            "Engine ready: {}x{}, {} systems",
            config.screen_width,
            config.screen_height,
            systems.len()
        );
        Ok(Self { world, config })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        self.world.system_mut::<InputSystem>().handle_window_event(event);
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        self.world.system_mut::<InputSystem>().handle_device_event(event);
    }

    /// Resize the viewport and the active camera's aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.screen_width = width;
        self.config.screen_height = height;
        let aspect = self.config.aspect_ratio();

        let (components, systems) = self.world.split_mut();
        systems.get_mut::<RenderSystem>().set_viewport_size(width, height);
        systems.get_mut::<CameraSystem>().set_aspect(components, aspect);
        log::debug!("Resized to {width}x{height}");
    }

    /// Run one frame timed by the wall clock. Returns `false` once quitting
    /// was requested.
    pub fn frame(&mut self, ui: Option<&mut dyn UiPanel>) -> bool {
        self.run_frame(None, ui)
    }

    /// Run one frame with a fixed delta.
    pub fn step(&mut self, dt: Duration, ui: Option<&mut dyn UiPanel>) -> bool {
        self.run_frame(Some(dt), ui)
    }

    /// Counters from the last frame's render passes.
    pub fn last_render_stats(&self) -> RenderStats {
        self.world.system::<RenderSystem>().last_stats()
    }

    fn run_frame(&mut self, fixed: Option<Duration>, mut ui: Option<&mut dyn UiPanel>) -> bool {
        let input = self.world.system_mut::<InputSystem>();
        let running = input.update();
        if let Some((width, height)) = input.take_resize() {
            self.resize(width, height);
        }

        let time = self.world.system_mut::<TimeSystem>();
        match fixed {
            Some(dt) => time.advance(dt),
            None => time.update(),
        }
        let dt = time.delta_secs();

        {
            let (components, systems) = self.world.split_mut();
            systems
                .get::<CameraSystem>()
                .update(components, systems.get::<InputSystem>(), dt);
        }

        self.world.system_mut::<RenderSystem>().begin_frame();
        if let Some(panel) = ui.as_deref_mut() {
            panel.begin_frame();
        }

        render::render_scene(&mut self.world);

        if let Some(panel) = ui.as_deref_mut() {
            panel.render(&mut self.world);
            panel.end_frame();
        }
        self.world.system_mut::<RenderSystem>().end_frame();
        self.world.system_mut::<InputSystem>().end_frame();

        running
    }
}

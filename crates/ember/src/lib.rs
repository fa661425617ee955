//! # Ember: ECS Core for a Small Real-Time 3D Engine
//!
//! Entities are plain ids, components live in per-type tables, and engine
//! services (input, time, resources, rendering, camera, lights) are
//! singleton systems registered once in dependency order. Scene operations
//! on [`World`](ecs::World) tie the three together so a created model is
//! always queued for drawing and a destroyed one never is.
//!
//! Start with `use ember::prelude::*` and build an [`Engine`](app::Engine).

pub mod app;
pub mod asset;
pub mod camera;
pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod input;
pub mod light;
pub mod math;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod time;
pub mod ui;

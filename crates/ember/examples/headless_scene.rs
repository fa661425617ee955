//! Headless scene: a camera, two lights and a model, drawn for a few frames
//! into the recording backend.
//!
//! Run with `RUST_LOG=debug cargo run --example headless_scene -- [mesh.obj] [material_dir]`.

use std::time::Duration;

use ember::prelude::*;

fn main() {
    Engine::init_logging();

    let config = EngineConfig::from_json_file("ember.json").unwrap_or_else(|e| {
        log::warn!("{e}. Using default config.");
        EngineConfig::default()
    });
    let mut engine = match Engine::new(config, Box::new(RecordingRenderer::new())) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    let world = engine.world_mut();
    world.create_camera(Vec3::new(0.0, 1.5, 6.0), 0.0, -10.0, 60.0);
    world.create_light(
        "sun",
        Light::directional(Vec3::new(-1.0, -1.0, -1.0))
            .with_position(Vec3::new(2.0, 3.0, 2.0))
            .with_intensity(1.5),
    );
    world.create_light(
        "lamp",
        Light::point(Vec3::new(0.0, 2.0, 1.0)).with_color(Vec3::new(1.0, 0.8, 0.6)),
    );

    let mut args = std::env::args().skip(1);
    if let (Some(mesh), Some(material)) = (args.next(), args.next()) {
        match world.create_model("model", &mesh, &material, Transform::IDENTITY) {
            Ok(entity) => {
                if let Some(first) = world.submesh_material_mut(entity, 0) {
                    first.shininess = 64.0;
                }
            }
            Err(e) => log::error!("{e}"),
        }
    }

    let mut panel = StatsPanel::new();
    for _ in 0..3 {
        engine.step(Duration::from_millis(16), Some(&mut panel));
        let stats = engine.last_render_stats();
        log::info!(
            "Frame: {} shadow draws, {} submesh draws, {} skipped",
            stats.shadow_draws,
            stats.submesh_draws,
            stats.skipped
        );
    }
    log::info!("{:?}", panel.latest());
}

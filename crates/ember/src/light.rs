//! Light index and light uniform upload.
//!
//! The [`LightSystem`] keeps the light entities in insertion order. That
//! order is the uniform array slot: the first light created is `lights[0]`.
//! Destroying a light shifts the later ones down by one.

use crate::asset::UniformSink;
use crate::components::Light;
use crate::ecs::{ComponentStore, Entity, System};

/// Insertion-ordered index of light entities.
#[derive(Debug, Clone, Default)]
pub struct LightSystem {
    lights: Vec<Entity>,
}

impl System for LightSystem {}

impl LightSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a light entity. Adding one that is already indexed does nothing.
    pub fn add(&mut self, entity: Entity) {
        if !self.lights.contains(&entity) {
            self.lights.push(entity);
        }
    }

    /// Drop a light entity from the index. Returns whether it was present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.lights.len();
        self.lights.retain(|&e| e != entity);
        self.lights.len() != before
    }

    pub fn lights(&self) -> &[Entity] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Uniform array slot of `entity`.
    pub fn slot_of(&self, entity: Entity) -> Option<usize> {
        self.lights.iter().position(|&e| e == entity)
    }

    /// Write `lights[i].*` for every indexed light, then `numLights`.
    ///
    /// `i` is the index position, the same value [`slot_of`](Self::slot_of)
    /// returns. An indexed entity without a [`Light`] keeps its slot with
    /// zero intensity.
    pub fn upload<S: UniformSink + ?Sized>(&self, sink: &mut S, components: &ComponentStore) {
        for (slot, &entity) in self.lights.iter().enumerate() {
            let prefix = format!("lights[{slot}]");
            let light = match components.fetch::<Light>(entity) {
                Ok(light) => light,
                Err(e) => {
                    log::error!("Light index holds {entity} but {e}. Slot {slot} is dark.");
                    sink.set_float(&format!("{prefix}.intensity"), 0.0);
                    continue;
                }
            };

            sink.set_int(&format!("{prefix}.type"), light.kind as i32);
            sink.set_vec3(&format!("{prefix}.position"), light.position);
            sink.set_vec3(&format!("{prefix}.direction"), light.direction);
            sink.set_vec3(&format!("{prefix}.color"), light.color);
            sink.set_float(&format!("{prefix}.intensity"), light.intensity);
            sink.set_float(&format!("{prefix}.ambient"), light.ambient);
            sink.set_float(&format!("{prefix}.constant"), light.constant);
            sink.set_float(&format!("{prefix}.linear"), light.linear);
            sink.set_float(&format!("{prefix}.quadratic"), light.quadratic);
            sink.set_float(&format!("{prefix}.cutOff"), light.cut_off);
            sink.set_float(&format!("{prefix}.outerCutOff"), light.outer_cut_off);
        }
        sink.set_int("numLights", self.lights.len() as i32);
    }
}

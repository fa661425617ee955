//! # World: The Explicit Engine Context
//!
//! The [`World`] owns the three ECS registries and is passed by reference to
//! whoever needs them. There is no global state.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ World                                            │
//! │                                                  │
//! │  entities:   EntityRegistry  (ids, alive set)    │
//! │  components: ComponentStore  (type → entity → T) │
//! │  systems:    SystemRegistry  (type → singleton)  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Scene-level operations (create a light, destroy a model, ...) live in
//! [`scene`](crate::scene) as further `impl World` blocks, because they need
//! to coordinate the registries with concrete systems.

use super::component::ComponentStore;
use super::entity::{Entity, EntityRegistry};
use super::system::{System, SystemRegistry};

/// The central container for all engine state.
#[derive(Default)]
pub struct World {
    entities: EntityRegistry,
    components: ComponentStore,
    systems: SystemRegistry,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registries ───────────────────────────────────────────────────

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentStore {
        &mut self.components
    }

    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    /// Borrow the component store and the system registry at the same time.
    pub fn split_mut(&mut self) -> (&mut ComponentStore, &mut SystemRegistry) {
        (&mut self.components, &mut self.systems)
    }

    // ── Shortcuts ────────────────────────────────────────────────────

    /// Get a registered system.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    pub fn system<T: System>(&self) -> &T {
        self.systems.get::<T>()
    }

    /// Get a registered system mutably.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    pub fn system_mut<T: System>(&mut self) -> &mut T {
        self.systems.get_mut::<T>()
    }

    // ── Entity Lifecycle ─────────────────────────────────────────────

    /// Allocate a bare entity with no components.
    pub fn spawn_empty(&mut self) -> Entity {
        self.entities.create()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Drop every component of `entity` and release its id.
    ///
    /// Category indices (render queue, light index, active camera) are *not*
    /// touched here; [`World::destroy_entity`] does both.
    pub(crate) fn purge(&mut self, entity: Entity) {
        self.components.remove_all(entity);
        self.entities.destroy(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);
    impl System for Counter {}

    #[derive(Debug, PartialEq)]
    struct Tag(&'static str);

    #[test]
    fn spawn_and_purge() {
        let mut world = World::new();
        let e = world.spawn_empty();
        world.components_mut().insert(e, Tag("a"));
        assert!(world.is_alive(e));
        assert_eq!(world.entity_count(), 1);

        world.purge(e);
        assert!(!world.is_alive(e));
        assert!(!world.components().has::<Tag>(e));
    }

    #[test]
    fn system_shortcuts() {
        let mut world = World::new();
        world.systems_mut().insert(Counter(1)).unwrap();
        world.system_mut::<Counter>().0 += 1;
        assert_eq!(world.system::<Counter>().0, 2);
    }

    #[test]
    fn split_borrow() {
        let mut world = World::new();
        world.systems_mut().insert(Counter(0)).unwrap();
        let e = world.spawn_empty();
        world.components_mut().insert(e, Tag("x"));

        let (components, systems) = world.split_mut();
        if components.has::<Tag>(e) {
            systems.get_mut::<Counter>().0 += 1;
        }
        assert_eq!(world.system::<Counter>().0, 1);
    }
}

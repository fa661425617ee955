//! # Entity: Opaque Identifiers for Scene Objects
//!
//! An [`Entity`] is just a number. It carries no data; the
//! [`ComponentStore`](super::ComponentStore) maps entities to their
//! components, and the [`EntityRegistry`] decides which ids are alive.
//!
//! ## Design: Monotonic, Never Reused
//!
//! Ids come from a plain counter starting at 0. A destroyed id is never handed
//! out again, so a stale `Entity` kept by a render queue or a UI selection can
//! never silently start pointing at a newer object. Lookups with it simply
//! fail.
//!
//! ```text
//! create() → 0, create() → 1, destroy(0), create() → 2
//! ```
//!
//! The counter is a `u32`. Wrapping it is not checked: four billion creations
//! in one process is outside what this engine is built for.

use std::collections::HashSet;
use std::fmt;

/// A lightweight handle to a scene object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub(crate) u32);

impl Entity {
    /// Returns the raw id. Useful for display and logging.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues entity ids and tracks which ones are alive.
///
/// Destroying an entity here only removes it from the active set. Component
/// data is untouched; use [`World::destroy_entity`](super::World::destroy_entity)
/// to tear down an entity completely.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    next_id: u32,
    active: HashSet<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id and mark it alive.
    pub fn create(&mut self) -> Entity {
        let entity = Entity(self.next_id);
        self.next_id += 1;
        self.active.insert(entity);
        log::debug!("Created entity {entity}");
        entity
    }

    /// Remove an entity from the active set.
    ///
    /// Idempotent: destroying an unknown or already destroyed entity is a
    /// no-op. Returns `true` if the entity was alive.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        self.active.remove(&entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.active.contains(&entity)
    }

    /// Number of currently alive entities.
    pub fn alive_count(&self) -> usize {
        self.active.len()
    }

    /// Alive entities in ascending id order.
    pub fn alive(&self) -> Vec<Entity> {
        let mut entities: Vec<_> = self.active.iter().copied().collect();
        entities.sort_unstable();
        entities
    }
}

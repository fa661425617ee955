//! # Component Store: Type-Indexed Per-Entity Storage
//!
//! Components are plain data: a [`Name`](crate::components::Name), a
//! [`Transform`](crate::math::Transform), a [`Light`](crate::components::Light).
//! The store keeps *any* `'static` type without knowing it up front.
//!
//! ## Layout
//!
//! ```text
//! ComponentStore
//!   tables: HashMap<TypeId, Box<dyn ComponentTable>>
//!              │
//!              └─► Table<T> { entries: HashMap<Entity, T> }
//! ```
//!
//! Entities and component types are orthogonal axes. The first `insert::<T>`
//! lazily creates `T`'s sub-table; after that, insert and lookup are two hash
//! probes. The typed `Table<T>` is recovered with `downcast_ref`, so all
//! access is safe: the `TypeId` key guarantees the downcast succeeds.
//!
//! The [`ComponentTable`] trait is what lets [`ComponentStore::remove_all`]
//! purge an entity from every table without knowing any of the concrete
//! types.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::Entity;
use crate::error::EcsError;

/// Type-erased view of one component table.
trait ComponentTable: Any {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn contains(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Table<T> {
    entries: HashMap<Entity, T>,
}

impl<T: 'static> ComponentTable for Table<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.entries.remove(&entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owns every component instance, keyed by `(type, entity)`.
///
/// At most one `T` exists per entity: a second insert overwrites the first.
#[derive(Default)]
pub struct ComponentStore {
    tables: HashMap<TypeId, Box<dyn ComponentTable>>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table<T: 'static>(&self) -> Option<&Table<T>> {
        self.tables
            .get(&TypeId::of::<T>())
            .and_then(|t| t.as_any().downcast_ref::<Table<T>>())
    }

    fn table_mut<T: 'static>(&mut self) -> Option<&mut Table<T>> {
        self.tables
            .get_mut(&TypeId::of::<T>())
            .and_then(|t| t.as_any_mut().downcast_mut::<Table<T>>())
    }

    /// Store `component` on `entity`, replacing any existing `T`.
    pub fn insert<T: 'static>(&mut self, entity: Entity, component: T) {
        let table = self
            .tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                Box::new(Table::<T> {
                    entries: HashMap::new(),
                })
            })
            .as_any_mut()
            .downcast_mut::<Table<T>>()
            .expect("component table keyed by the wrong TypeId");
        table.entries.insert(entity, component);
    }

    /// Look up a component, reporting *why* it is missing.
    pub fn fetch<T: 'static>(&self, entity: Entity) -> Result<&T, EcsError> {
        let type_name = std::any::type_name::<T>();
        let table = self
            .table::<T>()
            .ok_or(EcsError::ComponentTypeNotRegistered { type_name })?;
        table
            .entries
            .get(&entity)
            .ok_or(EcsError::ComponentMissing { entity, type_name })
    }

    /// Mutable variant of [`fetch`](Self::fetch).
    pub fn fetch_mut<T: 'static>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        let type_name = std::any::type_name::<T>();
        let table = self
            .table_mut::<T>()
            .ok_or(EcsError::ComponentTypeNotRegistered { type_name })?;
        table
            .entries
            .get_mut(&entity)
            .ok_or(EcsError::ComponentMissing { entity, type_name })
    }

    /// Get a shared reference to a component.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no `T`. Check with [`has`](Self::has) or use
    /// [`try_get`](Self::try_get) when absence is expected.
    pub fn get<T: 'static>(&self, entity: Entity) -> &T {
        self.fetch::<T>(entity).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Get a mutable reference to a component.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no `T`.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> &mut T {
        self.fetch_mut::<T>(entity).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Non-panicking lookup. Returns `None` if the entity has no `T`.
    pub fn try_get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        self.table::<T>()?.entries.get(&entity)
    }

    pub fn try_get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        self.table_mut::<T>()?.entries.get_mut(&entity)
    }

    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.table::<T>()
            .is_some_and(|t| t.entries.contains_key(&entity))
    }

    /// Some entity owning a `T`, or `None` if nobody does.
    ///
    /// Unordered: with several owners, which one comes back is unspecified.
    pub fn find_first_owner<T: 'static>(&self) -> Option<Entity> {
        self.table::<T>()?.entries.keys().next().copied()
    }

    /// Every entity owning a `T`, in ascending id order.
    pub fn entities_with<T: 'static>(&self) -> Vec<Entity> {
        let mut entities: Vec<_> = self
            .table::<T>()
            .map(|t| t.entries.keys().copied().collect())
            .unwrap_or_default();
        entities.sort_unstable();
        entities
    }

    /// Remove `entity`'s `T` if present. Returns the removed value.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        self.table_mut::<T>()?.entries.remove(&entity)
    }

    /// Remove every component of every type from `entity`.
    ///
    /// Returns the number of components removed.
    pub fn remove_all(&mut self, entity: Entity) -> usize {
        self.tables
            .values_mut()
            .map(|t| t.remove_entity(entity))
            .filter(|&removed| removed)
            .count()
    }

    /// Short type names of every component `entity` owns, sorted.
    pub fn component_names(&self, entity: Entity) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .tables
            .values()
            .filter(|t| t.contains(entity))
            .map(|t| short_type_name(t.type_name()))
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of component types that have a sub-table.
    pub fn type_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of `T` instances stored.
    pub fn count<T: 'static>(&self) -> usize {
        self.table::<T>().map_or(0, |t| t.len())
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}

//! # Registry-of-Maps ECS
//!
//! A plain Entity Component System. There are no archetypes and
//! no parallel scheduling; the contracts that matter are correct lookup and
//! lifetime.
//!
//! ## Module Overview
//!
//! - [`entity`]: Monotonic entity ids and the alive set
//! - [`component`]: Type-indexed per-entity storage
//! - [`system`]: Type-keyed singleton services with declared dependencies
//! - [`world`]: The context object owning all three

pub mod component;
pub mod entity;
pub mod system;
pub mod world;

pub use component::ComponentStore;
pub use entity::{Entity, EntityRegistry};
pub use system::{Dependency, System, SystemRegistry};
pub use world::World;

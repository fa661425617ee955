//! # System Registry: Type-Keyed Singleton Services
//!
//! A *system* is a stateful service that owns one area of behaviour: input,
//! time, the camera, lights, rendering, resources. Exactly one instance of
//! each system type exists, constructed once and looked up by type for the
//! rest of the process.
//!
//! ## Dependency Order
//!
//! A system's constructor may read systems registered before it (the camera
//! reads input state). Each system declares its dependencies via
//! [`System::dependencies`], and [`SystemRegistry::register`] refuses to build
//! a system whose dependencies are missing:
//!
//! ```text
//! register::<InputSystem>   ✓
//! register::<CameraSystem>  ✓  (InputSystem present)
//! register::<LightSystem>   ✓
//! register::<RenderSystem>  ✗  MissingDependency(ResourceSystem)
//! ```
//!
//! ## Extract / Reinsert
//!
//! When a system needs mutable access to another system at the same time
//! (e.g. rendering uploads light uniforms into a shader owned by the resource
//! system), take one out with [`SystemRegistry::take`], work, and put it back
//! with [`SystemRegistry::restore`].

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::error::EcsError;

/// A singleton service stored in the [`SystemRegistry`].
pub trait System: Any {
    /// Systems that must be registered before this one is constructed.
    fn dependencies() -> Vec<Dependency>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// A declared dependency on another system type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    type_id: TypeId,
    type_name: &'static str,
}

impl Dependency {
    pub fn of<T: System>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: short_type_name(std::any::type_name::<T>()),
        }
    }
}

/// Owns every system instance, keyed by type.
#[derive(Default)]
pub struct SystemRegistry {
    systems: HashMap<TypeId, Box<dyn Any>>,
    /// Type names in registration order.
    order: Vec<&'static str>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct and store the system `T`.
    ///
    /// `build` receives the registry so it can read already registered
    /// systems. Registering a type twice replaces the earlier instance.
    ///
    /// Fails with [`EcsError::MissingDependency`] if any of
    /// [`T::dependencies`](System::dependencies) is not registered yet; in
    /// that case `build` is never called.
    pub fn register<T: System>(
        &mut self,
        build: impl FnOnce(&SystemRegistry) -> T,
    ) -> Result<&mut T, EcsError> {
        let name = short_type_name(std::any::type_name::<T>());
        if let Some(dep) = T::dependencies()
            .into_iter()
            .find(|d| !self.systems.contains_key(&d.type_id))
        {
            return Err(EcsError::MissingDependency {
                system: name,
                dependency: dep.type_name,
            });
        }

        let system = build(&*self);
        if self.systems.insert(TypeId::of::<T>(), Box::new(system)).is_some() {
            log::debug!("Replaced system {name}");
        } else {
            log::debug!("Registered system {name}");
            self.order.push(name);
        }
        Ok(self.get_mut::<T>())
    }

    /// Store an already constructed system. Same dependency rules as
    /// [`register`](Self::register).
    pub fn insert<T: System>(&mut self, system: T) -> Result<&mut T, EcsError> {
        self.register(|_| system)
    }

    /// Look up a system, returning [`EcsError::SystemNotRegistered`] if absent.
    pub fn fetch<T: System>(&self) -> Result<&T, EcsError> {
        self.try_get::<T>().ok_or(EcsError::SystemNotRegistered {
            type_name: short_type_name(std::any::type_name::<T>()),
        })
    }

    /// Get a shared reference to a system.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered. There is no lazy construction.
    pub fn get<T: System>(&self) -> &T {
        self.fetch::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Get a mutable reference to a system.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    pub fn get_mut<T: System>(&mut self) -> &mut T {
        let type_name = short_type_name(std::any::type_name::<T>());
        self.try_get_mut::<T>()
            .unwrap_or_else(|| panic!("{}", EcsError::SystemNotRegistered { type_name }))
    }

    pub fn try_get<T: System>(&self) -> Option<&T> {
        self.systems
            .get(&TypeId::of::<T>())
            .and_then(|s| s.downcast_ref::<T>())
    }

    pub fn try_get_mut<T: System>(&mut self) -> Option<&mut T> {
        self.systems
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.downcast_mut::<T>())
    }

    pub fn contains<T: System>(&self) -> bool {
        self.systems.contains_key(&TypeId::of::<T>())
    }

    /// Remove a system, taking ownership. Pair with [`restore`](Self::restore).
    pub fn take<T: System>(&mut self) -> Option<T> {
        self.systems
            .remove(&TypeId::of::<T>())
            .and_then(|s| s.downcast::<T>().ok())
            .map(|b| *b)
    }

    /// Put back a system removed with [`take`](Self::take). Skips the
    /// dependency check: the system was valid when first registered.
    pub fn restore<T: System>(&mut self, system: T) {
        self.systems.insert(TypeId::of::<T>(), Box::new(system));
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Short type names in the order systems were first registered.
    pub fn registration_order(&self) -> &[&'static str] {
        &self.order
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Clock {
        ticks: u32,
    }
    impl System for Clock {}

    struct Scheduler {
        start_tick: u32,
    }
    impl System for Scheduler {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::of::<Clock>()]
        }
    }

    #[test]
    fn register_and_get() {
        let mut systems = SystemRegistry::new();
        systems.insert(Clock { ticks: 3 }).unwrap();
        assert_eq!(systems.get::<Clock>().ticks, 3);

        systems.get_mut::<Clock>().ticks += 1;
        assert_eq!(systems.get::<Clock>().ticks, 4);
    }

    #[test]
    fn get_returns_the_same_instance() {
        let mut systems = SystemRegistry::new();
        systems.insert(Clock { ticks: 0 }).unwrap();
        let a: *const Clock = systems.get::<Clock>();
        let b: *const Clock = systems.get::<Clock>();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn constructor_reads_dependencies() {
        let mut systems = SystemRegistry::new();
        systems.insert(Clock { ticks: 7 }).unwrap();
        systems
            .register(|s| Scheduler {
                start_tick: s.get::<Clock>().ticks,
            })
            .unwrap();
        assert_eq!(systems.get::<Scheduler>().start_tick, 7);
        assert_eq!(systems.registration_order(), &["Clock", "Scheduler"]);
    }

    #[test]
    fn missing_dependency_is_rejected() {
        let mut systems = SystemRegistry::new();
        let mut built = false;
        let result = systems.register(|_| {
            built = true;
            Scheduler { start_tick: 0 }
        });
        assert!(matches!(
            result,
            Err(EcsError::MissingDependency {
                system: "Scheduler",
                dependency: "Clock"
            })
        ));
        assert!(!built);
        assert!(!systems.contains::<Scheduler>());
    }

    #[test]
    fn reregister_overwrites() {
        let mut systems = SystemRegistry::new();
        systems.insert(Clock { ticks: 1 }).unwrap();
        systems.insert(Clock { ticks: 2 }).unwrap();
        assert_eq!(systems.get::<Clock>().ticks, 2);
        assert_eq!(systems.len(), 1);
        assert_eq!(systems.registration_order().len(), 1);
    }

    #[test]
    #[should_panic(expected = "system `Clock` not registered")]
    fn get_unregistered_panics() {
        let systems = SystemRegistry::new();
        systems.get::<Clock>();
    }

    #[test]
    fn take_and_restore() {
        let mut systems = SystemRegistry::new();
        systems.insert(Clock { ticks: 5 }).unwrap();

        let clock = systems.take::<Clock>();
        assert_eq!(clock, Some(Clock { ticks: 5 }));
        assert!(systems.fetch::<Clock>().is_err());

        systems.restore(clock.unwrap());
        assert_eq!(systems.get::<Clock>().ticks, 5);
        assert!(systems.take::<Scheduler>().is_none());
    }
}

//! System manager: the ordered, type-keyed registry of systems.
//!
//! Systems are updated in the order they were added, so callers control
//! execution order through registration order. At most one system per
//! concrete type may be registered.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use engine_event::{EventManager, EventType};
use tracing::{debug, info};

use crate::error::SystemError;
use crate::system::{System, SystemHandle};

/// A registered system.
struct SystemEntry {
    name: &'static str,
    handle: SystemHandle,
}

/// Manages the game systems to be updated in each tick.
pub struct SystemManager {
    /// Event manager `SystemAdded` is published to.
    events: Rc<EventManager>,
    /// Systems in registration (= update) order.
    systems: Vec<SystemEntry>,
    /// Maps concrete system types to the same allocation as in `systems`,
    /// typed as `RefCell<S>` for downcasting.
    by_type: HashMap<TypeId, Rc<dyn Any>>,
}

impl SystemManager {
    /// Create a manager without any systems, publishing to `events`.
    #[must_use]
    pub fn new(events: Rc<EventManager>) -> Self {
        Self {
            events,
            systems: Vec::new(),
            by_type: HashMap::new(),
        }
    }

    /// Add `system`; it will be updated in each tick after every system
    /// added before it.
    ///
    /// On success a [`EventType::SystemAdded`] event carrying the
    /// [`SystemHandle`] is queued, and the typed handle is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::DuplicateSystemType`] if a system of type `S`
    /// has already been added. The manager is left unchanged.
    pub fn add_system<S: System>(&mut self, system: S) -> Result<Rc<RefCell<S>>, SystemError> {
        self.add_shared(Rc::new(RefCell::new(system)))
    }

    /// Add a system the caller already holds a shared handle to.
    ///
    /// # Errors
    ///
    /// See [`SystemManager::add_system`].
    pub fn add_shared<S: System>(
        &mut self,
        system: Rc<RefCell<S>>,
    ) -> Result<Rc<RefCell<S>>, SystemError> {
        let type_id = TypeId::of::<S>();
        if self.by_type.contains_key(&type_id) {
            return Err(SystemError::DuplicateSystemType(std::any::type_name::<S>()));
        }

        let name = system.borrow().name();
        let handle: SystemHandle = system.clone();
        let typed: Rc<dyn Any> = system.clone();

        self.systems.push(SystemEntry {
            name,
            handle: handle.clone(),
        });
        self.by_type.insert(type_id, typed);

        info!(system = name, position = self.systems.len() - 1, "system added");
        self.events.queue_event(EventType::SystemAdded, handle);

        Ok(system)
    }

    /// Get the system of type `S`.
    ///
    /// Lookup is by exact type; repeated calls return the same instance.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::UnknownSystemType`] if no system of type `S`
    /// has been added.
    pub fn get_system<S: System>(&self) -> Result<Rc<RefCell<S>>, SystemError> {
        let unknown = || SystemError::UnknownSystemType(std::any::type_name::<S>().to_string());
        let typed = self.by_type.get(&TypeId::of::<S>()).ok_or_else(unknown)?;
        Rc::clone(typed)
            .downcast::<RefCell<S>>()
            .map_err(|_| unknown())
    }

    /// Get a system by its [`System::name`].
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::NullArgument`] for an empty name and
    /// [`SystemError::UnknownSystemType`] if no system has that name.
    pub fn get_system_by_name(&self, name: &str) -> Result<SystemHandle, SystemError> {
        if name.is_empty() {
            return Err(SystemError::NullArgument("name"));
        }
        self.systems
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| SystemError::UnknownSystemType(name.to_string()))
    }

    /// Returns `true` if a system of type `S` has been added.
    #[must_use]
    pub fn contains<S: System>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<S>())
    }

    /// Ticks all systems, in registration order.
    ///
    /// `dt` is the time passed since the last tick, in seconds; it is passed
    /// through unchanged.
    ///
    /// # Errors
    ///
    /// Stops at the first system that fails and returns
    /// [`SystemError::UpdateFailed`]; systems after it are not updated this
    /// tick.
    pub fn update(&self, dt: f32) -> Result<(), SystemError> {
        for entry in &self.systems {
            let mut system = entry
                .handle
                .try_borrow_mut()
                .map_err(|_| SystemError::SystemBorrowed(entry.name))?;
            debug!(system = entry.name, dt, "updating system");
            system
                .update(dt)
                .map_err(|source| SystemError::UpdateFailed {
                    system: entry.name,
                    source,
                })?;
        }
        Ok(())
    }

    /// The event manager this manager publishes to.
    #[must_use]
    pub fn events(&self) -> &Rc<EventManager> {
        &self.events
    }

    /// Registered systems, in update order.
    pub fn iter(&self) -> impl Iterator<Item = &SystemHandle> {
        self.systems.iter().map(|entry| &entry.handle)
    }

    /// Names of registered systems, in update order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.iter().map(|entry| entry.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl std::fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemManager")
            .field("systems", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct Physics {
        log: Log,
        last_dt: f32,
    }

    impl System for Physics {
        fn name(&self) -> &'static str {
            "physics"
        }

        fn update(&mut self, dt: f32) -> anyhow::Result<()> {
            self.last_dt = dt;
            self.log.borrow_mut().push("physics");
            Ok(())
        }
    }

    struct Ai {
        log: Log,
    }

    impl System for Ai {
        fn name(&self) -> &'static str {
            "ai"
        }

        fn update(&mut self, _dt: f32) -> anyhow::Result<()> {
            self.log.borrow_mut().push("ai");
            Ok(())
        }
    }

    struct Broken;

    impl System for Broken {
        fn update(&mut self, _dt: f32) -> anyhow::Result<()> {
            bail!("out of fuel")
        }
    }

    fn manager() -> SystemManager {
        SystemManager::new(Rc::new(EventManager::new()))
    }

    #[test]
    fn test_update_runs_in_registration_order() {
        let log: Log = Rc::default();
        let mut systems = manager();
        systems.add_system(Ai { log: log.clone() }).unwrap();
        systems
            .add_system(Physics {
                log: log.clone(),
                last_dt: 0.0,
            })
            .unwrap();

        systems.update(0.016).unwrap();
        systems.update(0.016).unwrap();
        assert_eq!(*log.borrow(), vec!["ai", "physics", "ai", "physics"]);
    }

    #[test]
    fn test_update_passes_dt_through() {
        let mut systems = manager();
        let physics = systems
            .add_system(Physics {
                log: Rc::default(),
                last_dt: 0.0,
            })
            .unwrap();
        systems.update(0.25).unwrap();
        assert_eq!(physics.borrow().last_dt, 0.25);
    }

    #[test]
    fn test_duplicate_system_type_rejected() {
        let mut systems = manager();
        systems.add_system(Ai { log: Rc::default() }).unwrap();
        let result = systems.add_system(Ai { log: Rc::default() });

        assert!(matches!(result, Err(SystemError::DuplicateSystemType(_))));
        assert_eq!(systems.len(), 1);
        // Only the first add was announced.
        assert_eq!(systems.events().pending(), 1);
    }

    #[test]
    fn test_get_system_returns_same_instance() {
        let mut systems = manager();
        let added = systems.add_system(Ai { log: Rc::default() }).unwrap();

        let first = systems.get_system::<Ai>().unwrap();
        let second = systems.get_system::<Ai>().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert!(Rc::ptr_eq(&first, &added));
    }

    #[test]
    fn test_get_unknown_system_type() {
        let systems = manager();
        assert!(matches!(
            systems.get_system::<Ai>(),
            Err(SystemError::UnknownSystemType(_))
        ));
        assert!(!systems.contains::<Ai>());
    }

    #[test]
    fn test_get_system_by_name() {
        let mut systems = manager();
        systems.add_system(Ai { log: Rc::default() }).unwrap();

        let handle = systems.get_system_by_name("ai").unwrap();
        assert_eq!(handle.borrow().name(), "ai");
        assert!(matches!(
            systems.get_system_by_name(""),
            Err(SystemError::NullArgument("name"))
        ));
        assert!(matches!(
            systems.get_system_by_name("render"),
            Err(SystemError::UnknownSystemType(name)) if name == "render"
        ));
    }

    #[test]
    fn test_system_added_event_carries_handle() {
        let events = Rc::new(EventManager::new());
        let seen: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let sink = seen.clone();
        events.subscribe_fn(EventType::SystemAdded, move |event| {
            if let Some(system) = event.payload::<SystemHandle>() {
                sink.borrow_mut().push(system.borrow().name());
            }
            Ok(())
        });

        let mut systems = SystemManager::new(events.clone());
        systems.add_system(Ai { log: Rc::default() }).unwrap();
        assert_eq!(events.pending(), 1);
        assert!(seen.borrow().is_empty());

        events.flush().unwrap();
        assert_eq!(*seen.borrow(), vec!["ai"]);
    }

    #[test]
    fn test_system_added_payload_downcasts_to_concrete_type() {
        let events = Rc::new(EventManager::new());
        let last_dt = Rc::new(std::cell::Cell::new(None));
        let sink = last_dt.clone();
        events.subscribe_fn(EventType::SystemAdded, move |event| {
            if let Some(handle) = event.payload::<SystemHandle>() {
                let system = handle.borrow();
                if let Some(physics) = system.downcast_ref::<Physics>() {
                    sink.set(Some(physics.last_dt));
                }
            }
            Ok(())
        });

        let mut systems = SystemManager::new(events.clone());
        systems.add_system(Ai { log: Rc::default() }).unwrap();
        systems
            .add_system(Physics {
                log: Rc::default(),
                last_dt: 0.5,
            })
            .unwrap();
        events.flush().unwrap();
        assert_eq!(last_dt.get(), Some(0.5));
    }

    #[test]
    fn test_failing_system_stops_tick() {
        let log: Log = Rc::default();
        let mut systems = manager();
        systems.add_system(Ai { log: log.clone() }).unwrap();
        systems.add_system(Broken).unwrap();
        systems
            .add_system(Physics {
                log: log.clone(),
                last_dt: 0.0,
            })
            .unwrap();

        let result = systems.update(0.1);
        match result {
            Err(SystemError::UpdateFailed { system, source }) => {
                assert!(system.ends_with("Broken"));
                assert_eq!(source.to_string(), "out of fuel");
            }
            other => panic!("expected update failure, got {other:?}"),
        }
        assert_eq!(*log.borrow(), vec!["ai"]);
    }

    #[test]
    fn test_borrowed_system_is_reported() {
        let mut systems = manager();
        let ai = systems.add_system(Ai { log: Rc::default() }).unwrap();
        let _guard = ai.borrow_mut();
        assert!(matches!(
            systems.update(0.1),
            Err(SystemError::SystemBorrowed("ai"))
        ));
    }
}

//! The [`System`] trait.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A unit of per-tick game logic.
///
/// Systems get whatever handles they need (event manager, entity manager,
/// ...) when they are constructed; the manager only drives their update.
pub trait System: AsAny {
    /// Name used in logs and errors. Defaults to the Rust type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Advance the system by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Any error aborts the current tick and is reported to the host.
    fn update(&mut self, dt: f32) -> anyhow::Result<()>;
}

/// `Any` access for systems behind `dyn System`. Implemented for every
/// `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn System {
    /// Returns `true` if this system is an `S`.
    #[must_use]
    pub fn is<S: System>(&self) -> bool {
        self.as_any().is::<S>()
    }

    #[must_use]
    pub fn downcast_ref<S: System>(&self) -> Option<&S> {
        self.as_any().downcast_ref::<S>()
    }

    pub fn downcast_mut<S: System>(&mut self) -> Option<&mut S> {
        self.as_any_mut().downcast_mut::<S>()
    }
}

/// Shared, type-erased handle to a registered system.
///
/// This is the payload of [`SystemAdded`](engine_event::EventType::SystemAdded);
/// listeners reach the concrete type with `downcast_ref` on `dyn System`.
pub type SystemHandle = Rc<RefCell<dyn System>>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Gravity {
        strength: f32,
    }

    impl System for Gravity {
        fn update(&mut self, _dt: f32) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Wind;

    impl System for Wind {
        fn update(&mut self, _dt: f32) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_downcast_handle_to_concrete_system() {
        let handle: SystemHandle = Rc::new(RefCell::new(Gravity { strength: 9.8 }));

        let system = handle.borrow();
        assert!(system.is::<Gravity>());
        assert!(!system.is::<Wind>());
        assert_eq!(system.downcast_ref::<Gravity>().map(|g| g.strength), Some(9.8));
        assert!(system.downcast_ref::<Wind>().is_none());
        drop(system);

        if let Some(gravity) = handle.borrow_mut().downcast_mut::<Gravity>() {
            gravity.strength = 1.6;
        }
        assert_eq!(handle.borrow().downcast_ref::<Gravity>().map(|g| g.strength), Some(1.6));
    }
}

//! Named actions.
//!
//! An action is a closure registered under a stable name during
//! configuration. Gameplay data (triggers, blueprints, editor bindings) refers
//! to actions by name, and the name is resolved here when the action runs.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::EventError;
use crate::event::EventType;
use crate::manager::{EventManager, Listener};

/// A named behaviour. Receives the triggering payload, or `()` if none.
pub type Action = Rc<dyn Fn(&dyn Any) -> anyhow::Result<()>>;

/// Registry of named actions.
#[derive(Default)]
pub struct ActionRegistry {
    actions: RefCell<HashMap<String, Action>>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DuplicateAction`] if the name is taken.
    pub fn register<F>(&self, name: impl Into<String>, action: F) -> Result<(), EventError>
    where
        F: Fn(&dyn Any) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        let mut actions = self.actions.borrow_mut();
        if actions.contains_key(&name) {
            return Err(EventError::DuplicateAction(name));
        }
        debug!(action = %name, "action registered");
        actions.insert(name, Rc::new(action));
        Ok(())
    }

    /// Remove the action registered under `name`.
    pub fn unregister(&self, name: &str) -> bool {
        self.actions.borrow_mut().remove(name).is_some()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.borrow().contains_key(name)
    }

    /// Registered action names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Run the action registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownAction`] if nothing is registered under
    /// `name`, or [`EventError::ActionFailed`] if the action itself fails.
    pub fn invoke(&self, name: &str, args: &dyn Any) -> Result<(), EventError> {
        let action = self
            .actions
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| EventError::UnknownAction(name.to_string()))?;

        action(args).map_err(|source| EventError::ActionFailed {
            action: name.to_string(),
            source,
        })
    }

    /// Run action `name` every time an event of `event_type` is delivered.
    ///
    /// The action is looked up on each delivery, so it may be registered
    /// after binding. Returns the listener so the binding can be removed with
    /// [`EventManager::unsubscribe`].
    pub fn bind(
        self: &Rc<Self>,
        events: &EventManager,
        event_type: EventType,
        name: impl Into<String>,
    ) -> Listener {
        let registry = Rc::clone(self);
        let name = name.into();
        events.subscribe_fn(event_type, move |event| {
            let args = event.payload_any().unwrap_or(&());
            registry.invoke(&name, args)?;
            Ok(())
        })
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

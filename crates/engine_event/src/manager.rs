//! Deferred event queue and listener dispatch.
//!
//! Producers call [`EventManager::queue_event`]; nothing is delivered until
//! the owner calls [`EventManager::flush`] at its chosen point in the tick.
//! A flush drains a snapshot of the queue: events queued by listeners while it
//! runs stay queued for the next flush.
//!
//! The manager is shared by handle (`Rc<EventManager>`) and uses interior
//! mutability, so listeners may queue events and (un)subscribe while a flush
//! is in progress. It is single-threaded by construction.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::{EventError, ListenerFailure};
use crate::event::{Event, EventType};

/// Callback invoked for each delivered event.
///
/// Listeners are identified by pointer: keep the `Rc` to unsubscribe later.
pub type Listener = Rc<dyn Fn(&Event) -> anyhow::Result<()>>;

/// Buffers events and delivers them to listeners on flush.
#[derive(Default)]
pub struct EventManager {
    queue: RefCell<VecDeque<Event>>,
    listeners: RefCell<HashMap<EventType, Vec<Listener>>>,
    /// Invoked for every event, after the type-specific listeners.
    catch_all: RefCell<Vec<Listener>>,
    flushing: Cell<bool>,
}

impl EventManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event carrying `payload`.
    pub fn queue_event<P: std::any::Any>(&self, event_type: EventType, payload: P) {
        self.queue(Event::new(event_type, payload));
    }

    /// Queue an event without a payload.
    pub fn queue_signal(&self, event_type: EventType) {
        self.queue(Event::signal(event_type));
    }

    /// Queue a pre-built event.
    pub fn queue(&self, event: Event) {
        debug!(event_type = %event.event_type(), "event queued");
        self.queue.borrow_mut().push_back(event);
    }

    /// Register `listener` for events of `event_type`.
    ///
    /// Registering the same listener twice makes it run twice per event.
    pub fn subscribe(&self, event_type: EventType, listener: Listener) {
        self.listeners
            .borrow_mut()
            .entry(event_type)
            .or_default()
            .push(listener);
    }

    /// Register a closure for events of `event_type`.
    ///
    /// Returns the listener handle for a later [`EventManager::unsubscribe`].
    pub fn subscribe_fn<F>(&self, event_type: EventType, f: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + 'static,
    {
        let listener: Listener = Rc::new(f);
        self.subscribe(event_type, listener.clone());
        listener
    }

    /// Remove one registration of `listener` for `event_type`, the most
    /// recent one.
    ///
    /// Returns `false`, and does nothing, if it was not registered.
    pub fn unsubscribe(&self, event_type: &EventType, listener: &Listener) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(registered) = listeners.get_mut(event_type) else {
            return false;
        };
        let Some(pos) = registered.iter().rposition(|l| Rc::ptr_eq(l, listener)) else {
            return false;
        };
        registered.remove(pos);
        if registered.is_empty() {
            listeners.remove(event_type);
        }
        true
    }

    /// Register `listener` for every event type.
    pub fn subscribe_all(&self, listener: Listener) {
        self.catch_all.borrow_mut().push(listener);
    }

    /// Remove one catch-all registration of `listener`.
    pub fn unsubscribe_all(&self, listener: &Listener) -> bool {
        let mut catch_all = self.catch_all.borrow_mut();
        match catch_all.iter().rposition(|l| Rc::ptr_eq(l, listener)) {
            Some(pos) => {
                catch_all.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of listeners registered for `event_type`, excluding catch-alls.
    #[must_use]
    pub fn listener_count(&self, event_type: &EventType) -> usize {
        self.listeners
            .borrow()
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Number of events waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Drop every queued event without delivering it.
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Deliver every event queued before this call, in FIFO order.
    ///
    /// For each event, the listeners registered for its type run in
    /// registration order, then the catch-all listeners. A failing listener
    /// does not stop delivery; failures are collected and returned once the
    /// whole batch has been delivered. Calling `flush` from inside a listener
    /// does nothing.
    ///
    /// Returns the number of events delivered.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::ListenerFailure`] if any listener failed.
    pub fn flush(&self) -> Result<usize, EventError> {
        if self.flushing.replace(true) {
            debug!("nested flush ignored");
            return Ok(0);
        }
        let _flushing = FlushGuard(&self.flushing);

        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let delivered = batch.len();
        let mut failures = Vec::new();

        for event in &batch {
            let listeners: Vec<Listener> = self
                .listeners
                .borrow()
                .get(event.event_type())
                .cloned()
                .unwrap_or_default();
            let catch_all: Vec<Listener> = self.catch_all.borrow().clone();

            for listener in listeners.iter().chain(catch_all.iter()) {
                if let Err(source) = listener(event) {
                    warn!(event_type = %event.event_type(), error = %source, "event listener failed");
                    failures.push(ListenerFailure {
                        event_type: event.event_type().clone(),
                        source,
                    });
                }
            }
        }

        if delivered > 0 {
            debug!(delivered, deferred = self.pending(), "event queue flushed");
        }

        if failures.is_empty() {
            Ok(delivered)
        } else {
            Err(EventError::ListenerFailure(failures))
        }
    }
}

/// Clears the in-flush flag when a flush ends, including by unwinding out
/// of a panicking listener.
struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("pending", &self.pending())
            .field("listener_types", &self.listeners.borrow().len())
            .field("catch_all", &self.catch_all.borrow().len())
            .finish()
    }
}

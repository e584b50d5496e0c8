//! # engine_event
//!
//! Decoupled, tick-scoped notification between systems and other
//! collaborators.
//!
//! - [`EventType`] / [`Event`] — what happened, with an optional payload.
//! - [`EventManager`] — buffers submitted events and delivers them to
//!   listeners when [`EventManager::flush`] is called. Events queued during a
//!   flush are delivered by the next one.
//! - [`ActionRegistry`] — named closures, resolved at configuration time and
//!   optionally bound to event types.
//! - [`error`] — event-layer error types.

pub mod actions;
pub mod error;
pub mod event;
pub mod manager;

pub use actions::{Action, ActionRegistry};
pub use error::{EventError, ListenerFailure};
pub use event::{Event, EventType};
pub use manager::{EventManager, Listener};

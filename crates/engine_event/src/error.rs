//! Event-layer error types.

use crate::event::EventType;

/// A listener that returned an error while an event was being delivered.
#[derive(Debug, thiserror::Error)]
#[error("listener for {event_type} failed: {source}")]
pub struct ListenerFailure {
    /// Type of the event being delivered.
    pub event_type: EventType,
    /// The error the listener returned.
    pub source: anyhow::Error,
}

/// Errors that can occur while dispatching events or invoking actions.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// One or more listeners failed during a flush. Every other listener
    /// still received its events.
    #[error("{} listener(s) failed during event flush", .0.len())]
    ListenerFailure(Vec<ListenerFailure>),

    /// No action is registered under this name.
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    /// An action with this name is already registered.
    #[error("action `{0}` is already registered")]
    DuplicateAction(String),

    /// The action ran and returned an error.
    #[error("action `{action}` failed: {source}")]
    ActionFailed {
        action: String,
        source: anyhow::Error,
    },
}

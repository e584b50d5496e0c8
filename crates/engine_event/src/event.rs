//! Event types and the event envelope.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Tag identifying what kind of event occurred.
///
/// Framework events are fixed variants; applications add their own through
/// [`EventType::User`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A system was added to the system manager. Payload: the system handle.
    SystemAdded,
    /// An entity was created. Payload: the entity.
    EntityCreated,
    /// An entity was removed. Payload: the entity.
    EntityRemoved,
    /// A component was attached. Payload: component event args.
    ComponentAdded,
    /// A component was detached. Payload: component event args.
    ComponentRemoved,
    /// The game session started.
    GameStarted,
    /// The game session was paused.
    GamePaused,
    /// The game session was resumed.
    GameResumed,
    /// Application-defined event.
    User(String),
}

impl EventType {
    /// Shorthand for an application-defined event type.
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self::User(name.into())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(name) => write!(f, "User({name})"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// A queued event: its type plus an optional shared payload.
#[derive(Clone)]
pub struct Event {
    event_type: EventType,
    payload: Option<Rc<dyn Any>>,
}

impl Event {
    /// Create an event carrying `payload`.
    #[must_use]
    pub fn new<P: Any>(event_type: EventType, payload: P) -> Self {
        Self {
            event_type,
            payload: Some(Rc::new(payload)),
        }
    }

    /// Create an event without a payload.
    #[must_use]
    pub fn signal(event_type: EventType) -> Self {
        Self {
            event_type,
            payload: None,
        }
    }

    #[must_use]
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Returns the payload if it is a `P`.
    #[must_use]
    pub fn payload<P: Any>(&self) -> Option<&P> {
        self.payload.as_deref().and_then(|p| p.downcast_ref::<P>())
    }

    /// Returns the untyped payload.
    #[must_use]
    pub fn payload_any(&self) -> Option<&dyn Any> {
        self.payload.as_deref()
    }

    #[must_use]
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_payload_access() {
        let event = Event::new(EventType::user("Scored"), 42u32);
        assert_eq!(event.payload::<u32>(), Some(&42));
        assert_eq!(event.payload::<i64>(), None);
    }

    #[test]
    fn test_signal_has_no_payload() {
        let event = Event::signal(EventType::GameStarted);
        assert!(!event.has_payload());
        assert!(event.payload::<u32>().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(EventType::SystemAdded.to_string(), "SystemAdded");
        assert_eq!(EventType::user("Hit").to_string(), "User(Hit)");
    }

    #[test]
    fn test_event_type_serialization() {
        let json = serde_json::to_string(&EventType::user("Hit")).unwrap();
        let restored: EventType = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, EventType::user("Hit"));
    }
}

//! Payload of component-related events.

use std::fmt;

use crate::component::ComponentRef;
use crate::entity::Entity;
use crate::error::ComponentError;

/// Information on a component event: the entity and the component it
/// occurred for.
///
/// Immutable once built. The component handle keeps a detached component
/// alive until every listener has seen the event.
#[derive(Clone)]
pub struct ComponentEventArgs {
    entity: Entity,
    component: ComponentRef,
}

impl ComponentEventArgs {
    /// Create event args for `component` on `entity`.
    #[must_use]
    pub fn new(entity: Entity, component: ComponentRef) -> Self {
        Self { entity, component }
    }

    /// Create event args from an optional component.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NullArgument`] if `component` is `None`.
    pub fn try_new(entity: Entity, component: Option<ComponentRef>) -> Result<Self, ComponentError> {
        let component = component.ok_or(ComponentError::NullArgument("component"))?;
        Ok(Self::new(entity, component))
    }

    /// The entity the event was fired for.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The component that was interacted with.
    #[must_use]
    pub fn component(&self) -> &ComponentRef {
        &self.component
    }
}

impl fmt::Debug for ComponentEventArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEventArgs")
            .field("entity", &self.entity)
            .field("component", &self.component.try_borrow().map(|c| c.name()))
            .finish()
    }
}

impl fmt::Display for ComponentEventArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component.try_borrow() {
            Ok(component) => write!(
                f,
                "Entity id: {}, component: {}",
                self.entity.id(),
                component.name()
            ),
            Err(_) => write!(f, "Entity id: {}, component: <borrowed>", self.entity.id()),
        }
    }
}

//! Component-layer error types.

use crate::component::ComponentTypeId;
use crate::entity::Entity;

/// Errors raised by component registration, attachment and initialisation.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A required argument was absent.
    #[error("required argument `{0}` is missing")]
    NullArgument(&'static str),

    /// The entity already holds a component of this type.
    #[error("{entity} already has a component of type {component}")]
    DuplicateComponent {
        /// The entity the component was attached to.
        entity: Entity,
        /// Name of the component type.
        component: &'static str,
    },

    /// No component type with this id has been registered.
    #[error("unknown component type {0}")]
    UnknownComponentType(ComponentTypeId),

    /// The entity is not alive.
    #[error("unknown entity {0}")]
    UnknownEntity(Entity),

    /// An attribute default could not be applied to a component.
    #[error("invalid attribute `{key}` for component {component}: {message}")]
    InvalidAttribute {
        /// Name of the component reading the attribute.
        component: &'static str,
        /// The attribute key.
        key: String,
        /// What went wrong.
        message: String,
    },

    /// Two different Rust types share a component type id because their
    /// names are equal.
    #[error("component types `{first}` and `{second}` share the type id {type_id}")]
    TypeIdCollision {
        type_id: ComponentTypeId,
        first: &'static str,
        second: &'static str,
    },

    /// A component type was registered twice, or two names hash to the same id.
    #[error("component type `{0}` is already registered")]
    DuplicateRegistration(&'static str),
}

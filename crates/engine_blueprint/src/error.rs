//! Blueprint error types.

use engine_component::ComponentTypeId;

/// Errors raised by blueprint edits and lookups.
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    /// A required argument was empty.
    #[error("required argument `{0}` is missing")]
    NullArgument(&'static str),

    /// The blueprint already declares this component type.
    #[error("component type {0} already added to blueprint")]
    DuplicateComponent(ComponentTypeId),

    /// Assigning the parent would make the blueprint its own ancestor.
    #[error("blueprint `{blueprint}` cannot inherit from `{parent}`: cycle")]
    CyclicBlueprintParent { blueprint: String, parent: String },

    /// Another blueprint already uses this id.
    #[error("blueprint id `{0}` already exists")]
    DuplicateBlueprintId(String),

    /// No blueprint is stored under the given key or id.
    #[error("unknown blueprint `{0}`")]
    UnknownBlueprint(String),

    /// The blueprint is the parent of other blueprints.
    #[error("blueprint `{id}` is the parent of {children} other blueprint(s)")]
    BlueprintHasChildren { id: String, children: usize },
}

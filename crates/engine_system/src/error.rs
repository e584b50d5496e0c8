//! System-layer error types.

/// Errors raised by the [`SystemManager`](crate::SystemManager).
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// A required argument was absent or empty.
    #[error("required argument `{0}` is missing")]
    NullArgument(&'static str),

    /// A system of this concrete type is already registered.
    #[error("a system of type {0} has already been added")]
    DuplicateSystemType(&'static str),

    /// No system of this exact type (or name) was ever added.
    #[error("a system of type {0} has never been added")]
    UnknownSystemType(String),

    /// The system was still borrowed elsewhere when the manager tried to
    /// update it.
    #[error("system {0} is borrowed and cannot be updated")]
    SystemBorrowed(&'static str),

    /// A system's update returned an error. Systems after it did not run.
    #[error("system {system} failed to update: {source}")]
    UpdateFailed {
        system: &'static str,
        source: anyhow::Error,
    },
}

//! Authoring support for blueprints.
//!
//! A [`BlueprintView`] presents one blueprint of a
//! [`BlueprintManager`](engine_blueprint::BlueprintManager) the way an
//! editor shows it: the component types it declares, the known types that
//! could still be added, and the pending id edit. Every mutation goes
//! through the manager, which stays the source of truth; invariant
//! violations come back as a [`ValidationError`] naming the edited field.

mod error;
mod view;

pub use error::{Field, ValidationError};
pub use view::BlueprintView;

//! # engine_blueprint
//!
//! Blueprints are named entity templates. Each declares a set of component
//! types and default attribute values, and may inherit from one parent
//! blueprint:
//!
//! - the effective component set is the union over the chain to the root;
//! - the effective value of an attribute is the nearest declaration, walking
//!   from the blueprint up to the root.
//!
//! [`Blueprint`] is the plain, locally declared data. [`BlueprintManager`]
//! owns the blueprints, keeps their ids unique, holds the parent links (by
//! key, so renames never break them) and rejects cycles.

pub mod blueprint;
pub mod error;
pub mod manager;

pub use blueprint::Blueprint;
pub use error::BlueprintError;
pub use manager::{BlueprintKey, BlueprintManager};

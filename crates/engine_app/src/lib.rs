//! # engine_app
//!
//! Wires the framework crates into a playable game session:
//!
//! - [`Game`] owns the shared [`EventManager`](engine_event::EventManager),
//!   the [`SystemManager`](engine_system::SystemManager), the entity store
//!   and the blueprint and component registries.
//! - [`EntityManager`] attaches and detaches components and instantiates
//!   entities from blueprints.
//! - [`TickLoop`] drives a [`Game`] at a fixed timestep.

mod entities;
mod error;
mod game;
mod tick;

pub use entities::EntityManager;
pub use error::GameError;
pub use game::{Game, GameState};
pub use tick::{TickConfig, TickLoop};

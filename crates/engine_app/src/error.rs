//! Error type for the game session.

use engine_blueprint::BlueprintError;
use engine_component::ComponentError;
use engine_event::EventError;
use engine_system::SystemError;

use crate::game::GameState;

/// Errors surfaced by [`Game`](crate::Game) and [`TickLoop`](crate::TickLoop).
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    System(#[from] SystemError),

    #[error(transparent)]
    Blueprint(#[from] BlueprintError),

    /// A lifecycle transition was requested from the wrong state.
    #[error("cannot {action} a game that is {state}")]
    InvalidState {
        action: &'static str,
        state: GameState,
    },

    #[error("tick rate must be positive, got {0}")]
    InvalidTickRate(f64),
}

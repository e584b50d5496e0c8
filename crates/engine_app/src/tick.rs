//! Fixed-timestep tick loop.
//!
//! The host owns the outer loop; [`TickLoop`] is the default host used by
//! the `engine_app` binary and by tests. Each tick calls [`Game::update`]
//! with the configured timestep.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::GameError;
use crate::game::Game;

/// Configuration for the tick loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

impl TickConfig {
    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Parse a config from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a JSON config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading tick config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing tick config {}", path.display()))
    }

    /// Duration of one tick.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTickRate`] unless `tick_rate` is a
    /// positive finite number.
    pub fn timestep(&self) -> Result<Duration, GameError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(GameError::InvalidTickRate(self.tick_rate));
        }
        Ok(Duration::from_secs_f64(1.0 / self.tick_rate))
    }
}

/// Drives a [`Game`] at a fixed timestep.
#[derive(Debug)]
pub struct TickLoop {
    /// Number of completed ticks.
    tick_id: u64,
    config: TickConfig,
    game: Game,
}

impl TickLoop {
    #[must_use]
    pub fn new(config: TickConfig, game: Game) -> Self {
        Self {
            tick_id: 0,
            config,
            game,
        }
    }

    /// Returns the number of completed ticks.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Consume the loop, returning the game.
    #[must_use]
    pub fn into_game(self) -> Game {
        self.game
    }

    /// Run one tick with elapsed time `dt` in seconds.
    ///
    /// # Errors
    ///
    /// Propagates the failure of [`Game::update`]; the tick counter is not
    /// advanced.
    pub fn tick(&mut self, dt: f32) -> Result<(), GameError> {
        debug!(tick_id = self.tick_id + 1, dt, "tick start");
        self.game.update(dt)?;
        self.tick_id += 1;
        Ok(())
    }

    /// Run ticks until `max_ticks` is reached, or forever if it is 0.
    ///
    /// Sleeps out the remainder of each timestep and warns when a tick
    /// overruns it. Returns the number of ticks run.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTickRate`] for a bad config, or the first
    /// failing tick's error.
    pub fn run(&mut self) -> Result<u64, GameError> {
        let tick_duration = self.config.timestep()?;
        let dt = tick_duration.as_secs_f32();
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(dt)?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }

        Ok(tick_count)
    }
}

//! # engine_app — demo host
//!
//! Builds a small game session (components, blueprints, systems and an
//! action binding) and drives it with the fixed-timestep [`TickLoop`].
//!
//! ```text
//! RUST_LOG=engine_app=debug engine_app --ticks 120 --tick-rate 30
//! ```

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use clap::Parser;
use engine_app::{EntityManager, Game, TickConfig, TickLoop};
use engine_blueprint::Blueprint;
use engine_component::{AttributeTable, Component, ComponentError, ComponentEventArgs, Entity};
use engine_event::{EventManager, EventType};
use engine_system::System;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "engine_app", about = "Run a demo ECS game session")]
struct Args {
    /// Number of ticks to run (0 = unlimited)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Target ticks per second
    #[arg(short = 'r', long)]
    tick_rate: Option<f64>,

    /// JSON tick config; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct Position {
    x: f64,
    y: f64,
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }

    fn init(&mut self, attributes: &AttributeTable) -> Result<(), ComponentError> {
        self.x = attributes.read("Position", "x")?.unwrap_or(self.x);
        self.y = attributes.read("Position", "y")?.unwrap_or(self.y);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Velocity {
    dx: f64,
    dy: f64,
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }

    fn init(&mut self, attributes: &AttributeTable) -> Result<(), ComponentError> {
        self.dx = attributes.read("Velocity", "speed")?.unwrap_or(self.dx);
        self.dy = attributes.read("Velocity", "lift")?.unwrap_or(self.dy);
        Ok(())
    }
}

/// Moves every entity with a velocity and raises `OutOfBounds` once it
/// leaves the arena.
struct Movement {
    entities: Rc<RefCell<EntityManager>>,
    events: Rc<EventManager>,
    bounds: f64,
}

impl System for Movement {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(&mut self, dt: f32) -> anyhow::Result<()> {
        let entities = self.entities.borrow();
        for entity in entities.entities_with(Velocity::component_type_id()) {
            let (Some(velocity), Some(mut position)) = (
                entities.get_component::<Velocity>(entity),
                entities.get_component_mut::<Position>(entity),
            ) else {
                continue;
            };
            let was_inside = position.x.abs() <= self.bounds;
            position.x += velocity.dx * f64::from(dt);
            position.y += velocity.dy * f64::from(dt);
            if was_inside && position.x.abs() > self.bounds {
                self.events.queue_event(EventType::user("OutOfBounds"), entity);
            }
        }
        Ok(())
    }
}

fn build_game() -> Result<Game> {
    let mut game = Game::new();
    game.register_component::<Position>()?;
    game.register_component::<Velocity>()?;

    let blueprints = game.blueprints_mut();
    let actor = blueprints.add_blueprint(
        "Actor",
        Blueprint::new()
            .with_component::<Position>()
            .with_attribute("x", 0.0)
            .with_attribute("y", 0.0),
    )?;
    let projectile = blueprints.add_blueprint(
        "Projectile",
        Blueprint::new()
            .with_component::<Velocity>()
            .with_attribute("speed", 40.0),
    )?;
    blueprints.set_parent(projectile, Some(actor))?;
    let rocket = blueprints.add_blueprint(
        "Rocket",
        Blueprint::new()
            .with_attribute("speed", 90.0)
            .with_attribute("lift", 5.0),
    )?;
    blueprints.set_parent(rocket, Some(projectile))?;

    let movement = Movement {
        entities: game.entities().clone(),
        events: game.events().clone(),
        bounds: 50.0,
    };
    game.add_system(movement)?;

    game.actions().register("Despawn", {
        let entities = game.entities().clone();
        move |args| {
            if let Some(&entity) = args.downcast_ref::<Entity>() {
                entities.borrow_mut().remove_entity(entity)?;
                info!(%entity, "despawned out of bounds");
            }
            Ok(())
        }
    })?;
    game.bind_action(EventType::user("OutOfBounds"), "Despawn");

    game.events()
        .subscribe_fn(EventType::ComponentAdded, |event| {
            if let Some(args) = event.payload::<ComponentEventArgs>() {
                info!(%args, "component added");
            }
            Ok(())
        });

    game.spawn("Actor")?;
    game.spawn("Projectile")?;
    game.spawn("Rocket")?;
    Ok(game)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TickConfig::load(path)?,
        None => TickConfig::default().with_max_ticks(120),
    };
    if let Some(ticks) = args.ticks {
        config = config.with_max_ticks(ticks);
    }
    if let Some(tick_rate) = args.tick_rate {
        config = config.with_tick_rate(tick_rate);
    }

    info!(?config, "engine demo starting");

    let mut game = build_game()?;
    game.start_game()?;

    let mut tick_loop = TickLoop::new(config, game);
    let ticks = tick_loop.run()?;

    let game = tick_loop.into_game();
    info!(
        ticks,
        entities = game.entities().borrow().len(),
        "engine demo finished"
    );
    Ok(())
}

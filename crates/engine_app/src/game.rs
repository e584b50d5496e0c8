//! The game session.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use engine_blueprint::{BlueprintError, BlueprintManager};
use engine_component::{Component, ComponentRegistry, ComponentTypeId, Entity};
use engine_event::{ActionRegistry, EventManager, EventType, Listener};
use engine_system::{System, SystemManager};
use tracing::{debug, info};

use crate::entities::EntityManager;
use crate::error::GameError;

/// Lifecycle state of a [`Game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Constructed; systems are not updated yet.
    Created,
    Running,
    /// Systems are skipped, events are still delivered.
    Paused,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "not started",
            Self::Running => "running",
            Self::Paused => "paused",
        })
    }
}

/// One game session: the managers and registries bound together.
///
/// All managers share one [`EventManager`]. The [`EntityManager`] sits
/// behind `Rc<RefCell<_>>` so systems can keep a handle to it.
pub struct Game {
    events: Rc<EventManager>,
    systems: SystemManager,
    entities: Rc<RefCell<EntityManager>>,
    blueprints: BlueprintManager,
    components: ComponentRegistry,
    actions: Rc<ActionRegistry>,
    state: GameState,
}

impl Game {
    #[must_use]
    pub fn new() -> Self {
        let events = Rc::new(EventManager::new());
        Self {
            systems: SystemManager::new(events.clone()),
            entities: Rc::new(RefCell::new(EntityManager::new(events.clone()))),
            blueprints: BlueprintManager::new(),
            components: ComponentRegistry::new(),
            actions: Rc::new(ActionRegistry::new()),
            state: GameState::Created,
            events,
        }
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn events(&self) -> &Rc<EventManager> {
        &self.events
    }

    #[must_use]
    pub fn systems(&self) -> &SystemManager {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut SystemManager {
        &mut self.systems
    }

    /// Shorthand for [`SystemManager::add_system`].
    ///
    /// # Errors
    ///
    /// Fails if a system of type `S` was already added.
    pub fn add_system<S: System>(&mut self, system: S) -> Result<Rc<RefCell<S>>, GameError> {
        Ok(self.systems.add_system(system)?)
    }

    #[must_use]
    pub fn entities(&self) -> &Rc<RefCell<EntityManager>> {
        &self.entities
    }

    #[must_use]
    pub fn blueprints(&self) -> &BlueprintManager {
        &self.blueprints
    }

    pub fn blueprints_mut(&mut self) -> &mut BlueprintManager {
        &mut self.blueprints
    }

    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Register component type `T` so blueprints can instantiate it.
    ///
    /// # Errors
    ///
    /// Fails if `T` is already registered.
    pub fn register_component<T: Component + Default>(&mut self) -> Result<ComponentTypeId, GameError> {
        Ok(self.components.register::<T>()?)
    }

    #[must_use]
    pub fn actions(&self) -> &Rc<ActionRegistry> {
        &self.actions
    }

    /// Run the action registered as `action` whenever `event_type` is
    /// delivered. The returned listener undoes the binding through
    /// [`EventManager::unsubscribe`].
    pub fn bind_action(&self, event_type: EventType, action: impl Into<String>) -> Listener {
        self.actions.bind(&self.events, event_type, action)
    }

    /// Instantiate the blueprint with id `blueprint_id`.
    ///
    /// # Errors
    ///
    /// Fails if no such blueprint exists or instantiation fails; see
    /// [`EntityManager::create_entity_from_blueprint`].
    pub fn spawn(&self, blueprint_id: &str) -> Result<Entity, GameError> {
        let key = self
            .blueprints
            .key_of(blueprint_id)
            .ok_or_else(|| BlueprintError::UnknownBlueprint(blueprint_id.to_string()))?;
        self.entities
            .borrow_mut()
            .create_entity_from_blueprint(&self.blueprints, key, &self.components)
    }

    /// Start the session and queue [`EventType::GameStarted`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] unless the game was just created.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.transition("start", GameState::Created, GameState::Running)?;
        info!(systems = self.systems.len(), "game started");
        self.events.queue_signal(EventType::GameStarted);
        Ok(())
    }

    /// Pause a running session and queue [`EventType::GamePaused`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] unless the game is running.
    pub fn pause_game(&mut self) -> Result<(), GameError> {
        self.transition("pause", GameState::Running, GameState::Paused)?;
        info!("game paused");
        self.events.queue_signal(EventType::GamePaused);
        Ok(())
    }

    /// Resume a paused session and queue [`EventType::GameResumed`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] unless the game is paused.
    pub fn resume_game(&mut self) -> Result<(), GameError> {
        self.transition("resume", GameState::Paused, GameState::Running)?;
        info!("game resumed");
        self.events.queue_signal(EventType::GameResumed);
        Ok(())
    }

    /// Run one tick: update every system while running, then flush the
    /// event queue once.
    ///
    /// # Errors
    ///
    /// A failing system aborts the tick before the flush; queued events stay
    /// pending for the next tick. Listener failures are reported after the
    /// flush has delivered every event.
    pub fn update(&mut self, dt: f32) -> Result<(), GameError> {
        if self.state == GameState::Running {
            self.systems.update(dt)?;
        }
        let delivered = self.events.flush()?;
        debug!(dt, delivered, state = %self.state, "game updated");
        Ok(())
    }

    fn transition(&mut self, action: &'static str, from: GameState, to: GameState) -> Result<(), GameError> {
        if self.state != from {
            return Err(GameError::InvalidState {
                action,
                state: self.state,
            });
        }
        self.state = to;
        Ok(())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.state)
            .field("systems", &self.systems)
            .field("entities", &self.entities.try_borrow().map(|e| e.len()).ok())
            .field("blueprints", &self.blueprints.len())
            .field("components", &self.components.len())
            .finish()
    }
}

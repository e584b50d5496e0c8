//! # engine_system
//!
//! Per-tick game logic for the ECS engine.
//!
//! A [`System`] receives one update per tick with the elapsed time. The
//! [`SystemManager`] holds at most one system per concrete type, updates them
//! in registration order, and announces each registration with a
//! [`SystemAdded`](engine_event::EventType::SystemAdded) event on the
//! [`EventManager`](engine_event::EventManager) it was constructed with.
//!
//! ## Usage
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use engine_event::EventManager;
//! use engine_system::{System, SystemManager};
//!
//! #[derive(Default)]
//! struct Gravity {
//!     elapsed: f32,
//! }
//!
//! impl System for Gravity {
//!     fn update(&mut self, dt: f32) -> anyhow::Result<()> {
//!         self.elapsed += dt;
//!         Ok(())
//!     }
//! }
//!
//! let events = Rc::new(EventManager::new());
//! let mut systems = SystemManager::new(events);
//! systems.add_system(Gravity::default()).unwrap();
//! systems.update(0.5).unwrap();
//! assert_eq!(systems.get_system::<Gravity>().unwrap().borrow().elapsed, 0.5);
//! ```

pub mod error;
pub mod manager;
pub mod system;

pub use error::SystemError;
pub use manager::SystemManager;
pub use system::{AsAny, System, SystemHandle};

//! # engine_component
//!
//! The "E" and "C" in ECS. Defines what an entity is, what a component is,
//! and how component types become known to the rest of the engine.
//!
//! This crate provides:
//!
//! - [`Entity`] — lightweight `u64` entity identifiers.
//! - [`EntityAllocator`] — ID allocator with recycling of released IDs.
//! - [`Component`] trait — the contract all attachable data must satisfy.
//! - [`AnyComponent`] — the object-safe view of a component, used for storage.
//! - [`ComponentRegistry`] — explicit, start-up time registration of component types.
//! - [`AttributeTable`] — default attribute values applied to new components.
//! - [`ComponentEventArgs`] — payload of component-related events.

pub mod attributes;
pub mod component;
pub mod entity;
pub mod error;
pub mod event_args;
pub mod registry;

pub use attributes::AttributeTable;
pub use component::{AnyComponent, Component, ComponentRef, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use error::ComponentError;
pub use event_args::ComponentEventArgs;
pub use registry::{ComponentMeta, ComponentRegistry};

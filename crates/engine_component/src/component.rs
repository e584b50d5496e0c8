//! Core [`Component`] trait and associated type identity.
//!
//! Every piece of data attached to an entity must implement [`Component`].
//! Components are not a class hierarchy: each kind is a plain Rust type that
//! implements the capability, and the engine dispatches on its
//! [`ComponentTypeId`] tag through the object-safe [`AnyComponent`] view.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm. This is deterministic across runs and
//! builds, so blueprint data can refer to component types by id.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeTable;
use crate::error::ComponentError;

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        T::component_type_id()
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The core component trait.
///
/// Components are plain data (and optionally behaviour) attached to at most
/// one entity slot of their type. A component declares a stable name and may
/// pull its initial state from the attribute defaults of the blueprint it is
/// created from.
///
/// # Examples
///
/// ```rust
/// use engine_component::{AttributeTable, Component, ComponentError};
///
/// #[derive(Debug, Default)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
///
///     fn init(&mut self, attributes: &AttributeTable) -> Result<(), ComponentError> {
///         if let Some(max) = attributes.read::<f32>("Health", "Health.Max")? {
///             self.max = max;
///             self.current = max;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Component: Any + fmt::Debug {
    /// A human-readable name for this component type.
    ///
    /// The name is the type's identity: it must be unique among the
    /// component types of a game. Attaching two Rust types with the same
    /// name to one entity fails with [`ComponentError::TypeIdCollision`].
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Returns the [`ComponentTypeId`] for this component.
    ///
    /// The default implementation hashes [`Component::type_name()`] with
    /// FNV-1a 64-bit.
    fn component_type_id() -> ComponentTypeId
    where
        Self: Sized,
    {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Applies attribute defaults to a freshly created instance.
    ///
    /// Keys a component does not recognise are ignored.
    fn init(&mut self, attributes: &AttributeTable) -> Result<(), ComponentError> {
        let _ = attributes;
        Ok(())
    }
}

/// Object-safe view over any [`Component`].
///
/// Implemented for every component type; storage and event payloads hold
/// components through this trait.
pub trait AnyComponent: fmt::Debug {
    /// The component's registered name.
    fn name(&self) -> &'static str;

    /// The component's type tag.
    fn component_type(&self) -> ComponentTypeId;

    /// Applies attribute defaults, see [`Component::init`].
    fn apply_attributes(&mut self, attributes: &AttributeTable) -> Result<(), ComponentError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponent for T {
    fn name(&self) -> &'static str {
        T::type_name()
    }

    fn component_type(&self) -> ComponentTypeId {
        T::component_type_id()
    }

    fn apply_attributes(&mut self, attributes: &AttributeTable) -> Result<(), ComponentError> {
        Component::init(self, attributes)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn AnyComponent {
    /// Returns `true` if the erased component is a `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Shared handle to an attached component.
///
/// The owning entity's slot holds one handle; event payloads may hold another
/// until they are dispatched.
pub type ComponentRef = Rc<RefCell<dyn AnyComponent>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }

        fn init(&mut self, attributes: &AttributeTable) -> Result<(), ComponentError> {
            if let Some(max) = attributes.read::<f32>("Health", "Health.Max")? {
                self.max = max;
                self.current = max;
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Velocity;

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    #[test]
    fn test_component_type_id_matches_from_name() {
        assert_eq!(
            Health::component_type_id(),
            ComponentTypeId::from_name("Health")
        );
        assert_eq!(ComponentTypeId::of::<Health>(), Health::component_type_id());
    }

    #[test]
    fn test_component_type_id_differs_between_types() {
        assert_ne!(Health::component_type_id(), Velocity::component_type_id());
    }

    #[test]
    fn test_fnv1a_known_vector() {
        // FNV-1a 64-bit of the empty string is the offset basis itself.
        assert_eq!(
            ComponentTypeId::from_name(""),
            ComponentTypeId(0xcbf2_9ce4_8422_2325)
        );
    }

    #[test]
    fn test_erased_component_describes_itself() {
        let health: Box<dyn AnyComponent> = Box::new(Health::default());
        assert_eq!(health.name(), "Health");
        assert_eq!(health.component_type(), Health::component_type_id());
        assert!(health.is::<Health>());
        assert!(!health.is::<Velocity>());
    }

    #[test]
    fn test_erased_init_applies_attributes() {
        let mut attributes = AttributeTable::new();
        attributes.set("Health.Max", 50.0);

        let component: ComponentRef = Rc::new(RefCell::new(Health::default()));
        component.borrow_mut().apply_attributes(&attributes).unwrap();

        let borrowed = component.borrow();
        let health = borrowed.downcast_ref::<Health>().unwrap();
        assert_eq!(
            health,
            &Health {
                current: 50.0,
                max: 50.0
            }
        );
    }

    #[test]
    fn test_default_init_ignores_attributes() {
        let mut attributes = AttributeTable::new();
        attributes.set("Velocity.X", 3.0);
        let mut velocity = Velocity;
        assert!(Component::init(&mut velocity, &attributes).is_ok());
    }
}

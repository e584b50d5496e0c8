//! Explicit component type registration.
//!
//! There is no runtime discovery of component types. Application start-up
//! code calls [`ComponentRegistry::register`] once per type; the registry then
//! knows how to name and construct each type from its [`ComponentTypeId`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::component::{Component, ComponentRef, ComponentTypeId};
use crate::error::ComponentError;

/// Metadata about a registered component type.
#[derive(Debug, Clone)]
pub struct ComponentMeta {
    /// The unique type identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component (e.g. `"Transform"`).
    pub name: &'static str,
    /// Builds a default-initialised instance.
    pub create: fn() -> ComponentRef,
}

/// The set of component types known to the engine.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    metas: HashMap<ComponentTypeId, ComponentMeta>,
    /// Registration order, for stable listings.
    order: Vec<ComponentTypeId>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register component type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DuplicateRegistration`] if `T`, or another
    /// type whose name hashes to the same id, is already registered.
    pub fn register<T: Component + Default>(&mut self) -> Result<ComponentTypeId, ComponentError> {
        let type_id = T::component_type_id();
        if self.metas.contains_key(&type_id) {
            return Err(ComponentError::DuplicateRegistration(T::type_name()));
        }

        let meta = ComponentMeta {
            type_id,
            name: T::type_name(),
            create: || -> ComponentRef { Rc::new(RefCell::new(T::default())) },
        };
        debug!(component = meta.name, %type_id, "registered component type");
        self.metas.insert(type_id, meta);
        self.order.push(type_id);
        Ok(type_id)
    }

    /// Construct a default instance of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownComponentType`] if the type was never
    /// registered.
    pub fn create(&self, type_id: ComponentTypeId) -> Result<ComponentRef, ComponentError> {
        self.metas
            .get(&type_id)
            .map(|meta| (meta.create)())
            .ok_or(ComponentError::UnknownComponentType(type_id))
    }

    #[must_use]
    pub fn meta(&self, type_id: ComponentTypeId) -> Option<&ComponentMeta> {
        self.metas.get(&type_id)
    }

    /// Returns the registered name of a component type.
    #[must_use]
    pub fn name_of(&self, type_id: ComponentTypeId) -> Option<&'static str> {
        self.metas.get(&type_id).map(|meta| meta.name)
    }

    /// Looks a component type up by its registered name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<ComponentTypeId> {
        let type_id = ComponentTypeId::from_name(name);
        self.metas.contains_key(&type_id).then_some(type_id)
    }

    #[must_use]
    pub fn contains(&self, type_id: ComponentTypeId) -> bool {
        self.metas.contains_key(&type_id)
    }

    /// All registered component types, in registration order.
    pub fn known_types(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Sprite {
        layer: i32,
    }

    impl Component for Sprite {
        fn type_name() -> &'static str {
            "Sprite"
        }
    }

    #[derive(Debug, Default)]
    struct Collider;

    impl Component for Collider {
        fn type_name() -> &'static str {
            "Collider"
        }
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = ComponentRegistry::new();
        let sprite = registry.register::<Sprite>().unwrap();
        assert_eq!(sprite, Sprite::component_type_id());

        let instance = registry.create(sprite).unwrap();
        let borrowed = instance.borrow();
        assert_eq!(borrowed.name(), "Sprite");
        assert_eq!(borrowed.downcast_ref::<Sprite>().unwrap().layer, 0);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Sprite>().unwrap();
        let result = registry.register::<Sprite>();
        assert!(matches!(
            result,
            Err(ComponentError::DuplicateRegistration("Sprite"))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_unknown_type_fails() {
        let registry = ComponentRegistry::new();
        let result = registry.create(ComponentTypeId::from_name("Nothing"));
        assert!(matches!(result, Err(ComponentError::UnknownComponentType(_))));
    }

    #[test]
    fn test_known_types_in_registration_order() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Collider>().unwrap();
        registry.register::<Sprite>().unwrap();
        let known: Vec<_> = registry.known_types().collect();
        assert_eq!(
            known,
            vec![Collider::component_type_id(), Sprite::component_type_id()]
        );
    }

    #[test]
    fn test_name_lookups() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Sprite>().unwrap();
        assert_eq!(registry.name_of(Sprite::component_type_id()), Some("Sprite"));
        assert_eq!(
            registry.find_by_name("Sprite"),
            Some(Sprite::component_type_id())
        );
        assert_eq!(registry.find_by_name("Collider"), None);
    }
}

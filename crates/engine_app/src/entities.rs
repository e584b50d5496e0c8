//! Entity and component storage for a game session.
//!
//! The [`EntityManager`] owns the entity allocator and the components
//! attached to every live entity. Every structural change is announced
//! through the session's [`EventManager`]; listeners see it on the next
//! flush.

use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use engine_blueprint::{BlueprintKey, BlueprintManager};
use engine_component::{
    Component, ComponentError, ComponentEventArgs, ComponentRef, ComponentRegistry,
    ComponentTypeId, Entity, EntityAllocator,
};
use engine_event::{EventManager, EventType};
use tracing::{debug, info};

use crate::error::GameError;

/// Creates and removes entities and attaches components to them.
pub struct EntityManager {
    events: Rc<EventManager>,
    allocator: EntityAllocator,
    /// Components of each live entity, in attachment order.
    components: HashMap<Entity, Vec<Attached>>,
}

/// An attached component, keyed by its type so lookups never borrow it.
struct Attached {
    component_type: ComponentTypeId,
    /// Concrete Rust type, to tell apart two types whose names hash alike.
    rust_type: TypeId,
    name: &'static str,
    component: ComponentRef,
}

impl EntityManager {
    /// Create an empty store publishing to `events`.
    #[must_use]
    pub fn new(events: Rc<EventManager>) -> Self {
        Self {
            events,
            allocator: EntityAllocator::new(),
            components: HashMap::new(),
        }
    }

    /// Allocate a new entity without components and queue
    /// [`EventType::EntityCreated`].
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.components.insert(entity, Vec::new());
        debug!(%entity, "entity created");
        self.events.queue_event(EventType::EntityCreated, entity);
        entity
    }

    /// Detach every component of `entity`, then release its id.
    ///
    /// Queues one [`EventType::ComponentRemoved`] per component followed by
    /// [`EventType::EntityRemoved`].
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownEntity`] if `entity` is not alive.
    pub fn remove_entity(&mut self, entity: Entity) -> Result<(), ComponentError> {
        let components = self
            .components
            .remove(&entity)
            .ok_or(ComponentError::UnknownEntity(entity))?;

        for attached in components {
            self.events.queue_event(
                EventType::ComponentRemoved,
                ComponentEventArgs::new(entity, attached.component),
            );
        }
        self.allocator.release(entity);

        debug!(%entity, "entity removed");
        self.events.queue_event(EventType::EntityRemoved, entity);
        Ok(())
    }

    /// Attach `component` to `entity` and return the shared handle.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownEntity`] if `entity` is not alive and
    /// [`ComponentError::DuplicateComponent`] if it already holds a `T`.
    /// Component types are identified by the hash of
    /// [`Component::type_name`]; a different Rust type with the same name
    /// fails with [`ComponentError::TypeIdCollision`].
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<ComponentRef, ComponentError> {
        let component: ComponentRef = Rc::new(RefCell::new(component));
        self.add_component_ref(entity, component.clone())?;
        Ok(component)
    }

    /// Attach an already shared component, for instance one built by a
    /// [`ComponentRegistry`].
    ///
    /// Queues [`EventType::ComponentAdded`] with [`ComponentEventArgs`].
    ///
    /// # Errors
    ///
    /// See [`EntityManager::add_component`].
    pub fn add_component_ref(
        &mut self,
        entity: Entity,
        component: ComponentRef,
    ) -> Result<(), ComponentError> {
        let (component_type, rust_type, name) = {
            let c = component.borrow();
            (c.component_type(), Any::type_id(c.as_any()), c.name())
        };
        let attached = self
            .components
            .get_mut(&entity)
            .ok_or(ComponentError::UnknownEntity(entity))?;
        if let Some(existing) = attached.iter().find(|a| a.component_type == component_type) {
            if existing.rust_type != rust_type {
                return Err(ComponentError::TypeIdCollision {
                    type_id: component_type,
                    first: existing.name,
                    second: name,
                });
            }
            return Err(ComponentError::DuplicateComponent {
                entity,
                component: name,
            });
        }

        attached.push(Attached {
            component_type,
            rust_type,
            name,
            component: component.clone(),
        });
        debug!(%entity, component = name, "component added");
        self.events.queue_event(
            EventType::ComponentAdded,
            ComponentEventArgs::new(entity, component),
        );
        Ok(())
    }

    /// Detach the component of `component_type` from `entity`.
    ///
    /// Returns the detached component, or `None` if the entity holds no
    /// component of that type. Queues [`EventType::ComponentRemoved`] when a
    /// component was detached.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownEntity`] if `entity` is not alive.
    pub fn remove_component(
        &mut self,
        entity: Entity,
        component_type: ComponentTypeId,
    ) -> Result<Option<ComponentRef>, ComponentError> {
        let attached = self
            .components
            .get_mut(&entity)
            .ok_or(ComponentError::UnknownEntity(entity))?;
        let Some(pos) = attached
            .iter()
            .position(|a| a.component_type == component_type)
        else {
            return Ok(None);
        };

        let component = attached.remove(pos).component;
        debug!(%entity, %component_type, "component removed");
        self.events.queue_event(
            EventType::ComponentRemoved,
            ComponentEventArgs::new(entity, component.clone()),
        );
        Ok(Some(component))
    }

    /// The shared handle of `entity`'s component of `component_type`.
    #[must_use]
    pub fn component_ref(&self, entity: Entity, component_type: ComponentTypeId) -> Option<&ComponentRef> {
        self.components
            .get(&entity)?
            .iter()
            .find(|a| a.component_type == component_type)
            .map(|a| &a.component)
    }

    /// Borrow `entity`'s `T` component.
    ///
    /// Returns `None` if the entity holds no `T` or it is mutably borrowed
    /// elsewhere.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<Ref<'_, T>> {
        let cell = self.component_ref(entity, T::component_type_id())?;
        let component = cell.try_borrow().ok()?;
        Ref::filter_map(component, |c| c.downcast_ref::<T>()).ok()
    }

    /// Mutably borrow `entity`'s `T` component.
    #[must_use]
    pub fn get_component_mut<T: Component>(&self, entity: Entity) -> Option<RefMut<'_, T>> {
        let cell = self.component_ref(entity, T::component_type_id())?;
        let component = cell.try_borrow_mut().ok()?;
        RefMut::filter_map(component, |c| c.downcast_mut::<T>()).ok()
    }

    #[must_use]
    pub fn has_component(&self, entity: Entity, component_type: ComponentTypeId) -> bool {
        self.component_ref(entity, component_type).is_some()
    }

    /// Component handles of `entity`, in attachment order.
    pub fn components_of(&self, entity: Entity) -> impl Iterator<Item = &ComponentRef> {
        self.components
            .get(&entity)
            .into_iter()
            .flatten()
            .map(|a| &a.component)
    }

    /// Component types attached to `entity`, in attachment order.
    #[must_use]
    pub fn component_types_of(&self, entity: Entity) -> Vec<ComponentTypeId> {
        self.components
            .get(&entity)
            .map(|attached| attached.iter().map(|a| a.component_type).collect())
            .unwrap_or_default()
    }

    /// Live entities holding a component of `component_type`, ascending.
    #[must_use]
    pub fn entities_with(&self, component_type: ComponentTypeId) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self
            .components
            .iter()
            .filter(|(_, attached)| attached.iter().any(|a| a.component_type == component_type))
            .map(|(&entity, _)| entity)
            .collect();
        entities.sort_unstable();
        entities
    }

    /// Create an entity with every component type resolved from the
    /// blueprint `key`, each initialised with the resolved attribute
    /// defaults.
    ///
    /// All components are built before the entity is allocated, so a
    /// failure leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// Fails if the blueprint is unknown, a resolved type is not
    /// registered, or a component rejects the attribute defaults.
    pub fn create_entity_from_blueprint(
        &mut self,
        blueprints: &BlueprintManager,
        key: BlueprintKey,
        registry: &ComponentRegistry,
    ) -> Result<Entity, GameError> {
        let component_types = blueprints.resolve_component_types(key)?;
        let attributes = blueprints.resolve_attributes(key)?;

        let mut components = Vec::with_capacity(component_types.len());
        for component_type in component_types {
            let component = registry.create(component_type)?;
            component.borrow_mut().apply_attributes(&attributes)?;
            components.push(component);
        }

        let entity = self.create_entity();
        for component in components {
            self.add_component_ref(entity, component)?;
        }

        info!(
            %entity,
            blueprint = blueprints.id_of(key).unwrap_or_default(),
            components = self.components_of(entity).count(),
            "entity created from blueprint"
        );
        Ok(entity)
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.components.contains_key(&entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.components.len())
            .finish()
    }
}

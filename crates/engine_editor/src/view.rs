//! Editor view over a single blueprint.

use engine_blueprint::{BlueprintError, BlueprintKey, BlueprintManager};
use engine_component::ComponentTypeId;
use tracing::debug;

use crate::error::{Field, ValidationError};

/// Editor state for one blueprint.
///
/// `added` mirrors the blueprint's own declarations. `available` lists the
/// known component types that are neither declared here nor provided by an
/// ancestor. The two never overlap.
#[derive(Debug, Clone)]
pub struct BlueprintView {
    key: BlueprintKey,
    id: String,
    new_id: String,
    known: Vec<ComponentTypeId>,
    added: Vec<ComponentTypeId>,
    available: Vec<ComponentTypeId>,
}

impl BlueprintView {
    /// Open a view on `key`. No component types are known yet.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::UnknownBlueprint`] if `key` is not stored.
    pub fn new(manager: &BlueprintManager, key: BlueprintKey) -> Result<Self, BlueprintError> {
        let id = manager
            .id_of(key)
            .ok_or_else(|| BlueprintError::UnknownBlueprint(format!("{key:?}")))?
            .to_string();
        let mut view = Self {
            key,
            new_id: id.clone(),
            id,
            known: Vec::new(),
            added: Vec::new(),
            available: Vec::new(),
        };
        view.refresh(manager);
        Ok(view)
    }

    #[must_use]
    pub fn key(&self) -> BlueprintKey {
        self.key
    }

    /// The committed blueprint id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The id being edited. Equal to [`BlueprintView::id`] unless the last
    /// edit was rejected.
    #[must_use]
    pub fn new_id(&self) -> &str {
        &self.new_id
    }

    /// Component types declared on the blueprint itself.
    #[must_use]
    pub fn added(&self) -> &[ComponentTypeId] {
        &self.added
    }

    /// Known component types that can still be added.
    #[must_use]
    pub fn available(&self) -> &[ComponentTypeId] {
        &self.available
    }

    /// Replace the set of component types the editor offers, then refresh.
    pub fn set_known_components(
        &mut self,
        manager: &BlueprintManager,
        known: impl IntoIterator<Item = ComponentTypeId>,
    ) {
        self.known.clear();
        for component_type in known {
            if !self.known.contains(&component_type) {
                self.known.push(component_type);
            }
        }
        self.refresh(manager);
    }

    /// Rebuild both lists from the manager, for instance after the
    /// blueprint or one of its ancestors was edited elsewhere.
    pub fn refresh(&mut self, manager: &BlueprintManager) {
        if let Some(id) = manager.id_of(self.key) {
            self.id = id.to_string();
        }
        self.added = manager
            .get(self.key)
            .map(|blueprint| blueprint.component_types().to_vec())
            .unwrap_or_default();
        let inherited = manager.inherited_component_types(self.key);
        self.available = self
            .known
            .iter()
            .copied()
            .filter(|t| !self.added.contains(t) && !inherited.contains(t))
            .collect();
    }

    /// Declare `component_type` on the blueprint and move it from
    /// `available` to `added`.
    ///
    /// # Errors
    ///
    /// Fails on the [`Field::Components`] field if the type is already
    /// declared on this blueprint.
    pub fn add_component(
        &mut self,
        manager: &mut BlueprintManager,
        component_type: ComponentTypeId,
    ) -> Result<(), ValidationError> {
        let blueprint = manager
            .get_mut(self.key)
            .ok_or_else(|| missing(Field::Components, &self.id))?;
        blueprint.add_component(component_type).map_err(|_| {
            ValidationError::new(
                Field::Components,
                format!("Component type '{component_type}' already added to blueprint."),
            )
        })?;

        self.available.retain(|&t| t != component_type);
        self.added.push(component_type);
        debug!(blueprint = %self.id, %component_type, "component type added");
        Ok(())
    }

    /// Remove `component_type` from the blueprint. A known type that no
    /// ancestor provides becomes available again.
    ///
    /// Returns whether a removal occurred.
    pub fn remove_component(&mut self, manager: &mut BlueprintManager, component_type: ComponentTypeId) -> bool {
        let removed = manager
            .get_mut(self.key)
            .is_some_and(|blueprint| blueprint.remove_component(component_type));
        if !removed {
            return false;
        }

        self.added.retain(|&t| t != component_type);
        let inherited = manager.inherited_component_types(self.key);
        if self.known.contains(&component_type)
            && !inherited.contains(&component_type)
            && !self.available.contains(&component_type)
        {
            self.available.push(component_type);
        }
        debug!(blueprint = %self.id, %component_type, "component type removed");
        true
    }

    /// Edit the blueprint id and rename it in the manager when valid.
    ///
    /// The edited value is kept even when rejected, so the editor can keep
    /// showing it next to the error.
    ///
    /// # Errors
    ///
    /// Fails on the [`Field::Id`] field for an empty id or one used by
    /// another blueprint; the blueprint keeps its committed id.
    pub fn set_new_id(&mut self, manager: &mut BlueprintManager, new_id: impl Into<String>) -> Result<(), ValidationError> {
        self.new_id = new_id.into();
        match manager.rename(self.key, self.new_id.clone()) {
            Ok(()) => {
                self.id = self.new_id.clone();
                Ok(())
            }
            Err(BlueprintError::NullArgument(_)) => {
                Err(ValidationError::new(Field::Id, "Blueprint id must not be empty."))
            }
            Err(BlueprintError::DuplicateBlueprintId(_)) => {
                Err(ValidationError::new(Field::Id, "Blueprint id already exists."))
            }
            Err(err) => Err(ValidationError::new(Field::Id, err.to_string())),
        }
    }

    /// Make the blueprint with id `parent` the parent, or clear it with
    /// `None`. Refreshes `available` for the new ancestry.
    ///
    /// # Errors
    ///
    /// Fails on the [`Field::Parent`] field for an unknown id or a parent
    /// that would create a cycle; the existing parent is kept.
    pub fn set_parent(&mut self, manager: &mut BlueprintManager, parent: Option<&str>) -> Result<(), ValidationError> {
        let parent_key = match parent {
            Some(id) => Some(manager.key_of(id).ok_or_else(|| {
                ValidationError::new(Field::Parent, format!("Unknown blueprint '{id}'."))
            })?),
            None => None,
        };

        manager.set_parent(self.key, parent_key).map_err(|err| match err {
            BlueprintError::CyclicBlueprintParent { parent, .. } => ValidationError::new(
                Field::Parent,
                format!("Blueprint '{parent}' already inherits from '{}'.", self.id),
            ),
            other => ValidationError::new(Field::Parent, other.to_string()),
        })?;

        self.refresh(manager);
        Ok(())
    }
}

fn missing(field: Field, id: &str) -> ValidationError {
    ValidationError::new(field, format!("Blueprint '{id}' no longer exists."))
}

#[cfg(test)]
mod tests {
    use engine_blueprint::Blueprint;

    use super::*;

    const A: ComponentTypeId = ComponentTypeId::from_name("A");
    const B: ComponentTypeId = ComponentTypeId::from_name("B");
    const C: ComponentTypeId = ComponentTypeId::from_name("C");
    const D: ComponentTypeId = ComponentTypeId::from_name("D");

    fn setup() -> (BlueprintManager, BlueprintKey, BlueprintKey) {
        let mut manager = BlueprintManager::new();
        let mut parent = Blueprint::new();
        parent.add_component(A).unwrap();
        let parent = manager.add_blueprint("Parent", parent).unwrap();

        let mut child = Blueprint::new();
        child.add_component(B).unwrap();
        let child = manager.add_blueprint("Child", child).unwrap();
        manager.set_parent(child, Some(parent)).unwrap();
        (manager, parent, child)
    }

    fn assert_disjoint(view: &BlueprintView) {
        for t in view.added() {
            assert!(!view.available().contains(t));
        }
    }

    #[test]
    fn test_available_excludes_added_and_inherited() {
        let (manager, _, child) = setup();
        let mut view = BlueprintView::new(&manager, child).unwrap();
        view.set_known_components(&manager, [A, B, C, D]);

        assert_eq!(view.added(), &[B]);
        assert_eq!(view.available(), &[C, D]);
        assert_disjoint(&view);
    }

    #[test]
    fn test_add_moves_type_to_added() {
        let (mut manager, _, child) = setup();
        let mut view = BlueprintView::new(&manager, child).unwrap();
        view.set_known_components(&manager, [A, B, C, D]);

        view.add_component(&mut manager, C).unwrap();
        assert_eq!(view.added(), &[B, C]);
        assert_eq!(view.available(), &[D]);
        assert!(manager.get(child).unwrap().has_component(C));
        assert_disjoint(&view);
    }

    #[test]
    fn test_add_duplicate_is_field_error() {
        let (mut manager, _, child) = setup();
        let mut view = BlueprintView::new(&manager, child).unwrap();

        let err = view.add_component(&mut manager, B).unwrap_err();
        assert_eq!(err.field, Field::Components);
        assert!(err.message.contains("already added"));
        assert_eq!(view.added(), &[B]);
    }

    #[test]
    fn test_remove_returns_known_type_to_available() {
        let (mut manager, _, child) = setup();
        let mut view = BlueprintView::new(&manager, child).unwrap();
        view.set_known_components(&manager, [A, B, C]);

        assert!(view.remove_component(&mut manager, B));
        assert!(view.added().is_empty());
        assert_eq!(view.available(), &[C, B]);
        assert!(!view.remove_component(&mut manager, B));
    }

    #[test]
    fn test_remove_unknown_type_stays_hidden() {
        let (mut manager, _, child) = setup();
        let mut view = BlueprintView::new(&manager, child).unwrap();
        view.set_known_components(&manager, [C]);

        assert!(view.remove_component(&mut manager, B));
        assert_eq!(view.available(), &[C]);
    }

    #[test]
    fn test_add_then_remove_restores_blueprint() {
        let (mut manager, _, child) = setup();
        let before = manager.get(child).unwrap().clone();
        let mut view = BlueprintView::new(&manager, child).unwrap();
        view.set_known_components(&manager, [A, B, C, D]);

        view.add_component(&mut manager, D).unwrap();
        view.remove_component(&mut manager, D);
        assert_eq!(manager.get(child).unwrap(), &before);
        assert_eq!(view.available(), &[C, D]);
    }

    #[test]
    fn test_duplicate_id_is_field_error() {
        let (mut manager, _, child) = setup();
        let mut view = BlueprintView::new(&manager, child).unwrap();

        let err = view.set_new_id(&mut manager, "Parent").unwrap_err();
        assert_eq!(
            err,
            ValidationError::new(Field::Id, "Blueprint id already exists.")
        );
        assert_eq!(view.id(), "Child");
        assert_eq!(view.new_id(), "Parent");
        assert_eq!(manager.id_of(child), Some("Child"));

        view.set_new_id(&mut manager, "Goblin").unwrap();
        assert_eq!(view.id(), "Goblin");
        assert_eq!(manager.key_of("Goblin"), Some(child));
    }

    #[test]
    fn test_empty_id_is_field_error() {
        let (mut manager, _, child) = setup();
        let mut view = BlueprintView::new(&manager, child).unwrap();
        let err = view.set_new_id(&mut manager, "").unwrap_err();
        assert_eq!(err.field, Field::Id);
        assert_eq!(view.id(), "Child");
    }

    #[test]
    fn test_cyclic_parent_is_field_error() {
        let (mut manager, parent, child) = setup();
        let mut view = BlueprintView::new(&manager, parent).unwrap();

        let err = view.set_parent(&mut manager, Some("Child")).unwrap_err();
        assert_eq!(err.field, Field::Parent);
        assert_eq!(manager.parent_of(parent), None);
        assert_eq!(manager.parent_of(child), Some(parent));

        let err = view.set_parent(&mut manager, Some("Nobody")).unwrap_err();
        assert_eq!(err.message, "Unknown blueprint 'Nobody'.");
    }

    #[test]
    fn test_clearing_parent_reveals_inherited_types() {
        let (mut manager, _, child) = setup();
        let mut view = BlueprintView::new(&manager, child).unwrap();
        view.set_known_components(&manager, [A, B, C]);
        assert_eq!(view.available(), &[C]);

        view.set_parent(&mut manager, None).unwrap();
        assert_eq!(view.available(), &[A, C]);
    }
}

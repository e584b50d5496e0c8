//! Blueprint registry and inheritance resolution.

use std::collections::HashMap;

use engine_component::{AttributeTable, ComponentTypeId};
use serde_json::Value;
use slotmap::{SlotMap, new_key_type};
use tracing::{debug, info};

use crate::blueprint::Blueprint;
use crate::error::BlueprintError;

new_key_type! {
    /// Stable handle to a blueprint stored in a [`BlueprintManager`].
    pub struct BlueprintKey;
}

#[derive(Debug)]
struct BlueprintEntry {
    id: String,
    parent: Option<BlueprintKey>,
    blueprint: Blueprint,
}

/// Owns a set of blueprints with unique ids and acyclic parent links.
///
/// Resolution walks the parent chain on every call; nothing is cached, so
/// edits to any ancestor are visible immediately.
#[derive(Debug, Default)]
pub struct BlueprintManager {
    entries: SlotMap<BlueprintKey, BlueprintEntry>,
    ids: HashMap<String, BlueprintKey>,
}

impl BlueprintManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `blueprint` under `id`, without a parent.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::NullArgument`] for an empty id and
    /// [`BlueprintError::DuplicateBlueprintId`] if the id is taken.
    pub fn add_blueprint(
        &mut self,
        id: impl Into<String>,
        blueprint: Blueprint,
    ) -> Result<BlueprintKey, BlueprintError> {
        let id = id.into();
        if id.is_empty() {
            return Err(BlueprintError::NullArgument("id"));
        }
        if self.ids.contains_key(&id) {
            return Err(BlueprintError::DuplicateBlueprintId(id));
        }

        let key = self.entries.insert(BlueprintEntry {
            id: id.clone(),
            parent: None,
            blueprint,
        });
        debug!(blueprint = %id, "blueprint added");
        self.ids.insert(id, key);
        Ok(key)
    }

    /// Remove a blueprint, returning its id and local data.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::BlueprintHasChildren`] while other
    /// blueprints inherit from it.
    pub fn remove_blueprint(&mut self, key: BlueprintKey) -> Result<(String, Blueprint), BlueprintError> {
        let id = self.entry(key)?.id.clone();
        let children = self.children_of(key).len();
        if children > 0 {
            return Err(BlueprintError::BlueprintHasChildren { id, children });
        }

        self.ids.remove(&id);
        let entry = self
            .entries
            .remove(key)
            .ok_or_else(|| BlueprintError::UnknownBlueprint(id.clone()))?;
        debug!(blueprint = %id, "blueprint removed");
        Ok((entry.id, entry.blueprint))
    }

    #[must_use]
    pub fn get(&self, key: BlueprintKey) -> Option<&Blueprint> {
        self.entries.get(key).map(|entry| &entry.blueprint)
    }

    /// Mutable access to a blueprint's local declarations.
    pub fn get_mut(&mut self, key: BlueprintKey) -> Option<&mut Blueprint> {
        self.entries.get_mut(key).map(|entry| &mut entry.blueprint)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Blueprint> {
        self.key_of(id).and_then(|key| self.get(key))
    }

    #[must_use]
    pub fn key_of(&self, id: &str) -> Option<BlueprintKey> {
        self.ids.get(id).copied()
    }

    #[must_use]
    pub fn id_of(&self, key: BlueprintKey) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.id.as_str())
    }

    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Change the id of a blueprint. Parent and child links are unaffected.
    ///
    /// Renaming a blueprint to its current id does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::DuplicateBlueprintId`] if another blueprint
    /// already uses `new_id`; the id is left unchanged.
    pub fn rename(&mut self, key: BlueprintKey, new_id: impl Into<String>) -> Result<(), BlueprintError> {
        let new_id = new_id.into();
        if new_id.is_empty() {
            return Err(BlueprintError::NullArgument("id"));
        }
        let old_id = self.entry(key)?.id.clone();
        if old_id == new_id {
            return Ok(());
        }
        if self.ids.contains_key(&new_id) {
            return Err(BlueprintError::DuplicateBlueprintId(new_id));
        }

        self.ids.remove(&old_id);
        self.ids.insert(new_id.clone(), key);
        if let Some(entry) = self.entries.get_mut(key) {
            entry.id = new_id.clone();
        }
        info!(from = %old_id, to = %new_id, "blueprint renamed");
        Ok(())
    }

    /// Make `parent` the parent of `key`, or clear the parent with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::CyclicBlueprintParent`] if `key` would become
    /// its own ancestor; the existing parent link is kept.
    pub fn set_parent(
        &mut self,
        key: BlueprintKey,
        parent: Option<BlueprintKey>,
    ) -> Result<(), BlueprintError> {
        self.entry(key)?;
        if let Some(parent) = parent {
            self.entry(parent)?;
            if parent == key || self.ancestors(parent).any(|ancestor| ancestor == key) {
                return Err(BlueprintError::CyclicBlueprintParent {
                    blueprint: self.display_id(key),
                    parent: self.display_id(parent),
                });
            }
        }

        if let Some(entry) = self.entries.get_mut(key) {
            entry.parent = parent;
        }
        let parent_id = parent.map_or_else(|| "-".to_string(), |p| self.display_id(p));
        debug!(blueprint = %self.display_id(key), parent = %parent_id, "blueprint parent set");
        Ok(())
    }

    #[must_use]
    pub fn parent_of(&self, key: BlueprintKey) -> Option<BlueprintKey> {
        self.entries.get(key).and_then(|entry| entry.parent)
    }

    /// Ancestors of `key`, nearest first. Excludes `key` itself.
    pub fn ancestors(&self, key: BlueprintKey) -> impl Iterator<Item = BlueprintKey> + '_ {
        std::iter::successors(self.parent_of(key), move |&current| self.parent_of(current))
    }

    /// Blueprints whose parent is `key`.
    #[must_use]
    pub fn children_of(&self, key: BlueprintKey) -> Vec<BlueprintKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.parent == Some(key))
            .map(|(child, _)| child)
            .collect()
    }

    /// The effective component types of `key`: its own declarations and
    /// those of all ancestors, root first, each type once.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::UnknownBlueprint`] if `key` is not stored.
    pub fn resolve_component_types(&self, key: BlueprintKey) -> Result<Vec<ComponentTypeId>, BlueprintError> {
        let own = self.entry(key)?;
        let mut chain: Vec<&Blueprint> = self
            .ancestors(key)
            .filter_map(|ancestor| self.get(ancestor))
            .collect();
        chain.reverse();
        chain.push(&own.blueprint);

        let mut resolved = Vec::new();
        for blueprint in chain {
            for &component_type in blueprint.component_types() {
                if !resolved.contains(&component_type) {
                    resolved.push(component_type);
                }
            }
        }
        Ok(resolved)
    }

    /// Component types declared by ancestors of `key`, excluding its own.
    #[must_use]
    pub fn inherited_component_types(&self, key: BlueprintKey) -> Vec<ComponentTypeId> {
        let mut inherited = Vec::new();
        for ancestor in self.ancestors(key) {
            if let Some(blueprint) = self.get(ancestor) {
                for &component_type in blueprint.component_types() {
                    if !inherited.contains(&component_type) {
                        inherited.push(component_type);
                    }
                }
            }
        }
        inherited
    }

    /// The effective value of `attribute` for `key`: the nearest
    /// declaration walking from `key` up to the root.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::UnknownBlueprint`] if `key` is not stored.
    pub fn resolve_attribute(&self, key: BlueprintKey, attribute: &str) -> Result<Option<&Value>, BlueprintError> {
        let own = self.entry(key)?;
        if let Some(value) = own.blueprint.attribute(attribute) {
            return Ok(Some(value));
        }
        Ok(self
            .ancestors(key)
            .filter_map(|ancestor| self.get(ancestor))
            .find_map(|blueprint| blueprint.attribute(attribute)))
    }

    /// All effective attribute values for `key`, children overriding
    /// parents.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::UnknownBlueprint`] if `key` is not stored.
    pub fn resolve_attributes(&self, key: BlueprintKey) -> Result<AttributeTable, BlueprintError> {
        let mut resolved = self.entry(key)?.blueprint.attributes().clone();
        for ancestor in self.ancestors(key) {
            if let Some(blueprint) = self.get(ancestor) {
                resolved.fill_from(blueprint.attributes());
            }
        }
        Ok(resolved)
    }

    /// All blueprints as `(key, id, blueprint)`, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (BlueprintKey, &str, &Blueprint)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key, entry.id.as_str(), &entry.blueprint))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, key: BlueprintKey) -> Result<&BlueprintEntry, BlueprintError> {
        self.entries
            .get(key)
            .ok_or_else(|| BlueprintError::UnknownBlueprint(format!("{key:?}")))
    }

    fn display_id(&self, key: BlueprintKey) -> String {
        self.id_of(key)
            .map_or_else(|| format!("{key:?}"), str::to_string)
    }
}

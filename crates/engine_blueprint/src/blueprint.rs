//! The locally declared part of a blueprint.

use engine_component::{AttributeTable, Component, ComponentTypeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BlueprintError;

/// Component types and attribute defaults declared by one blueprint.
///
/// Inheritance is not visible here; see
/// [`BlueprintManager`](crate::BlueprintManager) for resolution along the
/// parent chain.
///
/// Deserialization goes through [`Blueprint::add_component`], so loaded data
/// declaring a type twice is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BlueprintData")]
pub struct Blueprint {
    /// Declared component types, in declaration order, without duplicates.
    component_types: Vec<ComponentTypeId>,
    /// Declared attribute defaults.
    attributes: AttributeTable,
}

/// Unchecked serialized form of a [`Blueprint`].
#[derive(Deserialize)]
struct BlueprintData {
    #[serde(default)]
    component_types: Vec<ComponentTypeId>,
    #[serde(default)]
    attributes: AttributeTable,
}

impl TryFrom<BlueprintData> for Blueprint {
    type Error = BlueprintError;

    fn try_from(data: BlueprintData) -> Result<Self, Self::Error> {
        let mut blueprint = Blueprint {
            component_types: Vec::with_capacity(data.component_types.len()),
            attributes: data.attributes,
        };
        for component_type in data.component_types {
            blueprint.add_component(component_type)?;
        }
        Ok(blueprint)
    }
}

impl Blueprint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Blueprint::add_component`] for type `T`.
    ///
    /// A type that is already declared is ignored.
    #[must_use]
    pub fn with_component<T: Component>(mut self) -> Self {
        let _ = self.add_component(T::component_type_id());
        self
    }

    /// Builder-style [`Blueprint::set_attribute`].
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Declare `component_type` on this blueprint.
    ///
    /// Only this blueprint's own declarations are checked; a type inherited
    /// from an ancestor may be declared again.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::DuplicateComponent`] if the type is already
    /// declared here.
    pub fn add_component(&mut self, component_type: ComponentTypeId) -> Result<(), BlueprintError> {
        if self.component_types.contains(&component_type) {
            return Err(BlueprintError::DuplicateComponent(component_type));
        }
        self.component_types.push(component_type);
        Ok(())
    }

    /// Remove `component_type` from this blueprint's declarations.
    ///
    /// Returns whether a removal occurred.
    pub fn remove_component(&mut self, component_type: ComponentTypeId) -> bool {
        match self.component_types.iter().position(|&t| t == component_type) {
            Some(pos) => {
                self.component_types.remove(pos);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn has_component(&self, component_type: ComponentTypeId) -> bool {
        self.component_types.contains(&component_type)
    }

    /// Component types declared on this blueprint only.
    #[must_use]
    pub fn component_types(&self) -> &[ComponentTypeId] {
        &self.component_types
    }

    /// Set a local attribute default, returning the previous local value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.set(key, value)
    }

    /// Remove a local attribute default. Resolution falls back to ancestors.
    pub fn remove_attribute(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    /// Local attribute default, ignoring ancestors.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Attribute defaults declared on this blueprint only.
    #[must_use]
    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ComponentTypeId = ComponentTypeId::from_name("A");
    const B: ComponentTypeId = ComponentTypeId::from_name("B");

    #[test]
    fn test_add_component_rejects_local_duplicate() {
        let mut blueprint = Blueprint::new();
        blueprint.add_component(A).unwrap();
        assert!(matches!(
            blueprint.add_component(A),
            Err(BlueprintError::DuplicateComponent(t)) if t == A
        ));
        assert_eq!(blueprint.component_types(), &[A]);
    }

    #[test]
    fn test_add_then_remove_round_trip() {
        let mut blueprint = Blueprint::new();
        blueprint.add_component(A).unwrap();
        let original = blueprint.clone();

        blueprint.add_component(B).unwrap();
        assert!(blueprint.remove_component(B));
        assert_eq!(blueprint, original);
    }

    #[test]
    fn test_remove_missing_component() {
        let mut blueprint = Blueprint::new();
        assert!(!blueprint.remove_component(A));
    }

    #[test]
    fn test_local_attributes() {
        let mut blueprint = Blueprint::new().with_attribute("color", "red");
        assert_eq!(blueprint.attribute("color"), Some(&Value::from("red")));

        let previous = blueprint.set_attribute("color", "blue");
        assert_eq!(previous, Some(Value::from("red")));
        assert_eq!(blueprint.remove_attribute("color"), Some(Value::from("blue")));
        assert!(blueprint.attribute("color").is_none());
    }

    #[test]
    fn test_blueprint_serialization() {
        let mut blueprint = Blueprint::new().with_attribute("speed", 2.0);
        blueprint.add_component(A).unwrap();

        let json = serde_json::to_string(&blueprint).unwrap();
        let restored: Blueprint = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, blueprint);
    }

    #[test]
    fn test_loading_duplicate_component_types_fails() {
        let json = serde_json::json!({
            "component_types": [A, A],
            "attributes": { "color": "red" },
        });
        let err = serde_json::from_value::<Blueprint>(json).unwrap_err();
        assert!(err.to_string().contains("already added"));
    }

    #[test]
    fn test_loaded_blueprint_keeps_add_remove_round_trip() {
        let json = serde_json::json!({ "component_types": [A] });
        let mut blueprint: Blueprint = serde_json::from_value(json).unwrap();
        let original = blueprint.clone();

        assert!(blueprint.remove_component(A));
        assert!(!blueprint.has_component(A));
        blueprint.add_component(A).unwrap();
        assert_eq!(blueprint, original);
        assert!(blueprint.attributes().is_empty());
    }
}

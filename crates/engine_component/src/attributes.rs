//! Attribute tables: string-keyed default values for component initialisation.
//!
//! Blueprints declare attribute defaults, the entity manager resolves them
//! along the blueprint chain, and each new component reads the keys it
//! understands in [`Component::init`](crate::Component::init). Values are
//! dynamically typed JSON values so authoring tools can edit them without
//! knowing the component types.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ComponentError;

/// An ordered map from attribute key to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeTable {
    values: BTreeMap<String, Value>,
}

impl AttributeTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Deserialise the value under `key` into `T`.
    ///
    /// Returns `Ok(None)` if the key is absent. `component` names the caller
    /// for the error message.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::InvalidAttribute`] if the stored value does
    /// not deserialise into `T`.
    pub fn read<T: DeserializeOwned>(
        &self,
        component: &'static str,
        key: &str,
    ) -> Result<Option<T>, ComponentError> {
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ComponentError::InvalidAttribute {
                component,
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// Copy every entry of `other` into this table, overwriting existing keys.
    pub fn merge_from(&mut self, other: &AttributeTable) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Copy entries of `other` whose keys are not yet present.
    pub fn fill_from(&mut self, other: &AttributeTable) {
        for (key, value) in &other.values {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut table = AttributeTable::new();
        table.set("speed", 2.5);
        table.set("lives", 3);
        table.set("visible", true);
        table.set("color", "red");

        assert_eq!(table.get_f64("speed"), Some(2.5));
        assert_eq!(table.get_i64("lives"), Some(3));
        assert_eq!(table.get_bool("visible"), Some(true));
        assert_eq!(table.get_str("color"), Some("red"));
        assert_eq!(table.get_str("missing"), None);
    }

    #[test]
    fn test_read_missing_key_is_none() {
        let table = AttributeTable::new();
        let value: Option<f32> = table.read("Health", "Health.Max").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_read_wrong_type_is_invalid_attribute() {
        let mut table = AttributeTable::new();
        table.set("Health.Max", "lots");
        let result = table.read::<f32>("Health", "Health.Max");
        assert!(matches!(
            result,
            Err(ComponentError::InvalidAttribute { component: "Health", ref key, .. }) if key == "Health.Max"
        ));
    }

    #[test]
    fn test_merge_overwrites_and_fill_keeps() {
        let mut base: AttributeTable = [("color", "red"), ("shape", "box")].into_iter().collect();
        let overrides: AttributeTable = [("color", "blue")].into_iter().collect();

        let mut merged = base.clone();
        merged.merge_from(&overrides);
        assert_eq!(merged.get_str("color"), Some("blue"));
        assert_eq!(merged.get_str("shape"), Some("box"));

        base.fill_from(&overrides);
        assert_eq!(base.get_str("color"), Some("red"));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let table: AttributeTable = [("color", "red")].into_iter().collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"color":"red"}"#);
    }
}

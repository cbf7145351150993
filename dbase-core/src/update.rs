//! Field-level update operations for a single existing item

use crate::error::{Error, Result};
use crate::types::{json_type_name, Item, KEY_FIELD};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Builder for a partial update of one item.
///
/// Encodes to the server's update body:
/// `{"set": {..}, "increment": {..}, "append": {..}, "prepend": {..}, "delete": [..]}`,
/// leaving out empty sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Updater {
    set: Item,
    increment: Item,
    append: Item,
    prepend: Item,
    delete: Vec<String>,
}

impl Updater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a value
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    /// Increment a numeric field (use a negative amount to decrement)
    pub fn increment(mut self, field: impl Into<String>, amount: impl Into<Value>) -> Self {
        self.increment.insert(field.into(), amount.into());
        self
    }

    /// Append value(s) to a list field
    pub fn append(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.append.insert(field.into(), as_list(value.into()));
        self
    }

    /// Prepend value(s) to a list field
    pub fn prepend(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.prepend.insert(field.into(), as_list(value.into()));
        self
    }

    /// Remove a field
    pub fn delete(mut self, field: impl Into<String>) -> Self {
        self.delete.push(field.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
            && self.increment.is_empty()
            && self.append.is_empty()
            && self.prepend.is_empty()
            && self.delete.is_empty()
    }

    /// Reject updates the server would refuse: no operations, updates to the
    /// key, non-numeric increments, or a field targeted by two operations.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidUpdate("updater has no operations".to_string()));
        }

        for (field, amount) in &self.increment {
            if !amount.is_number() {
                return Err(Error::InvalidUpdate(format!(
                    "increment of '{}' must be a number, got {}",
                    field,
                    json_type_name(amount)
                )));
            }
        }

        let mut seen = HashSet::new();
        let fields = self
            .set
            .keys()
            .chain(self.increment.keys())
            .chain(self.append.keys())
            .chain(self.prepend.keys())
            .chain(self.delete.iter());
        for field in fields {
            if field == KEY_FIELD {
                return Err(Error::InvalidUpdate("the key field cannot be updated".to_string()));
            }
            if !seen.insert(field.as_str()) {
                return Err(Error::InvalidUpdate(format!(
                    "field '{}' is targeted by more than one operation",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Encode into the server's update-operation body
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (name, section) in [
            ("set", &self.set),
            ("increment", &self.increment),
            ("append", &self.append),
            ("prepend", &self.prepend),
        ] {
            if !section.is_empty() {
                body.insert(name.to_string(), Value::Object(section.clone()));
            }
        }
        if !self.delete.is_empty() {
            let fields = self.delete.iter().cloned().map(Value::String).collect();
            body.insert("delete".to_string(), Value::Array(fields));
        }
        Value::Object(body)
    }
}

impl Serialize for Updater {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn as_list(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        other => Value::Array(vec![other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_updater_encoding() {
        let updater = Updater::new()
            .set("city", "Manila")
            .increment("age", 1)
            .append("tags", json!(["a", "b"]))
            .prepend("history", "first")
            .delete("surname");

        assert_eq!(
            updater.to_json(),
            json!({
                "set": {"city": "Manila"},
                "increment": {"age": 1},
                "append": {"tags": ["a", "b"]},
                "prepend": {"history": ["first"]},
                "delete": ["surname"],
            })
        );
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let updater = Updater::new().set("a", 1);
        assert_eq!(updater.to_json(), json!({"set": {"a": 1}}));
    }

    #[test]
    fn test_validate_rejects_empty_updater() {
        let err = Updater::new().validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_UPDATE");
    }

    #[test]
    fn test_validate_rejects_non_numeric_increment() {
        let err = Updater::new().increment("age", "one").validate().unwrap_err();
        assert!(err.to_string().contains("must be a number"));
    }

    #[test]
    fn test_validate_rejects_conflicting_fields() {
        let err = Updater::new().set("a", 1).delete("a").validate().unwrap_err();
        assert!(err.to_string().contains("more than one operation"));
    }

    #[test]
    fn test_validate_rejects_key_update() {
        assert!(Updater::new().set("key", "other").validate().is_err());
        assert!(Updater::new().set("value", 2).increment("count", -1).validate().is_ok());
    }
}

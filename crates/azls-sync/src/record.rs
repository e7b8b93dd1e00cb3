//! Schema-less directory/authorization records.
//!
//! A [`Record`] keeps every field the API returned, in the order it returned
//! them, and only interprets its identifier and the delta tombstone markers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker Graph puts on a delta entry whose object was deleted.
pub const REMOVED_MARKER: &str = "@removed";

/// Marker carried by group-membership delta entries.
pub const MEMBERS_DELTA_MARKER: &str = "members@delta";

/// Plain removal flag, a tombstone when set to anything but `false`.
pub const REMOVED_FIELD: &str = "removed";

/// Ordered collection of records, unique by identifier after a merge.
pub type RecordSet = Vec<Record>;

/// Which field holds a record's stable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField {
    /// Directory objects (`id` is the object UUID).
    Id,
    /// ARM definitions/assignments (`name` is the UUID, `id` is the full path).
    Name,
}

impl IdField {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IdField::Id => "id",
            IdField::Name => "name",
        }
    }
}

/// One directory or authorization object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON value, returning `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the identifier stored under `field`, if it is a string.
    #[must_use]
    pub fn identifier(&self, field: IdField) -> Option<&str> {
        self.0.get(field.as_str()).and_then(Value::as_str)
    }

    /// Returns true if this delta entry signals a removal rather than content.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        let removed_flag = self
            .0
            .get(REMOVED_FIELD)
            .is_some_and(|v| !v.is_null() && v != &Value::Bool(false));
        removed_flag
            || [REMOVED_MARKER, MEMBERS_DELTA_MARKER]
                .iter()
                .any(|marker| self.0.get(*marker).is_some_and(|v| !v.is_null()))
    }

    /// Folds `other` into `self`, first level only.
    ///
    /// Fields present in `other` overwrite or extend `self`; fields only in
    /// `self` survive. A `null` in `other` does not erase an existing value.
    pub fn shallow_merge_from(&mut self, other: &Record) {
        for (key, value) in &other.0 {
            if value.is_null() && self.0.contains_key(key) {
                continue;
            }
            self.0.insert(key.clone(), value.clone());
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a dotted path such as `properties.roleName`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Printable value of a dotted path: strings as-is, booleans and numbers
    /// rendered, anything else (including absence) as an empty string.
    #[must_use]
    pub fn text(&self, path: &str) -> String {
        match self.get_path(path) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Extracts the records in a JSON array, skipping non-object elements.
///
/// Returns `None` if `value` is not an array.
#[must_use]
pub fn records_from_value(value: Value) -> Option<RecordSet> {
    match value {
        Value::Array(items) => Some(items.into_iter().filter_map(Record::from_value).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_identifier_by_field() {
        let def = record(json!({
            "id": "/providers/Microsoft.Authorization/roleDefinitions/acdd72a7",
            "name": "acdd72a7"
        }));
        assert_eq!(def.identifier(IdField::Name), Some("acdd72a7"));
        assert!(def.identifier(IdField::Id).unwrap().starts_with("/providers"));
        assert_eq!(record(json!({"id": 7})).identifier(IdField::Id), None);
    }

    #[test]
    fn test_tombstone_markers() {
        assert!(record(json!({"id": "A", "@removed": {"reason": "deleted"}})).is_tombstone());
        assert!(record(json!({"id": "A", "members@delta": []})).is_tombstone());
        assert!(!record(json!({"id": "A", "displayName": "alice"})).is_tombstone());
        assert!(!record(json!({"id": "A", "@removed": null})).is_tombstone());
        assert!(record(json!({"id": "A", "removed": true})).is_tombstone());
        assert!(!record(json!({"id": "A", "removed": false})).is_tombstone());
    }

    #[test]
    fn test_shallow_merge_incoming_wins_and_extends() {
        let mut existing = record(json!({
            "id": "A",
            "displayName": "alice",
            "mail": "alice@example.com",
            "extra": {"nested": 1}
        }));
        let incoming = record(json!({
            "id": "A",
            "displayName": "alice2",
            "jobTitle": "engineer",
            "extra": {"other": 2},
            "mail": null
        }));

        existing.shallow_merge_from(&incoming);

        assert_eq!(existing.text("displayName"), "alice2");
        assert_eq!(existing.text("jobTitle"), "engineer");
        assert_eq!(existing.text("mail"), "alice@example.com");
        // Nested objects are replaced, not merged.
        assert_eq!(existing.get("extra"), Some(&json!({"other": 2})));
    }

    #[test]
    fn test_merge_preserves_field_order() {
        let mut existing = record(json!({"id": "A", "b": 1, "c": 2}));
        existing.shallow_merge_from(&record(json!({"b": 5, "d": 3})));
        let keys: Vec<&str> = existing.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "b", "c", "d"]);
    }

    #[test]
    fn test_text_paths() {
        let r = record(json!({
            "properties": {"roleName": "Reader", "enabled": true, "count": 3},
            "tags": ["x"]
        }));
        assert_eq!(r.text("properties.roleName"), "Reader");
        assert_eq!(r.text("properties.enabled"), "true");
        assert_eq!(r.text("properties.count"), "3");
        assert_eq!(r.text("tags"), "");
        assert_eq!(r.text("properties.missing"), "");
    }

    #[test]
    fn test_records_from_value() {
        let set = records_from_value(json!([{"id": "A"}, 3, {"id": "B"}])).unwrap();
        assert_eq!(set.len(), 2);
        assert!(records_from_value(json!({"id": "A"})).is_none());
    }
}

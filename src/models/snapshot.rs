//! Field snapshots of audited records
//!
//! A snapshot is the field-name -> value view of a record at one point in
//! time. Records are introspected through their `Serialize` impl, so any
//! struct that serializes to a JSON object can be snapshotted.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuditError, AuditResult};

/// The field values of a record, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    fields: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Capture a snapshot of a serializable record
    ///
    /// Fails when the record does not serialize to a JSON object.
    pub fn capture<T: Serialize + ?Sized>(record: &T) -> AuditResult<Self> {
        let value = serde_json::to_value(record)
            .map_err(|e| AuditError::Snapshot(format!("Failed to serialize record: {}", e)))?;

        match value {
            Value::Object(map) => Ok(Self {
                fields: map.into_iter().collect(),
            }),
            other => Err(AuditError::Snapshot(format!(
                "Expected a record with named fields, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// Get the value of a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set the value of a field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    /// Iterate over field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over (field, value) pairs in field order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

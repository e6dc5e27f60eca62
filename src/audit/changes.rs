//! Change sets and their text encoding
//!
//! A change set maps field names to what happened to them. Plain fields
//! record an `[old, new]` pair; many-to-many fields record
//! `[operation, related-keys]`. The stored form is compact JSON.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entry::Action;
use crate::error::{AuditError, AuditResult};
use crate::models::ObjectPk;

const MAX_RENDERED_LEN: usize = 50;

/// Operation applied to a many-to-many relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum M2mOperation {
    Add,
    Remove,
    Clear,
}

impl fmt::Display for M2mOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            M2mOperation::Add => write!(f, "add"),
            M2mOperation::Remove => write!(f, "remove"),
            M2mOperation::Clear => write!(f, "clear"),
        }
    }
}

/// Old and new value of a plain field
///
/// `None` stands for "no value": the record did not exist on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange(pub Option<Value>, pub Option<Value>);

impl FieldChange {
    pub fn old_value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    pub fn new_value(&self) -> Option<&Value> {
        self.1.as_ref()
    }
}

/// Operation and affected keys of a many-to-many field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationChange(pub M2mOperation, pub Vec<ObjectPk>);

impl RelationChange {
    pub fn operation(&self) -> M2mOperation {
        self.0
    }

    pub fn keys(&self) -> &[ObjectPk] {
        &self.1
    }
}

/// What happened to a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Change {
    Relation(RelationChange),
    Field(FieldChange),
}

impl Change {
    /// Render the change as `old{arrow}new` for display
    pub fn render(&self, arrow: &str) -> String {
        match self {
            Change::Field(change) => format!(
                "{}{}{}",
                format_value(change.old_value()),
                arrow,
                format_value(change.new_value())
            ),
            Change::Relation(change) => {
                let keys: Vec<String> = change.keys().iter().map(|k| k.to_string()).collect();
                format!("{} [{}]", change.operation(), keys.join(", "))
            }
        }
    }
}

/// Field-level diff between two record states
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(BTreeMap<String, Change>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an `[old, new]` pair for a field
    pub fn insert_field(
        &mut self,
        field: impl Into<String>,
        old: Option<Value>,
        new: Option<Value>,
    ) {
        self.0
            .insert(field.into(), Change::Field(FieldChange(old, new)));
    }

    /// Record a many-to-many operation for a field
    pub fn insert_relation(
        &mut self,
        field: impl Into<String>,
        operation: M2mOperation,
        keys: Vec<ObjectPk>,
    ) {
        self.0.insert(
            field.into(),
            Change::Relation(RelationChange(operation, keys)),
        );
    }

    pub fn get(&self, field: &str) -> Option<&Change> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Change> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rename fields, leaving those without a mapping untouched
    pub fn renamed(&self, mapping: &BTreeMap<String, String>) -> Self {
        Self(
            self.0
                .iter()
                .map(|(field, change)| {
                    let name = mapping.get(field).unwrap_or(field);
                    (name.clone(), change.clone())
                })
                .collect(),
        )
    }

    /// Encode as compact JSON for storage
    pub fn encode(&self) -> AuditResult<String> {
        serde_json::to_string(self)
            .map_err(|e| AuditError::Json(format!("Failed to encode changes: {}", e)))
    }

    /// Decode the stored changes of an entry with the given action
    ///
    /// Only many-to-many entries hold relation changes, every other action
    /// holds `[old, new]` pairs. Empty text is an empty change set.
    pub fn decode_for(action: Action, text: &str) -> AuditResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let changes = match action {
            Action::M2mChange => parse_changes::<RelationChange>(text)?
                .into_iter()
                .map(|(field, change)| (field, Change::Relation(change)))
                .collect(),
            Action::Create | Action::Update | Action::Delete => {
                parse_changes::<FieldChange>(text)?
                    .into_iter()
                    .map(|(field, change)| (field, Change::Field(change)))
                    .collect()
            }
        };
        Ok(Self(changes))
    }

    /// Render as `field{colon}old{arrow}new` joined by `separator`
    pub fn render(&self, colon: &str, arrow: &str, separator: &str) -> String {
        self.0
            .iter()
            .map(|(field, change)| format!("{}{}{}", field, colon, change.render(arrow)))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a String, &'a Change);
    type IntoIter = btree_map::Iter<'a, String, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn parse_changes<T: DeserializeOwned>(text: &str) -> AuditResult<BTreeMap<String, T>> {
    serde_json::from_str(text)
        .map_err(|e| AuditError::Json(format!("Failed to decode changes: {}", e)))
}

/// Format a field value for human-readable display
fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => {
            if s.chars().count() > MAX_RENDERED_LEN {
                let truncated: String = s.chars().take(MAX_RENDERED_LEN - 3).collect();
                format!("{}...", truncated)
            } else {
                s.clone()
            }
        }
        Some(Value::Array(arr)) => format!("[{} items]", arr.len()),
        Some(Value::Object(obj)) => format!("{{{} fields}}", obj.len()),
    }
}

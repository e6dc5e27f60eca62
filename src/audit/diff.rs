//! Field-level diff between record snapshots
//!
//! Compares two optional snapshots of the same record and reports every
//! field whose value differs. A missing snapshot (record not yet created,
//! or already deleted) has no value for any field, so every field of the
//! other side is reported.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::changes::ChangeSet;
use crate::models::Snapshot;

/// Restricts which fields take part in a diff
///
/// When `include_fields` is non-empty only those fields are compared;
/// `exclude_fields` is applied afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    #[serde(default)]
    pub include_fields: Vec<String>,
    #[serde(default)]
    pub exclude_fields: Vec<String>,
}

impl FieldFilter {
    /// Check whether a field is compared under this filter
    pub fn allows(&self, field: &str) -> bool {
        if !self.include_fields.is_empty() && !self.include_fields.iter().any(|f| f == field) {
            return false;
        }
        !self.exclude_fields.iter().any(|f| f == field)
    }

    pub fn is_empty(&self) -> bool {
        self.include_fields.is_empty() && self.exclude_fields.is_empty()
    }
}

/// Compute the change set between an old and a new record state
pub fn model_instance_diff(
    old: Option<&Snapshot>,
    new: Option<&Snapshot>,
    filter: Option<&FieldFilter>,
) -> ChangeSet {
    let fields: BTreeSet<&str> = old
        .into_iter()
        .chain(new)
        .flat_map(|snapshot| snapshot.field_names())
        .filter(|field| filter.map_or(true, |f| f.allows(field)))
        .collect();

    let mut changes = ChangeSet::new();
    for field in fields {
        let old_value = old.and_then(|s| s.get(field));
        let new_value = new.and_then(|s| s.get(field));

        if old_value != new_value {
            changes.insert_field(field, old_value.cloned(), new_value.cloned());
        }
    }

    changes
}

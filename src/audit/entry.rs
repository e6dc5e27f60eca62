//! Audit entry data structures
//!
//! Defines the action kinds that can be audited and the log entry format
//! itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::changes::ChangeSet;
use super::context;
use super::registry::Registry;
use crate::error::AuditResult;
use crate::models::{Auditable, LogEntryId, ObjectPk};

/// Kinds of events that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Record was created
    Create,
    /// Record was updated
    Update,
    /// Record was deleted
    Delete,
    /// A many-to-many relation of the record changed
    M2mChange,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "CREATE"),
            Action::Update => write!(f, "UPDATE"),
            Action::Delete => write!(f, "DELETE"),
            Action::M2mChange => write!(f, "M2M_CHANGE"),
        }
    }
}

/// A single audit log entry
///
/// Entries are written once per observed event and never modified. The
/// change set is kept in its encoded text form, as it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,

    /// Model name of the affected record
    pub content_type: String,

    /// Key of the affected record, as text
    pub object_pk: String,

    /// Integer key of the affected record, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<i64>,

    /// Human-readable description of the record at the time of the event
    pub object_repr: String,

    pub action: Action,

    /// Encoded change set
    pub changes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,

    /// When the event was observed (UTC)
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<serde_json::Value>,
}

impl LogEntry {
    /// Build an entry for `instance`, attributed to the current context
    pub fn for_instance<T: Auditable>(
        instance: &T,
        action: Action,
        changes: &ChangeSet,
    ) -> AuditResult<Self> {
        let pk = instance.pk();
        let ctx = context::current().unwrap_or_default();

        Ok(Self {
            id: LogEntryId::new(),
            content_type: T::MODEL_NAME.to_string(),
            object_pk: pk.as_ref().map(|pk| pk.to_string()).unwrap_or_default(),
            object_id: pk.as_ref().and_then(|pk| pk.as_int()),
            object_repr: instance.object_repr(),
            action,
            changes: changes.encode()?,
            actor: ctx.actor,
            remote_addr: ctx.remote_addr,
            timestamp: Utc::now(),
            additional_data: instance.additional_data(),
        })
    }

    /// Whether the entry is about record `pk` of `model`
    ///
    /// Integer and text keys never match each other, even when their text
    /// is the same.
    pub fn is_for(&self, model: &str, pk: &ObjectPk) -> bool {
        self.content_type == model
            && self.object_id == pk.as_int()
            && self.object_pk == pk.to_string()
    }

    /// Decode the stored changes according to the entry's action
    pub fn changes_dict(&self) -> AuditResult<ChangeSet> {
        ChangeSet::decode_for(self.action, &self.changes)
    }

    /// Render the changes as `field{colon}old{arrow}new` joined by `separator`
    pub fn changes_str(&self, colon: &str, arrow: &str, separator: &str) -> AuditResult<String> {
        Ok(self.changes_dict()?.render(colon, arrow, separator))
    }

    /// Decode the changes using the display names registered for the model
    pub fn changes_display_dict(&self, registry: &Registry) -> AuditResult<ChangeSet> {
        let changes = self.changes_dict()?;
        Ok(match registry.options(&self.content_type) {
            Some(options) if !options.mapping_fields.is_empty() => {
                changes.renamed(&options.mapping_fields)
            }
            _ => changes,
        })
    }
}

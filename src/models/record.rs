//! Host-side capabilities the audit hooks rely on
//!
//! The host application implements `Auditable` for each model it wants
//! audited, and `RecordLookup` for whatever it uses to load persisted rows.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use super::ids::ObjectPk;
use super::snapshot::Snapshot;
use crate::error::AuditResult;

/// A data model whose lifecycle events can be audited
///
/// Field introspection goes through `Serialize`: every field the record
/// serializes is a candidate for the diff. Fields that should never appear
/// in a change record can be skipped with `#[serde(skip)]` or excluded at
/// registration time.
pub trait Auditable: Serialize {
    /// Model name, used as the content type of log entries and as the
    /// registry key
    const MODEL_NAME: &'static str;

    /// Key of the persisted record, `None` until the record has been saved
    fn pk(&self) -> Option<ObjectPk>;

    /// Human-readable representation stored alongside each entry
    fn object_repr(&self) -> String {
        match self.pk() {
            Some(pk) => format!("{} object ({})", Self::MODEL_NAME, pk),
            None => format!("{} object (unsaved)", Self::MODEL_NAME),
        }
    }

    /// Extra data attached to every entry written for this record
    fn additional_data(&self) -> Option<Value> {
        None
    }

    /// Keys of the records currently related through a many-to-many field
    fn related_keys(&self, _field: &str) -> Vec<ObjectPk> {
        Vec::new()
    }

    /// Capture the current field values
    fn snapshot(&self) -> AuditResult<Snapshot> {
        Snapshot::capture(self)
    }
}

/// Loads the persisted state of a record by key
///
/// `Ok(None)` means the record does not exist (anymore); errors belong to
/// the host and are propagated unchanged.
pub trait RecordLookup<T> {
    fn get(&self, pk: &ObjectPk) -> AuditResult<Option<T>>;
}

impl<T: Clone> RecordLookup<T> for HashMap<ObjectPk, T> {
    fn get(&self, pk: &ObjectPk) -> AuditResult<Option<T>> {
        Ok(HashMap::get(self, pk).cloned())
    }
}

impl<T: Clone> RecordLookup<T> for BTreeMap<ObjectPk, T> {
    fn get(&self, pk: &ObjectPk) -> AuditResult<Option<T>> {
        Ok(BTreeMap::get(self, pk).cloned())
    }
}

impl<T, L: RecordLookup<T> + ?Sized> RecordLookup<T> for &L {
    fn get(&self, pk: &ObjectPk) -> AuditResult<Option<T>> {
        (**self).get(pk)
    }
}

//! Log storage for auditlog
//!
//! `LogStore` is the persistence contract the receivers write through.
//! Two stores ship with the crate: an in-memory one and an append-only
//! JSON-lines file.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use crate::audit::LogEntry;
use crate::error::AuditResult;
use crate::models::ObjectPk;

/// Persistence for log entries
///
/// Entries are immutable once appended. `entries` returns them oldest
/// first; the query helpers are built on it.
pub trait LogStore {
    /// Persist a new entry
    fn append(&self, entry: LogEntry) -> AuditResult<()>;

    /// All entries in chronological order
    fn entries(&self) -> AuditResult<Vec<LogEntry>>;

    /// Entries for a single record
    fn get_for_object(&self, model: &str, pk: &ObjectPk) -> AuditResult<Vec<LogEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.is_for(model, pk))
            .collect())
    }

    /// Entries for any of the given records of one model
    fn get_for_objects(&self, model: &str, pks: &[ObjectPk]) -> AuditResult<Vec<LogEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| pks.iter().any(|pk| e.is_for(model, pk)))
            .collect())
    }

    /// Entries for every record of a model
    fn get_for_model(&self, model: &str) -> AuditResult<Vec<LogEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.content_type == model)
            .collect())
    }

    /// The most recent `count` entries, oldest first
    fn recent(&self, count: usize) -> AuditResult<Vec<LogEntry>> {
        let mut entries = self.entries()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }
}

impl<S: LogStore + ?Sized> LogStore for &S {
    fn append(&self, entry: LogEntry) -> AuditResult<()> {
        (**self).append(entry)
    }

    fn entries(&self) -> AuditResult<Vec<LogEntry>> {
        (**self).entries()
    }
}

impl<S: LogStore + ?Sized> LogStore for Box<S> {
    fn append(&self, entry: LogEntry) -> AuditResult<()> {
        (**self).append(entry)
    }

    fn entries(&self) -> AuditResult<Vec<LogEntry>> {
        (**self).entries()
    }
}

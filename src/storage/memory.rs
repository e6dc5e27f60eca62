//! In-memory log store
//!
//! Keeps entries in a vector behind a lock. Useful for tests and for hosts
//! that persist entries themselves after inspecting them.

use std::sync::RwLock;

use crate::audit::LogEntry;
use crate::error::{AuditError, AuditResult};

use super::LogStore;

/// Log store backed by a `Vec`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<LogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> AuditResult<usize> {
        let entries = self.entries.read().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> AuditResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl LogStore for MemoryStore {
    fn append(&self, entry: LogEntry) -> AuditResult<()> {
        let mut entries = self.entries.write().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        entries.push(entry);
        Ok(())
    }

    fn entries(&self) -> AuditResult<Vec<LogEntry>> {
        let entries = self.entries.read().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(entries.clone())
    }
}

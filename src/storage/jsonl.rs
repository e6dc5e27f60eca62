//! Append-only JSON-lines log store
//!
//! Each entry is written as a single JSON line and flushed immediately.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::audit::LogEntry;
use crate::error::{AuditError, AuditResult};

use super::LogStore;

/// Log store writing to a line-delimited JSON file
///
/// Each line is a complete JSON object representing one entry.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    log_path: PathBuf,
}

impl JsonlStore {
    /// Create a store that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    fn open_for_append(&self) -> AuditResult<File> {
        if let Some(parent) = self.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AuditError::Io(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))
    }

    fn write_line(file: &mut File, entry: &LogEntry) -> AuditResult<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| AuditError::Json(format!("Failed to serialize log entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| AuditError::Io(format!("Failed to write log entry: {}", e)))
    }

    /// Append multiple entries, flushing once at the end
    pub fn append_batch(&self, entries: &[LogEntry]) -> AuditResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = self.open_for_append()?;
        for entry in entries {
            Self::write_line(&mut file, entry)?;
        }

        file.flush()
            .map_err(|e| AuditError::Io(format!("Failed to flush audit log: {}", e)))?;

        debug!(count = entries.len(), path = %self.log_path.display(), "log batch appended");
        Ok(())
    }

    /// Read all entries from the log file
    ///
    /// Returns entries in chronological order (oldest first).
    pub fn read_all(&self) -> AuditResult<Vec<LogEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                AuditError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line).map_err(|e| {
                AuditError::Json(format!(
                    "Failed to parse log entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries from the log
    pub fn read_recent(&self, count: usize) -> AuditResult<Vec<LogEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    /// Number of entries in the log
    pub fn entry_count(&self) -> AuditResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let count = reader
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count();

        Ok(count)
    }

    /// Check if the log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl LogStore for JsonlStore {
    fn append(&self, entry: LogEntry) -> AuditResult<()> {
        let mut file = self.open_for_append()?;
        Self::write_line(&mut file, &entry)?;

        file.flush()
            .map_err(|e| AuditError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    fn entries(&self) -> AuditResult<Vec<LogEntry>> {
        self.read_all()
    }

    fn recent(&self, count: usize) -> AuditResult<Vec<LogEntry>> {
        self.read_recent(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Action, ChangeSet};
    use crate::models::{Auditable, ObjectPk};
    use serde::Serialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Account {
        id: i64,
        name: String,
    }

    impl Auditable for Account {
        const MODEL_NAME: &'static str = "account";

        fn pk(&self) -> Option<ObjectPk> {
            Some(ObjectPk::Int(self.id))
        }
    }

    fn create_test_store() -> (JsonlStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");
        (JsonlStore::new(log_path), temp_dir)
    }

    fn create_test_entry(id: i64) -> LogEntry {
        let mut changes = ChangeSet::new();
        changes.insert_field("name", None, Some(json!(format!("Account {}", id))));
        LogEntry::for_instance(
            &Account {
                id,
                name: format!("Account {}", id),
            },
            Action::Create,
            &changes,
        )
        .unwrap()
    }

    #[test]
    fn test_append_and_read() {
        let (store, _temp) = create_test_store();
        let entry = create_test_entry(1);

        store.append(entry.clone()).unwrap();

        let entries = store.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], entry);
    }

    #[test]
    fn test_multiple_entries() {
        let (store, _temp) = create_test_store();

        for i in 0..5 {
            store.append(create_test_entry(i)).unwrap();
        }

        assert_eq!(store.entry_count().unwrap(), 5);
        assert_eq!(store.entries().unwrap().len(), 5);
    }

    #[test]
    fn test_append_batch() {
        let (store, _temp) = create_test_store();
        let entries: Vec<_> = (0..3).map(create_test_entry).collect();

        store.append_batch(&entries).unwrap();
        store.append_batch(&[]).unwrap();

        assert_eq!(store.read_all().unwrap().len(), 3);
    }

    #[test]
    fn test_read_recent() {
        let (store, _temp) = create_test_store();
        for i in 0..10 {
            store.append(create_test_entry(i)).unwrap();
        }

        let recent = store.read_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].object_pk, "7");
        assert_eq!(recent[1].object_pk, "8");
        assert_eq!(recent[2].object_pk, "9");
    }

    #[test]
    fn test_empty_log() {
        let (store, _temp) = create_test_store();

        assert!(!store.exists());
        assert_eq!(store.entry_count().unwrap(), 0);
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlStore::new(temp_dir.path().join("nested").join("audit.log"));

        store.append(create_test_entry(1)).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn test_corrupt_line_reports_line_number() {
        let (store, _temp) = create_test_store();
        store.append(create_test_entry(1)).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(store.path())
            .unwrap()
            .write_all(b"{not json}\n")
            .unwrap();

        let err = store.read_all().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_survives_reopen() {
        let (store, temp) = create_test_store();
        store.append(create_test_entry(1)).unwrap();

        let reopened = JsonlStore::new(temp.path().join("audit.log"));
        let entries = reopened.get_for_object("account", &ObjectPk::Int(1)).unwrap();
        assert_eq!(entries.len(), 1);
    }
}

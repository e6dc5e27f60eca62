//! JSON export of log entries
//!
//! Wraps the entries in a versioned envelope so exports can be checked
//! before being read back.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::LogEntry;
use crate::error::{AuditError, AuditResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Exported log entries with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Crate version that created the export
    pub app_version: String,

    pub entry_count: usize,

    pub entries: Vec<LogEntry>,
}

impl LogExport {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            entry_count: entries.len(),
            entries,
        }
    }

    /// Check that the export can be read by this version
    pub fn validate(&self) -> Result<(), String> {
        let major = self.schema_version.split('.').next().unwrap_or_default();
        let expected = EXPORT_SCHEMA_VERSION.split('.').next().unwrap_or_default();
        if major != expected {
            return Err(format!(
                "Unsupported export schema version {} (expected {}.x)",
                self.schema_version, expected
            ));
        }
        if self.entry_count != self.entries.len() {
            return Err(format!(
                "Entry count mismatch: header says {}, found {}",
                self.entry_count,
                self.entries.len()
            ));
        }
        Ok(())
    }
}

/// Export entries as JSON
pub fn export_entries_json<W: Write>(
    entries: &[LogEntry],
    writer: &mut W,
    pretty: bool,
) -> AuditResult<()> {
    let export = LogExport::new(entries.to_vec());

    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)
    } else {
        serde_json::to_writer(&mut *writer, &export)
    }
    .map_err(|e| AuditError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| AuditError::Export(e.to_string()))?;
    Ok(())
}

/// Read back a JSON export
pub fn import_from_json(json_str: &str) -> AuditResult<LogExport> {
    let export: LogExport =
        serde_json::from_str(json_str).map_err(|e| AuditError::Export(e.to_string()))?;
    export.validate().map_err(AuditError::Export)?;
    Ok(export)
}

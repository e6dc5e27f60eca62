//! CSV export of log entries
//!
//! One row per entry; the change set is kept in its encoded JSON form so
//! spreadsheets and scripts can still parse it.

use std::io::Write;

use crate::audit::LogEntry;
use crate::error::{AuditError, AuditResult};

const HEADER: [&str; 9] = [
    "ID",
    "Timestamp",
    "Action",
    "Model",
    "Object PK",
    "Object",
    "Actor",
    "Remote Address",
    "Changes",
];

/// Export entries to CSV
pub fn export_entries_csv<W: Write>(entries: &[LogEntry], writer: W) -> AuditResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(HEADER)
        .map_err(|e| AuditError::Export(e.to_string()))?;

    for entry in entries {
        let id = entry.id.as_uuid().to_string();
        let timestamp = entry.timestamp.to_rfc3339();
        let action = entry.action.to_string();

        csv_writer
            .write_record([
                id.as_str(),
                timestamp.as_str(),
                action.as_str(),
                entry.content_type.as_str(),
                entry.object_pk.as_str(),
                entry.object_repr.as_str(),
                entry.actor.as_deref().unwrap_or(""),
                entry.remote_addr.as_deref().unwrap_or(""),
                entry.changes.as_str(),
            ])
            .map_err(|e| AuditError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| AuditError::Export(e.to_string()))?;

    Ok(())
}

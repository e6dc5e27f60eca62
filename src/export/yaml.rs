//! YAML export of log entries
//!
//! Same envelope as the JSON export, in a form meant for reading.

use std::io::Write;

use crate::audit::LogEntry;
use crate::error::{AuditError, AuditResult};
use crate::export::json::LogExport;

/// Export entries as YAML
pub fn export_entries_yaml<W: Write>(entries: &[LogEntry], writer: &mut W) -> AuditResult<()> {
    let export = LogExport::new(entries.to_vec());

    writeln!(writer, "# auditlog export")
        .map_err(|e| AuditError::Export(e.to_string()))?;
    writeln!(writer, "# Generated: {}", export.exported_at)
        .map_err(|e| AuditError::Export(e.to_string()))?;
    writeln!(writer, "# Entries: {}", export.entry_count)
        .map_err(|e| AuditError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| AuditError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| AuditError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a YAML export
pub fn import_from_yaml(yaml_str: &str) -> AuditResult<LogExport> {
    let export: LogExport =
        serde_yaml::from_str(yaml_str).map_err(|e| AuditError::Export(e.to_string()))?;
    export.validate().map_err(AuditError::Export)?;
    Ok(export)
}

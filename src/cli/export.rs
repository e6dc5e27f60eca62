//! Export CLI command
//!
//! Writes the audit log to a file or stdout in the chosen format.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::ValueEnum;

use crate::cli::history::{select_entries, HistoryFilter};
use crate::error::{AuditError, AuditResult};
use crate::export::{export_entries_csv, export_entries_json, export_entries_yaml};
use crate::storage::LogStore;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV, one row per entry
    Csv,
    /// JSON with a versioned envelope
    Json,
    /// YAML, human-readable
    Yaml,
}

/// Export the matching entries to `output`, or stdout when absent
pub fn handle_export_command<S: LogStore>(
    store: &S,
    filter: &HistoryFilter,
    format: ExportFormat,
    output: Option<PathBuf>,
    pretty: bool,
) -> AuditResult<()> {
    let entries = select_entries(store, filter)?;

    match &output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                AuditError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            write_entries(&entries, format, &mut writer, pretty)?;
            writer
                .flush()
                .map_err(|e| AuditError::Export(e.to_string()))?;
            eprintln!("Exported {} entries to {}", entries.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_entries(&entries, format, &mut writer, pretty)?;
        }
    }

    Ok(())
}

fn write_entries<W: Write>(
    entries: &[crate::audit::LogEntry],
    format: ExportFormat,
    writer: &mut W,
    pretty: bool,
) -> AuditResult<()> {
    match format {
        ExportFormat::Csv => export_entries_csv(entries, writer),
        ExportFormat::Json => export_entries_json(entries, writer, pretty),
        ExportFormat::Yaml => export_entries_yaml(entries, writer),
    }
}

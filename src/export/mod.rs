//! Export module for auditlog
//!
//! Writes log entries in several formats:
//! - CSV: one row per entry, spreadsheet-compatible
//! - JSON: machine-readable, versioned envelope
//! - YAML: human-readable, same envelope

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_entries_csv;
pub use self::json::{export_entries_json, import_from_json, LogExport, EXPORT_SCHEMA_VERSION};
pub use self::yaml::{export_entries_yaml, import_from_yaml};

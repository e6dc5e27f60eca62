//! Configuration module for auditlog
//!
//! - Path resolution for the settings file and the audit log
//! - Settings persistence

pub mod paths;
pub mod settings;

pub use paths::AuditPaths;
pub use settings::{DisplaySettings, Settings};

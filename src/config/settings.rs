//! User settings for auditlog
//!
//! Controls whether entries are recorded, where the JSON-lines log lives,
//! and how change sets are rendered for display.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::AuditPaths;
use crate::error::AuditError;

/// How change sets are rendered as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Between field name and values
    #[serde(default = "default_colon")]
    pub colon: String,

    /// Between old and new value
    #[serde(default = "default_arrow")]
    pub arrow: String,

    /// Between fields
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_colon() -> String {
    ": ".to_string()
}

fn default_arrow() -> String {
    " → ".to_string()
}

fn default_separator() -> String {
    "; ".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            colon: default_colon(),
            arrow: default_arrow(),
            separator: default_separator(),
        }
    }
}

/// User settings for auditlog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Whether lifecycle events are recorded at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Audit log location; relative paths are resolved against the base
    /// directory. Defaults to `audit.log` in the base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub display: DisplaySettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            enabled: default_enabled(),
            log_file: None,
            display: DisplaySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &AuditPaths) -> Result<Self, AuditError> {
        let path = paths.settings_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|e| {
            AuditError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            AuditError::Config(format!("Invalid settings in {}: {}", path.display(), e))
        })
    }

    /// Save settings to disk
    ///
    /// The file is written next to its final location and renamed into place.
    pub fn save(&self, paths: &AuditPaths) -> Result<(), AuditError> {
        paths.ensure_directories()?;

        let path = paths.settings_file();
        let temp_path = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| AuditError::Config(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&temp_path, text).map_err(|e| {
            AuditError::Config(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;
        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            AuditError::Config(format!("Failed to replace {}: {}", path.display(), e))
        })
    }

    /// The audit log file these settings point at
    pub fn log_file(&self, paths: &AuditPaths) -> PathBuf {
        match &self.log_file {
            Some(path) => paths.resolve(path),
            None => paths.default_log_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.enabled);
        assert!(settings.log_file.is_none());
        assert_eq!(settings.display.arrow, " → ");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"display": {"arrow": " -> "}}"#).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.display.arrow, " -> ");
        assert_eq!(settings.display.colon, ": ");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            enabled: false,
            log_file: Some(PathBuf::from("logs/audit.jsonl")),
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
        assert!(!temp_dir.path().join("config.json.tmp").exists());
        assert_eq!(
            loaded.log_file(&paths),
            temp_dir.path().join("logs").join("audit.jsonl")
        );
    }

    #[test]
    fn test_load_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings::load_or_create(&paths).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.log_file(&paths), paths.default_log_file());
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "{ broken").unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_save_overwrites_previous_settings() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().join("nested"));

        Settings::default().save(&paths).unwrap();
        let disabled = Settings {
            enabled: false,
            ..Settings::default()
        };
        disabled.save(&paths).unwrap();

        assert!(!Settings::load_or_create(&paths).unwrap().enabled);
    }
}

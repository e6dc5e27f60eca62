//! Identifiers for log entries and audited records
//!
//! `LogEntryId` is a UUID newtype owned by the log store. `ObjectPk` is the
//! key of the audited record as the host application knows it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const LOG_ENTRY_PREFIX: &str = "log-";

/// Unique identifier of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntryId(Uuid);

impl LogEntryId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Check whether a (possibly short) identifier refers to this entry
    ///
    /// Accepts the full UUID, the display form (`log-1a2b3c4d`) or any
    /// prefix of the UUID text.
    pub fn matches(&self, identifier: &str) -> bool {
        let needle = identifier
            .strip_prefix(LOG_ENTRY_PREFIX)
            .unwrap_or(identifier);
        !needle.is_empty() && self.0.to_string().starts_with(needle)
    }
}

impl Default for LogEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", LOG_ENTRY_PREFIX, &self.0.to_string()[..8])
    }
}

impl From<Uuid> for LogEntryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for LogEntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(LOG_ENTRY_PREFIX).unwrap_or(s);
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Primary key of an audited record
///
/// Hosts key their records either by integer or by text (UUIDs, slugs).
/// Serialized untagged so keys appear as plain JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectPk {
    Int(i64),
    Str(String),
}

impl ObjectPk {
    /// The key itself for integer keys; text keys have no integer form
    /// even when they look numeric
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ObjectPk::Int(id) => Some(*id),
            ObjectPk::Str(_) => None,
        }
    }
}

impl fmt::Display for ObjectPk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectPk::Int(id) => write!(f, "{}", id),
            ObjectPk::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ObjectPk {
    fn from(id: i64) -> Self {
        ObjectPk::Int(id)
    }
}

impl From<&str> for ObjectPk {
    fn from(s: &str) -> Self {
        ObjectPk::Str(s.to_string())
    }
}

impl From<String> for ObjectPk {
    fn from(s: String) -> Self {
        ObjectPk::Str(s)
    }
}

impl From<Uuid> for ObjectPk {
    fn from(uuid: Uuid) -> Self {
        ObjectPk::Str(uuid.to_string())
    }
}

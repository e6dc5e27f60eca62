//! Core data models for auditlog
//!
//! Identifiers, field snapshots, and the capabilities a host application
//! provides for the records it wants audited.

pub mod ids;
pub mod record;
pub mod snapshot;

pub use ids::{LogEntryId, ObjectPk};
pub use record::{Auditable, RecordLookup};
pub use snapshot::Snapshot;

//! auditlog - change-auditing hooks for data model lifecycle events
//!
//! Listens for create, update, delete and many-to-many-change events on
//! registered models and persists a field-level diff of what changed.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `models`: record identity, snapshots, and the `Auditable` /
//!   `RecordLookup` capabilities the host implements
//! - `audit`: diffing, change encoding, receivers, registry and dispatch
//! - `storage`: the `LogStore` contract and the bundled stores
//! - `config`: path resolution and settings
//! - `export`: CSV, JSON and YAML export of log entries
//! - `cli`: handlers behind the `auditlog` binary
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use auditlog::audit::{Auditlog, ModelEvent, ModelOptions};
//! use auditlog::models::{Auditable, ObjectPk};
//! use auditlog::storage::MemoryStore;
//!
//! let mut auditlog = Auditlog::new(MemoryStore::new());
//! auditlog.register::<Article>(ModelOptions::new());
//! auditlog.dispatch(ModelEvent::PostSave { instance: &article, created: true })?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod storage;

pub use audit::{Auditlog, LogEntry, ModelEvent};
pub use error::{AuditError, AuditResult};

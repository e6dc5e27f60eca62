//! Change auditing for model lifecycle events
//!
//! Records create, update, delete and many-to-many changes of registered
//! models as log entries carrying a field-level diff.
//!
//! # Architecture
//!
//! - `diff`: computes the `ChangeSet` between two record snapshots.
//! - `changes`: the `ChangeSet` type and its JSON text encoding.
//! - `receivers`: one function per lifecycle event, turning the event into
//!   at most one `LogEntry`.
//! - `hooks`: `Auditlog`, which owns the registry and the store and routes
//!   `ModelEvent`s to the receivers.
//! - `context`: the actor attributed to entries written on this thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use auditlog::audit::{Auditlog, ModelEvent, ModelOptions};
//! use auditlog::storage::JsonlStore;
//!
//! let mut auditlog = Auditlog::new(JsonlStore::new(log_path));
//! auditlog.register::<Article>(ModelOptions::new().exclude_fields(["updated_at"]));
//!
//! // before writing the row
//! auditlog.dispatch(ModelEvent::PreSave { instance: &article, lookup: &repo })?;
//! // after writing it
//! auditlog.dispatch(ModelEvent::PostSave { instance: &article, created })?;
//! ```

mod changes;
pub mod context;
mod diff;
mod entry;
mod hooks;
pub mod receivers;
mod registry;

pub use changes::{Change, ChangeSet, FieldChange, M2mOperation, RelationChange};
pub use context::AuditContext;
pub use diff::{model_instance_diff, FieldFilter};
pub use entry::{Action, LogEntry};
pub use hooks::{Auditlog, ModelEvent};
pub use receivers::M2mAction;
pub use registry::{M2mField, ModelOptions, Registry};

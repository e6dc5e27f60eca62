//! Receivers for model lifecycle events
//!
//! Each receiver gathers the before/after state of a record, computes the
//! change set and writes one log entry through the `Auditlog`'s store.
//! They return the entry they wrote, or `None` when the event did not
//! warrant one. Prefer [`Auditlog::dispatch`], which also checks that the
//! model is registered.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::changes::{ChangeSet, M2mOperation};
use super::diff::model_instance_diff;
use super::entry::{Action, LogEntry};
use super::hooks::Auditlog;
use crate::error::{AuditError, AuditResult};
use crate::models::{Auditable, ObjectPk, RecordLookup};
use crate::storage::LogStore;

/// Stage and kind of a many-to-many change, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum M2mAction {
    PreAdd,
    PostAdd,
    PreRemove,
    PostRemove,
    PreClear,
    PostClear,
}

impl M2mAction {
    /// Whether the operation has completed
    pub fn is_post(&self) -> bool {
        matches!(
            self,
            M2mAction::PostAdd | M2mAction::PostRemove | M2mAction::PostClear
        )
    }

    /// The relation operation, regardless of stage
    pub fn operation(&self) -> M2mOperation {
        match self {
            M2mAction::PreAdd | M2mAction::PostAdd => M2mOperation::Add,
            M2mAction::PreRemove | M2mAction::PostRemove => M2mOperation::Remove,
            M2mAction::PreClear | M2mAction::PostClear => M2mOperation::Clear,
        }
    }
}

impl fmt::Display for M2mAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = if self.is_post() { "post" } else { "pre" };
        write!(f, "{}_{}", stage, self.operation())
    }
}

impl FromStr for M2mAction {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre_add" => Ok(M2mAction::PreAdd),
            "post_add" => Ok(M2mAction::PostAdd),
            "pre_remove" => Ok(M2mAction::PreRemove),
            "post_remove" => Ok(M2mAction::PostRemove),
            "pre_clear" => Ok(M2mAction::PreClear),
            "post_clear" => Ok(M2mAction::PostClear),
            other => Err(AuditError::InvalidAction(other.to_string())),
        }
    }
}

/// Log the creation of a record
///
/// Only fires for the save that created the record.
pub fn log_create<S, T>(
    auditlog: &Auditlog<S>,
    instance: &T,
    created: bool,
) -> AuditResult<Option<LogEntry>>
where
    S: LogStore,
    T: Auditable,
{
    if !created || !auditlog.is_enabled() {
        return Ok(None);
    }

    let new = instance.snapshot()?;
    let changes = model_instance_diff(None, Some(&new), auditlog.field_filter::<T>());
    auditlog.record(instance, Action::Create, &changes).map(Some)
}

/// Log changes made to a persisted record that is about to be saved
///
/// The prior state is loaded through `lookup`. Nothing is logged when the
/// record has no key yet, when the prior state is gone, or when no audited
/// field changed.
pub fn log_update<S, T, L>(
    auditlog: &Auditlog<S>,
    lookup: &L,
    instance: &T,
) -> AuditResult<Option<LogEntry>>
where
    S: LogStore,
    T: Auditable,
    L: RecordLookup<T> + ?Sized,
{
    if !auditlog.is_enabled() {
        return Ok(None);
    }
    let Some(pk) = instance.pk() else {
        return Ok(None);
    };
    let Some(old) = lookup.get(&pk)? else {
        debug!(model = T::MODEL_NAME, pk = %pk, "prior state not found, update not logged");
        return Ok(None);
    };

    let changes = model_instance_diff(
        Some(&old.snapshot()?),
        Some(&instance.snapshot()?),
        auditlog.field_filter::<T>(),
    );

    if changes.is_empty() {
        return Ok(None);
    }
    auditlog.record(instance, Action::Update, &changes).map(Some)
}

/// Log the deletion of a record
pub fn log_delete<S, T>(auditlog: &Auditlog<S>, instance: &T) -> AuditResult<Option<LogEntry>>
where
    S: LogStore,
    T: Auditable,
{
    if !auditlog.is_enabled() || instance.pk().is_none() {
        return Ok(None);
    }

    let old = instance.snapshot()?;
    let changes = model_instance_diff(Some(&old), None, auditlog.field_filter::<T>());
    auditlog.record(instance, Action::Delete, &changes).map(Some)
}

/// Log a change to one of the record's many-to-many relations
///
/// `through` names the join relation the host reports the change for;
/// it is resolved to a field through the model's registration. Clears are
/// logged at the pre stage, while the related keys can still be read.
pub fn log_m2m_change<S, T>(
    auditlog: &Auditlog<S>,
    instance: &T,
    through: &str,
    action: M2mAction,
    pk_set: &[ObjectPk],
) -> AuditResult<Option<LogEntry>>
where
    S: LogStore,
    T: Auditable,
{
    if !auditlog.is_enabled() || instance.pk().is_none() {
        return Ok(None);
    }

    match action {
        M2mAction::PostClear => Ok(None),
        M2mAction::PreClear => log_m2m_clear(auditlog, instance, through),
        action if action.is_post() && !pk_set.is_empty() => {
            let Some(field) = auditlog.relation_for::<T>(through) else {
                debug!(model = T::MODEL_NAME, through, "unknown m2m relation, change not logged");
                return Ok(None);
            };

            let mut changes = ChangeSet::new();
            changes.insert_relation(field, action.operation(), sorted_keys(pk_set));
            auditlog.record(instance, Action::M2mChange, &changes).map(Some)
        }
        _ => Ok(None),
    }
}

fn log_m2m_clear<S, T>(
    auditlog: &Auditlog<S>,
    instance: &T,
    through: &str,
) -> AuditResult<Option<LogEntry>>
where
    S: LogStore,
    T: Auditable,
{
    let Some(field) = auditlog.relation_for::<T>(through) else {
        debug!(model = T::MODEL_NAME, through, "unknown m2m relation, clear not logged");
        return Ok(None);
    };

    let cleared = instance.related_keys(field);
    if cleared.is_empty() {
        return Ok(None);
    }

    let mut changes = ChangeSet::new();
    changes.insert_relation(field, M2mOperation::Clear, sorted_keys(&cleared));
    auditlog.record(instance, Action::M2mChange, &changes).map(Some)
}

fn sorted_keys(keys: &[ObjectPk]) -> Vec<ObjectPk> {
    keys.iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

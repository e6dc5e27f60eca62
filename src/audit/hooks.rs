//! Wiring between host lifecycle events and the receivers
//!
//! The host reports each lifecycle event of a model as a [`ModelEvent`];
//! [`Auditlog::dispatch`] forwards it to the matching receiver when the
//! model is registered.

use tracing::debug;

use super::changes::ChangeSet;
use super::diff::FieldFilter;
use super::entry::{Action, LogEntry};
use super::receivers::{self, M2mAction};
use super::registry::{ModelOptions, Registry};
use crate::config::Settings;
use crate::error::AuditResult;
use crate::models::{Auditable, ObjectPk, RecordLookup};
use crate::storage::LogStore;

/// A lifecycle event of a model instance
pub enum ModelEvent<'a, T> {
    /// The instance is about to be saved; `lookup` loads its persisted state
    PreSave {
        instance: &'a T,
        lookup: &'a dyn RecordLookup<T>,
    },
    /// The instance was saved; `created` is set for the first save
    PostSave { instance: &'a T, created: bool },
    /// The instance was deleted
    PostDelete { instance: &'a T },
    /// A many-to-many relation of the instance changed
    M2mChanged {
        instance: &'a T,
        through: &'a str,
        action: M2mAction,
        pk_set: &'a [ObjectPk],
    },
}

impl<T> ModelEvent<'_, T> {
    fn name(&self) -> &'static str {
        match self {
            ModelEvent::PreSave { .. } => "pre_save",
            ModelEvent::PostSave { .. } => "post_save",
            ModelEvent::PostDelete { .. } => "post_delete",
            ModelEvent::M2mChanged { .. } => "m2m_changed",
        }
    }
}

/// Audit hooks bound to a registry and a log store
pub struct Auditlog<S> {
    settings: Settings,
    registry: Registry,
    store: S,
}

impl<S: LogStore> Auditlog<S> {
    /// Create hooks with default settings and an empty registry
    pub fn new(store: S) -> Self {
        Self::with_settings(store, Settings::default())
    }

    pub fn with_settings(store: S, settings: Settings) -> Self {
        Self {
            settings,
            registry: Registry::new(),
            store,
        }
    }

    /// Start auditing `T`
    pub fn register<T: Auditable>(&mut self, options: ModelOptions) {
        self.registry.register_model::<T>(options);
    }

    /// Stop auditing `T`; returns whether it was registered
    pub fn unregister<T: Auditable>(&mut self) -> bool {
        self.registry.unregister(T::MODEL_NAME)
    }

    pub fn is_registered<T: Auditable>(&self) -> bool {
        self.registry.contains(T::MODEL_NAME)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// The field filter registered for `T`
    pub fn field_filter<T: Auditable>(&self) -> Option<&FieldFilter> {
        self.registry.options(T::MODEL_NAME).map(|o| &o.fields)
    }

    /// The many-to-many field of `T` backed by the `through` relation
    pub fn relation_for<T: Auditable>(&self, through: &str) -> Option<&str> {
        self.registry
            .options(T::MODEL_NAME)
            .and_then(|o| o.relation_for(through))
    }

    /// Build an entry for `instance` and persist it
    pub fn record<T: Auditable>(
        &self,
        instance: &T,
        action: Action,
        changes: &ChangeSet,
    ) -> AuditResult<LogEntry> {
        let entry = LogEntry::for_instance(instance, action, changes)?;
        self.store.append(entry.clone())?;

        debug!(
            id = %entry.id,
            model = %entry.content_type,
            pk = %entry.object_pk,
            action = %entry.action,
            fields = changes.len(),
            "log entry recorded"
        );
        Ok(entry)
    }

    /// Route a lifecycle event to its receiver
    ///
    /// Events of models that are not registered are ignored.
    pub fn dispatch<T: Auditable>(&self, event: ModelEvent<'_, T>) -> AuditResult<Option<LogEntry>> {
        if !self.registry.contains(T::MODEL_NAME) {
            debug!(model = T::MODEL_NAME, event = event.name(), "model not registered");
            return Ok(None);
        }

        match event {
            ModelEvent::PreSave { instance, lookup } => {
                receivers::log_update(self, lookup, instance)
            }
            ModelEvent::PostSave { instance, created } => {
                receivers::log_create(self, instance, created)
            }
            ModelEvent::PostDelete { instance } => receivers::log_delete(self, instance),
            ModelEvent::M2mChanged {
                instance,
                through,
                action,
                pk_set,
            } => receivers::log_m2m_change(self, instance, through, action, pk_set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::context::{self, AuditContext};
    use crate::storage::MemoryStore;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Serialize)]
    struct User {
        id: i64,
        email: String,
    }

    impl Auditable for User {
        const MODEL_NAME: &'static str = "user";

        fn pk(&self) -> Option<ObjectPk> {
            Some(ObjectPk::Int(self.id))
        }
    }

    #[derive(Debug, Clone, Serialize)]
    struct Session {
        id: i64,
    }

    impl Auditable for Session {
        const MODEL_NAME: &'static str = "session";

        fn pk(&self) -> Option<ObjectPk> {
            Some(ObjectPk::Int(self.id))
        }
    }

    fn user(email: &str) -> User {
        User {
            id: 1,
            email: email.to_string(),
        }
    }

    #[test]
    fn test_register_and_unregister() {
        let mut auditlog = Auditlog::new(MemoryStore::new());
        assert!(!auditlog.is_registered::<User>());

        auditlog.register::<User>(ModelOptions::new());
        assert!(auditlog.is_registered::<User>());

        assert!(auditlog.unregister::<User>());
        assert!(!auditlog.is_registered::<User>());
    }

    #[test]
    fn test_registry_mut_and_into_store() {
        let mut auditlog = Auditlog::new(MemoryStore::new());
        auditlog
            .registry_mut()
            .register("user", ModelOptions::new().exclude_fields(["email"]));
        assert!(auditlog.is_registered::<User>());

        auditlog
            .dispatch(ModelEvent::PostSave {
                instance: &user("a@example.com"),
                created: true,
            })
            .unwrap();

        let store = auditlog.into_store();
        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].changes, r#"{"id":[null,1]}"#);
    }

    #[test]
    fn test_dispatch_lifecycle() {
        let mut auditlog = Auditlog::new(MemoryStore::new());
        auditlog.register::<User>(ModelOptions::new());

        let created = user("a@example.com");
        auditlog
            .dispatch(ModelEvent::PostSave {
                instance: &created,
                created: true,
            })
            .unwrap();

        let mut rows = HashMap::new();
        rows.insert(ObjectPk::Int(1), created.clone());
        let updated = user("b@example.com");
        auditlog
            .dispatch(ModelEvent::PreSave {
                instance: &updated,
                lookup: &rows,
            })
            .unwrap();

        auditlog
            .dispatch(ModelEvent::PostDelete { instance: &updated })
            .unwrap();

        let actions: Vec<_> = auditlog
            .store()
            .get_for_object("user", &ObjectPk::Int(1))
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec![Action::Create, Action::Update, Action::Delete]);
    }

    #[test]
    fn test_dispatch_ignores_unregistered_models() {
        let mut auditlog = Auditlog::new(MemoryStore::new());
        auditlog.register::<User>(ModelOptions::new());

        let session = Session { id: 5 };
        let entry = auditlog
            .dispatch(ModelEvent::PostSave {
                instance: &session,
                created: true,
            })
            .unwrap();

        assert!(entry.is_none());
        assert!(auditlog.store().is_empty().unwrap());
    }

    #[test]
    fn test_dispatch_m2m() {
        let mut auditlog = Auditlog::new(MemoryStore::new());
        auditlog.register::<User>(ModelOptions::new().m2m_field("groups", "user_groups"));

        let entry = auditlog
            .dispatch(ModelEvent::M2mChanged {
                instance: &user("a@example.com"),
                through: "user_groups",
                action: M2mAction::PostAdd,
                pk_set: &[ObjectPk::Int(10)],
            })
            .unwrap()
            .unwrap();

        assert_eq!(entry.action, Action::M2mChange);
        assert_eq!(entry.changes, r#"{"groups":["add",[10]]}"#);
    }

    #[test]
    fn test_record_attaches_context() {
        let mut auditlog = Auditlog::new(MemoryStore::new());
        auditlog.register::<User>(ModelOptions::new());

        let _guard = context::enter(AuditContext::new().with_actor("admin"));
        auditlog
            .dispatch(ModelEvent::PostSave {
                instance: &user("a@example.com"),
                created: true,
            })
            .unwrap();

        let entries = auditlog.store().entries().unwrap();
        assert_eq!(entries[0].actor.as_deref(), Some("admin"));
    }
}

//! Registry of audited models
//!
//! Only models present in the registry produce log entries. Each
//! registration carries the field filter used for diffs, display names for
//! fields, and the many-to-many relations the model owns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::diff::FieldFilter;
use crate::models::Auditable;

/// A many-to-many field and the join relation that identifies it in events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M2mField {
    pub name: String,
    pub through: String,
}

/// Per-model audit options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    #[serde(default)]
    pub fields: FieldFilter,

    /// Field name -> display name
    #[serde(default)]
    pub mapping_fields: BTreeMap<String, String>,

    #[serde(default)]
    pub m2m_fields: Vec<M2mField>,
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only compare these fields
    pub fn include_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.include_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Never compare these fields
    pub fn exclude_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.exclude_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Show `field` as `display_name` in rendered changes
    pub fn map_field(mut self, field: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.mapping_fields.insert(field.into(), display_name.into());
        self
    }

    /// Declare a many-to-many field backed by the `through` relation
    pub fn m2m_field(mut self, name: impl Into<String>, through: impl Into<String>) -> Self {
        self.m2m_fields.push(M2mField {
            name: name.into(),
            through: through.into(),
        });
        self
    }

    /// Resolve the many-to-many field whose join relation is `through`
    pub fn relation_for(&self, through: &str) -> Option<&str> {
        self.m2m_fields
            .iter()
            .find(|f| f.through == through)
            .map(|f| f.name.as_str())
    }
}

/// The set of audited models, keyed by model name
#[derive(Debug, Clone, Default)]
pub struct Registry {
    models: BTreeMap<String, ModelOptions>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model by name, replacing any previous options
    pub fn register(&mut self, model: impl Into<String>, options: ModelOptions) {
        let model = model.into();
        tracing::debug!(model = %model, "model registered for auditing");
        self.models.insert(model, options);
    }

    /// Register an `Auditable` type under its model name
    pub fn register_model<T: Auditable>(&mut self, options: ModelOptions) {
        self.register(T::MODEL_NAME, options);
    }

    /// Stop auditing a model; returns whether it was registered
    pub fn unregister(&mut self, model: &str) -> bool {
        let removed = self.models.remove(model).is_some();
        if removed {
            tracing::debug!(model, "model unregistered");
        }
        removed
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn options(&self, model: &str) -> Option<&ModelOptions> {
        self.models.get(model)
    }

    /// Registered model names in order
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

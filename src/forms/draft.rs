use std::collections::BTreeMap;

use crate::core::AppError;

use super::normalizer::{normalize, FieldInput, FieldValue};
use super::rules::{validate_fields, FieldErrors};
use super::schema::{EntityKind, EntitySchema};

/// What a single field edit did to the rest of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChange {
    /// Dependent selections emptied because the scope moved.
    pub cleared: Vec<&'static str>,
    /// New scope value when the scope field changed; `Some("")` means cleared.
    pub scope: Option<String>,
}

/// Current values and displayed errors of one registration form.
#[derive(Debug)]
pub struct FormDraft {
    schema: &'static EntitySchema,
    values: BTreeMap<&'static str, FieldValue>,
    errors: FieldErrors,
}

impl FormDraft {
    pub fn new(kind: EntityKind) -> Self {
        let schema = kind.schema();
        Self {
            schema,
            values: initial_values(schema),
            errors: FieldErrors::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn values(&self) -> &BTreeMap<&'static str, FieldValue> {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            FieldValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Normalizes and stores one edit. Only the edited field's error is cleared.
    pub fn set(&mut self, name: &str, input: FieldInput) -> Result<FieldChange, AppError> {
        let spec = self
            .schema
            .field(name)
            .ok_or_else(|| {
                AppError::validation_error(format!(
                    "{} form has no field named {}",
                    self.schema.kind.as_str(),
                    name
                ))
            })?;

        let value = normalize(spec.class, input);
        let changed = self
            .values
            .get(spec.name)
            .map(|current| !current.same_as(&value))
            .unwrap_or(true);
        self.values.insert(spec.name, value);
        self.errors.remove(spec.name);

        let mut change = FieldChange::default();
        if changed && self.schema.is_scope(spec.name) {
            for dependent in self.schema.dependents {
                self.values
                    .insert(dependent.field, FieldValue::Text(String::new()));
                change.cleared.push(dependent.field);
            }
            change.scope = Some(self.text(spec.name).unwrap_or_default().trim().to_string());
        }
        Ok(change)
    }

    /// Empties a selection without touching its displayed error.
    pub fn clear_selection(&mut self, name: &'static str) {
        if let Some(spec) = self.schema.field(name) {
            self.values.insert(spec.name, FieldValue::empty(spec.class));
        }
    }

    /// Full re-validation; replaces every displayed error.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_fields(self.schema, &self.values);
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, name: &'static str, message: String) {
        self.errors.insert(name, message);
    }

    pub fn reset(&mut self) {
        self.values = initial_values(self.schema);
        self.errors.clear();
    }
}

fn initial_values(schema: &EntitySchema) -> BTreeMap<&'static str, FieldValue> {
    schema
        .fields()
        .map(|spec| (spec.name, FieldValue::empty(spec.class)))
        .collect()
}

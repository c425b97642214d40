//! Update-expression builder.
//!
//! Turns a partial field set into a key-preserving merge. Every field name is
//! mapped to a `#fN` name placeholder and every value to a `:vN` value
//! placeholder, so arbitrary attribute names never collide with reserved
//! words of the backend. Placeholders are assigned in field-name order, which
//! keeps the expression stable for the same input. `updatedAt` is always the
//! last assignment and is stamped by the builder, never taken from the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use super::entity::{Item, ID_FIELD, TYPE_FIELD};

pub const UPDATED_AT_FIELD: &str = "updatedAt";

const UPDATED_AT_NAME: &str = "#updatedAt";
const UPDATED_AT_VALUE: &str = ":updatedAt";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("Key field '{0}' cannot be updated")]
    KeyField(String),
}

#[derive(Debug, Default)]
pub struct UpdateBuilder {
    fields: BTreeMap<String, Value>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-loaded with every entry of `fields`.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, UpdateError> {
        fields
            .into_iter()
            .try_fold(Self::new(), |builder, (field, value)| builder.set(field, value))
    }

    pub fn set(mut self, field: impl Into<String>, value: Value) -> Result<Self, UpdateError> {
        let field = field.into();
        if field == ID_FIELD || field == TYPE_FIELD {
            return Err(UpdateError::KeyField(field));
        }
        // The timestamp is owned by the builder.
        if field != UPDATED_AT_FIELD {
            self.fields.insert(field, value);
        }
        Ok(self)
    }

    pub fn build(self, updated_at: DateTime<Utc>) -> UpdateExpression {
        let mut clauses = Vec::with_capacity(self.fields.len() + 1);
        let mut names = BTreeMap::new();
        let mut values = BTreeMap::new();
        let mut assignments = Vec::with_capacity(self.fields.len() + 1);

        for (index, (field, value)) in self.fields.into_iter().enumerate() {
            let name = format!("#f{}", index);
            let placeholder = format!(":v{}", index);
            clauses.push(format!("{} = {}", name, placeholder));
            names.insert(name.clone(), field);
            values.insert(placeholder.clone(), value);
            assignments.push((name, placeholder));
        }

        clauses.push(format!("{} = {}", UPDATED_AT_NAME, UPDATED_AT_VALUE));
        names.insert(UPDATED_AT_NAME.to_string(), UPDATED_AT_FIELD.to_string());
        values.insert(
            UPDATED_AT_VALUE.to_string(),
            Value::String(updated_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        );
        assignments.push((UPDATED_AT_NAME.to_string(), UPDATED_AT_VALUE.to_string()));

        UpdateExpression {
            expression: format!("SET {}", clauses.join(", ")),
            names,
            values,
            assignments,
        }
    }
}

/// A built `SET` expression plus its placeholder tables.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    expression: String,
    names: BTreeMap<String, String>,
    values: BTreeMap<String, Value>,
    assignments: Vec<(String, String)>,
}

impl UpdateExpression {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Resolved `(field, value)` pairs in assignment order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.assignments.iter().filter_map(move |(name, placeholder)| {
            let field = self.names.get(name)?;
            let value = self.values.get(placeholder)?;
            Some((field.as_str(), value))
        })
    }

    /// Merge the assignments into an existing record.
    pub fn apply(&self, item: &mut Item) {
        for (field, value) in self.assignments() {
            item.insert(field.to_string(), value.clone());
        }
    }
}

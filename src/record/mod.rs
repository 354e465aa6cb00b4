//! Record projection
//!
//! Projects a storage row to a field-name → JSON value mapping according to
//! the entity's descriptors: to-one relations project as the related id,
//! to-many relations as a list of ids, and fields behind a write transform
//! (credentials) are excluded by contract.

use serde::Serialize;
use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::error::EngineResult;
use crate::schema::{EntityType, FieldKind, ScalarKind};

/// A projected entity record
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Record {
    values: serde_json::Map<String, Value>,
}

impl Record {
    /// Project a storage row through the entity's field descriptors.
    pub fn from_row(entity: &EntityType, row: &SqliteRow) -> EngineResult<Self> {
        let mut values = serde_json::Map::new();

        for field in entity.projected_fields() {
            let name = field.name.as_str();
            let value = match &field.kind {
                FieldKind::Scalar(ScalarKind::Integer) => row
                    .try_get::<Option<i64>, _>(name)?
                    .map_or(Value::Null, Value::from),
                FieldKind::Scalar(ScalarKind::Real) => row
                    .try_get::<Option<f64>, _>(name)?
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number),
                FieldKind::Scalar(ScalarKind::Boolean) => row
                    .try_get::<Option<bool>, _>(name)?
                    .map_or(Value::Null, Value::Bool),
                FieldKind::Scalar(ScalarKind::Text)
                | FieldKind::Scalar(ScalarKind::Timestamp)
                | FieldKind::BelongsTo { .. } => row
                    .try_get::<Option<String>, _>(name)?
                    .map_or(Value::Null, Value::String),
                FieldKind::Json => row
                    .try_get::<Option<String>, _>(name)?
                    .map_or(Value::Null, |raw| {
                        serde_json::from_str(&raw).unwrap_or(Value::Null)
                    }),
                FieldKind::HasMany { .. } => row
                    .try_get::<Option<String>, _>(name)?
                    .map_or(Value::Array(Vec::new()), |raw| {
                        serde_json::from_str(&raw).unwrap_or(Value::Array(Vec::new()))
                    }),
            };

            values.insert(field.name.clone(), value);
        }

        Ok(Self { values })
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Convenience accessor for string-valued fields
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// The record id
    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// The full field mapping
    pub fn fields(&self) -> &serde_json::Map<String, Value> {
        &self.values
    }

    /// Consume into the field mapping
    pub fn into_fields(self) -> serde_json::Map<String, Value> {
        self.values
    }
}

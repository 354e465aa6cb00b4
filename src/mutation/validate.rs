//! Mutation input validation
//!
//! Validates a submitted field mapping against a derived input schema,
//! accumulating one error per violation instead of failing fast — the caller
//! renders all of them together next to form fields.

use serde_json::Value;

use crate::db::SqlValue;
use crate::query::value::{ValueType, coerce};
use crate::schema::FieldKind;

use super::input::InputSchema;

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a submitted field mapping.
///
/// Returns the accepted `(field, bind value)` pairs in schema order together
/// with every accumulated error. The values are only meaningful when the
/// error list is empty.
pub fn validate(
    schema: &InputSchema,
    submitted: &serde_json::Map<String, Value>,
) -> (Vec<(String, SqlValue)>, Vec<FieldError>) {
    let mut values = Vec::new();
    let mut errors = Vec::new();

    for name in submitted.keys() {
        if schema.field(name).is_none() {
            errors.push(FieldError::new(name, "unknown field"));
        }
    }

    for field in schema.fields() {
        match submitted.get(&field.name) {
            None => {
                if field.required {
                    errors.push(FieldError::new(&field.name, "this field is required"));
                }
            }
            Some(Value::Null) => {
                if field.required {
                    errors.push(FieldError::new(&field.name, "this field is required"));
                } else if !field.nullable {
                    errors.push(FieldError::new(&field.name, "may not be null"));
                } else {
                    values.push((field.name.clone(), SqlValue::Null));
                }
            }
            Some(value) => match coerce_write(&field.name, &field.kind, value) {
                Ok(bind) => values.push((field.name.clone(), bind)),
                Err(message) => errors.push(FieldError::new(&field.name, message)),
            },
        }
    }

    (values, errors)
}

/// Coerce one submitted JSON value to a bind value per the field kind.
fn coerce_write(name: &str, kind: &FieldKind, value: &Value) -> Result<SqlValue, String> {
    use crate::schema::ScalarKind::*;

    match kind {
        FieldKind::Scalar(Text) => value
            .as_str()
            .map(|s| SqlValue::Text(s.to_string()))
            .ok_or_else(|| "expected a string".to_string()),
        FieldKind::Scalar(Integer) => value
            .as_i64()
            .map(SqlValue::Integer)
            .ok_or_else(|| "expected an integer".to_string()),
        FieldKind::Scalar(Real) => value
            .as_f64()
            .map(SqlValue::Real)
            .ok_or_else(|| "expected a number".to_string()),
        FieldKind::Scalar(Boolean) => value
            .as_bool()
            .map(SqlValue::Boolean)
            .ok_or_else(|| "expected a boolean".to_string()),
        FieldKind::Scalar(Timestamp) => {
            let raw = value
                .as_str()
                .ok_or_else(|| "expected a datetime in the format DD/MM/YYYY HH:MM:SS".to_string())?;
            coerce(name, raw, ValueType::DateTime)
                .or_else(|_| coerce(name, raw, ValueType::Date))
                .map(|coerced| coerced.to_sql_value())
                .map_err(|_| "expected a datetime in the format DD/MM/YYYY HH:MM:SS".to_string())
        }
        FieldKind::Json => {
            if value.is_object() || value.is_array() {
                serde_json::to_string(value)
                    .map(SqlValue::Text)
                    .map_err(|_| "expected a JSON object or array".to_string())
            } else {
                Err("expected a JSON object or array".to_string())
            }
        }
        FieldKind::BelongsTo { .. } => value
            .as_str()
            .map(|s| SqlValue::Text(s.to_string()))
            .ok_or_else(|| "expected a record id".to_string()),
        FieldKind::HasMany { .. } => {
            let ids = value
                .as_array()
                .ok_or_else(|| "expected a list of record ids".to_string())?;
            let mut list = Vec::with_capacity(ids.len());
            for id in ids {
                match id.as_str() {
                    Some(s) => list.push(s.to_string()),
                    None => return Err("expected a list of record ids".to_string()),
                }
            }
            serde_json::to_string(&list)
                .map(SqlValue::Text)
                .map_err(|_| "expected a list of record ids".to_string())
        }
    }
}

//! Value coercion for filter input
//!
//! Raw filter values arrive as strings with an optional declared value type.
//! Date, Time and DateTime all coerce to one canonical timestamp
//! representation so the storage layer compares them uniformly regardless of
//! which of the three was supplied.
//!
//! When no value type is declared the raw value passes through uncoerced as a
//! string — a deliberate legacy fallback for clients that omit type hints
//! (string-comparison semantics, not an error).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::db::SqlValue;
use crate::error::{EngineError, EngineResult};

/// Canonical timestamp rendering: date-time with fractional seconds
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Input format for [ValueType::Date]
const DATE_FORMAT: &str = "%d/%m/%Y";
/// Input format for [ValueType::Time]
const TIME_FORMAT: &str = "%H:%M:%S";
/// Input format for [ValueType::DateTime]
const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Declared semantic kind of a filter value, independent of its storage
/// representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    String,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl ValueType {
    /// Whether this type coerces to the canonical timestamp representation
    pub fn is_date_family(&self) -> bool {
        matches!(self, ValueType::Date | ValueType::Time | ValueType::DateTime)
    }

    /// Type name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Int => "Int",
            ValueType::Float => "Float",
            ValueType::String => "String",
            ValueType::Boolean => "Boolean",
            ValueType::Date => "Date",
            ValueType::Time => "Time",
            ValueType::DateTime => "DateTime",
        }
    }
}

/// A filter value after coercion
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
}

impl CoercedValue {
    /// Kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            CoercedValue::Null => "null",
            CoercedValue::Int(_) => "int",
            CoercedValue::Float(_) => "float",
            CoercedValue::Text(_) => "string",
            CoercedValue::Boolean(_) => "boolean",
            CoercedValue::Timestamp(_) => "timestamp",
        }
    }

    /// Null or empty string — the values the is-null rewrite applies to
    pub fn is_null_like(&self) -> bool {
        match self {
            CoercedValue::Null => true,
            CoercedValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Convert to a bindable storage value
    pub fn to_sql_value(&self) -> SqlValue {
        match self {
            CoercedValue::Null => SqlValue::Null,
            CoercedValue::Int(i) => SqlValue::Integer(*i),
            CoercedValue::Float(f) => SqlValue::Real(*f),
            CoercedValue::Text(s) => SqlValue::Text(s.clone()),
            CoercedValue::Boolean(b) => SqlValue::Boolean(*b),
            CoercedValue::Timestamp(ts) => SqlValue::Text(format_timestamp(*ts)),
        }
    }
}

/// Render a timestamp in the canonical storage format
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Reference date for time-only values, matching the legacy behavior of
/// parsing a bare time into a full timestamp
fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).expect("reference date is valid")
}

/// Parse a raw string into a typed value according to the declared value type.
///
/// `field` is carried for diagnostics only.
pub fn coerce(field: &str, raw: &str, value_type: ValueType) -> EngineResult<CoercedValue> {
    let invalid = |message: &str| EngineError::InvalidFormat {
        field: field.to_string(),
        message: message.to_string(),
    };

    match value_type {
        ValueType::Int => raw
            .parse::<i64>()
            .map(CoercedValue::Int)
            .map_err(|_| invalid("expected an integer")),
        ValueType::Float => raw
            .parse::<f64>()
            .map(CoercedValue::Float)
            .map_err(|_| invalid("expected a number")),
        ValueType::String => Ok(CoercedValue::Text(raw.to_string())),
        ValueType::Boolean => raw
            .parse::<bool>()
            .map(CoercedValue::Boolean)
            .map_err(|_| invalid("expected true or false")),
        ValueType::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(|date| CoercedValue::Timestamp(date.and_time(NaiveTime::MIN)))
            .map_err(|_| invalid("date must be in the format DD/MM/YYYY")),
        ValueType::Time => NaiveTime::parse_from_str(raw, TIME_FORMAT)
            .map(|time| CoercedValue::Timestamp(reference_date().and_time(time)))
            .map_err(|_| invalid("time must be in the format HH:MM:SS")),
        ValueType::DateTime => NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
            .map(CoercedValue::Timestamp)
            .map_err(|_| invalid("datetime must be in the format DD/MM/YYYY HH:MM:SS")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn date_coerces_to_canonical_timestamp() {
        let value = coerce("created_at", "31/12/2023", ValueType::Date).unwrap();
        assert_eq!(
            value.to_sql_value(),
            SqlValue::Text("2023-12-31 00:00:00.000000".to_string())
        );
    }

    #[test]
    fn iso_date_is_rejected() {
        let err = coerce("created_at", "2023-12-31", ValueType::Date).unwrap_err();
        assert_matches!(err, EngineError::InvalidFormat { field, .. } if field == "created_at");
    }

    #[test]
    fn time_coerces_onto_reference_date() {
        let value = coerce("starts_at", "09:30:00", ValueType::Time).unwrap();
        assert_eq!(
            value.to_sql_value(),
            SqlValue::Text("1900-01-01 09:30:00.000000".to_string())
        );
    }

    #[test]
    fn datetime_requires_both_parts() {
        let value = coerce("seen_at", "01/02/2024 13:45:10", ValueType::DateTime).unwrap();
        assert_eq!(
            value.to_sql_value(),
            SqlValue::Text("2024-02-01 13:45:10.000000".to_string())
        );

        assert!(coerce("seen_at", "01/02/2024", ValueType::DateTime).is_err());
    }

    #[test]
    fn scalar_parses() {
        assert_eq!(coerce("n", "42", ValueType::Int).unwrap(), CoercedValue::Int(42));
        assert_eq!(
            coerce("n", "4.5", ValueType::Float).unwrap(),
            CoercedValue::Float(4.5)
        );
        assert_eq!(
            coerce("b", "true", ValueType::Boolean).unwrap(),
            CoercedValue::Boolean(true)
        );
        assert!(coerce("n", "forty", ValueType::Int).is_err());
        assert!(coerce("b", "1", ValueType::Boolean).is_err());
    }

    #[test]
    fn null_like_covers_null_and_empty_text() {
        assert!(CoercedValue::Null.is_null_like());
        assert!(CoercedValue::Text(String::new()).is_null_like());
        assert!(!CoercedValue::Text("x".into()).is_null_like());
        assert!(!CoercedValue::Int(0).is_null_like());
    }
}

//! Filter operators and operator/value compatibility
//!
//! Leaf operators and combinator operators are separate enums, so a
//! combinator operator can never reach the leaf validator by construction.

use crate::error::{EngineError, EngineResult};

use super::value::{CoercedValue, ValueType};

/// Comparison operators usable on filter leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
}

impl FilterOperator {
    /// Operator name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "notContains",
        }
    }
}

/// Boolean combinators over child filter nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOperator {
    And,
    Or,
}

impl CombineOperator {
    /// SQL joiner between compiled children
    pub fn sql_joiner(&self) -> &'static str {
        match self {
            CombineOperator::And => " AND ",
            CombineOperator::Or => " OR ",
        }
    }
}

/// Operators valid for plain string values
const STRING_OPS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Neq,
    FilterOperator::Contains,
    FilterOperator::NotContains,
];

/// Operators valid for numeric and date-family values
const ORDERED_OPS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Neq,
    FilterOperator::Gt,
    FilterOperator::Gte,
    FilterOperator::Lt,
    FilterOperator::Lte,
];

/// Operators valid for booleans and null values
const EXACT_OPS: &[FilterOperator] = &[FilterOperator::Eq, FilterOperator::Neq];

/// Accept or reject an operator for a coerced value and its declared type.
///
/// A string value declared with a date-family type takes the ordering
/// operators regardless of its underlying kind; a null value takes only
/// eq/neq (rewritten to is-null forms by the compiler).
pub fn validate_operator(
    value: &CoercedValue,
    value_type: Option<ValueType>,
    operator: FilterOperator,
) -> EngineResult<()> {
    let date_declared = value_type.is_some_and(|vt| vt.is_date_family());

    let allowed = match value {
        CoercedValue::Text(_) if date_declared => ORDERED_OPS,
        CoercedValue::Text(_) => STRING_OPS,
        CoercedValue::Timestamp(_) => ORDERED_OPS,
        CoercedValue::Int(_) | CoercedValue::Float(_) => ORDERED_OPS,
        CoercedValue::Boolean(_) => EXACT_OPS,
        CoercedValue::Null => EXACT_OPS,
    };

    if allowed.contains(&operator) {
        return Ok(());
    }

    let effective_type = match value_type {
        Some(vt) if vt.is_date_family() => vt.name().to_string(),
        _ => value.kind_name().to_string(),
    };

    Err(EngineError::OperatorMismatch {
        operator: operator.as_str(),
        value_type: effective_type,
    })
}

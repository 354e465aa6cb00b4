//! Bind values for parameterized queries
//!
//! Every piece of client-supplied data reaches SQLite through a bound
//! parameter, never through interpolated SQL text.

use sqlx::Sqlite;
use sqlx::sqlite::SqliteArguments;

/// A value that can be bound to a parameterized query.
///
/// Collected by the filter compiler and the mutation pipeline alongside the
/// generated SQL fragments.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Null,
}

impl SqlValue {
    /// Bind this value to a query builder at the next positional parameter
    pub fn bind_to_query<'q>(
        &'q self,
        query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Integer(i) => query.bind(*i),
            SqlValue::Real(f) => query.bind(*f),
            SqlValue::Boolean(b) => query.bind(if *b { 1i32 } else { 0i32 }),
            SqlValue::Null => query.bind(None::<String>),
        }
    }

    /// Bind this value to a scalar query builder
    pub fn bind_to_scalar<'q, O>(
        &'q self,
        query: sqlx::query::QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> sqlx::query::QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
        match self {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Integer(i) => query.bind(*i),
            SqlValue::Real(f) => query.bind(*f),
            SqlValue::Boolean(b) => query.bind(if *b { 1i32 } else { 0i32 }),
            SqlValue::Null => query.bind(None::<String>),
        }
    }
}

//! Sort compilation
//!
//! An ordered list of (field, direction) pairs compiles into an ORDER BY
//! clause; list order is the tie-break precedence and is preserved verbatim.

use crate::error::EngineResult;
use crate::schema::EntityType;

/// Order direction for sorting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending (A-Z, 0-9, oldest-newest)
    #[default]
    Asc,
    /// Descending (Z-A, 9-0, newest-oldest)
    Desc,
}

impl SortDirection {
    /// Convert to SQL order string
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One sort criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Compile sort keys into an ORDER BY clause fragment.
///
/// Every field must resolve on the entity type; returns `None` for an empty
/// key list.
pub fn compile_sort(entity: &EntityType, keys: &[SortKey]) -> EngineResult<Option<String>> {
    if keys.is_empty() {
        return Ok(None);
    }

    let mut clauses = Vec::with_capacity(keys.len());
    for key in keys {
        let field = entity.field(&key.field)?;
        clauses.push(format!("{} {}", field.name, key.direction.as_sql()));
    }

    Ok(Some(clauses.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::error::EngineError;
    use crate::schema::{EntityType, FieldDescriptor};

    fn entity() -> EntityType {
        EntityType::builder("user", "users")
            .field(FieldDescriptor::text("username"))
            .field(FieldDescriptor::integer("score").nullable())
            .build()
    }

    #[test]
    fn keys_render_in_precedence_order() {
        let clause = compile_sort(
            &entity(),
            &[SortKey::desc("score"), SortKey::asc("username")],
        )
        .unwrap();
        assert_eq!(clause.as_deref(), Some("score DESC, username ASC"));
    }

    #[test]
    fn empty_list_compiles_to_none() {
        assert_eq!(compile_sort(&entity(), &[]).unwrap(), None);
    }

    #[test]
    fn unknown_field_fails() {
        let err = compile_sort(&entity(), &[SortKey::asc("nickname")]).unwrap_err();
        assert_matches!(err, EngineError::UnknownField { field, .. } if field == "nickname");
    }

    #[test]
    fn direction_defaults_to_ascending() {
        assert_eq!(SortDirection::default(), SortDirection::Asc);
    }
}

//! Recursive filter-tree compiler
//!
//! Compiles a client-supplied boolean expression tree into a parameterized
//! storage predicate. Child order is preserved through every fold so the
//! generated SQL text is deterministic for a given tree — equal trees always
//! produce byte-identical predicates, which keeps generated queries usable
//! for caching and test comparison.
//!
//! Sibling branches compile into independent [SqlPredicate] values with no
//! shared state.

use crate::db::SqlValue;
use crate::error::{EngineError, EngineResult};
use crate::schema::{EntityType, FieldKind};

use super::operator::{CombineOperator, FilterOperator, validate_operator};
use super::value::{CoercedValue, ValueType, coerce};

/// Recursion ceiling bounding the cost of pathological client trees
pub const MAX_FILTER_DEPTH: usize = 32;

/// A node in a client filter tree: a single comparison or an AND/OR of
/// child nodes.
#[derive(Debug, Clone)]
pub enum FilterNode {
    /// A single field comparison
    Leaf {
        field: String,
        /// Raw value as submitted; `None` targets NULL
        value: Option<String>,
        /// Declared value type; omitted means the raw string passes through
        /// uncoerced (legacy string-comparison fallback)
        value_type: Option<ValueType>,
        operator: FilterOperator,
    },
    /// A boolean combination of child nodes, non-empty
    Combinator {
        operator: CombineOperator,
        children: Vec<FilterNode>,
    },
}

impl FilterNode {
    /// An untyped leaf comparison
    pub fn leaf(
        field: impl Into<String>,
        value: impl Into<String>,
        operator: FilterOperator,
    ) -> Self {
        FilterNode::Leaf {
            field: field.into(),
            value: Some(value.into()),
            value_type: None,
            operator,
        }
    }

    /// A leaf comparison with a declared value type
    pub fn typed_leaf(
        field: impl Into<String>,
        value: impl Into<String>,
        value_type: ValueType,
        operator: FilterOperator,
    ) -> Self {
        FilterNode::Leaf {
            field: field.into(),
            value: Some(value.into()),
            value_type: Some(value_type),
            operator,
        }
    }

    /// A leaf targeting NULL (compiles to the is-null predicate forms)
    pub fn null_leaf(field: impl Into<String>, operator: FilterOperator) -> Self {
        FilterNode::Leaf {
            field: field.into(),
            value: None,
            value_type: None,
            operator,
        }
    }

    /// AND over child nodes
    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::Combinator {
            operator: CombineOperator::And,
            children,
        }
    }

    /// OR over child nodes
    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Combinator {
            operator: CombineOperator::Or,
            children,
        }
    }
}

/// A compiled storage predicate: condition text plus ordered bind values
#[derive(Debug, Clone, PartialEq)]
pub struct SqlPredicate {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

/// Compile a filter tree against an entity type.
pub fn compile(entity: &EntityType, node: &FilterNode) -> EngineResult<SqlPredicate> {
    compile_node(entity, node, 0)
}

/// Expand a free-text search term into an OR of case-insensitive contains
/// comparisons over the entity's searchable fields.
///
/// Returns `None` when the term is empty or the entity declares no
/// searchable fields.
pub fn search_filter(entity: &EntityType, term: &str) -> Option<FilterNode> {
    if term.is_empty() || entity.searchable_fields().is_empty() {
        return None;
    }

    let leaves = entity
        .searchable_fields()
        .iter()
        .map(|field| FilterNode::leaf(field, term, FilterOperator::Contains))
        .collect();

    Some(FilterNode::or(leaves))
}

fn compile_node(entity: &EntityType, node: &FilterNode, depth: usize) -> EngineResult<SqlPredicate> {
    if depth >= MAX_FILTER_DEPTH {
        return Err(EngineError::FilterTooDeep {
            limit: MAX_FILTER_DEPTH,
        });
    }

    match node {
        FilterNode::Combinator { operator, children } => {
            if children.is_empty() {
                return Err(EngineError::InvalidFilterShape(
                    "combinator requires at least one child filter".to_string(),
                ));
            }

            let mut parts = Vec::with_capacity(children.len());
            let mut binds = Vec::new();
            for child in children {
                let compiled = compile_node(entity, child, depth + 1)?;
                parts.push(compiled.sql);
                binds.extend(compiled.binds);
            }

            Ok(SqlPredicate {
                sql: format!("({})", parts.join(operator.sql_joiner())),
                binds,
            })
        }
        FilterNode::Leaf {
            field,
            value,
            value_type,
            operator,
        } => compile_leaf(entity, field, value.as_deref(), *value_type, *operator),
    }
}

fn compile_leaf(
    entity: &EntityType,
    field: &str,
    raw: Option<&str>,
    value_type: Option<ValueType>,
    operator: FilterOperator,
) -> EngineResult<SqlPredicate> {
    let descriptor = entity.field(field)?;

    let value = match (raw, value_type) {
        (Some(raw), Some(vt)) if !raw.is_empty() => coerce(field, raw, vt)?,
        (Some(raw), _) => CoercedValue::Text(raw.to_string()),
        (None, _) => CoercedValue::Null,
    };

    validate_operator(&value, value_type, operator)?;

    // A null/empty untyped value with eq/neq targets NULL itself: storage
    // needs the distinct is-null predicate form, not an equality to NULL.
    if value.is_null_like()
        && value_type.is_none()
        && matches!(operator, FilterOperator::Eq | FilterOperator::Neq)
    {
        let sql = match operator {
            FilterOperator::Eq => format!("{} IS NULL", field),
            _ => format!("NOT ({} IS NULL)", field),
        };
        return Ok(SqlPredicate { sql, binds: Vec::new() });
    }

    // Structured fields filter a nested key via a colon-delimited value:
    // "key:value" compares json_extract(field, '$.key') against value.
    if descriptor.kind == FieldKind::Json {
        if let CoercedValue::Text(s) = &value {
            let (key, nested) = s.split_once(':').ok_or_else(|| {
                EngineError::InvalidFilterShape(format!(
                    "structured filter on field '{}' must be in the format key:value",
                    field
                ))
            })?;

            let column = format!("json_extract({}, ?)", field);
            let mut predicate =
                operator_sql(&column, operator, CoercedValue::Text(nested.to_string()));
            predicate
                .binds
                .insert(0, SqlValue::Text(format!("$.{}", key)));
            return Ok(predicate);
        }
    }

    Ok(operator_sql(field, operator, value))
}

/// Render one comparison. Negated operators compile to the logical negation
/// of the corresponding positive predicate, keeping the predicate language
/// minimal.
fn operator_sql(column: &str, operator: FilterOperator, value: CoercedValue) -> SqlPredicate {
    let (sql, bind) = match operator {
        FilterOperator::Eq => (format!("{} = ?", column), value.to_sql_value()),
        FilterOperator::Neq => (format!("NOT ({} = ?)", column), value.to_sql_value()),
        FilterOperator::Gt => (format!("{} > ?", column), value.to_sql_value()),
        FilterOperator::Gte => (format!("{} >= ?", column), value.to_sql_value()),
        FilterOperator::Lt => (format!("{} < ?", column), value.to_sql_value()),
        FilterOperator::Lte => (format!("{} <= ?", column), value.to_sql_value()),
        FilterOperator::Contains | FilterOperator::NotContains => {
            let needle = match &value {
                CoercedValue::Text(s) => s.as_str(),
                // The operator validator only admits contains on strings
                _ => unreachable!("contains requires a string value"),
            };
            let pattern = SqlValue::Text(like_pattern(needle));
            let sql = match operator {
                FilterOperator::Contains => format!("{} LIKE ? ESCAPE '\\'", column),
                _ => format!("NOT ({} LIKE ? ESCAPE '\\')", column),
            };
            (sql, pattern)
        }
    };

    SqlPredicate {
        sql,
        binds: vec![bind],
    }
}

/// Build a substring LIKE pattern, escaping the wildcard characters
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::schema::FieldDescriptor;

    fn entity() -> EntityType {
        EntityType::builder("user", "users")
            .field(FieldDescriptor::text("username"))
            .field(FieldDescriptor::text("email").nullable())
            .field(FieldDescriptor::boolean("is_active"))
            .field(FieldDescriptor::integer("score").nullable())
            .field(FieldDescriptor::json("metadata").nullable())
            .searchable(&["username", "email"])
            .build()
    }

    #[test]
    fn leaf_compiles_to_parameterized_comparison() {
        let node = FilterNode::leaf("username", "alice", FilterOperator::Eq);
        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(predicate.sql, "username = ?");
        assert_eq!(predicate.binds, vec![SqlValue::Text("alice".into())]);
    }

    #[test]
    fn neq_compiles_to_negated_positive_predicate() {
        let node = FilterNode::leaf("username", "alice", FilterOperator::Neq);
        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(predicate.sql, "NOT (username = ?)");
    }

    #[test]
    fn contains_escapes_like_wildcards() {
        let node = FilterNode::leaf("username", "50%_a", FilterOperator::Contains);
        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(predicate.sql, "username LIKE ? ESCAPE '\\'");
        assert_eq!(predicate.binds, vec![SqlValue::Text("%50\\%\\_a%".into())]);
    }

    #[test]
    fn null_leaf_compiles_to_is_null_forms() {
        let predicate =
            compile(&entity(), &FilterNode::null_leaf("email", FilterOperator::Eq)).unwrap();
        assert_eq!(predicate.sql, "email IS NULL");
        assert!(predicate.binds.is_empty());

        let predicate =
            compile(&entity(), &FilterNode::null_leaf("email", FilterOperator::Neq)).unwrap();
        assert_eq!(predicate.sql, "NOT (email IS NULL)");
    }

    #[test]
    fn empty_untyped_value_counts_as_null() {
        let node = FilterNode::leaf("email", "", FilterOperator::Eq);
        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(predicate.sql, "email IS NULL");
    }

    #[test]
    fn typed_leaf_binds_coerced_value() {
        let node = FilterNode::typed_leaf("score", "42", ValueType::Int, FilterOperator::Gte);
        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(predicate.sql, "score >= ?");
        assert_eq!(predicate.binds, vec![SqlValue::Integer(42)]);
    }

    #[test]
    fn date_leaf_binds_canonical_timestamp() {
        let node = FilterNode::typed_leaf(
            "created_at",
            "31/12/2023",
            ValueType::Date,
            FilterOperator::Lt,
        );
        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(predicate.sql, "created_at < ?");
        assert_eq!(
            predicate.binds,
            vec![SqlValue::Text("2023-12-31 00:00:00.000000".into())]
        );
    }

    #[test]
    fn combinator_preserves_child_order() {
        let node = FilterNode::or(vec![
            FilterNode::leaf("username", "alice", FilterOperator::Eq),
            FilterNode::and(vec![
                FilterNode::typed_leaf("is_active", "true", ValueType::Boolean, FilterOperator::Eq),
                FilterNode::typed_leaf("score", "10", ValueType::Int, FilterOperator::Gt),
            ]),
        ]);

        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(
            predicate.sql,
            "(username = ? OR (is_active = ? AND score > ?))"
        );
        assert_eq!(
            predicate.binds,
            vec![
                SqlValue::Text("alice".into()),
                SqlValue::Boolean(true),
                SqlValue::Integer(10),
            ]
        );

        // Deterministic: recompiling the same tree yields identical text
        let again = compile(&entity(), &node).unwrap();
        assert_eq!(predicate, again);
    }

    #[test]
    fn empty_combinator_is_rejected() {
        let err = compile(&entity(), &FilterNode::and(Vec::new())).unwrap_err();
        assert_matches!(err, EngineError::InvalidFilterShape(_));
    }

    #[test]
    fn structured_field_filters_nested_key() {
        let node = FilterNode::leaf("metadata", "author:tolkien", FilterOperator::Eq);
        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(predicate.sql, "json_extract(metadata, ?) = ?");
        assert_eq!(
            predicate.binds,
            vec![
                SqlValue::Text("$.author".into()),
                SqlValue::Text("tolkien".into()),
            ]
        );
    }

    #[test]
    fn structured_field_without_colon_is_rejected() {
        let node = FilterNode::leaf("metadata", "tolkien", FilterOperator::Eq);
        let err = compile(&entity(), &node).unwrap_err();
        assert_matches!(err, EngineError::InvalidFilterShape(msg) if msg.contains("metadata"));
    }

    #[test]
    fn unknown_field_is_rejected_with_name() {
        let node = FilterNode::leaf("nickname", "x", FilterOperator::Eq);
        let err = compile(&entity(), &node).unwrap_err();
        assert_matches!(err, EngineError::UnknownField { field, .. } if field == "nickname");
    }

    #[test]
    fn operator_mismatch_surfaces_from_leaves() {
        let node = FilterNode::typed_leaf("is_active", "true", ValueType::Boolean, FilterOperator::Gt);
        let err = compile(&entity(), &node).unwrap_err();
        assert_matches!(err, EngineError::OperatorMismatch { .. });
    }

    #[test]
    fn depth_ceiling_is_enforced() {
        let mut node = FilterNode::leaf("username", "a", FilterOperator::Eq);
        for _ in 0..MAX_FILTER_DEPTH {
            node = FilterNode::and(vec![node]);
        }
        let err = compile(&entity(), &node).unwrap_err();
        assert_matches!(err, EngineError::FilterTooDeep { .. });
    }

    #[test]
    fn search_expands_over_searchable_fields() {
        let node = search_filter(&entity(), "ali").expect("searchable fields declared");
        let predicate = compile(&entity(), &node).unwrap();
        assert_eq!(
            predicate.sql,
            "(username LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\')"
        );

        assert!(search_filter(&entity(), "").is_none());
    }
}

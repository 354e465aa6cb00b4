//! Query builder for entity types
//!
//! Assembles parameterized SELECT/COUNT statements from a compiled predicate,
//! an ORDER BY clause, and an offset/limit window, then executes them against
//! the database. Generated SQL text is deterministic for a given input.

use crate::db::{Database, SqlValue};
use crate::error::EngineResult;
use crate::record::Record;
use crate::schema::EntityType;

use super::page::{Page, PageInfo, PageRequest};
use super::filter::SqlPredicate;

/// A query over one entity type.
///
/// Builds parameterized SQL for SELECT operations with filtering, sorting,
/// and pagination support.
pub struct EntityQuery<'e> {
    entity: &'e EntityType,
    where_clauses: Vec<String>,
    binds: Vec<SqlValue>,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<'e> EntityQuery<'e> {
    /// Create a new query for the entity type.
    pub fn new(entity: &'e EntityType) -> Self {
        Self {
            entity,
            where_clauses: Vec::new(),
            binds: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    /// Add a compiled predicate; multiple predicates combine with AND.
    pub fn filter(mut self, predicate: SqlPredicate) -> Self {
        self.where_clauses.push(predicate.sql);
        self.binds.extend(predicate.binds);
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    /// Add default sorting if no order is specified, for stable results.
    pub fn default_order(mut self) -> Self {
        if self.order_by.is_none() {
            self.order_by = Some(format!("{} ASC", self.entity.default_sort()));
        }
        self
    }

    /// Set limit directly.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set offset directly.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build a SELECT over the projected columns.
    fn select_sql(&self) -> String {
        let columns: Vec<&str> = self
            .entity
            .projected_fields()
            .map(|f| f.name.as_str())
            .collect();
        format!("SELECT {} FROM {}", columns.join(", "), self.entity.table())
    }

    /// Build the SQL query string.
    fn build_sql(&self) -> String {
        let mut sql = self.select_sql();

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(ref order) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            if offset > 0 {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }

        sql
    }

    /// Build a COUNT query string over the same filtered set.
    fn build_count_sql(&self) -> String {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.entity.table());

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        sql
    }

    /// Execute the query and return all matching records.
    pub async fn fetch_all(&self, db: &Database) -> EngineResult<Vec<Record>> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query");

        let mut query = sqlx::query(&sql);
        for value in &self.binds {
            query = value.bind_to_query(query);
        }

        let rows = query.fetch_all(db.pool()).await?;
        rows.iter().map(|row| Record::from_row(self.entity, row)).collect()
    }

    /// Execute the query and return the first record, if any.
    pub async fn fetch_optional(&self, db: &Database) -> EngineResult<Option<Record>> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query (one)");

        let mut query = sqlx::query(&sql);
        for value in &self.binds {
            query = value.bind_to_query(query);
        }

        match query.fetch_optional(db.pool()).await? {
            Some(row) => Ok(Some(Record::from_row(self.entity, &row)?)),
            None => Ok(None),
        }
    }

    /// Execute a COUNT over the filtered, pre-window set.
    pub async fn count(&self, db: &Database) -> EngineResult<i64> {
        let sql = self.build_count_sql();
        tracing::debug!(sql = %sql, "Executing count query");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &self.binds {
            query = value.bind_to_scalar(query);
        }

        Ok(query.fetch_one(db.pool()).await?)
    }

    /// Execute the query as one page: count the filtered set, fetch the
    /// window, and compute page metadata.
    pub async fn fetch_page(mut self, db: &Database, request: PageRequest) -> EngineResult<Page<Record>> {
        request.validate()?;

        let total_count = self.count(db).await?;

        self.limit = Some(request.page_size);
        self.offset = Some(request.offset());
        let items = self.fetch_all(db).await?;

        Ok(Page {
            items,
            page_info: PageInfo::compute(total_count, request),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::{FilterNode, compile};
    use crate::query::operator::FilterOperator;
    use crate::schema::FieldDescriptor;

    fn entity() -> EntityType {
        EntityType::builder("user", "users")
            .field(FieldDescriptor::text("username"))
            .field(FieldDescriptor::integer("score").nullable())
            .build()
    }

    #[test]
    fn sql_text_is_deterministic() {
        let entity = entity();
        let build = || {
            let predicate =
                compile(&entity, &FilterNode::leaf("username", "a", FilterOperator::Eq)).unwrap();
            EntityQuery::new(&entity)
                .filter(predicate)
                .default_order()
                .limit(5)
                .build_sql()
        };
        assert_eq!(build(), build());
        assert_eq!(
            build(),
            "SELECT id, username, score, created_at, updated_at FROM users \
             WHERE username = ? ORDER BY id ASC LIMIT 5"
        );
    }

    #[test]
    fn count_sql_drops_order_and_window() {
        let entity = entity();
        let predicate =
            compile(&entity, &FilterNode::leaf("username", "a", FilterOperator::Eq)).unwrap();
        let query = EntityQuery::new(&entity)
            .filter(predicate)
            .default_order()
            .limit(5)
            .offset(10);
        assert_eq!(
            query.build_count_sql(),
            "SELECT COUNT(*) FROM users WHERE username = ?"
        );
    }

    #[test]
    fn explicit_order_wins_over_default() {
        let entity = entity();
        let sql = EntityQuery::new(&entity)
            .order_by("score DESC")
            .default_order()
            .build_sql();
        assert!(sql.ends_with("ORDER BY score DESC"));
    }

    #[test]
    fn zero_offset_is_omitted() {
        let entity = entity();
        let sql = EntityQuery::new(&entity).limit(10).offset(0).build_sql();
        assert!(!sql.contains("OFFSET"));
    }
}

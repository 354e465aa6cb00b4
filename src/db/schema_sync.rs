//! Schema synchronization from entity definitions
//!
//! Materializes registry entity types as tables:
//! - Creates missing tables from entity descriptors
//! - Adds missing columns to existing tables
//! - Does NOT handle column renames or type changes
//!
//! Migration tooling proper belongs to the embedding application; this keeps
//! tests and embedders able to bootstrap a database from the registry alone.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::schema::SchemaRegistry;

/// Result of a schema sync operation
#[derive(Debug, Default)]
pub struct SchemaSyncResult {
    pub tables_created: Vec<String>,
    pub columns_added: Vec<(String, String)>, // (table, column)
}

/// Check if a table exists in the database
async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool, sqlx::Error> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

/// Get existing columns for a table
async fn get_table_columns(
    pool: &SqlitePool,
    table_name: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(i32, String, String, i32, Option<String>, i32)> =
        sqlx::query_as(&format!("PRAGMA table_info({})", table_name))
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(_, name, _, _, _, _)| name).collect())
}

/// Create or extend every registered entity's table
pub async fn ensure_tables(
    pool: &SqlitePool,
    registry: &SchemaRegistry,
) -> Result<SchemaSyncResult, sqlx::Error> {
    let mut result = SchemaSyncResult::default();

    for entity in registry.entities() {
        if !table_exists(pool, entity.table()).await? {
            let sql = entity.create_table_sql();
            debug!(sql = %sql, "Creating table");
            sqlx::query(&sql).execute(pool).await?;
            result.tables_created.push(entity.table().to_string());
            continue;
        }

        let existing = get_table_columns(pool, entity.table()).await?;
        for field in entity.fields() {
            if existing.contains(&field.name) {
                continue;
            }
            // ALTER TABLE ADD COLUMN cannot add NOT NULL without a default;
            // added columns are nullable and backfilled by the embedder.
            let sql = format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                entity.table(),
                field.name,
                field.kind.sql_type()
            );
            debug!(sql = %sql, "Adding column");
            sqlx::query(&sql).execute(pool).await?;
            result
                .columns_added
                .push((entity.table().to_string(), field.name.clone()));
        }
    }

    if !result.tables_created.is_empty() || !result.columns_added.is_empty() {
        info!(
            tables = result.tables_created.len(),
            columns = result.columns_added.len(),
            "Schema sync applied"
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::schema::{EntityType, FieldDescriptor};

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register(
            EntityType::builder("note", "notes")
                .field(FieldDescriptor::text("title"))
                .field(FieldDescriptor::text("body").nullable())
                .build(),
        );
        registry
    }

    #[tokio::test]
    async fn creates_missing_tables() {
        let db = Database::connect_in_memory().await.unwrap();
        let registry = registry();

        let result = ensure_tables(db.pool(), &registry).await.unwrap();
        assert_eq!(result.tables_created, vec!["notes".to_string()]);

        // Second run is a no-op
        let result = ensure_tables(db.pool(), &registry).await.unwrap();
        assert!(result.tables_created.is_empty());
        assert!(result.columns_added.is_empty());
    }

    #[tokio::test]
    async fn adds_missing_columns() {
        let db = Database::connect_in_memory().await.unwrap();
        sqlx::query("CREATE TABLE notes (id TEXT PRIMARY KEY, title TEXT NOT NULL)")
            .execute(db.pool())
            .await
            .unwrap();

        let result = ensure_tables(db.pool(), &registry()).await.unwrap();
        let added: Vec<&str> = result.columns_added.iter().map(|(_, c)| c.as_str()).collect();
        assert!(added.contains(&"body"));
        assert!(added.contains(&"created_at"));
    }
}

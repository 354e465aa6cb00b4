//! Generic mutation pipeline
//!
//! Request lifecycle: Received → Validating → {Valid → Applying → Applied |
//! Invalid → Rejected}. Field-level validation failures are data, not errors:
//! they return in [MutationResult::errors] so the caller can render them next
//! to form fields. `NotFound` and storage failures are real errors.
//!
//! A single create/update/delete is atomic at the storage layer; the pipeline
//! performs no multi-statement transactions or optimistic-concurrency checks,
//! so a racing update/delete can surface as `NotFound` or a lost update.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::db::{Database, SqlValue, execute_with_binds};
use crate::error::{EngineError, EngineResult};
use crate::query::value::format_timestamp;
use crate::query::{EntityQuery, FilterNode, FilterOperator, compile};
use crate::record::Record;
use crate::schema::{EntityType, IDENTIFIER_FIELD};

use super::input::InputSchema;
use super::validate::{FieldError, validate};

/// Outcome of a create or update mutation
#[derive(Debug, Clone)]
pub struct MutationResult {
    /// Accumulated field-level validation errors; empty when applied
    pub errors: Vec<FieldError>,
    /// The resulting record projection when applied; on an invalid update,
    /// the current unmodified record for redisplay
    pub record: Option<Record>,
}

impl MutationResult {
    /// Whether the mutation was applied
    pub fn is_applied(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of a delete mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    pub id: String,
    pub message: String,
}

/// Validates and applies mutations for one entity type
pub struct MutationPipeline<'a> {
    db: &'a Database,
    entity: &'a EntityType,
}

impl<'a> MutationPipeline<'a> {
    pub fn new(db: &'a Database, entity: &'a EntityType) -> Self {
        Self { db, entity }
    }

    /// Create a new record from the submitted fields.
    pub async fn create(
        &self,
        submitted: &serde_json::Map<String, Value>,
    ) -> EngineResult<MutationResult> {
        let schema = InputSchema::derive(self.entity, &[], true);
        let (mut values, errors) = validate(&schema, submitted);
        if !errors.is_empty() {
            return Ok(MutationResult {
                errors,
                record: None,
            });
        }

        self.apply_transforms(&mut values)?;

        let id = Uuid::new_v4().to_string();
        let now = format_timestamp(Utc::now().naive_utc());

        let mut columns = vec![IDENTIFIER_FIELD.to_string()];
        let mut binds = vec![SqlValue::Text(id.clone())];
        for (name, value) in values {
            columns.push(name);
            binds.push(value);
        }
        columns.push("created_at".to_string());
        binds.push(SqlValue::Text(now.clone()));
        columns.push("updated_at".to_string());
        binds.push(SqlValue::Text(now));

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.entity.table(),
            columns.join(", "),
            placeholders
        );
        execute_with_binds(&sql, &binds, self.db.pool()).await?;

        let record = self.load_required(&id).await?;
        Ok(MutationResult {
            errors: Vec::new(),
            record: Some(record),
        })
    }

    /// Apply a partial update to the record with the given id.
    ///
    /// Only submitted fields change; everything else is left untouched. On
    /// validation failure the current record is returned alongside the
    /// errors so the caller can redisplay it.
    pub async fn update(
        &self,
        id: &str,
        submitted: &serde_json::Map<String, Value>,
    ) -> EngineResult<MutationResult> {
        let schema = InputSchema::derive(self.entity, &[], false);

        let mut with_id = submitted.clone();
        with_id.insert(
            IDENTIFIER_FIELD.to_string(),
            Value::String(id.to_string()),
        );

        let (values, errors) = validate(&schema, &with_id);
        if !errors.is_empty() {
            let record = self.load_required(id).await?;
            return Ok(MutationResult {
                errors,
                record: Some(record),
            });
        }

        // Load-before-write doubles as the NotFound check.
        self.load_required(id).await?;

        let mut values: Vec<(String, SqlValue)> = values
            .into_iter()
            .filter(|(name, _)| name != IDENTIFIER_FIELD)
            .collect();
        self.apply_transforms(&mut values)?;

        let now = format_timestamp(Utc::now().naive_utc());
        let mut assignments: Vec<String> = values
            .iter()
            .map(|(name, _)| format!("{} = ?", name))
            .collect();
        assignments.push("updated_at = ?".to_string());

        let mut binds: Vec<SqlValue> = values.into_iter().map(|(_, value)| value).collect();
        binds.push(SqlValue::Text(now));
        binds.push(SqlValue::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.entity.table(),
            assignments.join(", "),
            IDENTIFIER_FIELD
        );
        execute_with_binds(&sql, &binds, self.db.pool()).await?;

        let record = self.load_required(id).await?;
        Ok(MutationResult {
            errors: Vec::new(),
            record: Some(record),
        })
    }

    /// Delete the record with the given id.
    ///
    /// No soft-delete; cascade behavior is whatever the storage layer
    /// enforces.
    pub async fn delete(&self, id: &str) -> EngineResult<DeleteResult> {
        self.load_required(id).await?;

        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            self.entity.table(),
            IDENTIFIER_FIELD
        );
        execute_with_binds(&sql, &[SqlValue::Text(id.to_string())], self.db.pool()).await?;

        Ok(DeleteResult {
            id: id.to_string(),
            message: format!("{} deleted", self.entity.name()),
        })
    }

    /// Run registered write transforms over the accepted values.
    fn apply_transforms(&self, values: &mut [(String, SqlValue)]) -> EngineResult<()> {
        for (name, value) in values.iter_mut() {
            if let SqlValue::Text(raw) = value {
                if let Some(stored) = self.entity.transform_before_persist(name, raw)? {
                    *value = SqlValue::Text(stored);
                }
            }
        }
        Ok(())
    }

    /// Load a record by id, failing with `NotFound` when absent.
    async fn load_required(&self, id: &str) -> EngineResult<Record> {
        let predicate = compile(
            self.entity,
            &FilterNode::leaf(IDENTIFIER_FIELD, id, FilterOperator::Eq),
        )?;

        EntityQuery::new(self.entity)
            .filter(predicate)
            .fetch_optional(self.db)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: self.entity.name().to_string(),
                id: id.to_string(),
            })
    }
}

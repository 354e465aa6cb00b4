//! Uniform entity service
//!
//! The entry points a transport layer calls. Every operation resolves the
//! entity type from the registry and runs the authentication check before
//! touching the query or mutation machinery. One logical operation per
//! request; no state is retained between requests.

use std::sync::Arc;

use serde_json::Value;

use crate::auth::{RequestContext, check_auth};
use crate::db::Database;
use crate::error::{EngineError, EngineResult};
use crate::mutation::{DeleteResult, MutationPipeline, MutationResult};
use crate::query::{
    EntityQuery, FilterNode, FilterOperator, Page, PageRequest, SortKey, compile, compile_sort,
    search_filter,
};
use crate::record::Record;
use crate::schema::{EntityType, IDENTIFIER_FIELD, SchemaRegistry};

/// A structured query over one entity type
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// Free-text shorthand, expanded over the entity's searchable fields
    pub search: Option<String>,
    /// Client filter tree
    pub filter: Option<FilterNode>,
    /// Sort keys in tie-break precedence order
    pub sort: Vec<SortKey>,
    /// Page window
    pub page: PageRequest,
}

/// Query and mutation facade over registered entity types
#[derive(Clone)]
pub struct EntityService {
    db: Database,
    registry: Arc<SchemaRegistry>,
}

impl EntityService {
    pub fn new(db: Database, registry: Arc<SchemaRegistry>) -> Self {
        Self { db, registry }
    }

    /// The schema registry backing this service
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The underlying database handle
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Run a filtered, sorted, paginated query.
    pub async fn query(
        &self,
        ctx: &RequestContext,
        entity_name: &str,
        request: QueryRequest,
    ) -> EngineResult<Page<Record>> {
        check_auth(ctx)?;
        let entity = self.registry.entity(entity_name)?;

        let mut query = EntityQuery::new(entity);

        if let Some(term) = request.search.as_deref() {
            if let Some(node) = search_filter(entity, term) {
                query = query.filter(compile(entity, &node)?);
            }
        }

        if let Some(node) = &request.filter {
            query = query.filter(compile(entity, node)?);
        }

        if let Some(clause) = compile_sort(entity, &request.sort)? {
            query = query.order_by(clause);
        }

        query
            .default_order()
            .fetch_page(&self.db, request.page)
            .await
    }

    /// Load a single record by id.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        entity_name: &str,
        id: &str,
    ) -> EngineResult<Record> {
        check_auth(ctx)?;
        let entity = self.registry.entity(entity_name)?;
        self.find_required(entity, IDENTIFIER_FIELD, id).await
    }

    /// Load a single record by a unique field value.
    pub async fn find_by(
        &self,
        ctx: &RequestContext,
        entity_name: &str,
        field: &str,
        value: &str,
    ) -> EngineResult<Record> {
        check_auth(ctx)?;
        let entity = self.registry.entity(entity_name)?;
        self.find_required(entity, field, value).await
    }

    /// Create a record from a field mapping.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        entity_name: &str,
        fields: &serde_json::Map<String, Value>,
    ) -> EngineResult<MutationResult> {
        check_auth(ctx)?;
        let entity = self.registry.entity(entity_name)?;
        MutationPipeline::new(&self.db, entity).create(fields).await
    }

    /// Apply a partial update to the record with the given id.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        entity_name: &str,
        id: &str,
        fields: &serde_json::Map<String, Value>,
    ) -> EngineResult<MutationResult> {
        check_auth(ctx)?;
        let entity = self.registry.entity(entity_name)?;
        MutationPipeline::new(&self.db, entity)
            .update(id, fields)
            .await
    }

    /// Delete the record with the given id.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        entity_name: &str,
        id: &str,
    ) -> EngineResult<DeleteResult> {
        check_auth(ctx)?;
        let entity = self.registry.entity(entity_name)?;
        MutationPipeline::new(&self.db, entity).delete(id).await
    }

    async fn find_required(
        &self,
        entity: &EntityType,
        field: &str,
        value: &str,
    ) -> EngineResult<Record> {
        let predicate = compile(
            entity,
            &FilterNode::leaf(field, value, FilterOperator::Eq),
        )?;

        EntityQuery::new(entity)
            .filter(predicate)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: entity.name().to_string(),
                id: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::schema::FieldDescriptor;

    fn registry() -> Arc<SchemaRegistry> {
        let mut registry = SchemaRegistry::new();
        registry.register(
            crate::schema::EntityType::builder("note", "notes")
                .field(FieldDescriptor::text("title"))
                .build(),
        );
        Arc::new(registry)
    }

    #[tokio::test]
    async fn anonymous_requests_are_rejected_before_compilation() {
        let db = Database::connect_in_memory().await.unwrap();
        let service = EntityService::new(db, registry());

        // Entity name is bogus too: the auth rejection must win.
        let err = service
            .query(&RequestContext::anonymous(), "ghost", QueryRequest::default())
            .await
            .unwrap_err();
        assert_matches!(err, EngineError::Unauthenticated);
    }

    #[tokio::test]
    async fn unknown_entity_is_rejected_for_authenticated_requests() {
        let db = Database::connect_in_memory().await.unwrap();
        let service = EntityService::new(db, registry());
        let ctx = RequestContext::authenticated(crate::auth::Identity::new("u1"));

        let err = service
            .query(&ctx, "ghost", QueryRequest::default())
            .await
            .unwrap_err();
        assert_matches!(err, EngineError::UnknownEntity(name) if name == "ghost");
    }
}

//! archivist — generic entity query and mutation engine over SQLite
//!
//! Clients register entity types (named, typed fields) in a startup
//! [SchemaRegistry](schema::SchemaRegistry), then query and mutate any of
//! them through one uniform surface: structured filter trees, sort
//! specifications, and pagination on the read side; validated partial
//! creates/updates/deletes on the write side. No per-entity query or
//! mutation code.
//!
//! Transport, token issuance, file storage, and migrations are external
//! collaborators; the engine consumes an already-resolved identity on a
//! [RequestContext](auth::RequestContext) and talks to storage through
//! parameterized SQL only.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use archivist::auth::{Identity, RequestContext};
//! use archivist::db::Database;
//! use archivist::query::{FilterNode, FilterOperator, PageRequest, ValueType};
//! use archivist::schema::{EntityType, FieldDescriptor, SchemaRegistry};
//! use archivist::service::{EntityService, QueryRequest};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut registry = SchemaRegistry::new();
//! registry.register(
//!     EntityType::builder("user", "users")
//!         .field(FieldDescriptor::text("username"))
//!         .field(FieldDescriptor::boolean("is_active"))
//!         .searchable(&["username"])
//!         .build(),
//! );
//! let registry = Arc::new(registry);
//!
//! let db = Database::connect("sqlite://./data/archivist.db").await?;
//! let service = EntityService::new(db, registry);
//!
//! let ctx = RequestContext::authenticated(Identity::new("session_subject"));
//! let page = service
//!     .query(
//!         &ctx,
//!         "user",
//!         QueryRequest {
//!             filter: Some(FilterNode::typed_leaf(
//!                 "is_active",
//!                 "true",
//!                 ValueType::Boolean,
//!                 FilterOperator::Eq,
//!             )),
//!             page: PageRequest::new(25, 1),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! println!("{} active users", page.page_info.total_count);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mutation;
pub mod query;
pub mod record;
pub mod schema;
pub mod service;

pub use error::{EngineError, EngineResult};

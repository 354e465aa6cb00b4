//! Entity schemas: field descriptors, entity types, and the startup registry
//!
//! Entity types are declared explicitly at process start and are immutable
//! afterwards. The registry is the closed enumeration behind every filter,
//! sort, and mutation-input validation — an unrecognized field or entity name
//! fails instead of silently resolving to null.

mod entity;
mod field;
mod registry;

pub use entity::{EntityType, EntityTypeBuilder, IDENTIFIER_FIELD, TransformFn};
pub use field::{FieldDescriptor, FieldKind, ScalarKind};
pub use registry::SchemaRegistry;

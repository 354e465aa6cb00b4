//! Entity type definitions
//!
//! An [EntityType] is the per-entity schema the engine introspects: an
//! ordered field set, the backing table name, the searchable field names for
//! the free-text shorthand, and an optional write-transform hook applied to
//! designated fields before persistence (credential hashing lives behind this
//! hook, not in the mutation pipeline).

use std::fmt;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};

use super::field::{FieldDescriptor, FieldKind, ScalarKind};

/// Transform applied to a field's raw value before persistence.
///
/// Receives `(field_name, raw_value)` and returns the stored value. The raw
/// value is never persisted or echoed once a transform is registered for the
/// field.
pub type TransformFn = dyn Fn(&str, &str) -> EngineResult<String> + Send + Sync;

/// The primary key column present on every entity type
pub const IDENTIFIER_FIELD: &str = "id";

/// A named entity schema with an ordered set of field descriptors.
///
/// Immutable once built; construct with [EntityType::builder] at process
/// start. Every instance carries the machine-managed `id`, `created_at` and
/// `updated_at` columns in addition to the declared fields.
#[derive(Clone)]
pub struct EntityType {
    name: String,
    table: String,
    fields: Vec<FieldDescriptor>,
    searchable: Vec<String>,
    transform_fields: Vec<String>,
    transform: Option<Arc<TransformFn>>,
    default_sort: String,
}

impl EntityType {
    /// Start building an entity type with the given name and table
    pub fn builder(name: impl Into<String>, table: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder {
            name: name.into(),
            table: table.into(),
            fields: Vec::new(),
            searchable: Vec::new(),
            transform_fields: Vec::new(),
            transform: None,
            default_sort: IDENTIFIER_FIELD.to_string(),
        }
    }

    /// Entity name as registered (e.g. "user")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing table name (e.g. "users")
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The ordered field set, stable for the process lifetime
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Resolve a field by name; unknown names fail, never resolve to null
    pub fn field(&self, name: &str) -> EngineResult<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| EngineError::UnknownField {
                entity: self.name.clone(),
                field: name.to_string(),
            })
    }

    /// Fields included in projections: everything except transformed fields
    pub fn projected_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| !self.is_transformed(&f.name))
    }

    /// Field names the free-text search shorthand expands over
    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable
    }

    /// Default sort field for deterministic results when no sort is given
    pub fn default_sort(&self) -> &str {
        &self.default_sort
    }

    /// Whether a write transform is registered for this field
    pub fn is_transformed(&self, field: &str) -> bool {
        self.transform_fields.iter().any(|f| f == field)
    }

    /// Apply the registered write transform, if any covers this field.
    ///
    /// Returns `Ok(None)` when the field has no transform.
    pub fn transform_before_persist(
        &self,
        field: &str,
        value: &str,
    ) -> EngineResult<Option<String>> {
        match (&self.transform, self.is_transformed(field)) {
            (Some(transform), true) => transform(field, value).map(Some),
            _ => Ok(None),
        }
    }

    /// Generate CREATE TABLE IF NOT EXISTS SQL for this entity
    pub fn create_table_sql(&self) -> String {
        let column_defs: Vec<String> = self
            .fields
            .iter()
            .map(|f| {
                if f.name == IDENTIFIER_FIELD {
                    format!("{} TEXT PRIMARY KEY", f.name)
                } else {
                    f.column_sql()
                }
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            self.table,
            column_defs.join(",\n  ")
        )
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("fields", &self.fields)
            .field("searchable", &self.searchable)
            .field("transform_fields", &self.transform_fields)
            .finish_non_exhaustive()
    }
}

/// Builder for [EntityType]
pub struct EntityTypeBuilder {
    name: String,
    table: String,
    fields: Vec<FieldDescriptor>,
    searchable: Vec<String>,
    transform_fields: Vec<String>,
    transform: Option<Arc<TransformFn>>,
    default_sort: String,
}

impl EntityTypeBuilder {
    /// Add a field descriptor
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Mark fields as targets of the free-text search shorthand
    pub fn searchable(mut self, fields: &[&str]) -> Self {
        self.searchable = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Register a write transform for the named fields
    pub fn transform(mut self, fields: &[&str], transform: Arc<TransformFn>) -> Self {
        self.transform_fields = fields.iter().map(|f| f.to_string()).collect();
        self.transform = Some(transform);
        self
    }

    /// Override the default sort field (defaults to the identifier)
    pub fn default_sort(mut self, field: impl Into<String>) -> Self {
        self.default_sort = field.into();
        self
    }

    /// Finish building.
    ///
    /// Prepends the identifier column and appends the machine-managed
    /// timestamp columns.
    ///
    /// # Panics
    ///
    /// Panics if a field name repeats within the entity — a startup
    /// misconfiguration, not a runtime condition.
    pub fn build(self) -> EntityType {
        let mut fields = Vec::with_capacity(self.fields.len() + 3);
        fields.push(FieldDescriptor::text(IDENTIFIER_FIELD));
        fields.extend(self.fields);
        fields.push(FieldDescriptor {
            name: "created_at".to_string(),
            kind: FieldKind::Scalar(ScalarKind::Timestamp),
            nullable: false,
            required_on_create: false,
        });
        fields.push(FieldDescriptor {
            name: "updated_at".to_string(),
            kind: FieldKind::Scalar(ScalarKind::Timestamp),
            nullable: false,
            required_on_create: false,
        });

        for (i, field) in fields.iter().enumerate() {
            assert!(
                !fields[..i].iter().any(|f| f.name == field.name),
                "duplicate field '{}' on entity '{}'",
                field.name,
                self.name
            );
        }

        EntityType {
            name: self.name,
            table: self.table,
            fields,
            searchable: self.searchable,
            transform_fields: self.transform_fields,
            transform: self.transform,
            default_sort: self.default_sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entity() -> EntityType {
        EntityType::builder("user", "users")
            .field(FieldDescriptor::text("username"))
            .field(FieldDescriptor::text("email").nullable())
            .field(FieldDescriptor::boolean("is_active"))
            .build()
    }

    #[test]
    fn fields_are_ordered_and_stable() {
        let entity = sample_entity();
        let names: Vec<&str> = entity.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "username", "email", "is_active", "created_at", "updated_at"]
        );

        // Same order on every call
        let again: Vec<&str> = entity.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn unknown_field_fails_with_submitted_name() {
        let entity = sample_entity();
        let err = entity.field("nickname").unwrap_err();
        assert!(err.to_string().contains("nickname"));
    }

    #[test]
    fn transform_applies_only_to_registered_fields() {
        let entity = EntityType::builder("user", "users")
            .field(FieldDescriptor::text("username"))
            .field(FieldDescriptor::text("password"))
            .transform(&["password"], Arc::new(|_, v| Ok(format!("hashed:{v}"))))
            .build();

        assert_eq!(
            entity.transform_before_persist("password", "secret").unwrap(),
            Some("hashed:secret".to_string())
        );
        assert_eq!(
            entity.transform_before_persist("username", "alice").unwrap(),
            None
        );
    }

    #[test]
    fn projection_excludes_transformed_fields() {
        let entity = EntityType::builder("user", "users")
            .field(FieldDescriptor::text("username"))
            .field(FieldDescriptor::text("password"))
            .transform(&["password"], Arc::new(|_, v| Ok(v.to_string())))
            .build();

        let projected: Vec<&str> = entity
            .projected_fields()
            .map(|f| f.name.as_str())
            .collect();
        assert!(!projected.contains(&"password"));
        assert!(projected.contains(&"username"));
    }

    #[test]
    fn create_table_sql_renders_columns_in_order() {
        let entity = sample_entity();
        let sql = entity.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS users"));
        assert!(sql.contains("id TEXT PRIMARY KEY"));
        assert!(sql.contains("email TEXT,"));
        assert!(sql.contains("is_active INTEGER NOT NULL"));
    }

    #[test]
    #[should_panic(expected = "duplicate field")]
    fn duplicate_field_names_panic_at_build() {
        EntityType::builder("user", "users")
            .field(FieldDescriptor::text("username"))
            .field(FieldDescriptor::integer("username"))
            .build();
    }
}

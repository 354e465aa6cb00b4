//! Input schema derivation
//!
//! Derives the set of acceptable mutation-input fields from an entity type:
//! everything except excluded fields and the machine-managed timestamp
//! columns, minus the identifier on the create path. On the update path only
//! the identifier is required and every other field becomes optional, which
//! is what makes partial updates work.

use crate::schema::{EntityType, FieldKind, IDENTIFIER_FIELD};

/// Columns stamped by the pipeline, never accepted as input
pub const MACHINE_MANAGED_FIELDS: &[&str] = &["created_at", "updated_at"];

/// One acceptable input field
#[derive(Debug, Clone)]
pub struct InputField {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
    pub required: bool,
}

/// The derived input contract for one mutation request
#[derive(Debug, Clone)]
pub struct InputSchema {
    fields: Vec<InputField>,
    is_create: bool,
}

impl InputSchema {
    /// Derive the input schema for an entity type.
    ///
    /// `excluded` names fields the caller wants withheld from this mutation
    /// surface beyond the automatic exclusions.
    pub fn derive(entity: &EntityType, excluded: &[&str], is_create: bool) -> Self {
        let fields = entity
            .fields()
            .iter()
            .filter(|f| !MACHINE_MANAGED_FIELDS.contains(&f.name.as_str()))
            .filter(|f| !excluded.contains(&f.name.as_str()))
            .filter(|f| !(is_create && f.name == IDENTIFIER_FIELD))
            .map(|f| InputField {
                name: f.name.clone(),
                kind: f.kind.clone(),
                nullable: f.nullable,
                required: if is_create {
                    f.required_on_create
                } else {
                    f.name == IDENTIFIER_FIELD
                },
            })
            .collect();

        Self { fields, is_create }
    }

    /// The acceptable fields, in entity order
    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    /// Look up an input field by name
    pub fn field(&self, name: &str) -> Option<&InputField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether this schema was derived for the create path
    pub fn is_create(&self) -> bool {
        self.is_create
    }
}

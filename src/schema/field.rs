//! Field descriptors for entity schemas

/// Scalar column kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// UTF-8 text
    Text,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Real,
    /// Boolean, stored as 0/1
    Boolean,
    /// Canonical timestamp text (fractional seconds, UTC)
    Timestamp,
}

/// The kind of value a field holds.
///
/// Determines the legal filter operators, the legal leaf shapes, the SQLite
/// column type, and how mutation input is coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// To-one relation, stored as the related record's id
    BelongsTo { target: String },
    /// To-many relation, stored as a JSON array of related ids
    HasMany { target: String },
    /// Structured JSON document, filterable by nested key
    Json,
}

impl FieldKind {
    /// Kind name used in validation messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Scalar(ScalarKind::Text) => "text",
            FieldKind::Scalar(ScalarKind::Integer) => "integer",
            FieldKind::Scalar(ScalarKind::Real) => "real",
            FieldKind::Scalar(ScalarKind::Boolean) => "boolean",
            FieldKind::Scalar(ScalarKind::Timestamp) => "timestamp",
            FieldKind::BelongsTo { .. } => "relation",
            FieldKind::HasMany { .. } => "relation list",
            FieldKind::Json => "json",
        }
    }

    /// SQLite column type for this kind
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldKind::Scalar(ScalarKind::Integer) | FieldKind::Scalar(ScalarKind::Boolean) => {
                "INTEGER"
            }
            FieldKind::Scalar(ScalarKind::Real) => "REAL",
            _ => "TEXT",
        }
    }
}

/// A single named, typed field on an entity type.
///
/// Names are unique within an entity type; the kind determines legal
/// operators and legal filter leaf shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Whether a create mutation must supply this field
    pub required_on_create: bool,
}

impl FieldDescriptor {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            required_on_create: true,
        }
    }

    /// A required text field
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Text))
    }

    /// A required integer field
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Integer))
    }

    /// A required floating-point field
    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Real))
    }

    /// A required boolean field
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Boolean))
    }

    /// A required timestamp field
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Timestamp))
    }

    /// A required to-one relation field
    pub fn belongs_to(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::BelongsTo {
                target: target.into(),
            },
        )
    }

    /// A required to-many relation field
    pub fn has_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::HasMany {
                target: target.into(),
            },
        )
    }

    /// A required structured JSON field
    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Json)
    }

    /// Make the column NULL-able and optional on create
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self.required_on_create = false;
        self
    }

    /// Keep the column NOT NULL but let create mutations omit it
    pub fn optional_on_create(mut self) -> Self {
        self.required_on_create = false;
        self
    }

    /// Generate the column definition SQL
    pub fn column_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.kind.sql_type());
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

//! Startup registry of entity types
//!
//! Built once at process start from static declarations; no runtime type
//! synthesis. Resolving an unregistered entity name is a client-input error.

use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};

use super::entity::EntityType;

/// Immutable-after-startup mapping of entity name to entity type
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entities: BTreeMap<String, EntityType>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type, replacing any previous entry with the name
    pub fn register(&mut self, entity: EntityType) -> &mut Self {
        self.entities.insert(entity.name().to_string(), entity);
        self
    }

    /// Resolve an entity type by name
    pub fn entity(&self, name: &str) -> EngineResult<&EntityType> {
        self.entities
            .get(name)
            .ok_or_else(|| EngineError::UnknownEntity(name.to_string()))
    }

    /// Iterate over all registered entity types
    pub fn entities(&self) -> impl Iterator<Item = &EntityType> {
        self.entities.values()
    }

    /// Number of registered entity types
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    #[test]
    fn resolves_registered_entities() {
        let mut registry = SchemaRegistry::new();
        registry.register(
            EntityType::builder("user", "users")
                .field(FieldDescriptor::text("username"))
                .build(),
        );

        assert!(registry.entity("user").is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_entity_fails() {
        let registry = SchemaRegistry::new();
        let err = registry.entity("ghost").unwrap_err();
        assert!(matches!(err, EngineError::UnknownEntity(name) if name == "ghost"));
    }
}

//! Type registry: type-name token to concrete type constructor.
//!
//! A [`RegistryBuilder`] collects schemas and is consumed by
//! [`RegistryBuilder::build`]; the resulting [`TypeRegistry`] is immutable
//! and can be shared across threads behind an `Arc`.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::RegistryError;
use crate::model::{Entity, Kind, TypeSchema};

/// A registered type: its schema, from which entities are constructed.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    schema: Arc<TypeSchema>,
}

impl TypeEntry {
    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn capabilities(&self) -> &[Kind] {
        self.schema.capabilities()
    }

    /// Constructs an empty entity of this type.
    pub fn instantiate(&self) -> Entity {
        Entity::new(Arc::clone(&self.schema))
    }
}

/// Collects type schemas before freezing them into a [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: FxHashMap<String, TypeEntry>,
    order: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its name.
    pub fn register(&mut self, schema: TypeSchema) -> Result<&mut Self, RegistryError> {
        self.register_shared(Arc::new(schema))
    }

    /// Registers an already shared schema under its name.
    pub fn register_shared(&mut self, schema: Arc<TypeSchema>) -> Result<&mut Self, RegistryError> {
        let name = schema.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateType { name });
        }
        self.order.push(name.clone());
        self.entries.insert(name, TypeEntry { schema });
        Ok(self)
    }

    /// Freezes the registry.
    pub fn build(self) -> TypeRegistry {
        debug!(types = self.entries.len(), "type registry built");
        TypeRegistry {
            entries: self.entries,
            order: self.order,
        }
    }
}

/// Immutable mapping from type token to registered type.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: FxHashMap<String, TypeEntry>,
    order: Vec<String>,
}

impl TypeRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, token: &str) -> Option<&TypeEntry> {
        self.entries.get(token)
    }

    /// Returns the entry for `token` only if it is capable of `kind`.
    pub fn lookup(&self, token: &str, kind: Kind) -> Option<&TypeEntry> {
        self.entries
            .get(token)
            .filter(|entry| entry.schema.is_capable(kind))
    }

    pub fn schema(&self, token: &str) -> Option<Arc<TypeSchema>> {
        self.entries.get(token).map(|entry| Arc::clone(&entry.schema))
    }

    /// Constructs an empty entity for `token`, if registered.
    pub fn instantiate(&self, token: &str) -> Option<Entity> {
        self.entries.get(token).map(TypeEntry::instantiate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tokens in registration order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

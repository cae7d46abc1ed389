//! Builder API for declaring type schemas and constructing entities.
//!
//! # Example
//!
//! ```rust
//! use activity_ld::model::{Kind, TypeSchema};
//!
//! let poll = TypeSchema::builder("Poll")
//!     .capability(Kind::Object)
//!     .functional("id", vec![Kind::Iri])
//!     .non_functional("choice", vec![Kind::Object, Kind::Link, Kind::Iri])
//!     .language_mapped("title", vec![Kind::String, Kind::LangString])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(poll.name(), "Poll");
//! assert!(poll.property("titleMap").is_none());
//! assert_eq!(poll.index_of_map_key("titleMap"), poll.index_of("title"));
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{PropertyError, RegistryError};
use crate::limits::{CONTEXT_KEY, TYPE_KEY};
use crate::model::{Entity, Kind, PropertySpec, Raw, TypeSchema, Value};

/// Builder for a [`TypeSchema`].
#[derive(Debug, Clone)]
pub struct TypeSchemaBuilder {
    name: Cow<'static, str>,
    capabilities: Vec<Kind>,
    properties: Vec<Arc<PropertySpec>>,
}

impl TypeSchemaBuilder {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            capabilities: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Inherits every property and capability of `parent`.
    ///
    /// Properties declared afterwards with the same name replace the
    /// inherited ones in place.
    pub fn extends(mut self, parent: &TypeSchema) -> Self {
        for kind in parent.capabilities() {
            if !self.capabilities.contains(kind) {
                self.capabilities.push(*kind);
            }
        }
        for spec in parent.properties() {
            self = self.insert(Arc::clone(spec));
        }
        self
    }

    /// Declares that values of this type can resolve as `kind`.
    pub fn capability(mut self, kind: Kind) -> Self {
        if !self.capabilities.contains(&kind) {
            self.capabilities.push(kind);
        }
        self
    }

    /// Adds a property descriptor.
    pub fn property(self, spec: PropertySpec) -> Self {
        self.insert(Arc::new(spec))
    }

    pub fn functional(
        self,
        name: impl Into<Cow<'static, str>>,
        kinds: impl Into<Cow<'static, [Kind]>>,
    ) -> Self {
        self.property(PropertySpec::functional(name, kinds))
    }

    pub fn non_functional(
        self,
        name: impl Into<Cow<'static, str>>,
        kinds: impl Into<Cow<'static, [Kind]>>,
    ) -> Self {
        self.property(PropertySpec::non_functional(name, kinds))
    }

    /// Adds a non-functional property with a `<name>Map` companion.
    pub fn language_mapped(
        self,
        name: impl Into<Cow<'static, str>>,
        kinds: impl Into<Cow<'static, [Kind]>>,
    ) -> Self {
        self.property(PropertySpec::non_functional(name, kinds).with_language_map())
    }

    fn insert(mut self, spec: Arc<PropertySpec>) -> Self {
        match self.properties.iter().position(|p| p.name() == spec.name()) {
            Some(existing) => self.properties[existing] = spec,
            None => self.properties.push(spec),
        }
        self
    }

    /// Validates the declaration and produces the schema.
    pub fn build(self) -> Result<TypeSchema, RegistryError> {
        for kind in &self.capabilities {
            if !kind.is_entity() {
                return Err(RegistryError::InvalidCapability {
                    type_name: self.name.to_string(),
                    kind: *kind,
                });
            }
        }

        for spec in &self.properties {
            let name = spec.name();
            if name == TYPE_KEY || name == CONTEXT_KEY {
                return Err(RegistryError::ReservedPropertyName {
                    name: name.to_string(),
                });
            }
            if spec.kinds().is_empty() {
                return Err(RegistryError::EmptyKinds {
                    property: name.to_string(),
                });
            }
            if let Some(map_key) = spec.map_key() {
                if self.properties.iter().any(|p| p.name() == map_key) {
                    return Err(RegistryError::MapKeyCollision {
                        property: name.to_string(),
                        map_key,
                    });
                }
            }
        }

        Ok(TypeSchema::from_parts(self.name, self.capabilities, self.properties))
    }
}

/// Fluent construction of an [`Entity`].
///
/// The first property error is kept and returned from [`EntityBuilder::build`].
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    entity: Entity,
    error: Option<PropertyError>,
}

impl EntityBuilder {
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self {
            entity: Entity::new(schema),
            error: None,
        }
    }

    fn apply(mut self, f: impl FnOnce(&mut Entity) -> Result<(), PropertyError>) -> Self {
        if self.error.is_none() {
            if let Err(e) = f(&mut self.entity) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets a functional property, or appends to a non-functional one.
    pub fn value(self, property: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.apply(|entity| entity.add(property, value))
    }

    /// Adds several values to a non-functional property, in order.
    pub fn values(self, property: &str, values: impl IntoIterator<Item = Value>) -> Self {
        self.apply(|entity| {
            let slot = entity.non_functional_mut(property)?;
            for value in values {
                slot.append(value)?;
            }
            Ok(())
        })
    }

    /// Adds a natural-language variant of `property`.
    pub fn language(self, property: &str, tag: &str, text: &str) -> Self {
        self.apply(|entity| {
            entity.language_map_mut(property)?.insert(tag, text);
            Ok(())
        })
    }

    /// Adds a caller-supplied type token.
    pub fn type_token(mut self, token: &str) -> Self {
        self.entity.push_type(token);
        self
    }

    /// Adds an extension key that is preserved verbatim.
    pub fn extension(mut self, key: &str, raw: Raw) -> Self {
        self.entity.unknown_mut().insert(key, raw);
        self
    }

    pub fn build(self) -> Result<Entity, PropertyError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.entity),
        }
    }
}

//! Declarative per-type descriptors.
//!
//! A [`TypeSchema`] lists the properties of one vocabulary type and the
//! entity kinds the type can stand in for. The codec engine is generic over
//! these descriptors; adding a vocabulary type is data, not code.

use std::borrow::Cow;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::limits::LANGUAGE_MAP_SUFFIX;
use crate::model::builder::TypeSchemaBuilder;
use crate::model::Kind;

/// Describes one property of a vocabulary type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    name: Cow<'static, str>,
    kinds: Cow<'static, [Kind]>,
    functional: bool,
    language_map: bool,
}

impl PropertySpec {
    /// A property holding at most one value.
    pub fn functional(
        name: impl Into<Cow<'static, str>>,
        kinds: impl Into<Cow<'static, [Kind]>>,
    ) -> Self {
        Self {
            name: name.into(),
            kinds: kinds.into(),
            functional: true,
            language_map: false,
        }
    }

    /// A property holding an ordered sequence of values.
    pub fn non_functional(
        name: impl Into<Cow<'static, str>>,
        kinds: impl Into<Cow<'static, [Kind]>>,
    ) -> Self {
        Self {
            name: name.into(),
            kinds: kinds.into(),
            functional: false,
            language_map: false,
        }
    }

    /// Adds a `<name>Map` natural-language companion.
    pub fn with_language_map(mut self) -> Self {
        self.language_map = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Admissible kinds in resolution priority order.
    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }

    pub fn is_functional(&self) -> bool {
        self.functional
    }

    pub fn has_language_map(&self) -> bool {
        self.language_map
    }

    /// The wire key of the natural-language companion, if declared.
    pub fn map_key(&self) -> Option<String> {
        self.language_map
            .then(|| format!("{}{}", self.name, LANGUAGE_MAP_SUFFIX))
    }

    /// Returns true if a value of `kind` may be stored. `Unknown` always may.
    pub fn admits(&self, kind: Kind) -> bool {
        kind == Kind::Unknown || self.kinds.contains(&kind)
    }

    /// Entity kinds in resolution order: object-like kinds first, Link last.
    pub fn entity_kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        let object_like = self.kinds.iter().copied().filter(|k| k.is_object_like());
        let links = self.kinds.iter().copied().filter(|k| *k == Kind::Link);
        object_like.chain(links)
    }

    /// Primitive kinds in declared order.
    pub fn primitive_kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.kinds.iter().copied().filter(|k| k.is_primitive())
    }
}

/// Describes one concrete vocabulary type.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    name: Cow<'static, str>,
    capabilities: Vec<Kind>,
    properties: Vec<Arc<PropertySpec>>,
    by_name: FxHashMap<String, usize>,
    by_map_key: FxHashMap<String, usize>,
}

impl TypeSchema {
    /// Starts declaring a type named `name`.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> TypeSchemaBuilder {
        TypeSchemaBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: Cow<'static, str>,
        capabilities: Vec<Kind>,
        properties: Vec<Arc<PropertySpec>>,
    ) -> Self {
        let mut by_name = FxHashMap::with_capacity_and_hasher(properties.len(), Default::default());
        let mut by_map_key = FxHashMap::default();
        for (index, spec) in properties.iter().enumerate() {
            by_name.insert(spec.name().to_string(), index);
            if let Some(key) = spec.map_key() {
                by_map_key.insert(key, index);
            }
        }
        Self {
            name,
            capabilities,
            properties,
            by_name,
            by_map_key,
        }
    }

    /// The canonical type token, injected into `type` on output.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entity kinds values of this type can be resolved as.
    pub fn capabilities(&self) -> &[Kind] {
        &self.capabilities
    }

    pub fn is_capable(&self, kind: Kind) -> bool {
        self.capabilities.contains(&kind)
    }

    /// Declared properties in serialization order.
    pub fn properties(&self) -> &[Arc<PropertySpec>] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Arc<PropertySpec>> {
        self.index_of(name).map(|i| &self.properties[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Resolves a `<property>Map` wire key to its property's index.
    pub fn index_of_map_key(&self, key: &str) -> Option<usize> {
        self.by_map_key.get(key).copied()
    }
}

impl PartialEq for TypeSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.capabilities == other.capabilities
            && self.properties == other.properties
    }
}

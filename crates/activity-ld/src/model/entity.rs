//! Entities: one slot per declared property, plus what the schema does not
//! know about.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::PropertyError;
use crate::model::{Functional, Iri, NonFunctional, Raw, Slot, TypeSchema, Value};

/// Natural-language variants of a string-bearing property, keyed by
/// language tag. Wire key is `<property>Map`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageMap {
    entries: BTreeMap<String, String>,
}

impl LanguageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries.get(tag).map(String::as_str)
    }

    /// Sets the text for `tag`, returning the previous text.
    pub fn insert(&mut self, tag: &str, text: &str) -> Option<String> {
        self.entries.insert(tag.to_string(), text.to_string())
    }

    pub fn remove(&mut self, tag: &str) -> Option<String> {
        self.entries.remove(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(tag, text)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Wire keys the schema does not declare, kept verbatim in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownBag {
    entries: serde_json::Map<String, Raw>,
}

impl UnknownBag {
    pub fn get(&self, key: &str) -> Option<&Raw> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: &str, raw: Raw) -> Option<Raw> {
        self.entries.insert(key.to_string(), raw)
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Raw> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An instance of a vocabulary type.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    schema: Arc<TypeSchema>,
    types: Vec<String>,
    slots: Vec<Slot>,
    language_maps: Vec<Option<LanguageMap>>,
    unknown: UnknownBag,
}

impl Entity {
    /// Creates an empty entity of the given type.
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        let slots: Vec<Slot> = schema.properties().iter().map(Slot::for_spec).collect();
        let language_maps = vec![None; slots.len()];
        Self {
            schema,
            types: Vec::new(),
            slots,
            language_maps,
            unknown: UnknownBag::default(),
        }
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    /// The canonical type token of this entity's schema.
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// Type tokens as read or set, without the injected canonical token.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Adds a type token unless an identical one is already present.
    pub fn push_type(&mut self, token: impl Into<String>) {
        let token = token.into();
        if !self.types.contains(&token) {
            self.types.push(token);
        }
    }

    pub fn set_types(&mut self, types: Vec<String>) {
        self.types = types;
    }

    /// Returns true if `token` is the canonical type or one of the tokens.
    pub fn is_a(&self, token: &str) -> bool {
        self.type_name() == token || self.types.iter().any(|t| t == token)
    }

    /// The `id` property, when declared and holding an IRI.
    pub fn id(&self) -> Option<&Iri> {
        self.get("id").and_then(Value::as_iri)
    }

    fn index(&self, property: &str) -> Result<usize, PropertyError> {
        self.schema
            .index_of(property)
            .ok_or_else(|| PropertyError::NoSuchProperty {
                type_name: self.type_name().to_string(),
                property: property.to_string(),
            })
    }

    pub fn slot(&self, property: &str) -> Result<&Slot, PropertyError> {
        let index = self.index(property)?;
        Ok(&self.slots[index])
    }

    pub fn functional(&self, property: &str) -> Result<&Functional, PropertyError> {
        match self.slot(property)? {
            Slot::Functional(f) => Ok(f),
            Slot::NonFunctional(_) => Err(wrong_multiplicity(property, "functional")),
        }
    }

    pub fn functional_mut(&mut self, property: &str) -> Result<&mut Functional, PropertyError> {
        let index = self.index(property)?;
        match &mut self.slots[index] {
            Slot::Functional(f) => Ok(f),
            Slot::NonFunctional(_) => Err(wrong_multiplicity(property, "functional")),
        }
    }

    pub fn non_functional(&self, property: &str) -> Result<&NonFunctional, PropertyError> {
        match self.slot(property)? {
            Slot::NonFunctional(n) => Ok(n),
            Slot::Functional(_) => Err(wrong_multiplicity(property, "non-functional")),
        }
    }

    pub fn non_functional_mut(
        &mut self,
        property: &str,
    ) -> Result<&mut NonFunctional, PropertyError> {
        let index = self.index(property)?;
        match &mut self.slots[index] {
            Slot::NonFunctional(n) => Ok(n),
            Slot::Functional(_) => Err(wrong_multiplicity(property, "non-functional")),
        }
    }

    /// Sets a functional property or appends to a non-functional one.
    pub fn add(&mut self, property: &str, value: Value) -> Result<(), PropertyError> {
        let index = self.index(property)?;
        match &mut self.slots[index] {
            Slot::Functional(f) => f.set(value).map(|_| ()),
            Slot::NonFunctional(n) => n.append(value),
        }
    }

    /// The first value of `property`, if declared and non-empty.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.slot(property).ok()?.values().first()
    }

    /// Returns true if any value of `property` is [`Value::Unknown`].
    pub fn has_unknown(&self, property: &str) -> bool {
        self.slot(property).is_ok_and(Slot::has_unknown)
    }

    pub fn language_map(&self, property: &str) -> Option<&LanguageMap> {
        let index = self.schema.index_of(property)?;
        self.language_maps[index].as_ref()
    }

    /// Returns the language map of `property`, creating it if absent.
    pub fn language_map_mut(&mut self, property: &str) -> Result<&mut LanguageMap, PropertyError> {
        let index = self.index(property)?;
        if !self.slots[index].spec().has_language_map() {
            return Err(PropertyError::NoLanguageMap {
                property: property.to_string(),
            });
        }
        Ok(self.language_map_at_mut(index))
    }

    pub fn remove_language_map(&mut self, property: &str) -> Option<LanguageMap> {
        let index = self.schema.index_of(property)?;
        self.language_maps[index].take()
    }

    pub fn unknown(&self) -> &UnknownBag {
        &self.unknown
    }

    pub fn unknown_mut(&mut self) -> &mut UnknownBag {
        &mut self.unknown
    }

    /// All slots in schema order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub(crate) fn slot_at_mut(&mut self, index: usize) -> &mut Slot {
        &mut self.slots[index]
    }

    pub(crate) fn language_map_at(&self, index: usize) -> Option<&LanguageMap> {
        self.language_maps[index].as_ref()
    }

    pub(crate) fn language_map_at_mut(&mut self, index: usize) -> &mut LanguageMap {
        self.language_maps[index].get_or_insert_with(LanguageMap::default)
    }
}

fn wrong_multiplicity(property: &str, expected: &'static str) -> PropertyError {
    let actual = if expected == "functional" {
        "non-functional"
    } else {
        "functional"
    };
    PropertyError::WrongMultiplicity {
        property: property.to_string(),
        expected,
        actual,
    }
}

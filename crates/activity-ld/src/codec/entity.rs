//! Entity encoding/decoding: one generic engine driven by [`TypeSchema`].
//!
//! Decoding routes every key of a record, in document order, to one of:
//! a declared property slot, a declared `<property>Map`, the type-token
//! list, nowhere (`@context`), or the unknown bag. Encoding emits declared
//! properties in schema order, then language maps, then `type` with the
//! canonical token injected, then the unknown bag.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::Map;
use tracing::{debug, trace};

use crate::codec::unknown::normalized;
use crate::codec::value::{resolve_value, serialize_value};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{ACTIVITYSTREAMS_NAMESPACES, CONTEXT_KEY, DEFAULT_MAX_DEPTH, TYPE_KEY};
use crate::model::{Entity, PropertySpec, Raw, Slot, TypeSchema, Value};
use crate::registry::{TypeEntry, TypeRegistry};

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting of typed entities below the top-level record.
    ///
    /// Raw data kept as unknown is not counted.
    pub max_depth: usize,
    /// Treat `prefix:name` as `name` when `@context` maps `prefix` to the
    /// ActivityStreams namespace.
    pub detect_alias: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detect_alias: true,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_alias_detection(mut self, detect_alias: bool) -> Self {
        self.detect_alias = detect_alias;
        self
    }
}

/// Options for encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Enable canonical encoding mode.
    ///
    /// When enabled, unknown-bag keys and the keys of every raw object kept
    /// as unknown are sorted lexicographically, so equal entities always
    /// serialize to identical bytes. Use it when hashing or signing output.
    pub canonical: bool,
}

impl EncodeOptions {
    /// Creates default (non-canonical) encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates canonical encoding options.
    pub fn canonical() -> Self {
        Self { canonical: true }
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Nesting state carried down through nested entities.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'s> {
    depth: usize,
    alias: Option<&'s str>,
}

impl<'s> Scope<'s> {
    pub(crate) fn root() -> Self {
        Self {
            depth: 0,
            alias: None,
        }
    }

    /// Strips the vocabulary prefix from `key`, if one is in effect.
    pub(crate) fn unalias<'t>(&self, key: &'t str) -> &'t str {
        match self.alias {
            Some(prefix) => key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(':'))
                .unwrap_or(key),
            None => key,
        }
    }
}

/// The `type` field of a record.
pub(crate) enum TypeField<'r> {
    Absent,
    Tokens(Vec<&'r str>),
    Malformed,
}

pub(crate) fn type_field(record: &Map<String, Raw>) -> TypeField<'_> {
    match record.get(TYPE_KEY) {
        None => TypeField::Absent,
        Some(raw) => type_tokens(raw),
    }
}

fn type_tokens(raw: &Raw) -> TypeField<'_> {
    match raw {
        Raw::String(token) => TypeField::Tokens(vec![token.as_str()]),
        Raw::Array(items) => items
            .iter()
            .map(Raw::as_str)
            .collect::<Option<Vec<_>>>()
            .map_or(TypeField::Malformed, TypeField::Tokens),
        _ => TypeField::Malformed,
    }
}

/// Finds a prefix that `@context` maps to the ActivityStreams namespace.
fn context_alias(record: &Map<String, Raw>) -> Option<&str> {
    let definitions: Vec<&Map<String, Raw>> = match record.get(CONTEXT_KEY)? {
        Raw::Object(definition) => vec![definition],
        Raw::Array(items) => items.iter().filter_map(Raw::as_object).collect(),
        _ => return None,
    };
    definitions
        .into_iter()
        .flat_map(|definition| definition.iter())
        .find_map(|(prefix, target)| {
            if prefix.starts_with('@') {
                return None;
            }
            let iri = match target {
                Raw::String(iri) => iri.as_str(),
                Raw::Object(term) => term.get("@id")?.as_str()?,
                _ => return None,
            };
            ACTIVITYSTREAMS_NAMESPACES
                .contains(&iri)
                .then_some(prefix.as_str())
        })
}

/// Reads a `<property>Map` value as tag/text pairs.
fn language_entries(raw: &Raw) -> Option<Vec<(&str, &str)>> {
    raw.as_object()?
        .iter()
        .map(|(tag, text)| Some((tag.as_str(), text.as_str()?)))
        .collect()
}

fn json_type_name(raw: &Raw) -> &'static str {
    match raw {
        Raw::Null => "null",
        Raw::Bool(_) => "a boolean",
        Raw::Number(_) => "a number",
        Raw::String(_) => "a string",
        Raw::Array(_) => "an array",
        Raw::Object(_) => "an object",
    }
}

/// Entity state a record key is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Target {
    Type,
    Property(usize),
    LanguageMap(usize),
}

pub(crate) struct Decoder<'a> {
    registry: &'a TypeRegistry,
    options: &'a DecodeOptions,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, options: &'a DecodeOptions) -> Self {
        Self { registry, options }
    }

    pub(crate) fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Decodes a record one level below `scope` as an instance of `entry`.
    pub(crate) fn decode_nested(
        &self,
        entry: &TypeEntry,
        record: &Map<String, Raw>,
        scope: Scope<'_>,
    ) -> Result<Entity, DecodeError> {
        let depth = scope.depth + 1;
        if depth > self.options.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                max: self.options.max_depth,
            });
        }
        let mut entity = entry.instantiate();
        self.decode_entity(&mut entity, record, Scope { depth, ..scope })?;
        Ok(entity)
    }

    pub(crate) fn decode_entity(
        &self,
        entity: &mut Entity,
        record: &Map<String, Raw>,
        scope: Scope<'_>,
    ) -> Result<(), DecodeError> {
        let scope = if self.options.detect_alias {
            match context_alias(record) {
                Some(prefix) => {
                    debug!(prefix, "vocabulary alias detected in @context");
                    Scope {
                        depth: scope.depth,
                        alias: Some(prefix),
                    }
                }
                None => scope,
            }
        } else {
            Scope {
                depth: scope.depth,
                alias: None,
            }
        };

        let schema = Arc::clone(entity.schema());
        let mut claimed: FxHashSet<Target> = FxHashSet::default();
        for (key, raw) in record {
            if key == CONTEXT_KEY {
                trace!(type_name = schema.name(), "dropping @context");
                continue;
            }
            let name = scope.unalias(key);

            let target = if name == TYPE_KEY {
                Some(Target::Type)
            } else if let Some(index) = schema.index_of(name) {
                Some(Target::Property(index))
            } else {
                schema.index_of_map_key(name).map(Target::LanguageMap)
            };
            // `content` and `as:content` in one record: the first one wins
            let target = match target {
                Some(target) if !claimed.insert(target) => {
                    trace!(key = key.as_str(), "key already filled under another form, keeping as unknown");
                    None
                }
                other => other,
            };

            match target {
                Some(Target::Type) => {
                    let TypeField::Tokens(tokens) = type_tokens(raw) else {
                        return Err(DecodeError::MalformedTypeTokens);
                    };
                    entity.set_types(
                        tokens
                            .into_iter()
                            .map(|token| scope.unalias(token).to_string())
                            .collect(),
                    );
                    continue;
                }
                Some(Target::Property(index)) => {
                    let spec = &schema.properties()[index];
                    self.decode_property(entity.slot_at_mut(index), spec, raw, scope)
                        .map_err(|e| e.in_property(name))?;
                    continue;
                }
                Some(Target::LanguageMap(index)) => {
                    if let Some(entries) = language_entries(raw) {
                        let map = entity.language_map_at_mut(index);
                        for (tag, text) in entries {
                            map.insert(tag, text);
                        }
                        continue;
                    }
                    trace!(key = key.as_str(), "language map is not a string record, keeping as unknown");
                }
                None => {}
            }

            entity.unknown_mut().insert(key, normalized(raw, false));
        }
        Ok(())
    }

    fn decode_property(
        &self,
        slot: &mut Slot,
        spec: &PropertySpec,
        raw: &Raw,
        scope: Scope<'_>,
    ) -> Result<(), DecodeError> {
        match raw {
            Raw::Array(items) if !spec.is_functional() => {
                for item in items {
                    slot.put_resolved(resolve_value(self, item, spec, scope)?);
                }
            }
            _ => slot.put_resolved(resolve_value(self, raw, spec, scope)?),
        }
        Ok(())
    }
}

// =============================================================================
// ENCODING
// =============================================================================

pub(crate) struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    pub(crate) fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub(crate) fn options(&self) -> &EncodeOptions {
        &self.options
    }

    pub(crate) fn encode_entity(&self, entity: &Entity) -> Result<Map<String, Raw>, EncodeError> {
        let mut out = Map::new();

        for slot in entity.slots() {
            let name = slot.spec().name();
            let raw = match slot.values() {
                [] => continue,
                // an array element must stay wrapped or it would decode as many
                [single] => serialize_value(self, single).map(|raw| match raw {
                    Raw::Array(_) if !slot.spec().is_functional() => Raw::Array(vec![raw]),
                    raw => raw,
                }),
                many => many
                    .iter()
                    .map(|value| serialize_value(self, value))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Raw::Array),
            }
            .map_err(|e| e.in_property(name))?;
            out.insert(name.to_string(), raw);
        }

        for (index, spec) in entity.schema().properties().iter().enumerate() {
            let (Some(map), Some(key)) = (entity.language_map_at(index), spec.map_key()) else {
                continue;
            };
            if map.is_empty() {
                continue;
            }
            let entries = map
                .iter()
                .map(|(tag, text)| (tag.to_string(), Raw::String(text.to_string())))
                .collect();
            out.insert(key, Raw::Object(entries));
        }

        out.insert(TYPE_KEY.to_string(), type_value(entity));

        let mut extras: Vec<(&String, &Raw)> = entity.unknown().iter().collect();
        if self.options.canonical {
            extras.sort_by(|a, b| a.0.cmp(b.0));
        }
        for (key, raw) in extras {
            if key == CONTEXT_KEY || out.contains_key(key.as_str()) {
                trace!(key = key.as_str(), "unknown key shadowed by a declared key, skipping");
                continue;
            }
            out.insert(key.clone(), normalized(raw, self.options.canonical));
        }

        Ok(out)
    }
}

/// The `type` field: caller tokens with the canonical token appended when
/// absent, compacted to a bare string when only one remains.
fn type_value(entity: &Entity) -> Raw {
    let mut tokens: Vec<&str> = entity.types().iter().map(String::as_str).collect();
    if !tokens.contains(&entity.type_name()) {
        tokens.push(entity.type_name());
    }
    match tokens.as_slice() {
        [single] => Raw::String(single.to_string()),
        many => Raw::Array(many.iter().map(|t| Raw::String(t.to_string())).collect()),
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Entry point for converting between wire records and entities.
///
/// Holds the type registry used to resolve nested records, plus decode and
/// encode options. Cheap to clone; the registry is shared.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<TypeRegistry>,
    decode: DecodeOptions,
    encode: EncodeOptions,
}

impl Codec {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            decode: DecodeOptions::default(),
            encode: EncodeOptions::default(),
        }
    }

    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode = options;
        self
    }

    pub fn with_encode_options(mut self, options: EncodeOptions) -> Self {
        self.encode = options;
        self
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode
    }

    pub fn encode_options(&self) -> &EncodeOptions {
        &self.encode
    }

    fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.registry, &self.decode)
    }

    fn encoder(&self) -> Encoder {
        Encoder::new(self.encode)
    }

    /// Decodes `record` as an instance of `schema`.
    pub fn deserialize(
        &self,
        schema: Arc<TypeSchema>,
        record: &Map<String, Raw>,
    ) -> Result<Entity, DecodeError> {
        let mut entity = Entity::new(schema);
        self.deserialize_into(&mut entity, record)?;
        Ok(entity)
    }

    /// Decodes `record` into an existing entity, adding to what it holds.
    pub fn deserialize_into(
        &self,
        entity: &mut Entity,
        record: &Map<String, Raw>,
    ) -> Result<(), DecodeError> {
        self.decoder().decode_entity(entity, record, Scope::root())
    }

    /// Decodes a record whose type is not known in advance, using the first
    /// of its type tokens that is registered.
    pub fn resolve(&self, raw: &Raw) -> Result<Entity, DecodeError> {
        let record = raw.as_object().ok_or(DecodeError::NotARecord {
            found: json_type_name(raw),
        })?;
        let tokens = match type_field(record) {
            TypeField::Tokens(tokens) => tokens,
            TypeField::Absent => Vec::new(),
            TypeField::Malformed => return Err(DecodeError::MalformedTypeTokens),
        };
        let scope = Scope {
            depth: 0,
            alias: if self.decode.detect_alias {
                context_alias(record)
            } else {
                None
            },
        };

        let Some(entry) = tokens.iter().find_map(|t| self.registry.get(scope.unalias(t))) else {
            return Err(DecodeError::UnresolvableType {
                tokens: tokens.iter().map(|t| t.to_string()).collect(),
            });
        };
        let mut entity = entry.instantiate();
        self.decoder().decode_entity(&mut entity, record, Scope::root())?;
        Ok(entity)
    }

    /// Resolves one raw element against a property declaration.
    pub fn resolve_value(&self, raw: &Raw, spec: &PropertySpec) -> Result<Value, DecodeError> {
        resolve_value(&self.decoder(), raw, spec, Scope::root())
    }

    /// Parses a JSON document and resolves its top-level record.
    pub fn deserialize_document(&self, json: &str) -> Result<Entity, DecodeError> {
        let raw: Raw = serde_json::from_str(json).map_err(|e| DecodeError::Json(e.to_string()))?;
        self.resolve(&raw)
    }

    pub fn serialize(&self, entity: &Entity) -> Result<Map<String, Raw>, EncodeError> {
        self.encoder().encode_entity(entity)
    }

    pub fn serialize_value(&self, value: &Value) -> Result<Raw, EncodeError> {
        serialize_value(&self.encoder(), value)
    }

    /// Serializes an entity to a compact JSON string.
    pub fn serialize_document(&self, entity: &Entity) -> Result<String, EncodeError> {
        let record = self.serialize(entity)?;
        serde_json::to_string(&Raw::Object(record)).map_err(|e| EncodeError::Json(e.to_string()))
    }
}

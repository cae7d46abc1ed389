//! Property values: the tagged union every property occurrence resolves to.
//!
//! A property declares an ordered subset of [`Kind`]s it admits. Each
//! occurrence holds exactly one [`Value`]; data that matched none of the
//! declared kinds is kept verbatim as [`Value::Unknown`].

use std::fmt;

use url::Url;

use crate::model::Entity;
use crate::util::{self, LexicalError};

/// Uninterpreted wire data, kept losslessly.
pub type Raw = serde_json::Value;

/// The discriminant of a [`Value`], and the unit properties declare their
/// admissible kinds in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Any Object-capable vocabulary type.
    Object,
    /// Any Link-capable vocabulary type.
    Link,
    /// Image or a subtype.
    Image,
    /// Collection or a subtype.
    Collection,
    /// OrderedCollection or a subtype.
    OrderedCollection,
    Iri,
    DateTime,
    Duration,
    Boolean,
    Float,
    String,
    /// `rdf:langString`, a string with an optional language tag.
    LangString,
    MimeType,
    NonNegativeInteger,
    /// A BCP-47 language tag as a value in its own right.
    Bcp47,
    /// Raw data that matched no declared kind. Always admissible.
    Unknown,
}

impl Kind {
    /// Returns true for kinds whose payload is a nested entity.
    pub fn is_entity(self) -> bool {
        matches!(
            self,
            Kind::Object | Kind::Link | Kind::Image | Kind::Collection | Kind::OrderedCollection
        )
    }

    /// Returns true for entity kinds tried before Link during resolution.
    pub fn is_object_like(self) -> bool {
        self.is_entity() && self != Kind::Link
    }

    /// Returns true for kinds parsed from scalar (or value-object) wire data.
    pub fn is_primitive(self) -> bool {
        !self.is_entity() && self != Kind::Unknown
    }

    /// The vocabulary name of this kind, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Object => "as:Object",
            Kind::Link => "as:Link",
            Kind::Image => "as:Image",
            Kind::Collection => "as:Collection",
            Kind::OrderedCollection => "as:OrderedCollection",
            Kind::Iri => "IRI",
            Kind::DateTime => "xsd:dateTime",
            Kind::Duration => "xsd:duration",
            Kind::Boolean => "xsd:boolean",
            Kind::Float => "xsd:float",
            Kind::String => "xsd:string",
            Kind::LangString => "rdf:langString",
            Kind::MimeType => "MIME media type",
            Kind::NonNegativeInteger => "xsd:nonNegativeInteger",
            Kind::Bcp47 => "BCP-47 language tag",
            Kind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An absolute IRI, kept in the exact form it was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Iri {
    written: String,
    url: Url,
}

impl Iri {
    /// Parses an absolute IRI. Relative references are rejected.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(input)?;
        Ok(Self {
            written: input.to_string(),
            url,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.written
    }

    /// Returns the parsed URL form (normalized, unlike [`Iri::as_str`]).
    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.written)
    }
}

impl From<Url> for Iri {
    fn from(url: Url) -> Self {
        Self {
            written: url.to_string(),
            url,
        }
    }
}

/// An `xsd:dateTime`: an instant plus the offset it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    /// Microseconds since Unix epoch (1970-01-01T00:00:00Z).
    pub epoch_micros: i64,
    /// Signed UTC offset in minutes (e.g., +330 for +05:30).
    pub offset_min: i16,
}

impl DateTime {
    pub fn parse(input: &str) -> Result<Self, LexicalError> {
        let (epoch_micros, offset_min) = util::parse_datetime_rfc3339(input)?;
        Ok(Self { epoch_micros, offset_min })
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&util::format_datetime_rfc3339(self.epoch_micros, self.offset_min))
    }
}

/// An `xsd:duration`, component-wise (years and months are not reducible
/// to a fixed number of seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub negative: bool,
    pub years: u64,
    pub months: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    /// Seconds component in microseconds.
    pub micros: u64,
}

impl Duration {
    pub fn parse(input: &str) -> Result<Self, LexicalError> {
        util::parse_duration(input)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&util::format_duration(self))
    }
}

/// A syntactically valid BCP-47 language tag (`en`, `pt-BR`, `zh-Hant-TW`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn parse(input: &str) -> Result<Self, LexicalError> {
        let mut subtags = input.split('-');
        let primary_ok = subtags
            .next()
            .is_some_and(|p| (1..=8).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphabetic()));
        let rest_ok = subtags.all(|s| (1..=8).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphanumeric()));
        if primary_ok && rest_ok {
            Ok(Self(input.to_string()))
        } else {
            Err(LexicalError::new(format!("invalid language tag: {}", input)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A MIME media type (`type/subtype` with optional parameters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType(String);

impl MediaType {
    pub fn parse(input: &str) -> Result<Self, LexicalError> {
        let essence = input.split(';').next().unwrap_or_default().trim();
        let valid = match essence.split_once('/') {
            Some((kind, subtype)) => is_mime_token(kind) && is_mime_token(subtype),
            None => false,
        };
        if valid {
            Ok(Self(input.to_string()))
        } else {
            Err(LexicalError::new(format!("invalid media type: {}", input)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_mime_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&b)
        })
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An `rdf:langString`: wire form is the JSON-LD value object
/// `{"@value": "...", "@language": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LangString {
    pub value: String,
    pub language: Option<LanguageTag>,
}

/// One occurrence of a property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Object(Box<Entity>),
    Link(Box<Entity>),
    Image(Box<Entity>),
    Collection(Box<Entity>),
    OrderedCollection(Box<Entity>),
    Iri(Iri),
    DateTime(DateTime),
    Duration(Duration),
    Boolean(bool),
    Float(f64),
    String(String),
    LangString(LangString),
    MimeType(MediaType),
    NonNegativeInteger(u64),
    Bcp47(LanguageTag),
    /// Wire data no declared kind accepted, preserved as-is.
    Unknown(Raw),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Object(_) => Kind::Object,
            Value::Link(_) => Kind::Link,
            Value::Image(_) => Kind::Image,
            Value::Collection(_) => Kind::Collection,
            Value::OrderedCollection(_) => Kind::OrderedCollection,
            Value::Iri(_) => Kind::Iri,
            Value::DateTime(_) => Kind::DateTime,
            Value::Duration(_) => Kind::Duration,
            Value::Boolean(_) => Kind::Boolean,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::LangString(_) => Kind::LangString,
            Value::MimeType(_) => Kind::MimeType,
            Value::NonNegativeInteger(_) => Kind::NonNegativeInteger,
            Value::Bcp47(_) => Kind::Bcp47,
            Value::Unknown(_) => Kind::Unknown,
        }
    }

    /// Wraps an entity in the variant for `kind`.
    ///
    /// Returns `None` when `kind` is not an entity kind.
    pub fn from_entity(kind: Kind, entity: Entity) -> Option<Value> {
        let boxed = Box::new(entity);
        match kind {
            Kind::Object => Some(Value::Object(boxed)),
            Kind::Link => Some(Value::Link(boxed)),
            Kind::Image => Some(Value::Image(boxed)),
            Kind::Collection => Some(Value::Collection(boxed)),
            Kind::OrderedCollection => Some(Value::OrderedCollection(boxed)),
            _ => None,
        }
    }

    /// Parses `input` as an IRI value.
    pub fn iri(input: &str) -> Result<Value, url::ParseError> {
        Iri::parse(input).map(Value::Iri)
    }

    /// Returns the nested entity for any entity kind.
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Object(e)
            | Value::Link(e)
            | Value::Image(e)
            | Value::Collection(e)
            | Value::OrderedCollection(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Value::Object(e)
            | Value::Link(e)
            | Value::Image(e)
            | Value::Collection(e)
            | Value::OrderedCollection(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Value::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns the text of string-like kinds (string, langString, media type,
    /// language tag).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::LangString(ls) => Some(&ls.value),
            Value::MimeType(m) => Some(m.as_str()),
            Value::Bcp47(tag) => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::NonNegativeInteger(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Value::Duration(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&Raw> {
        match self {
            Value::Unknown(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown(_))
    }

    /// Returns the IRI naming this value: the IRI itself, or a nested
    /// entity's `id`.
    pub fn reference(&self) -> Option<&Iri> {
        match self {
            Value::Iri(iri) => Some(iri),
            _ => self.as_entity().and_then(Entity::id),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Iri> for Value {
    fn from(iri: Iri) -> Self {
        Value::Iri(iri)
    }
}

impl From<DateTime> for Value {
    fn from(dt: DateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

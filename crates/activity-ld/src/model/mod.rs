//! Data model types for activity-ld.
//!
//! This module contains the in-memory side of the codec:
//! - Values (the tagged union a property occurrence holds)
//! - Slots (functional and non-functional multiplicity)
//! - Schemas (declarative per-type property lists)
//! - Entities (slots, language maps and the unknown bag)
//! - Builders (ergonomic construction)

pub mod builder;
pub mod entity;
pub mod schema;
pub mod slot;
pub mod value;

pub use builder::{EntityBuilder, TypeSchemaBuilder};
pub use entity::{Entity, LanguageMap, UnknownBag};
pub use schema::{PropertySpec, TypeSchema};
pub use slot::{Functional, NonFunctional, Slot};
pub use value::{DateTime, Duration, Iri, Kind, LangString, LanguageTag, MediaType, Raw, Value};

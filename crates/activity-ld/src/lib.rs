//! activity-ld: polymorphic property codec for ActivityStreams-style JSON-LD.
//!
//! This crate decodes JSON records into typed entities and encodes them
//! back, for vocabularies where a property may hold one of several kinds of
//! value, may be single- or multi-valued, may carry natural-language
//! variants, and must round-trip data the schema does not know about.
//!
//! # Overview
//!
//! - **Polymorphic values**: each property declares an ordered list of
//!   admissible [`Kind`]s; raw input resolves to the first kind that fits
//! - **Type registry**: nested records are matched to concrete types by
//!   their `type` tokens
//! - **Lossless**: unrecognized keys and shapes are kept verbatim
//!
//! # Quick Start
//!
//! ```rust
//! use activity_ld::vocab;
//! use serde_json::json;
//!
//! let codec = vocab::default_codec();
//!
//! let question = codec
//!     .resolve(&json!({
//!         "type": "Question",
//!         "id": "https://example.com/q/1",
//!         "content": "Tea or coffee?",
//!         "closed": true,
//!         "oneOf": [
//!             {"type": "Note", "name": "Tea"},
//!             {"type": "Note", "name": "Coffee"}
//!         ]
//!     }))
//!     .unwrap();
//!
//! assert_eq!(question.type_name(), "Question");
//! assert_eq!(question.get("closed").and_then(|v| v.as_bool()), Some(true));
//! assert_eq!(question.non_functional("oneOf").unwrap().len(), 2);
//!
//! let record = codec.serialize(&question).unwrap();
//! assert_eq!(record["type"], json!("Question"));
//! ```
//!
//! # Modules
//!
//! - [`model`]: Values, slots, schemas and entities
//! - [`codec`]: JSON encoding/decoding
//! - [`registry`]: Type token to constructor mapping
//! - [`vocab`]: The built-in ActivityStreams catalogue
//! - [`error`]: Error types
//! - [`limits`]: Reserved keys and decoding limits
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Nesting of typed entities is bounded by [`DecodeOptions::max_depth`]
//! - Raw data kept as unknown is walked iteratively, never recursively
//! - Malformed primitives are rejected with descriptive errors

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod registry;
pub mod util;
pub mod vocab;

// Re-export commonly used types at crate root
pub use codec::{Codec, DecodeOptions, EncodeOptions};
pub use error::{DecodeError, EncodeError, ErrorCode, PropertyError, RegistryError};
pub use model::{
    DateTime, Duration, Entity, EntityBuilder, Functional, Iri, Kind, LangString, LanguageMap,
    LanguageTag, MediaType, NonFunctional, PropertySpec, Raw, Slot, TypeSchema, UnknownBag, Value,
};
pub use registry::{RegistryBuilder, TypeEntry, TypeRegistry};
pub use vocab::{default_codec, default_registry};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! JSON encoding/decoding for activity-ld.
//!
//! Values travel as `serde_json::Value`; an entity maps to one JSON object.

pub mod entity;
pub mod primitives;
pub mod unknown;
mod value;

pub use entity::{Codec, DecodeOptions, EncodeOptions};
pub use primitives::{float_to_number, format_primitive, parse_primitive};
pub use unknown::{normalize_raw, normalized};

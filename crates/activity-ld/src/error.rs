//! Error types for decoding, encoding, property access and schema building.

use thiserror::Error;

use crate::model::Kind;

/// Stable error codes for service layers that map errors to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: A primitive parser recognized the shape but not the content
    MalformedPrimitive,
    /// E002: A top-level record names no registered type
    UnresolvableType,
    /// E003: Nested entities exceed the configured depth
    DepthLimitExceeded,
    /// E004: Structurally invalid document (not JSON, not a record, bad `type`)
    MalformedDocument,
    /// E005: Property access that violates a slot contract
    PropertyContract,
    /// E006: Inconsistent schema or registry declaration
    Schema,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MalformedPrimitive => "E001",
            ErrorCode::UnresolvableType => "E002",
            ErrorCode::DepthLimitExceeded => "E003",
            ErrorCode::MalformedDocument => "E004",
            ErrorCode::PropertyContract => "E005",
            ErrorCode::Schema => "E006",
        }
    }
}

/// Error while turning wire data into entities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E001: Malformed primitive ===
    #[error("[E001] malformed {kind}: {input:?} ({reason})")]
    MalformedPrimitive {
        kind: Kind,
        input: String,
        reason: String,
    },

    // === E002: Unresolvable type ===
    #[error("[E002] no registered type for tokens {tokens:?}")]
    UnresolvableType { tokens: Vec<String> },

    // === E003: Depth limit ===
    #[error("[E003] nested entities exceed maximum depth {max}")]
    DepthLimitExceeded { max: usize },

    // === E004: Malformed document ===
    #[error("[E004] expected a JSON object, found {found}")]
    NotARecord { found: &'static str },

    #[error("[E004] `type` must be a string or an array of strings")]
    MalformedTypeTokens,

    #[error("[E004] invalid JSON: {0}")]
    Json(String),

    /// A failure inside a nested property, with the property it came from.
    #[error("in `{property}`: {source}")]
    InProperty {
        property: String,
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::MalformedPrimitive { .. } => ErrorCode::MalformedPrimitive,
            DecodeError::UnresolvableType { .. } => ErrorCode::UnresolvableType,
            DecodeError::DepthLimitExceeded { .. } => ErrorCode::DepthLimitExceeded,
            DecodeError::NotARecord { .. } | DecodeError::MalformedTypeTokens | DecodeError::Json(_) => {
                ErrorCode::MalformedDocument
            }
            DecodeError::InProperty { source, .. } => source.code(),
        }
    }

    /// Returns the innermost error, skipping property context.
    pub fn root(&self) -> &DecodeError {
        match self {
            DecodeError::InProperty { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the dotted property path to the failure (`object.closed`).
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut current = self;
        while let DecodeError::InProperty { property, source } = current {
            segments.push(property.as_str());
            current = &**source;
        }
        segments.join(".")
    }

    pub(crate) fn in_property(self, property: &str) -> DecodeError {
        DecodeError::InProperty {
            property: property.to_string(),
            source: Box::new(self),
        }
    }
}

/// Error while turning entities into wire data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("float value {value} has no JSON representation")]
    NonFiniteFloat { value: f64 },

    #[error("JSON serialization failed: {0}")]
    Json(String),

    #[error("in `{property}`: {source}")]
    InProperty {
        property: String,
        source: Box<EncodeError>,
    },
}

impl EncodeError {
    pub(crate) fn in_property(self, property: &str) -> EncodeError {
        EncodeError::InProperty {
            property: property.to_string(),
            source: Box::new(self),
        }
    }
}

/// Error from reading or mutating an entity's properties.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("[E005] type {type_name} has no property `{property}`")]
    NoSuchProperty { type_name: String, property: String },

    #[error("[E005] property `{property}` is {actual}, not {expected}")]
    WrongMultiplicity {
        property: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("[E005] property `{property}` does not admit {kind}")]
    KindNotAdmissible { property: String, kind: Kind },

    #[error("[E005] {type_name} cannot be used as {kind} in `{property}`")]
    NotCapable {
        property: String,
        type_name: String,
        kind: Kind,
    },

    #[error("[E005] index {index} out of bounds for `{property}` (length: {len})")]
    IndexOutOfBounds {
        property: String,
        index: usize,
        len: usize,
    },

    #[error("[E005] property `{property}` has no natural-language map")]
    NoLanguageMap { property: String },
}

impl PropertyError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::PropertyContract
    }
}

/// Error while declaring type schemas or building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("[E006] type {name} is registered twice")]
    DuplicateType { name: String },

    #[error("[E006] `{name}` is reserved and cannot be declared as a property")]
    ReservedPropertyName { name: String },

    #[error("[E006] property `{property}` declares no kinds")]
    EmptyKinds { property: String },

    #[error("[E006] `{map_key}` is both a property and the language map of `{property}`")]
    MapKeyCollision { property: String, map_key: String },

    #[error("[E006] {kind} is not an entity capability (type {type_name})")]
    InvalidCapability { type_name: String, kind: Kind },
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Schema
    }
}

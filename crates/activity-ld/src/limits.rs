//! Reserved wire keys and decoding limits.

/// JSON-LD context key. Accepted on input, never emitted.
pub const CONTEXT_KEY: &str = "@context";

/// Type-token key.
pub const TYPE_KEY: &str = "type";

/// Suffix of natural-language companion keys (`content` -> `contentMap`).
pub const LANGUAGE_MAP_SUFFIX: &str = "Map";

/// Literal key of a JSON-LD value object.
pub const VALUE_KEY: &str = "@value";

/// Language key of a JSON-LD value object.
pub const LANGUAGE_KEY: &str = "@language";

/// Default maximum nesting of typed entities.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The ActivityStreams vocabulary namespace.
pub const ACTIVITYSTREAMS_NAMESPACE: &str = "https://www.w3.org/ns/activitystreams";

/// Namespace forms accepted when detecting a vocabulary prefix in `@context`.
pub const ACTIVITYSTREAMS_NAMESPACES: &[&str] = &[
    ACTIVITYSTREAMS_NAMESPACE,
    "https://www.w3.org/ns/activitystreams#",
    "http://www.w3.org/ns/activitystreams",
    "http://www.w3.org/ns/activitystreams#",
];

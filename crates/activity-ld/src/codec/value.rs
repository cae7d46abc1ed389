//! Property value resolution and serialization.
//!
//! Resolution order for one raw element against a property's kinds:
//! 1. A typed record tries every declared entity kind (object-like kinds
//!    in declared order, then Link), each against every type token in
//!    token order; the first registered type capable of the kind wins.
//! 2. Anything else (scalars, value objects) tries each declared
//!    primitive kind in declared order.
//! 3. Whatever is left is kept as [`Value::Unknown`].
//!
//! Malformed content (a string that does not lex as an IRI, say) is an
//! error only for a property declaring exactly one primitive kind and no
//! entity kinds, such as `id` or `published`. Anywhere else it is unknown.

use tracing::trace;

use crate::codec::entity::{Decoder, Encoder, Scope, TypeField, type_field};
use crate::codec::primitives::{format_primitive, is_value_object, parse_primitive};
use crate::codec::unknown::normalized;
use crate::error::{DecodeError, EncodeError};
use crate::model::{PropertySpec, Raw, Value};

// =============================================================================
// DECODING
// =============================================================================

/// Resolves one raw element of a property to a [`Value`].
///
/// Fails only when a single-kind primitive property rejects the content,
/// or when a nested entity fails to decode.
pub(crate) fn resolve_value(
    decoder: &Decoder<'_>,
    raw: &Raw,
    spec: &PropertySpec,
    scope: Scope<'_>,
) -> Result<Value, DecodeError> {
    if let Raw::Object(record) = raw {
        if !is_value_object(record) {
            if let TypeField::Tokens(tokens) = type_field(record) {
                for kind in spec.entity_kinds() {
                    for token in &tokens {
                        let token = scope.unalias(token);
                        if let Some(entry) = decoder.registry().lookup(token, kind) {
                            let entity = decoder.decode_nested(entry, record, scope)?;
                            if let Some(value) = Value::from_entity(kind, entity) {
                                return Ok(value);
                            }
                        }
                    }
                }
            }
            return Ok(unknown(raw, spec));
        }
    }

    if !raw.is_array() {
        let mut deferred = None;
        for kind in spec.primitive_kinds() {
            match parse_primitive(kind, raw) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) => {
                    deferred.get_or_insert(e);
                }
            }
        }
        if let Some(e) = deferred {
            if is_strict(spec) {
                return Err(e);
            }
            trace!(property = spec.name(), error = %e, "malformed content tolerated");
        }
    }

    Ok(unknown(raw, spec))
}

/// A property with exactly one primitive kind and no entity kinds rejects
/// malformed content instead of keeping it as unknown.
fn is_strict(spec: &PropertySpec) -> bool {
    spec.entity_kinds().next().is_none() && spec.primitive_kinds().count() == 1
}

fn unknown(raw: &Raw, spec: &PropertySpec) -> Value {
    trace!(property = spec.name(), "no declared kind matched, keeping value as unknown");
    Value::Unknown(normalized(raw, false))
}

// =============================================================================
// ENCODING
// =============================================================================

/// Serializes one value to its wire form.
pub(crate) fn serialize_value(encoder: &Encoder, value: &Value) -> Result<Raw, EncodeError> {
    if let Some(entity) = value.as_entity() {
        return encoder.encode_entity(entity).map(Raw::Object);
    }
    if let Value::Unknown(raw) = value {
        return Ok(normalized(raw, encoder.options().canonical));
    }
    match format_primitive(value)? {
        Some(raw) => Ok(raw),
        None => Ok(Raw::Null),
    }
}

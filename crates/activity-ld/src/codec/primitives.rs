//! Primitive kind parsers and formatters.
//!
//! Each parser returns `Ok(None)` when the raw shape does not belong to the
//! kind at all, and `Err` when the shape matches but the content is
//! malformed.

use serde_json::{Map, Number};

use crate::error::{DecodeError, EncodeError};
use crate::limits::{LANGUAGE_KEY, VALUE_KEY};
use crate::model::{DateTime, Duration, Iri, Kind, LangString, LanguageTag, MediaType, Raw, Value};

// =============================================================================
// DECODING
// =============================================================================

/// Parses `raw` as a value of the primitive `kind`.
pub fn parse_primitive(kind: Kind, raw: &Raw) -> Result<Option<Value>, DecodeError> {
    match kind {
        Kind::Iri => parse_iri(raw),
        Kind::DateTime => parse_datetime(raw),
        Kind::Duration => parse_duration(raw),
        Kind::Boolean => Ok(raw.as_bool().map(Value::Boolean)),
        Kind::Float => Ok(raw.as_f64().map(Value::Float)),
        Kind::String => Ok(raw.as_str().map(|s| Value::String(s.to_string()))),
        Kind::LangString => parse_lang_string(raw),
        Kind::MimeType => parse_media_type(raw),
        Kind::NonNegativeInteger => parse_non_negative_integer(raw),
        Kind::Bcp47 => parse_bcp47(raw),
        Kind::Object
        | Kind::Link
        | Kind::Image
        | Kind::Collection
        | Kind::OrderedCollection
        | Kind::Unknown => Ok(None),
    }
}

fn malformed(kind: Kind, input: &str, reason: impl ToString) -> DecodeError {
    DecodeError::MalformedPrimitive {
        kind,
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_iri(raw: &Raw) -> Result<Option<Value>, DecodeError> {
    let Some(s) = raw.as_str() else {
        return Ok(None);
    };
    Iri::parse(s)
        .map(|iri| Some(Value::Iri(iri)))
        .map_err(|e| malformed(Kind::Iri, s, e))
}

fn parse_datetime(raw: &Raw) -> Result<Option<Value>, DecodeError> {
    let Some(s) = raw.as_str() else {
        return Ok(None);
    };
    DateTime::parse(s)
        .map(|dt| Some(Value::DateTime(dt)))
        .map_err(|e| malformed(Kind::DateTime, s, e))
}

fn parse_duration(raw: &Raw) -> Result<Option<Value>, DecodeError> {
    let Some(s) = raw.as_str() else {
        return Ok(None);
    };
    Duration::parse(s)
        .map(|d| Some(Value::Duration(d)))
        .map_err(|e| malformed(Kind::Duration, s, e))
}

fn parse_media_type(raw: &Raw) -> Result<Option<Value>, DecodeError> {
    let Some(s) = raw.as_str() else {
        return Ok(None);
    };
    MediaType::parse(s)
        .map(|m| Some(Value::MimeType(m)))
        .map_err(|e| malformed(Kind::MimeType, s, e))
}

fn parse_bcp47(raw: &Raw) -> Result<Option<Value>, DecodeError> {
    let Some(s) = raw.as_str() else {
        return Ok(None);
    };
    LanguageTag::parse(s)
        .map(|tag| Some(Value::Bcp47(tag)))
        .map_err(|e| malformed(Kind::Bcp47, s, e))
}

fn parse_non_negative_integer(raw: &Raw) -> Result<Option<Value>, DecodeError> {
    let Some(number) = raw.as_number() else {
        return Ok(None);
    };
    if let Some(n) = number.as_u64() {
        return Ok(Some(Value::NonNegativeInteger(n)));
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
            Ok(Some(Value::NonNegativeInteger(f as u64)))
        }
        _ => Err(malformed(
            Kind::NonNegativeInteger,
            &number.to_string(),
            "expected a non-negative integer",
        )),
    }
}

/// Returns true for a JSON-LD value object: `@value` plus at most
/// `@language`.
pub fn is_value_object(record: &Map<String, Raw>) -> bool {
    record.contains_key(VALUE_KEY)
        && record.keys().all(|k| k == VALUE_KEY || k == LANGUAGE_KEY)
}

fn parse_lang_string(raw: &Raw) -> Result<Option<Value>, DecodeError> {
    let record = match raw {
        Raw::String(s) => {
            return Ok(Some(Value::LangString(LangString {
                value: s.clone(),
                language: None,
            })));
        }
        Raw::Object(record) if is_value_object(record) => record,
        _ => return Ok(None),
    };
    let Some(value) = record.get(VALUE_KEY).and_then(Raw::as_str) else {
        return Ok(None);
    };
    let language = match record.get(LANGUAGE_KEY) {
        None | Some(Raw::Null) => None,
        Some(Raw::String(tag)) => Some(
            LanguageTag::parse(tag).map_err(|e| malformed(Kind::LangString, tag, e))?,
        ),
        Some(other) => {
            return Err(malformed(
                Kind::LangString,
                &other.to_string(),
                "@language must be a string",
            ));
        }
    };
    Ok(Some(Value::LangString(LangString {
        value: value.to_string(),
        language,
    })))
}

// =============================================================================
// ENCODING
// =============================================================================

/// Returns `f` as an `i64` when it is finite, integral and in range.
pub fn integral_value(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Formats a float as a JSON number, integral values without a fraction.
pub fn float_to_number(f: f64) -> Result<Number, EncodeError> {
    if let Some(i) = integral_value(f) {
        return Ok(Number::from(i));
    }
    Number::from_f64(f).ok_or(EncodeError::NonFiniteFloat { value: f })
}

/// Formats a primitive value. Entity and unknown values yield `None`.
pub fn format_primitive(value: &Value) -> Result<Option<Raw>, EncodeError> {
    let raw = match value {
        Value::Iri(iri) => Raw::String(iri.as_str().to_string()),
        Value::DateTime(dt) => Raw::String(dt.to_string()),
        Value::Duration(d) => Raw::String(d.to_string()),
        Value::Boolean(b) => Raw::Bool(*b),
        Value::Float(f) => Raw::Number(float_to_number(*f)?),
        Value::String(s) => Raw::String(s.clone()),
        Value::LangString(ls) => format_lang_string(ls),
        Value::MimeType(m) => Raw::String(m.as_str().to_string()),
        Value::NonNegativeInteger(n) => Raw::Number(Number::from(*n)),
        Value::Bcp47(tag) => Raw::String(tag.as_str().to_string()),
        Value::Object(_)
        | Value::Link(_)
        | Value::Image(_)
        | Value::Collection(_)
        | Value::OrderedCollection(_)
        | Value::Unknown(_) => return Ok(None),
    };
    Ok(Some(raw))
}

fn format_lang_string(ls: &LangString) -> Raw {
    let mut record = Map::new();
    record.insert(VALUE_KEY.to_string(), Raw::String(ls.value.clone()));
    if let Some(tag) = &ls.language {
        record.insert(LANGUAGE_KEY.to_string(), Raw::String(tag.as_str().to_string()));
    }
    Raw::Object(record)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_shape_mismatch_is_not_an_error() {
        assert_eq!(parse_primitive(Kind::Iri, &json!(5)).unwrap(), None);
        assert_eq!(parse_primitive(Kind::DateTime, &json!(true)).unwrap(), None);
        assert_eq!(parse_primitive(Kind::Boolean, &json!("true")).unwrap(), None);
        assert_eq!(parse_primitive(Kind::Float, &Raw::Null).unwrap(), None);
        assert_eq!(parse_primitive(Kind::Object, &json!({"type": "Note"})).unwrap(), None);
    }

    #[test]
    fn test_malformed_content_is_an_error() {
        let err = parse_primitive(Kind::Iri, &json!("not a uri")).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPrimitive { kind: Kind::Iri, .. }));

        let err = parse_primitive(Kind::DateTime, &json!("yesterday")).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPrimitive { kind: Kind::DateTime, .. }));

        assert!(parse_primitive(Kind::NonNegativeInteger, &json!(-3)).is_err());
        assert!(parse_primitive(Kind::NonNegativeInteger, &json!(2.5)).is_err());
        assert!(parse_primitive(Kind::Bcp47, &json!("en_US")).is_err());
        assert!(parse_primitive(Kind::MimeType, &json!("html")).is_err());
    }

    #[test]
    fn test_lang_string_value_object() {
        let v = parse_primitive(Kind::LangString, &json!({"@value": "hola", "@language": "es"}))
            .unwrap()
            .unwrap();
        let Value::LangString(ls) = &v else {
            panic!("expected langString, got {:?}", v);
        };
        assert_eq!(ls.value, "hola");
        assert_eq!(ls.language.as_ref().map(LanguageTag::as_str), Some("es"));
        assert_eq!(
            format_primitive(&v).unwrap(),
            Some(json!({"@value": "hola", "@language": "es"}))
        );

        assert!(parse_primitive(Kind::LangString, &json!({"@value": "x", "@language": "???"})).is_err());
        assert_eq!(
            parse_primitive(Kind::LangString, &json!({"@value": "x", "other": 1})).unwrap(),
            None
        );
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(float_to_number(3.0).unwrap(), Number::from(3));
        assert_eq!(float_to_number(-0.0).unwrap(), Number::from(0));
        assert_eq!(float_to_number(2.5).unwrap().as_f64(), Some(2.5));
        assert_eq!(float_to_number(1e300).unwrap().as_f64(), Some(1e300));
        assert!(matches!(
            float_to_number(f64::NAN),
            Err(EncodeError::NonFiniteFloat { .. })
        ));
        assert!(float_to_number(f64::INFINITY).is_err());
    }

    #[test]
    fn test_non_negative_integer() {
        assert_eq!(
            parse_primitive(Kind::NonNegativeInteger, &json!(42)).unwrap(),
            Some(Value::NonNegativeInteger(42))
        );
        assert_eq!(
            parse_primitive(Kind::NonNegativeInteger, &json!(7.0)).unwrap(),
            Some(Value::NonNegativeInteger(7))
        );
    }
}

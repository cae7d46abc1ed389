//! Wire-contract tests: how records decode, what they encode back to, and
//! what survives a round trip.

use std::sync::Arc;

use activity_ld::{
    default_codec, Codec, DecodeError, EncodeOptions, Entity, ErrorCode, Kind, Raw, TypeSchema,
    Value,
};
use serde_json::{json, Map};

fn record(raw: Raw) -> Map<String, Raw> {
    match raw {
        Raw::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

fn schema(codec: &Codec, name: &str) -> Arc<TypeSchema> {
    codec.registry().schema(name).unwrap()
}

fn round_trip(codec: &Codec, raw: Raw) -> Raw {
    let entity = codec.resolve(&raw).unwrap();
    Raw::Object(codec.serialize(&entity).unwrap())
}

// =============================================================================
// Worked scenarios
// =============================================================================

#[test]
fn test_question_with_content_to_and_id() {
    let codec = default_codec();
    let input = json!({
        "content": "hello",
        "to": ["https://ex/alice", "https://ex/bob"],
        "id": "https://ex/q/1"
    });
    let question = codec
        .deserialize(schema(&codec, "Question"), &record(input.clone()))
        .unwrap();

    assert_eq!(question.id().unwrap().as_str(), "https://ex/q/1");
    assert_eq!(question.get("content"), Some(&Value::from("hello")));
    let to: Vec<&str> = question
        .non_functional("to")
        .unwrap()
        .iter()
        .map(|value| {
            assert_eq!(value.kind(), Kind::Iri);
            value.as_iri().unwrap().as_str()
        })
        .collect();
    assert_eq!(to, ["https://ex/alice", "https://ex/bob"]);
    assert!(question.unknown().is_empty());

    let mut expected = record(input);
    expected.insert("type".to_string(), json!("Question"));
    let out = codec.serialize(&question).unwrap();
    assert_eq!(out, expected);
    assert_eq!(out["to"], json!(["https://ex/alice", "https://ex/bob"]));
}

#[test]
fn test_closed_true_is_boolean() {
    let codec = default_codec();
    let question = codec
        .deserialize(schema(&codec, "Question"), &record(json!({"closed": true})))
        .unwrap();

    assert_eq!(question.get("closed"), Some(&Value::Boolean(true)));
    assert!(!question.has_unknown("closed"));
    assert!(question.unknown().is_empty());
}

#[test]
fn test_unregistered_type_in_one_of_is_preserved() {
    let codec = default_codec();
    let input = json!({"type": "Question", "oneOf": {"type": "NoSuchType", "foo": 1}});
    let question = codec.resolve(&input).unwrap();

    let one_of = question.non_functional("oneOf").unwrap();
    assert_eq!(one_of.len(), 1);
    assert_eq!(
        one_of.get(0),
        Some(&Value::Unknown(json!({"type": "NoSuchType", "foo": 1})))
    );
    assert!(question.has_unknown("oneOf"));
    assert!(question.unknown().is_empty());

    assert_eq!(round_trip(&codec, input.clone()), input);
}

// =============================================================================
// Type tokens
// =============================================================================

#[test]
fn test_canonical_type_is_appended() {
    let codec = default_codec();
    let mut question = Entity::new(schema(&codec, "Question"));
    question.push_type("ex:Poll");

    let out = codec.serialize(&question).unwrap();
    assert_eq!(out["type"], json!(["ex:Poll", "Question"]));
}

#[test]
fn test_canonical_type_is_not_duplicated() {
    let codec = default_codec();
    let input = json!({"type": ["Question", "ex:Poll"]});
    assert_eq!(round_trip(&codec, input.clone()), input);

    let input = json!({"type": ["ex:Poll", "Question"]});
    assert_eq!(round_trip(&codec, input.clone()), input);
}

#[test]
fn test_first_registered_token_picks_the_type() {
    let codec = default_codec();
    let entity = codec.resolve(&json!({"type": ["ex:Poll", "Question", "Note"]})).unwrap();
    assert_eq!(entity.type_name(), "Question");
    assert!(entity.is_a("ex:Poll"));
}

// =============================================================================
// Multiplicity
// =============================================================================

#[test]
fn test_compaction_symmetry() {
    let codec = default_codec();
    let mut note = Entity::new(schema(&codec, "Note"));

    let out = codec.serialize(&note).unwrap();
    assert!(!out.contains_key("to"));

    note.non_functional_mut("to")
        .unwrap()
        .append(Value::iri("https://ex/a").unwrap())
        .unwrap();
    let out = codec.serialize(&note).unwrap();
    assert_eq!(out["to"], json!("https://ex/a"));

    note.non_functional_mut("to")
        .unwrap()
        .append(Value::iri("https://ex/b").unwrap())
        .unwrap();
    let out = codec.serialize(&note).unwrap();
    assert_eq!(out["to"], json!(["https://ex/a", "https://ex/b"]));

    let back = codec.deserialize(schema(&codec, "Note"), &out).unwrap();
    assert_eq!(back.non_functional("to").unwrap().len(), 2);

    let single = codec
        .deserialize(schema(&codec, "Note"), &record(json!({"to": "https://ex/a"})))
        .unwrap();
    assert_eq!(single.non_functional("to").unwrap().len(), 1);
}

#[test]
fn test_removing_last_element_omits_key() {
    let codec = default_codec();
    let mut note = codec
        .resolve(&json!({"type": "Note", "to": ["https://ex/a"]}))
        .unwrap();
    note.non_functional_mut("to").unwrap().remove(0).unwrap();

    assert!(!note.has_unknown("to"));
    let out = codec.serialize(&note).unwrap();
    assert!(!out.contains_key("to"));
}

#[test]
fn test_functional_property_given_array_is_unknown() {
    let codec = default_codec();
    let input = json!({"type": "Note", "published": ["2020-01-01T00:00:00Z"]});
    let note = codec.resolve(&input).unwrap();
    assert!(note.has_unknown("published"));
    assert_eq!(round_trip(&codec, input.clone()), input);
}

#[test]
fn test_mixed_array_resolves_each_element() {
    let codec = default_codec();
    let note = codec
        .resolve(&json!({
            "type": "Note",
            "to": [
                "https://ex/a",
                {"type": "Person", "id": "https://ex/b"},
                {"type": "Mention", "href": "https://ex/c"},
                42
            ]
        }))
        .unwrap();
    let kinds: Vec<Kind> = note.non_functional("to").unwrap().iter().map(Value::kind).collect();
    assert_eq!(kinds, [Kind::Iri, Kind::Object, Kind::Link, Kind::Unknown]);
    assert_eq!(
        note.non_functional("to").unwrap().get(1).unwrap().reference().unwrap().as_str(),
        "https://ex/b"
    );
}

// =============================================================================
// Kind resolution
// =============================================================================

#[test]
fn test_kind_priority_is_deterministic() {
    let codec = default_codec();
    let closed = |raw: Raw| {
        let question = codec.resolve(&json!({"type": "Question", "closed": raw})).unwrap();
        question.get("closed").unwrap().kind()
    };

    assert_eq!(closed(json!("2021-06-01T12:00:00+02:00")), Kind::DateTime);
    assert_eq!(closed(json!(false)), Kind::Boolean);
    assert_eq!(closed(json!({"type": "Note"})), Kind::Object);
    assert_eq!(closed(json!({"type": "Mention", "href": "https://ex/m"})), Kind::Link);
    assert_eq!(closed(json!("https://ex/closer")), Kind::Iri);
    assert_eq!(closed(json!(3.5)), Kind::Unknown);
}

#[test]
fn test_iri_only_property_rejects_malformed_iri() {
    let codec = default_codec();
    let err = codec.resolve(&json!({"type": "Note", "id": "not a uri"})).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MalformedPrimitive);
    assert_eq!(err.path(), "id");
    assert!(matches!(
        err.root(),
        DecodeError::MalformedPrimitive { kind: Kind::Iri, .. }
    ));

    let err = codec
        .resolve(&json!({"type": "Note", "published": "last tuesday"}))
        .unwrap_err();
    assert_eq!(err.path(), "published");
}

#[test]
fn test_malformed_content_in_multi_kind_property_is_kept() {
    let codec = default_codec();

    let input = json!({"type": "Note", "to": ["https://ex/a", "Public"]});
    let note = codec.resolve(&input).unwrap();
    let kinds: Vec<Kind> = note.non_functional("to").unwrap().iter().map(Value::kind).collect();
    assert_eq!(kinds, [Kind::Iri, Kind::Unknown]);
    assert!(note.has_unknown("to"));
    assert_eq!(round_trip(&codec, input.clone()), input);

    let input = json!({"type": "Question", "closed": "neither"});
    let question = codec.resolve(&input).unwrap();
    assert_eq!(question.get("closed"), Some(&Value::Unknown(json!("neither"))));
    assert_eq!(round_trip(&codec, input.clone()), input);
}

#[test]
fn test_lang_string_value_object() {
    let codec = default_codec();
    let input = json!({"type": "Note", "content": {"@value": "hola", "@language": "es"}});
    let note = codec.resolve(&input).unwrap();
    let Some(Value::LangString(text)) = note.get("content") else {
        panic!("expected a langString");
    };
    assert_eq!(text.value, "hola");
    assert_eq!(text.language.as_ref().unwrap().as_str(), "es");
    assert_eq!(round_trip(&codec, input.clone()), input);
}

#[test]
fn test_nested_entities_round_trip() {
    let codec = default_codec();
    let input = json!({
        "type": "Create",
        "actor": {"type": "Person", "id": "https://ex/alice", "preferredUsername": "alice"},
        "object": {
            "type": "Note",
            "content": "hello",
            "published": "2024-03-01T10:00:00.5Z",
            "attachment": {"type": "Image", "url": "https://ex/cat.png", "mediaType": "image/png"}
        }
    });
    let create = codec.resolve(&input).unwrap();
    let object = create.get("object").unwrap();
    assert_eq!(object.kind(), Kind::Object);
    let note = object.as_entity().unwrap();
    assert_eq!(note.type_name(), "Note");
    assert_eq!(note.get("attachment").unwrap().as_entity().unwrap().type_name(), "Image");

    assert_eq!(round_trip(&codec, input.clone()), input);
}

// =============================================================================
// Unknown preservation
// =============================================================================

#[test]
fn test_unknown_keys_survive() {
    let codec = default_codec();
    let input = json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Note",
        "ext:rating": {"stars": 4.0, "tags": ["a", {"b": null}]},
        "ext:flag": true
    });
    let out = round_trip(&codec, input);
    assert_eq!(
        out,
        json!({
            "type": "Note",
            "ext:rating": {"stars": 4, "tags": ["a", {"b": null}]},
            "ext:flag": true
        })
    );
}

#[test]
fn test_language_map_without_companion() {
    let codec = default_codec();
    let input = json!({"type": "Note", "nameMap": {"en": "Cat", "de": "Katze"}});
    let note = codec.resolve(&input).unwrap();
    assert!(note.get("name").is_none());
    assert_eq!(note.language_map("name").unwrap().get("de"), Some("Katze"));
    assert_eq!(round_trip(&codec, input.clone()), input);
}

#[test]
fn test_canonical_output_is_byte_stable() {
    let codec = default_codec().with_encode_options(EncodeOptions::canonical());
    let a = codec
        .deserialize_document(r#"{"type":"Note","z":1,"a":{"y":[1,2],"x":0}}"#)
        .unwrap();
    let b = codec
        .deserialize_document(r#"{"a":{"x":0,"y":[1,2]},"type":"Note","z":1}"#)
        .unwrap();
    assert_eq!(
        codec.serialize_document(&a).unwrap(),
        codec.serialize_document(&b).unwrap()
    );
}

#[test]
fn test_document_errors() {
    let codec = default_codec();
    let err = codec.deserialize_document("{not json").unwrap_err();
    assert!(matches!(err, DecodeError::Json(_)));
    assert_eq!(err.code(), ErrorCode::MalformedDocument);

    let err = codec.deserialize_document("\"Note\"").unwrap_err();
    assert!(matches!(err, DecodeError::NotARecord { found: "a string" }));
}

#[test]
fn test_non_finite_float_fails_to_encode() {
    let codec = default_codec();
    let schema = TypeSchema::builder("Measure")
        .capability(Kind::Object)
        .functional("value", vec![Kind::Float])
        .build()
        .unwrap();
    let mut entity = Entity::new(Arc::new(schema));
    entity.add("value", Value::Float(f64::INFINITY)).unwrap();
    let err = codec.serialize(&entity).unwrap_err();
    assert_eq!(err.to_string(), "in `value`: float value inf has no JSON representation");
}

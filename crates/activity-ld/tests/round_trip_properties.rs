//! Property-based tests for the entity codec.
//!
//! Entities are generated through the public mutation API, serialized, and
//! fed back through the decoder.

use activity_ld::{default_codec, Entity, Raw, Value};
use proptest::prelude::*;
use serde_json::Number;

// =============================================================================
// Strategies
// =============================================================================

fn iri() -> impl Strategy<Value = Value> {
    "https://example\\.com/[a-z0-9]{1,12}".prop_map(|s| Value::iri(&s).unwrap())
}

fn raw_json() -> impl Strategy<Value = Raw> {
    let leaf = prop_oneof![
        Just(Raw::Null),
        any::<bool>().prop_map(Raw::Bool),
        any::<i64>().prop_map(|n| Raw::Number(n.into())),
        // quarters print and parse back exactly
        (-4000i32..4000).prop_filter_map("finite", |n| Number::from_f64(f64::from(n) / 4.0).map(Raw::Number)),
        "[a-z ]{0,8}".prop_map(Raw::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Raw::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Raw::Object(m.into_iter().collect())),
        ]
    })
}

#[derive(Debug, Clone)]
struct NoteParts {
    to: Vec<Value>,
    content: Option<String>,
    names: Vec<(String, String)>,
    extensions: Vec<(String, Raw)>,
    closed: Option<bool>,
}

fn note_parts() -> impl Strategy<Value = NoteParts> {
    (
        prop::collection::vec(iri(), 0..5),
        prop::option::of("\\PC{0,16}"),
        prop::collection::vec(("[a-z]{2}", "\\PC{0,8}"), 0..3),
        prop::collection::vec(("ext:[a-z]{1,6}", raw_json()), 0..3),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(to, content, names, extensions, closed)| NoteParts {
            to,
            content,
            names,
            extensions,
            closed,
        })
}

fn build_question(parts: &NoteParts) -> Entity {
    let mut question = default_codec().registry().instantiate("Question").unwrap();
    for value in &parts.to {
        question.non_functional_mut("to").unwrap().append(value.clone()).unwrap();
    }
    if let Some(content) = &parts.content {
        question.add("content", Value::from(content.as_str())).unwrap();
    }
    for (tag, text) in &parts.names {
        question.language_map_mut("name").unwrap().insert(tag, text);
    }
    for (key, raw) in &parts.extensions {
        question.unknown_mut().insert(key, raw.clone());
    }
    if let Some(closed) = parts.closed {
        question.add("closed", Value::Boolean(closed)).unwrap();
    }
    question
}

// =============================================================================
// Round-trip Properties
// =============================================================================

proptest! {
    /// serialize . deserialize . serialize = serialize
    #[test]
    fn prop_round_trip_is_idempotent(parts in note_parts()) {
        let codec = default_codec();
        let first = codec.serialize(&build_question(&parts)).unwrap();
        let decoded = codec.resolve(&Raw::Object(first.clone())).unwrap();
        let second = codec.serialize(&decoded).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Element count of a non-functional property survives compaction.
    #[test]
    fn prop_compaction_preserves_length(parts in note_parts()) {
        let codec = default_codec();
        let out = codec.serialize(&build_question(&parts)).unwrap();
        match (parts.to.len(), out.get("to")) {
            (0, None) => {}
            (1, Some(Raw::String(_))) => {}
            (n, Some(Raw::Array(items))) => prop_assert_eq!(n, items.len()),
            (n, other) => prop_assert!(false, "{} elements encoded as {:?}", n, other),
        }

        let decoded = codec.resolve(&Raw::Object(out)).unwrap();
        prop_assert_eq!(decoded.non_functional("to").unwrap().len(), parts.to.len());
    }

    /// Extension keys come back with the same (normalized) values.
    #[test]
    fn prop_unknown_keys_are_preserved(parts in note_parts()) {
        let codec = default_codec();
        let out = codec.serialize(&build_question(&parts)).unwrap();
        let decoded = codec.resolve(&Raw::Object(out.clone())).unwrap();
        for (key, _) in &parts.extensions {
            prop_assert_eq!(decoded.unknown().get(key), out.get(key));
        }
    }

    /// Canonical documents are stable through a text round trip.
    #[test]
    fn prop_canonical_document_is_stable(parts in note_parts()) {
        let codec = default_codec()
            .with_encode_options(activity_ld::EncodeOptions::canonical());
        let text = codec.serialize_document(&build_question(&parts)).unwrap();
        let decoded = codec.deserialize_document(&text).unwrap();
        prop_assert_eq!(codec.serialize_document(&decoded).unwrap(), text);
    }
}

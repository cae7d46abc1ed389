//! Simple inspector for ActivityStreams JSON documents.

use std::fs;

use activity_ld::{default_codec, Entity, Slot, Value};

fn format_value(v: &Value) -> String {
    match v {
        Value::String(s) => {
            let preview: String = s.chars().take(80).collect();
            if s.chars().count() > 80 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Value::LangString(ls) => match &ls.language {
            Some(tag) => format!("\"{}\"@{}", ls.value, tag),
            None => format!("\"{}\"", ls.value),
        },
        Value::Iri(iri) => format!("<{}>", iri),
        Value::DateTime(dt) => format!("DATETIME({})", dt),
        Value::Duration(d) => format!("DURATION({})", d),
        Value::Boolean(b) => format!("{}", b),
        Value::Float(f) => format!("{:.6}", f),
        Value::MimeType(m) => format!("MIME({})", m),
        Value::NonNegativeInteger(n) => format!("{}", n),
        Value::Bcp47(tag) => format!("LANG({})", tag),
        Value::Unknown(raw) => format!("UNKNOWN({})", raw),
        other => {
            let entity = other.as_entity().map(Entity::type_name).unwrap_or("?");
            match other.reference() {
                Some(id) => format!("{}({}) <{}>", other.kind(), entity, id),
                None => format!("{}({})", other.kind(), entity),
            }
        }
    }
}

fn print_entity(entity: &Entity, indent: usize) {
    let pad = "  ".repeat(indent);
    println!("{}{} types={:?}", pad, entity.type_name(), entity.types());

    for slot in entity.slots() {
        if slot.is_empty() {
            continue;
        }
        let name = slot.spec().name();
        let multiplicity = match slot {
            Slot::Functional(_) => "functional",
            Slot::NonFunctional(_) => "non-functional",
        };
        println!("{}  {} ({}, {} value(s))", pad, name, multiplicity, slot.len());
        for value in slot.values() {
            println!("{}    - {}", pad, format_value(value));
            if let Some(nested) = value.as_entity() {
                print_entity(nested, indent + 3);
            }
        }
        if let Some(map) = entity.language_map(name) {
            for (tag, text) in map.iter() {
                println!("{}    [{}] {}", pad, tag, text);
            }
        }
    }

    if !entity.unknown().is_empty() {
        println!("{}  unknown keys:", pad);
        for (key, raw) in entity.unknown().iter() {
            println!("{}    {} = {}", pad, key, raw);
        }
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "note.json".to_string());

    println!("Reading: {}", path);

    let data = fs::read_to_string(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let codec = default_codec();
    let entity = codec.deserialize_document(&data).expect("Failed to decode");

    println!("\n=== Entity ===");
    print_entity(&entity, 0);

    let unknown_slots = entity.slots().iter().filter(|slot| slot.has_unknown()).count();
    println!("\n=== Summary ===");
    println!("Declared properties set: {}", entity.slots().iter().filter(|s| !s.is_empty()).count());
    println!("Properties holding unknown values: {}", unknown_slots);
    println!("Unknown keys: {}", entity.unknown().len());

    let encoded = codec.serialize_document(&entity).expect("Failed to encode");
    println!("Re-encoded size: {} bytes", encoded.len());
}

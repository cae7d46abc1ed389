//! Benchmark for activity-ld decoding and encoding.
//!
//! Generates a corpus of Notes, Questions and Create activities with
//! nested objects and extension keys, then times each codec direction.

use std::time::Instant;

use activity_ld::{default_codec, EncodeOptions, Entity, Raw};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

const DEFAULT_DOCUMENTS: usize = 20_000;
const DECODE_ITERS: u32 = 5;

fn object_id(kind: &str) -> String {
    format!("https://social.example/{}/{}", kind, Uuid::now_v7())
}

fn note(i: usize) -> Raw {
    json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Note",
        "id": object_id("notes"),
        "attributedTo": object_id("users"),
        "content": format!("<p>Status update number {}</p>", i),
        "contentMap": {"en": format!("<p>Status update number {}</p>", i)},
        "published": "2024-05-01T12:30:00Z",
        "to": ["https://www.w3.org/ns/activitystreams#Public"],
        "cc": [object_id("users"), object_id("users")],
        "tag": [{"type": "Mention", "href": object_id("users"), "name": "@someone"}],
        "sensitive": false,
        "ext:client": {"name": "bench", "build": i}
    })
}

fn question(i: usize) -> Raw {
    let closed = if i % 2 == 0 {
        json!(true)
    } else {
        json!("2024-06-01T00:00:00+02:00")
    };
    json!({
        "type": "Question",
        "id": object_id("questions"),
        "content": format!("Poll {}?", i),
        "closed": closed,
        "oneOf": [
            {"type": "Note", "name": "yes", "replies": {"type": "Collection", "totalItems": i}},
            {"type": "Note", "name": "no", "replies": {"type": "Collection", "totalItems": 0}},
            {"type": "ext:Choice", "name": "maybe"}
        ]
    })
}

fn create(i: usize) -> Raw {
    json!({
        "type": "Create",
        "id": object_id("activities"),
        "actor": {"type": "Person", "id": object_id("users"), "preferredUsername": format!("user{}", i)},
        "object": note(i)
    })
}

fn corpus(size: usize) -> Vec<Raw> {
    (0..size)
        .map(|i| match i % 3 {
            0 => note(i),
            1 => question(i),
            _ => create(i),
        })
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let size = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_DOCUMENTS);

    let generate_start = Instant::now();
    let documents = corpus(size);
    let texts: Vec<String> = documents.iter().map(Raw::to_string).collect();
    let generate_time = generate_start.elapsed();
    let total_bytes: usize = texts.iter().map(String::len).sum();

    info!(documents = documents.len(), bytes = total_bytes, "corpus generated");
    println!(
        "Generated {} documents ({} bytes) in {:?}",
        documents.len(),
        total_bytes,
        generate_time
    );

    let codec = default_codec();

    // Benchmark decoding from parsed JSON
    let decode_start = Instant::now();
    let mut entities: Vec<Entity> = Vec::new();
    for _ in 0..DECODE_ITERS {
        entities = documents
            .iter()
            .map(|doc| codec.resolve(doc).expect("Failed to decode"))
            .collect();
    }
    let decode_time = decode_start.elapsed() / DECODE_ITERS;

    println!("\nDecode (resolve): {} entities in {:?}", entities.len(), decode_time);
    println!(
        "  Throughput: {:.2} MB/s",
        (total_bytes as f64 / 1_000_000.0) / decode_time.as_secs_f64()
    );

    // Benchmark decoding from text
    let text_start = Instant::now();
    for text in &texts {
        codec.deserialize_document(text).expect("Failed to decode document");
    }
    let text_time = text_start.elapsed();

    println!("\nDecode (text): {} documents in {:?}", texts.len(), text_time);
    println!(
        "  Throughput: {:.2} MB/s",
        (total_bytes as f64 / 1_000_000.0) / text_time.as_secs_f64()
    );

    // Benchmark encoding (fast mode)
    let encode_start = Instant::now();
    let encoded: Vec<String> = entities
        .iter()
        .map(|entity| codec.serialize_document(entity).expect("Failed to encode"))
        .collect();
    let encode_time = encode_start.elapsed();
    let encoded_bytes: usize = encoded.iter().map(String::len).sum();

    println!("\nEncode (fast): {} bytes in {:?}", encoded_bytes, encode_time);
    println!(
        "  Throughput: {:.2} MB/s",
        (encoded_bytes as f64 / 1_000_000.0) / encode_time.as_secs_f64()
    );

    // Benchmark encoding (canonical mode)
    let canonical = codec.clone().with_encode_options(EncodeOptions::canonical());
    let canonical_start = Instant::now();
    let canonical_encoded: Vec<String> = entities
        .iter()
        .map(|entity| canonical.serialize_document(entity).expect("Failed to encode canonical"))
        .collect();
    let canonical_time = canonical_start.elapsed();

    println!(
        "\nEncode (canonical): {} documents in {:?}",
        canonical_encoded.len(),
        canonical_time
    );
    println!(
        "  Overhead vs fast: {:.1}x slower",
        canonical_time.as_secs_f64() / encode_time.as_secs_f64()
    );

    // Verify canonical encoding survives a decode/encode cycle unchanged
    let stable = canonical_encoded.iter().all(|text| {
        let entity = canonical.deserialize_document(text).expect("Failed to re-decode");
        canonical.serialize_document(&entity).expect("Failed to re-encode") == *text
    });
    println!("  Stable through round trip: {}", stable);

    let unknown_values: usize = entities
        .iter()
        .flat_map(|entity| entity.slots())
        .filter(|slot| slot.has_unknown())
        .count();

    println!("\n=== Summary ===");
    println!("Documents: {}", documents.len());
    println!("Input size: {} bytes", total_bytes);
    println!("Output size: {} bytes", encoded_bytes);
    println!("Slots holding unknown values: {}", unknown_values);
    println!("Decode: {:?} per pass", decode_time);
    println!("Encode: {:?}", encode_time);
}

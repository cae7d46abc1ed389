//! Normalization of uninterpreted wire data.

use serde_json::{Map, Number};

use crate::codec::primitives::integral_value;
use crate::model::Raw;

/// Canonicalizes leaf shapes of `raw` in place.
///
/// Floats with an integral value in `i64` range become integers; in
/// `canonical` mode object keys are also sorted. Walks with an explicit
/// stack, so arbitrarily deep input cannot overflow. Idempotent.
pub fn normalize_raw(raw: &mut Raw, canonical: bool) {
    let mut stack: Vec<&mut Raw> = vec![raw];
    while let Some(current) = stack.pop() {
        match current {
            Raw::Array(items) => stack.extend(items.iter_mut()),
            Raw::Object(map) => {
                if canonical {
                    sort_keys(map);
                }
                stack.extend(map.values_mut());
            }
            Raw::Number(n) => normalize_number(n),
            Raw::Null | Raw::Bool(_) | Raw::String(_) => {}
        }
    }
}

fn normalize_number(n: &mut Number) {
    if n.is_f64() {
        if let Some(i) = n.as_f64().and_then(integral_value) {
            *n = Number::from(i);
        }
    }
}

/// A container being copied: the children still to visit and the copies
/// made so far.
enum Frame<'r> {
    Array {
        items: std::slice::Iter<'r, Raw>,
        out: Vec<Raw>,
    },
    Object {
        entries: serde_json::map::Iter<'r>,
        key: Option<String>,
        out: Map<String, Raw>,
    },
}

impl Frame<'_> {
    fn close(self, canonical: bool) -> Raw {
        match self {
            Frame::Array { out, .. } => Raw::Array(out),
            Frame::Object { mut out, .. } => {
                if canonical {
                    sort_keys(&mut out);
                }
                Raw::Object(out)
            }
        }
    }
}

/// Starts copying `raw`: containers push a frame, leaves are copied at once.
fn open<'r>(raw: &'r Raw, stack: &mut Vec<Frame<'r>>) -> Option<Raw> {
    match raw {
        Raw::Array(items) => {
            stack.push(Frame::Array {
                items: items.iter(),
                out: Vec::with_capacity(items.len()),
            });
            None
        }
        Raw::Object(map) => {
            stack.push(Frame::Object {
                entries: map.iter(),
                key: None,
                out: Map::new(),
            });
            None
        }
        Raw::Number(n) => {
            let mut n = n.clone();
            normalize_number(&mut n);
            Some(Raw::Number(n))
        }
        leaf => Some(leaf.clone()),
    }
}

/// Returns a normalized copy of `raw`.
///
/// Equivalent to cloning and calling [`normalize_raw`], but never recurses,
/// so it is safe on arbitrarily deep input.
pub fn normalized(raw: &Raw, canonical: bool) -> Raw {
    let mut stack = Vec::new();
    let mut finished = open(raw, &mut stack);
    loop {
        let child = match stack.last_mut() {
            None => return finished.unwrap_or_default(),
            Some(Frame::Array { items, out }) => {
                out.extend(finished.take());
                items.next()
            }
            Some(Frame::Object { entries, key, out }) => {
                if let (Some(key), Some(value)) = (key.take(), finished.take()) {
                    out.insert(key, value);
                }
                entries.next().map(|(name, value)| {
                    *key = Some(name.clone());
                    value
                })
            }
        };
        match child {
            Some(child) => finished = open(child, &mut stack),
            None => finished = stack.pop().map(|frame| frame.close(canonical)),
        }
    }
}

pub(crate) fn sort_keys(map: &mut serde_json::Map<String, Raw>) {
    let mut entries: Vec<(String, Raw)> = std::mem::take(map).into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    map.extend(entries);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_integral_floats_become_integers() {
        let mut raw = json!({"a": 1.0, "b": [2.5, -3.0, {"c": 1e20}], "d": "1.0"});
        normalize_raw(&mut raw, false);
        assert_eq!(raw["a"], json!(1));
        assert!(raw["a"].is_i64());
        assert_eq!(raw["b"][0], json!(2.5));
        assert!(raw["b"][1].is_i64());
        // 1e20 is outside i64
        assert!(raw["b"][2]["c"].is_f64());
        assert_eq!(raw["d"], json!("1.0"));
    }

    #[test]
    fn test_idempotent() {
        let mut once = json!({"z": [1.0, {"y": 2.0, "x": null}], "a": true});
        normalize_raw(&mut once, true);
        let mut twice = once.clone();
        normalize_raw(&mut twice, true);
        assert_eq!(serde_json::to_string(&once).unwrap(), serde_json::to_string(&twice).unwrap());
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let mut raw = json!({"b": {"z": 1, "a": 2}, "a": 0});
        normalize_raw(&mut raw, true);
        assert_eq!(serde_json::to_string(&raw).unwrap(), r#"{"a":0,"b":{"a":2,"z":1}}"#);
    }

    fn nest(depth: usize) -> Raw {
        let mut raw = json!(1.0);
        for _ in 0..depth {
            raw = Raw::Array(vec![raw]);
        }
        raw
    }

    fn depth_of(raw: &Raw) -> (usize, &Raw) {
        let mut depth = 0;
        let mut current = raw;
        while let Raw::Array(items) = current {
            depth += 1;
            current = &items[0];
        }
        (depth, current)
    }

    // serde_json's Drop recurses, so deep values are taken apart by hand.
    fn dismantle(raw: Raw) {
        let mut pending = vec![raw];
        while let Some(mut v) = pending.pop() {
            match &mut v {
                Raw::Array(items) => pending.append(items),
                Raw::Object(map) => pending.extend(std::mem::take(map).into_iter().map(|(_, v)| v)),
                _ => {}
            }
        }
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut raw = nest(100_000);
        normalize_raw(&mut raw, false);
        let (depth, leaf) = depth_of(&raw);
        assert_eq!(depth, 100_000);
        assert!(leaf.is_i64());
        dismantle(raw);
    }

    #[test]
    fn test_normalized_copy_does_not_recurse() {
        let raw = nest(200_000);
        let copy = normalized(&raw, true);
        let (depth, leaf) = depth_of(&copy);
        assert_eq!(depth, 200_000);
        assert!(leaf.is_i64());
        dismantle(copy);
        dismantle(raw);

        let mut deep_object = json!("leaf");
        for _ in 0..100_000 {
            let mut map = Map::new();
            map.insert("z".to_string(), Raw::Null);
            map.insert("k".to_string(), deep_object);
            deep_object = Raw::Object(map);
        }
        let copy = normalized(&deep_object, true);
        let Raw::Object(top) = &copy else {
            panic!("expected an object");
        };
        assert_eq!(top.keys().collect::<Vec<_>>(), ["k", "z"]);
        dismantle(copy);
        dismantle(deep_object);
    }

    #[test]
    fn test_normalized_matches_in_place() {
        let raw = json!({"b": [1.0, {"y": 2.5, "x": [3.0]}], "a": "s", "c": null});
        for canonical in [false, true] {
            let mut in_place = raw.clone();
            normalize_raw(&mut in_place, canonical);
            let copy = normalized(&raw, canonical);
            assert_eq!(
                serde_json::to_string(&copy).unwrap(),
                serde_json::to_string(&in_place).unwrap()
            );
        }
    }

    #[test]
    fn test_deep_unknown_value_survives_decode() {
        let codec = crate::vocab::default_codec();
        let schema = codec.registry().schema("Note").unwrap();
        let mut record = Map::new();
        record.insert("ext:deep".to_string(), nest(200_000));

        let mut note = codec.deserialize(schema, &record).unwrap();
        let kept = note.unknown_mut().remove("ext:deep").unwrap();
        let (depth, leaf) = depth_of(&kept);
        assert_eq!(depth, 200_000);
        assert!(leaf.is_i64());

        dismantle(kept);
        if let Some(raw) = record.shift_remove("ext:deep") {
            dismantle(raw);
        }
    }
}

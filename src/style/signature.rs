use serde::Serialize;
use serde_json::{Map, Value};

use crate::style::style_model::StyleProperties;

/// Separator between tagged parts of a signature.
pub const SIGNATURE_SEPARATOR: &str = "|";

/// Canonical key for "same visual style".
///
/// Only fills, strokes, stroke weight, corner radius and effects take part, so
/// layout or spacing differences never split a style group. Parts are emitted
/// in a fixed order (fills, strokes, `sw`, `cr`, effects); object keys inside
/// each part are sorted.
pub fn style_signature(style: &StyleProperties) -> String {
    let mut parts: Vec<String> = Vec::new();

    for fill in &style.fills {
        parts.push(format!("fill:{}", canonical_json(fill)));
    }
    for stroke in &style.strokes {
        parts.push(format!("stroke:{}", canonical_json(stroke)));
    }
    parts.push(format!("sw:{}", style.stroke_weight));
    parts.push(format!("cr:{}", canonical_json(&style.corner_radius)));
    for effect in &style.effects {
        parts.push(format!("effect:{}", canonical_json(effect)));
    }

    parts.join(SIGNATURE_SEPARATOR)
}

/// JSON with object keys sorted at every level.
pub fn canonical_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(v) => sort_keys(v).to_string(),
        // Plain data records; serialization cannot fail in practice.
        Err(_) => String::from("null"),
    }
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

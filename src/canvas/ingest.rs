//! Host JSON → typed `SceneNode`.
//!
//! Ingestion is field-tolerant: a malformed attribute is logged and defaulted,
//! it never rejects the node. Both the plugin-style export (`x`, `fontName`,
//! `paddingTop`, ...) and the REST-style export (`absoluteBoundingBox`,
//! `style.fontSize`, `rectangleCornerRadii`, ...) are understood.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::canvas::node::{
    ColorStop, CornerRadius, Corners, Effect, EffectKind, ExportFormat, ExportSetting, Geometry,
    GradientKind, LayoutProps, LineHeight, NodeKind, Padding, Paint, Position, Rgba, RunValue,
    SceneNode, TextProps, VisualProps,
};

type Object = Map<String, Value>;

/// Ingest one node and its subtree. Returns `None` only when `value` is not a
/// JSON object at all.
pub fn ingest_node(value: &Value) -> Option<SceneNode> {
    let Some(obj) = value.as_object() else {
        warn!("skipping node entry that is not an object");
        return None;
    };

    let id = string(obj, "id").unwrap_or_default();
    let name = string(obj, "name").unwrap_or_default();
    let tag = string(obj, "type").unwrap_or_else(|| "UNKNOWN".to_string());

    let children = obj
        .get("children")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(ingest_node).collect())
        .unwrap_or_default();

    Some(SceneNode {
        kind: ingest_kind(&tag, obj, &id),
        geometry: ingest_geometry(obj, &id),
        visible: obj.get("visible").and_then(Value::as_bool).unwrap_or(true),
        visual: ingest_visual(obj, &id),
        export_settings: ingest_export_settings(obj, &id),
        children,
        id,
        name,
    })
}

fn ingest_kind(tag: &str, obj: &Object, id: &str) -> NodeKind {
    match tag {
        "FRAME" => NodeKind::Frame(ingest_layout(obj, id)),
        "COMPONENT" => NodeKind::Component(ingest_layout(obj, id)),
        "COMPONENT_SET" => NodeKind::ComponentSet(ingest_layout(obj, id)),
        "INSTANCE" => NodeKind::Instance(ingest_layout(obj, id)),
        "GROUP" => NodeKind::Group,
        "SECTION" => NodeKind::Section,
        "BOOLEAN_OPERATION" => NodeKind::BooleanOperation,
        "TEXT" => NodeKind::Text(ingest_text(obj, id)),
        "VECTOR" => NodeKind::Vector,
        "RECTANGLE" => NodeKind::Rectangle,
        "ELLIPSE" => NodeKind::Ellipse,
        "LINE" => NodeKind::Line,
        "STAR" => NodeKind::Star,
        "POLYGON" | "REGULAR_POLYGON" => NodeKind::Polygon,
        "IMAGE" => NodeKind::Image,
        "SHAPE_WITH_TEXT" => NodeKind::ShapeWithText,
        other => NodeKind::Other(other.to_string()),
    }
}

// ============================================================================
// Geometry
// ============================================================================

fn ingest_geometry(obj: &Object, id: &str) -> Geometry {
    let bbox = obj.get("absoluteBoundingBox").and_then(Value::as_object);
    let read = |key: &str| {
        number(obj, key, id)
            .or_else(|| bbox.and_then(|b| number(b, key, id)))
            .unwrap_or(0.0)
    };

    Geometry {
        x: read("x"),
        y: read("y"),
        width: read("width"),
        height: read("height"),
    }
}

// ============================================================================
// Visual capability
// ============================================================================

fn ingest_visual(obj: &Object, id: &str) -> VisualProps {
    VisualProps {
        fills: paints(obj, "fills", id),
        strokes: paints(obj, "strokes", id),
        stroke_weight: number(obj, "strokeWeight", id),
        corner_radius: ingest_corner_radius(obj, id),
        opacity: number(obj, "opacity", id),
        effects: ingest_effects(obj, id),
    }
}

fn paints(obj: &Object, key: &str, id: &str) -> Vec<Paint> {
    match obj.get(key) {
        None | Some(Value::Null) => vec![],
        Some(Value::Array(items)) => items.iter().filter_map(|p| ingest_paint(p, id)).collect(),
        Some(_) => {
            // Mixed paints on text ranges land here too.
            warn!(node = id, field = key, "paint list is not an array, ignoring");
            vec![]
        }
    }
}

fn ingest_paint(value: &Value, id: &str) -> Option<Paint> {
    let obj = value.as_object()?;
    let Some(kind) = obj.get("type").and_then(Value::as_str) else {
        warn!(node = id, "paint without a type, ignoring");
        return None;
    };

    let paint = match kind {
        "SOLID" => Paint::Solid {
            color: color(obj.get("color"), id),
            opacity: number(obj, "opacity", id),
        },
        "GRADIENT_LINEAR" | "GRADIENT_RADIAL" | "GRADIENT_ANGULAR" | "GRADIENT_DIAMOND" => {
            let kind: GradientKind = parse_enum(&Value::String(kind.to_string()))?;
            let stops = obj
                .get("gradientStops")
                .and_then(Value::as_array)
                .map(|stops| {
                    stops
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|s| ColorStop {
                            position: number(s, "position", id).unwrap_or(0.0),
                            color: color(s.get("color"), id),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Paint::Gradient { kind, stops }
        }
        "IMAGE" => Paint::Image {
            scale_mode: string(obj, "scaleMode").unwrap_or_else(|| "FILL".to_string()),
        },
        other => Paint::Unsupported(other.to_string()),
    };

    Some(paint)
}

fn color(value: Option<&Value>, id: &str) -> Rgba {
    let Some(obj) = value.and_then(Value::as_object) else {
        if value.is_some() {
            warn!(node = id, "color is not an object, using black");
        }
        return Rgba::new(0.0, 0.0, 0.0, 1.0);
    };

    Rgba {
        r: number(obj, "r", id).unwrap_or(0.0),
        g: number(obj, "g", id).unwrap_or(0.0),
        b: number(obj, "b", id).unwrap_or(0.0),
        a: number(obj, "a", id).unwrap_or(1.0),
    }
}

fn ingest_corner_radius(obj: &Object, id: &str) -> Option<CornerRadius> {
    let uniform = obj.get("cornerRadius");
    if let Some(radius) = uniform.and_then(Value::as_f64) {
        return Some(CornerRadius::Uniform(radius));
    }

    if let Some(radii) = obj.get("rectangleCornerRadii").and_then(Value::as_array) {
        let at = |i: usize| radii.get(i).and_then(Value::as_f64).unwrap_or(0.0);
        return Some(CornerRadius::Individual(Corners {
            top_left: at(0),
            top_right: at(1),
            bottom_right: at(2),
            bottom_left: at(3),
        }));
    }

    let keys = [
        "topLeftRadius",
        "topRightRadius",
        "bottomRightRadius",
        "bottomLeftRadius",
    ];
    if keys.iter().any(|k| obj.contains_key(*k)) {
        let at = |k: &str| number(obj, k, id).unwrap_or(0.0);
        return Some(CornerRadius::Individual(Corners {
            top_left: at(keys[0]),
            top_right: at(keys[1]),
            bottom_right: at(keys[2]),
            bottom_left: at(keys[3]),
        }));
    }

    if let Some(value) = uniform {
        if !value.is_null() && !is_mixed(value) {
            warn!(node = id, "unreadable cornerRadius, ignoring");
        }
    }
    None
}

fn ingest_effects(obj: &Object, id: &str) -> Vec<Effect> {
    let Some(items) = obj.get("effects").and_then(Value::as_array) else {
        return vec![];
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|e| {
            let kind = match e.get("type").and_then(Value::as_str).unwrap_or("") {
                "DROP_SHADOW" => EffectKind::DropShadow,
                "INNER_SHADOW" => EffectKind::InnerShadow,
                "LAYER_BLUR" => EffectKind::LayerBlur,
                "BACKGROUND_BLUR" => EffectKind::BackgroundBlur,
                other => EffectKind::Other(other.to_string()),
            };

            let offset = e.get("offset").and_then(Value::as_object).map(|o| Position {
                x: number(o, "x", id).unwrap_or(0.0),
                y: number(o, "y", id).unwrap_or(0.0),
            });

            Effect {
                kind,
                visible: e.get("visible").and_then(Value::as_bool).unwrap_or(true),
                color: e.get("color").map(|c| color(Some(c), id)),
                offset,
                radius: number(e, "radius", id).unwrap_or(0.0),
                spread: number(e, "spread", id),
            }
        })
        .collect()
}

// ============================================================================
// Layout capability
// ============================================================================

fn ingest_layout(obj: &Object, id: &str) -> LayoutProps {
    LayoutProps {
        mode: read_enum(obj, "layoutMode", id).unwrap_or_default(),
        primary_align: read_enum(obj, "primaryAxisAlignItems", id).unwrap_or_default(),
        counter_align: read_enum(obj, "counterAxisAlignItems", id).unwrap_or_default(),
        padding: Padding {
            top: number(obj, "paddingTop", id).unwrap_or(0.0),
            right: number(obj, "paddingRight", id).unwrap_or(0.0),
            bottom: number(obj, "paddingBottom", id).unwrap_or(0.0),
            left: number(obj, "paddingLeft", id).unwrap_or(0.0),
        },
        item_spacing: number(obj, "itemSpacing", id).unwrap_or(0.0),
    }
}

// ============================================================================
// Text capability
// ============================================================================

fn ingest_text(obj: &Object, id: &str) -> TextProps {
    // REST exports keep typography under `style`.
    let style = obj.get("style").and_then(Value::as_object);
    let lookup = |key: &'static str, rest_key: &'static str| text_field(obj, style, key, rest_key);

    let font_family = match lookup("fontName", "fontFamily") {
        None | Some(Value::Null) => RunValue::Unset,
        Some(v) if is_mixed(v) => RunValue::Mixed,
        Some(Value::String(family)) => RunValue::Uniform(family.clone()),
        Some(Value::Object(font)) => match font.get("family").and_then(Value::as_str) {
            Some(family) => RunValue::Uniform(family.to_string()),
            None => {
                warn!(node = id, "fontName without family");
                RunValue::Unset
            }
        },
        Some(_) => {
            warn!(node = id, "unreadable fontName");
            RunValue::Unset
        }
    };

    let line_height = match lookup("lineHeight", "lineHeightPx") {
        None | Some(Value::Null) => RunValue::Unset,
        Some(v) if is_mixed(v) => RunValue::Mixed,
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|v| RunValue::Uniform(LineHeight::Pixels(v)))
            .unwrap_or_default(),
        Some(Value::Object(lh)) => {
            let value = number(lh, "value", id).unwrap_or(0.0);
            match lh.get("unit").and_then(Value::as_str) {
                Some("AUTO") => RunValue::Uniform(LineHeight::Auto),
                Some("PERCENT") => RunValue::Uniform(LineHeight::Percent(value)),
                Some("PIXELS") | None => RunValue::Uniform(LineHeight::Pixels(value)),
                Some(other) => {
                    warn!(node = id, unit = other, "unknown lineHeight unit");
                    RunValue::Unset
                }
            }
        }
        Some(_) => {
            warn!(node = id, "unreadable lineHeight");
            RunValue::Unset
        }
    };

    TextProps {
        characters: string(obj, "characters").unwrap_or_default(),
        font_family,
        font_weight: run_number(lookup("fontWeight", "fontWeight"), "fontWeight", id),
        font_size: run_number(lookup("fontSize", "fontSize"), "fontSize", id),
        line_height,
        letter_spacing: run_number(lookup("letterSpacing", "letterSpacing"), "letterSpacing", id),
        text_align: lookup("textAlignHorizontal", "textAlignHorizontal")
            .and_then(|v| enum_field(v, "textAlignHorizontal", id))
            .unwrap_or_default(),
    }
}

fn text_field<'a>(
    obj: &'a Object,
    style: Option<&'a Object>,
    key: &str,
    rest_key: &str,
) -> Option<&'a Value> {
    obj.get(key).or_else(|| style.and_then(|s| s.get(rest_key)))
}

fn run_number(value: Option<&Value>, field: &str, id: &str) -> RunValue<f64> {
    match value {
        None | Some(Value::Null) => RunValue::Unset,
        Some(v) if is_mixed(v) => RunValue::Mixed,
        Some(Value::Number(n)) => n.as_f64().map(RunValue::Uniform).unwrap_or_default(),
        // `{ value, unit }` as used by letterSpacing
        Some(Value::Object(o)) => match o.get("value").and_then(Value::as_f64) {
            Some(v) => RunValue::Uniform(v),
            None => {
                warn!(node = id, field, "object without numeric value");
                RunValue::Unset
            }
        },
        Some(_) => {
            warn!(node = id, field, "not a number");
            RunValue::Unset
        }
    }
}

// ============================================================================
// Export settings
// ============================================================================

fn ingest_export_settings(obj: &Object, id: &str) -> Vec<ExportSetting> {
    let Some(items) = obj.get("exportSettings").and_then(Value::as_array) else {
        return vec![];
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|s| {
            let format = s.get("format").and_then(Value::as_str)?;
            let format: ExportFormat =
                match parse_enum(&Value::String(format.to_lowercase())) {
                    Some(f) => f,
                    None => {
                        warn!(node = id, format, "unknown export format");
                        return None;
                    }
                };
            let scale = s
                .get("constraint")
                .and_then(Value::as_object)
                .filter(|c| c.get("type").and_then(Value::as_str) == Some("SCALE"))
                .and_then(|c| c.get("value").and_then(Value::as_f64))
                .unwrap_or(1.0);
            Some(ExportSetting { format, scale })
        })
        .collect()
}

// ============================================================================
// Field helpers
// ============================================================================

fn string(obj: &Object, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `None` when absent; logs when present but not a number.
fn number(obj: &Object, key: &str, id: &str) -> Option<f64> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(v) => {
            if !is_mixed(v) {
                warn!(node = id, field = key, "expected a number");
            }
            None
        }
    }
}

fn read_enum<T: DeserializeOwned>(obj: &Object, key: &str, id: &str) -> Option<T> {
    obj.get(key).and_then(|v| enum_field(v, key, id))
}

fn enum_field<T: DeserializeOwned>(value: &Value, key: &str, id: &str) -> Option<T> {
    let parsed = parse_enum(value);
    if parsed.is_none() {
        warn!(node = id, field = key, value = %value, "unknown value");
    }
    parsed
}

fn parse_enum<T: DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

/// The host's "mixed across runs" sentinel, exported as the string `"MIXED"`.
fn is_mixed(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.eq_ignore_ascii_case("mixed"))
}

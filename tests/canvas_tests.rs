use component_discovery::canvas::document::Canvas;
use component_discovery::canvas::node::{
    CornerRadius, EffectKind, ExportFormat, LayoutMode, LineHeight, NodeKind, Paint, RunValue,
};
use serde_json::json;

// ============================================================================
// Document shapes
// ============================================================================

#[test]
fn loads_plugin_export_with_current_page() {
    let doc = json!({
        "name": "Shop",
        "currentPage": "2:0",
        "pages": [
            { "id": "1:0", "name": "Cover", "type": "PAGE", "children": [] },
            {
                "id": "2:0",
                "name": "Screens",
                "type": "PAGE",
                "children": [
                    { "id": "2:1", "name": "Home", "type": "FRAME", "x": 0, "y": 0, "width": 375, "height": 812 }
                ]
            }
        ]
    });

    let canvas = Canvas::from_value(&doc).unwrap();
    assert_eq!(canvas.name, "Shop");
    assert_eq!(canvas.pages.len(), 2);
    assert_eq!(canvas.current_page().name, "Screens");
    assert_eq!(canvas.find_all(|_| true).len(), 1);
}

#[test]
fn unknown_current_page_falls_back_to_first() {
    let doc = json!({
        "currentPage": "nope",
        "pages": [
            { "id": "1:0", "name": "First", "children": [] },
            { "id": "2:0", "name": "Second", "children": [] }
        ]
    });

    let canvas = Canvas::from_value(&doc).unwrap();
    assert_eq!(canvas.current_page().name, "First");
}

#[test]
fn loads_rest_file_export() {
    let doc = json!({
        "name": "Rest file",
        "document": {
            "type": "DOCUMENT",
            "children": [{
                "id": "0:1",
                "name": "Page 1",
                "type": "CANVAS",
                "children": [{
                    "id": "1:2",
                    "name": "Card",
                    "type": "FRAME",
                    "absoluteBoundingBox": { "x": 10, "y": 20, "width": 300, "height": 120 },
                    "rectangleCornerRadii": [8, 8, 0, 0]
                }]
            }]
        }
    });

    let canvas = Canvas::from_value(&doc).unwrap();
    let card = canvas.find_by_id("1:2").expect("card ingested");
    assert_eq!(card.geometry.x, 10.0);
    assert_eq!(card.geometry.width, 300.0);
    match card.visual.corner_radius {
        Some(CornerRadius::Individual(c)) => {
            assert_eq!(c.top_left, 8.0);
            assert_eq!(c.bottom_left, 0.0);
        }
        other => panic!("expected individual radii, got {other:?}"),
    }
}

#[test]
fn single_node_becomes_one_page_canvas() {
    let canvas = Canvas::from_value(&json!({ "id": "5:5", "type": "FRAME", "name": "Solo" })).unwrap();
    assert_eq!(canvas.pages.len(), 1);
    assert!(canvas.find_by_id("5:5").is_some());
}

#[test]
fn document_without_nodes_is_rejected() {
    assert!(Canvas::from_value(&json!({ "meta": 1 })).is_err());
    assert!(Canvas::from_json("not json").is_err());
}

// ============================================================================
// Node attributes
// ============================================================================

#[test]
fn ingests_fills_effects_layout_and_export_settings() {
    let doc = json!({
        "id": "1:1",
        "name": "Row",
        "type": "FRAME",
        "layoutMode": "HORIZONTAL",
        "itemSpacing": 8,
        "paddingLeft": 16,
        "fills": [
            { "type": "SOLID", "color": { "r": 1, "g": 0, "b": 0 }, "opacity": 0.5 },
            { "type": "IMAGE", "scaleMode": "FIT" }
        ],
        "effects": [
            { "type": "DROP_SHADOW", "visible": false, "radius": 4 },
            { "type": "NOISE" }
        ],
        "exportSettings": [
            { "format": "PNG", "constraint": { "type": "SCALE", "value": 2 } },
            { "format": "HEIC" }
        ]
    });

    let canvas = Canvas::from_value(&doc).unwrap();
    let row = canvas.find_by_id("1:1").unwrap();

    let layout = row.kind.layout().expect("frame has layout");
    assert_eq!(layout.mode, LayoutMode::Horizontal);
    assert_eq!(layout.item_spacing, 8.0);
    assert_eq!(layout.padding.left, 16.0);

    assert_eq!(row.visual.fills.len(), 2);
    assert!(matches!(row.visual.fills[0], Paint::Solid { opacity: Some(o), .. } if o == 0.5));
    assert!(matches!(row.visual.fills[1], Paint::Image { .. }));

    assert_eq!(row.visual.effects.len(), 2);
    assert!(!row.visual.effects[0].visible);
    assert_eq!(row.visual.effects[1].kind, EffectKind::Other("NOISE".into()));

    assert_eq!(row.export_settings.len(), 1, "unknown export format is dropped");
    assert_eq!(row.export_settings[0].format, ExportFormat::Png);
    assert_eq!(row.export_settings[0].scale, 2.0);
}

#[test]
fn mixed_text_values_are_kept_apart_from_unset() {
    let doc = json!({
        "id": "3:1",
        "type": "TEXT",
        "characters": "Hello",
        "fontName": "MIXED",
        "fontSize": 18,
        "lineHeight": { "unit": "AUTO" }
    });

    let canvas = Canvas::from_value(&doc).unwrap();
    let text = canvas.find_by_id("3:1").unwrap().kind.text().unwrap().clone();
    assert_eq!(text.characters, "Hello");
    assert_eq!(text.font_family, RunValue::Mixed);
    assert_eq!(text.font_size, RunValue::Uniform(18.0));
    assert_eq!(text.line_height, RunValue::Uniform(LineHeight::Auto));
    assert_eq!(text.font_weight, RunValue::Unset);
}

#[test]
fn rest_text_style_is_read_from_style_object() {
    let doc = json!({
        "id": "3:2",
        "type": "TEXT",
        "characters": "Title",
        "style": { "fontFamily": "Roboto", "fontWeight": 700, "lineHeightPx": 24 }
    });

    let canvas = Canvas::from_value(&doc).unwrap();
    let text = canvas.find_by_id("3:2").unwrap().kind.text().unwrap().clone();
    assert_eq!(text.font_family, RunValue::Uniform("Roboto".into()));
    assert_eq!(text.font_weight, RunValue::Uniform(700.0));
    assert_eq!(text.line_height, RunValue::Uniform(LineHeight::Pixels(24.0)));
}

#[test]
fn malformed_attributes_are_defaulted_not_rejected() {
    let doc = json!({
        "id": "4:1",
        "type": "RECTANGLE",
        "visible": false,
        "width": "wide",
        "fills": "oops",
        "children": [42, { "id": "4:2", "type": "STAR" }]
    });

    let canvas = Canvas::from_value(&doc).unwrap();
    let node = canvas.find_by_id("4:1").unwrap();
    assert!(!node.visible);
    assert_eq!(node.geometry.width, 0.0);
    assert!(node.visual.fills.is_empty());
    assert_eq!(node.children.len(), 1, "non-object child is skipped");
    assert_eq!(node.children[0].kind, NodeKind::Star);
}

use component_discovery::canvas::node::{
    Effect, EffectKind, LayoutProps, NodeKind, Paint, Position, Rgba, RunValue, SceneNode,
    TextProps, VisualProps,
};

pub const RED: Rgba = Rgba {
    r: 1.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

pub const BLUE: Rgba = Rgba {
    r: 0.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

pub fn solid(color: Rgba) -> VisualProps {
    VisualProps {
        fills: vec![Paint::Solid {
            color,
            opacity: None,
        }],
        ..VisualProps::default()
    }
}

pub fn drop_shadow(visible: bool) -> Effect {
    Effect {
        kind: EffectKind::DropShadow,
        visible,
        color: Some(Rgba::new(0.0, 0.0, 0.0, 0.25)),
        offset: Some(Position { x: 0.0, y: 2.0 }),
        radius: 4.0,
        spread: None,
    }
}

pub fn frame(id: &str, name: &str, children: Vec<SceneNode>) -> SceneNode {
    SceneNode::new(id, name, NodeKind::Frame(LayoutProps::default()))
        .with_geometry(0.0, 0.0, 120.0, 40.0)
        .with_children(children)
}

pub fn instance(id: &str, name: &str, children: Vec<SceneNode>) -> SceneNode {
    SceneNode::new(id, name, NodeKind::Instance(LayoutProps::default()))
        .with_geometry(0.0, 0.0, 120.0, 40.0)
        .with_children(children)
}

pub fn group(id: &str, name: &str, children: Vec<SceneNode>) -> SceneNode {
    SceneNode::new(id, name, NodeKind::Group).with_children(children)
}

pub fn rect(id: &str, name: &str) -> SceneNode {
    SceneNode::new(id, name, NodeKind::Rectangle).with_geometry(0.0, 0.0, 120.0, 40.0)
}

pub fn ellipse(id: &str, name: &str) -> SceneNode {
    SceneNode::new(id, name, NodeKind::Ellipse).with_geometry(0.0, 0.0, 24.0, 24.0)
}

pub fn text(id: &str, name: &str, characters: &str) -> SceneNode {
    SceneNode::new(
        id,
        name,
        NodeKind::Text(TextProps {
            characters: characters.to_string(),
            font_family: RunValue::Uniform("Inter".to_string()),
            font_size: RunValue::Uniform(14.0),
            font_weight: RunValue::Uniform(500.0),
            ..TextProps::default()
        }),
    )
    .with_geometry(12.0, 10.0, 96.0, 20.0)
}

/// `FRAME[RECTANGLE, TEXT]` filled with `fill`. Child ids are `<id>:bg` and
/// `<id>:label`.
pub fn button(id: &str, name: &str, fill: Rgba, label: &str) -> SceneNode {
    frame(
        id,
        name,
        vec![
            rect(&format!("{id}:bg"), "Background"),
            text(&format!("{id}:label"), "Label", label),
        ],
    )
    .with_visual(solid(fill))
}

use crate::canvas::node::{
    CornerRadius, Effect, EffectKind, Paint, Position, Rgba, SceneNode,
};
use crate::style::style_model::{EffectStyle, Fill, GradientFill, Shadow, StyleProperties};

/// Snapshot the visual presentation of one node.
///
/// Pure function of the node. Attributes the node does not carry fall back to
/// the `StyleProperties` defaults; unsupported paints and effect kinds are
/// dropped while the order of the remaining ones is kept.
pub fn extract_style(node: &SceneNode) -> StyleProperties {
    let visual = &node.visual;
    let mut style = StyleProperties {
        fills: visual.fills.iter().filter_map(to_fill).collect(),
        strokes: visual.strokes.iter().filter_map(to_stroke).collect(),
        stroke_weight: visual.stroke_weight.unwrap_or(0.0),
        corner_radius: visual.corner_radius.unwrap_or(CornerRadius::Uniform(0.0)),
        opacity: visual.opacity.unwrap_or(1.0),
        effects: visual.effects.iter().filter_map(to_effect).collect(),
        ..StyleProperties::default()
    };

    if let Some(layout) = node.kind.layout() {
        style.layout_mode = layout.mode;
        style.primary_align = layout.primary_align;
        style.counter_align = layout.counter_align;
        style.padding = layout.padding;
        style.item_spacing = layout.item_spacing;
    }

    if let Some(text) = node.kind.text() {
        style.font_family = text.font_family.uniform().cloned();
        style.font_weight = text.font_weight.uniform().copied();
        style.font_size = text.font_size.uniform().copied();
        style.line_height = text.line_height.uniform().and_then(|lh| lh.value());
        style.letter_spacing = text.letter_spacing.uniform().copied();
        style.text_align = text.text_align;
    }

    style
}

fn to_fill(paint: &Paint) -> Option<Fill> {
    match paint {
        Paint::Solid { color, opacity } => Some(Fill::Solid(solid(color, *opacity))),
        Paint::Gradient { kind, stops } => Some(Fill::Gradient(GradientFill {
            kind: *kind,
            stops: stops.clone(),
        })),
        Paint::Image { .. } | Paint::Unsupported(_) => None,
    }
}

fn to_stroke(paint: &Paint) -> Option<Rgba> {
    match paint {
        Paint::Solid { color, opacity } => Some(solid(color, *opacity)),
        _ => None,
    }
}

/// The paint's opacity stands in for alpha, as the host's solid paints carry
/// an RGB color plus a separate opacity.
fn solid(color: &Rgba, opacity: Option<f64>) -> Rgba {
    Rgba {
        a: opacity.unwrap_or(color.a),
        ..*color
    }
}

fn to_effect(effect: &Effect) -> Option<EffectStyle> {
    if !effect.visible {
        return None;
    }

    let shadow = || Shadow {
        color: effect.color.unwrap_or(Rgba::new(0.0, 0.0, 0.0, 1.0)),
        offset: effect.offset.unwrap_or(Position::default()),
        blur: effect.radius,
        spread: effect.spread.unwrap_or(0.0),
    };

    match &effect.kind {
        EffectKind::DropShadow => Some(EffectStyle::DropShadow(shadow())),
        EffectKind::InnerShadow => Some(EffectStyle::InnerShadow(shadow())),
        EffectKind::LayerBlur => Some(EffectStyle::LayerBlur {
            radius: effect.radius,
        }),
        EffectKind::BackgroundBlur => Some(EffectStyle::BackgroundBlur {
            radius: effect.radius,
        }),
        EffectKind::Other(_) => None,
    }
}

use serde::{Deserialize, Serialize};

use crate::canvas::node::{
    AxisAlign, ColorStop, CornerRadius, GradientKind, LayoutMode, Padding, Position, Rgba,
    TextAlign,
};

/// Normalized visual presentation of a single node. Recomputed per node,
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProperties {
    pub fills: Vec<Fill>,
    pub strokes: Vec<Rgba>,
    pub stroke_weight: f64,
    pub corner_radius: CornerRadius,
    pub opacity: f64,
    pub effects: Vec<EffectStyle>,

    pub layout_mode: LayoutMode,
    pub primary_align: AxisAlign,
    pub counter_align: AxisAlign,
    pub padding: Padding,
    pub item_spacing: f64,

    // Text nodes only; `None` when unknown or mixed across runs.
    pub font_family: Option<String>,
    pub font_weight: Option<f64>,
    pub font_size: Option<f64>,
    pub line_height: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub text_align: TextAlign,
}

impl Default for StyleProperties {
    fn default() -> Self {
        Self {
            fills: vec![],
            strokes: vec![],
            stroke_weight: 0.0,
            corner_radius: CornerRadius::Uniform(0.0),
            opacity: 1.0,
            effects: vec![],
            layout_mode: LayoutMode::None,
            primary_align: AxisAlign::Min,
            counter_align: AxisAlign::Min,
            padding: Padding::default(),
            item_spacing: 0.0,
            font_family: None,
            font_weight: None,
            font_size: None,
            line_height: None,
            letter_spacing: None,
            text_align: TextAlign::Left,
        }
    }
}

impl StyleProperties {
    pub fn has_shadow(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, EffectStyle::DropShadow(_) | EffectStyle::InnerShadow(_)))
    }

    /// First solid fill, the usual "background color".
    pub fn primary_color(&self) -> Option<Rgba> {
        self.fills.iter().find_map(|f| match f {
            Fill::Solid(c) => Some(*c),
            Fill::Gradient(_) => None,
        })
    }
}

/// Solid fills serialize as bare `{r,g,b,a}`, gradients as `{type, stops}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Solid(Rgba),
    Gradient(GradientFill),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientFill {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectStyle {
    DropShadow(Shadow),
    InnerShadow(Shadow),
    LayerBlur { radius: f64 },
    BackgroundBlur { radius: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Rgba,
    pub offset: Position,
    pub blur: f64,
    pub spread: f64,
}

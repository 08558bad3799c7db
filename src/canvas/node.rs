use serde::{Deserialize, Serialize};

// ============================================================================
// Shared primitives (also reused by the style and spec models)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, alpha ignored.
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corners {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CornerRadius {
    Uniform(f64),
    Individual(Corners),
}

impl Default for CornerRadius {
    fn default() -> Self {
        CornerRadius::Uniform(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    #[default]
    None,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisAlign {
    #[default]
    Min,
    Center,
    Max,
    SpaceBetween,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientKind {
    #[serde(rename = "GRADIENT_LINEAR")]
    Linear,
    #[serde(rename = "GRADIENT_RADIAL")]
    Radial,
    #[serde(rename = "GRADIENT_ANGULAR")]
    Angular,
    #[serde(rename = "GRADIENT_DIAMOND")]
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: Rgba,
}

// ============================================================================
// Capability records
// ============================================================================

/// A fill or stroke paint as the host describes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid { color: Rgba, opacity: Option<f64> },
    Gradient { kind: GradientKind, stops: Vec<ColorStop> },
    Image { scale_mode: String },
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    LayerBlur,
    BackgroundBlur,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub visible: bool,
    pub color: Option<Rgba>,
    pub offset: Option<Position>,
    pub radius: f64,
    pub spread: Option<f64>,
}

/// Visual attributes shared by most node kinds. Empty lists / `None` mean the
/// node does not carry that capability.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualProps {
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub stroke_weight: Option<f64>,
    pub corner_radius: Option<CornerRadius>,
    pub opacity: Option<f64>,
    pub effects: Vec<Effect>,
}

/// Auto-layout attributes of container nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutProps {
    pub mode: LayoutMode,
    pub primary_align: AxisAlign,
    pub counter_align: AxisAlign,
    pub padding: Padding,
    pub item_spacing: f64,
}

/// Value of a text attribute that may differ across runs of one text node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RunValue<T> {
    Uniform(T),
    /// Different values across runs; the host reports a sentinel.
    Mixed,
    #[default]
    Unset,
}

impl<T> RunValue<T> {
    pub fn uniform(&self) -> Option<&T> {
        match self {
            RunValue::Uniform(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    Auto,
    Pixels(f64),
    Percent(f64),
}

impl LineHeight {
    pub fn value(&self) -> Option<f64> {
        match self {
            LineHeight::Auto => None,
            LineHeight::Pixels(v) | LineHeight::Percent(v) => Some(*v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextProps {
    pub characters: String,
    pub font_family: RunValue<String>,
    pub font_weight: RunValue<f64>,
    pub font_size: RunValue<f64>,
    pub line_height: RunValue<LineHeight>,
    pub letter_spacing: RunValue<f64>,
    pub text_align: TextAlign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
    Jpg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn is_raster(&self) -> bool {
        matches!(self, ExportFormat::Png | ExportFormat::Jpg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSetting {
    pub format: ExportFormat,
    pub scale: f64,
}

// ============================================================================
// Node kinds
// ============================================================================

/// Node kind, resolved once at ingestion. Kind-specific attributes live in the
/// variant payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Frame(LayoutProps),
    Component(LayoutProps),
    ComponentSet(LayoutProps),
    Instance(LayoutProps),
    Group,
    Section,
    BooleanOperation,
    Text(TextProps),
    Vector,
    Rectangle,
    Ellipse,
    Line,
    Star,
    Polygon,
    Image,
    ShapeWithText,
    Other(String),
}

impl NodeKind {
    /// The host's upper-case type tag.
    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Frame(_) => "FRAME",
            NodeKind::Component(_) => "COMPONENT",
            NodeKind::ComponentSet(_) => "COMPONENT_SET",
            NodeKind::Instance(_) => "INSTANCE",
            NodeKind::Group => "GROUP",
            NodeKind::Section => "SECTION",
            NodeKind::BooleanOperation => "BOOLEAN_OPERATION",
            NodeKind::Text(_) => "TEXT",
            NodeKind::Vector => "VECTOR",
            NodeKind::Rectangle => "RECTANGLE",
            NodeKind::Ellipse => "ELLIPSE",
            NodeKind::Line => "LINE",
            NodeKind::Star => "STAR",
            NodeKind::Polygon => "POLYGON",
            NodeKind::Image => "IMAGE",
            NodeKind::ShapeWithText => "SHAPE_WITH_TEXT",
            NodeKind::Other(tag) => tag,
        }
    }

    pub fn layout(&self) -> Option<&LayoutProps> {
        match self {
            NodeKind::Frame(l)
            | NodeKind::Component(l)
            | NodeKind::ComponentSet(l)
            | NodeKind::Instance(l) => Some(l),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextProps> {
        match self {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Kinds that can become components during discovery.
    pub fn is_component_candidate(&self) -> bool {
        matches!(
            self,
            NodeKind::Frame(_) | NodeKind::Component(_) | NodeKind::Instance(_)
        )
    }

    /// Primitive kinds exported as standalone assets.
    pub fn is_exportable_primitive(&self) -> bool {
        matches!(
            self,
            NodeKind::Vector
                | NodeKind::Image
                | NodeKind::ShapeWithText
                | NodeKind::Rectangle
                | NodeKind::Ellipse
        )
    }
}

// ============================================================================
// SceneNode
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub geometry: Geometry,
    pub kind: NodeKind,
    pub visual: VisualProps,
    pub export_settings: Vec<ExportSetting>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            geometry: Geometry::default(),
            kind,
            visual: VisualProps::default(),
            export_settings: vec![],
            children: vec![],
        }
    }

    pub fn with_children(mut self, children: Vec<SceneNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_geometry(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.geometry = Geometry {
            x,
            y,
            width,
            height,
        };
        self
    }

    pub fn with_visual(mut self, visual: VisualProps) -> Self {
        self.visual = visual;
        self
    }

    pub fn type_tag(&self) -> &str {
        self.kind.tag()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// All descendants matching `pred`, pre-order, excluding `self`.
    pub fn find_all<'a, F>(&'a self, pred: F) -> Vec<&'a SceneNode>
    where
        F: Fn(&SceneNode) -> bool,
    {
        let mut out = Vec::new();
        collect(&self.children, &pred, &mut out);
        out
    }

    /// This node or one of its descendants with the given id.
    pub fn find_by_id(&self, id: &str) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }
}

pub(crate) fn collect<'a, F>(nodes: &'a [SceneNode], pred: &F, out: &mut Vec<&'a SceneNode>)
where
    F: Fn(&SceneNode) -> bool,
{
    for node in nodes {
        if pred(node) {
            out.push(node);
        }
        collect(&node.children, pred, out);
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::canvas::node::{Dimensions, LayoutMode, Padding, Position, TextAlign};
use crate::discovery::systems::DesignSystem;
use crate::style::style_model::StyleProperties;

pub const SCREEN_ID_PREFIX: &str = "screen-";

/// Analysis of one top-level frame. Goes stale when the canvas changes;
/// re-analysis is explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSpec {
    /// `"screen-" + nodeId`.
    pub id: String,
    pub name: String,
    pub dimensions: Dimensions,
    pub layout: StyleProperties,
    pub design_system: DesignSystem,
    pub elements: Vec<Element>,
    pub component_instances: Vec<ComponentInstance>,
    pub dependencies: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
    /// Implementation prompt from the enrichment service, when one was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl ScreenSpec {
    pub fn screen_id(node_id: &str) -> String {
        format!("{SCREEN_ID_PREFIX}{node_id}")
    }

    pub fn node_id(&self) -> &str {
        self.id.strip_prefix(SCREEN_ID_PREFIX).unwrap_or(&self.id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }
}

/// Per-descendant metadata of an analyzed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub name: String,
    /// Lower-case node type (`frame`, `text`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    pub dimensions: Dimensions,
    pub styling: StyleProperties,
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    /// Index among the parent's children.
    pub z_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_layout: Option<AutoLayout>,
}

/// Resolved text style, mixed values replaced by defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: f64,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub text_align: TextAlign,
    /// `#rrggbb` of the first solid fill.
    pub color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 16.0,
            font_weight: 400.0,
            line_height: 1.2,
            letter_spacing: 0.0,
            text_align: TextAlign::Left,
            color: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLayout {
    pub direction: LayoutMode,
    pub spacing: f64,
    pub padding: Padding,
}

/// A placement of a discovered component inside a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    pub spec_id: String,
    pub node_id: String,
    pub position: Position,
    pub instance_props: InstanceProps,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

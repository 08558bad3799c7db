use serde::{Deserialize, Serialize};

use crate::canvas::node::Dimensions;
use crate::discovery::systems::DesignSystem;
use crate::style::style_model::StyleProperties;

pub const COMPONENT_ID_PREFIX: &str = "comp-";

/// A discovered reusable component: the majority style of one structural
/// group, with the minority styles as `variants`.
///
/// Variants never nest: a variant's own `variants` list is always empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// `"comp-" + nodeId` of the representative node.
    pub id: String,
    pub name: String,
    pub category: ComponentCategory,
    pub styling: StyleProperties,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub variants: Vec<ComponentSpec>,
    pub mapping: ComponentMapping,
    pub accessibility: Accessibility,
}

impl ComponentSpec {
    pub fn component_id(node_id: &str) -> String {
        format!("{COMPONENT_ID_PREFIX}{node_id}")
    }

    /// Canvas id of the representative node. Weak reference: the node may no
    /// longer exist.
    pub fn node_id(&self) -> &str {
        self.id
            .strip_prefix(COMPONENT_ID_PREFIX)
            .unwrap_or(&self.id)
    }

    /// The base followed by its variants.
    pub fn with_variants(&self) -> impl Iterator<Item = &ComponentSpec> {
        std::iter::once(self).chain(self.variants.iter())
    }
}

/// Every base and variant of a catalog, in catalog order.
pub fn flatten_catalog(components: &[ComponentSpec]) -> Vec<&ComponentSpec> {
    components.iter().flat_map(|c| c.with_variants()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    #[default]
    Container,
    Interactive,
    Text,
    Image,
    Icon,
}

impl ComponentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Container => "container",
            ComponentCategory::Interactive => "interactive",
            ComponentCategory::Text => "text",
            ComponentCategory::Image => "image",
            ComponentCategory::Icon => "icon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMapping {
    pub design_system: DesignSystem,
    pub mapped_component: Option<String>,
    #[serde(default)]
    pub style_overrides: Vec<String>,
}

impl Default for ComponentMapping {
    fn default() -> Self {
        Self {
            design_system: DesignSystem::Custom,
            mapped_component: None,
            style_overrides: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessibility {
    pub role: String,
    pub label: Option<String>,
}

impl Default for Accessibility {
    fn default() -> Self {
        Self {
            role: "group".to_string(),
            label: None,
        }
    }
}

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::canvas::node::{LayoutMode, NodeKind, SceneNode, TextProps};
use crate::discovery::component_model::{ComponentSpec, flatten_catalog};
use crate::discovery::systems::DesignSystem;
use crate::error::{PreconditionError, Result};
use crate::style::extract::extract_style;
use crate::style::style_model::StyleProperties;

use super::heuristics::Requirements;
use super::screen_model::{
    AutoLayout, ComponentInstance, Element, InstanceProps, ScreenSpec, TextStyle,
};

pub const DEFAULT_MAX_SCREENS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_max_screens")]
    pub max_screens: usize,

    #[serde(default)]
    pub design_system: DesignSystem,
}

fn default_max_screens() -> usize {
    DEFAULT_MAX_SCREENS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_screens: DEFAULT_MAX_SCREENS,
            design_system: DesignSystem::default(),
        }
    }
}

/// Reject a selection before any work: empty, too large, or without a frame.
pub fn check_selection(
    selection: &[&SceneNode],
    config: &AnalysisConfig,
) -> std::result::Result<(), PreconditionError> {
    if selection.is_empty() {
        return Err(PreconditionError::NoScreensSelected);
    }
    if selection.len() > config.max_screens {
        return Err(PreconditionError::TooManyScreens {
            max: config.max_screens,
            selected: selection.len(),
        });
    }
    if !selection.iter().any(|n| matches!(n.kind, NodeKind::Frame(_))) {
        return Err(PreconditionError::NoFramesSelected);
    }
    Ok(())
}

/// Analyze the selected frames against the discovered catalog, one
/// [`ScreenSpec`] per frame in selection order. Non-frame containers are
/// skipped.
pub fn analyze(
    selection: &[&SceneNode],
    components: &[ComponentSpec],
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Result<Vec<ScreenSpec>> {
    check_selection(selection, config)?;

    let catalog = catalog_index(components);
    let mut screens = Vec::with_capacity(selection.len());

    for node in selection {
        cancel.check()?;
        if !matches!(node.kind, NodeKind::Frame(_)) {
            debug!(node = %node.id, kind = node.type_tag(), "skipping non-frame selection");
            continue;
        }
        screens.push(analyze_frame(node, &catalog, config.design_system));
    }

    info!(screens = screens.len(), "screen analysis complete");
    Ok(screens)
}

/// Node id -> spec id over every base and variant. The first entry for a
/// node wins.
pub fn catalog_index(components: &[ComponentSpec]) -> HashMap<&str, &str> {
    let mut index = HashMap::new();
    for spec in flatten_catalog(components) {
        index.entry(spec.node_id()).or_insert(spec.id.as_str());
    }
    index
}

pub fn analyze_frame(
    frame: &SceneNode,
    catalog: &HashMap<&str, &str>,
    design_system: DesignSystem,
) -> ScreenSpec {
    let mut walk = FrameWalk {
        catalog,
        elements: Vec::new(),
        instances: Vec::new(),
        instanced: HashSet::new(),
        requirements: Requirements::default(),
    };
    walk.visit_children(frame);

    debug!(
        screen = %frame.name,
        elements = walk.elements.len(),
        instances = walk.instances.len(),
        "frame analyzed"
    );

    ScreenSpec {
        id: ScreenSpec::screen_id(&frame.id),
        name: frame.name.clone(),
        dimensions: frame.geometry.dimensions(),
        layout: extract_style(frame),
        design_system,
        elements: walk.elements,
        component_instances: walk.instances,
        dependencies: walk.requirements.dependencies,
        permissions: walk.requirements.permissions,
        prompt: None,
    }
}

struct FrameWalk<'a> {
    catalog: &'a HashMap<&'a str, &'a str>,
    elements: Vec<Element>,
    instances: Vec<ComponentInstance>,
    instanced: HashSet<&'a str>,
    requirements: Requirements,
}

impl<'a> FrameWalk<'a> {
    fn visit_children(&mut self, parent: &'a SceneNode) {
        for (z_index, node) in parent.children.iter().enumerate() {
            self.elements.push(element_for(node, &parent.id, z_index));

            match self.catalog.get(node.id.as_str()) {
                Some(spec_id) => {
                    if self.instanced.insert(node.id.as_str()) {
                        self.instances.push(ComponentInstance {
                            spec_id: spec_id.to_string(),
                            node_id: node.id.clone(),
                            position: node.geometry.position(),
                            instance_props: InstanceProps {
                                text: inline_text(node),
                            },
                        });
                    }
                }
                None => self.requirements.observe(&node.name),
            }

            self.visit_children(node);
        }
    }
}

fn element_for(node: &SceneNode, parent_id: &str, z_index: usize) -> Element {
    let styling = extract_style(node);
    let text = node.kind.text();

    Element {
        id: node.id.clone(),
        name: node.name.clone(),
        kind: node.type_tag().to_lowercase(),
        position: node.geometry.position(),
        dimensions: node.geometry.dimensions(),
        parent: Some(parent_id.to_string()),
        children: node.children.iter().map(|c| c.id.clone()).collect(),
        z_index,
        content: text.map(|t| t.characters.clone()),
        text_style: text.map(|t| text_style(t, &styling)),
        auto_layout: auto_layout(node),
        styling,
    }
}

fn text_style(props: &TextProps, styling: &StyleProperties) -> TextStyle {
    let defaults = TextStyle::default();
    TextStyle {
        font_family: props
            .font_family
            .uniform()
            .cloned()
            .unwrap_or(defaults.font_family),
        font_size: props.font_size.uniform().copied().unwrap_or(defaults.font_size),
        font_weight: props
            .font_weight
            .uniform()
            .copied()
            .unwrap_or(defaults.font_weight),
        line_height: props
            .line_height
            .uniform()
            .and_then(|lh| lh.value())
            .unwrap_or(defaults.line_height),
        letter_spacing: props
            .letter_spacing
            .uniform()
            .copied()
            .unwrap_or(defaults.letter_spacing),
        text_align: props.text_align,
        color: styling
            .primary_color()
            .map(|c| c.to_hex())
            .unwrap_or(defaults.color),
    }
}

fn auto_layout(node: &SceneNode) -> Option<AutoLayout> {
    let layout = node.kind.layout()?;
    if layout.mode == LayoutMode::None {
        return None;
    }
    Some(AutoLayout {
        direction: layout.mode,
        spacing: layout.item_spacing,
        padding: layout.padding,
    })
}

/// Characters of the first direct text child, or its layer name when the
/// text is empty.
fn inline_text(node: &SceneNode) -> Option<String> {
    node.children.iter().find_map(|child| {
        child.kind.text().map(|t| {
            if t.characters.is_empty() {
                child.name.clone()
            } else {
                t.characters.clone()
            }
        })
    })
}

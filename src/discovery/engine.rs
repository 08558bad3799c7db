use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::canvas::document::Canvas;
use crate::canvas::node::{NodeKind, SceneNode};
use crate::error::Result;
use crate::style::extract::extract_style;
use crate::style::signature::style_signature;

use super::component_model::{Accessibility, ComponentMapping, ComponentSpec};
use super::mapping::infer_category;
use super::structural_hash::{DEFAULT_MAX_DEPTH, DEFAULT_VISIT_BUDGET, StructuralHasher};

/// A structural group needs at least this many members to become a component.
pub const MIN_COMPONENT_INSTANCES: usize = 2;

const DEFAULT_COMPONENT_NAME: &str = "Component";
const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Candidates considered per pass, in document order. Nodes past the cap
    /// are dropped before grouping, so on a page that exceeds it a different
    /// node can become a component's base than with the full page.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Minority style groups kept per component.
    #[serde(default = "default_max_variants")]
    pub max_variants: usize,

    /// Never below [`MIN_COMPONENT_INSTANCES`].
    #[serde(default = "default_min_instances")]
    pub min_instances: usize,

    #[serde(default = "default_max_hash_depth")]
    pub max_hash_depth: usize,

    /// Nodes one structural hash may visit before its remaining subtrees
    /// collapse to a `TIMEOUT` sentinel.
    #[serde(default = "default_hash_visit_budget")]
    pub hash_visit_budget: usize,
}

fn default_max_nodes() -> usize {
    500
}
fn default_max_variants() -> usize {
    3
}
fn default_min_instances() -> usize {
    MIN_COMPONENT_INSTANCES
}
fn default_max_hash_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_hash_visit_budget() -> usize {
    DEFAULT_VISIT_BUDGET
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_variants: default_max_variants(),
            min_instances: default_min_instances(),
            max_hash_depth: default_max_hash_depth(),
            hash_visit_budget: default_hash_visit_budget(),
        }
    }
}

/// Visible FRAME/COMPONENT/INSTANCE nodes of the current page in document
/// order, capped at `max_nodes`.
pub fn collect_candidates<'a>(canvas: &'a Canvas, config: &DiscoveryConfig) -> Vec<&'a SceneNode> {
    let mut candidates = canvas.find_all(|n| n.visible && n.kind.is_component_candidate());
    if candidates.len() > config.max_nodes {
        warn!(
            found = candidates.len(),
            limit = config.max_nodes,
            "truncating discovery candidates, later nodes are not considered"
        );
        candidates.truncate(config.max_nodes);
    }
    candidates
}

/// Discover components on the canvas's current page.
pub fn discover_canvas(
    canvas: &Canvas,
    config: &DiscoveryConfig,
    cancel: &CancellationToken,
) -> Result<Vec<ComponentSpec>> {
    let candidates = collect_candidates(canvas, config);
    discover(&candidates, config, cancel)
}

/// Group `nodes` by structure, then by style, into components with variants.
pub fn discover(
    nodes: &[&SceneNode],
    config: &DiscoveryConfig,
    cancel: &CancellationToken,
) -> Result<Vec<ComponentSpec>> {
    let mut hasher = StructuralHasher::new(config.max_hash_depth, config.hash_visit_budget);
    discover_with(&mut hasher, nodes, config, cancel)
}

/// Like [`discover`] with a caller-owned hasher. The hasher's cache is
/// cleared before and after the pass, also when the pass fails.
pub fn discover_with(
    hasher: &mut StructuralHasher,
    nodes: &[&SceneNode],
    config: &DiscoveryConfig,
    cancel: &CancellationToken,
) -> Result<Vec<ComponentSpec>> {
    hasher.clear();
    let result = run_pass(hasher, nodes, config, cancel);
    hasher.clear();
    result
}

fn run_pass(
    hasher: &mut StructuralHasher,
    nodes: &[&SceneNode],
    config: &DiscoveryConfig,
    cancel: &CancellationToken,
) -> Result<Vec<ComponentSpec>> {
    let min_instances = config.min_instances.max(MIN_COMPONENT_INSTANCES);
    let mut groups: IndexMap<String, Vec<&SceneNode>> = IndexMap::new();

    for (processed, node) in nodes.iter().enumerate() {
        cancel.check()?;

        if processed > 0 && processed % PROGRESS_EVERY == 0 {
            debug!(processed, total = nodes.len(), "hashing candidates");
        }
        if !node.kind.is_component_candidate() || !node.has_children() {
            continue;
        }

        match hasher.hash(node) {
            Ok(hash) => groups.entry(hash).or_default().push(*node),
            Err(e) => warn!(error = %e, name = %node.name, "excluding node from grouping"),
        }
    }

    info!(
        candidates = nodes.len(),
        groups = groups.len(),
        "structural grouping complete"
    );

    let mut components = Vec::new();
    for (hash, members) in &groups {
        cancel.check()?;
        if members.len() < min_instances {
            continue;
        }
        if let Some(component) = build_component(members, config.max_variants) {
            debug!(
                hash = %hash,
                instances = members.len(),
                variants = component.variants.len(),
                name = %component.name,
                "component discovered"
            );
            components.push(component);
        }
    }

    info!(components = components.len(), "discovery complete");
    Ok(components)
}

fn build_component(members: &[&SceneNode], max_variants: usize) -> Option<ComponentSpec> {
    let mut by_style: IndexMap<String, Vec<&SceneNode>> = IndexMap::new();
    for node in members {
        by_style
            .entry(style_signature(&extract_style(node)))
            .or_default()
            .push(*node);
    }

    let mut style_groups: Vec<Vec<&SceneNode>> = by_style.into_values().collect();
    // stable: equal-sized groups keep first-seen order
    style_groups.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut groups = style_groups.into_iter();
    let base_node = *groups.next()?.first()?;
    let mut base = spec_for(base_node, DEFAULT_COMPONENT_NAME);

    let remaining: Vec<_> = groups.collect();
    if remaining.len() > max_variants {
        debug!(
            component = %base.name,
            dropped = remaining.len() - max_variants,
            "dropping minority style groups"
        );
    }

    let variant_fallback = format!("{} Variant", base.name);
    base.variants = remaining
        .iter()
        .take(max_variants)
        .filter_map(|group| group.first())
        .map(|node| spec_for(node, &variant_fallback))
        .collect();

    Some(base)
}

fn spec_for(node: &SceneNode, fallback_name: &str) -> ComponentSpec {
    let name = component_name(&node.name).unwrap_or_else(|| fallback_name.to_string());
    let (category, role) = infer_category(&name);

    ComponentSpec {
        id: ComponentSpec::component_id(&node.id),
        category,
        styling: extract_style(node),
        dimensions: node.geometry.dimensions(),
        variants: Vec::new(),
        mapping: ComponentMapping::default(),
        accessibility: Accessibility {
            role: role.to_string(),
            label: accessible_label(node),
        },
        name,
    }
}

/// Last segment of a layer name split on `/` and `=`, trimmed.
/// `"Buttons/Primary"` and `"State=Primary"` both give `"Primary"`.
pub fn component_name(layer_name: &str) -> Option<String> {
    layer_name
        .rsplit(|c: char| c == '/' || c == '=')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn accessible_label(node: &SceneNode) -> Option<String> {
    node.find_all(|n| matches!(n.kind, NodeKind::Text(_)))
        .into_iter()
        .find_map(|n| n.kind.text().map(|t| t.characters.trim().to_string()))
        .filter(|s| !s.is_empty())
}

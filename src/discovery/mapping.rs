//! Name/style heuristics linking discovered components to design-system
//! components, plus the category inference discovery uses for naming.

use serde::Serialize;

use crate::canvas::node::{AxisAlign, LayoutMode};
use crate::discovery::component_model::{ComponentCategory, ComponentSpec};
use crate::discovery::systems::DesignSystem;

pub const MIN_SUGGESTION_CONFIDENCE: f64 = 0.5;
pub const MAX_SUGGESTIONS: usize = 3;

struct KindPattern {
    key: &'static str,
    names: &'static [&'static str],
    styles: &'static [&'static str],
    states: &'static [&'static str],
}

const KIND_PATTERNS: &[KindPattern] = &[
    KindPattern {
        key: "button",
        names: &["btn", "button", "action", "cta"],
        styles: &["primary", "secondary", "outline", "ghost"],
        states: &["hover", "press", "disabled"],
    },
    KindPattern {
        key: "input",
        names: &["input", "textfield", "field", "search", "form"],
        styles: &[],
        states: &["focus", "error", "disabled"],
    },
    KindPattern {
        key: "card",
        names: &["card", "container", "box", "panel"],
        styles: &[],
        states: &[],
    },
    KindPattern {
        key: "text",
        names: &["text", "label", "heading", "title", "paragraph"],
        styles: &["bold", "italic", "underline"],
        states: &[],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSuggestion {
    pub design_system: DesignSystem,
    /// Generic kind (`button`, `card`, ...).
    pub kind: String,
    /// Component name in the target library.
    pub component_name: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// Up to three suggestions above 0.5 confidence, best first, across every
/// design system with a catalog.
pub fn suggest_mappings(component: &ComponentSpec) -> Vec<MappingSuggestion> {
    suggest_for(component, &DesignSystem::ALL)
}

pub fn suggest_for(component: &ComponentSpec, systems: &[DesignSystem]) -> Vec<MappingSuggestion> {
    let mut suggestions = Vec::new();

    for system in systems {
        for target in system.catalog() {
            let confidence = similarity(component, target.key);
            if confidence > MIN_SUGGESTION_CONFIDENCE {
                suggestions.push(MappingSuggestion {
                    design_system: *system,
                    kind: target.key.to_string(),
                    component_name: target.name.to_string(),
                    confidence,
                    reasoning: reasoning(component, target.key, confidence),
                });
            }
        }
    }

    suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Fill `mapping` (base and variants) from the best suggestion within
/// `system`. Components without a confident match keep their mapping.
pub fn apply_best_mapping(component: &mut ComponentSpec, system: DesignSystem) {
    if let Some(best) = suggest_for(component, &[system]).into_iter().next() {
        component.mapping.design_system = best.design_system;
        component.mapping.mapped_component = Some(best.component_name);
    }
    for variant in &mut component.variants {
        apply_best_mapping(variant, system);
    }
}

fn similarity(component: &ComponentSpec, target: &str) -> f64 {
    name_similarity(&component.name, target) * 0.7 + style_similarity(component) * 0.3
}

fn name_similarity(name: &str, target: &str) -> f64 {
    let name = name.to_lowercase();
    let target = target.to_lowercase();

    if name == target {
        return 1.0;
    }
    if name.contains(&target) || target.contains(&name) {
        return 0.8;
    }

    if let Some(pattern) = KIND_PATTERNS.iter().find(|p| p.key == target) {
        if pattern.names.iter().any(|p| name.contains(p)) {
            return 0.7;
        }
        if pattern.styles.iter().any(|s| name.contains(s)) {
            return 0.6;
        }
        if pattern.states.iter().any(|s| name.contains(s)) {
            return 0.5;
        }
    }

    0.3
}

fn style_similarity(component: &ComponentSpec) -> f64 {
    let style = &component.styling;
    let mut score = 0.0;

    if style.layout_mode != LayoutMode::None {
        score += 0.3;
    }
    if style.primary_align != AxisAlign::Min || style.counter_align != AxisAlign::Min {
        score += 0.4;
    }
    let p = style.padding;
    if [p.top, p.right, p.bottom, p.left].iter().any(|v| *v > 0.0) {
        score += 0.15;
    }
    if style.item_spacing > 0.0 {
        score += 0.15;
    }

    score
}

fn reasoning(component: &ComponentSpec, target: &str, confidence: f64) -> String {
    let mut reasons = Vec::new();

    if component.name.to_lowercase().contains(&target.to_lowercase()) {
        reasons.push(format!(
            "Component name \"{}\" matches {}",
            component.name, target
        ));
    }
    if component.styling.layout_mode != LayoutMode::None {
        reasons.push("Component uses layout properties".to_string());
    }
    reasons.push(format!("Confidence: {}%", (confidence * 100.0).round()));

    reasons.join(". ")
}

/// Category and accessibility role implied by a component name.
pub fn infer_category(name: &str) -> (ComponentCategory, &'static str) {
    let name = name.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    if has(&["button", "btn", "cta"]) {
        (ComponentCategory::Interactive, "button")
    } else if has(&["input", "textfield", "field", "search"]) {
        (ComponentCategory::Interactive, "textbox")
    } else if has(&["icon"]) {
        (ComponentCategory::Icon, "image")
    } else if has(&["image", "photo", "avatar", "img"]) {
        (ComponentCategory::Image, "image")
    } else if has(&["heading", "label", "title", "paragraph", "caption", "text"]) {
        (ComponentCategory::Text, "text")
    } else {
        (ComponentCategory::Container, "group")
    }
}

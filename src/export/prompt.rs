use std::fmt::Write;

use serde::Serialize;

use crate::discovery::component_model::ComponentSpec;
use crate::discovery::systems::DesignSystem;
use crate::enrich::enrich_or_fallback;
use crate::screen::screen_model::ScreenSpec;

use super::bundle_model::{AiPrompt, PromptSubject};

/// One prompt per base and per variant, in catalog order.
pub fn component_prompts(components: &[ComponentSpec]) -> Vec<AiPrompt> {
    components
        .iter()
        .flat_map(|c| c.with_variants())
        .map(component_prompt)
        .collect()
}

pub fn component_prompt(component: &ComponentSpec) -> AiPrompt {
    let specifications = pretty(component);
    let accessibility_requirements = pretty(&component.accessibility);
    let system = component.mapping.design_system;

    let mut body = String::new();
    let _ = writeln!(body, "# {}\n", component.name);
    let _ = write!(
        body,
        "Implement the `{}` {} component",
        component.name,
        component.category.as_str()
    );
    match (&component.mapping.mapped_component, system) {
        (Some(target), DesignSystem::Custom) => {
            let _ = writeln!(body, " modeled on `{target}`.");
        }
        (Some(target), _) => {
            let _ = writeln!(body, " using `{target}` from {}.", system.display_name());
        }
        (None, DesignSystem::Custom) => {
            let _ = writeln!(body, " from scratch.");
        }
        (None, _) => {
            let _ = writeln!(body, " with {}.", system.display_name());
        }
    }
    let _ = writeln!(
        body,
        "Size: {}x{}.\n",
        component.dimensions.width, component.dimensions.height
    );

    let library_variants = component
        .mapping
        .mapped_component
        .as_deref()
        .and_then(|name| system.component_named(name))
        .map(|c| c.variants)
        .unwrap_or_default();
    if !library_variants.is_empty() {
        let _ = writeln!(body, "## Library Props");
        for (variant, props) in library_variants {
            let _ = writeln!(body, "- {variant}: `{props}`");
        }
        body.push('\n');
    }

    if !component.variants.is_empty() {
        let _ = writeln!(body, "## Variants");
        for variant in &component.variants {
            let _ = writeln!(body, "- {} ({})", variant.name, variant.id);
        }
        body.push('\n');
    }

    let _ = writeln!(body, "## Specifications\n```json\n{specifications}\n```\n");
    let _ = write!(
        body,
        "## Accessibility\n```json\n{accessibility_requirements}\n```\n"
    );

    AiPrompt {
        name: component.name.clone(),
        subject: PromptSubject::Component,
        design_system: system,
        specifications,
        accessibility_requirements,
        body,
    }
}

/// The screen's enriched prompt when it has one, else the local fallback.
pub fn screen_prompt(screen: &ScreenSpec, components: &[ComponentSpec]) -> AiPrompt {
    let body = enrich_or_fallback(None, None, screen, components);

    AiPrompt {
        name: screen.name.clone(),
        subject: PromptSubject::Screen,
        design_system: screen.design_system,
        specifications: pretty(screen),
        accessibility_requirements: screen_accessibility(screen),
        body,
    }
}

fn screen_accessibility(screen: &ScreenSpec) -> String {
    let labels: Vec<_> = screen
        .elements
        .iter()
        .filter_map(|e| e.content.as_deref())
        .filter(|c| !c.trim().is_empty())
        .collect();
    pretty(&serde_json::json!({
        "textContent": labels,
        "permissions": screen.permissions,
    }))
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

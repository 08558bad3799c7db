use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use crate::discovery::component_model::ComponentSpec;
use crate::screen::screen_model::ScreenSpec;

const SHADOW_PACKAGE: &str = "react-native-shadow-2";

/// Markdown implementation prompt built from the screen spec alone.
pub fn fallback_prompt(screen: &ScreenSpec, components: &[ComponentSpec]) -> String {
    let mut out = String::new();
    let names: BTreeMap<&str, &str> = components
        .iter()
        .flat_map(|c| c.with_variants())
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    let _ = writeln!(out, "# {}\n", screen.name);

    let _ = writeln!(out, "## Layout");
    let _ = writeln!(
        out,
        "- Dimensions: {}x{}",
        screen.dimensions.width, screen.dimensions.height
    );
    let background = screen
        .layout
        .primary_color()
        .map(|c| c.to_hex())
        .unwrap_or_else(|| "transparent".to_string());
    let _ = writeln!(out, "- Background: {background}");
    let _ = writeln!(out, "- Layout mode: {:?}", screen.layout.layout_mode);
    let _ = writeln!(out, "- Design system: {}\n", screen.design_system.display_name());

    let _ = writeln!(out, "## Components");
    if screen.component_instances.is_empty() {
        let _ = writeln!(out, "- none");
    }
    for instance in &screen.component_instances {
        let name = names.get(instance.spec_id.as_str()).unwrap_or(&"Component");
        let _ = write!(
            out,
            "- {} ({}) at {},{}",
            name, instance.spec_id, instance.position.x, instance.position.y
        );
        match &instance.instance_props.text {
            Some(text) => {
                let _ = writeln!(out, ": \"{text}\"");
            }
            None => out.push('\n'),
        }
    }
    out.push('\n');

    let _ = writeln!(out, "## Design Tokens");
    let colors: BTreeSet<String> = screen
        .elements
        .iter()
        .filter_map(|e| e.styling.primary_color())
        .map(|c| c.to_hex())
        .collect();
    let _ = writeln!(out, "### colors");
    for color in &colors {
        let _ = writeln!(out, "- {color}");
    }
    let typography: BTreeSet<String> = screen
        .elements
        .iter()
        .filter_map(|e| e.text_style.as_ref())
        .map(|t| format!("{} {}/{}", t.font_family, t.font_size, t.font_weight))
        .collect();
    let _ = writeln!(out, "### typography");
    for entry in &typography {
        let _ = writeln!(out, "- {entry}");
    }
    out.push('\n');

    write_list(&mut out, "Dependencies", screen.dependencies.iter());
    write_list(&mut out, "Permissions", screen.permissions.iter());
    write_list(&mut out, "Suggested Packages", suggested_packages(screen).iter());

    let _ = writeln!(out, "## Accessibility");
    let _ = writeln!(out, "- Ensure proper contrast ratios");
    let _ = writeln!(out, "- Add appropriate accessibility labels");
    let _ = writeln!(out, "- Maintain logical focus order");
    let _ = write!(out, "- Support screen readers");

    out
}

/// Packages an implementation of `screen` is likely to need: the design
/// system's base packages plus what element types and styling imply.
pub fn suggested_packages(screen: &ScreenSpec) -> BTreeSet<String> {
    let mut packages: BTreeSet<String> = screen
        .design_system
        .base_packages()
        .iter()
        .map(|p| p.to_string())
        .collect();

    for element in &screen.elements {
        match element.kind.as_str() {
            "image" => {
                packages.insert("react-native-fast-image".to_string());
            }
            "vector" => {
                packages.insert("react-native-svg".to_string());
            }
            "text" => {
                let material = element
                    .text_style
                    .as_ref()
                    .is_some_and(|t| t.font_family.contains("Material"));
                if material {
                    packages.insert("react-native-vector-icons".to_string());
                }
            }
            _ => {}
        }
        if element.styling.has_shadow() {
            packages.insert(SHADOW_PACKAGE.to_string());
        }
    }

    packages
}

fn write_list<'a>(out: &mut String, title: &str, items: impl Iterator<Item = &'a String>) {
    let _ = writeln!(out, "## {title}");
    let mut empty = true;
    for item in items {
        let _ = writeln!(out, "- {item}");
        empty = false;
    }
    if empty {
        let _ = writeln!(out, "- none");
    }
    out.push('\n');
}

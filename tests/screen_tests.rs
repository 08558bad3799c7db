use std::collections::HashMap;

use component_discovery::cancel::CancellationToken;
use component_discovery::canvas::node::{LayoutMode, LayoutProps, NodeKind, SceneNode};
use component_discovery::discovery::component_model::ComponentSpec;
use component_discovery::discovery::engine::{DiscoveryConfig, discover};
use component_discovery::discovery::systems::DesignSystem;
use component_discovery::error::{PipelineError, PreconditionError};
use component_discovery::screen::analyzer::{
    AnalysisConfig, analyze, analyze_frame, catalog_index, check_selection,
};
use component_discovery::screen::heuristics::{
    CAMERA_PERMISSIONS, LOCATION_PERMISSIONS, MAPS_PACKAGE, Requirements,
};

use crate::common::builders::{BLUE, RED, button, frame, group, rect, solid, text};

mod common;

fn catalog_for(nodes: &[&SceneNode]) -> Vec<ComponentSpec> {
    discover(nodes, &DiscoveryConfig::default(), &CancellationToken::new()).unwrap()
}

fn run(selection: &[&SceneNode], components: &[ComponentSpec]) -> Vec<component_discovery::ScreenSpec> {
    analyze(
        selection,
        components,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap()
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn empty_selection_is_rejected() {
    let err = check_selection(&[], &AnalysisConfig::default()).unwrap_err();
    assert_eq!(err, PreconditionError::NoScreensSelected);
    assert_eq!(err.to_string(), "Please select at least one frame to analyze");
}

#[test]
fn more_than_eight_screens_is_rejected() {
    let frames: Vec<SceneNode> = (0..9).map(|i| frame(&i.to_string(), "Screen", vec![])).collect();
    let refs: Vec<&SceneNode> = frames.iter().collect();

    let err = check_selection(&refs, &AnalysisConfig::default()).unwrap_err();
    assert_eq!(err, PreconditionError::TooManyScreens { max: 8, selected: 9 });
    assert!(check_selection(&refs[..8], &AnalysisConfig::default()).is_ok());
}

#[test]
fn selection_without_frames_is_rejected() {
    let g = group("g", "Group", vec![rect("r", "r")]);
    let err = check_selection(&[&g], &AnalysisConfig::default()).unwrap_err();
    assert_eq!(err, PreconditionError::NoFramesSelected);
}

#[test]
fn preconditions_fail_before_cancellation_is_checked() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = analyze(&[], &[], &AnalysisConfig::default(), &cancel);
    assert!(matches!(
        result,
        Err(PipelineError::Precondition(PreconditionError::NoScreensSelected))
    ));
}

#[test]
fn non_frames_in_a_mixed_selection_are_skipped() {
    let screen = frame("s", "Home", vec![]);
    let g = group("g", "Loose", vec![]);

    let screens = run(&[&g, &screen], &[]);
    assert_eq!(screens.len(), 1);
    assert_eq!(screens[0].id, "screen-s");
    assert_eq!(screens[0].node_id(), "s");
}

// ============================================================================
// Elements
// ============================================================================

#[test]
fn elements_record_parent_z_index_and_children() {
    let screen = frame(
        "s",
        "Home",
        vec![
            rect("bg", "Background"),
            frame("row", "Row", vec![text("t1", "Title", "Hello"), rect("r1", "Divider")]),
        ],
    );

    let spec = &run(&[&screen], &[])[0];
    let ids: Vec<_> = spec.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["bg", "row", "t1", "r1"], "pre-order walk");

    let row = spec.element("row").unwrap();
    assert_eq!(row.parent.as_deref(), Some("s"));
    assert_eq!(row.z_index, 1);
    assert_eq!(row.children, vec!["t1".to_string(), "r1".to_string()]);
    assert_eq!(row.kind, "frame");

    let divider = spec.element("r1").unwrap();
    assert_eq!(divider.parent.as_deref(), Some("row"));
    assert_eq!(divider.z_index, 1);
}

#[test]
fn text_elements_get_resolved_text_style() {
    let label = text("t", "Title", "Welcome").with_visual(solid(RED));
    let screen = frame("s", "Home", vec![label]);

    let spec = &run(&[&screen], &[])[0];
    let element = spec.element("t").unwrap();
    assert_eq!(element.content.as_deref(), Some("Welcome"));

    let style = element.text_style.as_ref().expect("text style");
    assert_eq!(style.font_family, "Inter");
    assert_eq!(style.font_size, 14.0);
    assert_eq!(style.font_weight, 500.0);
    assert_eq!(style.line_height, 1.2, "unset line height uses the default");
    assert_eq!(style.color, "#ff0000");
}

#[test]
fn auto_layout_is_only_reported_for_layout_containers() {
    let stack = SceneNode::new(
        "stack",
        "Stack",
        NodeKind::Frame(LayoutProps {
            mode: LayoutMode::Vertical,
            item_spacing: 8.0,
            ..LayoutProps::default()
        }),
    );
    let screen = frame("s", "Home", vec![stack, frame("plain", "Plain", vec![])]);

    let spec = &run(&[&screen], &[])[0];
    let layout = spec.element("stack").unwrap().auto_layout.as_ref().unwrap();
    assert_eq!(layout.direction, LayoutMode::Vertical);
    assert_eq!(layout.spacing, 8.0);
    assert!(spec.element("plain").unwrap().auto_layout.is_none());
}

// ============================================================================
// Component instances
// ============================================================================

#[test]
fn catalog_members_become_instances_with_inline_text() {
    let buy = button("b1", "Buttons/Primary", RED, "Buy");
    let sell = button("b2", "Buttons/Primary", RED, "Sell");
    let delete = button("b3", "Buttons/Danger", BLUE, "Delete");
    let components = catalog_for(&[&buy, &sell, &delete]);

    let screen = frame("s", "Checkout", vec![buy.clone(), delete.clone(), sell.clone()]);
    let spec = &run(&[&screen], &components)[0];

    // `b2` is a member of the group but not a representative.
    let placed: Vec<_> = spec
        .component_instances
        .iter()
        .map(|i| (i.node_id.as_str(), i.spec_id.as_str()))
        .collect();
    assert_eq!(placed, vec![("b1", "comp-b1"), ("b3", "comp-b3")]);
    assert_eq!(spec.component_instances[0].instance_props.text.as_deref(), Some("Buy"));
    assert_eq!(spec.component_instances[1].instance_props.text.as_deref(), Some("Delete"));
}

#[test]
fn empty_text_falls_back_to_layer_name() {
    let a = button("a", "Chip", RED, "");
    let b = button("b", "Chip", RED, "");
    let components = catalog_for(&[&a, &b]);

    let screen = frame("s", "Home", vec![a.clone()]);
    let spec = &run(&[&screen], &components)[0];
    assert_eq!(spec.component_instances[0].instance_props.text.as_deref(), Some("Label"));
}

#[test]
fn one_instance_per_node_even_when_it_appears_twice() {
    let a = button("a", "Chip", RED, "x");
    let b = button("b", "Chip", RED, "y");
    let components = catalog_for(&[&a, &b]);

    let screen = frame("s", "Home", vec![a.clone(), frame("wrap", "Wrap", vec![a.clone()])]);
    let spec = &run(&[&screen], &components)[0];
    assert_eq!(spec.component_instances.len(), 1);
}

#[test]
fn catalog_index_covers_bases_and_variants() {
    let a = button("a", "Chip", RED, "x");
    let b = button("b", "Chip", RED, "y");
    let c = button("c", "Chip", BLUE, "z");
    let components = catalog_for(&[&a, &b, &c]);

    let index = catalog_index(&components);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("a"), Some(&"comp-a"));
    assert_eq!(index.get("c"), Some(&"comp-c"));
    assert!(index.get("b").is_none(), "only representatives are indexed");
}

// ============================================================================
// Dependency and permission heuristics
// ============================================================================

#[test]
fn avatar_upload_camera_icon_yields_camera_permissions_only() {
    let screen = frame("s", "Profile", vec![rect("i", "Avatar-Upload/Camera Icon")]);
    let spec = &run(&[&screen], &[])[0];

    let expected: Vec<String> = CAMERA_PERMISSIONS.iter().map(|p| p.to_string()).collect();
    assert_eq!(spec.permissions.iter().cloned().collect::<Vec<_>>(), expected);
    assert!(spec.dependencies.is_empty());
}

#[test]
fn map_layers_require_maps_package() {
    let screen = frame("s", "Stores", vec![rect("m", "Store Map")]);
    let spec = &run(&[&screen], &[])[0];
    assert!(spec.dependencies.contains(MAPS_PACKAGE));
    assert!(spec.permissions.is_empty());
}

#[test]
fn location_layers_require_location_permissions() {
    let mut requirements = Requirements::default();
    requirements.observe("Current LOCATION pin");
    for permission in LOCATION_PERMISSIONS {
        assert!(requirements.permissions.contains(*permission));
    }
    assert_eq!(requirements.permissions.len(), 2);
}

#[test]
fn catalog_members_do_not_feed_heuristics() {
    let a = button("a", "Map Card", RED, "x");
    let b = button("b", "Map Card", RED, "y");
    let components = catalog_for(&[&a, &b]);

    let screen = frame("s", "Home", vec![a.clone()]);
    let spec = &run(&[&screen], &components)[0];
    assert!(spec.dependencies.is_empty());
}

#[test]
fn analyze_frame_uses_given_design_system() {
    let screen = frame("s", "Home", vec![]).with_visual(solid(BLUE));
    let spec = analyze_frame(&screen, &HashMap::new(), DesignSystem::ChakraUi);
    assert_eq!(spec.design_system, DesignSystem::ChakraUi);
    assert_eq!(spec.dimensions.width, 120.0);
    assert!(spec.layout.primary_color().is_some());
    assert!(spec.prompt.is_none());
}

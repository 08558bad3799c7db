use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use component_discovery::cancel::CancellationToken;
use component_discovery::canvas::document::Canvas;
use component_discovery::canvas::node::SceneNode;
use component_discovery::discovery::component_model::ComponentSpec;
use component_discovery::discovery::engine::{DiscoveryConfig, discover_canvas};
use component_discovery::discovery::systems::DesignSystem;
use component_discovery::error::{ExportError, PipelineError, PreconditionError};
use component_discovery::export::archive::{
    COMPONENTS_PATH, MANIFEST_PATH, SCREENS_PATH, sanitize_filename, write_archive,
};
use component_discovery::export::assembler::{Assembler, AssemblerConfig, is_exportable};
use component_discovery::export::bundle_model::{
    AiPrompt, Asset, AssetFormat, ExportBundle, ManifestEntry, PromptSubject,
};
use component_discovery::export::exporter::{
    AssetExporter, ChainExporter, DirectoryExporter, SvgExporter, render_svg,
};
use component_discovery::export::pool::{PoolTask, WorkerPool};
use component_discovery::export::prompt::component_prompt;
use component_discovery::screen::analyzer::{AnalysisConfig, analyze};
use sha1::{Digest, Sha1};

use crate::common::builders::{BLUE, RED, button, frame, rect};

mod common;

fn svg_only() -> AssemblerConfig {
    AssemblerConfig {
        formats: vec![AssetFormat::SVG],
        ..AssemblerConfig::default()
    }
}

fn checkout_canvas() -> Canvas {
    Canvas::from_nodes(vec![frame(
        "s",
        "Checkout",
        vec![
            button("1:1", "Buttons/Primary", RED, "Buy"),
            button("1:2", "Buttons/Primary", RED, "Sell"),
            button("1:3", "Buttons/Danger", BLUE, "Delete"),
        ],
    )])
}

fn catalog(canvas: &Canvas) -> Vec<ComponentSpec> {
    discover_canvas(canvas, &DiscoveryConfig::default(), &CancellationToken::new()).unwrap()
}

/// Fails for one node id, delegates to SVG rendering otherwise.
struct FailFor(&'static str);

impl AssetExporter for FailFor {
    fn name(&self) -> &'static str {
        "fail-for"
    }

    fn export(&self, node: &SceneNode, format: AssetFormat) -> Result<Vec<u8>, ExportError> {
        if node.id == self.0 {
            return Err(ExportError::Missing {
                node_id: node.id.clone(),
                format: format.label(),
            });
        }
        SvgExporter.export(node, format)
    }
}

/// Sleeps past the pool timeout for one node id.
struct SlowFor(&'static str);

impl AssetExporter for SlowFor {
    fn name(&self) -> &'static str {
        "slow-for"
    }

    fn export(&self, node: &SceneNode, format: AssetFormat) -> Result<Vec<u8>, ExportError> {
        if node.id == self.0 {
            std::thread::sleep(Duration::from_millis(300));
        }
        SvgExporter.export(node, format)
    }
}

fn read_entry(archive: &[u8], path: &str) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut file = zip.by_name(path).unwrap();
    let mut out = Vec::new();
    file.read_to_end(&mut out).unwrap();
    out
}

fn entry_names(archive: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    zip.file_names().map(str::to_string).collect()
}

// ============================================================================
// Asset formats and exporters
// ============================================================================

#[test]
fn asset_format_suffixes_and_labels() {
    assert_eq!(AssetFormat::SVG.suffix(), "");
    assert_eq!(AssetFormat::SVG.label(), "SVG");
    assert_eq!(AssetFormat::png(1.0).suffix(), "");
    assert_eq!(AssetFormat::png(2.0).suffix(), "@2x");
    assert_eq!(AssetFormat::png(3.0).label(), "PNG@3x");
}

#[test]
fn exportable_nodes_are_primitives_or_carry_settings() {
    assert!(is_exportable(&rect("r", "Background")));
    assert!(!is_exportable(&frame("f", "Card", vec![])));
}

#[test]
fn svg_exporter_renders_and_rejects_raster() {
    let node = button("b", "Button", RED, "Go & <stop>");
    let svg = String::from_utf8(SvgExporter.export(&node, AssetFormat::SVG).unwrap()).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("#ff0000"));
    assert!(svg.contains("Go &amp; &lt;stop&gt;"));
    assert_eq!(svg, render_svg(&node));

    assert!(matches!(
        SvgExporter.export(&node, AssetFormat::png(2.0)),
        Err(ExportError::UnsupportedFormat { .. })
    ));
}

#[test]
fn directory_exporter_reads_prerendered_files() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(DirectoryExporter::file_name("1:1", AssetFormat::png(2.0)), "1_1@2x.png");
    std::fs::write(dir.path().join("1_1@2x.png"), b"png-bytes").unwrap();

    let exporter = DirectoryExporter::new(dir.path());
    let node = rect("1:1", "Logo");
    assert_eq!(exporter.export(&node, AssetFormat::png(2.0)).unwrap(), b"png-bytes");
    assert!(matches!(
        exporter.export(&node, AssetFormat::SVG),
        Err(ExportError::Missing { .. })
    ));
}

#[test]
fn chain_exporter_falls_through_to_next() {
    let dir = tempfile::tempdir().unwrap();
    let chain = ChainExporter::new(vec![
        Box::new(DirectoryExporter::new(dir.path())),
        Box::new(SvgExporter),
    ]);
    let node = rect("9", "Logo");

    let bytes = chain.export(&node, AssetFormat::SVG).unwrap();
    assert!(String::from_utf8(bytes).unwrap().contains("<svg"));
    assert!(chain.export(&node, AssetFormat::png(1.0)).is_err());
}

// ============================================================================
// Worker pool
// ============================================================================

#[tokio::test]
async fn pool_keeps_task_order_across_batches() {
    let pool = WorkerPool::new(2, Duration::from_secs(5));
    let tasks: Vec<PoolTask<usize>> = (0..5)
        .map(|i| PoolTask::new(i.to_string(), move || Ok(i * 10)))
        .collect();

    let results = pool.run(tasks, &CancellationToken::new()).await.unwrap();
    let values: Vec<usize> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(values, vec![0, 10, 20, 30, 40]);
}

#[tokio::test]
async fn pool_times_out_slow_tasks() {
    let pool = WorkerPool::new(2, Duration::from_millis(50));
    let tasks = vec![
        PoolTask::new("fast", || Ok(1)),
        PoolTask::new("slow", || {
            std::thread::sleep(Duration::from_millis(300));
            Ok(2)
        }),
    ];

    let results = pool.run(tasks, &CancellationToken::new()).await.unwrap();
    assert_eq!(results[0].as_ref().unwrap(), &1);
    assert!(matches!(&results[1], Err(ExportError::TimedOut { node_id }) if node_id == "slow"));
}

#[tokio::test]
async fn pool_stops_when_cancelled() {
    let pool = WorkerPool::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = pool.run(vec![PoolTask::new("a", || Ok(()))], &cancel).await;
    assert!(matches!(result, Err(PipelineError::Cancelled)));
}

// ============================================================================
// Assembly
// ============================================================================

#[tokio::test]
async fn nothing_to_export_is_rejected() {
    let assembler = Assembler::new(Arc::new(SvgExporter), &svg_only());
    let result = assembler
        .assemble(&checkout_canvas(), vec![], vec![], &CancellationToken::new())
        .await;
    assert!(matches!(
        result,
        Err(PipelineError::Precondition(PreconditionError::NothingToExport))
    ));
}

#[tokio::test]
async fn bundle_has_one_prompt_per_component_variant_and_screen() {
    let canvas = checkout_canvas();
    let components = catalog(&canvas);
    let frame = canvas.find_by_id("s").unwrap();
    let screens = analyze(
        &[frame],
        &components,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();

    let assembler = Assembler::new(Arc::new(SvgExporter), &svg_only());
    let bundle = assembler
        .assemble(&canvas, components, screens, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(bundle.component_specs.len(), 1);
    assert_eq!(bundle.ai_prompts.len(), 3, "base + variant + screen");
    assert_eq!(bundle.ai_prompts[0].subject, PromptSubject::Component);
    assert_eq!(bundle.ai_prompts[2].subject, PromptSubject::Screen);
    assert!(bundle.ai_prompts[2].body.starts_with("# Checkout"));

    let exported: Vec<_> = bundle.assets.iter().map(|a| a.node_id.as_str()).collect();
    assert_eq!(exported, vec!["1:1:bg", "1:3:bg"]);
}

#[tokio::test]
async fn enriched_screen_prompt_is_used_verbatim() {
    let canvas = checkout_canvas();
    let frame = canvas.find_by_id("s").unwrap();
    let mut screens = analyze(&[frame], &[], &AnalysisConfig::default(), &CancellationToken::new())
        .unwrap();
    screens[0].prompt = Some("Custom prompt".into());

    let assembler = Assembler::new(Arc::new(SvgExporter), &svg_only());
    let bundle = assembler
        .assemble(&canvas, vec![], screens, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(bundle.ai_prompts.len(), 1);
    assert_eq!(bundle.ai_prompts[0].body, "Custom prompt");
}

#[test]
fn mapped_component_prompt_lists_library_props() {
    let canvas = checkout_canvas();
    let mut components = catalog(&canvas);
    components[0].mapping.design_system = DesignSystem::MaterialUi;
    components[0].mapping.mapped_component = Some("Button".into());

    let body = component_prompt(&components[0]).body;
    assert!(body.contains("using `Button` from Material UI"));
    assert!(body.contains("## Library Props"));
    assert!(body.contains("- outlined: `variant=\"outlined\"`"));
    assert!(body.contains("- Danger (comp-1:3)"));

    let unmapped = component_prompt(&components[0].variants[0]).body;
    assert!(!unmapped.contains("## Library Props"));
}

#[tokio::test]
async fn failing_asset_is_skipped_not_fatal() {
    let canvas = checkout_canvas();
    let assembler = Assembler::new(Arc::new(FailFor("1:1:bg")), &svg_only());

    let bundle = assembler
        .assemble(&canvas, catalog(&canvas), vec![], &CancellationToken::new())
        .await
        .unwrap();
    let exported: Vec<_> = bundle.assets.iter().map(|a| a.node_id.as_str()).collect();
    assert_eq!(exported, vec!["1:3:bg"]);
}

#[tokio::test]
async fn timed_out_asset_is_skipped() {
    let canvas = checkout_canvas();
    let assembler = Assembler::new(Arc::new(SlowFor("1:3:bg")), &svg_only())
        .with_pool(WorkerPool::new(5, Duration::from_millis(50)));

    let bundle = assembler
        .assemble(&canvas, catalog(&canvas), vec![], &CancellationToken::new())
        .await
        .unwrap();
    let exported: Vec<_> = bundle.assets.iter().map(|a| a.node_id.as_str()).collect();
    assert_eq!(exported, vec!["1:1:bg"]);
}

#[tokio::test]
async fn unsupported_formats_are_skipped_per_asset() {
    let canvas = checkout_canvas();
    let assembler = Assembler::new(Arc::new(SvgExporter), &AssemblerConfig::default());

    let bundle = assembler
        .assemble(&canvas, catalog(&canvas), vec![], &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(bundle.assets.len(), 2, "PNG renditions fail, SVG ones remain");
    assert!(bundle.assets.iter().all(|a| a.format == AssetFormat::SVG));
}

#[tokio::test]
async fn cancelled_assembly_returns_cancelled() {
    let canvas = checkout_canvas();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let assembler = Assembler::new(Arc::new(SvgExporter), &svg_only());
    let result = assembler.assemble(&canvas, catalog(&canvas), vec![], &cancel).await;
    assert!(matches!(result, Err(PipelineError::Cancelled)));
}

// ============================================================================
// Archive
// ============================================================================

fn asset(name: &str, node_id: &str, data: &[u8]) -> Asset {
    Asset {
        name: name.into(),
        node_id: node_id.into(),
        format: AssetFormat::SVG,
        data: data.to_vec(),
    }
}

fn prompt(name: &str) -> AiPrompt {
    AiPrompt {
        name: name.into(),
        subject: PromptSubject::Component,
        design_system: Default::default(),
        specifications: "{}".into(),
        accessibility_requirements: "{}".into(),
        body: format!("# {name}"),
    }
}

#[test]
fn archive_has_specs_prompts_and_assets() {
    let bundle = ExportBundle {
        ai_prompts: vec![prompt("Primary Button")],
        assets: vec![asset("Logo", "1:1", b"<svg/>")],
        ..ExportBundle::default()
    };

    let archive = write_archive(&bundle).unwrap();
    let names = entry_names(&archive);
    for expected in [
        COMPONENTS_PATH,
        SCREENS_PATH,
        MANIFEST_PATH,
        "prompts/primary_button.md",
        "assets/logo.svg",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected} in {names:?}");
    }

    assert_eq!(read_entry(&archive, "prompts/primary_button.md"), b"# Primary Button");
    assert_eq!(read_entry(&archive, COMPONENTS_PATH), b"[]");
}

#[test]
fn manifest_records_path_size_and_sha1() {
    let data = b"<svg>logo</svg>";
    let bundle = ExportBundle {
        assets: vec![asset("Logo", "1:1", data)],
        ..ExportBundle::default()
    };

    let archive = write_archive(&bundle).unwrap();
    let manifest: Vec<ManifestEntry> =
        serde_json::from_slice(&read_entry(&archive, MANIFEST_PATH)).unwrap();

    assert_eq!(manifest.len(), 1);
    let entry = &manifest[0];
    assert_eq!(entry.path, "assets/logo.svg");
    assert_eq!(entry.node_id, "1:1");
    assert_eq!(entry.format, "SVG");
    assert_eq!(entry.bytes, data.len());
    let expected: String = Sha1::digest(data).iter().map(|b| format!("{b:02x}")).collect();
    assert_eq!(entry.sha1, expected);
}

#[test]
fn colliding_names_get_numbered() {
    let bundle = ExportBundle {
        ai_prompts: vec![prompt("Card"), prompt("card"), prompt("Card")],
        assets: vec![
            asset("Background", "1", b"a"),
            asset("Background", "2", b"b"),
        ],
        ..ExportBundle::default()
    };

    let names = entry_names(&write_archive(&bundle).unwrap());
    for expected in [
        "prompts/card.md",
        "prompts/card_2.md",
        "prompts/card_3.md",
        "assets/background.svg",
        "assets/background_2.svg",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected} in {names:?}");
    }
}

#[test]
fn sanitize_filename_keeps_safe_characters() {
    assert_eq!(sanitize_filename("Buttons/Primary Big"), "buttons_primary_big");
    assert_eq!(sanitize_filename("icon-star_2"), "icon-star_2");
    assert_eq!(sanitize_filename(""), "unnamed");
}

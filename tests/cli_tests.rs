use std::path::PathBuf;

use clap::Parser;
use component_discovery::cli::commands::{
    OllamaSettings, build_enrichment, build_exporter, load_components,
};
use component_discovery::cli::config::{
    AppConfig, Cli, Commands, EnrichmentConfig, build_session_config, parse_config,
    resolve_token,
};
use component_discovery::discovery::systems::DesignSystem;
use component_discovery::enrich::{EnrichmentRequest, TextEnrichment};
use component_discovery::error::EnrichError;
use component_discovery::export::bundle_model::AssetFormat;
use component_discovery::screen::analyzer::analyze_frame;

use crate::common::builders::frame;

mod common;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_discover_minimal() {
    let cli = Cli::parse_from(["component-discovery", "discover", "--document", "page.json"]);
    match cli.command {
        Commands::Discover {
            document,
            output,
            max_nodes,
            max_variants,
            design_system,
            suggest,
        } => {
            assert_eq!(document, PathBuf::from("page.json"));
            assert!(output.is_none());
            assert!(max_nodes.is_none());
            assert!(max_variants.is_none());
            assert!(design_system.is_none());
            assert!(!suggest);
        }
        _ => panic!("Expected Discover command"),
    }
    assert_eq!(cli.verbose, 0);
}

#[test]
fn cli_parse_discover_all_flags() {
    let cli = Cli::parse_from([
        "component-discovery",
        "-vv",
        "discover",
        "--document",
        "page.json",
        "-o",
        "catalog.json",
        "--max-nodes",
        "50",
        "--max-variants",
        "1",
        "--design-system",
        "material-ui",
        "--suggest",
    ]);
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Discover {
            output,
            max_nodes,
            max_variants,
            design_system,
            suggest,
            ..
        } => {
            assert_eq!(output, Some(PathBuf::from("catalog.json")));
            assert_eq!(max_nodes, Some(50));
            assert_eq!(max_variants, Some(1));
            assert_eq!(design_system, Some(DesignSystem::MaterialUi));
            assert!(suggest);
        }
        _ => panic!("Expected Discover command"),
    }
}

#[test]
fn cli_parse_analyze_repeated_screens() {
    let cli = Cli::parse_from([
        "component-discovery",
        "analyze",
        "--document",
        "page.json",
        "--screen",
        "1:2",
        "--screen",
        "1:3",
        "--enrich",
        "ollama",
    ]);
    match cli.command {
        Commands::Analyze {
            screens, enrich, ..
        } => {
            assert_eq!(screens, vec!["1:2".to_string(), "1:3".to_string()]);
            assert_eq!(enrich.as_deref(), Some("ollama"));
        }
        _ => panic!("Expected Analyze command"),
    }
}

#[test]
fn cli_analyze_requires_a_screen() {
    let result = Cli::try_parse_from(["component-discovery", "analyze", "--document", "page.json"]);
    assert!(result.is_err());
}

#[test]
fn cli_parse_export_and_serve() {
    let cli = Cli::parse_from([
        "component-discovery",
        "export",
        "--document",
        "page.json",
        "--assets-dir",
        "renders",
        "-o",
        "bundle.zip",
    ]);
    match cli.command {
        Commands::Export {
            screens,
            assets_dir,
            output,
            ..
        } => {
            assert!(screens.is_empty());
            assert_eq!(assets_dir, Some(PathBuf::from("renders")));
            assert_eq!(output, Some(PathBuf::from("bundle.zip")));
        }
        _ => panic!("Expected Export command"),
    }

    let cli = Cli::parse_from([
        "component-discovery",
        "serve",
        "--document",
        "page.json",
        "--ollama-model",
        "llama3",
    ]);
    assert!(matches!(cli.command, Commands::Serve { .. }));
    assert_eq!(cli.ollama_model.as_deref(), Some("llama3"));
}

#[test]
fn cli_rejects_unknown_design_system() {
    let result = Cli::try_parse_from([
        "component-discovery",
        "discover",
        "--document",
        "page.json",
        "--design-system",
        "bootstrap",
    ]);
    assert!(result.is_err());
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.discovery.max_nodes, 500);
    assert_eq!(config.discovery.max_variants, 3);
    assert_eq!(config.discovery.min_instances, 2);
    assert_eq!(config.analysis.max_screens, 8);
    assert_eq!(config.analysis.design_system, DesignSystem::ReactNativePaper);
    assert_eq!(config.export.output, "component-export.zip");
    assert_eq!(config.export.assembler.concurrency, 5);
    assert_eq!(config.export.assembler.formats.len(), 4);
    assert_eq!(config.enrichment.backend, "none");
}

#[test]
fn config_partial_yaml_keeps_defaults() {
    let yaml = r#"
discovery:
  max_variants: 1
export:
  concurrency: 2
  formats:
    - format: svg
    - format: png
      scale: 2
enrichment:
  backend: http
  endpoint: https://prompts.example.com/v1/screen
"#;
    let config = parse_config(yaml);
    assert_eq!(config.discovery.max_variants, 1);
    assert_eq!(config.discovery.max_nodes, 500);
    assert_eq!(config.export.assembler.concurrency, 2);
    assert_eq!(config.export.assembler.task_timeout_secs, 30);
    assert_eq!(
        config.export.assembler.formats,
        vec![AssetFormat::SVG, AssetFormat::png(2.0)]
    );
    assert_eq!(config.export.output, "component-export.zip");
    assert_eq!(config.enrichment.backend, "http");
    assert_eq!(config.analysis.max_screens, 8);
}

#[test]
fn config_malformed_yaml_uses_defaults() {
    let config = parse_config("discovery: [not, a, map");
    assert_eq!(config.discovery.max_nodes, 500);
}

#[test]
fn cli_overrides_config() {
    let mut config = AppConfig::default();
    config.discovery.max_nodes = 100;

    let session = build_session_config(&config, Some(20), Some(0), Some(DesignSystem::ChakraUi));
    assert_eq!(session.discovery.max_nodes, 20);
    assert_eq!(session.discovery.max_variants, 0);
    assert_eq!(session.analysis.design_system, DesignSystem::ChakraUi);
    assert_eq!(session.map_to, Some(DesignSystem::ChakraUi));

    let session = build_session_config(&config, None, None, None);
    assert_eq!(session.discovery.max_nodes, 100);
    assert_eq!(session.map_to, None);
}

#[test]
fn token_from_config_wins() {
    let config = EnrichmentConfig {
        token: Some("from-file".into()),
        ..EnrichmentConfig::default()
    };
    assert_eq!(resolve_token(&config).as_deref(), Some("from-file"));
}

#[test]
fn token_in_header_form_is_unwrapped() {
    let config = EnrichmentConfig {
        token: Some("Bearer abc123".into()),
        ..EnrichmentConfig::default()
    };
    assert_eq!(resolve_token(&config).as_deref(), Some("abc123"));
}

// ============================================================================
// Command Helper Tests
// ============================================================================

#[test]
fn enrichment_backend_selection() {
    let config = AppConfig::default();
    let ollama = OllamaSettings::default();

    assert!(build_enrichment("none", &config, &ollama).unwrap().is_none());
    assert!(build_enrichment("ollama", &config, &ollama).unwrap().is_some());
    assert!(build_enrichment("carrier-pigeon", &config, &ollama).is_err());

    let err = build_enrichment("http", &config, &ollama).err().unwrap();
    assert!(err.to_string().contains("endpoint"));
}

#[test]
fn configured_secret_gates_the_backend() {
    let config = parse_config(
        r#"
enrichment:
  backend: ollama
  secret: s3cret
"#,
    );
    assert_eq!(config.enrichment.secret.as_deref(), Some("s3cret"));

    let backend = build_enrichment("ollama", &config, &OllamaSettings::default())
        .unwrap()
        .unwrap();
    let spec = analyze_frame(
        &frame("s", "Home", vec![]),
        &Default::default(),
        DesignSystem::ReactNativePaper,
    );

    let result = backend.enrich(&EnrichmentRequest::new(&spec).with_token("guess"));
    assert!(matches!(result, Err(EnrichError::Unauthorized)));
}

#[test]
fn empty_secret_is_a_configuration_error() {
    let config = AppConfig {
        enrichment: EnrichmentConfig {
            secret: Some(String::new()),
            ..EnrichmentConfig::default()
        },
        ..AppConfig::default()
    };
    let err = build_enrichment("ollama", &config, &OllamaSettings::default())
        .err()
        .unwrap();
    assert_eq!(err.to_string(), EnrichError::NotConfigured.to_string());
}

#[test]
fn exporter_selection_follows_assets_dir() {
    assert_eq!(build_exporter(None).name(), "svg");
    assert_eq!(build_exporter(Some(PathBuf::from("renders"))).name(), "chain");
}

#[test]
fn components_file_round_trip() {
    use component_discovery::cancel::CancellationToken;
    use component_discovery::canvas::document::Canvas;
    use component_discovery::discovery::engine::{DiscoveryConfig, discover_canvas};
    use serde_json::json;

    let doc = json!({
        "type": "PAGE",
        "children": [
            { "id": "1", "type": "FRAME", "name": "Card", "children": [{ "id": "1a", "type": "TEXT", "characters": "A" }] },
            { "id": "2", "type": "FRAME", "name": "Card", "children": [{ "id": "2a", "type": "TEXT", "characters": "B" }] }
        ]
    });
    let canvas = Canvas::from_value(&doc).unwrap();
    let components =
        discover_canvas(&canvas, &DiscoveryConfig::default(), &CancellationToken::new()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, serde_json::to_string_pretty(&components).unwrap()).unwrap();

    assert_eq!(load_components(&path).unwrap(), components);
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::canvas::document::Canvas;
use crate::cli::config::{AppConfig, build_session_config, resolve_token};
use crate::discovery::component_model::ComponentSpec;
use crate::discovery::mapping::suggest_mappings;
use crate::discovery::systems::DesignSystem;
use crate::enrich::{BearerGate, HttpEnrichment, OllamaEnrichment, TextEnrichment};
use crate::export::exporter::{AssetExporter, ChainExporter, DirectoryExporter, SvgExporter};
use crate::session::Session;
use crate::session::channel::serve;

/// Ollama settings resolved from CLI > config > defaults.
#[derive(Debug, Clone, Default)]
pub struct OllamaSettings<'a> {
    pub endpoint: Option<&'a str>,
    pub model: Option<&'a str>,
}

// ============================================================================
// discover subcommand
// ============================================================================

pub fn cmd_discover(
    config: &AppConfig,
    document: &Path,
    output: Option<&Path>,
    max_nodes: Option<usize>,
    max_variants: Option<usize>,
    design_system: Option<DesignSystem>,
    suggest: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let canvas = Canvas::load(document)?;
    let session_config = build_session_config(config, max_nodes, max_variants, design_system);
    let session = Session::new(canvas, session_config, build_exporter(None));

    let components = session.discover()?;
    eprintln!("Discovered {} components", components.len());

    if suggest {
        for component in &components {
            for suggestion in suggest_mappings(component) {
                eprintln!(
                    "  {} -> {} {} ({:.0}%)",
                    component.name,
                    suggestion.design_system.display_name(),
                    suggestion.component_name,
                    suggestion.confidence * 100.0
                );
            }
        }
    }

    write_json(&components, output)
}

// ============================================================================
// analyze subcommand
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub fn cmd_analyze(
    config: &AppConfig,
    document: &Path,
    screens: &[String],
    components: Option<&Path>,
    design_system: Option<DesignSystem>,
    enrich: Option<&str>,
    ollama: &OllamaSettings<'_>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = build_session(config, document, components, design_system, None, enrich, ollama)?;

    let specs = session.analyze(screens)?;
    eprintln!("Analyzed {} screens", specs.len());
    for spec in &specs {
        eprintln!(
            "  {}: {} elements, {} instances, {} dependencies, {} permissions",
            spec.name,
            spec.elements.len(),
            spec.component_instances.len(),
            spec.dependencies.len(),
            spec.permissions.len()
        );
    }

    write_json(&specs, output)
}

// ============================================================================
// export subcommand
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub fn cmd_export(
    config: &AppConfig,
    document: &Path,
    components: Option<&Path>,
    screens: &[String],
    assets_dir: Option<&Path>,
    enrich: Option<&str>,
    ollama: &OllamaSettings<'_>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = build_session(config, document, components, None, assets_dir, enrich, ollama)?;
    if !screens.is_empty() {
        session.analyze(screens)?;
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.export.output));

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(session.export(Some(&output)))?;

    println!(
        "Wrote {} ({} bytes): {} components, {} screens, {} prompts, {} assets",
        output.display(),
        outcome.archive.len(),
        outcome.bundle.component_specs.len(),
        outcome.bundle.screen_specs.len(),
        outcome.bundle.ai_prompts.len(),
        outcome.bundle.assets.len()
    );
    Ok(())
}

// ============================================================================
// serve subcommand
// ============================================================================

pub fn cmd_serve(
    config: &AppConfig,
    document: &Path,
    assets_dir: Option<&Path>,
    enrich: Option<&str>,
    ollama: &OllamaSettings<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = build_session(config, document, None, None, assets_dir, enrich, ollama)?;
    info!(document = %document.display(), "serving command channel on stdin/stdout");

    // The session outlives the runtime: blocking HTTP clients must not be
    // dropped on an async worker.
    let session = Arc::new(session);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        serve(Arc::clone(&session), stdin, tokio::io::stdout()).await
    })?;
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn build_session(
    config: &AppConfig,
    document: &Path,
    components: Option<&Path>,
    design_system: Option<DesignSystem>,
    assets_dir: Option<&Path>,
    enrich: Option<&str>,
    ollama: &OllamaSettings<'_>,
) -> Result<Session, Box<dyn std::error::Error>> {
    let canvas = Canvas::load(document)?;
    let session_config = build_session_config(config, None, None, design_system);

    let assets_dir = assets_dir
        .map(Path::to_path_buf)
        .or_else(|| config.export.assets_dir.as_ref().map(PathBuf::from));
    let mut session = Session::new(canvas, session_config, build_exporter(assets_dir));

    session = match components {
        Some(path) => session.with_components(load_components(path)?),
        None => {
            let discovered = session.discover()?;
            info!(components = discovered.len(), "catalog discovered");
            session
        }
    };

    let backend = enrich.unwrap_or(&config.enrichment.backend);
    if let Some(enrichment) = build_enrichment(backend, config, ollama)? {
        session = session
            .with_enrichment(enrichment)
            .with_enrichment_token(resolve_token(&config.enrichment));
    }
    Ok(session)
}

/// Pre-rendered files first when a directory is given, SVG rendering last.
pub fn build_exporter(assets_dir: Option<PathBuf>) -> Arc<dyn AssetExporter> {
    match assets_dir {
        Some(dir) => Arc::new(ChainExporter::new(vec![
            Box::new(DirectoryExporter::new(dir)),
            Box::new(SvgExporter),
        ])),
        None => Arc::new(SvgExporter),
    }
}

/// Build the enrichment backend based on name, behind a [`BearerGate`] when
/// `enrichment.secret` is configured.
pub fn build_enrichment(
    name: &str,
    config: &AppConfig,
    ollama: &OllamaSettings<'_>,
) -> Result<Option<Arc<dyn TextEnrichment>>, Box<dyn std::error::Error>> {
    let Some(backend) = build_backend(name, config, ollama)? else {
        return Ok(None);
    };
    match config.enrichment.secret.as_deref() {
        Some(secret) => {
            info!(backend = name, "enrichment requests require a bearer token");
            Ok(Some(Arc::new(BearerGate::new(secret, backend)?)))
        }
        None => Ok(Some(backend)),
    }
}

fn build_backend(
    name: &str,
    config: &AppConfig,
    ollama: &OllamaSettings<'_>,
) -> Result<Option<Arc<dyn TextEnrichment>>, Box<dyn std::error::Error>> {
    match name {
        "none" => Ok(None),
        "ollama" => {
            let defaults = OllamaEnrichment::default();
            let endpoint = ollama
                .endpoint
                .or(config.ollama.endpoint.as_deref())
                .unwrap_or(&defaults.endpoint);
            let model = ollama
                .model
                .or(config.ollama.model.as_deref())
                .unwrap_or(&defaults.model);
            Ok(Some(Arc::new(OllamaEnrichment::new(endpoint, model))))
        }
        "http" => {
            let endpoint = config
                .enrichment
                .endpoint
                .as_deref()
                .ok_or("enrichment.endpoint is required for the http backend")?;
            let token = resolve_token(&config.enrichment)
                .ok_or("an enrichment token is required for the http backend")?;
            Ok(Some(Arc::new(HttpEnrichment::new(endpoint, &token)?)))
        }
        other => Err(format!("unknown enrichment backend '{other}' (none, http, ollama)").into()),
    }
}

pub fn load_components(path: &Path) -> Result<Vec<ComponentSpec>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: serde::Serialize>(
    value: &T,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

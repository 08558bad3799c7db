use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::discovery::engine::DiscoveryConfig;
use crate::enrich::gateway::bearer_token;
use crate::discovery::systems::DesignSystem;
use crate::export::assembler::AssemblerConfig;
use crate::screen::analyzer::AnalysisConfig;
use crate::session::SessionConfig;

pub const DEFAULT_CONFIG_PATH: &str = "component-discovery.yaml";
pub const TOKEN_ENV: &str = "COMPONENT_DISCOVERY_TOKEN";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "component-discovery",
    version,
    about = "Discover reusable components and screens in design canvas exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: component-discovery.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find repeated structures on the current page and print the catalog
    Discover {
        /// Canvas document (JSON)
        #[arg(long)]
        document: PathBuf,

        /// Write the catalog here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum candidate nodes considered
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Maximum variants kept per component
        #[arg(long)]
        max_variants: Option<usize>,

        /// Map components onto this design system's catalog
        #[arg(long, value_enum)]
        design_system: Option<DesignSystem>,

        /// Print mapping suggestions for each component
        #[arg(long)]
        suggest: bool,
    },

    /// Analyze selected frames against a component catalog
    Analyze {
        /// Canvas document (JSON)
        #[arg(long)]
        document: PathBuf,

        /// Frame node id to analyze (repeatable)
        #[arg(long = "screen", required = true)]
        screens: Vec<String>,

        /// Catalog from `discover`; discovery runs first when omitted
        #[arg(long)]
        components: Option<PathBuf>,

        /// Target design system
        #[arg(long, value_enum)]
        design_system: Option<DesignSystem>,

        /// Prompt enrichment: none, http or ollama
        #[arg(long)]
        enrich: Option<String>,

        /// Write the screen specs here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the export bundle archive
    Export {
        /// Canvas document (JSON)
        #[arg(long)]
        document: PathBuf,

        /// Catalog from `discover`; discovery runs first when omitted
        #[arg(long)]
        components: Option<PathBuf>,

        /// Frame node id to analyze and include (repeatable)
        #[arg(long = "screen")]
        screens: Vec<String>,

        /// Directory with pre-rendered assets (`<id>.svg`, `<id>@2x.png`, ...)
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Prompt enrichment: none, http or ollama
        #[arg(long)]
        enrich: Option<String>,

        /// Archive path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Speak the JSON-lines command protocol over stdin/stdout
    Serve {
        /// Canvas document (JSON)
        #[arg(long)]
        document: PathBuf,

        /// Directory with pre-rendered assets
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Prompt enrichment: none, http or ollama
        #[arg(long)]
        enrich: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `component-discovery.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(flatten)]
    pub assembler: AssemblerConfig,

    #[serde(default = "default_output")]
    pub output: String,

    pub assets_dir: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            assembler: AssemblerConfig::default(),
            output: default_output(),
            assets_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// `none`, `http` or `ollama`
    #[serde(default = "default_backend")]
    pub backend: String,

    pub endpoint: Option<String>,

    /// Bearer token presented to the backend; falls back to $COMPONENT_DISCOVERY_TOKEN.
    /// `Bearer <token>` header values are accepted.
    pub token: Option<String>,

    /// When set, every request must present this secret before the backend runs
    pub secret: Option<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: None,
            token: None,
            secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

// Serde default helpers
fn default_output() -> String { "component-export.zip".to_string() }
fn default_backend() -> String { "none".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content),
        Err(_) => AppConfig::default(),
    }
}

pub fn parse_config(content: &str) -> AppConfig {
    match serde_yaml::from_str(content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "malformed config file, using defaults");
            AppConfig::default()
        }
    }
}

/// Enrichment token: config file first, then the environment.
pub fn resolve_token(config: &EnrichmentConfig) -> Option<String> {
    let token = config
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()))?;
    match bearer_token(&token) {
        Some(inner) => Some(inner.to_string()),
        None => Some(token),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Build a SessionConfig from the config file plus CLI overrides.
pub fn build_session_config(
    config: &AppConfig,
    max_nodes: Option<usize>,
    max_variants: Option<usize>,
    design_system: Option<DesignSystem>,
) -> SessionConfig {
    let mut discovery = config.discovery.clone();
    if let Some(n) = max_nodes {
        discovery.max_nodes = n;
    }
    if let Some(n) = max_variants {
        discovery.max_variants = n;
    }

    let mut analysis = config.analysis.clone();
    if let Some(system) = design_system {
        analysis.design_system = system;
    }

    SessionConfig {
        discovery,
        analysis,
        assembler: config.export.assembler.clone(),
        map_to: design_system,
    }
}

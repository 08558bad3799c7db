use clap::Parser;
use component_discovery::cli::commands::{
    OllamaSettings, cmd_analyze, cmd_discover, cmd_export, cmd_serve,
};
use component_discovery::cli::config::{Cli, Commands, load_config};
use component_discovery::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = load_config(cli.config.as_deref());

    // Ollama settings: CLI > config > defaults
    let ollama = OllamaSettings {
        endpoint: cli.ollama_endpoint.as_deref(),
        model: cli.ollama_model.as_deref(),
    };

    match cli.command {
        Commands::Discover {
            document,
            output,
            max_nodes,
            max_variants,
            design_system,
            suggest,
        } => {
            cmd_discover(
                &config,
                &document,
                output.as_deref(),
                max_nodes,
                max_variants,
                design_system,
                suggest,
            )?;
        }
        Commands::Analyze {
            document,
            screens,
            components,
            design_system,
            enrich,
            output,
        } => {
            cmd_analyze(
                &config,
                &document,
                &screens,
                components.as_deref(),
                design_system,
                enrich.as_deref(),
                &ollama,
                output.as_deref(),
            )?;
        }
        Commands::Export {
            document,
            components,
            screens,
            assets_dir,
            enrich,
            output,
        } => {
            cmd_export(
                &config,
                &document,
                components.as_deref(),
                &screens,
                assets_dir.as_deref(),
                enrich.as_deref(),
                &ollama,
                output.as_deref(),
            )?;
        }
        Commands::Serve {
            document,
            assets_dir,
            enrich,
        } => {
            cmd_serve(&config, &document, assets_dir.as_deref(), enrich.as_deref(), &ollama)?;
        }
    }

    Ok(())
}

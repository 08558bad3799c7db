//! Logging configuration using tracing

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "COMPONENT_DISCOVERY_LOG";

/// Initialize the logging subsystem.
///
/// Logs go to stderr so stdout stays free for JSON output and the command
/// channel. The filter comes from `COMPONENT_DISCOVERY_LOG` when set, otherwise
/// from the `-v` count:
///
/// ```bash
/// COMPONENT_DISCOVERY_LOG=debug component-discovery discover --document page.json
/// component-discovery -vv discover --document page.json
/// ```
pub fn init(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("component_discovery={level},warn")));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();
}

//! Culture Guide - cultural events, recommendations, and congestion CLI
//!
#![doc = "Culture Guide - terminal client for the culture recommendation service"]
#![doc = "Main entry point for the culture-guide application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use culture_guide::cli::{Cli, Commands};
use culture_guide::commands;
use culture_guide::config::{Config, LoggingConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration; its own diagnostics go through a bootstrap subscriber
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = tracing::subscriber::with_default(bootstrap_subscriber(cli.verbose), || {
        Config::load(config_path, &cli)
    })?;

    // Initialize tracing once the configured level is known
    init_tracing(&config.logging);

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat");
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Recommend { location, json } => {
            let location = location.join(" ");
            tracing::info!("Searching recommendations for: {}", location);
            commands::recommend::run_recommend(config, location, json).await?;
            Ok(())
        }
        Commands::Map { area, json } => {
            tracing::info!("Opening congestion map");
            if let Some(a) = &area {
                tracing::debug!("Area requested: {}", a);
            }
            commands::map::run_map(config, area, json).await?;
            Ok(())
        }
        Commands::Prefs { command } => {
            tracing::info!("Starting preference command");
            commands::prefs::run_prefs(config, command)?;
            Ok(())
        }
    }
}

/// Crate-scoped filter at `level`, unless `RUST_LOG` is set
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("culture_guide={}", level)))
}

/// Plain stderr subscriber active while the configuration itself loads
fn bootstrap_subscriber(verbose: bool) -> impl tracing::Subscriber + Send + Sync + 'static {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(default_filter(level))
        .with_writer(std::io::stderr)
        .finish()
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to this
/// crate only. Logs go to stderr so `--json` output stays clean.
fn init_tracing(logging: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(default_filter(&logging.level));

    if logging.json_format {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ft_cli::commands::{demo, score};
use ft_cli::{Cli, Commands, Config};

/// Load and validate configuration.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    config
        .focus
        .validate()
        .context("invalid focus configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Some(Commands::Demo {
            priority,
            tag,
            json,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let query = demo::DemoQuery {
                priority: *priority,
                tag: tag.clone(),
            };
            demo::run(&mut stdout, &config, &query, *json)?;
        }
        Some(Commands::Score { sessions, json }) => {
            let config = load_config(cli.config.as_deref())?;
            score::run(&mut stdout, &config, sessions, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

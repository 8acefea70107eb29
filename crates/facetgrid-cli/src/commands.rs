use super::args::{Cli, Commands};
use super::handlers;
use crate::logging;
use anyhow::{Context, Result};
use facetgrid_runtime::{GridConfig, resolve_config_path};
use std::path::Path;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let config_path = resolve_config_path(cli.config.as_deref())?;

    match cli.command {
        Commands::View(args) => {
            let config = load_config(&config_path)?;
            handlers::view::handle(args, &config)
        }

        Commands::Similar(args) => {
            let config = load_config(&config_path)?;
            handlers::similar::handle(args, &config)
        }

        Commands::Config { command } => handlers::config::handle(command, &config_path),
    }
}

fn load_config(path: &Path) -> Result<GridConfig> {
    GridConfig::load_from(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

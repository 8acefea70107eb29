use crate::args::ConfigCommand;
use anyhow::{Context, Result, bail};
use facetgrid_runtime::GridConfig;
use std::path::Path;

pub fn handle(command: ConfigCommand, config_path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show => show(config_path),
        ConfigCommand::Init { force } => init(config_path, force),
    }
}

fn show(config_path: &Path) -> Result<()> {
    let config = GridConfig::load_from(config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    if config_path.exists() {
        println!("# {}", config_path.display());
    } else {
        println!("# {} (not found, showing defaults)", config_path.display());
    }
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Config already exists: {} (use --force to overwrite)",
            config_path.display()
        );
    }

    GridConfig::default()
        .save_to(config_path)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
    println!("Wrote default config to {}", config_path.display());
    Ok(())
}

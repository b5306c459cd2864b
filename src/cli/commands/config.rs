//! Config command implementation.
//!
//! Shows and initializes the configuration file.

use std::path::Path;

use crate::cli::{Cli, ConfigAction, ConfigArgs, OutputFormat};
use crate::config::Config;
use crate::error::{ArchiveError, Result};

use super::{config_path, load_config};

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => {
            println!("{}", config_path(cli)?.display());
            Ok(())
        }
        ConfigAction::Init { force } => {
            let path = config_path(cli)?;
            init_config(&path, *force)?;
            if !cli.quiet {
                println!("Created configuration file at: {}", path.display());
            }
            Ok(())
        }
    }
}

/// Show the effective configuration.
fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli);

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Text => {
            let toml = toml::to_string_pretty(&config).map_err(|e| ArchiveError::ConfigError {
                message: format!("Failed to render config: {e}"),
            })?;
            println!("{}", toml.trim_end());
        }
    }

    Ok(())
}

/// Write a default configuration file unless one exists.
fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ArchiveError::ConfigError {
            message: format!(
                "Configuration file already exists at: {} (use --force to replace it)",
                path.display()
            ),
        });
    }

    Config::default().save_to(path)
}

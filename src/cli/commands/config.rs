//! Config command implementation.
//!
//! View and modify reader configuration settings.

use crate::cli::{Cli, ConfigAction, ConfigArgs, OutputFormat};
use crate::config::{resolve_config_path, Config, KEYS};
use crate::error::{ReaderError, Result};

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let path = resolve_config_path(cli.config.as_deref())?;

    match &args.action {
        ConfigAction::Show => show_config(cli, &load(&path)?),
        ConfigAction::Get { key } => get_config_value(cli, &load(&path)?, key),
        ConfigAction::Set { key, value } => {
            let mut config = load(&path)?;
            config.set(key, value)?;
            config.save_to(&path)?;
            println!("Set {key} = {value}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init => {
            if path.exists() {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use 'dsread config reset' to reset to defaults.");
                return Ok(());
            }
            Config::default().save_to(&path)?;
            println!("Created configuration file at: {}", path.display());
            Ok(())
        }
        ConfigAction::Reset => {
            Config::default().save_to(&path)?;
            println!("Configuration reset to defaults at: {}", path.display());
            Ok(())
        }
    }
}

fn load(path: &std::path::Path) -> Result<Config> {
    if path.exists() {
        Config::load_from(path)
    } else {
        Ok(Config::default())
    }
}

/// Show full configuration.
fn show_config(cli: &Cli, config: &Config) -> Result<()> {
    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        _ => {
            let text = toml::to_string_pretty(config).map_err(|e| ReaderError::InvalidConfig {
                message: format!("Failed to serialize config: {e}"),
            })?;
            print!("{text}");
        }
    }
    Ok(())
}

/// Get a specific configuration value.
fn get_config_value(cli: &Cli, config: &Config, key: &str) -> Result<()> {
    let value = config.get(key).ok_or_else(|| ReaderError::ConfigError {
        message: format!("Unknown configuration key: {key} (known: {})", KEYS.join(", ")),
    })?;

    match cli.effective_output() {
        OutputFormat::Json => println!("{}", serde_json::json!({ key: value })),
        _ => println!("{value}"),
    }
    Ok(())
}

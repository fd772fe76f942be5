//! TUI command implementation.

use crate::cli::{Cli, TuiArgs};
use crate::config::Config;
use crate::error::Result;

/// Run the interactive reader.
pub fn run(cli: &Cli, config: &Config, args: &TuiArgs) -> Result<()> {
    let config_path = crate::config::resolve_config_path(cli.config.as_deref()).ok();
    crate::tui::run(config.clone(), config_path, args.file.as_deref())
}

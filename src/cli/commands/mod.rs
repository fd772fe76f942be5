//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic.

pub mod code;
pub mod config;
pub mod list;
pub mod show;
pub mod tui;

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::reader::ReaderState;

/// Load an export into a fresh reader state configured from `config`.
pub fn load_state(config: &Config, file: &Path) -> Result<ReaderState> {
    let mut state = ReaderState::new(config.display.default_sort, config.debounce(), config.display.timezone);
    state.load_path(file)?;
    Ok(state)
}

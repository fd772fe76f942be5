//! Terminal User Interface for the reader.
//!
//! Two panels side by side:
//! - Left: filtered and sorted conversation list
//! - Right: the open conversation along its selected branch path
//!
//! A status bar at the bottom shows counts, match statistics, sort order,
//! date filters and the theme. Built with ratatui on crossterm.

mod app;
mod components;
mod events;
mod state;

pub use app::run;
pub use state::{Action, AppState, InputMode, Panel};

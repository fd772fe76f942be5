//! deepseek-reader: terminal reader for DeepSeek conversation exports.
//!
//! An export is a JSON array of conversations. Each conversation stores its
//! messages as a tree: regenerating a reply or editing a prompt adds a
//! sibling branch instead of replacing the old one. This crate walks that
//! tree along a chosen path, renders it for the terminal, and lets the
//! reader switch between alternatives at every branch point.
//!
//! # Example
//!
//! ```rust,no_run
//! use deepseek_reader::reader::ReaderState;
//! use deepseek_reader::render::{DocumentRenderer, RenderOptions, Theme};
//!
//! fn main() -> deepseek_reader::Result<()> {
//!     let mut state = ReaderState::default();
//!     state.load_path("deepseek_export.json")?;
//!     state.set_query("borrow checker");
//!
//!     let view = state.open(0).expect("at least one match");
//!     let first = view.branch_points()[0].identity.clone();
//!     view.next_branch(&first);
//!
//!     let mut renderer = DocumentRenderer::new(Theme::default(), RenderOptions::default());
//!     renderer.set_query("borrow checker");
//!     let view = state.view().expect("open");
//!     let document = renderer.render(view.conversation(), view.path(), None);
//!     println!("{} lines, {} matches", document.lines.len(), document.highlights);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`model`]: conversations, nodes, messages and typed fragments
//! - [`parser`]: lenient JSON loading; malformed nodes are skipped
//! - [`branch`]: node store, branch selector and path walker
//! - [`view`]: an open conversation with its branch choices
//! - [`search`]: filtering, sorting and match statistics
//! - [`reader`]: the state shared by the CLI and the TUI
//! - [`render`]: markdown, syntax and query highlighting into styled lines
//! - [`cli`]: command-line interface
//! - [`tui`]: terminal user interface
//! - [`config`]: configuration management
//! - [`error`]: error types and handling

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod branch;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod reader;
pub mod render;
pub mod search;
pub mod tui;
pub mod util;
pub mod view;

// Re-export commonly used types at the crate root
pub use error::{ReaderError, Result};
pub use model::{Conversation, Fragment, FragmentKind, Message, Node};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::branch::{walk, BranchSelector, NodeStore, PathIdentity, SelectedPath};
    pub use crate::error::{ReaderError, Result};
    pub use crate::model::{Conversation, Fragment, FragmentKind, Message, Node};
    pub use crate::reader::ReaderState;
    pub use crate::render::{Document, DocumentRenderer, RenderOptions, Theme};
    pub use crate::search::{ConversationFilter, DateRange, SortOrder};
    pub use crate::view::ConversationView;
}

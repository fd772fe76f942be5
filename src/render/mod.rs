//! Conversation rendering.
//!
//! Everything renders to ratatui [`Line`](ratatui::text::Line)s so the TUI
//! and the plain CLI share one code path; [`ansi`] turns lines into escape
//! sequences for terminals and pipes.

pub mod ansi;
pub mod document;
pub mod fragment;
pub mod highlight;
pub mod language;
pub mod markdown;
pub mod syntax;
pub mod theme;

pub use document::{Document, DocumentRenderer, NavigatorAnchor};
pub use fragment::{FragmentRenderer, RenderedFragment};
pub use highlight::QueryHighlighter;
pub use language::{declared_language, detect_language, file_extension, resolve_language};
pub use markdown::{CodeBlock, MarkdownRenderer};
pub use syntax::SyntaxHighlighter;
pub use theme::{available_themes, Theme};

use crate::util::Zone;

/// Default timestamp format.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Default date format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// How timestamps are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Zone timestamps are converted to.
    pub zone: Zone,
    /// strftime format for timestamps.
    pub datetime_format: String,
    /// strftime format for dates.
    pub date_format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            zone: Zone::default(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

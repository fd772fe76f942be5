//! Loading of conversation exports.
//!
//! An export is a JSON array of conversations; a single conversation object
//! is accepted too. Parsing either succeeds completely or fails with a
//! positioned error, so callers can keep whatever they had loaded before.
//!
//! # Example
//!
//! ```rust,no_run
//! use deepseek_reader::parser::ExportParser;
//!
//! let mut parser = ExportParser::new();
//! let conversations = parser.parse_file("conversations.json")?;
//! println!("Loaded {} conversations", conversations.len());
//! println!("{} branch points", parser.stats().branch_points);
//! # Ok::<(), deepseek_reader::ReaderError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::{ReaderError, Result};
use crate::model::Conversation;

/// Path that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Default maximum input size (unlimited).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 0;

/// Parser for conversation exports.
#[derive(Debug, Default)]
pub struct ExportParser {
    /// Maximum file size in bytes (0 = unlimited).
    max_file_size: u64,
    /// Statistics about the last parse.
    stats: ParseStats,
}

/// Statistics about a parsed export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Conversations loaded.
    pub conversations: usize,
    /// Nodes kept across all conversations.
    pub nodes: usize,
    /// Nodes carrying a message.
    pub messages: usize,
    /// Nodes with two or more children.
    pub branch_points: usize,
}

impl ParseStats {
    /// Compute statistics for a set of conversations.
    #[must_use]
    pub fn of(conversations: &[Conversation]) -> Self {
        let mut stats = Self {
            conversations: conversations.len(),
            ..Self::default()
        };
        for node in conversations.iter().flat_map(|c| c.mapping.values()) {
            stats.nodes += 1;
            if node.message.is_some() {
                stats.messages += 1;
            }
            if node.is_branch_point() {
                stats.branch_points += 1;
            }
        }
        stats
    }
}

impl ExportParser {
    /// Create a new parser with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted input size in bytes (0 = unlimited).
    #[must_use]
    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    /// Statistics about the last successful parse.
    #[must_use]
    pub const fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parse export text.
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub fn parse_str(&mut self, text: &str) -> Result<Vec<Conversation>> {
        let trimmed = text.trim_start();
        let conversations = if trimmed.starts_with('{') {
            vec![serde_json::from_str::<Conversation>(text).map_err(ReaderError::parse_with_source)?]
        } else if trimmed.is_empty() {
            return Err(ReaderError::parse("input is empty"));
        } else {
            serde_json::from_str::<Vec<Conversation>>(text).map_err(ReaderError::parse_with_source)?
        };

        self.stats = ParseStats::of(&conversations);
        debug!(stats = ?self.stats, "Parsed export");
        Ok(conversations)
    }

    /// Parse an export from any reader.
    pub fn parse_reader<R: Read>(&mut self, reader: R) -> Result<Vec<Conversation>> {
        let mut text = String::new();
        let mut reader = BufReader::new(reader);
        if self.max_file_size > 0 {
            let read = (&mut reader)
                .take(self.max_file_size + 1)
                .read_to_string(&mut text)
                .map_err(|e| read_error(e))?;
            if read as u64 > self.max_file_size {
                return Err(ReaderError::invalid_argument(
                    "input",
                    format!("exceeds maximum size of {} bytes", self.max_file_size),
                ));
            }
        } else {
            reader.read_to_string(&mut text).map_err(|e| read_error(e))?;
        }
        self.parse_str(&text)
    }

    /// Parse an export file. `-` reads standard input.
    ///
    /// Files must carry a `.json` extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Conversation>> {
        let path = path.as_ref();
        if path.as_os_str() == STDIN_PATH {
            return self.parse_reader(std::io::stdin().lock());
        }

        if !is_json_path(path) {
            return Err(ReaderError::NotJson {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|e| ReaderError::from_io_at(path, e))?;
        let conversations = self.parse_reader(file)?;
        info!(
            conversations = self.stats.conversations,
            nodes = self.stats.nodes,
            "Loaded {}",
            path.display()
        );
        Ok(conversations)
    }
}

/// Whether a path names a JSON file.
#[must_use]
pub fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read_error(e: std::io::Error) -> ReaderError {
    if e.kind() == std::io::ErrorKind::InvalidData {
        ReaderError::parse("input is not valid UTF-8")
    } else {
        ReaderError::io("reading conversation data", e)
    }
}

/// Parse export text with default settings.
pub fn parse_str(text: &str) -> Result<Vec<Conversation>> {
    ExportParser::new().parse_str(text)
}

/// Load an export file with default settings.
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<Conversation>> {
    ExportParser::new().parse_file(path)
}

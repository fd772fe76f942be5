//! Error types for deepseek-reader.
//!
//! Errors follow the thiserror pattern and carry enough context to be shown
//! directly to the user. Only input loading, configuration and output writing
//! can fail; the tree walker and renderers degrade instead of erroring.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for deepseek-reader operations.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// The conversation export could not be parsed.
    #[error("Failed to parse conversation data at line {line}, column {column}: {message}")]
    ParseError {
        /// Line number where parsing failed (1-based, 0 when unknown).
        line: usize,
        /// Column number where parsing failed (1-based, 0 when unknown).
        column: usize,
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The input is not a JSON export.
    #[error("Not a JSON file: {path}")]
    NotJson {
        /// Path that was rejected.
        path: PathBuf,
    },

    /// Permission denied when accessing a file or directory.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// No conversation matched the requested identifier.
    #[error("Conversation not found: {id}")]
    ConversationNotFound {
        /// Identifier or prefix that was looked up.
        id: String,
    },

    /// A conversation prefix matched more than one conversation.
    #[error("Conversation id '{prefix}' is ambiguous ({count} matches)")]
    AmbiguousConversation {
        /// The prefix that was looked up.
        prefix: String,
        /// Number of conversations it matched.
        count: usize,
    },

    /// Writing an output artifact (saved code block, report) failed.
    #[error("Export failed: {message}")]
    ExportError {
        /// Human-readable error message.
        message: String,
        /// Underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },

    /// TUI error.
    #[error("TUI error: {message}")]
    TuiError {
        /// Human-readable error message.
        message: String,
    },

    /// Clipboard access failed.
    #[error("Clipboard unavailable: {message}")]
    ClipboardError {
        /// Human-readable error message.
        message: String,
    },
}

impl ReaderError {
    /// Create a new parse error without a source.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            line: 0,
            column: 0,
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error from a serde_json failure, keeping its position.
    #[must_use]
    pub fn parse_with_source(source: serde_json::Error) -> Self {
        Self::ParseError {
            line: source.line(),
            column: source.column(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new invalid argument error.
    #[must_use]
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Map an I/O failure on `path` to the most specific variant.
    #[must_use]
    pub fn from_io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::io(format!("reading {}", path.display()), source),
        }
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } | Self::NotJson { .. } => 2,
            Self::FileNotFound { .. } | Self::ConversationNotFound { .. } => 3,
            Self::PermissionDenied { .. } => 4,
            Self::ConfigError { .. } | Self::InvalidConfig { .. } => 5,
            Self::ExportError { .. } | Self::ClipboardError { .. } => 6,
            Self::InvalidArgument { .. } | Self::AmbiguousConversation { .. } => 64,
            Self::IoError { .. } => 74,
            _ => 1,
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Recoverable errors leave the previously loaded state intact, so an
    /// interactive session can report them and keep running.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ParseError { .. }
                | Self::NotJson { .. }
                | Self::FileNotFound { .. }
                | Self::PermissionDenied { .. }
                | Self::ExportError { .. }
                | Self::ClipboardError { .. }
        )
    }
}

/// Result type alias for deepseek-reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

impl From<std::io::Error> for ReaderError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ReaderError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Conversation data could not be parsed.
    pub const EXIT_PARSE_ERROR: i32 = 2;
    /// Specified file or conversation not found.
    pub const EXIT_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Writing output failed.
    pub const EXIT_EXPORT_ERROR: i32 = 6;
    /// Invalid command-line usage (BSD standard).
    pub const EXIT_USAGE_ERROR: i32 = 64;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let parse_err = ReaderError::parse("test");
        assert_eq!(parse_err.exit_code(), exit_codes::EXIT_PARSE_ERROR);

        let not_found = ReaderError::FileNotFound {
            path: PathBuf::from("/test"),
        };
        assert_eq!(not_found.exit_code(), exit_codes::EXIT_NOT_FOUND);

        let usage = ReaderError::invalid_argument("branch", "must be positive");
        assert_eq!(usage.exit_code(), exit_codes::EXIT_USAGE_ERROR);

    }

    #[test]
    fn test_parse_error_keeps_position() {
        let err = serde_json::from_str::<serde_json::Value>("[\n  {,\n]").unwrap_err();
        let parsed = ReaderError::parse_with_source(err);
        match parsed {
            ReaderError::ParseError { line, column, .. } => {
                assert_eq!(line, 2);
                assert!(column > 0);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_from_io_at_maps_kind() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            ReaderError::from_io_at("x.json", err),
            ReaderError::FileNotFound { .. }
        ));

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert!(matches!(
            ReaderError::from_io_at("x.json", err),
            ReaderError::PermissionDenied { .. }
        ));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(ReaderError::parse("test").is_recoverable());
        assert!(!ReaderError::ConfigError {
            message: "bad".to_string()
        }
        .is_recoverable());
    }
}

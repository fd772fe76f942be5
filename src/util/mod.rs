//! Utility functions for common operations.
//!
//! - Atomic file writes for config and saved code blocks
//! - Time zone aware date formatting and day boundaries
//! - Debounced scheduling for search input

pub mod debounce;
pub mod time;

pub use debounce::Debounced;
pub use time::Zone;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{ReaderError, Result};

/// Atomically write content to a file.
///
/// The content goes to a temporary file in the target directory, which is
/// then renamed over the target. On failure the original file is unchanged.
/// Missing parent directories are created.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(ReaderError::IoError {
                context: format!("Cannot determine parent directory for: {}", path.display()),
                source: io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
            })
        }
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ReaderError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        ReaderError::io(
            format!("Failed to create temporary file in: {}", parent.display()),
            e,
        )
    })?;

    temp_file
        .write_all(content)
        .and_then(|()| temp_file.flush())
        .map_err(|e| {
            ReaderError::io(
                format!("Failed to write temporary file for: {}", path.display()),
                e,
            )
        })?;

    temp_file.persist(path).map_err(|e| {
        ReaderError::io(
            format!("Failed to atomically write file: {}", path.display()),
            e.error,
        )
    })?;

    Ok(())
}

/// First path of the form `dir/stem.ext`, `dir/stem-2.ext`, ... that does
/// not exist yet.
#[must_use]
pub fn unique_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{stem}.{ext}"));
    if !candidate.exists() {
        return candidate;
    }
    (2..)
        .map(|n| dir.join(format!("{stem}-{n}.{ext}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_unique_path() {
        let dir = TempDir::new().unwrap();
        let first = unique_path(dir.path(), "code", "rs");
        assert_eq!(first, dir.path().join("code.rs"));

        std::fs::write(&first, "").unwrap();
        assert_eq!(unique_path(dir.path(), "code", "rs"), dir.path().join("code-2.rs"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 8), "a longe…");
        assert_eq!(truncate("日本語のタイトル", 4), "日本語…");
    }
}

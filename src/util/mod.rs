//! Utility functions for common operations.
//!
//! This module provides shared utilities used across the crate:
//! - Atomic file operations for data safety
//! - Text shortening for list and summary previews
//! - HTML escaping

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{ArchiveError, Result};

/// Placeholder shown for prompts with no text at all.
pub const UNTITLED_PROMPT: &str = "Untitled Prompt";

/// Atomically write content to a file.
///
/// This function ensures data integrity by:
/// 1. Writing to a temporary file in the same directory
/// 2. Flushing the data
/// 3. Atomically renaming the temp file to the target path
///
/// If any step fails, the original file (if it exists) remains unchanged.
///
/// # Example
///
/// ```rust,no_run
/// use studio_archive::util::atomic_write;
///
/// atomic_write("config.toml", b"[export]\nformat = \"html\"\n").unwrap();
/// ```
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let mut file = AtomicFile::create(path)?;
    file.writer().write_all(content).map_err(|e| {
        ArchiveError::io(
            format!("Failed to write to temporary file for: {}", file.target().display()),
            e,
        )
    })?;
    file.finish()
}

/// An atomic file writer.
///
/// Wraps a `NamedTempFile` created beside the target. Call [`finish`] to
/// move it into place; dropping it without finishing leaves the target
/// untouched.
///
/// [`finish`]: AtomicFile::finish
///
/// # Example
///
/// ```rust,no_run
/// use studio_archive::util::AtomicFile;
/// use std::io::Write;
///
/// let mut atomic = AtomicFile::create("archive.html").unwrap();
/// writeln!(atomic.writer(), "<!DOCTYPE html>").unwrap();
/// atomic.finish().unwrap();
/// ```
pub struct AtomicFile {
    temp_file: NamedTempFile,
    target_path: PathBuf,
}

impl AtomicFile {
    /// Create a new atomic file writer for the given target path.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // A bare file name has an empty parent; use the working directory.
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            Some(_) => Path::new("."),
            None => {
                return Err(ArchiveError::IoError {
                    context: format!("Cannot determine parent directory for: {}", path.display()),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
                })
            }
        };

        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ArchiveError::io(format!("Failed to create directory: {}", parent.display()), e)
            })?;
        }

        // Same directory keeps the final rename on one filesystem.
        let temp_file = NamedTempFile::new_in(parent).map_err(|e| {
            ArchiveError::io(
                format!("Failed to create temporary file in: {}", parent.display()),
                e,
            )
        })?;

        Ok(Self {
            temp_file,
            target_path: path.to_path_buf(),
        })
    }

    /// Get a mutable reference to the underlying writer.
    pub fn writer(&mut self) -> &mut NamedTempFile {
        &mut self.temp_file
    }

    /// The path the file will be moved to.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target_path
    }

    /// Finish the atomic write by flushing and renaming the temp file.
    pub fn finish(mut self) -> Result<()> {
        self.temp_file.flush().map_err(|e| {
            ArchiveError::io(format!("Failed to flush file: {}", self.target_path.display()), e)
        })?;

        self.temp_file.persist(&self.target_path).map_err(|e| {
            ArchiveError::io(
                format!("Failed to atomically write: {}", self.target_path.display()),
                e.error,
            )
        })?;

        Ok(())
    }
}

/// Shorten text to its first line, capped at `max_chars` characters.
///
/// A first line that fits is returned as is. A longer one is cut, trimmed
/// and suffixed with `...`. Empty or missing text yields
/// [`UNTITLED_PROMPT`].
#[must_use]
pub fn truncate_text(text: Option<&str>, max_chars: usize) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return UNTITLED_PROMPT.to_string();
    };

    let first_line = text.split('\n').next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        return first_line.to_string();
    }

    let cut: String = first_line.chars().take(max_chars).collect();
    format!("{}...", cut.trim())
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Format a byte count for humans.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

//! Loading of AI Studio archive files.
//!
//! An archive is a single JSON document. Loading happens in two steps so the
//! two failure modes stay distinct:
//! - the bytes must be valid JSON ([`ArchiveError::ParseError`], with line and
//!   column)
//! - the JSON must be an object whose known fields have the expected types
//!   ([`ArchiveError::InvalidDocument`])
//!
//! Missing fields are never errors; a document without
//! `chunkedPrompt.chunks` loads as an empty conversation.
//!
//! # Example
//!
//! ```rust,no_run
//! use studio_archive::parser::DocumentLoader;
//!
//! let mut loader = DocumentLoader::new().with_max_file_size(64 * 1024 * 1024);
//! let document = loader.load_file("conversation.json")?;
//! println!("Loaded {} chunks", document.chunks().len());
//! # Ok::<(), studio_archive::ArchiveError>(())
//! ```

use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::error::{ArchiveError, Result};
use crate::model::ArchiveDocument;

/// Default maximum file size (unlimited).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 0;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Loader for archive documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    /// Maximum file size in bytes (0 = unlimited).
    max_file_size: u64,
    /// Statistics about the last load.
    stats: LoadStats,
}

/// Statistics about the last load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Bytes of input consumed.
    pub bytes: usize,
    /// Chunks in the document.
    pub chunks: usize,
    /// User-role chunks.
    pub user_chunks: usize,
    /// Model-role chunks.
    pub model_chunks: usize,
    /// Chunks with any other role.
    pub other_chunks: usize,
}

impl LoadStats {
    fn from_document(bytes: usize, document: &ArchiveDocument) -> Self {
        let chunks = document.chunks();
        let user_chunks = chunks.iter().filter(|c| c.is_user()).count();
        let model_chunks = chunks.iter().filter(|c| c.is_model()).count();
        Self {
            bytes,
            chunks: chunks.len(),
            user_chunks,
            model_chunks,
            other_chunks: chunks.len() - user_chunks - model_chunks,
        }
    }
}

impl DocumentLoader {
    /// Create a loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            stats: LoadStats::default(),
        }
    }

    /// Set maximum file size in bytes (0 = unlimited).
    #[must_use]
    pub fn with_max_file_size(mut self, max_bytes: u64) -> Self {
        self.max_file_size = max_bytes;
        self
    }

    /// Maximum file size in bytes (0 = unlimited).
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Statistics about the last successful load.
    #[must_use]
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Load an archive from a file.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<ArchiveDocument> {
        let path = path.as_ref();
        debug!("Reading archive file");

        self.check_size(path, std::fs::metadata(path).map_err(|e| open_error(path, e))?.len())?;
        let bytes = std::fs::read(path).map_err(|e| open_error(path, e))?;
        self.load_slice(&bytes)
    }

    /// Load an archive from a string.
    pub fn load_str(&mut self, content: &str) -> Result<ArchiveDocument> {
        self.load_slice(content.as_bytes())
    }

    /// Load an archive from raw bytes.
    #[instrument(skip(self, bytes), fields(len = bytes.len()), level = "debug")]
    pub fn load_slice(&mut self, bytes: &[u8]) -> Result<ArchiveDocument> {
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            trace!(line = e.line(), column = e.column(), "Malformed JSON");
            ArchiveError::parse_with_source(e)
        })?;

        let document = document_from_value(value)?;
        self.stats = LoadStats::from_document(bytes.len(), &document);

        debug!(
            chunks = self.stats.chunks,
            user = self.stats.user_chunks,
            model = self.stats.model_chunks,
            "Archive loaded"
        );
        Ok(document)
    }

    pub(crate) fn check_size(&self, path: &Path, size: u64) -> Result<()> {
        trace!(size, max_size = self.max_file_size, "Checking file size limit");
        if self.max_file_size > 0 && size > self.max_file_size {
            return Err(ArchiveError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }
}

/// Convert an already-parsed JSON value into a document.
pub fn document_from_value(value: Value) -> Result<ArchiveDocument> {
    if !value.is_object() {
        return Err(ArchiveError::invalid_document(format!(
            "expected a JSON object at the top level, found {}",
            json_type_name(&value)
        )));
    }

    serde_json::from_value(value).map_err(|e| ArchiveError::invalid_document(e.to_string()))
}

/// Map an I/O error on the input file to the matching archive error.
pub(crate) fn open_error(path: &Path, e: std::io::Error) -> ArchiveError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ArchiveError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ArchiveError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ArchiveError::io(format!("Failed to read {}", path.display()), e),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

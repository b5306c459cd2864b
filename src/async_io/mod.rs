//! Async I/O operations for non-blocking file handling.
//!
//! Async counterparts of the loader and the export writer, built on tokio.
//! Parsing and rendering are CPU-bound and stay synchronous; only the file
//! system work is awaited.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::export::{ExportFormat, ExportOptions};
use crate::model::ArchiveDocument;
use crate::parser::{open_error, DocumentLoader};
use crate::session::DocumentSession;

/// Async reader for archive files.
#[derive(Debug, Clone)]
pub struct AsyncDocumentReader {
    path: PathBuf,
    max_file_size: u64,
}

impl AsyncDocumentReader {
    /// Create a new async reader.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_file_size: 0,
        }
    }

    /// Set maximum file size in bytes (0 = unlimited).
    #[must_use]
    pub fn with_max_file_size(mut self, max_bytes: u64) -> Self {
        self.max_file_size = max_bytes;
        self
    }

    /// Read and parse the archive.
    pub async fn load(&self) -> Result<ArchiveDocument> {
        let mut loader = DocumentLoader::new().with_max_file_size(self.max_file_size);

        let metadata = fs::metadata(&self.path)
            .await
            .map_err(|e| open_error(&self.path, e))?;
        loader.check_size(&self.path, metadata.len())?;

        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| open_error(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Read archive asynchronously");

        loader.load_slice(&bytes)
    }

    /// Read, parse and reconstruct the archive.
    pub async fn load_session(&self) -> Result<DocumentSession> {
        self.load().await.map(DocumentSession::from_document)
    }
}

/// Async file writer with atomic semantics.
///
/// Content goes to a uniquely named temp file beside the target, which is
/// renamed over the target once fully written.
#[derive(Debug, Clone)]
pub struct AsyncWriter {
    path: PathBuf,
}

impl AsyncWriter {
    /// Create a new async writer.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Write bytes to the file atomically.
    pub async fn write_bytes(&self, content: &[u8]) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).await.map_err(|e| {
            ArchiveError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;

        // Same directory keeps the final rename on one filesystem.
        let (file, temp_path) = tempfile::Builder::new()
            .prefix(".studio-archive-")
            .tempfile_in(&parent)
            .map_err(|e| {
                ArchiveError::io(format!("Failed to create temporary file in: {}", parent.display()), e)
            })?
            .into_parts();

        let mut file = fs::File::from_std(file);
        file.write_all(content)
            .await
            .map_err(|e| ArchiveError::io("Failed to write content", e))?;
        file.flush()
            .await
            .map_err(|e| ArchiveError::io("Failed to flush file", e))?;
        drop(file);

        // On failure the temp path is dropped, which removes the temp file.
        temp_path.persist(&self.path).map_err(|e| {
            ArchiveError::io(format!("Failed to rename temp file to: {}", self.path.display()), e.error)
        })?;

        debug!(path = %self.path.display(), bytes = content.len(), "Wrote file asynchronously");
        Ok(())
    }

    /// Write text to the file atomically.
    pub async fn write(&self, content: &str) -> Result<()> {
        self.write_bytes(content.as_bytes()).await
    }
}

/// Write a file asynchronously with atomic semantics.
pub async fn write_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    AsyncWriter::new(path).write(content).await
}

/// Render a session and write it to `path` without blocking the runtime.
pub async fn export_session_async(
    session: DocumentSession,
    path: impl AsRef<Path>,
    format: ExportFormat,
    options: ExportOptions,
) -> Result<()> {
    let rendered = tokio::task::spawn_blocking(move || {
        crate::export::export_to_string(&session, format, &options)
    })
    .await
    .map_err(|e| ArchiveError::ExportError {
        message: "export task did not complete".to_string(),
        source: Some(Box::new(e)),
    })??;

    write_file(path, &rendered).await
}

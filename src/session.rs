//! Loaded-document state.
//!
//! A [`DocumentSession`] owns one parsed archive together with the logical
//! prompts reconstructed from it. A [`Viewer`] holds at most one session and
//! swaps it only when a new document loads successfully, so a bad file never
//! clobbers the conversation already on screen.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{ArchiveError, Result};
use crate::model::{ArchiveDocument, Chunk, LogicalPrompt, ResponseEntry};
use crate::parser::DocumentLoader;
use crate::reconstruction::{reconstruct, response_window, TranscriptStats};

/// A parsed archive and its reconstructed prompts.
#[derive(Debug, Clone)]
pub struct DocumentSession {
    document: ArchiveDocument,
    prompts: Vec<LogicalPrompt>,
}

/// A prompt paired with the model chunks that answer it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange<'a> {
    /// Position of the prompt in the prompt list.
    pub prompt_index: usize,
    /// The prompt.
    pub prompt: &'a LogicalPrompt,
    /// The prompt's response window.
    pub responses: Vec<ResponseEntry<'a>>,
}

impl Exchange<'_> {
    /// Whether no model chunk answered the prompt directly.
    #[must_use]
    pub fn is_unanswered(&self) -> bool {
        self.responses.is_empty()
    }
}

impl DocumentSession {
    /// Build a session from an already-parsed document.
    #[must_use]
    pub fn from_document(document: ArchiveDocument) -> Self {
        let prompts = reconstruct(document.chunks());
        debug!(
            chunks = document.chunks().len(),
            prompts = prompts.len(),
            "Session built"
        );
        Self { document, prompts }
    }

    /// Parse raw bytes into a session.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        DocumentLoader::new().load_slice(bytes).map(Self::from_document)
    }

    /// Load a file into a session.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        DocumentLoader::new().load_file(path).map(Self::from_document)
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &ArchiveDocument {
        &self.document
    }

    /// The raw chunk sequence.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        self.document.chunks()
    }

    /// All logical prompts, in source order.
    #[must_use]
    pub fn prompts(&self) -> &[LogicalPrompt] {
        &self.prompts
    }

    /// Whether the document produced no prompts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// The prompt at `index` in the prompt list.
    pub fn prompt(&self, index: usize) -> Result<&LogicalPrompt> {
        self.prompts.get(index).ok_or(ArchiveError::PromptNotFound {
            index,
            available: self.prompts.len(),
        })
    }

    /// The prompt reconstructed from the raw chunk at `chunk_index`, if any.
    #[must_use]
    pub fn prompt_at_chunk(&self, chunk_index: usize) -> Option<&LogicalPrompt> {
        // Prompts are emitted in strictly increasing source order.
        self.prompts
            .binary_search_by_key(&chunk_index, |prompt| prompt.source_index)
            .ok()
            .map(|position| &self.prompts[position])
    }

    /// Readable body of the raw chunk at `chunk_index`.
    ///
    /// The chunk text when present; a file upload shows its reconstructed
    /// label. `None` for chunks with neither.
    #[must_use]
    pub fn chunk_body(&self, chunk_index: usize) -> Option<&str> {
        let chunk = self.chunks().get(chunk_index)?;
        match chunk.non_empty_text() {
            Some(text) => Some(text),
            None if chunk.has_drive_document() => Some(
                self.prompt_at_chunk(chunk_index)
                    .map_or(crate::model::UPLOADED_DOCUMENT_LABEL, |prompt| {
                        prompt.display_text.as_str()
                    }),
            ),
            None => None,
        }
    }

    /// The prompt at `index` together with its response window.
    pub fn exchange(&self, index: usize) -> Result<Exchange<'_>> {
        let prompt = self.prompt(index)?;
        Ok(Exchange {
            prompt_index: index,
            prompt,
            responses: response_window(self.chunks(), prompt.source_index),
        })
    }

    /// Every prompt with its response window.
    pub fn exchanges(&self) -> impl Iterator<Item = Exchange<'_>> {
        self.prompts
            .iter()
            .enumerate()
            .map(move |(prompt_index, prompt)| Exchange {
                prompt_index,
                prompt,
                responses: response_window(self.chunks(), prompt.source_index),
            })
    }

    /// Prompts whose text contains `term`, ignoring case.
    ///
    /// Text prompts match on their raw text, file prompts on their label.
    /// An empty term matches everything.
    pub fn search<'a>(&'a self, term: &str) -> Vec<(usize, &'a LogicalPrompt)> {
        let needle = term.to_lowercase();
        self.prompts
            .iter()
            .enumerate()
            .filter(|(_, prompt)| prompt.search_text().to_lowercase().contains(&needle))
            .collect()
    }

    /// Summary counts for the transcript.
    #[must_use]
    pub fn stats(&self) -> TranscriptStats {
        TranscriptStats::compute(self.chunks(), &self.prompts)
    }
}

/// Holder of the currently loaded session.
#[derive(Debug, Default)]
pub struct Viewer {
    current: Option<DocumentSession>,
    loader: DocumentLoader,
}

impl Viewer {
    /// Create an empty viewer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a loader with custom limits.
    #[must_use]
    pub fn with_loader(mut self, loader: DocumentLoader) -> Self {
        self.loader = loader;
        self
    }

    /// The loaded session, if any.
    #[must_use]
    pub fn current(&self) -> Option<&DocumentSession> {
        self.current.as_ref()
    }

    /// Whether a session is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Load a document from bytes, replacing the session on success.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&DocumentSession> {
        let result = self.loader.load_slice(bytes);
        self.install(result)
    }

    /// Load a document from a file, replacing the session on success.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&DocumentSession> {
        let result = self.loader.load_file(path);
        self.install(result)
    }

    /// Async variant of [`Viewer::load_file`].
    pub async fn load_file_async(&mut self, path: impl AsRef<Path>) -> Result<&DocumentSession> {
        let reader = crate::async_io::AsyncDocumentReader::new(path)
            .with_max_file_size(self.loader.max_file_size());
        let result = reader.load().await;
        self.install(result)
    }

    /// Drop the current session.
    pub fn clear(&mut self) {
        self.current = None;
    }

    fn install(&mut self, result: Result<ArchiveDocument>) -> Result<&DocumentSession> {
        match result {
            Ok(document) => {
                let session = DocumentSession::from_document(document);
                info!(prompts = session.prompts().len(), "Document loaded");
                Ok(self.current.insert(session))
            }
            Err(e) => {
                warn!(error = %e, kept_previous = self.current.is_some(), "Document load failed");
                Err(e)
            }
        }
    }
}

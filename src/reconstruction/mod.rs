//! Conversation reconstruction from a flat chunk sequence.
//!
//! This module handles:
//! - Turning user chunks into [`LogicalPrompt`]s, one per text chunk and one
//!   per uploaded file
//! - Grouping consecutive file uploads into batches and naming them from the
//!   next user caption
//! - Resolving the run of model chunks that answers each prompt
//!
//! Both entry points are pure and total: any chunk sequence produces a result,
//! and running them twice on the same input gives the same output.

mod filenames;

pub use filenames::*;

use serde::Serialize;
use tracing::{debug, trace};

use crate::model::{Chunk, ChunkKind, LogicalPrompt, ResponseEntry};

/// A maximal run of consecutive user-role file-upload chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileBatch {
    /// Index of the first file chunk.
    pub start: usize,
    /// Number of file chunks in the batch.
    pub len: usize,
    /// Index of the first later user chunk with non-empty text, if any.
    pub caption_index: Option<usize>,
}

impl FileBatch {
    /// Index just past the last file chunk.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    /// Source indices of the batch members.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }

    /// Locate the batch starting at `start`.
    ///
    /// Membership requires both user role and a drive document, so any other
    /// chunk (including a file marker on a model chunk) ends the batch.
    #[must_use]
    pub fn collect(chunks: &[Chunk], start: usize) -> Self {
        let len = chunks
            .get(start..)
            .unwrap_or_default()
            .iter()
            .take_while(|chunk| chunk.is_user_file())
            .count();
        let end = start + len;
        let caption_index = chunks
            .get(end..)
            .unwrap_or_default()
            .iter()
            .position(Chunk::is_user_text)
            .map(|offset| end + offset);

        Self {
            start,
            len,
            caption_index,
        }
    }

    /// Filenames mined from the caption chunk, in order. Empty without a caption.
    #[must_use]
    pub fn filenames(&self, chunks: &[Chunk]) -> Vec<String> {
        self.caption_index
            .and_then(|index| chunks.get(index))
            .and_then(Chunk::non_empty_text)
            .map(extract_filenames)
            .unwrap_or_default()
    }
}

/// Rebuild the ordered list of user turns from a raw chunk sequence.
///
/// Prompts appear in source order. Every user text chunk and every user file
/// chunk yields exactly one prompt; nothing else does. A caption chunk is not
/// consumed by the file batch before it and yields its own text prompt.
#[must_use]
pub fn reconstruct(chunks: &[Chunk]) -> Vec<LogicalPrompt> {
    let mut prompts = Vec::new();
    let mut i = 0;

    while i < chunks.len() {
        let chunk = &chunks[i];

        match chunk.kind() {
            ChunkKind::NonUser | ChunkKind::Empty => {
                i += 1;
            }
            ChunkKind::Text => {
                let text = chunk.non_empty_text().unwrap_or_default();
                prompts.push(LogicalPrompt::from_text(text, chunk.token_count.clone(), i));
                i += 1;
            }
            ChunkKind::FileUpload => {
                let batch = FileBatch::collect(chunks, i);
                let names = batch.filenames(chunks);

                trace!(
                    start = batch.start,
                    len = batch.len,
                    caption = ?batch.caption_index,
                    names = names.len(),
                    "Resolved file batch"
                );
                if batch.caption_index.is_none() {
                    debug!(start = batch.start, "File batch has no caption chunk");
                }

                for (position, index) in batch.indices().enumerate() {
                    prompts.push(LogicalPrompt::from_file(
                        names.get(position).map(String::as_str),
                        chunks[index].token_count.clone(),
                        index,
                    ));
                }

                i = batch.end();
            }
        }
    }

    debug!(
        chunks = chunks.len(),
        prompts = prompts.len(),
        "Reconstructed logical prompts"
    );
    prompts
}

/// The model chunks answering the prompt whose source chunk is `source_index`.
///
/// Walks forward from `source_index + 1`, collecting model chunks (thoughts
/// included, in encounter order) until the next user chunk. Chunks with other
/// roles are stepped over. An empty result means no response followed.
#[must_use]
pub fn response_window(chunks: &[Chunk], source_index: usize) -> Vec<ResponseEntry<'_>> {
    let start = source_index.saturating_add(1);

    chunks
        .iter()
        .enumerate()
        .skip(start)
        .take_while(|(_, chunk)| !chunk.is_user())
        .filter(|(_, chunk)| chunk.is_model())
        .map(|(index, chunk)| ResponseEntry {
            index,
            chunk,
            is_thought: chunk.is_thought(),
        })
        .collect()
}

/// Summary counts for a reconstructed conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptStats {
    /// Raw chunks in the document.
    pub chunks: usize,
    /// Logical prompts.
    pub prompts: usize,
    /// Prompts synthesized from file uploads.
    pub file_prompts: usize,
    /// File prompts whose filename was recovered.
    pub named_files: usize,
    /// Model answer chunks.
    pub model_responses: usize,
    /// Model thought chunks.
    pub thoughts: usize,
    /// Prompts with an empty response window.
    pub unanswered_prompts: usize,
}

impl TranscriptStats {
    /// Compute statistics for a chunk sequence and its reconstructed prompts.
    #[must_use]
    pub fn compute(chunks: &[Chunk], prompts: &[LogicalPrompt]) -> Self {
        let file_prompts = prompts.iter().filter(|p| p.is_file()).count();
        let named_files = prompts
            .iter()
            .filter(|p| p.is_file() && p.display_text != crate::model::UPLOADED_DOCUMENT_LABEL)
            .count();
        let thoughts = chunks.iter().filter(|c| c.is_thought()).count();
        let model_chunks = chunks.iter().filter(|c| c.is_model()).count();
        let unanswered_prompts = prompts
            .iter()
            .filter(|p| response_window(chunks, p.source_index).is_empty())
            .count();

        Self {
            chunks: chunks.len(),
            prompts: prompts.len(),
            file_prompts,
            named_files,
            model_responses: model_chunks - thoughts,
            thoughts,
            unanswered_prompts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, UPLOADED_DOCUMENT_LABEL};
    use pretty_assertions::assert_eq;

    fn display_texts(prompts: &[LogicalPrompt]) -> Vec<&str> {
        prompts.iter().map(|p| p.display_text.as_str()).collect()
    }

    fn source_indices(prompts: &[LogicalPrompt]) -> Vec<usize> {
        prompts.iter().map(|p| p.source_index).collect()
    }

    #[test]
    fn test_empty_sequence() {
        assert!(reconstruct(&[]).is_empty());
        assert!(response_window(&[], 0).is_empty());
    }

    #[test]
    fn test_simple_exchange() {
        let chunks = vec![
            Chunk::user_text("Hello").with_token_count(2),
            Chunk::model_text("Hi there"),
            Chunk::user_text("Bye"),
            Chunk::model_text("Goodbye"),
        ];

        let prompts = reconstruct(&chunks);

        assert_eq!(display_texts(&prompts), vec!["Hello", "Bye"]);
        assert_eq!(source_indices(&prompts), vec![0, 2]);
        assert_eq!(prompts[0].token_count, Some(2.into()));
        assert_eq!(prompts[0].raw_text.as_deref(), Some("Hello"));
        assert!(prompts.iter().all(|p| p.role == Role::User));
    }

    #[test]
    fn test_filename_assignment_with_fallback() {
        let chunks = vec![
            Chunk::user_file(),
            Chunk::user_file(),
            Chunk::user_file(),
            Chunk::user_text("Processing `a.txt` and `b.csv` now"),
        ];

        let prompts = reconstruct(&chunks);

        assert_eq!(
            display_texts(&prompts),
            vec![
                "[File: a.txt]",
                "[File: b.csv]",
                UPLOADED_DOCUMENT_LABEL,
                "Processing `a.txt` and `b.csv` now",
            ]
        );
        assert!(prompts[..3].iter().all(|p| p.raw_text.is_none()));
        assert_eq!(source_indices(&prompts), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_no_caption_falls_back() {
        let chunks = vec![
            Chunk::user_text("earlier `x.txt`"),
            Chunk::model_text("ok"),
            Chunk::user_file(),
            Chunk::user_file(),
            Chunk::model_text("I see two files (y.txt)"),
        ];

        let prompts = reconstruct(&chunks);

        assert_eq!(
            display_texts(&prompts),
            vec!["earlier `x.txt`", UPLOADED_DOCUMENT_LABEL, UPLOADED_DOCUMENT_LABEL]
        );
    }

    #[test]
    fn test_extra_filenames_ignored() {
        let chunks = vec![
            Chunk::user_file(),
            Chunk::user_text("`one.txt` `two.txt` `three.txt`"),
        ];

        let prompts = reconstruct(&chunks);

        assert_eq!(
            display_texts(&prompts),
            vec!["[File: one.txt]", "`one.txt` `two.txt` `three.txt`"]
        );
    }

    #[test]
    fn test_caption_found_past_model_chunks() {
        let chunks = vec![
            Chunk::user_file(),
            Chunk::model_text("What should I do with it?"),
            Chunk::user_text("Summarise (notes.md)"),
        ];

        let prompts = reconstruct(&chunks);

        assert_eq!(
            display_texts(&prompts),
            vec!["[File: notes.md]", "Summarise (notes.md)"]
        );
    }

    #[test]
    fn test_caption_skips_empty_user_chunks() {
        let chunks = vec![
            Chunk::user_file(),
            Chunk::user_text(""),
            Chunk {
                role: Role::User,
                ..Chunk::default()
            },
            Chunk::user_text("look at `z.py`"),
        ];

        let prompts = reconstruct(&chunks);

        assert_eq!(display_texts(&prompts), vec!["[File: z.py]", "look at `z.py`"]);
        assert_eq!(source_indices(&prompts), vec![0, 3]);
    }

    #[test]
    fn test_separate_batches_share_later_caption() {
        // An empty user chunk splits the run into two batches; both scan
        // forward to the same caption and both start from its first filename.
        let chunks = vec![
            Chunk::user_file(),
            Chunk {
                role: Role::User,
                ..Chunk::default()
            },
            Chunk::user_file(),
            Chunk::user_text("`a.txt` and `b.txt`"),
        ];

        let prompts = reconstruct(&chunks);

        assert_eq!(
            display_texts(&prompts),
            vec!["[File: a.txt]", "[File: a.txt]", "`a.txt` and `b.txt`"]
        );
        assert_eq!(source_indices(&prompts), vec![0, 2, 3]);
    }

    #[test]
    fn test_model_file_marker_ends_batch() {
        let mut model_file = Chunk::model_text("");
        model_file.drive_document = Some(serde_json::json!({}));
        let chunks = vec![
            Chunk::user_file(),
            model_file,
            Chunk::user_file(),
            Chunk::user_text("`a.txt`"),
        ];

        let batch = FileBatch::collect(&chunks, 0);
        assert_eq!(batch.len, 1);
        assert_eq!(batch.caption_index, Some(3));

        let prompts = reconstruct(&chunks);
        assert_eq!(
            display_texts(&prompts),
            vec!["[File: a.txt]", "[File: a.txt]", "`a.txt`"]
        );
    }

    #[test]
    fn test_skip_rule_keeps_adjacency() {
        let chunks = vec![
            Chunk::user_text("q1"),
            Chunk {
                role: Role::User,
                ..Chunk::default()
            },
            Chunk::model_text("a1"),
        ];

        let prompts = reconstruct(&chunks);
        assert_eq!(display_texts(&prompts), vec!["q1"]);

        // Skipped for prompts, but still a user turn for the response window.
        assert!(response_window(&chunks, 0).is_empty());
    }

    #[test]
    fn test_response_window_boundary() {
        let chunks = vec![
            Chunk::user_text("q"),
            Chunk::model_text("answer"),
            Chunk::model_thought("thinking"),
            Chunk::user_text("next"),
        ];

        let window = response_window(&chunks, 0);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].index, 1);
        assert!(!window[0].is_thought);
        assert_eq!(window[1].index, 2);
        assert!(window[1].is_thought);

        assert!(response_window(&chunks, 3).is_empty());
    }

    #[test]
    fn test_response_window_steps_over_other_roles() {
        let chunks = vec![
            Chunk::user_text("q"),
            Chunk::model_thought("t"),
            Chunk {
                role: Role::Other,
                text: Some("tool output".into()),
                ..Chunk::default()
            },
            Chunk::model_text("a"),
        ];

        let window = response_window(&chunks, 0);
        let indices: Vec<usize> = window.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_response_window_out_of_range() {
        let chunks = vec![Chunk::user_text("q")];
        assert!(response_window(&chunks, 5).is_empty());
        assert!(response_window(&chunks, usize::MAX).is_empty());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let chunks = vec![
            Chunk::user_file(),
            Chunk::user_file(),
            Chunk::user_text("See `doc1.pdf` and (doc2.pdf)"),
            Chunk::model_text("ok"),
        ];

        let prompts = reconstruct(&chunks);

        assert_eq!(
            display_texts(&prompts),
            vec![
                "[File: doc1.pdf]",
                "[File: doc2.pdf]",
                "See `doc1.pdf` and (doc2.pdf)"
            ]
        );

        let window = response_window(&chunks, prompts[2].source_index);
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].chunk.text.as_deref(), Some("ok"));

        // File prompts are answered by nothing: the caption is a user chunk.
        assert!(response_window(&chunks, prompts[0].source_index).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let chunks = vec![
            Chunk::user_file(),
            Chunk::user_text("`a.txt`"),
            Chunk::model_thought("t"),
            Chunk::model_text("a"),
        ];
        assert_eq!(reconstruct(&chunks), reconstruct(&chunks));
    }

    #[test]
    fn test_transcript_stats() {
        let chunks = vec![
            Chunk::user_file(),
            Chunk::user_file(),
            Chunk::user_text("`a.txt`"),
            Chunk::model_thought("t"),
            Chunk::model_text("a"),
            Chunk::user_text("unanswered"),
        ];
        let prompts = reconstruct(&chunks);
        let stats = TranscriptStats::compute(&chunks, &prompts);

        assert_eq!(
            stats,
            TranscriptStats {
                chunks: 6,
                prompts: 4,
                file_prompts: 2,
                named_files: 1,
                model_responses: 1,
                thoughts: 1,
                unanswered_prompts: 3,
            }
        );
    }
}

//! Types derived by the reconstructor.

use serde::Serialize;

use super::{Chunk, Role, TokenCount};

/// Display label for a file upload whose name could not be recovered.
pub const UPLOADED_DOCUMENT_LABEL: &str = "[Uploaded Document]";

/// One reconstructed user turn.
///
/// Every logical prompt maps to exactly one raw chunk through `source_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalPrompt {
    /// Always [`Role::User`].
    pub role: Role,
    /// Original text for text chunks; `None` for file uploads.
    pub raw_text: Option<String>,
    /// Human-facing label.
    pub display_text: String,
    /// Token count of the source chunk.
    pub token_count: Option<TokenCount>,
    /// Index of the source chunk in the raw sequence.
    pub source_index: usize,
}

impl LogicalPrompt {
    /// Prompt for a user text chunk.
    pub fn from_text(text: impl Into<String>, token_count: Option<TokenCount>, source_index: usize) -> Self {
        let text = text.into();
        Self {
            role: Role::User,
            display_text: text.clone(),
            raw_text: Some(text),
            token_count,
            source_index,
        }
    }

    /// Prompt for a file upload, labelled with a recovered filename when one exists.
    #[must_use]
    pub fn from_file(filename: Option<&str>, token_count: Option<TokenCount>, source_index: usize) -> Self {
        let display_text = match filename {
            Some(name) => file_label(name),
            None => UPLOADED_DOCUMENT_LABEL.to_string(),
        };
        Self {
            role: Role::User,
            raw_text: None,
            display_text,
            token_count,
            source_index,
        }
    }

    /// Whether the prompt was synthesized from a file upload.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.raw_text.is_none()
    }

    /// Text used for searching: the raw text, else the display label.
    #[must_use]
    pub fn search_text(&self) -> &str {
        self.raw_text.as_deref().unwrap_or(&self.display_text)
    }
}

/// `[File: <name>]`.
#[must_use]
pub fn file_label(name: &str) -> String {
    format!("[File: {name}]")
}

/// One model chunk inside a prompt's response window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntry<'a> {
    /// Index of the chunk in the raw sequence.
    pub index: usize,
    /// The model chunk.
    pub chunk: &'a Chunk,
    /// Whether the chunk is a thought trace.
    pub is_thought: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_prompt() {
        let prompt = LogicalPrompt::from_text("hello", Some(4.into()), 2);
        assert_eq!(prompt.raw_text.as_deref(), Some("hello"));
        assert_eq!(prompt.display_text, "hello");
        assert_eq!(prompt.role, Role::User);
        assert!(!prompt.is_file());
    }

    #[test]
    fn test_file_prompt_labels() {
        let named = LogicalPrompt::from_file(Some("a.txt"), None, 0);
        assert_eq!(named.display_text, "[File: a.txt]");
        assert!(named.is_file());
        assert_eq!(named.search_text(), "[File: a.txt]");

        let anonymous = LogicalPrompt::from_file(None, None, 1);
        assert_eq!(anonymous.display_text, UPLOADED_DOCUMENT_LABEL);
        assert_eq!(anonymous.raw_text, None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let prompt = LogicalPrompt::from_text("hi", None, 0);
        let json = serde_json::to_value(&prompt).unwrap();
        assert_eq!(json["displayText"], "hi");
        assert_eq!(json["sourceIndex"], 0);
        assert_eq!(json["role"], "user");
    }
}

//! Raw conversation chunks.
//!
//! A chunk is one entry of `chunkedPrompt.chunks`. Chunks are read-only input
//! to the reconstructor: they are deserialized once and never mutated.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::UnknownFields;

/// Token count metadata. Any JSON number is accepted, integral or not.
pub type TokenCount = Number;

/// Author of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human turn (text or uploaded file).
    User,
    /// Model output, either an answer or a thought trace.
    Model,
    /// Any role string the viewer does not recognise, or a missing role.
    #[default]
    #[serde(other)]
    Other,
}

impl Role {
    /// Lowercase role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic unit of the raw conversation sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Chunk author.
    #[serde(default)]
    pub role: Role,

    /// Text payload of ordinary turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Opaque marker present when the chunk is an uploaded file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_document: Option<Value>,

    /// Marks a model chunk as an internal reasoning trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_thought: Option<bool>,

    /// Token count metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<TokenCount>,

    /// Fields the viewer does not interpret (finishReason, parts, ...).
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// How the reconstructor classifies a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// Non-user chunk; never becomes a prompt directly.
    NonUser,
    /// User chunk with non-empty text.
    Text,
    /// User chunk carrying an uploaded file.
    FileUpload,
    /// User chunk with neither text nor a file; skipped.
    Empty,
}

impl Chunk {
    /// Create a user text chunk.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a user file-upload chunk with an empty drive document marker.
    #[must_use]
    pub fn user_file() -> Self {
        Self {
            role: Role::User,
            drive_document: Some(Value::Object(serde_json::Map::new())),
            ..Self::default()
        }
    }

    /// Create a model answer chunk.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a model thought chunk.
    pub fn model_thought(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: Some(text.into()),
            is_thought: Some(true),
            ..Self::default()
        }
    }

    /// Builder: set the token count.
    #[must_use]
    pub fn with_token_count(mut self, count: u64) -> Self {
        self.token_count = Some(count.into());
        self
    }

    /// Whether this chunk was authored by the user.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Whether this chunk was authored by the model.
    #[must_use]
    pub fn is_model(&self) -> bool {
        self.role == Role::Model
    }

    /// Whether this is a model thought trace. Always false for non-model chunks.
    #[must_use]
    pub fn is_thought(&self) -> bool {
        self.is_model() && self.is_thought.unwrap_or(false)
    }

    /// The text payload, if present and non-empty.
    #[must_use]
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }

    /// Whether the chunk carries an uploaded file marker.
    #[must_use]
    pub fn has_drive_document(&self) -> bool {
        self.drive_document.is_some()
    }

    /// Whether the chunk is a user-role file upload.
    #[must_use]
    pub fn is_user_file(&self) -> bool {
        self.is_user() && self.has_drive_document()
    }

    /// Whether the chunk is a user-role chunk with non-empty text.
    #[must_use]
    pub fn is_user_text(&self) -> bool {
        self.is_user() && self.non_empty_text().is_some()
    }

    /// Classify the chunk. Text wins over a drive document when both are present.
    #[must_use]
    pub fn kind(&self) -> ChunkKind {
        if !self.is_user() {
            ChunkKind::NonUser
        } else if self.non_empty_text().is_some() {
            ChunkKind::Text
        } else if self.has_drive_document() {
            ChunkKind::FileUpload
        } else {
            ChunkKind::Empty
        }
    }

    /// Header label used by the viewer and exporters.
    #[must_use]
    pub fn header_label(&self) -> &'static str {
        match self.role {
            Role::User => "User Prompt",
            Role::Model if self.is_thought() => "Model (Thought Process)",
            Role::Model => "Model Response",
            Role::Other => "Unknown Role",
        }
    }

    /// Token count rendered for display.
    #[must_use]
    pub fn token_label(&self) -> String {
        token_label(self.token_count.as_ref())
    }
}

/// Render an optional token count the way message metadata shows it.
///
/// Zero and missing counts read `N/A`. Integral floats drop their fraction.
#[must_use]
pub fn token_label(count: Option<&TokenCount>) -> String {
    let Some(count) = count else {
        return "N/A".to_string();
    };
    if let Some(whole) = count.as_u64() {
        return if whole == 0 { "N/A".to_string() } else { whole.to_string() };
    }
    if count.is_i64() {
        return count.to_string();
    }
    match count.as_f64() {
        Some(value) if value == 0.0 => "N/A".to_string(),
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{value:.0}"),
        _ => count.to_string(),
    }
}

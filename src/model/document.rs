//! The top-level archive document.
//!
//! Only `chunkedPrompt.chunks` feeds the reconstructor. Run settings,
//! citations, the system instruction, and the timestamps are carried through
//! for the presentation and export layers.

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Chunk, UnknownFields};

/// A parsed archive file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveDocument {
    /// Container of the raw chunk sequence.
    #[serde(default)]
    pub chunked_prompt: ChunkedPrompt,

    /// Generation settings, kept in file order.
    #[serde(default)]
    pub run_settings: IndexMap<String, Value>,

    /// Grounding citations.
    #[serde(default)]
    pub citations: Vec<Citation>,

    /// System instruction in any of its accepted shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Value>,

    /// When the conversation was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<Timestamp>,

    /// When the archive was exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_time: Option<Timestamp>,

    /// Everything else in the file.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// The `chunkedPrompt` object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkedPrompt {
    /// Ordered raw chunks. Missing means empty.
    #[serde(default)]
    pub chunks: Vec<Chunk>,

    /// Other fields such as `pendingInputs`.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// A citation entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Citation {
    /// Cited URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Other citation fields.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// A timestamp as it appears in archive files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// A date string, normally RFC 3339.
    Text(String),
    /// Anything else; kept but never interpreted.
    Unrecognized(Value),
}

impl Timestamp {
    /// Interpret the timestamp, if it is recognisable.
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Self::Text(text) => {
                let text = text.trim();
                DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
                    .or_else(|| {
                        chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                            .ok()
                            .and_then(|date| date.and_hms_opt(0, 0, 0))
                            .map(|naive| naive.and_utc())
                    })
            }
            Self::Unrecognized(_) => None,
        }
    }
}

impl ArchiveDocument {
    /// The raw chunk sequence.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunked_prompt.chunks
    }

    /// The document date used for export headers: `creationTime`, then `exportTime`.
    #[must_use]
    pub fn document_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
            .as_ref()
            .or(self.export_time.as_ref())
            .and_then(Timestamp::to_datetime)
    }

    /// The system instruction resolved into one of its display shapes.
    #[must_use]
    pub fn system_instruction(&self) -> Option<SystemInstruction> {
        self.system_instruction
            .as_ref()
            .and_then(SystemInstruction::resolve)
    }

    /// Run settings as display rows.
    #[must_use]
    pub fn run_setting_rows(&self) -> Vec<(&str, SettingValue)> {
        self.run_settings
            .iter()
            .map(|(key, value)| (key.as_str(), SettingValue::from_json(value)))
            .collect()
    }

    /// Citation URIs in order, with missing URIs as empty strings.
    #[must_use]
    pub fn citation_uris(&self) -> Vec<&str> {
        self.citations
            .iter()
            .map(|citation| citation.uri.as_deref().unwrap_or(""))
            .collect()
    }
}

/// A system instruction in one of the shapes the viewer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemInstruction {
    /// `{parts: [{text}, ...]}`; part texts in order (missing text is empty).
    Parts(Vec<String>),
    /// `{text: "..."}` with non-blank text.
    Text(String),
    /// Any other non-empty value, shown as raw JSON.
    Raw(Value),
}

impl SystemInstruction {
    /// Resolve a raw system instruction value. Returns `None` when there is
    /// nothing to show.
    #[must_use]
    pub fn resolve(value: &Value) -> Option<Self> {
        let object = match value {
            Value::Object(object) => object,
            Value::Null | Value::Bool(_) | Value::Number(_) => return None,
            other => return (!is_blank(other)).then(|| Self::Raw(other.clone())),
        };

        let parts = object.get("parts").and_then(Value::as_array);
        let resolved = match parts {
            Some(parts) if !parts.is_empty() => Self::Parts(
                parts
                    .iter()
                    .map(|part| {
                        part.get("text")
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string()
                    })
                    .collect(),
            ),
            _ => match object.get("text").and_then(Value::as_str) {
                Some(text) if !text.trim().is_empty() => Self::Text(text.to_string()),
                _ => {
                    let empty_parts = parts.is_some_and(|parts| parts.is_empty());
                    if object.is_empty() || empty_parts {
                        return None;
                    }
                    Self::Raw(value.clone())
                }
            },
        };

        Some(resolved).filter(|instruction| !instruction.as_markdown().trim().is_empty())
    }

    /// Markdown source for rendering.
    #[must_use]
    pub fn as_markdown(&self) -> String {
        match self {
            Self::Parts(parts) => parts.join("\n"),
            Self::Text(text) => text.clone(),
            Self::Raw(value) => format!(
                "```json\n{}\n```",
                serde_json::to_string_pretty(value).unwrap_or_default()
            ),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// A run setting value prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    /// Scalars shown inline.
    Scalar(String),
    /// Objects, arrays and null shown as pretty JSON.
    Structured(String),
}

impl SettingValue {
    /// Convert a JSON value.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::Scalar(text.clone()),
            Value::Object(_) | Value::Array(_) | Value::Null => {
                Self::Structured(serde_json::to_string_pretty(value).unwrap_or_default())
            }
            other => Self::Scalar(other.to_string()),
        }
    }

    /// The display text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Scalar(text) | Self::Structured(text) => text,
        }
    }

    /// Whether the value should be shown as a code block.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

//! Synthetic archive generators.
//!
//! Builds AI Studio archive documents of arbitrary size for integration
//! tests and benchmarks.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::io::Write;

/// Configuration for generating synthetic archives.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Number of prompt/answer exchanges.
    pub exchanges: usize,
    /// Add a thought chunk before each answer.
    pub include_thoughts: bool,
    /// Every nth exchange starts with a file batch (0 disables uploads).
    pub file_batch_every: usize,
    /// Files per upload batch.
    pub files_per_batch: usize,
    /// Approximate length of generated text in characters.
    pub avg_text_length: usize,
    /// Creation time written to the document.
    pub created_at: DateTime<Utc>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            exchanges: 10,
            include_thoughts: true,
            file_batch_every: 3,
            files_per_batch: 2,
            avg_text_length: 200,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap(),
        }
    }
}

impl ArchiveConfig {
    /// Small archive without uploads or thoughts.
    pub fn minimal() -> Self {
        Self {
            exchanges: 3,
            include_thoughts: false,
            file_batch_every: 0,
            avg_text_length: 40,
            ..Default::default()
        }
    }

    /// Large archive for stress tests.
    pub fn large() -> Self {
        Self {
            exchanges: 500,
            avg_text_length: 800,
            ..Default::default()
        }
    }
}

/// Expected prompt count for an archive generated from `config`.
///
/// Each exchange contributes its caption prompt, and each upload batch adds
/// one prompt per file.
pub fn expected_prompts(config: &ArchiveConfig) -> usize {
    (0..config.exchanges)
        .map(|i| 1 + if has_batch(config, i) { config.files_per_batch } else { 0 })
        .sum()
}

fn has_batch(config: &ArchiveConfig, exchange: usize) -> bool {
    config.file_batch_every > 0 && exchange % config.file_batch_every == 0
}

/// Generate the chunk list for `config`.
pub fn generate_chunks(config: &ArchiveConfig) -> Vec<Value> {
    let mut chunks = Vec::new();

    for i in 0..config.exchanges {
        let mut caption = generate_user_text(i, config.avg_text_length);

        if has_batch(config, i) {
            let names: Vec<String> = (0..config.files_per_batch)
                .map(|f| format!("file_{i}_{f}.txt"))
                .collect();
            for _ in &names {
                chunks.push(json!({"role": "user", "driveDocument": {"id": format!("doc-{i}")}, "tokenCount": 100}));
            }
            let mentions: Vec<String> = names.iter().map(|name| format!("`{name}`")).collect();
            caption = format!("Please review {}. {caption}", mentions.join(" and "));
        }

        chunks.push(json!({"role": "user", "text": caption, "tokenCount": caption.len() / 4}));

        if config.include_thoughts {
            chunks.push(json!({
                "role": "model",
                "text": generate_model_text(i, config.avg_text_length, "Considering"),
                "isThought": true,
                "thoughtSignatures": ["sig"]
            }));
        }

        chunks.push(json!({
            "role": "model",
            "text": generate_model_text(i, config.avg_text_length, "Answer"),
            "tokenCount": config.avg_text_length / 4,
            "finishReason": "STOP"
        }));
    }

    chunks
}

/// Generate a whole archive document.
pub fn generate_archive(config: &ArchiveConfig) -> Value {
    json!({
        "runSettings": {
            "temperature": 1,
            "model": "models/gemini-2.5-pro",
            "topP": 0.95,
            "safetySettings": [{"category": "HARM_CATEGORY_HARASSMENT", "threshold": "OFF"}]
        },
        "systemInstruction": {"parts": [{"text": "You are a careful reviewer."}]},
        "citations": [{"uri": "https://example.com/source"}],
        "creationTime": config.created_at.to_rfc3339(),
        "chunkedPrompt": {"chunks": generate_chunks(config), "pendingInputs": []}
    })
}

/// Write a generated archive to a writer.
pub fn write_archive<W: Write>(config: &ArchiveConfig, writer: &mut W) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &generate_archive(config))?;
    writeln!(writer)
}

fn generate_user_text(idx: usize, avg_length: usize) -> String {
    let openers = [
        "How should the parser handle",
        "Can you explain",
        "Rewrite the section about",
        "Compare the two approaches to",
    ];
    let topics = ["error recovery", "lifetimes", "the export layout", "chunk ordering"];
    let base = format!("{} {}? (question {idx})", openers[idx % openers.len()], topics[idx % topics.len()]);
    pad(base, avg_length / 4)
}

fn generate_model_text(idx: usize, avg_length: usize, prefix: &str) -> String {
    pad(format!("{prefix} {idx}:"), avg_length)
}

fn pad(mut text: String, target: usize) -> String {
    const FILLER: &str = " The quick brown fox jumps over the lazy dog.";
    while text.len() < target {
        text.push_str(FILLER);
    }
    text
}

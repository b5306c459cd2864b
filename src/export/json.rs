//! JSON export of the reconstructed transcript.
//!
//! The raw archive is already JSON; this export is the derived view instead:
//! every logical prompt paired with the model chunks that answer it, plus
//! optional document metadata and summary counts.

use std::io::Write;

use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::model::{LogicalPrompt, TokenCount};
use crate::reconstruction::TranscriptStats;
use crate::session::DocumentSession;

use super::{ExportOptions, Exporter};

/// Version of the transcript JSON layout.
pub const TRANSCRIPT_FORMAT_VERSION: &str = "1.0";

/// JSON exporter for reconstructed transcripts.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    /// Pretty-print the JSON output.
    pretty: bool,
    /// Include summary counts.
    include_stats: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonExporter {
    /// Create a new JSON exporter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pretty: false,
            include_stats: true,
        }
    }

    /// Enable pretty-printing.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Include summary counts in output.
    #[must_use]
    pub fn with_stats(mut self, include: bool) -> Self {
        self.include_stats = include;
        self
    }

    fn write_json<W: Write, T: Serialize>(&self, writer: &mut W, value: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)?;
        } else {
            serde_json::to_writer(&mut *writer, value)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Exporter for JsonExporter {
    fn export_session<W: Write>(
        &self,
        session: &DocumentSession,
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()> {
        let export = TranscriptExport::from_session(session, options, self.include_stats);
        self.write_json(writer, &export)
    }
}

/// Complete transcript export with envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptExport<'a> {
    /// Export format version.
    pub version: &'static str,
    /// Export timestamp.
    pub exported_at: String,
    /// Export tool information.
    pub exporter: ExporterInfo,
    /// Document title.
    pub title: &'a str,
    /// Document date, when the archive carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_time: Option<String>,
    /// Document metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata<'a>>,
    /// Summary counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<TranscriptStats>,
    /// Prompts with their responses.
    pub exchanges: Vec<ExchangeExport<'a>>,
}

/// Exporter identification.
#[derive(Debug, Clone, Serialize)]
pub struct ExporterInfo {
    /// Tool name.
    pub name: &'static str,
    /// Tool version.
    pub version: &'static str,
}

/// Run settings, system instruction and citations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata<'a> {
    /// Run settings in file order.
    pub run_settings: &'a IndexMap<String, Value>,
    /// Resolved system instruction as Markdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    /// Citation URIs.
    pub citations: Vec<&'a str>,
}

/// One prompt and its response window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeExport<'a> {
    /// Position in the prompt list.
    pub index: usize,
    /// The prompt.
    pub prompt: &'a LogicalPrompt,
    /// Answering model chunks.
    pub responses: Vec<ResponseExport<'a>>,
}

/// One model chunk of a response window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseExport<'a> {
    /// Index in the raw chunk sequence.
    pub source_index: usize,
    /// Whether the chunk is a thought trace.
    pub is_thought: bool,
    /// Chunk text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    /// Chunk token count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<&'a TokenCount>,
}

impl<'a> TranscriptExport<'a> {
    /// Build the export for a session.
    pub fn from_session(session: &'a DocumentSession, options: &'a ExportOptions, include_stats: bool) -> Self {
        let document = session.document();

        let metadata = options.include_metadata.then(|| DocumentMetadata {
            run_settings: &document.run_settings,
            system_instruction: document.system_instruction().map(|si| si.as_markdown()),
            citations: document.citation_uris(),
        });

        let exchanges = session
            .exchanges()
            .map(|exchange| ExchangeExport {
                index: exchange.prompt_index,
                prompt: exchange.prompt,
                responses: exchange
                    .responses
                    .iter()
                    .filter(|entry| options.include_thoughts || !entry.is_thought)
                    .map(|entry| ResponseExport {
                        source_index: entry.index,
                        is_thought: entry.is_thought,
                        text: entry.chunk.text.as_deref(),
                        token_count: entry.chunk.token_count.as_ref(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            version: TRANSCRIPT_FORMAT_VERSION,
            exported_at: options.generated_at.unwrap_or_else(Utc::now).to_rfc3339(),
            exporter: ExporterInfo {
                name: crate::NAME,
                version: crate::VERSION,
            },
            title: &options.title,
            document_time: document.document_time().map(|at| at.to_rfc3339()),
            metadata,
            stats: include_stats.then(|| session.stats()),
            exchanges,
        }
    }
}

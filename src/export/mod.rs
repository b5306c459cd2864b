//! Export functionality for loaded archives.
//!
//! This module provides the export formats:
//! - HTML: Self-contained static page with collapsible messages
//! - Markdown: Human-readable transcript
//! - Plain text: The Markdown layout without markup
//! - JSON: Reconstructed transcript (prompts with their responses)
//!
//! Every exporter writes to any `io::Write`; [`export_to_file`] routes the
//! output through an atomic temp file.

mod html;
mod json;
mod markdown;

pub use html::*;
pub use json::*;
pub use markdown::*;

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use pulldown_cmark::{html as cmark_html, Event, Options, Parser};
use tracing::{debug, instrument};

use crate::error::{ArchiveError, Result};
use crate::model::Chunk;
use crate::session::DocumentSession;
use crate::util::{escape_html, truncate_text, AtomicFile};

/// Default document title.
pub const DEFAULT_TITLE: &str = "AI Studio Prompt Archive";

/// Default width of dialog summary previews, in characters.
pub const DEFAULT_PREVIEW_WIDTH: usize = 120;

/// Common export options shared across formats.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Include thought chunks.
    pub include_thoughts: bool,
    /// Render thought chunks collapsed.
    pub collapse_thoughts: bool,
    /// Include run settings, system instruction and citations.
    pub include_metadata: bool,
    /// Document title.
    pub title: String,
    /// Maximum characters in a dialog summary preview.
    pub preview_width: usize,
    /// Use the dark HTML theme.
    pub dark_theme: bool,
    /// Date used when the document carries none (defaults to now).
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_thoughts: true,
            collapse_thoughts: true,
            include_metadata: true,
            title: DEFAULT_TITLE.to_string(),
            preview_width: DEFAULT_PREVIEW_WIDTH,
            dark_theme: false,
            generated_at: None,
        }
    }
}

impl ExportOptions {
    /// Options for a bare transcript: no thoughts, no metadata.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            include_thoughts: false,
            include_metadata: false,
            ..Self::default()
        }
    }

    /// Builder: include thought chunks.
    #[must_use]
    pub fn with_thoughts(mut self, include: bool) -> Self {
        self.include_thoughts = include;
        self
    }

    /// Builder: collapse thought chunks.
    #[must_use]
    pub fn with_collapsed_thoughts(mut self, collapse: bool) -> Self {
        self.collapse_thoughts = collapse;
        self
    }

    /// Builder: include metadata sections.
    #[must_use]
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Builder: set the document title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: set the summary preview width.
    #[must_use]
    pub fn with_preview_width(mut self, width: usize) -> Self {
        self.preview_width = width;
        self
    }

    /// Builder: use the dark theme.
    #[must_use]
    pub fn with_dark_theme(mut self, dark: bool) -> Self {
        self.dark_theme = dark;
        self
    }

    /// Builder: pin the fallback export date.
    #[must_use]
    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Whether a chunk is part of the exported dialog.
    #[must_use]
    pub fn includes(&self, chunk: &Chunk) -> bool {
        self.include_thoughts || !chunk.is_thought()
    }
}

/// Export format specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Static HTML page.
    Html,
    /// Markdown format.
    Markdown,
    /// Plain text.
    Text,
    /// Compact JSON.
    Json,
    /// Pretty-printed JSON.
    JsonPretty,
}

impl ExportFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
            Self::Text => "txt",
            Self::Json | Self::JsonPretty => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            _ => Err(format!("unknown export format '{s}'")),
        }
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export a loaded session to the writer.
    fn export_session<W: Write>(
        &self,
        session: &DocumentSession,
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()>;
}

/// Converts message text into an HTML fragment.
///
/// Message text is Markdown in practice. Implementations decide how much of
/// it to interpret; whatever they return is embedded verbatim, so it must
/// already be safe HTML.
pub trait ContentRenderer {
    /// Render `source` as an HTML fragment.
    fn render(&self, source: &str) -> String;
}

/// Renders GitHub-flavoured Markdown with pulldown-cmark.
///
/// Raw HTML in the source is emitted as escaped text, never passed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl ContentRenderer for MarkdownRenderer {
    fn render(&self, source: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let events = Parser::new_ext(source, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

        let mut output = String::with_capacity(source.len() * 3 / 2);
        cmark_html::push_html(&mut output, events);
        output.truncate(output.trim_end().len());
        output
    }
}

/// Renders text escaped and whitespace-preserving, without interpreting markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapedTextRenderer;

impl ContentRenderer for EscapedTextRenderer {
    fn render(&self, source: &str) -> String {
        format!("<div class=\"plain-text\">{}</div>", escape_html(source))
    }
}

impl<F> ContentRenderer for F
where
    F: Fn(&str) -> String,
{
    fn render(&self, source: &str) -> String {
        self(source)
    }
}

/// Export a session to a file.
///
/// Content is written to a temporary file first, then atomically renamed to
/// the target path.
#[instrument(skip(session, options), fields(path = %path.as_ref().display()))]
pub fn export_to_file(
    session: &DocumentSession,
    path: impl AsRef<Path>,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<()> {
    let path = path.as_ref();

    let mut atomic = AtomicFile::create(path)?;
    let mut writer = std::io::BufWriter::new(atomic.writer());
    export_to_writer(session, &mut writer, format, options)?;

    writer.flush().map_err(|e| {
        ArchiveError::io(format!("Failed to flush output file: {}", path.display()), e)
    })?;

    // Release the borrow on atomic.writer()
    drop(writer);

    atomic.finish()?;
    debug!(?format, "Export written");
    Ok(())
}

/// Export a session to a string.
pub fn export_to_string(
    session: &DocumentSession,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String> {
    let mut buffer = Vec::new();
    export_to_writer(session, &mut buffer, format, options)?;
    String::from_utf8(buffer).map_err(ArchiveError::from)
}

/// Export a session to any writer with the default exporter for `format`.
pub fn export_to_writer<W: Write>(
    session: &DocumentSession,
    writer: &mut W,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<()> {
    match format {
        ExportFormat::Html => HtmlExporter::new().export_session(session, writer, options),
        ExportFormat::Markdown => MarkdownExporter::new().export_session(session, writer, options),
        ExportFormat::Text => MarkdownExporter::new()
            .plain_text(true)
            .export_session(session, writer, options),
        ExportFormat::Json => JsonExporter::new().export_session(session, writer, options),
        ExportFormat::JsonPretty => JsonExporter::new()
            .pretty(true)
            .export_session(session, writer, options),
    }
}

/// The date line for an export header.
///
/// A recognisable document date is shown with its time
/// (`March 1, 2025, 10:15 AM`); otherwise `fallback` is shown as
/// `Exported on March 1, 2025`. Dates are rendered in UTC.
#[must_use]
pub fn format_export_date(document_time: Option<DateTime<Utc>>, fallback: DateTime<Utc>) -> String {
    match document_time {
        Some(at) => at.format("%B %-d, %Y, %I:%M %p").to_string(),
        None => format!("Exported on {}", fallback.format("%B %-d, %Y")),
    }
}

/// One-line preview of a raw chunk for dialog summaries.
///
/// Uses the chunk text; a file upload shows its reconstructed label.
#[must_use]
pub fn chunk_preview(session: &DocumentSession, index: usize, width: usize) -> String {
    let preview = session.chunk_body(index).unwrap_or("[No Text]");
    truncate_text(Some(preview), width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn session() -> DocumentSession {
        DocumentSession::from_slice(
            br#"{"chunkedPrompt": {"chunks": [
                {"role": "user", "driveDocument": {"id": "a"}},
                {"role": "user", "text": "Read `spec.pdf`\nplease"},
                {"role": "model", "text": ""},
                {"role": "model", "driveDocument": {"id": "b"}}
            ]}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Html.extension(), "html");
        assert_eq!(ExportFormat::Markdown.extension(), "md");
        assert_eq!(ExportFormat::Text.extension(), "txt");
        assert_eq!(ExportFormat::JsonPretty.extension(), "json");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("HTML".parse::<ExportFormat>(), Ok(ExportFormat::Html));
        assert_eq!("md".parse::<ExportFormat>(), Ok(ExportFormat::Markdown));
        assert_eq!("json-pretty".parse::<ExportFormat>(), Ok(ExportFormat::JsonPretty));
        assert_eq!(
            "csv".parse::<ExportFormat>(),
            Err("unknown export format 'csv'".to_string())
        );
    }

    #[test]
    fn test_export_options_builders() {
        let opts = ExportOptions::default()
            .with_thoughts(false)
            .with_metadata(false)
            .with_title("Archive")
            .with_preview_width(40);

        assert!(!opts.include_thoughts);
        assert!(!opts.include_metadata);
        assert_eq!(opts.title, "Archive");
        assert_eq!(opts.preview_width, 40);
        assert!(!opts.includes(&Chunk::model_thought("hmm")));
        assert!(opts.includes(&Chunk::model_text("answer")));
    }

    #[test]
    fn test_format_export_date() {
        let fallback = Utc.with_ymd_and_hms(2025, 6, 9, 8, 0, 0).unwrap();
        let document = Utc.with_ymd_and_hms(2025, 3, 1, 22, 5, 0).unwrap();

        assert_eq!(
            format_export_date(Some(document), fallback),
            "March 1, 2025, 10:05 PM"
        );
        assert_eq!(format_export_date(None, fallback), "Exported on June 9, 2025");
    }

    #[test]
    fn test_chunk_preview() {
        let session = session();
        assert_eq!(chunk_preview(&session, 0, 120), "[File: spec.pdf]");
        assert_eq!(chunk_preview(&session, 1, 120), "Read `spec.pdf`");
        assert_eq!(chunk_preview(&session, 2, 120), "[No Text]");
        assert_eq!(chunk_preview(&session, 3, 120), "[Uploaded Document]");
        assert_eq!(chunk_preview(&session, 1, 4), "Read...");
    }

    #[test]
    fn test_markdown_renderer() {
        assert_eq!(
            MarkdownRenderer.render("**bold** and `code`"),
            "<p><strong>bold</strong> and <code>code</code></p>"
        );
        assert_eq!(
            MarkdownRenderer.render("```rust\nlet x = 1 < 2;\n```"),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>"
        );
        assert_eq!(MarkdownRenderer.render(""), "");
    }

    #[test]
    fn test_markdown_renderer_escapes_raw_html() {
        assert_eq!(
            MarkdownRenderer.render("Looks <fine>."),
            "<p>Looks &lt;fine&gt;.</p>"
        );
        let block = MarkdownRenderer.render("<script>alert(1)</script>");
        assert!(!block.contains("<script>"));
        assert!(block.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_escaped_renderer_and_closures() {
        assert_eq!(
            EscapedTextRenderer.render("<b>"),
            "<div class=\"plain-text\">&lt;b&gt;</div>"
        );
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(upper.render("hi"), "HI");
    }

    #[test]
    fn test_export_to_file_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("archive.html");

        export_to_file(&session(), &path, ExportFormat::Html, &ExportOptions::default()).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}

//! HTML export for loaded archives.
//!
//! Generates a standalone HTML page: a title header with the export date,
//! the metadata sections, then the complete dialog with every chunk in a
//! collapsible `<details>` element.

use std::io::Write;

use chrono::Utc;

use crate::error::Result;
use crate::model::{Chunk, Role};
use crate::session::DocumentSession;
use crate::util::escape_html;

use super::{chunk_preview, format_export_date, ContentRenderer, ExportOptions, Exporter, MarkdownRenderer};

/// HTML exporter for sessions.
#[derive(Debug, Clone)]
pub struct HtmlExporter<R = MarkdownRenderer> {
    /// Converts message text into HTML.
    renderer: R,
    /// Render non-thought messages expanded.
    expand_messages: bool,
    /// Include the generator footer.
    include_footer: bool,
}

impl Default for HtmlExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlExporter {
    /// Create a new HTML exporter that renders message text as Markdown.
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderer: MarkdownRenderer,
            expand_messages: false,
            include_footer: true,
        }
    }
}

impl<R: ContentRenderer> HtmlExporter<R> {
    /// Use a different content renderer.
    #[must_use]
    pub fn with_renderer<R2: ContentRenderer>(self, renderer: R2) -> HtmlExporter<R2> {
        HtmlExporter {
            renderer,
            expand_messages: self.expand_messages,
            include_footer: self.include_footer,
        }
    }

    /// Open user and model messages by default. Thoughts follow the
    /// `collapse_thoughts` option.
    #[must_use]
    pub fn expand_messages(mut self, expand: bool) -> Self {
        self.expand_messages = expand;
        self
    }

    /// Include the generator footer.
    #[must_use]
    pub fn with_footer(mut self, include: bool) -> Self {
        self.include_footer = include;
        self
    }

    fn write_document_start<W: Write>(
        &self,
        writer: &mut W,
        options: &ExportOptions,
        date_line: &str,
    ) -> Result<()> {
        let title = escape_html(&options.title);

        writeln!(writer, "<!DOCTYPE html>")?;
        writeln!(writer, "<html lang=\"en\">")?;
        writeln!(writer, "<head>")?;
        writeln!(writer, "  <meta charset=\"UTF-8\">")?;
        writeln!(writer, "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
        writeln!(writer, "  <meta name=\"generator\" content=\"studio-archive {}\">", crate::VERSION)?;
        writeln!(writer, "  <title>{title}</title>")?;
        write_styles(writer)?;
        writeln!(writer, "</head>")?;

        let body_class = if options.dark_theme { "dark" } else { "light" };
        writeln!(writer, "<body class=\"{body_class}\">")?;
        writeln!(writer, "<div class=\"export-wrapper\">")?;
        writeln!(writer, "  <header>")?;
        writeln!(writer, "    <h1>{title}</h1>")?;
        writeln!(writer, "    <p class=\"export-date\">{}</p>", escape_html(date_line))?;
        writeln!(writer, "  </header>")?;
        writeln!(writer, "  <main id=\"main-content\">")?;
        Ok(())
    }

    fn write_document_end<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "  </main>")?;
        writeln!(writer, "</div>")?;
        if self.include_footer {
            writeln!(
                writer,
                "<footer class=\"export-footer\">Generated by studio-archive {}</footer>",
                crate::VERSION
            )?;
        }
        writeln!(writer, "</body>")?;
        writeln!(writer, "</html>")?;
        Ok(())
    }

    fn write_metadata<W: Write>(&self, writer: &mut W, session: &DocumentSession) -> Result<()> {
        let document = session.document();
        writeln!(writer, "    <div id=\"details-section\">")?;

        // Run settings
        writeln!(writer, "      <section id=\"run-details-container\" class=\"metadata-section\">")?;
        writeln!(writer, "        <h3>Run Settings</h3>")?;
        let rows = document.run_setting_rows();
        if rows.is_empty() {
            writeln!(writer, "        <p class=\"placeholder\">No run settings available.</p>")?;
        } else {
            writeln!(writer, "        <ul>")?;
            for (key, value) in rows {
                let rendered = if value.is_structured() {
                    format!(
                        "<pre><code class=\"language-json\">{}</code></pre>",
                        escape_html(value.as_str())
                    )
                } else {
                    escape_html(value.as_str())
                };
                writeln!(writer, "          <li><strong>{}:</strong> {rendered}</li>", escape_html(key))?;
            }
            writeln!(writer, "        </ul>")?;
        }
        writeln!(writer, "      </section>")?;

        // System instruction
        writeln!(writer, "      <section id=\"system-instruction-container\" class=\"metadata-section\">")?;
        writeln!(writer, "        <h3>System Instruction</h3>")?;
        match document.system_instruction() {
            Some(instruction) => writeln!(
                writer,
                "        <div class=\"content\">{}</div>",
                self.renderer.render(&instruction.as_markdown())
            )?,
            None => writeln!(writer, "        <p class=\"placeholder\">No system instruction provided.</p>")?,
        }
        writeln!(writer, "      </section>")?;

        // Citations
        writeln!(writer, "      <section id=\"citations-container\" class=\"metadata-section\">")?;
        writeln!(writer, "        <h3>Citations</h3>")?;
        let uris = document.citation_uris();
        if uris.is_empty() {
            writeln!(writer, "        <p class=\"placeholder\">No citations provided.</p>")?;
        } else {
            writeln!(writer, "        <ul>")?;
            for uri in uris {
                let uri = escape_html(uri);
                writeln!(
                    writer,
                    "          <li>URI: <a href=\"{uri}\" target=\"_blank\" rel=\"noopener noreferrer\">{uri}</a></li>"
                )?;
            }
            writeln!(writer, "        </ul>")?;
        }
        writeln!(writer, "      </section>")?;

        writeln!(writer, "    </div>")?;
        writeln!(writer, "    <hr>")?;
        Ok(())
    }

    fn write_chunk<W: Write>(
        &self,
        writer: &mut W,
        session: &DocumentSession,
        index: usize,
        chunk: &Chunk,
        options: &ExportOptions,
    ) -> Result<()> {
        let (label, summary_class, message_class) = match chunk.role {
            Role::User => ("User Prompt", "summary-user", "user-message"),
            Role::Model if chunk.is_thought() => {
                ("Model (Thought Process)", "summary-thought", "model-message thought-message")
            }
            Role::Model => ("Model Response", "summary-model", "model-message"),
            Role::Other => ("Message", "summary-other", "other-message"),
        };

        let open = if chunk.is_thought() {
            self.expand_messages && !options.collapse_thoughts
        } else {
            self.expand_messages
        };
        let preview = chunk_preview(session, index, options.preview_width);

        writeln!(writer, "      <details{}>", if open { " open" } else { "" })?;
        writeln!(
            writer,
            "        <summary class=\"summary-base {summary_class}\"><strong>{label}:</strong> <span>{}</span></summary>",
            escape_html(&preview)
        )?;
        writeln!(writer, "        <div class=\"message {message_class}\">")?;
        writeln!(writer, "          <div class=\"metadata\">Tokens: {}</div>", chunk.token_label())?;
        writeln!(
            writer,
            "          <div class=\"content\">{}</div>",
            self.renderer.render(chunk.text.as_deref().unwrap_or_default())
        )?;
        writeln!(writer, "        </div>")?;
        writeln!(writer, "      </details>")?;
        Ok(())
    }
}

impl<R: ContentRenderer> Exporter for HtmlExporter<R> {
    fn export_session<W: Write>(
        &self,
        session: &DocumentSession,
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()> {
        let fallback = options.generated_at.unwrap_or_else(Utc::now);
        let date_line = format_export_date(session.document().document_time(), fallback);

        self.write_document_start(writer, options, &date_line)?;

        if options.include_metadata {
            self.write_metadata(writer, session)?;
        }

        writeln!(writer, "    <h2>Complete Dialog</h2>")?;
        writeln!(writer, "    <div id=\"answer-view\">")?;
        for (index, chunk) in session.chunks().iter().enumerate() {
            if options.includes(chunk) {
                self.write_chunk(writer, session, index, chunk, options)?;
            }
        }
        writeln!(writer, "    </div>")?;

        self.write_document_end(writer)?;
        Ok(())
    }
}

fn write_styles<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "  <style>")?;
    writeln!(writer, r#"
    :root {{
      --page-bg: #f4f6f8;
      --surface: #ffffff;
      --text-color: #1a1a1a;
      --muted: #555555;
      --border-color: #e0e0e0;
      --heading: #2c3e50;
      --code-bg: #f4f4f4;
      --hover: #f0f0f0;
      --user-bg: #e9f5fd;
      --model-bg: #e8f6f3;
      --thought-bg: #fef9e7;
      --accent: #3498db;
    }}

    .dark {{
      --page-bg: #14161a;
      --surface: #1e2126;
      --text-color: #e0e0e0;
      --muted: #a0a0a0;
      --border-color: #3a3f47;
      --heading: #e6e6e6;
      --code-bg: #282c34;
      --hover: #2a2e35;
      --user-bg: #1e3a5f;
      --model-bg: #1d3b34;
      --thought-bg: #3d3520;
      --accent: #4da6ff;
    }}

    body {{
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
      background-color: var(--page-bg);
      color: var(--text-color);
      margin: 0;
      padding: 1em;
    }}

    .export-wrapper {{
      max-width: 900px;
      margin: 2em auto;
      background-color: var(--surface);
      border: 1px solid var(--border-color);
      box-shadow: 0 2px 8px rgba(0,0,0,0.1);
    }}

    header {{
      padding: 20px;
      border-bottom: 1px solid var(--border-color);
      text-align: center;
    }}

    header h1 {{ margin: 0; font-size: 1.6em; color: var(--heading); }}
    .export-date {{ margin: 0.5em 0 0 0; font-size: 0.9em; color: #888; }}
    #main-content {{ padding: 20px; }}
    hr {{ border: 0; border-top: 1px solid var(--border-color); margin: 2em 0; }}
    h2 {{ border-bottom: 1px solid var(--border-color); padding-bottom: 0.5em; }}
    .placeholder {{ color: var(--muted); font-style: italic; }}
    .metadata {{ font-size: 0.8em; color: var(--muted); margin-bottom: 0.5em; }}

    details {{ border: 1px solid var(--border-color); border-radius: 8px; margin-bottom: 1em; overflow: hidden; }}
    details[open] summary {{ border-bottom: 1px solid var(--border-color); }}
    .message {{ padding: 12px 15px; }}

    .summary-base {{
      padding: 12px 15px;
      cursor: pointer;
      font-weight: 500;
      outline: none;
      transition: background-color 0.2s ease;
      display: flex;
      align-items: baseline;
    }}
    .summary-base:hover {{ background-color: var(--hover); }}
    .summary-base strong {{ margin-right: 10px; flex-shrink: 0; }}
    .summary-base span {{ font-weight: normal; font-style: italic; color: var(--muted); white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }}
    .summary-user {{ background-color: var(--user-bg); border-left: 5px solid #3498db; }}
    .summary-model {{ background-color: var(--model-bg); border-left: 5px solid #2ecc71; }}
    .summary-thought {{ background-color: var(--thought-bg); border-left: 5px solid #f1c40f; }}
    .summary-other {{ border-left: 5px solid #95a5a6; }}

    .plain-text {{ white-space: pre-wrap; word-wrap: break-word; }}
    .content > :first-child {{ margin-top: 0; }}
    .content > :last-child {{ margin-bottom: 0; }}
    .content table {{ border-collapse: collapse; }}
    .content th, .content td {{ border: 1px solid var(--border-color); padding: 4px 8px; }}
    blockquote {{ margin: 0 0 1em 0; padding-left: 1em; border-left: 3px solid var(--border-color); color: var(--muted); }}

    pre, code {{
      font-family: 'SF Mono', Monaco, Consolas, 'Liberation Mono', monospace;
      font-size: 0.9em;
    }}

    pre {{
      background-color: var(--code-bg);
      padding: 15px;
      border-radius: 6px;
      overflow-x: auto;
    }}

    a {{ color: var(--accent); }}

    .export-footer {{
      max-width: 900px;
      margin: 2em auto;
      padding-top: 1.5em;
      border-top: 1px solid var(--border-color);
      font-size: 0.8em;
      color: #777;
      text-align: center;
    }}
  "#)?;
    writeln!(writer, "  </style>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::EscapedTextRenderer;
    use chrono::TimeZone;

    const ARCHIVE: &str = r#"{
        "runSettings": {"temperature": 0.7, "safetySettings": [{"category": "HARM"}]},
        "systemInstruction": {"text": "Answer <briefly>."},
        "citations": [{"uri": "https://example.com/a?b=1&c=2"}],
        "createdAt": "ignored",
        "chunkedPrompt": {"chunks": [
            {"role": "user", "driveDocument": {"id": "x"}, "tokenCount": 300},
            {"role": "user", "text": "Review `main.rs`"},
            {"role": "model", "text": "Let me think", "isThought": true},
            {"role": "model", "text": "Looks <fine>.", "tokenCount": 12},
            {"role": "tool", "text": "side channel"}
        ]}
    }"#;

    fn render(exporter: &HtmlExporter<impl ContentRenderer>, options: &ExportOptions) -> String {
        let session = DocumentSession::from_slice(ARCHIVE.as_bytes()).unwrap();
        let mut output = Vec::new();
        exporter.export_session(&session, &mut output, options).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn options() -> ExportOptions {
        ExportOptions::default().with_generated_at(Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_document_frame() {
        let html = render(&HtmlExporter::new(), &options());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>AI Studio Prompt Archive</title>"));
        assert!(html.contains("<p class=\"export-date\">Exported on January 5, 2025</p>"));
        assert!(html.contains("<h2>Complete Dialog</h2>"));
        assert!(html.contains("export-footer"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_one_details_per_chunk() {
        let html = render(&HtmlExporter::new(), &options());

        assert_eq!(html.matches("<details").count(), 5);
        assert!(html.contains(
            "<summary class=\"summary-base summary-user\"><strong>User Prompt:</strong> <span>[File: main.rs]</span></summary>"
        ));
        assert!(html.contains("summary-thought\"><strong>Model (Thought Process):</strong>"));
        assert!(html.contains("summary-model\"><strong>Model Response:</strong> <span>Looks &lt;fine&gt;.</span>"));
        assert!(html.contains("summary-other\"><strong>Message:</strong>"));
        assert!(html.contains("Tokens: 300"));
        assert!(html.contains("Tokens: N/A"));
    }

    #[test]
    fn test_metadata_sections() {
        let html = render(&HtmlExporter::new(), &options());

        assert!(html.contains("<li><strong>temperature:</strong> 0.7</li>"));
        assert!(html.contains("<pre><code class=\"language-json\">"));
        assert!(html.contains("<div class=\"content\"><p>Answer &lt;briefly&gt;.</p></div>"));
        assert!(html.contains("URI: <a href=\"https://example.com/a?b=1&amp;c=2\""));

        let bare = render(&HtmlExporter::new(), &options().with_metadata(false));
        assert!(!bare.contains("details-section"));
    }

    #[test]
    fn test_metadata_placeholders() {
        let session = DocumentSession::from_slice(b"{}").unwrap();
        let mut output = Vec::new();
        HtmlExporter::new()
            .export_session(&session, &mut output, &options())
            .unwrap();
        let html = String::from_utf8(output).unwrap();

        assert!(html.contains("No run settings available."));
        assert!(html.contains("No system instruction provided."));
        assert!(html.contains("No citations provided."));
        assert_eq!(html.matches("<details").count(), 0);
    }

    #[test]
    fn test_thought_visibility() {
        let without = render(&HtmlExporter::new(), &options().with_thoughts(false));
        assert!(!without.contains("class=\"summary-base summary-thought\""));
        assert!(without.contains(".summary-thought {"));
        assert_eq!(without.matches("<details").count(), 4);

        let expanded = render(&HtmlExporter::new().expand_messages(true), &options());
        assert_eq!(expanded.matches("<details open>").count(), 4);

        let all_open = render(
            &HtmlExporter::new().expand_messages(true),
            &options().with_collapsed_thoughts(false),
        );
        assert_eq!(all_open.matches("<details open>").count(), 5);
    }

    #[test]
    fn test_markdown_content_is_rendered() {
        let session = DocumentSession::from_slice(
            br#"{
                "systemInstruction": {"foo": 1},
                "chunkedPrompt": {"chunks": [
                    {"role": "model", "text": "**bold** and\n```rust\nfn main() {}\n```"}
                ]}
            }"#,
        )
        .unwrap();
        let mut output = Vec::new();
        HtmlExporter::new()
            .export_session(&session, &mut output, &options())
            .unwrap();
        let html = String::from_utf8(output).unwrap();

        assert!(html.contains("<p><strong>bold</strong> and</p>"));
        assert!(html.contains("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"));
        assert!(html.contains("<div class=\"content\"><pre><code class=\"language-json\">{\n  "));
        assert!(html.contains("\"foo\": 1") || html.contains("&quot;foo&quot;: 1"));
        assert!(!html.contains("**bold**"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_escaping_renderer_option() {
        let html = render(&HtmlExporter::new().with_renderer(EscapedTextRenderer), &options());
        assert!(html.contains("<div class=\"plain-text\">Looks &lt;fine&gt;.</div>"));
    }

    #[test]
    fn test_custom_renderer_and_theme() {
        let exporter = HtmlExporter::new()
            .with_renderer(|text: &str| format!("<p>{}</p>", escape_html(&text.to_uppercase())))
            .with_footer(false);
        let html = render(&exporter, &options().with_dark_theme(true).with_title("Mine"));

        assert!(html.contains("<body class=\"dark\">"));
        assert!(html.contains("<h1>Mine</h1>"));
        assert!(html.contains("<p>LOOKS &lt;FINE&gt;.</p>"));
        assert!(!html.contains("<footer"));
    }

    #[test]
    fn test_document_date_wins() {
        let session = DocumentSession::from_slice(
            br#"{"creationTime": "2024-11-02T15:30:00Z", "chunkedPrompt": {"chunks": []}}"#,
        )
        .unwrap();
        let mut output = Vec::new();
        HtmlExporter::new()
            .export_session(&session, &mut output, &options())
            .unwrap();
        let html = String::from_utf8(output).unwrap();
        assert!(html.contains("November 2, 2024, 03:30 PM"));
    }
}

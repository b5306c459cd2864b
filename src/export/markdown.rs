//! Markdown export for loaded archives.
//!
//! Generates a human-readable transcript: title and date, the metadata
//! sections, then the complete dialog. The same exporter produces plain text
//! when Markdown markup is unwanted.

use std::io::Write;

use chrono::Utc;

use crate::error::Result;
use crate::model::Chunk;
use crate::session::DocumentSession;

use super::{format_export_date, ExportOptions, Exporter};

/// Markdown exporter for sessions.
#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    /// Use plain text output (no Markdown formatting).
    plain_text: bool,
    /// Include the title and date header.
    include_header: bool,
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownExporter {
    /// Create a new Markdown exporter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plain_text: false,
            include_header: true,
        }
    }

    /// Enable plain text output (no Markdown formatting).
    #[must_use]
    pub fn plain_text(mut self, plain: bool) -> Self {
        self.plain_text = plain;
        self
    }

    /// Include the title and date header.
    #[must_use]
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    fn write_heading<W: Write>(&self, writer: &mut W, level: usize, text: &str) -> Result<()> {
        if self.plain_text {
            let underline = match level {
                1 => "=",
                2 => "-",
                _ => "",
            };
            writeln!(writer, "{text}")?;
            if !underline.is_empty() {
                writeln!(writer, "{}", underline.repeat(text.chars().count()))?;
            }
        } else {
            writeln!(writer, "{} {text}", "#".repeat(level))?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_header<W: Write>(
        &self,
        writer: &mut W,
        session: &DocumentSession,
        options: &ExportOptions,
    ) -> Result<()> {
        if !self.include_header {
            return Ok(());
        }

        let fallback = options.generated_at.unwrap_or_else(Utc::now);
        let date_line = format_export_date(session.document().document_time(), fallback);

        self.write_heading(writer, 1, &options.title)?;
        if self.plain_text {
            writeln!(writer, "{date_line}")?;
        } else {
            writeln!(writer, "*{date_line}*")?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_metadata<W: Write>(&self, writer: &mut W, session: &DocumentSession) -> Result<()> {
        let document = session.document();

        self.write_heading(writer, 2, "Run Settings")?;
        let rows = document.run_setting_rows();
        if rows.is_empty() {
            writeln!(writer, "No run settings available.")?;
        }
        for (key, value) in rows {
            if !value.is_structured() {
                if self.plain_text {
                    writeln!(writer, "- {key}: {}", value.as_str())?;
                } else {
                    writeln!(writer, "- **{key}:** {}", value.as_str())?;
                }
            } else if self.plain_text {
                writeln!(writer, "- {key}:")?;
                for line in value.as_str().lines() {
                    writeln!(writer, "    {line}")?;
                }
            } else {
                writeln!(writer, "- **{key}:**")?;
                writeln!(writer)?;
                writeln!(writer, "  ```json")?;
                for line in value.as_str().lines() {
                    writeln!(writer, "  {line}")?;
                }
                writeln!(writer, "  ```")?;
            }
        }
        writeln!(writer)?;

        self.write_heading(writer, 2, "System Instruction")?;
        match document.system_instruction() {
            Some(instruction) => writeln!(writer, "{}", instruction.as_markdown())?,
            None => writeln!(writer, "No system instruction provided.")?,
        }
        writeln!(writer)?;

        self.write_heading(writer, 2, "Citations")?;
        let uris = document.citation_uris();
        if uris.is_empty() {
            writeln!(writer, "No citations provided.")?;
        }
        for uri in uris {
            writeln!(writer, "- URI: {uri}")?;
        }
        writeln!(writer)?;

        if !self.plain_text {
            writeln!(writer, "---")?;
            writeln!(writer)?;
        }
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
        let label = chunk.header_label();
        let body = session.chunk_body(index).unwrap_or_default();
        let tokens = format!("Tokens: {}", chunk.token_label());

        if self.plain_text {
            writeln!(writer, "{}:", label.to_uppercase())?;
            writeln!(writer, "{tokens}")?;
            writeln!(writer)?;
            writeln!(writer, "{body}")?;
            writeln!(writer)?;
            return Ok(());
        }

        if chunk.is_thought() && options.collapse_thoughts {
            writeln!(writer, "<details>")?;
            writeln!(writer, "<summary>{label}</summary>")?;
            writeln!(writer)?;
            writeln!(writer, "*{tokens}*")?;
            writeln!(writer)?;
            writeln!(writer, "{body}")?;
            writeln!(writer)?;
            writeln!(writer, "</details>")?;
        } else {
            self.write_heading(writer, 3, label)?;
            writeln!(writer, "*{tokens}*")?;
            writeln!(writer)?;
            writeln!(writer, "{body}")?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Exporter for MarkdownExporter {
    fn export_session<W: Write>(
        &self,
        session: &DocumentSession,
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()> {
        self.write_header(writer, session, options)?;

        if options.include_metadata {
            self.write_metadata(writer, session)?;
        }

        self.write_heading(writer, 2, "Complete Dialog")?;
        if session.chunks().is_empty() {
            writeln!(writer, "No messages in this archive.")?;
        }
        for (index, chunk) in session.chunks().iter().enumerate() {
            if options.includes(chunk) {
                self.write_chunk(writer, session, index, chunk, options)?;
            }
        }

        Ok(())
    }
}

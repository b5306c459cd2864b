//! Info command implementation.
//!
//! Displays the document-level metadata of an archive: run settings, the
//! system instruction and citations, with optional transcript counts.

use std::io::{self, Write};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, InfoArgs, OutputFormat};
use crate::error::Result;
use crate::reconstruction::TranscriptStats;
use crate::session::DocumentSession;
use crate::util::format_bytes;

use super::{load_config, open_session};

/// Run the info command.
pub fn run(cli: &Cli, args: &InfoArgs) -> Result<()> {
    let config = load_config(cli);
    let session = open_session(&args.file, &config)?;
    let size = std::fs::metadata(&args.file).map(|m| m.len()).ok();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            let output = InfoOutput::new(&session, &args.file.to_string_lossy(), size, args.stats);
            serde_json::to_writer_pretty(&mut out, &output)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "File: {}", args.file.display())?;
            if let Some(size) = size {
                writeln!(out, "Size: {}", format_bytes(size))?;
            }
            if let Some(at) = session.document().document_time() {
                writeln!(out, "Created: {}", at.format("%Y-%m-%d %H:%M UTC"))?;
            }
            writeln!(out)?;
            write_metadata(&mut out, &session)?;
            if args.stats {
                write_stats(&mut out, &session.stats())?;
            }
        }
    }

    Ok(())
}

fn write_section_title<W: Write>(writer: &mut W, title: &str) -> Result<()> {
    writeln!(writer, "{title}")?;
    writeln!(writer, "{}", "-".repeat(title.len()))?;
    Ok(())
}

/// Write the run settings, system instruction and citations sections.
pub(crate) fn write_metadata<W: Write>(writer: &mut W, session: &DocumentSession) -> Result<()> {
    let document = session.document();

    write_section_title(writer, "Run Settings")?;
    let rows = document.run_setting_rows();
    if rows.is_empty() {
        writeln!(writer, "No run settings available.")?;
    }
    for (key, value) in rows {
        if value.is_structured() {
            writeln!(writer, "  {key}:")?;
            for line in value.as_str().lines() {
                writeln!(writer, "    {line}")?;
            }
        } else {
            writeln!(writer, "  {key}: {}", value.as_str())?;
        }
    }
    writeln!(writer)?;

    write_section_title(writer, "System Instruction")?;
    match document.system_instruction() {
        Some(instruction) => writeln!(writer, "{}", instruction.as_markdown())?,
        None => writeln!(writer, "No system instruction provided.")?,
    }
    writeln!(writer)?;

    write_section_title(writer, "Citations")?;
    let uris = document.citation_uris();
    if uris.is_empty() {
        writeln!(writer, "No citations provided.")?;
    }
    for uri in uris {
        writeln!(writer, "  - URI: {uri}")?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_stats<W: Write>(writer: &mut W, stats: &TranscriptStats) -> Result<()> {
    write_section_title(writer, "Transcript")?;
    writeln!(writer, "  Chunks:             {}", stats.chunks)?;
    writeln!(writer, "  Prompts:            {}", stats.prompts)?;
    writeln!(
        writer,
        "  File uploads:       {} ({} named)",
        stats.file_prompts, stats.named_files
    )?;
    writeln!(writer, "  Model responses:    {}", stats.model_responses)?;
    writeln!(writer, "  Thoughts:           {}", stats.thoughts)?;
    writeln!(writer, "  Unanswered prompts: {}", stats.unanswered_prompts)?;
    Ok(())
}

/// JSON output for the info command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoOutput<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_time: Option<String>,
    run_settings: &'a IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<String>,
    citations: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<TranscriptStats>,
}

impl<'a> InfoOutput<'a> {
    fn new(session: &'a DocumentSession, file: &str, size: Option<u64>, with_stats: bool) -> Self {
        let document = session.document();
        Self {
            file: file.to_string(),
            size_bytes: size,
            document_time: document.document_time().map(|at| at.to_rfc3339()),
            run_settings: &document.run_settings,
            system_instruction: document.system_instruction().map(|si| si.as_markdown()),
            citations: document.citation_uris(),
            stats: with_stats.then(|| session.stats()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metadata_text(archive: &str) -> String {
        let session = DocumentSession::from_slice(archive.as_bytes()).unwrap();
        let mut output = Vec::new();
        write_metadata(&mut output, &session).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_empty_metadata_placeholders() {
        assert_eq!(
            metadata_text("{}"),
            "Run Settings\n------------\nNo run settings available.\n\n\
             System Instruction\n------------------\nNo system instruction provided.\n\n\
             Citations\n---------\nNo citations provided.\n\n"
        );
    }

    #[test]
    fn test_metadata_values() {
        let text = metadata_text(
            r#"{
                "runSettings": {"temperature": 0.5, "safety": {"level": "high"}},
                "systemInstruction": {"text": "Answer briefly."},
                "citations": [{"uri": "https://a.example"}, {}]
            }"#,
        );

        assert!(text.contains("  temperature: 0.5\n"));
        assert!(text.contains("  safety:\n    {\n      \"level\": \"high\"\n    }\n"));
        assert!(text.contains("Answer briefly.\n"));
        assert!(text.contains("  - URI: https://a.example\n  - URI: \n"));
    }

    #[test]
    fn test_info_json() {
        let session = DocumentSession::from_slice(
            br#"{"runSettings": {"model": "m"}, "chunkedPrompt": {"chunks": [{"role": "user", "text": "q"}]}}"#,
        )
        .unwrap();

        let value = serde_json::to_value(InfoOutput::new(&session, "chat.json", Some(10), true)).unwrap();
        assert_eq!(value["file"], "chat.json");
        assert_eq!(value["runSettings"]["model"], "m");
        assert_eq!(value["citations"], serde_json::json!([]));
        assert_eq!(value["stats"]["prompts"], 1);
        assert_eq!(value["stats"]["unansweredPrompts"], 1);
        assert!(value.get("systemInstruction").is_none());
    }
}

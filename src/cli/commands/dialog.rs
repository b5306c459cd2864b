//! Dialog command implementation.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::{Cli, DialogArgs, OutputFormat};
use crate::error::Result;
use crate::model::{Role, TokenCount};
use crate::session::DocumentSession;

use super::{load_config, open_session, write_chunk_block};

/// Run the dialog command.
pub fn run(cli: &Cli, args: &DialogArgs) -> Result<()> {
    let config = load_config(cli);
    let session = open_session(&args.file, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            let entries = dialog_entries(&session, !args.no_thoughts);
            serde_json::to_writer_pretty(&mut out, &entries)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            write_dialog(&mut out, &session, args.expand_thoughts, !args.no_thoughts)?;
        }
    }

    Ok(())
}

/// Write every chunk in file order.
pub(crate) fn write_dialog<W: Write>(
    writer: &mut W,
    session: &DocumentSession,
    expand_thoughts: bool,
    include_thoughts: bool,
) -> Result<()> {
    if session.chunks().is_empty() {
        writeln!(writer, "No data loaded for complete dialog.")?;
        return Ok(());
    }

    for (index, chunk) in session.chunks().iter().enumerate() {
        if chunk.is_thought() && !include_thoughts {
            continue;
        }
        write_chunk_block(writer, chunk, session.chunk_body(index), expand_thoughts)?;
    }
    Ok(())
}

/// JSON shape of one dialog entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DialogEntry<'a> {
    index: usize,
    role: Role,
    label: &'static str,
    is_thought: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_count: Option<&'a TokenCount>,
}

fn dialog_entries(session: &DocumentSession, include_thoughts: bool) -> Vec<DialogEntry<'_>> {
    session
        .chunks()
        .iter()
        .enumerate()
        .filter(|(_, chunk)| include_thoughts || !chunk.is_thought())
        .map(|(index, chunk)| DialogEntry {
            index,
            role: chunk.role,
            label: chunk.header_label(),
            is_thought: chunk.is_thought(),
            text: session.chunk_body(index),
            token_count: chunk.token_count.as_ref(),
        })
        .collect()
}

//! Show command implementation.
//!
//! Displays one prompt followed by its response window.

use std::io::{self, Write};

use crate::cli::{Cli, OutputFormat, ShowArgs};
use crate::error::{ArchiveError, Result};
use crate::session::{DocumentSession, Exchange};

use super::{load_config, open_session, write_chunk_block};

/// Run the show command.
pub fn run(cli: &Cli, args: &ShowArgs) -> Result<()> {
    let config = load_config(cli);
    let session = open_session(&args.file, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if session.is_empty() && cli.effective_output() == OutputFormat::Text {
        writeln!(out, "No user prompts found in the file.")?;
        return Ok(());
    }

    let exchange = select_exchange(&session, args.prompt)?;

    match cli.effective_output() {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &exchange)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "Prompt {} of {}", args.prompt, session.prompts().len())?;
            writeln!(out)?;
            write_exchange(&mut out, &session, &exchange, args.expand_thoughts)?;
        }
    }

    Ok(())
}

/// Look up an exchange by its 1-based number.
fn select_exchange(session: &DocumentSession, number: usize) -> Result<Exchange<'_>> {
    if number == 0 {
        return Err(ArchiveError::InvalidArgument {
            name: "prompt".to_string(),
            reason: "prompt numbers start at 1".to_string(),
        });
    }

    session
        .exchange(number - 1)
        .map_err(|_| ArchiveError::PromptNotFound {
            index: number,
            available: session.prompts().len(),
        })
}

/// Write a prompt and its responses as text blocks.
pub(crate) fn write_exchange<W: Write>(
    writer: &mut W,
    session: &DocumentSession,
    exchange: &Exchange<'_>,
    expand_thoughts: bool,
) -> Result<()> {
    if let Some(chunk) = session.chunks().get(exchange.prompt.source_index) {
        write_chunk_block(
            writer,
            chunk,
            Some(&exchange.prompt.display_text),
            expand_thoughts,
        )?;
    }

    if exchange.is_unanswered() {
        writeln!(writer, "No model response followed this prompt directly.")?;
        return Ok(());
    }

    for entry in &exchange.responses {
        write_chunk_block(writer, entry.chunk, None, expand_thoughts)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARCHIVE: &str = r#"{"chunkedPrompt": {"chunks": [
        {"role": "user", "text": "Explain lifetimes", "tokenCount": 3},
        {"role": "model", "text": "Let me think", "isThought": true},
        {"role": "model", "text": "Lifetimes name scopes.", "tokenCount": 5},
        {"role": "user", "driveDocument": {"id": "x"}}
    ]}}"#;

    fn session() -> DocumentSession {
        DocumentSession::from_slice(ARCHIVE.as_bytes()).unwrap()
    }

    fn render(number: usize, expand: bool) -> String {
        let session = session();
        let exchange = select_exchange(&session, number).unwrap();
        let mut output = Vec::new();
        write_exchange(&mut output, &session, &exchange, expand).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_exchange_text() {
        assert_eq!(
            render(1, false),
            "[User Prompt] Tokens: 3\nExplain lifetimes\n\n\
             [Model (Thought Process)] Tokens: N/A\n(thought collapsed, use --expand-thoughts to show)\n\n\
             [Model Response] Tokens: 5\nLifetimes name scopes.\n\n"
        );
        assert!(render(1, true).contains("Let me think"));
    }

    #[test]
    fn test_unanswered_prompt() {
        let text = render(2, false);
        assert!(text.starts_with("[User Prompt] Tokens: N/A\n[Uploaded Document]\n"));
        assert!(text.ends_with("No model response followed this prompt directly.\n"));
    }

    #[test]
    fn test_prompt_numbers_are_one_based() {
        let session = session();
        assert!(matches!(
            select_exchange(&session, 0),
            Err(ArchiveError::InvalidArgument { .. })
        ));
        assert!(matches!(
            select_exchange(&session, 3),
            Err(ArchiveError::PromptNotFound { index: 3, available: 2 })
        ));
    }
}

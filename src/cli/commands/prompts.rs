//! Prompts command implementation.
//!
//! Lists the reconstructed user prompts, numbered from 1.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::{Cli, OutputFormat, PromptsArgs};
use crate::error::Result;
use crate::model::LogicalPrompt;
use crate::util::truncate_text;

use super::{load_config, open_session};

/// Run the prompts command.
pub fn run(cli: &Cli, args: &PromptsArgs) -> Result<()> {
    let config = load_config(cli);
    let session = open_session(&args.file, &config)?;
    let width = args.width.unwrap_or(config.display.list_width).max(1);

    let matches = match &args.search {
        Some(term) => session.search(term),
        None => session.prompts().iter().enumerate().collect(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            let items: Vec<PromptListItem<'_>> = matches
                .iter()
                .map(|(index, prompt)| PromptListItem::new(*index, prompt, width))
                .collect();
            serde_json::to_writer_pretty(&mut out, &items)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            if session.prompts().is_empty() {
                writeln!(out, "No user prompts found in the file.")?;
            } else if matches.is_empty() {
                if let Some(term) = &args.search {
                    writeln!(out, "No prompts match '{term}'.")?;
                }
            } else {
                write_prompt_list(&mut out, &matches, width)?;
            }
        }
    }

    Ok(())
}

/// Write a numbered list of prompts.
pub(crate) fn write_prompt_list<W: Write>(
    writer: &mut W,
    prompts: &[(usize, &LogicalPrompt)],
    width: usize,
) -> Result<()> {
    let digits = prompts
        .last()
        .map_or(1, |(index, _)| (index + 1).to_string().len());

    for (index, prompt) in prompts {
        writeln!(
            writer,
            "{:>digits$}. {}",
            index + 1,
            truncate_text(Some(&prompt.display_text), width)
        )?;
    }
    Ok(())
}

/// JSON shape of one listed prompt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptListItem<'a> {
    number: usize,
    preview: String,
    #[serde(flatten)]
    prompt: &'a LogicalPrompt,
}

impl<'a> PromptListItem<'a> {
    fn new(index: usize, prompt: &'a LogicalPrompt, width: usize) -> Self {
        Self {
            number: index + 1,
            preview: truncate_text(Some(&prompt.display_text), width),
            prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_list_numbering_and_truncation() {
        let first = LogicalPrompt::from_text("Short question", None, 0);
        let second = LogicalPrompt::from_file(Some("report.pdf"), None, 2);
        let long = LogicalPrompt::from_text("x".repeat(40), None, 4);
        let list = vec![(0, &first), (1, &second), (9, &long)];

        let mut output = Vec::new();
        write_prompt_list(&mut output, &list, 10).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            " 1. Short ques...\n 2. [File: rep...\n10. xxxxxxxxxx...\n"
        );
    }

    #[test]
    fn test_list_item_json() {
        let prompt = LogicalPrompt::from_text("Hello\nworld", Some(4.into()), 3);
        let value = serde_json::to_value(PromptListItem::new(0, &prompt, 60)).unwrap();

        assert_eq!(value["number"], 1);
        assert_eq!(value["preview"], "Hello");
        assert_eq!(value["displayText"], "Hello\nworld");
        assert_eq!(value["sourceIndex"], 3);
    }
}

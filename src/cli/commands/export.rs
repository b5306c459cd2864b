//! Export command implementation.
//!
//! Exports an archive to HTML, Markdown, plain text or JSON.

use std::io::{self, Write};

use tracing::info;

use crate::cli::{Cli, ExportArgs};
use crate::config::Config;
use crate::error::{ArchiveError, Result};
use crate::export::{
    export_to_file, export_to_writer, ExportFormat, ExportOptions, Exporter, HtmlExporter,
};
use crate::session::DocumentSession;
use crate::util::atomic_write;

use super::{load_config, open_session};

/// Run the export command.
pub fn run(cli: &Cli, args: &ExportArgs) -> Result<()> {
    let config = load_config(cli);
    let session = open_session(&args.file, &config)?;

    let format = args
        .format
        .map_or_else(|| config.export_format(), ExportFormat::from);
    let options = build_options(&config, args);

    match &args.output_file {
        Some(path) => {
            if path.exists() && !args.overwrite {
                return Err(ArchiveError::InvalidArgument {
                    name: "out".to_string(),
                    reason: format!("{} already exists (use --overwrite)", path.display()),
                });
            }

            if args.open && format == ExportFormat::Html {
                let mut buffer = Vec::new();
                write_expanded_html(&session, &mut buffer, &options)?;
                atomic_write(path, &buffer)?;
            } else {
                export_to_file(&session, path, format, &options)?;
            }

            info!(path = %path.display(), ?format, "Export complete");
            if !cli.quiet {
                eprintln!(
                    "Exported {} prompts to {}",
                    session.prompts().len(),
                    path.display()
                );
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            if args.open && format == ExportFormat::Html {
                write_expanded_html(&session, &mut writer, &options)?;
            } else {
                export_to_writer(&session, &mut writer, format, &options)?;
            }
            writer.flush()?;
        }
    }

    Ok(())
}

/// Configured export options with command-line overrides applied.
fn build_options(config: &Config, args: &ExportArgs) -> ExportOptions {
    let mut options = config.export_options();

    if let Some(title) = &args.title {
        options = options.with_title(title.clone());
    }
    if args.no_thoughts {
        options = options.with_thoughts(false);
    }
    if args.expand_thoughts {
        options = options.with_collapsed_thoughts(false);
    }
    if args.no_metadata {
        options = options.with_metadata(false);
    }
    if args.dark {
        options = options.with_dark_theme(true);
    }

    options
}

fn write_expanded_html<W: Write>(
    session: &DocumentSession,
    writer: &mut W,
    options: &ExportOptions,
) -> Result<()> {
    HtmlExporter::new()
        .expand_messages(true)
        .export_session(session, writer, options)
}

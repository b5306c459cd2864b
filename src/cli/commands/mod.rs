//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic.

pub mod config;
pub mod dialog;
pub mod export;
pub mod info;
pub mod prompts;
pub mod show;

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cli::Cli;
use crate::config::{default_config_path, Config};
use crate::error::Result;
use crate::model::Chunk;
use crate::parser::DocumentLoader;
use crate::session::DocumentSession;

/// Shown in place of a collapsed thought.
pub const COLLAPSED_THOUGHT_HINT: &str = "(thought collapsed, use --expand-thoughts to show)";

/// Resolve the configuration file path from CLI args or the platform default.
pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path(),
    }
}

/// Load configuration, falling back to defaults when it cannot be read.
pub fn load_config(cli: &Cli) -> Config {
    let result = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match result {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Falling back to default configuration");
            if !cli.quiet {
                eprintln!("Warning: {e}. Using default configuration.");
            }
            Config::default()
        }
    }
}

/// Load an archive file into a session, honoring the configured size limit.
pub fn open_session(path: &Path, config: &Config) -> Result<DocumentSession> {
    let mut loader = DocumentLoader::new().with_max_file_size(config.input.max_file_size);
    let document = loader.load_file(path)?;

    let stats = loader.stats();
    debug!(
        bytes = stats.bytes,
        chunks = stats.chunks,
        user = stats.user_chunks,
        model = stats.model_chunks,
        "Archive parsed"
    );

    Ok(DocumentSession::from_document(document))
}

/// Write one chunk as a labelled text block.
///
/// `body` replaces the chunk text when given. Thoughts are replaced by a hint
/// unless `expand_thoughts` is set.
pub(crate) fn write_chunk_block<W: Write>(
    writer: &mut W,
    chunk: &Chunk,
    body: Option<&str>,
    expand_thoughts: bool,
) -> Result<()> {
    writeln!(writer, "[{}] Tokens: {}", chunk.header_label(), chunk.token_label())?;

    if chunk.is_thought() && !expand_thoughts {
        writeln!(writer, "{COLLAPSED_THOUGHT_HINT}")?;
    } else {
        let text = body.or_else(|| chunk.non_empty_text()).unwrap_or_default();
        if !text.is_empty() {
            writeln!(writer, "{text}")?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

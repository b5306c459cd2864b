//! studio-archive: viewer and exporter for AI Studio prompt archives.
//!
//! An AI Studio archive is a JSON document whose conversation is stored as a
//! flat list of chunks under `chunkedPrompt.chunks`. File uploads appear as
//! user chunks without text, and the filename lives only in a later caption
//! message. This crate turns that raw sequence into logical prompts, pairs
//! each prompt with the model output that answers it, and renders the whole
//! archive as a static HTML page, Markdown, plain text or JSON.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use studio_archive::export::{export_to_file, ExportFormat, ExportOptions};
//! use studio_archive::DocumentSession;
//!
//! fn main() -> studio_archive::Result<()> {
//!     let session = DocumentSession::from_file("chat.json")?;
//!
//!     for (index, prompt) in session.prompts().iter().enumerate() {
//!         println!("{}. {}", index + 1, prompt.display_text);
//!     }
//!
//!     export_to_file(&session, "chat.html", ExportFormat::Html, &ExportOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`model`]: Raw archive types and derived prompt types
//! - [`parser`]: Loading and validating archive files
//! - [`reconstruction`]: Logical prompt reconstruction and response windows
//! - [`session`]: Loaded-document state and the replace-on-success viewer
//! - [`export`]: HTML, Markdown, text and JSON output
//! - [`async_io`]: Tokio-based loading and export
//! - [`cli`]: Command-line interface
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod async_io;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod reconstruction;
pub mod session;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{ArchiveError, Result};
pub use reconstruction::{reconstruct, response_window};
pub use session::{DocumentSession, Viewer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ArchiveError, Result};
    pub use crate::export::{ExportFormat, ExportOptions, Exporter};
    pub use crate::model::{ArchiveDocument, Chunk, LogicalPrompt, ResponseEntry, Role};
    pub use crate::parser::DocumentLoader;
    pub use crate::reconstruction::{reconstruct, response_window};
    pub use crate::session::{DocumentSession, Exchange, Viewer};
}

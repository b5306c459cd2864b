//! Data model for AI Studio conversation archives.
//!
//! Raw input types ([`ArchiveDocument`], [`Chunk`]) mirror the JSON file and
//! keep unknown fields for lossless re-serialisation. Derived types
//! ([`LogicalPrompt`], [`ResponseEntry`]) are produced by the reconstructor.

pub mod chunk;
pub mod document;
pub mod prompt;

pub use chunk::*;
pub use document::*;
pub use prompt::*;

use indexmap::IndexMap;
use serde_json::Value;

/// Raw JSON fields the model does not interpret, kept in file order.
pub type UnknownFields = IndexMap<String, Value>;

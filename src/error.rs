//! Error types for studio-archive.
//!
//! Loading is the only fallible stage of the pipeline: reconstruction is
//! total over any well-typed chunk sequence, so everything below describes
//! I/O, parsing, configuration, and export failures.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for studio-archive operations.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The input is not valid JSON.
    #[error("Failed to parse JSON at line {line}, column {column}: {message}")]
    ParseError {
        /// Line number where parsing failed (1-based).
        line: usize,
        /// Column number where parsing failed (1-based).
        column: usize,
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The input is valid JSON but not an archive document.
    #[error("Invalid archive document: {reason}")]
    InvalidDocument {
        /// Reason why the document was rejected.
        reason: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Permission denied when accessing a file.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// Input file exceeds the configured size limit.
    #[error("File too large: {path} ({size} bytes, limit {limit} bytes)")]
    FileTooLarge {
        /// Path to the oversized file.
        path: PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// A prompt index outside the reconstructed prompt list.
    #[error("Prompt {index} not found ({available} prompts available)")]
    PromptNotFound {
        /// Requested prompt index.
        index: usize,
        /// Number of prompts in the document.
        available: usize,
    },

    /// Export error.
    #[error("Export failed: {message}")]
    ExportError {
        /// Human-readable error message.
        message: String,
        /// Underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid configuration file contents.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Data integrity error.
    #[error("Data integrity error: {message}")]
    DataIntegrityError {
        /// Human-readable error message.
        message: String,
    },

    /// Unsupported operation or feature.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },
}

impl ArchiveError {
    /// Create a parse error from a serde_json error, keeping its position.
    #[must_use]
    pub fn parse_with_source(source: serde_json::Error) -> Self {
        Self::ParseError {
            line: source.line(),
            column: source.column(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a new invalid document error.
    #[must_use]
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new export error.
    #[must_use]
    pub fn export(message: impl Into<String>) -> Self {
        Self::ExportError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new unsupported error.
    #[must_use]
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Get the CLI exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } | Self::InvalidDocument { .. } => exit_codes::EXIT_PARSE_ERROR,
            Self::FileNotFound { .. } | Self::PromptNotFound { .. } => {
                exit_codes::EXIT_FILE_NOT_FOUND
            }
            Self::PermissionDenied { .. } => exit_codes::EXIT_PERMISSION_DENIED,
            Self::ConfigError { .. } | Self::InvalidConfig { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::ExportError { .. } => exit_codes::EXIT_EXPORT_ERROR,
            Self::InvalidArgument { .. } => exit_codes::EXIT_USAGE_ERROR,
            Self::FileTooLarge { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
            _ => exit_codes::EXIT_GENERAL_ERROR,
        }
    }

    /// Whether the error came from the document content rather than the environment.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::ParseError { .. } | Self::InvalidDocument { .. } | Self::FileTooLarge { .. }
        )
    }
}

/// Result type alias for studio-archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

impl From<std::string::FromUtf8Error> for ArchiveError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::DataIntegrityError {
            message: format!("Invalid UTF-8: {err}"),
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// JSON parsing failed.
    pub const EXIT_PARSE_ERROR: i32 = 2;
    /// Specified file or prompt not found.
    pub const EXIT_FILE_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Export operation failed.
    pub const EXIT_EXPORT_ERROR: i32 = 6;
    /// Invalid command-line usage (BSD standard).
    pub const EXIT_USAGE_ERROR: i32 = 64;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}

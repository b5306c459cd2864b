//! Configuration management for studio-archive.
//!
//! Handles:
//! - Default export options
//! - Display widths for prompt lists and previews
//! - Input limits

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, Result};
use crate::export::{ExportFormat, ExportOptions, DEFAULT_PREVIEW_WIDTH, DEFAULT_TITLE};
use crate::util::atomic_write;

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "studio-archive";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,
    /// Display options.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Input limits.
    #[serde(default)]
    pub input: InputConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArchiveError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ArchiveError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<()> {
        self.export
            .format
            .parse::<ExportFormat>()
            .map_err(|message| ArchiveError::InvalidConfig { message })?;
        if self.display.list_width == 0 || self.display.preview_width == 0 {
            return Err(ArchiveError::InvalidConfig {
                message: "display widths must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    ///
    /// Uses atomic file writes to ensure configuration integrity.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ArchiveError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;

        atomic_write(path, content.as_bytes())?;

        Ok(())
    }

    /// The configured default export format.
    #[must_use]
    pub fn export_format(&self) -> ExportFormat {
        self.export.format.parse().unwrap_or(ExportFormat::Html)
    }

    /// Export options derived from the configuration.
    #[must_use]
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::default()
            .with_title(self.export.title.clone())
            .with_thoughts(self.export.include_thoughts)
            .with_collapsed_thoughts(self.export.collapse_thoughts)
            .with_metadata(self.export.include_metadata)
            .with_dark_theme(self.export.dark_theme)
            .with_preview_width(self.display.preview_width)
    }
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default format for the export command.
    #[serde(default = "default_format")]
    pub format: String,
    /// Document title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Include thought chunks.
    #[serde(default = "default_true")]
    pub include_thoughts: bool,
    /// Collapse thought chunks.
    #[serde(default = "default_true")]
    pub collapse_thoughts: bool,
    /// Include run settings, system instruction and citations.
    #[serde(default = "default_true")]
    pub include_metadata: bool,
    /// Use the dark HTML theme.
    #[serde(default)]
    pub dark_theme: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            title: default_title(),
            include_thoughts: true,
            collapse_thoughts: true,
            include_metadata: true,
            dark_theme: false,
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Characters shown per prompt list item.
    #[serde(default = "default_list_width")]
    pub list_width: usize,
    /// Characters shown in dialog summary previews.
    #[serde(default = "default_preview_width")]
    pub preview_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            list_width: default_list_width(),
            preview_width: default_preview_width(),
        }
    }
}

/// Input configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Maximum archive size in bytes (0 = unlimited).
    #[serde(default)]
    pub max_file_size: u64,
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_format() -> String {
    "html".to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_list_width() -> usize {
    60
}

fn default_preview_width() -> usize {
    DEFAULT_PREVIEW_WIDTH
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ArchiveError::unsupported("config directory discovery"))?;

    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

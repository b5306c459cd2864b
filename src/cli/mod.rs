//! Command-line interface for studio-archive.
//!
//! Provides scriptable access to AI Studio archive files:
//! - `prompts`: List the reconstructed user prompts
//! - `show`: Show one prompt and the model response that follows it
//! - `dialog`: Show every chunk in order
//! - `info`: Show run settings, system instruction and citations
//! - `export`: Write HTML, Markdown, text or JSON

mod commands;

pub use commands::*;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::error::Result;
use crate::export::ExportFormat;

/// Viewer and exporter for AI Studio prompt archives.
#[derive(Debug, Parser)]
#[command(name = "studio-archive")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "STUDIO_ARCHIVE_OUTPUT")]
    pub output: OutputFormat,

    /// Output as JSON (shorthand for -o json).
    #[arg(long, global = true, env = "STUDIO_ARCHIVE_JSON")]
    pub json: bool,

    /// Suppress non-essential output.
    #[arg(short = 'q', long, global = true, env = "STUDIO_ARCHIVE_QUIET")]
    pub quiet: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "STUDIO_ARCHIVE_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "STUDIO_ARCHIVE_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "STUDIO_ARCHIVE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Get effective output format.
    #[must_use]
    pub fn effective_output(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the user prompts of an archive.
    #[command(alias = "ls")]
    Prompts(PromptsArgs),

    /// Show one prompt and its model response.
    #[command(alias = "view")]
    Show(ShowArgs),

    /// Show the complete dialog.
    Dialog(DialogArgs),

    /// Show run settings, system instruction and citations.
    #[command(alias = "i")]
    Info(InfoArgs),

    /// Export an archive to HTML, Markdown, text or JSON.
    #[command(alias = "x")]
    Export(ExportArgs),

    /// View and initialize configuration.
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completions and print to stdout.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "studio-archive", &mut io::stdout());
}

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Arguments for the prompts command.
#[derive(Debug, Parser)]
pub struct PromptsArgs {
    /// Archive file.
    pub file: PathBuf,

    /// Only list prompts containing this text (case-insensitive).
    #[arg(short = 's', long)]
    pub search: Option<String>,

    /// Characters shown per prompt (default from config).
    #[arg(short = 'w', long)]
    pub width: Option<usize>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Archive file.
    pub file: PathBuf,

    /// Prompt number as listed by `prompts` (1-based).
    #[arg(default_value = "1")]
    pub prompt: usize,

    /// Show thought chunks expanded.
    #[arg(short = 't', long)]
    pub expand_thoughts: bool,
}

/// Arguments for the dialog command.
#[derive(Debug, Parser)]
pub struct DialogArgs {
    /// Archive file.
    pub file: PathBuf,

    /// Show thought chunks expanded.
    #[arg(short = 't', long)]
    pub expand_thoughts: bool,

    /// Leave thought chunks out entirely.
    #[arg(long, conflicts_with = "expand_thoughts")]
    pub no_thoughts: bool,
}

/// Arguments for the info command.
#[derive(Debug, Parser)]
pub struct InfoArgs {
    /// Archive file.
    pub file: PathBuf,

    /// Also show transcript counts.
    #[arg(long)]
    pub stats: bool,
}

/// Arguments for the export command.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Archive file.
    pub file: PathBuf,

    /// Output file path (stdout if not specified).
    #[arg(short = 'O', long = "out")]
    pub output_file: Option<PathBuf>,

    /// Export format (default from config).
    #[arg(short = 'f', long, env = "STUDIO_ARCHIVE_EXPORT_FORMAT")]
    pub format: Option<ExportFormatArg>,

    /// Document title.
    #[arg(long)]
    pub title: Option<String>,

    /// Leave thought chunks out.
    #[arg(long)]
    pub no_thoughts: bool,

    /// Render thought chunks expanded.
    #[arg(long)]
    pub expand_thoughts: bool,

    /// Leave out run settings, system instruction and citations.
    #[arg(long)]
    pub no_metadata: bool,

    /// Use the dark HTML theme.
    #[arg(long)]
    pub dark: bool,

    /// Render HTML messages expanded instead of collapsed.
    #[arg(long)]
    pub open: bool,

    /// Overwrite an existing output file.
    #[arg(long)]
    pub overwrite: bool,
}

/// Export format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormatArg {
    /// Static HTML page.
    #[default]
    Html,
    /// Markdown format.
    Markdown,
    /// Short for markdown.
    Md,
    /// Plain text.
    Text,
    /// JSON transcript.
    Json,
    /// Pretty JSON transcript.
    JsonPretty,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Html => ExportFormat::Html,
            ExportFormatArg::Markdown | ExportFormatArg::Md => ExportFormat::Markdown,
            ExportFormatArg::Text => ExportFormat::Text,
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::JsonPretty => ExportFormat::JsonPretty,
        }
    }
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Config action to perform.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommand actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show all configuration values.
    Show,

    /// Show configuration file path.
    Path,

    /// Initialize configuration file with defaults.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    match &cli.command {
        Commands::Prompts(args) => commands::prompts::run(&cli, args),
        Commands::Show(args) => commands::show::run(&cli, args),
        Commands::Dialog(args) => commands::dialog::run(&cli, args),
        Commands::Info(args) => commands::info::run(&cli, args),
        Commands::Export(args) => commands::export::run(&cli, args),
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_format_conversion() {
        assert_eq!(ExportFormat::from(ExportFormatArg::Html), ExportFormat::Html);
        assert_eq!(ExportFormat::from(ExportFormatArg::Md), ExportFormat::Markdown);
        assert_eq!(
            ExportFormat::from(ExportFormatArg::JsonPretty),
            ExportFormat::JsonPretty
        );
    }

    #[test]
    fn test_parse_show_defaults() {
        let cli = Cli::try_parse_from(["studio-archive", "show", "chat.json"]).unwrap();
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.prompt, 1);
                assert!(!args.expand_thoughts);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_json_flag_wins() {
        let cli = Cli::try_parse_from(["studio-archive", "--json", "info", "chat.json"]).unwrap();
        assert_eq!(cli.effective_output(), OutputFormat::Json);
    }

    #[test]
    fn test_dialog_thought_flags_conflict() {
        let result = Cli::try_parse_from([
            "studio-archive",
            "dialog",
            "chat.json",
            "--expand-thoughts",
            "--no-thoughts",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_to_filter() {
        assert_eq!(LogLevel::Error.to_filter_string(), "error");
        assert_eq!(LogLevel::Warn.to_filter_string(), "warn");
        assert_eq!(LogLevel::Trace.to_filter_string(), "trace");
    }
}

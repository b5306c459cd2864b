//! studio-archive: browse and export AI Studio prompt archives from the terminal.

use std::process::ExitCode;

use studio_archive::cli;

fn main() -> ExitCode {
    // Logging is initialized by cli::run based on --log-level and --log-format
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_input_error() {
                eprintln!("Hint: expected an AI Studio archive (a JSON object with chunkedPrompt.chunks).");
            }

            if std::env::var("RUST_BACKTRACE").is_ok() {
                if let Some(source) = std::error::Error::source(&e) {
                    eprintln!("Caused by: {source}");
                }
            }

            ExitCode::from(e.exit_code() as u8)
        }
    }
}

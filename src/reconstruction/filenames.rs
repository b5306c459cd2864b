//! Filename recovery from caption text.
//!
//! Uploaded files carry no name of their own. The name shows up in a later
//! user text chunk, either backtick-quoted (`` `report.pdf` ``) or in
//! parentheses (`(report.pdf)`). Archives exported by other tools rely on
//! exactly this heuristic, so it is deliberately not generalised.

use once_cell::sync::Lazy;
use regex::Regex;

/// Backtick form: no backticks inside, ends in `.ext`.
/// Parenthesis form: no whitespace, `/` or `)` inside, ends in `.ext`.
/// `\w` is spelled out as ASCII to match the archive exporter's behaviour.
static FILENAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`([^`]+?\.[A-Za-z0-9_]+)`|\(([^)\s/]+\.[A-Za-z0-9_]+)\)")
        .expect("filename pattern is valid")
});

/// Extract candidate filenames from `text` in left-to-right order.
///
/// Repeated names are kept; each occurrence is a separate candidate.
#[must_use]
pub fn extract_filenames(text: &str) -> Vec<String> {
    FILENAME_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

//! Extraction of local `#include "..."` directives.
//!
//! Only directives that begin in the first column are recognized: a line must
//! start with `#include`, followed by at least one whitespace character and a
//! double-quoted, non-empty target. Indented directives, `# include`, and
//! angle-bracket (system) includes are ignored.

use std::path::Path;

const DIRECTIVE: &str = "#include";

/// Returns the quoted include targets of `text`, in order of appearance.
pub fn parse_includes(text: &str) -> Vec<String> {
    text.split(|c: char| c == '\n' || c == '\r')
        .filter_map(parse_line)
        .map(str::to_string)
        .collect()
}

/// Reads `path` and returns its include targets.
///
/// Unreadable files yield no includes; the failure only shows up later as a
/// file with no known dependencies. Invalid UTF-8 is decoded lossily.
pub fn read_includes(path: &Path) -> Vec<String> {
    match std::fs::read(path) {
        Ok(bytes) => parse_includes(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::debug!("cannot read {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Parses a single line, returning the trimmed include target if the line
/// is a local include directive.
fn parse_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DIRECTIVE)?;
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        return None;
    }
    let quoted = after_ws.strip_prefix('"')?;
    let end = quoted.find('"')?;
    let target = quoted[..end].trim();
    if end == 0 || target.is_empty() {
        return None;
    }
    Some(target)
}

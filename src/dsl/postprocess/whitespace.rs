//! Pass 4: whitespace cleanup.

use super::trim_end_keep_escape;
use crate::dsl::types::models::BLANK_PARAGRAPH;

/// Collapses blank-line runs and repeated blank-paragraph lines to one, collapses
/// horizontal whitespace after each line's indentation, and trims line ends.
/// Blank lines at the end of the text are dropped.
pub fn clean_whitespace(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();

    for line in text.lines() {
        let cleaned = clean_line(line);
        if let Some(prev) = out.last() {
            let prev = prev.trim_start();
            let current = cleaned.trim_start();
            let repeated_blank = prev.is_empty() && current.is_empty();
            let repeated_marker = prev == BLANK_PARAGRAPH && current == BLANK_PARAGRAPH;
            if repeated_blank || repeated_marker {
                continue;
            }
        }
        out.push(cleaned);
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }

    out.join("\n")
}

fn clean_line(line: &str) -> String {
    let content = line.trim_start();
    if content.trim_end().is_empty() {
        return String::new();
    }
    let indent = &line[..line.len() - content.len()];

    let mut collapsed = String::with_capacity(content.len());
    let mut in_space = false;
    for c in content.chars() {
        if c == ' ' || c == '\t' {
            if !in_space {
                collapsed.push(' ');
                in_space = true;
            }
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }

    format!("{}{}", indent, trim_end_keep_escape(&collapsed))
}

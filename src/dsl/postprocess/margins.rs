//! Pass 2: margin and paragraph normalization.
//!
//! Walks logical lines keeping a running margin depth:
//! - margin opens (`[m]`, `[m1]`..) raise it, `[/m]` lowers it; a closer at
//!   depth 0 has nothing to close and is dropped;
//! - a line that starts outside any margin and does not open one itself is
//!   wrapped in `[m1]...[/m]`;
//! - a `@` heading line first closes every open margin and carries none of
//!   its own: margin tags on it are removed;
//! - every line is written as one tab plus one space per open margin level;
//! - margins still open at the end are closed on the last line.

use super::{bracket_tokens, trim_end_keep_escape};
use crate::dsl::types::vocabulary::{is_margin_name, split_token};

/// Marker that starts a sub-entry heading line.
const HEADING_MARKER: char = '@';

pub fn normalize_margins(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut depth = 0usize;

    for raw in text.lines() {
        let line = trim_end_keep_escape(raw.trim_start());
        if line.is_empty() {
            continue;
        }

        if line.starts_with(HEADING_MARKER) {
            close_margins(&mut lines, &mut depth);
            lines.push(format!("\t{}", strip_margin_tags(&line)));
            continue;
        }

        let (content, depth_after) = drop_stray_closers(&line, depth);
        if content.is_empty() {
            continue;
        }
        let content = if depth == 0 && !starts_with_margin_open(&content) {
            format!("[m1]{}[/m]", content)
        } else {
            content
        };
        lines.push(format!("\t{}{}", " ".repeat(depth), content));
        depth = depth_after;
    }

    close_margins(&mut lines, &mut depth);
    lines.join("\n")
}

/// Removes margin closers that have no open margin, starting from `depth`.
/// Returns the cleaned line and the depth after it.
fn drop_stray_closers(line: &str, mut depth: usize) -> (String, usize) {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for token in bracket_tokens(line) {
        let (closing, name) = split_token(token.inner);
        if !is_margin_name(name) {
            continue;
        }
        if !closing {
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
        } else {
            out.push_str(&line[last..token.start]);
            last = token.end;
        }
    }

    out.push_str(&line[last..]);
    let cleaned = trim_end_keep_escape(out.trim_start()).into_owned();
    (cleaned, depth)
}

/// Removes every margin open and close tag from a heading line.
fn strip_margin_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for token in bracket_tokens(line) {
        if is_margin_name(split_token(token.inner).1) {
            out.push_str(&line[last..token.start]);
            last = token.end;
        }
    }
    out.push_str(&line[last..]);
    trim_end_keep_escape(&out).into_owned()
}

fn starts_with_margin_open(line: &str) -> bool {
    bracket_tokens(line).first().is_some_and(|token| {
        let (closing, name) = split_token(token.inner);
        token.start == 0 && !closing && is_margin_name(name)
    })
}

fn close_margins(lines: &mut [String], depth: &mut usize) {
    if *depth == 0 {
        return;
    }
    if let Some(last) = lines.last_mut() {
        last.push_str(&"[/m]".repeat(*depth));
    }
    *depth = 0;
}

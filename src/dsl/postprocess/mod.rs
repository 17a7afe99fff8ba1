//! # Tag Stream Post-Processing
//!
//! The engine's raw output goes through four ordered passes, each a pure,
//! total function over text:
//!
//! 1. [`brackets`]: bracket tokens that are not vocabulary tags become `{...}` literals.
//! 2. [`margins`]: lines are re-indented by margin depth, bare lines get a margin,
//!    stray margin closers are dropped and open margins are closed.
//! 3. [`balance`]: every paired tag ends with as many closers as openers.
//! 4. [`whitespace`]: blank line runs, inner whitespace runs and trailing whitespace.
//!
//! Every pass is idempotent, and so is the pipeline as a whole.

use std::borrow::Cow;
use std::sync::OnceLock;

use log::trace;
use regex::Regex;

pub mod balance;
pub mod brackets;
pub mod margins;
pub mod whitespace;

/// Signature shared by all passes.
pub type Pass = fn(&str) -> String;

/// The passes in the order they run.
pub const PASSES: [(&str, Pass); 4] = [
    ("brackets", brackets::disambiguate_brackets),
    ("margins", margins::normalize_margins),
    ("balance", balance::balance_tags),
    ("whitespace", whitespace::clean_whitespace),
];

/// Runs the full pipeline over one raw tag stream.
pub fn run(raw: &str) -> String {
    PASSES.iter().fold(raw.to_string(), |text, (name, pass)| {
        let out = pass(&text);
        trace!("Pass '{}': {} -> {} bytes", name, text.len(), out.len());
        out
    })
}

/// A `[...]` token found in a tag stream. `start..end` spans the brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BracketToken<'a> {
    pub start: usize,
    pub end: usize,
    pub inner: &'a str,
}

static BRACKET_PATTERN: OnceLock<Regex> = OnceLock::new();

fn bracket_regex() -> &'static Regex {
    BRACKET_PATTERN.get_or_init(|| Regex::new(r"\[([^\[\]\n]*)\]").expect("Invalid bracket regex pattern"))
}

/// Finds every single-line bracket token whose brackets are both unescaped.
pub(crate) fn bracket_tokens(text: &str) -> Vec<BracketToken<'_>> {
    bracket_regex()
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            if is_escaped(text, whole.start()) || is_escaped(text, whole.end() - 1) {
                return None;
            }
            Some(BracketToken {
                start: whole.start(),
                end: whole.end(),
                inner: cap.get(1)?.as_str(),
            })
        })
        .collect()
}

/// Whether the byte at `pos` is preceded by an odd run of backslashes.
pub(crate) fn is_escaped(text: &str, pos: usize) -> bool {
    let backslashes = text.as_bytes()[..pos]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    backslashes % 2 == 1
}

/// Trims trailing whitespace, keeping the space of a trailing `\ ` escape.
pub(crate) fn trim_end_keep_escape(line: &str) -> Cow<'_, str> {
    let trimmed = line.trim_end();
    if trimmed.len() < line.len() && is_escaped(line, trimmed.len()) {
        return Cow::Owned(format!("{} ", trimmed));
    }
    Cow::Borrowed(trimmed)
}

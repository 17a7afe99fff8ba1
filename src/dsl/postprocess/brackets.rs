//! Pass 1: bracket disambiguation.
//!
//! Square brackets are tag delimiters in DSL. Text such as a phonetic
//! transcription `[ˈhæp.i]` would otherwise be read as an unknown tag, so
//! every unescaped bracket that is not part of a vocabulary tag becomes a
//! brace. Nested text like `[[x]]` or `[a [b] c]` is handled in one call:
//! afterwards the only unescaped brackets left are vocabulary tags.

use super::{bracket_tokens, is_escaped};
use crate::dsl::types::vocabulary::{lookup, split_token};

/// Keeps vocabulary tags and turns every other unescaped `[` or `]` into a brace.
pub fn disambiguate_brackets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    let tags = bracket_tokens(text)
        .into_iter()
        .filter(|token| lookup(split_token(token.inner).1).is_some());
    for tag in tags {
        brace_literals(text, last, tag.start, &mut out);
        out.push_str(&text[tag.start..tag.end]);
        last = tag.end;
    }

    brace_literals(text, last, text.len(), &mut out);
    out
}

/// Copies `text[from..to]` into `out`, rewriting unescaped brackets as braces.
fn brace_literals(text: &str, from: usize, to: usize, out: &mut String) {
    for (i, c) in text[from..to].char_indices() {
        match c {
            '[' if !is_escaped(text, from + i) => out.push('{'),
            ']' if !is_escaped(text, from + i) => out.push('}'),
            _ => out.push(c),
        }
    }
}

//! Pass 3: tag balance validation.
//!
//! Openers and closers are paired per vocabulary tag. Attributed openers such as
//! `[c red]` count as `c`, numbered margins as `m`. A closer with no pending
//! opener of its kind is removed; openers still pending at the end get their
//! closers appended, most recent first.

use super::bracket_tokens;
use crate::dsl::types::vocabulary::{lookup, split_token};

pub fn balance_tags(text: &str) -> String {
    let mut pending: Vec<&'static str> = Vec::new();
    let mut stray: Vec<(usize, usize)> = Vec::new();

    for token in bracket_tokens(text) {
        let (closing, name) = split_token(token.inner);
        let Some(spec) = lookup(name) else {
            continue;
        };
        if !closing {
            pending.push(spec.name);
        } else if let Some(pos) = pending.iter().rposition(|open| *open == spec.name) {
            pending.remove(pos);
        } else {
            stray.push((token.start, token.end));
        }
    }

    if stray.is_empty() && pending.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + pending.len() * 4);
    let mut last = 0;
    for (start, end) in stray {
        out.push_str(&text[last..start]);
        last = end;
    }
    out.push_str(&text[last..]);
    for name in pending.iter().rev() {
        out.push_str("[/");
        out.push_str(name);
        out.push(']');
    }
    out
}

//! The fixed set of bracket tags understood by DSL readers.
//!
//! Shared read-only by the bracket disambiguation and tag balancing passes.
//! Every tag here is paired: `[name]` or `[name attrs]` opens it, `[/name]` closes it.
//! Margins are the one irregular family: they open as `[m]` or `[m0]`..`[m9]` and
//! all close with a generic `[/m]`.

/// One vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub name: &'static str,
    /// Whether the opening tag may carry an attribute clause, as in `[c red]`.
    pub has_attributes: bool,
}

/// Name of the margin tag family.
pub const MARGIN: &str = "m";

pub static VOCABULARY: &[TagSpec] = &[
    TagSpec { name: MARGIN, has_attributes: false },
    TagSpec { name: "b", has_attributes: false },
    TagSpec { name: "i", has_attributes: false },
    TagSpec { name: "u", has_attributes: false },
    TagSpec { name: "c", has_attributes: true },
    TagSpec { name: "p", has_attributes: false },
    TagSpec { name: "s", has_attributes: false },
    TagSpec { name: "ref", has_attributes: true },
    TagSpec { name: "url", has_attributes: false },
    TagSpec { name: "sub", has_attributes: false },
    TagSpec { name: "sup", has_attributes: false },
    TagSpec { name: "ex", has_attributes: false },
    TagSpec { name: "com", has_attributes: false },
    TagSpec { name: "trn", has_attributes: false },
    TagSpec { name: "trs", has_attributes: false },
    TagSpec { name: "!trs", has_attributes: false },
    TagSpec { name: "lang", has_attributes: true },
    TagSpec { name: "t", has_attributes: false },
    TagSpec { name: "*", has_attributes: false },
    TagSpec { name: "'", has_attributes: false },
];

/// Finds the vocabulary entry for a bare tag name (no slash, no attributes).
///
/// Numbered margins (`m1`..`m9`) resolve to the margin entry.
pub fn lookup(name: &str) -> Option<&'static TagSpec> {
    let name = if is_margin_name(name) { MARGIN } else { name };
    VOCABULARY.iter().find(|spec| spec.name == name)
}

/// Returns true for `m` and `m0`..`m9`.
pub fn is_margin_name(name: &str) -> bool {
    match name.strip_prefix(MARGIN) {
        Some("") => true,
        Some(rest) => rest.len() == 1 && rest.as_bytes()[0].is_ascii_digit(),
        None => false,
    }
}

/// Splits the inside of a bracket token into `(is_closing, name)`.
///
/// The name stops at the first whitespace, dropping any attribute clause.
/// Leading whitespace yields an empty name.
pub fn split_token(inner: &str) -> (bool, &str) {
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name = rest.split(char::is_whitespace).next().unwrap_or("");
    (closing, name)
}

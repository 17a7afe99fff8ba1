//! Core data structures shared by the loader, aggregation, and writer.
//!
//! This module defines:
//! - Raw source blocks as produced by the loaders
//! - Headword groups produced by aggregation
//! - Rendered entries and dictionary header metadata consumed by the writer

use std::fmt;
use std::str::FromStr;

/// The DSL line used to separate definitions: an indented, escaped space.
pub const BLANK_PARAGRAPH: &str = "[m1]\\ [/m]";

/// Separator inserted between two bodies merged under one headword.
pub const BODY_SEPARATOR: &str = "\n[m1]\\ [/m]\n";

/// Body line written for a group that never received any content.
pub const EMPTY_BODY_LINE: &str = "\t[m1][/m]";

/// Prefix that marks a record as a cross-reference to another headword.
pub const LINK_PREFIX: &str = "@@@LINK=";

/// Payload of a raw block: either a markup body or a link to another headword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    /// Markup bytes, not yet validated as UTF-8.
    Body(Vec<u8>),
    /// Headword this block redirects to.
    Link(String),
}

/// One unparsed dictionary record before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Headword field as found in the source; may hold several `|`-separated headwords.
    pub headword: String,
    pub content: BlockContent,
}

impl RawBlock {
    pub fn body(headword: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            headword: headword.into(),
            content: BlockContent::Body(body.into()),
        }
    }

    pub fn link(headword: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            headword: headword.into(),
            content: BlockContent::Link(target.into()),
        }
    }

    /// Returns the individual headwords declared by this block, in order.
    pub fn headwords(&self) -> impl Iterator<Item = &str> {
        self.headword
            .split('|')
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// A canonical headword with its aliases and the merged body of all its blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryGroup {
    pub canonical: String,
    /// All headwords written for this entry; the canonical headword is always first.
    pub aliases: Vec<String>,
    pub merged_body: Vec<u8>,
}

impl EntryGroup {
    pub fn new(canonical: impl Into<String>) -> Self {
        let canonical = canonical.into();
        Self {
            aliases: vec![canonical.clone()],
            canonical,
            merged_body: Vec::new(),
        }
    }

    /// Adds a headword unless it is already present. Returns whether it was added.
    pub fn add_alias(&mut self, headword: &str) -> bool {
        if self.aliases.iter().any(|a| a == headword) {
            return false;
        }
        self.aliases.push(headword.to_string());
        true
    }

    /// Appends a body, separating it from existing content with a blank paragraph.
    pub fn append_body(&mut self, body: &[u8]) {
        let body = body.trim_ascii();
        if body.is_empty() {
            return;
        }
        if self.has_body() {
            self.merged_body.extend_from_slice(BODY_SEPARATOR.as_bytes());
        }
        self.merged_body.extend_from_slice(body);
    }

    pub fn has_body(&self) -> bool {
        !self.merged_body.trim_ascii().is_empty()
    }
}

/// A fully translated entry, ready for the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub headwords: Vec<String>,
    /// Post-processed tag stream, or `None` when the fallback body line is due.
    pub body: Option<String>,
}

/// The three directives written at the top of a DSL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryHeader {
    pub name: String,
    pub index_language: String,
    pub contents_language: String,
}

/// Metadata a loader could find in the source itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

/// Structural layout of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// One entry per line: `headword<TAB>body`.
    Tabular,
    /// MTXT: headword line, body lines, `</>` separator.
    Blocks,
}

impl fmt::Display for SourceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLayout::Tabular => write!(f, "tab-separated"),
            SourceLayout::Blocks => write!(f, "MTXT"),
        }
    }
}

/// Encoding of the DSL file produced by the writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputEncoding {
    /// UTF-16 little endian with a byte order mark, the format Lingvo expects.
    #[default]
    Utf16Le,
    Utf8,
}

impl FromStr for OutputEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "utf16" | "utf16le" => Ok(Self::Utf16Le),
            "utf8" => Ok(Self::Utf8),
            other => Err(format!("unsupported output encoding: {}", other)),
        }
    }
}

//! Source loading and DSL output.
//!
//! - `detect`: guesses tab-separated vs MTXT layout
//! - `tabular` / `mtxt`: parse a source into raw blocks
//! - `writer`: streams the DSL header and entries
//! - `resources`: zips the media folder Lingvo reads sounds and images from

pub mod detect;
pub mod mtxt;
pub mod resources;
pub mod tabular;
pub mod writer;

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use log::info;

use super::types::error::Result;
use super::types::models::{RawBlock, SourceLayout, SourceMetadata};
use super::utils::decode_source;

pub use detect::detect_layout;
pub use writer::DslWriter;

/// Separator line between MTXT blocks.
pub(crate) const ENTRY_SEPARATOR: &[u8] = b"</>";
/// Prefix of header and comment lines.
pub(crate) const HEADER_PREFIX: &[u8] = b"##";

/// Everything a loader extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub layout: SourceLayout,
    pub metadata: SourceMetadata,
    pub blocks: Vec<RawBlock>,
    /// Records skipped as malformed.
    pub dropped: usize,
}

impl LoadedSource {
    pub(crate) fn new(layout: SourceLayout) -> Self {
        Self {
            layout,
            metadata: SourceMetadata::default(),
            blocks: Vec::new(),
            dropped: 0,
        }
    }
}

/// Parses in-memory source bytes with a known layout.
pub fn parse_source(data: &[u8], layout: SourceLayout) -> LoadedSource {
    match layout {
        SourceLayout::Tabular => tabular::parse(data),
        SourceLayout::Blocks => mtxt::parse(data),
    }
}

/// Reads, decodes and parses a source file.
///
/// The layout is detected when `layout` is `None`.
pub fn load_source(
    path: &Path,
    layout: Option<SourceLayout>,
    encoding: Option<&'static Encoding>,
) -> Result<LoadedSource> {
    let data = decode_source(fs::read(path)?, encoding);
    let layout = match layout {
        Some(layout) => layout,
        None => detect_layout(path, &data)?,
    };
    info!("Reading {} as {}", path.display(), layout);

    let source = parse_source(&data, layout);
    info!(
        "Loaded {} blocks ({} malformed)",
        source.blocks.len(),
        source.dropped
    );
    Ok(source)
}

/// Splits on LF, dropping a trailing CR from each line.
pub(crate) fn split_lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

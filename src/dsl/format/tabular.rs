//! Tab-separated source parsing: one `headword<TAB>body` record per line.

use log::{debug, trace};

use super::{HEADER_PREFIX, LoadedSource, split_lines};
use crate::dsl::types::models::{LINK_PREFIX, RawBlock, SourceLayout};

/// Parses tab-separated data. Lines without a tab, with an empty body, or
/// with a headword that is not UTF-8 are counted as dropped.
pub fn parse(data: &[u8]) -> LoadedSource {
    let mut entries = LoadedSource::new(SourceLayout::Tabular);

    for (number, line) in split_lines(data).enumerate() {
        let line = line.trim_ascii();
        if line.is_empty() || line.starts_with(HEADER_PREFIX) {
            continue;
        }
        match parse_line(line) {
            Some(block) => entries.blocks.push(block),
            None => {
                trace!("Dropping malformed line {}", number + 1);
                entries.dropped += 1;
            }
        }
    }

    debug!(
        "Tab-separated: {} records parsed, {} malformed",
        entries.blocks.len(),
        entries.dropped
    );
    entries
}

fn parse_line(line: &[u8]) -> Option<RawBlock> {
    let tab = line.iter().position(|&b| b == b'\t')?;
    let headword = std::str::from_utf8(line[..tab].trim_ascii()).ok()?;
    let body = line[tab + 1..].trim_ascii();
    if headword.is_empty() || body.is_empty() {
        return None;
    }

    if let Some(target) = body.strip_prefix(LINK_PREFIX.as_bytes()) {
        let target = std::str::from_utf8(target.trim_ascii()).ok()?;
        return (!target.is_empty()).then(|| RawBlock::link(headword, target));
    }
    Some(RawBlock::body(headword, body))
}

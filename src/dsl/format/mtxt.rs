//! MTXT source parsing.
//!
//! ```text
//! ##name	My Dictionary
//! ##sourceLang	English
//! headword
//! <b>body</b> lines...
//! </>
//! alias
//! @@@LINK=headword
//! </>
//! ```

use log::{debug, trace};

use super::{ENTRY_SEPARATOR, HEADER_PREFIX, LoadedSource, split_lines};
use crate::dsl::types::models::{LINK_PREFIX, RawBlock, SourceLayout, SourceMetadata};

/// Literal backslash-n sequences some exporters leave in content lines.
const ESCAPED_NEWLINE: &[u8] = b"\\n";

/// Parses MTXT data into header metadata and raw blocks.
pub fn parse(data: &[u8]) -> LoadedSource {
    let mut metadata = SourceMetadata::default();
    let mut content: Vec<u8> = Vec::with_capacity(data.len());

    for line in split_lines(data) {
        let trimmed = line.trim_ascii();
        if trimmed.starts_with(HEADER_PREFIX) {
            read_header_line(trimmed, &mut metadata);
            continue;
        }
        content.extend(strip_escaped_newlines(line));
        content.push(b'\n');
    }

    let mut entries = LoadedSource::new(SourceLayout::Blocks);
    entries.metadata = metadata;
    for block in split_on(&content, ENTRY_SEPARATOR) {
        let lines: Vec<&[u8]> = split_lines(block)
            .map(<[u8]>::trim_ascii)
            .filter(|l| !l.is_empty())
            .collect();
        let Some((first, rest)) = lines.split_first() else {
            continue;
        };
        match parse_block(first, rest) {
            Some(raw) => entries.blocks.push(raw),
            None => entries.dropped += 1,
        }
    }

    debug!(
        "MTXT: {} blocks parsed, {} malformed",
        entries.blocks.len(),
        entries.dropped
    );
    entries
}

fn parse_block(first: &[u8], rest: &[&[u8]]) -> Option<RawBlock> {
    let Ok(headword) = std::str::from_utf8(first) else {
        debug!("Dropping block whose headword is not valid UTF-8");
        return None;
    };

    if let Some(target) = rest
        .first()
        .and_then(|line| line.strip_prefix(LINK_PREFIX.as_bytes()))
    {
        let target = std::str::from_utf8(target.trim_ascii()).ok()?;
        if target.is_empty() {
            debug!("Dropping link block '{}' without a target", headword);
            return None;
        }
        trace!("Link block '{}' -> '{}'", headword, target);
        return Some(RawBlock::link(headword, target));
    }

    Some(RawBlock::body(headword, rest.join(&b'\n')))
}

fn read_header_line(line: &[u8], metadata: &mut SourceMetadata) {
    let text = String::from_utf8_lossy(line);
    let Some((key, value)) = text.split_once('\t') else {
        return;
    };
    let value = value.trim().to_string();
    if value.is_empty() {
        return;
    }
    let key = key.trim_end();
    if key.starts_with("##name") {
        metadata.name = Some(value);
    } else if key.starts_with("##sourceLang") {
        metadata.source_language = Some(value);
    } else if key.starts_with("##targetLang") {
        metadata.target_language = Some(value);
    }
}

fn strip_escaped_newlines(line: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    let mut i = 0;
    while i < line.len() {
        if line[i..].starts_with(ESCAPED_NEWLINE) {
            i += ESCAPED_NEWLINE.len();
        } else {
            out.push(line[i]);
            i += 1;
        }
    }
    out
}

fn split_on<'a>(data: &'a [u8], separator: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let mut rest = Some(data);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.windows(separator.len()).position(|w| w == separator) {
            Some(pos) => {
                rest = Some(&current[pos + separator.len()..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

//! Source layout detection.

use std::path::Path;

use log::debug;

use super::{ENTRY_SEPARATOR, HEADER_PREFIX, split_lines};
use crate::dsl::types::error::{DslError, Result};
use crate::dsl::types::models::SourceLayout;

/// Number of leading lines inspected when guessing the layout.
const DETECTION_WINDOW: usize = 200;

/// Guesses the layout of a source from its extension and first lines.
///
/// - `.mtxt`: always blocks.
/// - `.txt`: blocks if a `</>` separator shows up, tab-separated otherwise.
/// - anything else: blocks on `</>`, tab-separated on a tab outside `##`
///   header lines, otherwise undetectable.
pub fn detect_layout(path: &Path, data: &[u8]) -> Result<SourceLayout> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if extension == "mtxt" {
        debug!("Extension .mtxt: using MTXT layout");
        return Ok(SourceLayout::Blocks);
    }

    let mut separator_found = false;
    let mut tab_found = false;
    for line in split_lines(data).take(DETECTION_WINDOW) {
        let trimmed = line.trim_ascii();
        if contains(trimmed, ENTRY_SEPARATOR) {
            separator_found = true;
        }
        if line.contains(&b'\t') && !line.starts_with(HEADER_PREFIX) {
            tab_found = true;
        }
    }
    debug!(
        "Layout scan of {}: separator={}, tab={}",
        path.display(),
        separator_found,
        tab_found
    );

    if separator_found {
        Ok(SourceLayout::Blocks)
    } else if extension == "txt" || tab_found {
        Ok(SourceLayout::Tabular)
    } else {
        Err(DslError::UndetectedLayout(path.display().to_string()))
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

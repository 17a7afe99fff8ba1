//! Grouping of raw blocks under canonical headwords.
//!
//! Body blocks are keyed by their first headword; repeated keys merge their
//! bodies with a blank-paragraph separator. Link blocks (`@@@LINK=target`) add
//! their headwords as aliases of the target's group, creating that group with an
//! empty body if it does not exist yet. Groups come out in the order their
//! canonical headword was first established, by either kind of block.

use std::collections::HashMap;

use log::{debug, info, trace};

use super::types::models::{BlockContent, EntryGroup, RawBlock};

/// Incremental aggregator. Feed blocks in source order, then call [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct Aggregator {
    groups: Vec<EntryGroup>,
    index: HashMap<String, usize>,
    dropped: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one block. Malformed blocks are counted and dropped.
    pub fn push(&mut self, block: RawBlock) {
        let headwords: Vec<&str> = block.headwords().collect();
        let Some(&first) = headwords.first() else {
            debug!("Dropping block without a headword");
            self.dropped += 1;
            return;
        };

        match &block.content {
            BlockContent::Body(body) => {
                let idx = self.group_index(first);
                let group = &mut self.groups[idx];
                group.append_body(body);
                for headword in &headwords {
                    group.add_alias(headword);
                }
                trace!("Merged body of '{}' ({} bytes)", first, body.len());
            }
            BlockContent::Link(target) => {
                let target = target.trim();
                if target.is_empty() {
                    debug!("Dropping link block '{}' with an empty target", first);
                    self.dropped += 1;
                    return;
                }
                let idx = self.group_index(target);
                let group = &mut self.groups[idx];
                for headword in &headwords {
                    group.add_alias(headword);
                }
                trace!("Registered {:?} as aliases of '{}'", headwords, target);
            }
        }
    }

    /// Number of blocks dropped so far as malformed.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Returns the groups in order of first establishment.
    pub fn finish(self) -> Vec<EntryGroup> {
        info!(
            "Aggregated {} headword groups ({} blocks dropped)",
            self.groups.len(),
            self.dropped
        );
        self.groups
    }

    fn group_index(&mut self, key: &str) -> usize {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.groups.len();
        self.groups.push(EntryGroup::new(key));
        self.index.insert(key.to_string(), idx);
        idx
    }
}

/// Aggregates a whole sequence of blocks at once.
pub fn aggregate(blocks: impl IntoIterator<Item = RawBlock>) -> Vec<EntryGroup> {
    let mut aggregator = Aggregator::new();
    for block in blocks {
        aggregator.push(block);
    }
    aggregator.finish()
}

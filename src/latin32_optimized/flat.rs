//! Contiguous read-only form of the optimized Latin trie.

use std::collections::HashSet;

use super::word::{Group, Slot, SparseHeader, ADDRESS_MASK};
use super::{group_stats, Latin32OptimizedTrie};
use crate::config::TrieConfig;
use crate::error::Result;
use crate::source::WordSource;
use crate::stats::TrieStats;
use crate::tokenize::latin_index;
use crate::Dictionary;

const ENCODING: &str = "latin32-flat";

/// The optimized Latin trie copied into one slice.
///
/// Lookups index the slice directly instead of going through block/offset
/// cursors. There is no way to insert into a flattened trie.
#[derive(Debug, Clone)]
pub struct FlatLatin32Trie {
    words: Box<[u32]>,
    /// Sorted bases of released sparse groups; their words are stale.
    free: Box<[u32]>,
}

impl FlatLatin32Trie {
    pub(super) fn new(words: Box<[u32]>, free: Box<[u32]>) -> Self {
        Self { words, free }
    }

    /// Node words in the array.
    pub fn node_words(&self) -> usize {
        self.words.len()
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of_val(&*self.words) + std::mem::size_of_val(&*self.free)
    }
}

impl Dictionary for FlatLatin32Trie {
    fn build(source: WordSource<'_>, config: &TrieConfig) -> Result<Self> {
        Ok(Latin32OptimizedTrie::build(source, config)?.flatten())
    }

    fn is_valid_word(&self, word: &str) -> bool {
        let words = &*self.words;
        let mut bytes = word.bytes();
        let Some(first) = bytes.next().and_then(latin_index) else {
            return false;
        };

        let mut at = usize::from(first);
        for byte in bytes {
            let Some(letter) = latin_index(byte) else {
                return false;
            };
            let child = (words[at] & ADDRESS_MASK) as usize;
            if child == 0 {
                return false;
            }
            at = match Group::decode(words[child]) {
                Group::Dense => child + usize::from(letter),
                Group::Sparse(header) => match header.find(letter) {
                    Some(slot) => child + 1 + slot,
                    None => return false,
                },
            };
        }

        match Slot::decode(words[at]) {
            Slot::Dense { stop, .. } => stop,
            Slot::Sparse { slot, .. } => SparseHeader(words[at - 1 - slot]).stop(slot),
        }
    }

    fn stats(&self) -> TrieStats {
        let free: HashSet<u32> = self.free.iter().copied().collect();
        group_stats(ENCODING, self.words.len(), &free, |addr| {
            self.words[addr as usize]
        })
    }
}

//! Unsorted pair lists, laid out depth-first.
//!
//! Every inner node is a run of `(code point, link)` pairs closed by a
//! `(0, 0)` pair. Lookup scans the run linearly.

use super::{fold, list_stats, PointerTree, ADDRESS_MASK, ROOT, STOP_BIT};
use crate::config::TrieConfig;
use crate::error::Result;
use crate::source::WordSource;
use crate::stats::TrieStats;
use crate::Dictionary;

const ENCODING: &str = "utf32";

/// Code-point trie scanned linearly at each node.
#[derive(Debug, Clone)]
pub struct Utf32Trie {
    words: Box<[u32]>,
}

impl Utf32Trie {
    fn layout(tree: &PointerTree, config: &TrieConfig) -> Result<Self> {
        let mut order = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            for &(_, child) in tree.children(id).iter().rev() {
                if tree.has_children(child) {
                    stack.push(child);
                }
            }
        }

        let (offsets, len) = tree.place(&order, |n| 2 * (n + 1), ENCODING, config)?;
        let mut words = Vec::with_capacity(len);
        for &id in &order {
            for &(cp, child) in tree.children(id) {
                words.push(cp);
                words.push(tree.link(child, &offsets));
            }
            words.extend([0, 0]);
        }
        debug_assert_eq!(words.len(), len);
        Ok(Self {
            words: words.into_boxed_slice(),
        })
    }

    /// Link for `cp` in the list at `at`.
    #[inline]
    fn find(&self, at: usize, cp: u32) -> Option<u32> {
        self.words[at..]
            .chunks_exact(2)
            .take_while(|pair| pair[0] != 0 || pair[1] != 0)
            .find(|pair| pair[0] == cp)
            .map(|pair| pair[1])
    }

    pub fn node_words(&self) -> usize {
        self.words.len()
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of_val(&*self.words)
    }
}

impl Dictionary for Utf32Trie {
    fn build(source: WordSource<'_>, config: &TrieConfig) -> Result<Self> {
        let tree = PointerTree::build(source, config)?;
        let trie = Self::layout(&tree, config)?;
        log::debug!("{ENCODING}: laid out {} words", trie.words.len());
        Ok(trie)
    }

    fn is_valid_word(&self, word: &str) -> bool {
        let Some(cps) = fold(word) else {
            return false;
        };
        let mut at = Some(0usize);
        let mut link = 0;
        for cp in cps {
            let Some(list) = at else {
                return false;
            };
            let Some(found) = self.find(list, cp) else {
                return false;
            };
            link = found;
            let child = found & ADDRESS_MASK;
            at = (child != 0).then_some(child as usize);
        }
        link & STOP_BIT != 0
    }

    fn stats(&self) -> TrieStats {
        let mut lists = Vec::new();
        let mut at = 0;
        while at < self.words.len() {
            let pairs = self.words[at..]
                .chunks_exact(2)
                .take_while(|pair| pair[0] != 0 || pair[1] != 0)
                .count();
            lists.push(pairs);
            at += 2 * (pairs + 1);
        }
        list_stats(ENCODING, self.words.len(), lists.into_iter())
    }
}

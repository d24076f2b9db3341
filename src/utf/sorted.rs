//! Sorted blocks, laid out breadth-first.
//!
//! Every inner node is a block `[count, code points.., links..]` with the code
//! points ascending, so a lookup binary-searches the middle section and reads
//! the link at the same index in the last section.

use std::collections::VecDeque;

use super::{fold, list_stats, PointerTree, ADDRESS_MASK, ROOT, STOP_BIT};
use crate::config::TrieConfig;
use crate::error::Result;
use crate::source::WordSource;
use crate::stats::TrieStats;
use crate::Dictionary;

const ENCODING: &str = "utf32-sorted";

/// Code-point trie binary-searched at each node.
#[derive(Debug, Clone)]
pub struct SortedUtf32Trie {
    words: Box<[u32]>,
}

impl SortedUtf32Trie {
    fn layout(tree: &PointerTree, config: &TrieConfig) -> Result<Self> {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([ROOT]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(
                tree.children(id)
                    .iter()
                    .map(|&(_, child)| child)
                    .filter(|&child| tree.has_children(child)),
            );
        }

        let (offsets, len) = tree.place(&order, |n| 1 + 2 * n, ENCODING, config)?;
        let mut words = Vec::with_capacity(len);
        for &id in &order {
            let mut children = tree.children(id).to_vec();
            children.sort_unstable_by_key(|&(cp, _)| cp);
            words.push(children.len() as u32);
            words.extend(children.iter().map(|&(cp, _)| cp));
            words.extend(children.iter().map(|&(_, child)| tree.link(child, &offsets)));
        }
        debug_assert_eq!(words.len(), len);
        Ok(Self {
            words: words.into_boxed_slice(),
        })
    }

    /// Link for `cp` in the block at `at`.
    #[inline]
    fn find(&self, at: usize, cp: u32) -> Option<u32> {
        let count = self.words[at] as usize;
        let labels = &self.words[at + 1..at + 1 + count];
        let i = labels.binary_search(&cp).ok()?;
        Some(self.words[at + 1 + count + i])
    }

    pub fn node_words(&self) -> usize {
        self.words.len()
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of_val(&*self.words)
    }
}

impl Dictionary for SortedUtf32Trie {
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
            let Some(block) = at else {
                return false;
            };
            let Some(found) = self.find(block, cp) else {
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
            let count = self.words[at] as usize;
            lists.push(count);
            at += 1 + 2 * count;
        }
        list_stats(ENCODING, self.words.len(), lists.into_iter())
    }
}

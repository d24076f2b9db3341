//! Code-point tries.
//!
//! Words are first inserted into a [`PointerTree`] with unbounded branching,
//! then laid out into a single `u32` array. Two layouts are provided:
//! [`Utf32Trie`] scans unsorted `(code point, link)` pairs, [`SortedUtf32Trie`]
//! binary-searches a sorted block.
//!
//! A link is a 32-bit word:
//!
//! ```text
//! bit 31      stop flag (a word ends at this code point)
//! bits 30..0  array offset of the child's list (0 = no children)
//! ```
//!
//! The root's list sits at offset 0 and is never anyone's child, so 0 is free
//! to mean "none".

mod linear;
mod sorted;

pub use linear::Utf32Trie;
pub use sorted::SortedUtf32Trie;

use smallvec::SmallVec;

use crate::config::TrieConfig;
use crate::error::{Result, TrieError};
use crate::source::{ingest, WordSource};
use crate::stats::TrieStats;
use crate::tokenize::{SymbolSink, UnicodeTokenizer};

pub(crate) const STOP_BIT: u32 = 0x8000_0000;
pub(crate) const ADDRESS_MASK: u32 = 0x7fff_ffff;

/// Index of a node in a [`PointerTree`].
type NodeId = u32;

const ROOT: NodeId = 0;

#[derive(Debug, Default)]
struct TreeNode {
    /// `(code point, child)` in first-insertion order.
    children: SmallVec<[(u32, NodeId); 4]>,
    stop: bool,
}

/// Build-time trie with one heap entry per distinct transition.
#[derive(Debug)]
pub(crate) struct PointerTree {
    nodes: Vec<TreeNode>,
    current: Option<NodeId>,
}

impl PointerTree {
    fn new() -> Self {
        Self {
            nodes: vec![TreeNode::default()],
            current: None,
        }
    }

    /// Insert every word of `source`.
    pub(crate) fn build(source: WordSource<'_>, config: &TrieConfig) -> Result<Self> {
        config.validate()?;
        let mut tree = Self::new();
        ingest::<UnicodeTokenizer, _>(source, config, &mut tree)?;
        log::debug!("utf32: pointer tree holds {} nodes", tree.len());
        Ok(tree)
    }

    #[inline]
    fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id as usize]
    }

    #[inline]
    pub(crate) fn children(&self, id: NodeId) -> &[(u32, NodeId)] {
        &self.node(id).children
    }

    #[inline]
    pub(crate) fn has_children(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Link word for `child`, given where each listed node was placed.
    #[inline]
    fn link(&self, child: NodeId, offsets: &[u32]) -> u32 {
        let stop = if self.node(child).stop { STOP_BIT } else { 0 };
        let address = if self.has_children(child) {
            offsets[child as usize]
        } else {
            0
        };
        stop | address
    }

    /// Assign array offsets to the nodes in `order` (the root and every inner
    /// node), where a node's list takes `size(child count)` words.
    ///
    /// Fails when an offset would not fit in a link.
    fn place(
        &self,
        order: &[NodeId],
        size: impl Fn(usize) -> usize,
        encoding: &'static str,
        config: &TrieConfig,
    ) -> Result<(Vec<u32>, usize)> {
        let limit = config.limit_for(ADDRESS_MASK);
        let mut offsets = vec![0u32; self.nodes.len()];
        let mut next = 0usize;
        for &id in order {
            if next > limit as usize {
                return Err(TrieError::AddressOverflow {
                    encoding,
                    address: next as u64,
                    limit: u64::from(limit),
                });
            }
            offsets[id as usize] = next as u32;
            next += size(self.children(id).len());
        }
        Ok((offsets, next))
    }
}

impl SymbolSink for PointerTree {
    type Symbol = char;

    fn push(&mut self, c: char) -> Result<()> {
        let cp = u32::from(c);
        let from = self.current.unwrap_or(ROOT);
        let found = self.nodes[from as usize]
            .children
            .iter()
            .find(|&&(label, _)| label == cp)
            .map(|&(_, child)| child);
        let child = match found {
            Some(child) => child,
            None => {
                let child = NodeId::try_from(self.nodes.len()).map_err(|_| {
                    TrieError::AddressOverflow {
                        encoding: "utf32",
                        address: self.nodes.len() as u64,
                        limit: u64::from(u32::MAX),
                    }
                })?;
                self.nodes.push(TreeNode::default());
                self.nodes[from as usize].children.push((cp, child));
                child
            }
        };
        self.current = Some(child);
        Ok(())
    }

    fn end_word(&mut self) -> Result<()> {
        if let Some(id) = self.current.take() {
            self.nodes[id as usize].stop = true;
        }
        Ok(())
    }
}

/// Case-folded code points of `word`, or `None` if it is empty or holds a
/// non-letter.
pub(crate) fn fold(word: &str) -> Option<SmallVec<[u32; 16]>> {
    let mut out = SmallVec::new();
    for c in word.chars() {
        if !c.is_alphabetic() {
            return None;
        }
        out.extend(c.to_lowercase().map(u32::from));
    }
    (!out.is_empty()).then_some(out)
}

/// Stats shared by both layouts: one `node` entry per list.
fn list_stats(
    encoding: &'static str,
    words: usize,
    lists: impl Iterator<Item = usize>,
) -> TrieStats {
    let mut stats = TrieStats::new(encoding, 32, words);
    for children in lists {
        stats.kind("node").record(children);
    }
    stats
}

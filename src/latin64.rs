//! Latin trie with 64-bit nodes and letters partitioned into four sections.
//!
//! Letters are split by frequency into sections of 4, 5, 6 and 11 letters.
//! A group holds one word per letter of a single section, and every word
//! carries four 15-bit sub-addresses, one per section, for the groups that
//! follow that letter:
//!
//! ```text
//! word 0 of a group   bits 63..60  section id
//! word 1 + i/4        bit 60 + i%4 stop flag of local letter i
//! every word          bits 59..45 / 44..30 / 29..15 / 14..0
//!                     next group for section 0 / 1 / 2 / 3 (0 = none)
//! ```
//!
//! Address 0 is a single placeholder word whose sub-addresses are the
//! groups of first letters.

use crate::arena::{Addr, BlockArena};
use crate::config::TrieConfig;
use crate::error::Result;
use crate::source::{ingest, WordSource};
use crate::stats::TrieStats;
use crate::tokenize::{latin_index, LatinTokenizer, SymbolSink};
use crate::Dictionary;

const SECTIONS: usize = 4;
const SUB_BITS: u32 = 15;
const SUB_MASK: u64 = (1 << SUB_BITS) - 1;
const TOP_SHIFT: u32 = 60;
const LINKS_MASK: u64 = (1 << TOP_SHIFT) - 1;

/// Words per group, by section.
const SPACE: [usize; SECTIONS] = [4, 5, 6, 11];
const SECTION_KINDS: [&str; SECTIONS] = ["section0", "section1", "section2", "section3"];

/// Section of each letter `a..=z`.
const SECTION_OF: [u8; 26] = [
    0, 3, 2, 2, 0, 3, 3, 2, 0, 3, 3, 1, 2, 1, 1, 2, 3, 0, 1, 1, 2, 3, 3, 3, 3, 3,
];
/// Index of each letter inside its section.
const INDEX_OF: [u8; 26] = [
    1, 1, 0, 2, 0, 2, 0, 5, 3, 9, 5, 4, 4, 2, 0, 3, 10, 2, 3, 1, 1, 6, 4, 7, 3, 8,
];

const PLACEHOLDER: Addr = Addr::NONE;
const ENCODING: &str = "latin64";

#[inline]
fn partition(letter: u8) -> (usize, u8) {
    let i = usize::from(letter);
    (usize::from(SECTION_OF[i]), INDEX_OF[i])
}

#[inline]
fn sub_shift(section: usize) -> u32 {
    (SECTIONS - 1 - section) as u32 * SUB_BITS
}

#[inline]
fn sub_address(word: u64, section: usize) -> u32 {
    ((word >> sub_shift(section)) & SUB_MASK) as u32
}

/// A letter position: local index `local` in the group at `base`.
#[derive(Clone, Copy, Debug)]
struct Node {
    base: Addr,
    local: u8,
}

impl Node {
    #[inline]
    fn links(self) -> Addr {
        self.base.offset(u32::from(self.local))
    }

    /// Word holding this node's stop flag, and the flag itself.
    #[inline]
    fn stop(self) -> (Addr, u64) {
        let local = u32::from(self.local);
        (self.base.offset(1 + local / 4), 1 << (TOP_SHIFT + local % 4))
    }
}

/// Sectioned Latin trie of 64-bit node words.
#[derive(Debug)]
pub struct Latin64Trie {
    arena: BlockArena<u64>,
}

struct Builder {
    arena: BlockArena<u64>,
    current: Option<Node>,
}

impl SymbolSink for Builder {
    type Symbol = u8;

    fn push(&mut self, letter: u8) -> Result<()> {
        let (section, local) = partition(letter);
        let from = self.current.map_or(PLACEHOLDER, Node::links);
        let value = self.arena.get(from);
        let mut base = sub_address(value, section);
        if base == 0 {
            let group = self.arena.allocate(SPACE[section])?;
            self.arena.set(group, (section as u64) << TOP_SHIFT);
            self.arena
                .set(from, value | (u64::from(group.get()) << sub_shift(section)));
            base = group.get();
        }
        self.current = Some(Node {
            base: Addr::new(base),
            local,
        });
        Ok(())
    }

    fn end_word(&mut self) -> Result<()> {
        if let Some(node) = self.current.take() {
            let (addr, flag) = node.stop();
            let value = self.arena.get(addr);
            self.arena.set(addr, value | flag);
        }
        Ok(())
    }
}

impl Latin64Trie {
    /// Node words in use, placeholder included.
    pub fn node_words(&self) -> usize {
        self.arena.len()
    }

    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage()
    }

    fn is_stop(&self, node: Node) -> bool {
        let (addr, flag) = node.stop();
        self.arena.get(addr) & flag != 0
    }
}

impl Dictionary for Latin64Trie {
    fn build(source: WordSource<'_>, config: &TrieConfig) -> Result<Self> {
        config.validate()?;
        let mut arena = BlockArena::with_config(config, SUB_MASK as u32, ENCODING);
        arena.reserve_root(1);
        let mut builder = Builder {
            arena,
            current: None,
        };
        ingest::<LatinTokenizer, _>(source, config, &mut builder)?;
        log::debug!(
            "{ENCODING}: built {} node words in {} blocks",
            builder.arena.len(),
            builder.arena.num_blocks()
        );
        Ok(Self {
            arena: builder.arena,
        })
    }

    fn is_valid_word(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut from = PLACEHOLDER;
        let mut node = None;
        for byte in word.bytes() {
            let Some(letter) = latin_index(byte) else {
                return false;
            };
            let (section, local) = partition(letter);
            let base = sub_address(self.arena.get(from), section);
            if base == 0 {
                return false;
            }
            let next = Node {
                base: Addr::new(base),
                local,
            };
            from = next.links();
            node = Some(next);
        }
        node.is_some_and(|node| self.is_stop(node))
    }

    fn stats(&self) -> TrieStats {
        let mut stats = TrieStats::new(ENCODING, 64, self.arena.len());
        let mut base = 1u32;
        while (base as usize) < self.arena.len() {
            let section = (self.arena.get(Addr::new(base)) >> TOP_SHIFT) as usize;
            assert!(section < SECTIONS, "corrupt section id {section} at @{base}");
            let group = Addr::new(base);
            let used = (0..SPACE[section] as u8)
                .filter(|&local| {
                    let node = Node { base: group, local };
                    self.arena.get(node.links()) & LINKS_MASK != 0 || self.is_stop(node)
                })
                .count();
            stats.kind(SECTION_KINDS[section]).record(used);
            base += SPACE[section] as u32;
        }
        stats
    }
}

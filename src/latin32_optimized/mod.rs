//! Latin trie with adaptive node groups.
//!
//! A branch point starts life as a 4-word *sparse3* group (header plus three
//! letter slots) and is promoted to a 26-word *dense26* group the first time a
//! fourth distinct letter arrives. Most branch points in natural-language
//! dictionaries have one to three children, so the bulk of the trie stays in
//! the small form. See [`word`] for the bit layout.
//!
//! Promotion needs to rewrite the one slot that points at the old group. The
//! builder keeps a back-pointer index for every live sparse group; it exists
//! only during construction.

mod flat;
mod word;

pub use flat::FlatLatin32Trie;

use std::collections::{HashMap, HashSet};

use crate::arena::{Addr, BlockArena, Cursor};
use crate::config::TrieConfig;
use crate::error::Result;
use crate::source::{ingest, WordSource};
use crate::stats::TrieStats;
use crate::tokenize::{latin_index, LatinTokenizer, SymbolSink, LATIN_LETTERS};
use crate::Dictionary;

use word::{
    dense_word, sparse_slot_word, Group, Slot, SparseHeader, ADDRESS_MASK, CONTROL_MASK,
    DENSE_STOP, KIND_DENSE, SPARSE_GROUP, SPARSE_SLOTS,
};

const DENSE_GROUP: usize = LATIN_LETTERS;

const ENCODING: &str = "latin32-optimized";

/// Sparse/dense Latin trie of 32-bit node words, still backed by its arena.
///
/// Use [`flatten`](Self::flatten) for the contiguous read-only form.
#[derive(Debug)]
pub struct Latin32OptimizedTrie {
    arena: BlockArena<u32>,
    promotions: usize,
}

/// For every live sparse group, the one slot word that references it.
#[derive(Debug, Default)]
struct BackPointers {
    referrer_of: HashMap<Addr, Addr>,
    group_at: HashMap<Addr, Addr>,
}

impl BackPointers {
    fn link(&mut self, group: Addr, slot: Addr) {
        let prev = self.referrer_of.insert(group, slot);
        debug_assert!(prev.is_none(), "group {group} linked twice");
        self.group_at.insert(slot, group);
    }

    /// Forget `group`, returning the slot that referenced it.
    fn unlink(&mut self, group: Addr) -> Option<Addr> {
        let slot = self.referrer_of.remove(&group)?;
        self.group_at.remove(&slot);
        Some(slot)
    }

    /// A slot word moved from `from` to `to`; re-key whatever it referenced.
    fn moved(&mut self, from: Addr, to: Addr) {
        if let Some(group) = self.group_at.remove(&from) {
            self.group_at.insert(to, group);
            self.referrer_of.insert(group, to);
        }
    }

    fn len(&self) -> usize {
        self.referrer_of.len()
    }
}

struct Builder {
    arena: BlockArena<u32>,
    back: BackPointers,
    current: Option<Cursor>,
    promotions: usize,
}

impl Builder {
    fn new(config: &TrieConfig) -> Self {
        let mut arena = BlockArena::with_config(config, ADDRESS_MASK, ENCODING);
        let root = arena.reserve_root(DENSE_GROUP);
        for letter in 0..DENSE_GROUP as u32 {
            arena.set(root.offset(letter), KIND_DENSE);
        }
        Self {
            arena,
            back: BackPointers::default(),
            current: None,
            promotions: 0,
        }
    }

    /// A fresh sparse group holding `letter` in slot 0, reusing a released one if possible.
    fn new_sparse(&mut self, letter: u8) -> Result<Addr> {
        let group = self.arena.allocate_reusing(SPARSE_GROUP)?;
        let mut cursor = self.arena.cursor(group);
        cursor.set(&mut self.arena, SparseHeader::new(letter).0);
        for slot in 0..SPARSE_SLOTS {
            cursor.advance(1);
            cursor.set(&mut self.arena, sparse_slot_word(slot, 0));
        }
        Ok(group)
    }

    /// Replace the full sparse group at `group` with a dense one.
    fn promote(&mut self, group: Addr, header: SparseHeader) -> Result<Addr> {
        let dense = self.arena.allocate(DENSE_GROUP)?;
        let Some(referrer) = self.back.unlink(group) else {
            panic!("sparse group {group} has no back-pointer");
        };

        let mut cursor = self.arena.cursor(dense);
        for _ in 0..DENSE_GROUP {
            cursor.set(&mut self.arena, KIND_DENSE);
            cursor.advance(1);
        }

        let mut old = self.arena.cursor(group);
        for slot in 0..SPARSE_SLOTS {
            old.advance(1);
            let Some(letter) = header.letter(slot) else {
                panic!("promoting sparse group {group} with unused slot {slot}");
            };
            let child = old.get(&self.arena) & ADDRESS_MASK;
            let target = dense.offset(u32::from(letter));
            self.arena.set(target, dense_word(header.stop(slot), child));
            self.back.moved(old.addr(), target);
        }

        let incoming = self.arena.get(referrer);
        self.arena
            .set(referrer, (incoming & CONTROL_MASK) | dense.get());
        self.arena.release(group, SPARSE_GROUP);
        self.promotions += 1;
        log::trace!("{ENCODING}: promoted {group} to {dense} via {referrer}");
        Ok(dense)
    }
}

impl SymbolSink for Builder {
    type Symbol = u8;

    fn push(&mut self, letter: u8) -> Result<()> {
        let Some(mut cursor) = self.current else {
            self.current = Some(self.arena.cursor(Addr::new(u32::from(letter))));
            return Ok(());
        };

        let value = cursor.get(&self.arena);
        let child = value & ADDRESS_MASK;
        if child == 0 {
            let group = self.new_sparse(letter)?;
            cursor.set(&mut self.arena, (value & CONTROL_MASK) | group.get());
            self.back.link(group, cursor.addr());
            cursor.seek(group.offset(1));
        } else {
            let group = Addr::new(child);
            match Group::decode(cursor.seek_get(&self.arena, group)) {
                Group::Dense => cursor.advance(letter as usize),
                Group::Sparse(header) => {
                    if let Some(slot) = header.find(letter) {
                        cursor.advance(1 + slot);
                    } else if let Some(slot) = header.free_slot() {
                        cursor.set(&mut self.arena, header.with_letter(slot, letter).0);
                        cursor.advance(1 + slot);
                    } else {
                        let dense = self.promote(group, header)?;
                        cursor.seek(dense.offset(u32::from(letter)));
                    }
                }
            }
        }
        self.current = Some(cursor);
        Ok(())
    }

    fn end_word(&mut self) -> Result<()> {
        let Some(mut cursor) = self.current.take() else {
            return Ok(());
        };
        let value = cursor.get(&self.arena);
        match Slot::decode(value) {
            Slot::Dense { .. } => cursor.set(&mut self.arena, value | DENSE_STOP),
            Slot::Sparse { slot, .. } => {
                cursor.retreat(1 + slot);
                let header = SparseHeader(cursor.get(&self.arena));
                cursor.set(&mut self.arena, header.with_stop(slot).0);
            }
        }
        Ok(())
    }
}

impl Latin32OptimizedTrie {
    /// Node words in use, released groups included.
    pub fn node_words(&self) -> usize {
        self.arena.len()
    }

    /// Bytes held by the arena, including unused tail capacity.
    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage()
    }

    /// Sparse groups promoted to dense during construction.
    pub fn promotions(&self) -> usize {
        self.promotions
    }

    /// Released sparse groups still waiting for reuse.
    pub fn free_groups(&self) -> usize {
        self.arena.free_groups(SPARSE_GROUP)
    }

    /// Copy the arena into one contiguous array.
    pub fn flatten(&self) -> FlatLatin32Trie {
        let mut free: Vec<u32> = self
            .arena
            .free_list(SPARSE_GROUP)
            .iter()
            .map(|addr| addr.get())
            .collect();
        free.sort_unstable();
        FlatLatin32Trie::new(self.arena.to_flat(), free.into_boxed_slice())
    }
}

impl Dictionary for Latin32OptimizedTrie {
    fn build(source: WordSource<'_>, config: &TrieConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Builder::new(config);
        ingest::<LatinTokenizer, _>(source, config, &mut builder)?;
        log::debug!(
            "{ENCODING}: built {} node words in {} blocks, {} promotions, {} sparse groups indexed",
            builder.arena.len(),
            builder.arena.num_blocks(),
            builder.promotions,
            builder.back.len()
        );
        Ok(Self {
            arena: builder.arena,
            promotions: builder.promotions,
        })
    }

    fn is_valid_word(&self, word: &str) -> bool {
        let mut bytes = word.bytes();
        let Some(first) = bytes.next().and_then(latin_index) else {
            return false;
        };

        let mut cursor = self.arena.cursor(Addr::new(u32::from(first)));
        for byte in bytes {
            let Some(letter) = latin_index(byte) else {
                return false;
            };
            let child = cursor.get(&self.arena) & ADDRESS_MASK;
            if child == 0 {
                return false;
            }
            match Group::decode(cursor.seek_get(&self.arena, Addr::new(child))) {
                Group::Dense => cursor.advance(letter as usize),
                Group::Sparse(header) => match header.find(letter) {
                    Some(slot) => cursor.advance(1 + slot),
                    None => return false,
                },
            }
        }

        match Slot::decode(cursor.get(&self.arena)) {
            Slot::Dense { stop, .. } => stop,
            Slot::Sparse { slot, .. } => {
                cursor.retreat(1 + slot);
                SparseHeader(cursor.get(&self.arena)).stop(slot)
            }
        }
    }

    fn stats(&self) -> TrieStats {
        let free: HashSet<u32> = self
            .arena
            .free_list(SPARSE_GROUP)
            .iter()
            .map(|addr| addr.get())
            .collect();
        group_stats(ENCODING, self.arena.len(), &free, |addr| {
            self.arena.get(Addr::new(addr))
        })
    }
}

#[cfg(test)]
impl Latin32OptimizedTrie {
    /// Walk every reachable group checking layout invariants; returns the
    /// number of stored words.
    pub(crate) fn validate(&self) -> usize {
        let free: HashSet<Addr> = self
            .arena
            .free_list(SPARSE_GROUP)
            .iter()
            .copied()
            .collect();
        let mut seen = HashSet::new();
        let mut stack = vec![Addr::NONE];
        let mut words = 0;
        while let Some(group) = stack.pop() {
            assert!(seen.insert(group), "group {group} reachable twice");
            assert!(!free.contains(&group), "released group {group} is reachable");
            match Group::decode(self.arena.get(group)) {
                Group::Dense => {
                    for letter in 0..DENSE_GROUP as u32 {
                        let word = self.arena.get(group.offset(letter));
                        assert_ne!(word & KIND_DENSE, 0, "dense slot without kind flag");
                        if word & DENSE_STOP != 0 {
                            words += 1;
                        }
                        if word & ADDRESS_MASK != 0 {
                            stack.push(Addr::new(word & ADDRESS_MASK));
                        }
                    }
                }
                Group::Sparse(header) => {
                    let used = header.len();
                    assert!(used >= 1, "empty sparse group {group}");
                    for slot in 0..SPARSE_SLOTS {
                        let word = self.arena.get(group.offset(1 + slot as u32));
                        assert_eq!(Slot::decode(word), Slot::Sparse { slot });
                        match header.letter(slot) {
                            Some(letter) => {
                                assert!(usize::from(letter) < LATIN_LETTERS);
                                assert_eq!(header.find(letter), Some(slot), "duplicate letter");
                                if header.stop(slot) {
                                    words += 1;
                                }
                                if word & ADDRESS_MASK != 0 {
                                    stack.push(Addr::new(word & ADDRESS_MASK));
                                }
                            }
                            None => {
                                assert!(slot >= used, "hole in sparse group {group}");
                                assert!(!header.stop(slot));
                                assert_eq!(word & ADDRESS_MASK, 0);
                            }
                        }
                    }
                }
            }
        }
        words
    }
}

/// Walk the groups in address order and tally their fan-out.
///
/// Groups are laid out back to back starting with the root, and every group's
/// first word says which kind it is, so the walk needs no side table beyond
/// the released groups to skip.
fn group_stats(
    encoding: &'static str,
    len: usize,
    free: &HashSet<u32>,
    word: impl Fn(u32) -> u32,
) -> TrieStats {
    let mut stats = TrieStats::new(encoding, 32, len);
    let mut addr = 0u32;
    while (addr as usize) < len {
        if free.contains(&addr) {
            addr += SPARSE_GROUP as u32;
            continue;
        }
        match Group::decode(word(addr)) {
            Group::Dense => {
                let used = (addr..addr + DENSE_GROUP as u32)
                    .filter(|&slot| word(slot) & !KIND_DENSE != 0)
                    .count();
                stats.kind("dense26").record(used);
                addr += DENSE_GROUP as u32;
            }
            Group::Sparse(header) => {
                stats.kind("sparse3").record(header.len());
                addr += SPARSE_GROUP as u32;
            }
        }
    }
    stats.free_groups.insert("sparse3", free.len());
    stats
}

//! Baseline Latin trie with 32-bit nodes.
//!
//! Every branch point is a dense group of 26 words, one per letter:
//!
//! ```text
//! bit 31      stop flag (a word ends at this letter)
//! bits 30..0  base address of the child group (0 = no child)
//! ```
//!
//! There is no root node: the first 26 words of the arena are the root's
//! children, so the first letter of a word is its own address.

use crate::arena::{Addr, BlockArena, Cursor};
use crate::config::TrieConfig;
use crate::error::Result;
use crate::source::{ingest, WordSource};
use crate::stats::TrieStats;
use crate::tokenize::{latin_index, LatinTokenizer, SymbolSink, LATIN_LETTERS};
use crate::Dictionary;

const STOP_BIT: u32 = 0x8000_0000;
const ADDRESS_MASK: u32 = 0x7fff_ffff;
const GROUP: usize = LATIN_LETTERS;

const ENCODING: &str = "latin32";

/// Dense 26-way trie of 32-bit node words.
#[derive(Debug)]
pub struct Latin32Trie {
    arena: BlockArena<u32>,
}

struct Builder {
    arena: BlockArena<u32>,
    /// Node of the last letter pushed, if a word is open.
    current: Option<Cursor>,
}

impl Builder {
    fn new(config: &TrieConfig) -> Self {
        let mut arena = BlockArena::with_config(config, ADDRESS_MASK, ENCODING);
        arena.reserve_root(GROUP);
        Self {
            arena,
            current: None,
        }
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
        let mut base = value & ADDRESS_MASK;
        if base == 0 {
            base = self.arena.allocate(GROUP)?.get();
            cursor.set(&mut self.arena, (value & STOP_BIT) | base);
        }
        cursor.seek(Addr::new(base + u32::from(letter)));
        self.current = Some(cursor);
        Ok(())
    }

    fn end_word(&mut self) -> Result<()> {
        if let Some(cursor) = self.current.take() {
            let value = cursor.get(&self.arena);
            cursor.set(&mut self.arena, value | STOP_BIT);
        }
        Ok(())
    }
}

impl Latin32Trie {
    /// Node words in use.
    pub fn node_words(&self) -> usize {
        self.arena.len()
    }

    /// Bytes held by the arena, including unused tail capacity.
    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage()
    }
}

impl Dictionary for Latin32Trie {
    fn build(source: WordSource<'_>, config: &TrieConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Builder::new(config);
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
        let mut bytes = word.bytes();
        let Some(first) = bytes.next().and_then(latin_index) else {
            return false;
        };

        let mut cursor = self.arena.cursor(Addr::new(u32::from(first)));
        for byte in bytes {
            let Some(letter) = latin_index(byte) else {
                return false;
            };
            let base = cursor.get(&self.arena) & ADDRESS_MASK;
            if base == 0 {
                return false;
            }
            cursor.seek(Addr::new(base + u32::from(letter)));
        }
        cursor.get(&self.arena) & STOP_BIT != 0
    }

    fn stats(&self) -> TrieStats {
        let mut stats = TrieStats::new(ENCODING, 32, self.arena.len());
        let mut cursor = self.arena.cursor(Addr::NONE);
        let groups = self.arena.len() / GROUP;
        for _ in 0..groups {
            let mut used = 0;
            for _ in 0..GROUP {
                if cursor.get(&self.arena) != 0 {
                    used += 1;
                }
                cursor.advance(1);
            }
            stats.kind("dense26").record(used);
        }
        stats
    }
}

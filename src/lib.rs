//! # wordtrie
//!
//! Compact tries for exact word membership.
//!
//! Each encoding packs a trie into fixed-width node words, either in a
//! [`BlockArena`](arena::BlockArena) that grows by whole blocks or in one flat
//! array. They trade memory for lookup speed in different ways:
//!
//! | Type | Alphabet | Node word | Branch layout |
//! |---|---|---|---|
//! | [`Latin32Trie`] | `a-z` | 32-bit | always 26 slots |
//! | [`Latin32OptimizedTrie`] | `a-z` | 32-bit | 3 slots, promoted to 26 when full |
//! | [`FlatLatin32Trie`] | `a-z` | 32-bit | as above, copied into one slice |
//! | [`Latin64Trie`] | `a-z` | 64-bit | letters split into 4 frequency sections |
//! | [`Utf32Trie`] | Unicode letters | 32-bit | unsorted pair list |
//! | [`SortedUtf32Trie`] | Unicode letters | 32-bit | sorted block, binary search |
//!
//! Words are maximal runs of letters and are matched case-insensitively.
//!
//! ## Example
//!
//! ```rust
//! use wordtrie::{Dictionary, Latin32OptimizedTrie};
//!
//! let trie = Latin32OptimizedTrie::from_reader(&b"The cat sat on the mat."[..]).unwrap();
//! assert!(trie.is_valid_word("Cat"));
//! assert!(!trie.is_valid_word("dog"));
//!
//! let flat = trie.flatten();
//! assert!(flat.is_valid_word("mat"));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

use std::borrow::Cow;
use std::io::Read;

pub mod arena;
mod config;
mod error;
mod latin32;
mod latin32_optimized;
mod latin64;
mod source;
mod stats;
pub mod tokenize;
mod utf;

pub use config::{TrieConfig, MIN_BLOCK_SIZE};
pub use error::{Result, TrieError};
pub use latin32::Latin32Trie;
pub use latin32_optimized::{FlatLatin32Trie, Latin32OptimizedTrie};
pub use latin64::Latin64Trie;
pub use source::WordSource;
pub use stats::{Fanout, TrieStats};
pub use utf::{SortedUtf32Trie, Utf32Trie};

/// A read-only set of words built once from a [`WordSource`].
pub trait Dictionary: Sized + Send + Sync {
    /// Tokenize `source` and insert every word.
    fn build(source: WordSource<'_>, config: &TrieConfig) -> Result<Self>;

    /// Build from pre-split words with the default configuration.
    ///
    /// Each item is still split on non-letters, so `"don't"` adds `don` and `t`.
    fn from_words<'a, I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: Into<Cow<'a, str>> + 'a,
    {
        Self::build(WordSource::words(words), &TrieConfig::default())
    }

    /// Build from a text stream with the default configuration.
    fn from_reader<R: Read + Send>(reader: R) -> Result<Self> {
        Self::build(WordSource::reader(reader), &TrieConfig::default())
    }

    /// Whether `word` was inserted, ignoring case.
    ///
    /// Empty input and input containing a non-letter are never valid.
    fn is_valid_word(&self, word: &str) -> bool;

    /// Shape and size of the built trie.
    fn stats(&self) -> TrieStats;
}


#[cfg(test)]
mod proptests;

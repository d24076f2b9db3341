//! Error types for trie construction.
//!
//! Lookups never fail; every error surfaces from the blocking build call.

use std::io;

use thiserror::Error;

/// Errors raised while building a trie.
#[derive(Error, Debug)]
pub enum TrieError {
    /// A group base address no longer fits the encoding's address field.
    #[error("{encoding}: address space exhausted (address {address} exceeds limit {limit})")]
    AddressOverflow {
        encoding: &'static str,
        address: u64,
        limit: u64,
    },

    /// The underlying word source failed.
    #[error("I/O error while reading word source: {0}")]
    Io(#[from] io::Error),

    /// A code-point trie was fed bytes that are not UTF-8.
    #[error("invalid UTF-8 in word source at byte {offset}")]
    InvalidUtf8 { offset: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The background reader thread panicked before finishing the source.
    #[error("word source reader thread panicked")]
    ReaderPanicked,
}

/// Result type alias for trie construction.
pub type Result<T> = std::result::Result<T, TrieError>;

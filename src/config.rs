//! Construction settings shared by every encoding.

use crate::error::{Result, TrieError};

/// Smallest block size that still holds a whole 26-slot group.
pub const MIN_BLOCK_SIZE: usize = 32;

/// Configuration for building a trie.
#[derive(Debug, Clone)]
pub struct TrieConfig {
    /// Node-words per arena block. Must be a power of two, at least 32.
    pub block_size: usize,
    /// Bytes requested per read from a reader source.
    pub read_buffer_size: usize,
    /// Read a reader source on a separate thread while the caller parses.
    pub background_reader: bool,
    /// Chunks that may be in flight between the reader thread and the parser.
    pub channel_capacity: usize,
    /// Optional cap on group addresses, below the encoding's native width.
    pub address_limit: Option<u32>,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            block_size: 1024,
            read_buffer_size: 64 * 1024,
            background_reader: true,
            channel_capacity: 4,
            address_limit: None,
        }
    }
}

impl TrieConfig {
    /// Check the settings before any storage is allocated.
    pub fn validate(&self) -> Result<()> {
        if !self.block_size.is_power_of_two() || self.block_size < MIN_BLOCK_SIZE {
            return Err(TrieError::InvalidConfig(format!(
                "block_size must be a power of two >= {MIN_BLOCK_SIZE}, got {}",
                self.block_size
            )));
        }
        if self.read_buffer_size == 0 {
            return Err(TrieError::InvalidConfig(
                "read_buffer_size must be non-zero".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(TrieError::InvalidConfig(
                "channel_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The effective address limit for an encoding whose field holds `native` as its maximum.
    #[inline]
    pub(crate) fn limit_for(&self, native: u32) -> u32 {
        match self.address_limit {
            Some(cap) => cap.min(native),
            None => native,
        }
    }
}

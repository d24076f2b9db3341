//! Block arena for fixed-width node words.
//!
//! Storage grows by appending whole blocks and never moves a block once it
//! exists, so an [`Addr`] handed out stays valid for the arena's lifetime.
//! Addresses decompose into `(block, offset)` with a shift and a mask; the
//! [`Cursor`] caches that decomposition while a trie walk steps through
//! neighbouring words.

mod cursor;

pub use cursor::Cursor;

use std::fmt;

use crate::config::TrieConfig;
use crate::error::{Result, TrieError};

/// A fixed-width node word stored in a [`BlockArena`].
pub trait NodeWord: Copy + Default + Eq + fmt::Debug + Send + Sync + 'static {
    /// Width of the word in bits.
    const BITS: u32;
}

impl NodeWord for u32 {
    const BITS: u32 = 32;
}

impl NodeWord for u64 {
    const BITS: u32 = 64;
}

/// Index of a node word inside an arena.
///
/// `Addr::NONE` (0) doubles as the "no child" sentinel: every encoding reserves
/// the first words of its arena, so no group ever starts there.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Addr(u32);

impl Addr {
    pub const NONE: Addr = Addr(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// The address `delta` words further on.
    #[inline]
    pub const fn offset(self, delta: u32) -> Self {
        Self(self.0 + delta)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Block size expressed as shift + mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Geometry {
    shift: u32,
    mask: usize,
    size: usize,
}

impl Geometry {
    fn new(block_size: usize) -> Self {
        assert!(
            block_size.is_power_of_two(),
            "block size {block_size} is not a power of two"
        );
        Self {
            shift: block_size.trailing_zeros(),
            mask: block_size - 1,
            size: block_size,
        }
    }

    #[inline]
    fn split(self, addr: Addr) -> (usize, usize) {
        let raw = addr.index();
        (raw >> self.shift, raw & self.mask)
    }
}

/// Growable storage of node words handed out as monotonically increasing addresses.
pub struct BlockArena<W> {
    blocks: Vec<Box<[W]>>,
    geometry: Geometry,
    /// First address not yet handed out.
    next: u32,
    /// Largest group base the owning encoding can store.
    limit: u32,
    encoding: &'static str,
    /// Released groups by exact word count.
    free: Vec<Vec<Addr>>,
}

impl<W: NodeWord> BlockArena<W> {
    /// Create an arena with one empty block.
    pub fn new(block_size: usize, limit: u32, encoding: &'static str) -> Self {
        let geometry = Geometry::new(block_size);
        Self {
            blocks: vec![vec![W::default(); block_size].into_boxed_slice()],
            geometry,
            next: 0,
            limit,
            encoding,
            free: Vec::new(),
        }
    }

    /// Create an arena sized by `config`, capped at the encoding's native address limit.
    pub fn with_config(config: &TrieConfig, native_limit: u32, encoding: &'static str) -> Self {
        Self::new(config.block_size, config.limit_for(native_limit), encoding)
    }

    /// Words handed out so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.next as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.next == 0
    }

    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.geometry.size
    }

    /// Largest group base this arena will hand out.
    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Bytes held by the blocks, used or not.
    pub fn memory_usage(&self) -> usize {
        self.blocks.len() * self.geometry.size * std::mem::size_of::<W>()
            + self
                .free
                .iter()
                .map(|list| list.capacity() * std::mem::size_of::<Addr>())
                .sum::<usize>()
    }

    /// Reserve the encoding's fixed prefix (root slots, placeholder word).
    ///
    /// Only valid on an empty arena; the prefix is exempt from the address limit.
    pub fn reserve_root(&mut self, n: usize) -> Addr {
        assert!(self.is_empty(), "root must be reserved first");
        self.grow_to(n);
        self.next = n as u32;
        Addr::NONE
    }

    /// Reserve `n` consecutive fresh words.
    ///
    /// Fails when the group's base address exceeds the encoding's limit.
    pub fn allocate(&mut self, n: usize) -> Result<Addr> {
        let base = self.next;
        if base > self.limit {
            return Err(TrieError::AddressOverflow {
                encoding: self.encoding,
                address: u64::from(base),
                limit: u64::from(self.limit),
            });
        }
        let end = base as usize + n;
        if end > u32::MAX as usize {
            return Err(TrieError::AddressOverflow {
                encoding: self.encoding,
                address: end as u64,
                limit: u64::from(u32::MAX),
            });
        }
        self.grow_to(end);
        self.next = end as u32;
        Ok(Addr(base))
    }

    /// Take a previously released group of exactly `n` words, if any.
    #[inline]
    pub fn take_free(&mut self, n: usize) -> Option<Addr> {
        self.free.get_mut(n).and_then(Vec::pop)
    }

    /// Reuse a released group of `n` words, or allocate a fresh one.
    pub fn allocate_reusing(&mut self, n: usize) -> Result<Addr> {
        match self.take_free(n) {
            Some(addr) => Ok(addr),
            None => self.allocate(n),
        }
    }

    /// Return a group of `n` words for later reuse by [`Self::take_free`].
    pub fn release(&mut self, addr: Addr, n: usize) {
        debug_assert!(addr.get() as usize + n <= self.len());
        if self.free.len() <= n {
            self.free.resize_with(n + 1, Vec::new);
        }
        self.free[n].push(addr);
    }

    /// Released groups of `n` words awaiting reuse.
    pub fn free_groups(&self, n: usize) -> usize {
        self.free.get(n).map_or(0, Vec::len)
    }

    /// Start addresses of released groups of `n` words.
    pub fn free_list(&self, n: usize) -> &[Addr] {
        self.free.get(n).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn get(&self, addr: Addr) -> W {
        let (block, offset) = self.geometry.split(addr);
        self.blocks[block][offset]
    }

    #[inline]
    pub fn set(&mut self, addr: Addr, value: W) {
        let (block, offset) = self.geometry.split(addr);
        self.blocks[block][offset] = value;
    }

    /// A cursor positioned at `addr`.
    #[inline]
    pub fn cursor(&self, addr: Addr) -> Cursor {
        Cursor::new(self.geometry, addr)
    }

    /// Copy the used words into one contiguous slice.
    pub fn to_flat(&self) -> Box<[W]> {
        let mut out = Vec::with_capacity(self.len());
        let mut remaining = self.len();
        for block in &self.blocks {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(block.len());
            out.extend_from_slice(&block[..take]);
            remaining -= take;
        }
        out.into_boxed_slice()
    }

    /// Append blocks until `words` words are addressable.
    fn grow_to(&mut self, words: usize) {
        while self.blocks.len() * self.geometry.size < words {
            self.blocks
                .push(vec![W::default(); self.geometry.size].into_boxed_slice());
        }
    }
}

impl<W: NodeWord> fmt::Debug for BlockArena<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockArena")
            .field("encoding", &self.encoding)
            .field("words", &self.next)
            .field("blocks", &self.blocks.len())
            .field("block_size", &self.geometry.size)
            .field("limit", &self.limit)
            .finish()
    }
}

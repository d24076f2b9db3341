//! Cached `(block, offset)` position inside a [`BlockArena`].

use super::{Addr, BlockArena, Geometry, NodeWord};

/// A position in an arena that steps word by word without re-splitting the address.
///
/// The cursor does no bounds checking of its own: the caller only moves it
/// within groups it has already allocated.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    block: usize,
    offset: usize,
    geometry: Geometry,
}

impl Cursor {
    #[inline]
    pub(crate) fn new(geometry: Geometry, addr: Addr) -> Self {
        let (block, offset) = geometry.split(addr);
        Self {
            block,
            offset,
            geometry,
        }
    }

    /// Jump to an absolute address.
    #[inline]
    pub fn seek(&mut self, addr: Addr) {
        let (block, offset) = self.geometry.split(addr);
        self.block = block;
        self.offset = offset;
    }

    #[inline]
    pub fn addr(&self) -> Addr {
        Addr::new((self.block * self.geometry.size + self.offset) as u32)
    }

    /// Move `k` words forward, carrying into following blocks.
    #[inline]
    pub fn advance(&mut self, k: usize) {
        self.offset += k;
        while self.offset >= self.geometry.size {
            self.offset -= self.geometry.size;
            self.block += 1;
        }
    }

    /// Move `k` words back, borrowing from preceding blocks.
    #[inline]
    pub fn retreat(&mut self, k: usize) {
        let mut k = k;
        while k > self.offset {
            k -= self.offset + 1;
            self.block -= 1;
            self.offset = self.geometry.size - 1;
        }
        self.offset -= k;
    }

    #[inline]
    pub fn get<W: NodeWord>(&self, arena: &BlockArena<W>) -> W {
        debug_assert_eq!(arena.geometry, self.geometry);
        arena.blocks[self.block][self.offset]
    }

    #[inline]
    pub fn set<W: NodeWord>(&self, arena: &mut BlockArena<W>, value: W) {
        debug_assert_eq!(arena.geometry, self.geometry);
        arena.blocks[self.block][self.offset] = value;
    }

    /// Seek to `addr` and read the word there.
    #[inline]
    pub fn seek_get<W: NodeWord>(&mut self, arena: &BlockArena<W>, addr: Addr) -> W {
        self.seek(addr);
        self.get(arena)
    }
}

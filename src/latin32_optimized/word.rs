//! Bit layout of the optimized Latin encoding.
//!
//! ```text
//! dense26 slot (26 consecutive words, one per letter)
//!   bit 31      1 = dense kind
//!   bit 30      stop flag for this letter
//!   bits 28..0  child group address (0 = none)
//!
//! sparse3 group (4 consecutive words)
//!   word 0 (header)
//!     bit 31      0 = sparse kind
//!     bits 28..26 stop flags for slots 0, 1, 2 (MSB first)
//!     bits 14..0  three 5-bit letter indices, slot 0 first; 0b11111 = unused
//!   words 1..=3 (slots)
//!     bit 31      0
//!     bits 30..29 slot number of this word
//!     bits 28..0  child group address (0 = none)
//! ```
//!
//! The dense/sparse flag lives in every word, so a walk can tell which kind
//! of group it is standing in from any slot without looking at a parent.

pub(crate) const KIND_DENSE: u32 = 0x8000_0000;
pub(crate) const DENSE_STOP: u32 = 0x4000_0000;
pub(crate) const ADDRESS_MASK: u32 = 0x1fff_ffff;
/// Bits preserved when a slot's child address is rewritten.
pub(crate) const CONTROL_MASK: u32 = !ADDRESS_MASK;

const SLOT_SHIFT: u32 = 29;
const SLOT_BITS: u32 = 0b11;
const SPARSE_STOP_SHIFT: u32 = 26;
const SPARSE_STOP_BITS: u32 = 0b111;
const LETTER_BITS: u32 = 5;
const LETTER_MASK: u32 = 0b11111;
pub(crate) const EMPTY_LETTER: u8 = 0b11111;

/// Letters held by one sparse group.
pub(crate) const SPARSE_SLOTS: usize = 3;
/// Words in a sparse group: header plus one word per slot.
pub(crate) const SPARSE_GROUP: usize = SPARSE_SLOTS + 1;

/// What the word at a node position says about that node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A letter slot inside a dense group.
    Dense { stop: bool },
    /// Slot `slot` of a sparse group; its stop flag lives in the header.
    Sparse { slot: usize },
}

impl Slot {
    #[inline]
    pub(crate) fn decode(word: u32) -> Self {
        if word & KIND_DENSE != 0 {
            Slot::Dense {
                stop: word & DENSE_STOP != 0,
            }
        } else {
            Slot::Sparse {
                slot: ((word >> SLOT_SHIFT) & SLOT_BITS) as usize,
            }
        }
    }
}

/// The kind of group that starts at a given address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Group {
    Dense,
    Sparse(SparseHeader),
}

impl Group {
    /// Decode from the first word of a group.
    #[inline]
    pub(crate) fn decode(word: u32) -> Self {
        if word & KIND_DENSE != 0 {
            Group::Dense
        } else {
            Group::Sparse(SparseHeader(word))
        }
    }
}

#[inline]
pub(crate) const fn dense_word(stop: bool, child: u32) -> u32 {
    KIND_DENSE | if stop { DENSE_STOP } else { 0 } | child
}

#[inline]
pub(crate) const fn sparse_slot_word(slot: usize, child: u32) -> u32 {
    ((slot as u32) << SLOT_SHIFT) | child
}

/// Header word of a sparse group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct SparseHeader(pub(crate) u32);

impl SparseHeader {
    /// A header holding `letter` in slot 0 and nothing else.
    #[inline]
    pub(crate) fn new(letter: u8) -> Self {
        let empty = u32::from(EMPTY_LETTER);
        Self((u32::from(letter) << (2 * LETTER_BITS)) | (empty << LETTER_BITS) | empty)
    }

    #[inline]
    fn letter_shift(slot: usize) -> u32 {
        debug_assert!(slot < SPARSE_SLOTS);
        (2 - slot as u32) * LETTER_BITS
    }

    /// Letter index in `slot`, or `None` if the slot is unused.
    #[inline]
    pub(crate) fn letter(self, slot: usize) -> Option<u8> {
        let letter = ((self.0 >> Self::letter_shift(slot)) & LETTER_MASK) as u8;
        (letter != EMPTY_LETTER).then_some(letter)
    }

    /// Slot holding `letter`.
    #[inline]
    pub(crate) fn find(self, letter: u8) -> Option<usize> {
        let letter = u32::from(letter);
        if (self.0 >> (2 * LETTER_BITS)) & LETTER_MASK == letter {
            Some(0)
        } else if (self.0 >> LETTER_BITS) & LETTER_MASK == letter {
            Some(1)
        } else if self.0 & LETTER_MASK == letter {
            Some(2)
        } else {
            None
        }
    }

    /// First unused slot. Slots fill in order, so slot 0 is always taken.
    #[inline]
    pub(crate) fn free_slot(self) -> Option<usize> {
        (1..SPARSE_SLOTS).find(|&slot| self.letter(slot).is_none())
    }

    #[inline]
    pub(crate) fn with_letter(self, slot: usize, letter: u8) -> Self {
        let shift = Self::letter_shift(slot);
        Self((self.0 & !(LETTER_MASK << shift)) | (u32::from(letter) << shift))
    }

    #[inline]
    fn stop_mask(slot: usize) -> u32 {
        debug_assert!(slot < SPARSE_SLOTS);
        0b100 >> slot << SPARSE_STOP_SHIFT
    }

    #[inline]
    pub(crate) fn stop(self, slot: usize) -> bool {
        self.stop_bits() & (0b100 >> slot) != 0
    }

    #[inline]
    pub(crate) fn with_stop(self, slot: usize) -> Self {
        Self(self.0 | Self::stop_mask(slot))
    }

    /// Raw 3-bit stop field, slot 0 in the high bit.
    #[inline]
    pub(crate) fn stop_bits(self) -> u32 {
        (self.0 >> SPARSE_STOP_SHIFT) & SPARSE_STOP_BITS
    }

    /// Number of letters in use.
    #[inline]
    pub(crate) fn len(self) -> usize {
        (0..SPARSE_SLOTS).filter(|&slot| self.letter(slot).is_some()).count()
    }
}

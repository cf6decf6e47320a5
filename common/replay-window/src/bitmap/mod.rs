// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! Circular bitmap backing the replay window.
//!
//! Word-level primitives live behind [`BitmapOps`] so that vectorised variants
//! can be slotted in per architecture; [`ReplayBitmap`] layers the ring
//! addressing used by the window on top of them.

use crate::constants::WORD_BITS;

mod scalar;

pub use self::scalar::ScalarBitmapOps;

/// Word-level operations on a bitmap stored as `u64` words.
///
/// None of these are atomic on their own; callers are expected to hold whatever
/// lock guards the bitmap.
pub trait BitmapOps {
    /// Clear a range of words in the bitmap
    fn clear_words(bitmap: &mut [u64], start_idx: usize, num_words: usize);

    /// Check if a range of words in the bitmap is all zeros
    fn is_range_zero(bitmap: &[u64], start_idx: usize, num_words: usize) -> bool;

    /// Check if a specific bit is set in the bitmap
    fn check_bit(bitmap: &[u64], bit_idx: u64) -> bool;

    /// Set a specific bit, returning whether it had already been set
    fn check_and_set_bit(bitmap: &mut [u64], bit_idx: u64) -> bool;
}

/// Fixed-size ring of bits addressed by `counter mod bits`.
///
/// The number of words is always a power of two so that ring reduction is a mask.
pub struct ReplayBitmap<O = ScalarBitmapOps> {
    words: Box<[u64]>,
    _ops: std::marker::PhantomData<O>,
}

impl<O: BitmapOps> ReplayBitmap<O> {
    /// Create a zeroed bitmap holding `bits` bits.
    ///
    /// `bits` must be a power of two and a multiple of [`WORD_BITS`]; window
    /// configuration enforces this before a bitmap is ever built.
    pub(crate) fn new(bits: usize) -> Self {
        debug_assert!(bits.is_power_of_two() && bits >= WORD_BITS);

        ReplayBitmap {
            words: vec![0u64; bits / WORD_BITS].into_boxed_slice(),
            _ops: std::marker::PhantomData,
        }
    }

    pub(crate) fn num_words(&self) -> usize {
        self.words.len()
    }

    pub(crate) fn bits(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    #[inline(always)]
    fn bit_mask(&self) -> u64 {
        self.bits() as u64 - 1
    }

    /// Zero the `count` words that follow word `after_word` in ring order.
    ///
    /// `after_word` is an unreduced word index (`counter >> WORD_SHIFT`) and
    /// `count` is capped at the number of words, at which point the whole ring
    /// is wiped.
    pub(crate) fn clear_after(&mut self, after_word: u64, count: usize) {
        let num_words = self.num_words();
        let count = count.min(num_words);
        if count == 0 {
            return;
        }

        let start = (after_word.wrapping_add(1) & (num_words as u64 - 1)) as usize;
        let head = count.min(num_words - start);
        O::clear_words(&mut self.words, start, head);
        O::clear_words(&mut self.words, 0, count - head);

        debug_assert!(O::is_range_zero(&self.words, start, head));
    }

    /// Mark the slot of `counter` as seen, returning whether it already was.
    #[inline]
    pub(crate) fn test_and_set(&mut self, counter: u64) -> bool {
        let bit = counter & self.bit_mask();
        O::check_and_set_bit(&mut self.words, bit)
    }

    /// Whether the slot of `counter` is currently marked.
    #[inline]
    pub(crate) fn is_set(&self, counter: u64) -> bool {
        let bit = counter & self.bit_mask();
        O::check_bit(&self.words, bit)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        O::is_range_zero(&self.words, 0, self.num_words())
    }

    #[cfg(test)]
    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }

    /// Ring index of the word holding `counter`.
    #[cfg(test)]
    pub(crate) fn word_index(&self, counter: u64) -> usize {
        ((counter >> crate::constants::WORD_SHIFT) & (self.num_words() as u64 - 1)) as usize
    }
}

impl<O> std::fmt::Debug for ReplayBitmap<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayBitmap")
            .field("bits", &(self.words.len() * WORD_BITS))
            .field(
                "set_bits",
                &self.words.iter().map(|w| w.count_ones()).sum::<u32>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(bits: usize) -> ReplayBitmap {
        ReplayBitmap::new(bits)
    }

    #[test]
    fn slots_wrap_around_the_ring() {
        let mut bitmap = bitmap(256);
        assert_eq!(bitmap.num_words(), 4);

        assert!(!bitmap.test_and_set(3));
        // 256 + 3 lands on the very same slot
        assert!(bitmap.test_and_set(259));
        assert!(bitmap.is_set(515));
        assert_eq!(bitmap.word_index(259), 0);
        assert_eq!(bitmap.word_index(64 * 7), 3);
    }

    #[test]
    fn clearing_wraps_past_the_last_word() {
        let mut bitmap = bitmap(256);
        for word in 0..4u64 {
            bitmap.test_and_set(word * 64 + 1);
        }

        // words after index 2 (mod 4): 3 and then 0
        bitmap.clear_after(2, 2);
        assert!(!bitmap.is_set(1));
        assert!(bitmap.is_set(65));
        assert!(bitmap.is_set(129));
        assert!(!bitmap.is_set(193));
    }

    #[test]
    fn clearing_more_than_the_ring_wipes_everything_once() {
        let mut bitmap = bitmap(256);
        for counter in [0, 70, 140, 210] {
            bitmap.test_and_set(counter);
        }
        assert!(!bitmap.is_empty());

        bitmap.clear_after(1_000_000, 1_000);
        assert!(bitmap.is_empty());
    }

    #[test]
    fn clearing_nothing_is_a_noop() {
        let mut bitmap = bitmap(128);
        bitmap.test_and_set(5);
        bitmap.clear_after(0, 0);
        assert!(bitmap.is_set(5));
    }
}

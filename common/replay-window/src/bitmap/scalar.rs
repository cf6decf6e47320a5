// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! Portable word-at-a-time implementation of the bitmap primitives.

use super::BitmapOps;
use crate::constants::{WORD_BITS, WORD_SHIFT};

#[inline(always)]
fn locate(bit_idx: u64) -> (usize, u64) {
    let word_idx = (bit_idx >> WORD_SHIFT) as usize;
    let mask = 1u64 << (bit_idx % WORD_BITS as u64);
    (word_idx, mask)
}

pub struct ScalarBitmapOps;

impl BitmapOps for ScalarBitmapOps {
    #[inline(always)]
    fn clear_words(bitmap: &mut [u64], start_idx: usize, num_words: usize) {
        debug_assert!(start_idx + num_words <= bitmap.len());

        bitmap[start_idx..start_idx + num_words].fill(0);
    }

    #[inline(always)]
    fn is_range_zero(bitmap: &[u64], start_idx: usize, num_words: usize) -> bool {
        debug_assert!(start_idx + num_words <= bitmap.len());

        bitmap[start_idx..start_idx + num_words]
            .iter()
            .all(|&w| w == 0)
    }

    #[inline(always)]
    fn check_bit(bitmap: &[u64], bit_idx: u64) -> bool {
        let (word_idx, mask) = locate(bit_idx);
        bitmap[word_idx] & mask != 0
    }

    #[inline(always)]
    fn check_and_set_bit(bitmap: &mut [u64], bit_idx: u64) -> bool {
        let (word_idx, mask) = locate(bit_idx);

        let old_word = bitmap[word_idx];
        bitmap[word_idx] = old_word | mask;

        old_word & mask != 0
    }
}

// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

/// Width of a single bitmap word in bits.
pub const WORD_BITS: usize = u64::BITS as usize;

pub(crate) const WORD_SHIFT: u32 = WORD_BITS.trailing_zeros();

/// Default size of the replay bitmap in bits (32 words).
pub const DEFAULT_WINDOW_BITS: usize = 2048;

/// Smallest accepted bitmap size. One word is always reserved as slack,
/// so anything below two words would leave no usable window.
pub const MIN_WINDOW_BITS: usize = 2 * WORD_BITS;

/// Largest accepted bitmap size (128KiB of state per session).
pub const MAX_WINDOW_BITS: usize = 1 << 20;

/// Hard lifetime bound on received counters: 2^64 - 2^16 - 1.
///
/// The headroom below the true 64-bit rollover gives the session time to rekey
/// before the counter space runs out. Incoming counters at or above this value
/// are rejected and permanently exhaust the window.
pub const REJECT_AFTER_MESSAGES: u64 = u64::MAX - (1 << 16);

/// Number of counters behind the high-water mark that can still be accepted
/// for a bitmap of the given size.
///
/// Stale words are cleared a whole word at a time, so the word currently holding
/// the high-water mark may still carry bits from a full bitmap cycle earlier.
/// Giving up one word of reach keeps those leftover bits out of the window.
pub const fn acceptance_window(window_bits: usize) -> u64 {
    (window_bits - WORD_BITS) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_bound_leaves_rekey_headroom() {
        let expected = (1u128 << 64) - (1u128 << 16) - 1;
        assert_eq!(REJECT_AFTER_MESSAGES as u128, expected);
        assert_eq!(u64::MAX - REJECT_AFTER_MESSAGES, 1 << 16);
    }

    #[test]
    fn default_window_reaches_1984_counters_back() {
        assert_eq!(acceptance_window(DEFAULT_WINDOW_BITS), 1984);
        assert_eq!(WORD_SHIFT, 6);
    }
}

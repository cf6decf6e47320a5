// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::bitmap::ReplayBitmap;
use crate::config::ReplayWindowConfig;
use crate::constants::{acceptance_window, DEFAULT_WINDOW_BITS, REJECT_AFTER_MESSAGES, WORD_SHIFT};
use crate::error::{ConfigError, ReplayError, ReplayResult};
use crate::stats::{ReplayStats, ReplayStatsSnapshot};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

/// Sliding bitmap anti-replay window of a single session (RFC 6479).
///
/// Counters must only be fed in once the packet carrying them has been authenticated,
/// as the window has no way of telling a forged counter apart from a genuine one.
///
/// All methods take `&self`; the whole read-modify-write of a validation runs under a
/// per-window lock, so the window can be shared between parallel decryption workers
/// (typically behind an `Arc`). Distinct windows share nothing.
#[derive(Debug)]
pub struct ReplayWindow {
    state: Mutex<WindowState>,
    window_size: u64,
    stats: ReplayStats,
}

#[derive(Debug)]
struct WindowState {
    /// One past the greatest counter accepted so far, 0 if nothing has been received.
    counter: u64,

    /// Latched once a counter beyond the session lifetime shows up.
    exhausted: bool,

    bitmap: ReplayBitmap,
}

impl WindowState {
    fn new(window_bits: usize) -> Self {
        WindowState {
            counter: 0,
            exhausted: false,
            bitmap: ReplayBitmap::new(window_bits),
        }
    }

    // the stored counter is 1-based, so the receiver runs out one step after the sender does
    fn is_exhausted(&self) -> bool {
        self.exhausted || self.counter > REJECT_AFTER_MESSAGES
    }

    /// Lifetime and age checks shared by the read-only and the mutating path.
    /// Returns the 1-based form of the counter.
    #[inline]
    fn admit(&self, their_counter: u64, window_size: u64) -> ReplayResult<u64> {
        if self.is_exhausted() || their_counter >= REJECT_AFTER_MESSAGES {
            return Err(ReplayError::CounterSpaceExhausted);
        }

        let their_counter = their_counter + 1;

        // same as `their_counter + window_size < self.counter`, which overflows for wide windows
        if their_counter < self.counter.saturating_sub(window_size) {
            return Err(ReplayError::OutOfWindow);
        }

        Ok(their_counter)
    }

    fn will_accept(&self, their_counter: u64, window_size: u64) -> ReplayResult {
        let their_counter = self.admit(their_counter, window_size)?;

        // a new high-water mark always lands on a clean slot once the window slides
        if their_counter > self.counter || !self.bitmap.is_set(their_counter) {
            Ok(())
        } else {
            Err(ReplayError::DuplicateCounter)
        }
    }

    fn validate(&mut self, their_counter: u64, window_size: u64) -> ReplayResult {
        let their_counter = match self.admit(their_counter, window_size) {
            Ok(counter) => counter,
            Err(ReplayError::CounterSpaceExhausted) => {
                if !self.exhausted {
                    self.exhausted = true;
                    warn!(
                        their_counter,
                        "received counter beyond the session lifetime. the replay window is now exhausted and the session must be rekeyed"
                    );
                }
                return Err(ReplayError::CounterSpaceExhausted);
            }
            Err(err) => return Err(err),
        };

        if their_counter > self.counter {
            let index = their_counter >> WORD_SHIFT;
            let index_current = self.counter >> WORD_SHIFT;
            let num_words = self.bitmap.num_words();

            // anything beyond the number of words means the whole ring is stale
            let top = (index - index_current).min(num_words as u64) as usize;
            if top == num_words && self.counter != 0 {
                debug!(
                    from = self.counter - 1,
                    to = their_counter - 1,
                    "replay window jumped past its full width"
                );
            }
            self.bitmap.clear_after(index_current, top);
            self.counter = their_counter;
        }

        if self.bitmap.test_and_set(their_counter) {
            return Err(ReplayError::DuplicateCounter);
        }
        Ok(())
    }
}

impl ReplayWindow {
    /// Create an empty window with the default 2048-bit bitmap.
    pub fn new() -> Self {
        Self::new_unchecked(DEFAULT_WINDOW_BITS)
    }

    pub fn with_config(config: &ReplayWindowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new_unchecked(config.window_bits))
    }

    pub(crate) fn new_unchecked(window_bits: usize) -> Self {
        ReplayWindow {
            state: Mutex::new(WindowState::new(window_bits)),
            window_size: acceptance_window(window_bits),
            stats: ReplayStats::default(),
        }
    }

    /// Accept or reject an authenticated packet counter.
    ///
    /// Returns `true` exactly once for every distinct counter that is inside the window
    /// and below the session lifetime bound, and marks it as seen. Duplicates, counters
    /// that fell behind the window and counters past the lifetime bound all get `false`.
    /// Rejected packets are to be dropped without telling the peer why.
    pub fn validate(&self, their_counter: u64) -> bool {
        self.check(their_counter).is_ok()
    }

    /// Same transaction as [`validate`](Self::validate), but reporting why a counter
    /// got rejected. The reason is for local use (logging, metrics, triggering a rekey)
    /// and must not make it onto the wire.
    pub fn check(&self, their_counter: u64) -> ReplayResult {
        let outcome = self.state.lock().validate(their_counter, self.window_size);

        if let Err(err) = outcome {
            trace!(their_counter, "rejected packet counter: {err}");
        }
        self.stats.record(&outcome);
        outcome
    }

    /// Tell whether [`check`](Self::check) would currently accept the counter, without
    /// recording anything.
    ///
    /// Meant as a cheap filter ahead of decryption. The answer can be stale by the time
    /// the packet gets validated for real, so it never replaces [`check`](Self::check).
    pub fn will_accept(&self, their_counter: u64) -> ReplayResult {
        self.state.lock().will_accept(their_counter, self.window_size)
    }

    /// Whether the counter space of this session has been used up. Once this is `true`
    /// every counter gets rejected and the session has to be rekeyed or torn down.
    pub fn is_exhausted(&self) -> bool {
        self.state.lock().is_exhausted()
    }

    /// The greatest counter accepted so far.
    pub fn highest_accepted(&self) -> Option<u64> {
        self.state.lock().counter.checked_sub(1)
    }

    /// How far behind the greatest accepted counter a counter may be and still be accepted.
    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    pub fn window_bits(&self) -> usize {
        self.state.lock().bitmap.bits()
    }

    pub fn stats(&self) -> ReplayStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for ReplayWindow {
    fn default() -> Self {
        Self::new()
    }
}

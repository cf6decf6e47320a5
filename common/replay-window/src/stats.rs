// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::ReplayError;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running tally of validation outcomes for a single window.
///
/// Updated with relaxed atomics outside of the window lock, so a snapshot taken
/// while other threads validate is only approximately consistent.
#[derive(Debug, Default)]
pub struct ReplayStats {
    accepted: AtomicU64,
    duplicate: AtomicU64,
    out_of_window: AtomicU64,
    exhausted: AtomicU64,
}

impl ReplayStats {
    pub(crate) fn record(&self, outcome: &Result<(), ReplayError>) {
        let counter = match outcome {
            Ok(()) => &self.accepted,
            Err(ReplayError::DuplicateCounter) => &self.duplicate,
            Err(ReplayError::OutOfWindow) => &self.out_of_window,
            Err(ReplayError::CounterSpaceExhausted) => &self.exhausted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReplayStatsSnapshot {
        ReplayStatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            duplicate: self.duplicate.load(Ordering::Relaxed),
            out_of_window: self.out_of_window.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplayStatsSnapshot {
    pub accepted: u64,
    pub duplicate: u64,
    pub out_of_window: u64,
    pub exhausted: u64,
}

impl ReplayStatsSnapshot {
    pub fn rejected(&self) -> u64 {
        self.duplicate + self.out_of_window + self.exhausted
    }

    pub fn total(&self) -> u64 {
        self.accepted + self.rejected()
    }
}

// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! # nym-replay-window
//!
//! Anti-replay protection for counter-based transport sessions, using the sliding
//! bitmap window of RFC 6479.
//!
//! This crate provides:
//! - [`ReplayWindow`]: the per-session validator, safe to share between threads
//! - [`ReplayWindowRegistry`]: windows of all live sessions, keyed by receiver index
//! - [`ReplayWindowConfig`]: window sizing, loadable from TOML
//!
//! Only counters of packets that already passed authentication may be fed in.

pub mod bitmap;
pub mod config;
pub mod constants;
pub mod error;
pub mod registry;
pub mod stats;
pub mod window;

pub use config::ReplayWindowConfig;
pub use constants::{
    DEFAULT_WINDOW_BITS, MAX_WINDOW_BITS, MIN_WINDOW_BITS, REJECT_AFTER_MESSAGES, WORD_BITS,
};
pub use error::{ConfigError, RegistryError, ReplayError, ReplayResult};
pub use registry::ReplayWindowRegistry;
pub use stats::ReplayStatsSnapshot;
pub use window::ReplayWindow;

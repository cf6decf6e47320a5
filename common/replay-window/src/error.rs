// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reason a counter was turned down.
///
/// This is for local bookkeeping only. Peers must never learn which of these fired,
/// hence [`ReplayWindow::validate`](crate::ReplayWindow::validate) collapsing all of
/// them into a plain `false`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReplayError {
    #[error("the session counter space has been exhausted and the session must be rekeyed")]
    CounterSpaceExhausted,

    #[error("the counter is too far behind the replay window")]
    OutOfWindow,

    #[error("the counter has already been received")]
    DuplicateCounter,
}

pub type ReplayResult<T = ()> = Result<T, ReplayError>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("there is no replay window registered for session {session_id}")]
    UnknownSession { session_id: u32 },

    #[error(transparent)]
    Rejected(#[from] ReplayError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{bits} is not a valid replay window size. it must be a power of two between {min} and {max} bits", min = crate::MIN_WINDOW_BITS, max = crate::MAX_WINDOW_BITS)]
    InvalidWindowSize { bits: usize },

    #[error("failed to read replay window config from '{}': {source}", .path.display())]
    ConfigFileReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("the replay window config at '{}' is malformed: {source}", .path.display())]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

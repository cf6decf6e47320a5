// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::config::ReplayWindowConfig;
use crate::error::{ConfigError, RegistryError};
use crate::window::ReplayWindow;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Replay windows of all currently established sessions, keyed by their receiver index.
///
/// The map only guards membership. Validation locks nothing but the window of the
/// session in question, so sessions never contend with each other.
#[derive(Debug)]
pub struct ReplayWindowRegistry {
    config: ReplayWindowConfig,
    windows: DashMap<u32, Arc<ReplayWindow>>,
}

impl ReplayWindowRegistry {
    pub fn new(config: ReplayWindowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ReplayWindowRegistry {
            config,
            windows: DashMap::new(),
        })
    }

    pub fn config(&self) -> &ReplayWindowConfig {
        &self.config
    }

    /// Start tracking a freshly established session.
    ///
    /// Any window previously held under the same index belongs to a torn down session
    /// and gets replaced with an empty one.
    pub fn open_session(&self, session_id: u32) -> Arc<ReplayWindow> {
        // the config got validated when the registry was built
        let window = Arc::new(ReplayWindow::new_unchecked(self.config.window_bits));

        if self
            .windows
            .insert(session_id, Arc::clone(&window))
            .is_some()
        {
            debug!(session_id, "replaced replay window of a previous session");
        } else {
            debug!(session_id, "opened replay window");
        }
        window
    }

    pub fn close_session(&self, session_id: u32) -> bool {
        let removed = self.windows.remove(&session_id).is_some();
        if removed {
            debug!(session_id, "closed replay window");
        }
        removed
    }

    pub fn window(&self, session_id: u32) -> Option<Arc<ReplayWindow>> {
        self.windows
            .get(&session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn check(&self, session_id: u32, their_counter: u64) -> Result<(), RegistryError> {
        // clone out of the map so that the shard lock is not held while validating
        let window = self
            .window(session_id)
            .ok_or(RegistryError::UnknownSession { session_id })?;
        Ok(window.check(their_counter)?)
    }

    /// Counters of sessions we know nothing about are always rejected.
    pub fn validate(&self, session_id: u32, their_counter: u64) -> bool {
        self.check(session_id, their_counter).is_ok()
    }

    /// Sessions whose counter space ran out and which now have to be rekeyed.
    pub fn exhausted_sessions(&self) -> Vec<u32> {
        let mut exhausted: Vec<_> = self
            .windows
            .iter()
            .filter(|entry| entry.value().is_exhausted())
            .map(|entry| *entry.key())
            .collect();
        exhausted.sort_unstable();
        exhausted
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for ReplayWindowRegistry {
    fn default() -> Self {
        ReplayWindowRegistry {
            config: ReplayWindowConfig::default(),
            windows: DashMap::new(),
        }
    }
}

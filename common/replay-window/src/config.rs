// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{DEFAULT_WINDOW_BITS, MAX_WINDOW_BITS, MIN_WINDOW_BITS};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayWindowConfig {
    /// Total size of the replay bitmap in bits. Must be a power of two.
    /// The window accepts counters up to `window_bits - 64` behind the highest one received.
    /// default: 2048
    pub window_bits: usize,
}

impl Default for ReplayWindowConfig {
    fn default() -> Self {
        ReplayWindowConfig {
            window_bits: DEFAULT_WINDOW_BITS,
        }
    }
}

impl ReplayWindowConfig {
    pub fn new(window_bits: usize) -> Result<Self, ConfigError> {
        let config = ReplayWindowConfig { window_bits };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bits = self.window_bits;
        if !bits.is_power_of_two() || !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&bits) {
            return Err(ConfigError::InvalidWindowSize { bits });
        }
        Ok(())
    }

    pub fn read_from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileReadFailure {
                path: path.to_path_buf(),
                source,
            })?;

        let config: ReplayWindowConfig =
            toml::from_str(&content).map_err(|source| ConfigError::MalformedConfig {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        assert!(ReplayWindowConfig::default().validate().is_ok());
    }

    #[test]
    fn window_size_must_be_a_bounded_power_of_two() {
        for bits in [0, 64, 100, 3000, MAX_WINDOW_BITS * 2] {
            assert!(matches!(
                ReplayWindowConfig::new(bits),
                Err(ConfigError::InvalidWindowSize { bits: b }) if b == bits
            ));
        }
        for bits in [MIN_WINDOW_BITS, 1024, 4096, MAX_WINDOW_BITS] {
            assert!(ReplayWindowConfig::new(bits).is_ok());
        }
    }

    #[test]
    fn loading_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "window_bits = 4096").unwrap();

        let config = ReplayWindowConfig::read_from_toml_file(file.path()).unwrap();
        assert_eq!(config.window_bits, 4096);
    }

    #[test]
    fn empty_toml_falls_back_to_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ReplayWindowConfig::read_from_toml_file(file.path()).unwrap();
        assert_eq!(config, ReplayWindowConfig::default());
    }

    #[test]
    fn bad_toml_files_are_rejected() {
        let mut unknown = tempfile::NamedTempFile::new().unwrap();
        writeln!(unknown, "window_size = 4096").unwrap();
        assert!(matches!(
            ReplayWindowConfig::read_from_toml_file(unknown.path()),
            Err(ConfigError::MalformedConfig { .. })
        ));

        let mut invalid = tempfile::NamedTempFile::new().unwrap();
        writeln!(invalid, "window_bits = 1000").unwrap();
        assert!(matches!(
            ReplayWindowConfig::read_from_toml_file(invalid.path()),
            Err(ConfigError::InvalidWindowSize { bits: 1000 })
        ));

        assert!(matches!(
            ReplayWindowConfig::read_from_toml_file("/this/path/does/not/exist.toml"),
            Err(ConfigError::ConfigFileReadFailure { .. })
        ));
    }
}

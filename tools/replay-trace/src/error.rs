// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use nym_replay_window::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum TraceError {
    #[error("failed to open trace file '{}': {source}", .path.display())]
    TraceFileOpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to process trace csv: {source}")]
    CsvFailure {
        #[from]
        source: csv::Error,
    },

    #[error("failed to write trace output: {source}")]
    OutputFailure {
        #[from]
        source: io::Error,
    },

    #[error("failed to serialise the trace report: {source}")]
    ReportSerialisationFailure {
        #[from]
        source: serde_json::Error,
    },

    #[error("line {line}: '{value}' is not a valid packet counter")]
    MalformedCounter { line: u64, value: String },

    #[error("line {line}: '{value}' is not a valid drop flag. expected either '0' or '1'")]
    MalformedDropFlag { line: u64, value: String },

    #[error("line {line}: expected at most 2 fields, got {fields}")]
    TooManyFields { line: u64, fields: usize },

    #[error(transparent)]
    InvalidWindowConfig(#[from] ConfigError),

    #[error("{count} out of {total} counters did not match the expected decision")]
    DecisionMismatch { count: usize, total: usize },
}

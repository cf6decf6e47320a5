// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::TraceError;
use crate::trace::{read_records, replay, write_decisions, TraceReport, TraceRecord};
use clap::{Parser, ValueEnum};
use nym_replay_window::{ReplayWindow, ReplayWindowConfig};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// `counter,drop` per input line
    #[default]
    Text,

    /// A single summary document
    Json,
}

/// Feed a recorded sequence of packet counters through a replay window
/// and print the accept/drop decision taken for each of them.
#[derive(Parser, Debug)]
#[command(author = "Nymtech", version)]
pub(crate) struct Cli {
    /// Path to the trace file with one `counter[,expected_drop]` entry per line.
    /// If not provided, the trace is read from stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Size of the replay bitmap in bits. Must be a power of two.
    /// default: 2048
    #[arg(long, conflicts_with = "config")]
    window_bits: Option<usize>,

    /// Path to a TOML file holding the replay window configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

impl Cli {
    fn window_config(&self) -> Result<ReplayWindowConfig, TraceError> {
        if let Some(path) = &self.config {
            debug!("loading replay window config from {}", path.display());
            return Ok(ReplayWindowConfig::read_from_toml_file(path)?);
        }
        match self.window_bits {
            Some(bits) => Ok(ReplayWindowConfig::new(bits)?),
            None => Ok(ReplayWindowConfig::default()),
        }
    }

    fn read_trace(&self) -> Result<Vec<TraceRecord>, TraceError> {
        match &self.input {
            Some(path) => {
                let file = File::open(path).map_err(|source| TraceError::TraceFileOpenFailure {
                    path: path.clone(),
                    source,
                })?;
                read_records(BufReader::new(file))
            }
            None => read_records(io::stdin().lock()),
        }
    }

    pub(crate) fn execute(self) -> Result<(), TraceError> {
        let config = self.window_config()?;
        let window = ReplayWindow::with_config(&config)?;
        let records = self.read_trace()?;

        info!(
            "replaying {} counters through a {}-bit window",
            records.len(),
            config.window_bits
        );
        let decisions = replay(&window, &records);
        let report = TraceReport::new(&window, &decisions);

        let stdout = io::stdout();
        match self.output {
            OutputFormat::Text => write_decisions(stdout.lock(), &decisions)?,
            OutputFormat::Json => {
                let mut out = stdout.lock();
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            }
        }

        info!(
            accepted = report.stats.accepted,
            rejected = report.stats.rejected(),
            exhausted = report.exhausted,
            "trace replay complete"
        );

        if !report.mismatches.is_empty() {
            return Err(TraceError::DecisionMismatch {
                count: report.mismatches.len(),
                total: report.checked,
            });
        }
        Ok(())
    }
}

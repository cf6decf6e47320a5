// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! Trace format: one packet counter per line, optionally followed by the decision the
//! recording side took for it (`counter[,drop]`, drop being `0` or `1`).
//! Blank lines and lines starting with `#` are skipped.

use crate::error::TraceError;
use nym_replay_window::{ReplayStatsSnapshot, ReplayWindow};
use serde::Serialize;
use std::io;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TraceRecord {
    pub(crate) line: u64,
    pub(crate) counter: u64,
    pub(crate) expected_drop: Option<bool>,
}

impl TraceRecord {
    fn parse(record: &csv::StringRecord, line: u64) -> Result<Self, TraceError> {
        if record.len() > 2 {
            return Err(TraceError::TooManyFields {
                line,
                fields: record.len(),
            });
        }

        let raw_counter = record.get(0).unwrap_or_default();
        let counter = raw_counter
            .parse()
            .map_err(|_| TraceError::MalformedCounter {
                line,
                value: raw_counter.to_string(),
            })?;

        let expected_drop = match record.get(1) {
            None | Some("") => None,
            Some("0") => Some(false),
            Some("1") => Some(true),
            Some(other) => {
                return Err(TraceError::MalformedDropFlag {
                    line,
                    value: other.to_string(),
                })
            }
        };

        Ok(TraceRecord {
            line,
            counter,
            expected_drop,
        })
    }
}

pub(crate) fn read_records<R: io::Read>(reader: R) -> Result<Vec<TraceRecord>, TraceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        records.push(TraceRecord::parse(&record, line)?);
    }
    Ok(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct Decision {
    pub(crate) line: u64,
    pub(crate) counter: u64,
    pub(crate) drop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expected_drop: Option<bool>,
}

impl Decision {
    pub(crate) fn is_mismatch(&self) -> bool {
        self.expected_drop.is_some_and(|expected| expected != self.drop)
    }
}

/// Feed every record through the window, in order.
pub(crate) fn replay(window: &ReplayWindow, records: &[TraceRecord]) -> Vec<Decision> {
    records
        .iter()
        .map(|record| {
            let decision = Decision {
                line: record.line,
                counter: record.counter,
                drop: !window.validate(record.counter),
                expected_drop: record.expected_drop,
            };
            if decision.is_mismatch() {
                warn!(
                    line = record.line,
                    counter = record.counter,
                    drop = decision.drop,
                    "decision differs from the recorded one"
                );
            }
            decision
        })
        .collect()
}

pub(crate) fn write_decisions<W: io::Write>(
    writer: W,
    decisions: &[Decision],
) -> Result<(), TraceError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for decision in decisions {
        writer.write_record([
            decision.counter.to_string(),
            u8::from(decision.drop).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub(crate) struct TraceReport {
    pub(crate) window_bits: usize,
    pub(crate) window_size: u64,
    pub(crate) highest_accepted: Option<u64>,
    pub(crate) exhausted: bool,
    pub(crate) stats: ReplayStatsSnapshot,
    pub(crate) checked: usize,
    pub(crate) mismatches: Vec<Decision>,
}

impl TraceReport {
    pub(crate) fn new(window: &ReplayWindow, decisions: &[Decision]) -> Self {
        TraceReport {
            window_bits: window.window_bits(),
            window_size: window.window_size(),
            highest_accepted: window.highest_accepted(),
            exhausted: window.is_exhausted(),
            stats: window.stats(),
            checked: decisions
                .iter()
                .filter(|decision| decision.expected_drop.is_some())
                .count(),
            mismatches: decisions
                .iter()
                .filter(|decision| decision.is_mismatch())
                .copied()
                .collect(),
        }
    }
}

// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::dbg_macro)]

pub(crate) mod cli;
pub(crate) mod error;
pub(crate) mod logging;
pub(crate) mod trace;

fn main() -> anyhow::Result<()> {
    use clap::Parser;

    logging::setup_tracing_logger();
    let args = cli::Cli::parse();

    Ok(args.execute()?)
}

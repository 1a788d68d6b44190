// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `aai-walk`: developer CLI over an AAI graph document.
//!
//! Loads a JSON [`GraphDocument`](aai_graph::GraphDocument), runs one
//! traversal command and prints the result as JSON.

pub mod cli;
pub mod commands;
pub mod settings;

use std::io::Write;

use anyhow::Result;
use clap::Parser;

pub use cli::{Cli, Command};
pub use commands::run;

/// Parses the process arguments and runs the command against `out`.
pub fn entrypoint(out: &mut dyn Write) -> Result<()> {
    run(Cli::parse(), out)
}

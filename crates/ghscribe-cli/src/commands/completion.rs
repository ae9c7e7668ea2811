// SPDX-License-Identifier: Apache-2.0

//! Shell completion generation.

use std::io::Write;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;

/// Writes the completion script for `shell` to stdout.
pub fn run(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = std::io::stdout();
    generate(shell, &mut cmd, name, &mut stdout);
    stdout.flush()?;
    Ok(())
}

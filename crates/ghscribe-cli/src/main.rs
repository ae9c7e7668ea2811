// SPDX-License-Identifier: Apache-2.0

//! ghscribe - README issue overviews and AI pull request reviews for CI.
//!
//! Exit codes: 0 on success, 1 on any error, 130 when interrupted.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use console::style;

use crate::cli::{Cli, OutputContext};

/// Exit code for a run cut short by Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let ctx = OutputContext::from_cli(cli.quiet);

    // Dropping the command future on Ctrl-C kills a running MCP server.
    tokio::select! {
        result = commands::run(cli.command, ctx, cli.config.as_deref()) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{} {}", style("Error:").red().bold(), errors::format_error(&e));
                eprintln!("\n{e:?}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("{}", style("Interrupted").yellow());
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

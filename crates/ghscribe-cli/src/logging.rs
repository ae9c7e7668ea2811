// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the ghscribe CLI.
//!
//! Uses `tracing` with `tracing-subscriber`, writing to stderr so that
//! stdout stays clean for `--dry-run` and JSON output. `RUST_LOG` overrides
//! the defaults below.
//!
//! ```bash
//! RUST_LOG=ghscribe=debug,rmcp=debug ghscribe readme
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter directives for the given verbosity flags.
fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "ghscribe=debug,octocrab=error,reqwest=error,rmcp=info"
    } else if quiet {
        "ghscribe=warn,octocrab=error,reqwest=error,rmcp=error"
    } else {
        "ghscribe=info,octocrab=error,reqwest=error,rmcp=warn"
    }
}

/// Initialize the logging subsystem.
pub fn init_logging(verbose: bool, quiet: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose, quiet)))
        .expect("valid default filter directives");

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        for (verbose, quiet) in [(false, false), (true, false), (false, true)] {
            assert!(EnvFilter::try_new(default_filter(verbose, quiet)).is_ok());
        }
    }

    #[test]
    fn test_verbose_wins_over_quiet() {
        assert!(default_filter(true, true).starts_with("ghscribe=debug"));
    }
}

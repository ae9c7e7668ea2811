// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for ghscribe.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use ghscribe_core::IssueBackend;

/// Extended help text for the completion subcommand.
const COMPLETION_HELP: &str = r#"EXAMPLES

  bash
    Add to ~/.bashrc:
      eval "$(ghscribe completion bash)"

  zsh
    ghscribe completion zsh > ~/.zsh/completions/_ghscribe

  fish
    ghscribe completion fish > ~/.config/fish/completions/ghscribe.fish
"#;

/// Output format for the `stats` command.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Text,
    /// JSON for scripts
    Json,
}

/// Issue backend selectable on the command line.
#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// GitHub MCP server run as a subprocess
    Mcp,
    /// GitHub REST API
    Rest,
}

impl From<BackendArg> for IssueBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Mcp => IssueBackend::Mcp,
            BackendArg::Rest => IssueBackend::Rest,
        }
    }
}

/// Global output configuration passed to commands.
#[derive(Clone)]
pub struct OutputContext {
    /// Suppress non-essential output (spinners, summaries)
    pub quiet: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(quiet: bool) -> Self {
        Self {
            quiet,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet
    }
}

/// ghscribe - README issue overviews and AI pull request reviews for CI.
///
/// Configuration comes from `ghscribe.toml` (or `--config`) and `GHSCRIBE_*`
/// variables; credentials and the repository come from the CI environment
/// (`GITHUB_TOKEN`, `OPENAI_API_KEY`, `GITHUB_REPOSITORY`, `PR_NUMBER`).
#[derive(Parser)]
#[command(name = "ghscribe")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to a config file (default: ./ghscribe.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress non-essential output (spinners, summaries)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug-level logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Where issues are read from.
#[derive(Args, Clone)]
pub struct IssueSourceArgs {
    /// Issue backend (overrides `issues.backend`)
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Read issues from a JSON file instead of the tracker
    #[arg(long, value_name = "FILE", conflicts_with = "backend")]
    pub issues_file: Option<PathBuf>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Regenerate the issues overview section of the README
    Readme {
        /// Document to update (overrides `readme.path`)
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,

        #[command(flatten)]
        source: IssueSourceArgs,

        /// Print the section instead of writing the document
        #[arg(long)]
        dry_run: bool,
    },

    /// Show issue counts per category
    Stats {
        #[command(flatten)]
        source: IssueSourceArgs,

        /// Output format
        #[arg(long, short = 'o', default_value = "text", value_enum)]
        output: OutputFormat,
    },

    /// Post an AI code review comment on the current pull request
    Review {
        /// Pull request number (overrides `PR_NUMBER`)
        #[arg(long)]
        pr: Option<u64>,

        /// Ref to diff against (overrides `GITHUB_BASE_REF` and `review.base_ref`)
        #[arg(long, value_name = "REF")]
        base: Option<String>,

        /// Print the review instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completion scripts
    #[command(after_long_help = COMPLETION_HELP)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_issues_file_conflicts_with_backend() {
        let result = Cli::try_parse_from([
            "ghscribe",
            "readme",
            "--backend",
            "rest",
            "--issues-file",
            "issues.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ghscribe", "stats", "-v", "--output", "json"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Stats {
                output: OutputFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_backend_arg_maps_to_core_backend() {
        assert_eq!(IssueBackend::from(BackendArg::Mcp), IssueBackend::Mcp);
        assert_eq!(IssueBackend::from(BackendArg::Rest), IssueBackend::Rest);
    }
}

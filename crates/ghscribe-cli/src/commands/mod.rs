// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the ghscribe CLI.

pub mod completion;
pub mod readme;
pub mod review;
pub mod stats;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ghscribe_core::{
    AppConfig, InMemoryIssueSource, IssueBackend, IssueSource, Settings, build_issue_source,
    load_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::cli::{Commands, IssueSourceArgs, OutputContext};

/// Creates a styled spinner (only if interactive).
fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if ctx.is_interactive() {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        s.set_message(message.to_string());
        s.enable_steady_tick(Duration::from_millis(100));
        Some(s)
    } else {
        None
    }
}

/// Clears a spinner if one is running.
fn finish_spinner(spinner: Option<ProgressBar>) {
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
}

/// Opens the issue source selected by the command-line flags.
///
/// `--issues-file` wins; otherwise `--backend` or `issues.backend` decides.
async fn open_issue_source(
    args: &IssueSourceArgs,
    settings: &Settings,
    config: &AppConfig,
) -> Result<Box<dyn IssueSource>> {
    if let Some(path) = &args.issues_file {
        debug!(path = %path.display(), "Reading issues from file");
        return Ok(Box::new(InMemoryIssueSource::from_json_file(path)?));
    }

    let backend = args.backend.map_or(config.issues.backend, IssueBackend::from);
    build_issue_source(backend, settings, config).await
}

/// Loads configuration and the CI run context.
fn load_context(config_path: Option<&Path>) -> Result<(AppConfig, Settings)> {
    let config = load_config(config_path).context("Failed to load configuration")?;
    let settings = Settings::from_process_env()?;
    debug!("Configuration loaded successfully");
    Ok((config, settings))
}

/// Dispatch to the appropriate command handler.
pub async fn run(command: Commands, ctx: OutputContext, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Completion { shell } => completion::run(shell),

        Commands::Readme {
            path,
            source,
            dry_run,
        } => {
            let (mut config, settings) = load_context(config_path)?;
            if let Some(path) = path {
                config.readme.path = path;
            }
            readme::run(&source, dry_run, &ctx, &config, &settings).await
        }

        Commands::Stats { source, output } => {
            let (config, settings) = load_context(config_path)?;
            stats::run(&source, output, &ctx, &config, &settings).await
        }

        Commands::Review { pr, base, dry_run } => {
            let (config, settings) = load_context(config_path)?;
            let args = review::ReviewArgs { pr, base, dry_run };
            review::run(args, &ctx, &config, &settings).await
        }
    }
}

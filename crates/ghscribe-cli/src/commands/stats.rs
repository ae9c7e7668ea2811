// SPDX-License-Identifier: Apache-2.0

//! `ghscribe stats`: print issue counts per category.

use anyhow::{Context, Result};
use ghscribe_core::{AppConfig, Buckets, Settings, collect_issues};

use super::{finish_spinner, maybe_spinner, open_issue_source};
use crate::cli::{IssueSourceArgs, OutputContext, OutputFormat};
use crate::output::{self, StatsReport};

/// Fetches issues and prints their category counts.
pub async fn run(
    source_args: &IssueSourceArgs,
    format: OutputFormat,
    ctx: &OutputContext,
    config: &AppConfig,
    settings: &Settings,
) -> Result<()> {
    let repo = settings.require_repo()?.clone();
    let source = open_issue_source(source_args, settings, config).await?;

    let spinner = maybe_spinner(ctx, &format!("Fetching issues for {repo}..."));
    let batch = collect_issues(source, &repo, &config.issues).await;
    finish_spinner(spinner);
    let batch = batch?;

    let report = StatsReport {
        repository: repo.to_string(),
        counts: Buckets::from_issues(&batch.issues).counts(),
        pull_requests: batch.pull_request_count(),
        skipped_records: batch.failures.len(),
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize stats")?;
            println!("{json}");
        }
        OutputFormat::Text => output::print_stats(&report, ctx),
    }

    Ok(())
}

// SPDX-License-Identifier: Apache-2.0

//! `ghscribe readme`: regenerate the issues overview section.

use anyhow::Result;
use chrono::Utc;
use ghscribe_core::{AppConfig, ReadmeOutcome, Settings, render_readme_section, update_readme};
use tracing::info;

use super::{finish_spinner, maybe_spinner, open_issue_source};
use crate::cli::{IssueSourceArgs, OutputContext};
use crate::output;

/// Runs the README update, or prints the section with `dry_run`.
pub async fn run(
    source_args: &IssueSourceArgs,
    dry_run: bool,
    ctx: &OutputContext,
    config: &AppConfig,
    settings: &Settings,
) -> Result<()> {
    // Fail on a missing repository before starting any tracker process.
    let repo = settings.require_repo()?.clone();
    let source = open_issue_source(source_args, settings, config).await?;

    let spinner = maybe_spinner(ctx, &format!("Fetching issues for {repo}..."));
    let now = Utc::now();

    if dry_run {
        let section = render_readme_section(source, &repo, config, now).await;
        finish_spinner(spinner);
        match section? {
            Some(section) => print!("{}", section.markdown),
            None => output::print_readme_outcome(&ReadmeOutcome::NoIssues, ctx),
        }
        return Ok(());
    }

    let outcome = update_readme(source, settings, config, now).await;
    finish_spinner(spinner);
    let outcome = outcome?;

    info!(?outcome, "README run finished");
    output::print_readme_outcome(&outcome, ctx);
    Ok(())
}

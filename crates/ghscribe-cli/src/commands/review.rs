// SPDX-License-Identifier: Apache-2.0

//! `ghscribe review`: AI code review comment on a pull request.

use std::path::Path;

use anyhow::Result;
use ghscribe_core::{
    AppConfig, CommentTarget, CredentialProvider, Settings, completion_client, github_client,
    review_pull_request,
};
use tracing::debug;

use super::{finish_spinner, maybe_spinner};
use crate::cli::OutputContext;
use crate::output;

/// Flags of the `review` command.
pub struct ReviewArgs {
    /// Pull request number override.
    pub pr: Option<u64>,
    /// Base ref override.
    pub base: Option<String>,
    /// Print instead of posting.
    pub dry_run: bool,
}

/// Generates the review and posts it unless `dry_run` is set.
///
/// All required settings are checked before git or any network call runs.
pub async fn run(
    args: ReviewArgs,
    ctx: &OutputContext,
    config: &AppConfig,
    settings: &Settings,
) -> Result<()> {
    let credentials: &dyn CredentialProvider = settings;
    let provider = completion_client(credentials, &config.ai)?;

    let post_to = if args.dry_run {
        None
    } else {
        let repo = settings.require_repo()?.clone();
        let number = match args.pr {
            Some(pr) => pr,
            None => settings.require_pr_number()?,
        };
        let client = github_client(credentials, &config.github)?;
        Some((client, repo, number))
    };

    let base_ref = args
        .base
        .unwrap_or_else(|| settings.review_base_ref(&config.review));
    debug!(base_ref = %base_ref, "Reviewing against base");

    let target = post_to.as_ref().map(|(client, repo, number)| CommentTarget {
        client,
        repo,
        number: *number,
    });

    let spinner = maybe_spinner(ctx, "Reviewing changes...");
    let outcome = review_pull_request(
        &provider,
        Path::new("."),
        &base_ref,
        config.review.max_diff_chars,
        target,
    )
    .await;
    finish_spinner(spinner);

    output::print_review_outcome(&outcome?, ctx, args.dry_run);
    Ok(())
}

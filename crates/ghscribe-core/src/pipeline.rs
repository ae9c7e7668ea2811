// SPDX-License-Identifier: Apache-2.0

//! High-level operations used by the CLI.
//!
//! Each function takes explicit configuration values and collaborators, so
//! the same paths run against a live tracker or an in-memory fixture.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use tracing::{info, instrument, warn};

use crate::ai::{CompletionProvider, OpenAiClient};
use crate::auth::CredentialProvider;
use crate::categorize::{Buckets, CategoryCounts};
use crate::config::{AiConfig, AppConfig, GitHubConfig, IssueBackend, IssuesConfig, Settings};
use crate::document::update_document_file;
use crate::github::comments::post_comment;
use crate::github::{RepoRef, build_client};
use crate::issues::mcp::McpIssueSource;
use crate::issues::rest::RestIssueSource;
use crate::issues::{IssueBatch, IssueSource, fetch_all_issues, with_issue_source};
use crate::render::SectionRenderer;
use crate::review::{build_review_messages, format_review_comment, git_diff, truncate_diff};

/// Builds an authenticated GitHub client from the provider's token.
///
/// # Errors
///
/// Fails with `NotAuthenticated` when no GitHub token is available.
pub fn github_client(
    credentials: &dyn CredentialProvider,
    config: &GitHubConfig,
) -> Result<Octocrab> {
    let token = credentials.require_github_token()?;
    build_client(&token, config.api_timeout_seconds)
}

/// Builds the completion client from the provider's API key.
///
/// # Errors
///
/// Fails with a configuration error when no API key is available.
pub fn completion_client(
    credentials: &dyn CredentialProvider,
    config: &AiConfig,
) -> Result<OpenAiClient> {
    let api_key = credentials.require_completion_api_key()?;
    OpenAiClient::new(api_key, config)
}

/// Creates the configured issue source.
///
/// # Errors
///
/// Fails with `NotAuthenticated` when no GitHub token is available, or when
/// the source cannot be started.
pub async fn build_issue_source(
    backend: IssueBackend,
    credentials: &dyn CredentialProvider,
    config: &AppConfig,
) -> Result<Box<dyn IssueSource>> {
    let source: Box<dyn IssueSource> = match backend {
        IssueBackend::Mcp => {
            let token = credentials.require_github_token()?;
            Box::new(McpIssueSource::spawn(&config.issues, &token).await?)
        }
        IssueBackend::Rest => Box::new(RestIssueSource::new(github_client(
            credentials,
            &config.github,
        )?)),
    };

    info!(backend = %backend, "Issue source ready");
    Ok(source)
}

/// Fetches and normalizes every issue, then shuts the source down.
///
/// # Errors
///
/// Returns the first fetch error; malformed records are reported in the
/// batch instead.
#[instrument(skip(source, config), fields(repo = %repo))]
pub async fn collect_issues(
    source: Box<dyn IssueSource>,
    repo: &RepoRef,
    config: &IssuesConfig,
) -> Result<IssueBatch> {
    let records = with_issue_source(source, async |s| {
        fetch_all_issues(s, repo, config.page_size, config.max_pages).await
    })
    .await?;

    Ok(IssueBatch::from_records(&records, repo))
}

/// A rendered issues overview.
#[derive(Debug, Clone)]
pub struct RenderedSection {
    /// Markdown fragment, starting with the section marker.
    pub markdown: String,
    /// Bucket sizes behind the fragment.
    pub counts: CategoryCounts,
    /// Pull requests left out of the overview.
    pub pull_requests: usize,
    /// Records skipped as malformed.
    pub failures: usize,
}

/// Fetches, categorizes and renders without touching the document.
///
/// Returns `None` when no issue remains after excluding pull requests.
///
/// # Errors
///
/// Returns an error if fetching fails.
pub async fn render_readme_section(
    source: Box<dyn IssueSource>,
    repo: &RepoRef,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<Option<RenderedSection>> {
    let batch = collect_issues(source, repo, &config.issues).await?;
    let buckets = Buckets::from_issues(&batch.issues);

    if buckets.is_empty() {
        info!(
            fetched = batch.issues.len(),
            "No issues to report, nothing to render"
        );
        return Ok(None);
    }

    Ok(Some(RenderedSection {
        markdown: SectionRenderer::new(repo, now).render(&buckets),
        counts: buckets.counts(),
        pull_requests: batch.pull_request_count(),
        failures: batch.failures.len(),
    }))
}

/// Result of a README update run.
#[derive(Debug, Clone)]
pub enum ReadmeOutcome {
    /// No issues were found; the document was left untouched.
    NoIssues,
    /// The document was rewritten.
    Updated {
        /// Document that was written.
        path: PathBuf,
        /// Bucket sizes behind the new section.
        counts: CategoryCounts,
        /// Pull requests left out of the overview.
        pull_requests: usize,
        /// Records skipped as malformed.
        failures: usize,
    },
}

/// Regenerates the issues overview in the configured document.
///
/// # Errors
///
/// Fails before fetching when no repository is configured; otherwise
/// returns fetch or document write errors.
pub async fn update_readme(
    source: Box<dyn IssueSource>,
    settings: &Settings,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<ReadmeOutcome> {
    let repo = match settings.require_repo() {
        Ok(repo) => repo,
        Err(e) => {
            if let Err(shutdown) = source.shutdown().await {
                warn!(error = %shutdown, "Issue source shutdown failed");
            }
            return Err(e.into());
        }
    };

    let Some(section) = render_readme_section(source, repo, config, now).await? else {
        return Ok(ReadmeOutcome::NoIssues);
    };

    let path = config.readme.path.clone();
    update_document_file(&path, &section.markdown, repo)?;

    Ok(ReadmeOutcome::Updated {
        path,
        counts: section.counts,
        pull_requests: section.pull_requests,
        failures: section.failures,
    })
}

/// Where a review comment goes.
#[derive(Debug, Clone, Copy)]
pub struct CommentTarget<'a> {
    /// Authenticated GitHub client.
    pub client: &'a Octocrab,
    /// Repository of the pull request.
    pub repo: &'a RepoRef,
    /// Pull request number.
    pub number: u64,
}

/// Result of a review run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The diff was empty; no completion call was made.
    EmptyDiff,
    /// A review was generated.
    Reviewed {
        /// Comment body.
        comment: String,
        /// URL of the posted comment; `None` when not posted.
        comment_url: Option<String>,
    },
}

/// Asks `provider` to review `diff` and formats the comment body.
///
/// Returns `None` for an empty diff.
///
/// # Errors
///
/// Returns the completion error; the call is not retried.
pub async fn review_diff(
    provider: &dyn CompletionProvider,
    diff: &str,
    max_diff_chars: usize,
) -> Result<Option<String>> {
    if diff.trim().is_empty() {
        info!("Diff is empty, skipping review");
        return Ok(None);
    }

    let diff = truncate_diff(diff, max_diff_chars);
    let review = provider.complete(&build_review_messages(&diff)).await?;
    Ok(Some(format_review_comment(&review, provider.model())))
}

/// Posts a review comment. Failures are logged and swallowed.
pub async fn publish_review(target: CommentTarget<'_>, body: &str) -> Option<String> {
    match post_comment(target.client, target.repo, target.number, body).await {
        Ok(url) => {
            info!(url = %url, "Review comment posted");
            Some(url)
        }
        Err(e) => {
            warn!(
                error = ?e,
                number = target.number,
                "Failed to post review comment"
            );
            None
        }
    }
}

/// Reviews the current branch against `base_ref` and posts the result.
///
/// With `target` set to `None` the comment is generated but not posted.
///
/// # Errors
///
/// Returns git and completion errors. Posting never fails the run.
#[instrument(skip(provider, target), fields(workdir = %workdir.display()))]
pub async fn review_pull_request(
    provider: &dyn CompletionProvider,
    workdir: &Path,
    base_ref: &str,
    max_diff_chars: usize,
    target: Option<CommentTarget<'_>>,
) -> Result<ReviewOutcome> {
    let diff = git_diff(workdir, base_ref).await?;

    let Some(comment) = review_diff(provider, &diff, max_diff_chars).await? else {
        return Ok(ReviewOutcome::EmptyDiff);
    };

    let comment_url = match target {
        Some(target) => publish_review(target, &comment).await,
        None => None,
    };

    Ok(ReviewOutcome::Reviewed {
        comment,
        comment_url,
    })
}

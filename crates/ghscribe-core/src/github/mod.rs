// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! Provides the repository identifier used throughout a run, client
//! construction, and comment posting.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use octocrab::Octocrab;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};

pub mod comments;

/// Base URL for repository links in rendered documents.
pub const GITHUB_WEB_URL: &str = "https://github.com";

/// An `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoRef {
    /// Creates a repository reference from its parts.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses an `owner/repo` string.
    ///
    /// Validates format: exactly one `/`, non-empty parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!(
                "Invalid owner/repo format.\n\
                 Expected: owner/repo\n\
                 Got: {s}"
            );
        }
        Ok(Self::new(parts[0], parts[1]))
    }

    /// Web URL of the repository.
    #[must_use]
    pub fn html_url(&self) -> String {
        format!("{GITHUB_WEB_URL}/{}/{}", self.owner, self.repo)
    }

    /// Web URL of a single issue.
    #[must_use]
    pub fn issue_url(&self, number: u64) -> String {
        format!("{}/issues/{number}", self.html_url())
    }

    /// Web URL of the issue list filtered by a search query.
    ///
    /// The query is percent-encoded, e.g. `is:issue is:open` becomes
    /// `is%3Aissue%20is%3Aopen`.
    #[must_use]
    pub fn issues_search_url(&self, query: &str) -> String {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC);
        format!("{}/issues?q={encoded}", self.html_url())
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Builds an authenticated Octocrab client.
///
/// # Errors
///
/// Returns an error if the client cannot be constructed.
pub fn build_client(token: &SecretString, timeout_seconds: u64) -> Result<Octocrab> {
    info!("Creating GitHub client");

    let client = Octocrab::builder()
        .personal_token(token.expose_secret().to_string())
        .set_connect_timeout(Some(Duration::from_secs(timeout_seconds)))
        .set_read_timeout(Some(Duration::from_secs(timeout_seconds)))
        .build()
        .context("Failed to build GitHub client")?;

    debug!("Created authenticated GitHub client");
    Ok(client)
}

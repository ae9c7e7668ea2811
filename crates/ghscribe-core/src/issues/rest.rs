// SPDX-License-Identifier: Apache-2.0

//! Issue source backed by the GitHub REST API.

use anyhow::Result;
use async_trait::async_trait;
use backon::Retryable;
use octocrab::Octocrab;
use serde_json::Value;
use tracing::{debug, instrument};

use super::source::{IssueSource, ListQuery};
use crate::error::ScribeError;
use crate::retry::{is_retryable_octocrab, retry_backoff};

/// Lists issues with `GET /repos/{owner}/{repo}/issues`.
///
/// Raw JSON records are returned so that normalization stays in one place.
#[derive(Debug)]
pub struct RestIssueSource {
    client: Octocrab,
}

impl RestIssueSource {
    /// Creates a source using an authenticated client.
    #[must_use]
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IssueSource for RestIssueSource {
    fn name(&self) -> &str {
        "rest"
    }

    #[instrument(skip(self), fields(owner = %query.owner, repo = %query.repo, page = query.page))]
    async fn list_page(&self, query: &ListQuery) -> Result<Vec<Value>> {
        let route = format!("/repos/{}/{}/issues", query.owner, query.repo);

        let items: Vec<Value> = (|| async {
            self.client
                .get::<Vec<Value>, _, _>(&route, Some(query))
                .await
        })
        .retry(retry_backoff())
        .when(is_retryable_octocrab)
        .notify(|err, dur| {
            tracing::warn!(
                error = %err,
                retry_after = ?dur,
                "Retrying issue page fetch"
            );
        })
        .await
        .map_err(ScribeError::from)?;

        debug!(count = items.len(), "Fetched REST issue page");
        Ok(items)
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Issue source abstraction and the paginated fetcher.
//!
//! An [`IssueSource`] answers one list request at a time. The fetcher walks
//! pages in increasing order until a short or empty page signals the end.
//! Every source has an explicit teardown; [`with_issue_source`] guarantees it
//! runs on success and on error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::error::ScribeError;
use crate::github::RepoRef;

/// Parameters of a single list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    /// Repository owner.
    #[serde(skip)]
    pub owner: String,
    /// Repository name.
    #[serde(skip)]
    pub repo: String,
    /// State filter (`all` to include open and closed).
    pub state: &'static str,
    /// Sort key.
    pub sort: &'static str,
    /// Sort direction.
    pub direction: &'static str,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u8,
}

impl ListQuery {
    /// All issues, most recently updated first.
    #[must_use]
    pub fn all_by_updated(repo: &RepoRef, page: u32, per_page: u8) -> Self {
        Self {
            owner: repo.owner.clone(),
            repo: repo.repo.clone(),
            state: "all",
            sort: "updated",
            direction: "desc",
            page,
            per_page,
        }
    }

    /// The query as tool-call arguments, owner and repo included.
    #[must_use]
    pub fn to_arguments(&self) -> Map<String, Value> {
        let mut args = Map::new();
        args.insert("owner".to_string(), json!(self.owner));
        args.insert("repo".to_string(), json!(self.repo));
        args.insert("state".to_string(), json!(self.state));
        args.insert("sort".to_string(), json!(self.sort));
        args.insert("direction".to_string(), json!(self.direction));
        args.insert("page".to_string(), json!(self.page));
        args.insert("per_page".to_string(), json!(self.per_page));
        args
    }
}

/// A tracker that lists issue records page by page.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Short name used in logs and errors (e.g. `mcp`, `rest`).
    fn name(&self) -> &str;

    /// Fetches one page of raw issue records.
    async fn list_page(&self, query: &ListQuery) -> Result<Vec<Value>>;

    /// Releases the source (closes connections, stops subprocesses).
    async fn shutdown(self: Box<Self>) -> Result<()>;
}

/// Pulls the record list out of a tracker response.
///
/// Accepts a bare array or an object wrapping the array under `items` or
/// `issues`. Returns `None` for any other shape.
#[must_use]
pub fn records_from_json(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut obj) => match obj.remove("items").or_else(|| obj.remove("issues")) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Runs `run` against `source`, then shuts the source down.
///
/// Teardown happens whether `run` succeeds or fails. A teardown failure is
/// logged and does not replace the result of `run`.
pub async fn with_issue_source<T>(
    source: Box<dyn IssueSource>,
    run: impl AsyncFnOnce(&dyn IssueSource) -> Result<T>,
) -> Result<T> {
    let result = run(source.as_ref()).await;

    let name = source.name().to_string();
    if let Err(e) = source.shutdown().await {
        warn!(source = %name, error = %e, "Issue source shutdown failed");
    } else {
        debug!(source = %name, "Issue source shut down");
    }

    result
}

/// Fetches every issue record of a repository, open and closed.
///
/// Pages are requested in order starting at 1. Listing stops at the first
/// page holding fewer than `page_size` records. After `max_pages` full pages
/// one more page is requested; if it is not empty the listing is treated as
/// runaway and fails with no partial result.
///
/// # Errors
///
/// Returns the first transport error, or `ScribeError::PaginationLimit`.
#[instrument(skip(source), fields(source = source.name(), repo = %repo))]
pub async fn fetch_all_issues(
    source: &dyn IssueSource,
    repo: &RepoRef,
    page_size: u8,
    max_pages: u32,
) -> Result<Vec<Value>> {
    let page_size = page_size.max(1);
    let max_pages = max_pages.max(1);
    let mut records = Vec::new();

    for page in 1..=max_pages {
        let query = ListQuery::all_by_updated(repo, page, page_size);
        let items = source
            .list_page(&query)
            .await
            .with_context(|| format!("Failed to fetch issue page {page} from {repo}"))?;

        let count = items.len();
        debug!(page, count, "Fetched issue page");
        records.extend(items);

        if count < usize::from(page_size) {
            info!(total = records.len(), pages = page, "Fetched all issues");
            return Ok(records);
        }
    }

    let next = max_pages.saturating_add(1);
    let query = ListQuery::all_by_updated(repo, next, page_size);
    let overflow = source
        .list_page(&query)
        .await
        .with_context(|| format!("Failed to fetch issue page {next} from {repo}"))?;
    if overflow.is_empty() {
        info!(total = records.len(), pages = max_pages, "Fetched all issues");
        return Ok(records);
    }

    Err(ScribeError::PaginationLimit { max_pages }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::InMemoryIssueSource;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn records(n: u64) -> Vec<Value> {
        (1..=n)
            .map(|i| json!({"number": i, "state": "open", "title": format!("Issue {i}")}))
            .collect()
    }

    fn repo() -> RepoRef {
        RepoRef::new("octocat", "hello")
    }

    #[test]
    fn test_query_arguments() {
        let query = ListQuery::all_by_updated(&repo(), 2, 50);
        let args = query.to_arguments();
        assert_eq!(args["owner"], "octocat");
        assert_eq!(args["repo"], "hello");
        assert_eq!(args["state"], "all");
        assert_eq!(args["sort"], "updated");
        assert_eq!(args["direction"], "desc");
        assert_eq!(args["page"], 2);
        assert_eq!(args["per_page"], 50);
    }

    #[test]
    fn test_query_serializes_without_repo() {
        let query = ListQuery::all_by_updated(&repo(), 1, 100);
        let value = serde_json::to_value(&query).unwrap();
        assert!(value.get("owner").is_none());
        assert_eq!(value["per_page"], 100);
    }

    #[test]
    fn test_records_from_json_shapes() {
        assert_eq!(records_from_json(json!([1, 2])).unwrap().len(), 2);
        assert_eq!(
            records_from_json(json!({"items": [{"number": 1}]}))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            records_from_json(json!({"issues": []})).unwrap().len(),
            0
        );
        assert!(records_from_json(json!({"message": "Not Found"})).is_none());
        assert!(records_from_json(json!("text")).is_none());
    }

    #[tokio::test]
    async fn test_fetch_stops_on_short_page() {
        let source = InMemoryIssueSource::new(records(25));
        let all = fetch_all_issues(&source, &repo(), 10, 100).await.unwrap();
        assert_eq!(all.len(), 25);
        assert_eq!(source.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_stops_on_empty_page() {
        let source = InMemoryIssueSource::new(records(20));
        let all = fetch_all_issues(&source, &repo(), 10, 100).await.unwrap();
        assert_eq!(all.len(), 20);
        assert_eq!(source.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_empty_repository() {
        let source = InMemoryIssueSource::new(Vec::new());
        let all = fetch_all_issues(&source, &repo(), 100, 100).await.unwrap();
        assert!(all.is_empty());
        assert_eq!(source.requested_pages(), vec![1]);
    }

    #[tokio::test]
    async fn test_fetch_page_ceiling() {
        let source = InMemoryIssueSource::new(records(50));
        let err = fetch_all_issues(&source, &repo(), 10, 3).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScribeError>(),
            Some(ScribeError::PaginationLimit { max_pages: 3 })
        ));
        assert_eq!(source.requested_pages(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_fetch_exactly_fills_page_ceiling() {
        let source = InMemoryIssueSource::new(records(30));
        let all = fetch_all_issues(&source, &repo(), 10, 3).await.unwrap();
        assert_eq!(all.len(), 30);
        assert_eq!(source.requested_pages(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_fetch_propagates_transport_error() {
        let source = InMemoryIssueSource::new(records(30)).failing_on_page(2);
        let err = fetch_all_issues(&source, &repo(), 10, 100).await.unwrap_err();
        assert!(err.to_string().contains("page 2"));
    }

    /// Source that records whether it was shut down.
    struct TrackedSource {
        inner: InMemoryIssueSource,
        shut_down: Arc<AtomicBool>,
    }

    #[async_trait]
    impl IssueSource for TrackedSource {
        fn name(&self) -> &str {
            "tracked"
        }

        async fn list_page(&self, query: &ListQuery) -> Result<Vec<Value>> {
            self.inner.list_page(query).await
        }

        async fn shutdown(self: Box<Self>) -> Result<()> {
            self.shut_down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_with_issue_source_shuts_down_on_error() {
        let shut_down = Arc::new(AtomicBool::new(false));
        let source = TrackedSource {
            inner: InMemoryIssueSource::new(records(5)).failing_on_page(1),
            shut_down: Arc::clone(&shut_down),
        };

        let result = with_issue_source(Box::new(source), async |s| {
            fetch_all_issues(s, &repo(), 10, 10).await
        })
        .await;

        assert!(result.is_err());
        assert!(shut_down.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_with_issue_source_shuts_down_on_success() {
        let shut_down = Arc::new(AtomicBool::new(false));
        let source = TrackedSource {
            inner: InMemoryIssueSource::new(records(5)),
            shut_down: Arc::clone(&shut_down),
        };

        let all = with_issue_source(Box::new(source), async |s| {
            fetch_all_issues(s, &repo(), 10, 10).await
        })
        .await
        .unwrap();

        assert_eq!(all.len(), 5);
        assert!(shut_down.load(Ordering::SeqCst));
    }
}

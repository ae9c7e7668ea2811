// SPDX-License-Identifier: Apache-2.0

//! In-memory issue source.
//!
//! Serves a fixed record list in pages. Used by tests and by offline runs
//! that read a JSON dump of issues (`--issues-file`).

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::source::{IssueSource, ListQuery, records_from_json};

/// Issue source backed by a record list held in memory.
#[derive(Debug, Default)]
pub struct InMemoryIssueSource {
    records: Vec<Value>,
    requested: Mutex<Vec<u32>>,
    fail_on_page: Option<u32>,
}

impl InMemoryIssueSource {
    /// Creates a source serving `records` in order.
    #[must_use]
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Loads records from a JSON file holding an array of issues
    /// (or an object with an `items`/`issues` array).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has another shape.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read issues file {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("Issues file {} is not valid JSON", path.display()))?;
        let records = records_from_json(value).with_context(|| {
            format!(
                "Issues file {} must contain an array of issues",
                path.display()
            )
        })?;
        Ok(Self::new(records))
    }

    /// Makes the given page fail with a transport-style error.
    #[must_use]
    pub fn failing_on_page(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    /// Pages requested so far, in request order.
    #[must_use]
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested
            .lock()
            .map(|pages| pages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IssueSource for InMemoryIssueSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_page(&self, query: &ListQuery) -> Result<Vec<Value>> {
        if let Ok(mut pages) = self.requested.lock() {
            pages.push(query.page);
        }

        if self.fail_on_page == Some(query.page) {
            anyhow::bail!("simulated transport failure on page {}", query.page);
        }

        let per_page = usize::from(query.per_page);
        let start = (query.page.saturating_sub(1) as usize).saturating_mul(per_page);
        Ok(self
            .records
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::RepoRef;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_pages_slice_records() {
        let source = InMemoryIssueSource::new((1..=5).map(|n| json!({"number": n})).collect());
        let repo = RepoRef::new("o", "r");

        let page2 = source
            .list_page(&ListQuery::all_by_updated(&repo, 2, 2))
            .await
            .unwrap();
        assert_eq!(page2, vec![json!({"number": 3}), json!({"number": 4})]);

        let page4 = source
            .list_page(&ListQuery::all_by_updated(&repo, 4, 2))
            .await
            .unwrap();
        assert!(page4.is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"number": 1, "state": "open"}}]"#).unwrap();

        let source = InMemoryIssueSource::from_json_file(file.path()).unwrap();
        assert_eq!(source.records.len(), 1);
    }

    #[test]
    fn test_from_json_file_rejects_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"message": "Bad credentials"}}"#).unwrap();

        let err = InMemoryIssueSource::from_json_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("must contain an array"));
    }
}

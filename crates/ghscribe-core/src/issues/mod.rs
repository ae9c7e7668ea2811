// SPDX-License-Identifier: Apache-2.0

//! Normalized issue records.
//!
//! Issue trackers hand back loosely shaped JSON: labels may be bare strings
//! or `{ "name": ... }` objects, optional fields may be missing or `null`.
//! [`Issue::from_record`] does all defaulting once, at the boundary, so the
//! categorizer and renderer only ever see a fully populated [`Issue`].

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::github::RepoRef;

pub mod mcp;
pub mod memory;
pub mod rest;
pub mod source;

pub use memory::InMemoryIssueSource;
pub use source::{IssueSource, ListQuery, fetch_all_issues, with_issue_source};

/// Issue state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// Open issue.
    Open,
    /// Closed issue.
    Closed,
}

impl IssueState {
    /// Parses a state string case-insensitively (`open`, `OPEN`, `closed`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Some(IssueState::Open),
            "closed" => Some(IssueState::Closed),
            _ => None,
        }
    }
}

/// A normalized issue (or pull request, see [`Issue::is_pull_request`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
pub struct Issue {
    /// Issue number, unique within the repository.
    pub number: u64,
    /// Issue title.
    #[builder(into)]
    pub title: String,
    /// Open or closed.
    pub state: IssueState,
    /// Label names in tracker order.
    #[builder(default)]
    pub labels: Vec<String>,
    /// Login of the assignee, if any.
    #[builder(into)]
    pub assignee: Option<String>,
    /// When the issue was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Web URL of the issue.
    #[builder(into)]
    pub html_url: String,
    /// Whether the record is a pull request.
    #[builder(default)]
    pub is_pull_request: bool,
}

/// Why a single record could not be turned into an [`Issue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record is not a JSON object.
    #[error("record is not an object")]
    NotAnObject,
    /// The record has no usable `number`.
    #[error("missing or invalid issue number")]
    MissingNumber,
    /// The record has no `state`.
    #[error("missing state")]
    MissingState,
    /// The record has a `state` other than open/closed.
    #[error("unrecognized state '{0}'")]
    UnknownState(String),
}

impl Issue {
    /// Builds an issue from a tracker record.
    ///
    /// Missing optional fields degrade to empty values: no title becomes an
    /// empty title, absent or `null` labels become no labels, an unparsable
    /// `closed_at` becomes `None`, and a missing `html_url` is derived from
    /// the repository and number.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] when the record has no number or state.
    pub fn from_record(record: &Value, repo: &RepoRef) -> Result<Self, RecordError> {
        let obj = record.as_object().ok_or(RecordError::NotAnObject)?;

        let number = obj
            .get("number")
            .and_then(number_value)
            .ok_or(RecordError::MissingNumber)?;

        let state = match obj.get("state").and_then(Value::as_str) {
            Some(raw) => {
                IssueState::parse(raw).ok_or_else(|| RecordError::UnknownState(raw.to_string()))?
            }
            None => return Err(RecordError::MissingState),
        };

        let title = obj
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let html_url = obj
            .get("html_url")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .map_or_else(|| repo.issue_url(number), str::to_string);

        Ok(Self {
            number,
            title,
            state,
            labels: label_names(obj.get("labels")),
            assignee: assignee_login(obj),
            closed_at: closed_at(obj, number),
            html_url,
            is_pull_request: obj.get("pull_request").is_some_and(|v| !v.is_null()),
        })
    }

    /// Whether the issue is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }
}

fn number_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Label names from either `["bug"]` or `[{"name": "bug"}]` shapes.
fn label_names(labels: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = labels else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(name.as_str()),
            Value::Object(obj) => obj.get("name").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn login_of(value: &Value) -> Option<String> {
    match value {
        Value::String(login) if !login.is_empty() => Some(login.clone()),
        Value::Object(obj) => obj
            .get("login")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn assignee_login(obj: &Map<String, Value>) -> Option<String> {
    obj.get("assignee").and_then(login_of).or_else(|| {
        obj.get("assignees")
            .and_then(Value::as_array)
            .and_then(|all| all.iter().find_map(login_of))
    })
}

fn closed_at(obj: &Map<String, Value>, number: u64) -> Option<DateTime<Utc>> {
    let raw = obj.get("closed_at").and_then(Value::as_str)?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            debug!(number, raw, error = %e, "Ignoring unparsable closed_at");
            None
        }
    }
}

/// A record that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Position of the record in the fetched list.
    pub index: usize,
    /// Issue number, when the record had one.
    pub number: Option<u64>,
    /// Why the record was rejected.
    pub error: RecordError,
}

/// Outcome of normalizing a fetched list: the good records and the failures.
#[derive(Debug, Clone, Default)]
pub struct IssueBatch {
    /// Normalized records in fetch order, pull requests included.
    pub issues: Vec<Issue>,
    /// Records that could not be normalized.
    pub failures: Vec<RecordFailure>,
}

impl IssueBatch {
    /// Normalizes every record, collecting failures instead of stopping.
    #[must_use]
    pub fn from_records(records: &[Value], repo: &RepoRef) -> Self {
        let mut batch = Self::default();

        for (index, record) in records.iter().enumerate() {
            match Issue::from_record(record, repo) {
                Ok(issue) => batch.issues.push(issue),
                Err(error) => {
                    let number = record.get("number").and_then(number_value);
                    warn!(index, ?number, %error, "Skipping malformed issue record");
                    batch.failures.push(RecordFailure {
                        index,
                        number,
                        error,
                    });
                }
            }
        }

        debug!(
            issues = batch.issues.len(),
            pull_requests = batch.pull_request_count(),
            failures = batch.failures.len(),
            "Normalized issue records"
        );

        batch
    }

    /// Number of normalized records that are pull requests.
    #[must_use]
    pub fn pull_request_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_pull_request).count()
    }
}

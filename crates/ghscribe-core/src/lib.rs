// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # ghscribe-core
//!
//! Library behind the `ghscribe` CI tool:
//!
//! - an issues overview for a repository README, built by fetching every
//!   issue, categorizing it by state and label, rendering a markdown section
//!   and splicing it into the document;
//! - an AI code review comment for a pull request, generated from the
//!   branch diff.
//!
//! Configuration and credentials are passed in as values ([`AppConfig`],
//! [`Settings`]); nothing here reads the process environment on its own.
//!
//! ```no_run
//! use chrono::Utc;
//! use ghscribe_core::{InMemoryIssueSource, RepoRef, SectionRenderer, Buckets, IssueBatch};
//!
//! let repo = RepoRef::new("octocat", "hello");
//! let records = vec![serde_json::json!({"number": 1, "state": "open", "title": "Crash"})];
//! let batch = IssueBatch::from_records(&records, &repo);
//! let section = SectionRenderer::new(&repo, Utc::now()).render(&Buckets::from_issues(&batch.issues));
//! assert!(section.starts_with("## 📋 Issues Overview"));
//! # let _ = InMemoryIssueSource::new(records);
//! ```

// ============================================================================
// Authentication
// ============================================================================

pub use auth::CredentialProvider;

// ============================================================================
// Error Handling
// ============================================================================

pub use error::ScribeError;

/// Convenience Result type for ghscribe operations.
///
/// This is equivalent to `std::result::Result<T, ScribeError>`.
pub type Result<T> = std::result::Result<T, ScribeError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AiConfig, AppConfig, GitHubConfig, IssueBackend, IssuesConfig, ReadmeConfig, ReviewConfig,
    Settings, load_config,
};

// ============================================================================
// Issues
// ============================================================================

pub use issues::{
    InMemoryIssueSource, Issue, IssueBatch, IssueSource, IssueState, ListQuery, RecordError,
    RecordFailure, fetch_all_issues, with_issue_source,
};
pub use issues::mcp::McpIssueSource;
pub use issues::rest::RestIssueSource;

// ============================================================================
// README Section
// ============================================================================

pub use categorize::{Buckets, CategoryCounts, LabelCategory};
pub use document::{splice_section, update_document_file};
pub use render::{SECTION_MARKER, SectionRenderer};

// ============================================================================
// AI Review
// ============================================================================

pub use ai::{ChatMessage, CompletionProvider, OpenAiClient};
pub use review::{build_review_messages, format_review_comment, git_diff, truncate_diff};

// ============================================================================
// GitHub Integration
// ============================================================================

pub use github::RepoRef;

// ============================================================================
// Retry Logic
// ============================================================================

pub use retry::{is_retryable_http, is_retryable_octocrab, retry_backoff};

// ============================================================================
// Pipeline Facade
// ============================================================================

pub use pipeline::{
    CommentTarget, ReadmeOutcome, RenderedSection, ReviewOutcome, build_issue_source,
    collect_issues, completion_client, github_client, publish_review, render_readme_section,
    review_diff, review_pull_request, update_readme,
};

// ============================================================================
// Modules
// ============================================================================

pub mod ai;
pub mod auth;
pub mod categorize;
pub mod config;
pub mod document;
pub mod error;
pub mod github;
pub mod issues;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod review;

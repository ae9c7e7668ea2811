// SPDX-License-Identifier: Apache-2.0

//! Error types for ghscribe.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.
//!
//! Malformed issue records are not represented here: they are collected
//! per record as [`crate::issues::RecordError`] and never abort a run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during ghscribe operations.
#[derive(Error, Debug)]
pub enum ScribeError {
    /// Missing or invalid configuration (environment or config file).
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// No GitHub token was provided.
    #[error("Authentication required - set the GITHUB_TOKEN environment variable")]
    NotAuthenticated,

    /// GitHub API error from octocrab.
    #[error("GitHub API error: {message}")]
    GitHub {
        /// Error message.
        message: String,
        /// HTTP status code, when GitHub answered.
        status: Option<u16>,
    },

    /// The issue tracker tool failed (spawn, protocol, or tool error).
    #[error("Issue source '{source_name}' failed: {message}")]
    IssueSource {
        /// Name of the issue source (e.g. `mcp`, `rest`).
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Pagination did not terminate within the configured page ceiling.
    #[error("Issue listing did not end after {max_pages} full pages")]
    PaginationLimit {
        /// Configured page ceiling.
        max_pages: u32,
    },

    /// Completion service error.
    #[error("Completion service error: {message}")]
    Completion {
        /// Error message from the completion service.
        message: String,
        /// Optional HTTP status code.
        status: Option<u16>,
    },

    /// Rate limit exceeded on the completion service.
    #[error("Rate limit exceeded on the completion service, retry after {retry_after}s")]
    RateLimited {
        /// Number of seconds to wait before retrying.
        retry_after: u64,
    },

    /// A `git` subprocess failed.
    #[error("git error: {message}")]
    Git {
        /// Error message (usually stderr of the git process).
        message: String,
    },

    /// The target document could not be read or written.
    #[error("Failed to access document {}", path.display())]
    Document {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Network/HTTP error from reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ScribeError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ScribeError::Config {
            message: message.into(),
        }
    }
}

impl From<octocrab::Error> for ScribeError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => ScribeError::GitHub {
                message: source.message.clone(),
                status: Some(source.status_code.as_u16()),
            },
            other => ScribeError::GitHub {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<config::ConfigError> for ScribeError {
    fn from(err: config::ConfigError) -> Self {
        ScribeError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_limit_message() {
        let err = ScribeError::PaginationLimit { max_pages: 50 };
        assert_eq!(
            err.to_string(),
            "Issue listing did not end after 50 full pages"
        );
    }

    #[test]
    fn test_document_error_keeps_source() {
        let err = ScribeError::Document {
            path: PathBuf::from("README.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("README.md"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

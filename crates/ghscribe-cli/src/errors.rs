// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `ScribeError` and appends a hint for the
//! error kinds a CI user can act on.

use std::fmt::Write;

use anyhow::Error;
use ghscribe_core::ScribeError;

/// Formats an error for CLI display with helpful hints.
///
/// If the error chain holds no `ScribeError`, the top-level message is
/// returned unchanged.
pub fn format_error(error: &Error) -> String {
    let Some(scribe_err) = error.downcast_ref::<ScribeError>() else {
        return error.to_string();
    };

    match scribe_err {
        ScribeError::Config { .. } => format!(
            "{scribe_err}\n\nTip: Check the CI environment variables and ghscribe.toml."
        ),
        ScribeError::NotAuthenticated => format!(
            "{scribe_err}\n\nTip: In GitHub Actions, pass `GITHUB_TOKEN: ${{{{ secrets.GITHUB_TOKEN }}}}` in the step's env."
        ),
        ScribeError::GitHub {
            status: Some(404), ..
        } => format!(
            "{scribe_err}\n\nTip: Check GITHUB_REPOSITORY and that the token can see the repository."
        ),
        ScribeError::GitHub { status, .. } => {
            let mut msg = scribe_err.to_string();
            if let Some(code) = status {
                let _ = write!(msg, " (HTTP {code})");
            }
            msg.push_str("\n\nTip: Check that the token can read issues and write comments.");
            msg
        }
        ScribeError::IssueSource { source_name, .. } if source_name == "mcp" => format!(
            "{scribe_err}\n\nTip: The MCP server needs Node.js (`npx`). Use `--backend rest` to query the REST API directly."
        ),
        ScribeError::IssueSource { .. } => scribe_err.to_string(),
        ScribeError::PaginationLimit { .. } => format!(
            "{scribe_err}\n\nTip: Raise `issues.max_pages` if the repository really has that many issues."
        ),
        ScribeError::Completion { status, .. } => {
            let mut msg = scribe_err.to_string();
            if let Some(code) = status {
                let _ = write!(msg, " (HTTP {code})");
            }
            msg
        }
        ScribeError::RateLimited { retry_after } => {
            let mut msg = scribe_err.to_string();
            msg.push_str("\n\nTip: You've hit the completion service rate limit.");
            let _ = write!(msg, "\n- Wait at least {retry_after} seconds before retrying.");
            msg
        }
        ScribeError::Git { .. } => format!(
            "{scribe_err}\n\nTip: Check out the repository with full history (`fetch-depth: 0`) so the base ref exists."
        ),
        ScribeError::Document { .. } => {
            format!("{scribe_err}\n\nTip: Check the path and its permissions.")
        }
        ScribeError::Network(_) => {
            format!("{scribe_err}\n\nTip: Check your internet connection and try again.")
        }
    }
}

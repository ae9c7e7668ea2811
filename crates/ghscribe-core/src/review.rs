// SPDX-License-Identifier: Apache-2.0

//! Pull request review: diff collection, prompt building, comment formatting.

use std::fmt::Write;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, instrument};

use crate::ai::ChatMessage;
use crate::error::ScribeError;

/// Heading of the posted review comment.
pub const REVIEW_HEADING: &str = "## 🤖 AI Code Review";

const SYSTEM_PROMPT: &str = "You are an experienced software engineer reviewing a pull request. \
Point out bugs, security problems, performance issues and unclear code. \
Be specific: reference files and lines from the diff. \
Keep the review concise and use markdown bullet points. \
If the change looks good, say so briefly.";

/// Runs `git diff <base_ref>...HEAD` in `workdir` and returns its output.
///
/// # Errors
///
/// Returns `ScribeError::Git` if git cannot be started or exits non-zero.
#[instrument(fields(workdir = %workdir.display()))]
pub async fn git_diff(workdir: &Path, base_ref: &str) -> Result<String, ScribeError> {
    let range = format!("{base_ref}...HEAD");
    let output = Command::new("git")
        .arg("diff")
        .arg(&range)
        .current_dir(workdir)
        .output()
        .await
        .map_err(|e| ScribeError::Git {
            message: format!("failed to run git: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScribeError::Git {
            message: format!("git diff {range} failed: {}", stderr.trim()),
        });
    }

    let diff = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!(chars = diff.len(), "Collected diff");
    Ok(diff)
}

/// Cuts `diff` to at most `max_chars` characters, ending on a line boundary
/// when possible, and notes how much was dropped.
#[must_use]
pub fn truncate_diff(diff: &str, max_chars: usize) -> String {
    let total = diff.chars().count();
    if total <= max_chars {
        return diff.to_string();
    }

    let cut = diff
        .char_indices()
        .nth(max_chars)
        .map_or(diff.len(), |(i, _)| i);
    let head = &diff[..cut];
    let head = head.rfind('\n').map_or(head, |nl| &head[..=nl]);

    let omitted = total - head.chars().count();
    let mut out = head.to_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    let _ = writeln!(out, "\n[... diff truncated, {omitted} more characters ...]");
    out
}

/// System and user messages asking for a review of `diff`.
#[must_use]
pub fn build_review_messages(diff: &str) -> Vec<ChatMessage> {
    let mut prompt = String::from("Please review the following pull request diff.\n\n");
    let _ = writeln!(prompt, "```diff\n{}\n```", diff.trim_end());

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

/// Markdown body of the review comment, with a footer naming the model.
#[must_use]
pub fn format_review_comment(review: &str, model: &str) -> String {
    format!(
        "{REVIEW_HEADING}\n\n{}\n\n---\n*This review was generated automatically by `{model}` and may contain mistakes.*\n",
        review.trim()
    )
}

// SPDX-License-Identifier: Apache-2.0

//! Splicing the generated section into a markdown document.
//!
//! The generated region starts at the [`SECTION_MARKER`] heading and runs to
//! the next level-1 or level-2 heading, or to the end of the document. It is
//! a plain textual splice: any heading that looks like the marker is treated
//! as a previous run's output and replaced.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::error::ScribeError;
use crate::github::RepoRef;
use crate::render::SECTION_MARKER;

static MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^{}[ \t]*\r?$", regex::escape(SECTION_MARKER)))
        .expect("section marker pattern is valid")
});

static TOP_LEVEL_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,2}[ \t]").expect("heading pattern is valid"));

/// Minimal document used when the target does not exist yet.
#[must_use]
pub fn placeholder_document(repo: &RepoRef) -> String {
    format!(
        "# {}\n\nThis README is maintained automatically; the issues overview below is regenerated on every run.\n",
        repo.repo
    )
}

/// Removes every generated region from `document`.
fn remove_section(document: &str) -> String {
    let mut text = document.to_string();

    while let Some(start) = MARKER_LINE.find(&text) {
        let after_marker = start.end();
        let end = TOP_LEVEL_HEADING
            .find(&text[after_marker..])
            .map_or(text.len(), |m| after_marker + m.start());
        text.replace_range(start.start()..end, "");
    }

    text
}

/// Returns `existing` with the generated section replaced by `fragment`.
///
/// The rest of the document is kept verbatim apart from trailing whitespace;
/// the fragment is appended after one blank line. `None` stands for a
/// missing document and yields a placeholder plus the fragment.
#[must_use]
pub fn splice_section(existing: Option<&str>, fragment: &str, repo: &RepoRef) -> String {
    let base = existing.map_or_else(|| placeholder_document(repo), str::to_string);
    let remainder = remove_section(&base);
    let remainder = remainder.trim_end();
    let fragment = fragment.trim_end();

    if remainder.is_empty() {
        format!("{fragment}\n")
    } else {
        format!("{remainder}\n\n{fragment}\n")
    }
}

/// Reads the document at `path` (missing is fine), splices in `fragment`
/// and writes it back in one go.
#[instrument(skip(fragment), fields(path = %path.display()))]
pub fn update_document_file(path: &Path, fragment: &str, repo: &RepoRef) -> Result<(), ScribeError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Document not found, starting from placeholder");
            None
        }
        Err(source) => {
            return Err(ScribeError::Document {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let updated = splice_section(existing.as_deref(), fragment, repo);

    std::fs::write(path, updated).map_err(|source| ScribeError::Document {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Document updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoRef {
        RepoRef::new("octocat", "hello")
    }

    const FRAGMENT: &str = "## 📋 Issues Overview\n\nnew content\n";

    #[test]
    fn test_appends_when_marker_absent() {
        let doc = "# Hello\n\nSome intro.\n\n\n";
        let out = splice_section(Some(doc), FRAGMENT, &repo());
        assert_eq!(
            out,
            "# Hello\n\nSome intro.\n\n## 📋 Issues Overview\n\nnew content\n"
        );
    }

    #[test]
    fn test_replaces_only_marked_region() {
        let doc = "# Hello\n\nIntro.\n\n## 📋 Issues Overview\n\nold content\n### 📊 Statistics\n\n| a | b |\n\n## License\n\nMIT\n";
        let out = splice_section(Some(doc), FRAGMENT, &repo());

        assert_eq!(
            out,
            "# Hello\n\nIntro.\n\n## License\n\nMIT\n\n## 📋 Issues Overview\n\nnew content\n"
        );
        assert!(!out.contains("old content"));
        assert!(!out.contains("Statistics"));
    }

    #[test]
    fn test_region_runs_to_end_of_document() {
        let doc = "# Hello\n\n## 📋 Issues Overview\n\nold\n\n### Sub\n\nmore old\n";
        let out = splice_section(Some(doc), FRAGMENT, &repo());
        assert_eq!(out, "# Hello\n\n## 📋 Issues Overview\n\nnew content\n");
    }

    #[test]
    fn test_idempotent_for_same_fragment() {
        let doc = "# Hello\n\n## Install\n\ncargo install\n";
        let once = splice_section(Some(doc), FRAGMENT, &repo());
        let twice = splice_section(Some(&once), FRAGMENT, &repo());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_document_gets_placeholder() {
        let out = splice_section(None, FRAGMENT, &repo());
        assert!(out.starts_with("# hello\n\n"));
        assert!(out.ends_with(FRAGMENT));
    }

    #[test]
    fn test_similar_heading_is_not_the_marker() {
        let doc = "# Hello\n\n## 📋 Issues Overview (manual)\n\nkeep me\n";
        let out = splice_section(Some(doc), FRAGMENT, &repo());
        assert!(out.contains("keep me"));
    }

    #[test]
    fn test_update_document_file_preserves_unrelated_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(
            &path,
            "# Hello\n\n## 📋 Issues Overview\n\nstale\n\n## Contributing\n\nPRs welcome.\n",
        )
        .unwrap();

        update_document_file(&path, FRAGMENT, &repo()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "# Hello\n\n## Contributing\n\nPRs welcome.\n\n## 📋 Issues Overview\n\nnew content\n"
        );
    }

    #[test]
    fn test_update_document_file_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");

        update_document_file(&path, FRAGMENT, &repo()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# hello"));
        assert!(text.contains("new content"));
    }

    #[test]
    fn test_update_document_file_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("README.md");

        let err = update_document_file(&path, FRAGMENT, &repo()).unwrap_err();
        assert!(matches!(err, ScribeError::Document { .. }));
    }
}

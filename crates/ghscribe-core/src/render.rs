// SPDX-License-Identifier: Apache-2.0

//! Markdown rendering of the issues overview section.
//!
//! Output depends only on the buckets, the repository and the clock value
//! passed to [`SectionRenderer::new`]. Lists are rendered in bucket order
//! and never re-sorted.

use std::fmt::Write;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::categorize::Buckets;
use crate::github::RepoRef;
use crate::issues::Issue;

/// Heading that starts the generated section.
pub const SECTION_MARKER: &str = "## 📋 Issues Overview";

/// Maximum open issues listed before the "more" pointer.
pub const OPEN_ISSUES_LIMIT: usize = 20;
/// Maximum bug reports listed.
pub const BUG_REPORTS_LIMIT: usize = 10;
/// Maximum feature requests listed.
pub const FEATURE_REQUESTS_LIMIT: usize = 10;
/// Maximum help-wanted issues listed.
pub const HELP_WANTED_LIMIT: usize = 5;
/// Maximum recently closed issues listed.
pub const RECENTLY_CLOSED_LIMIT: usize = 10;
/// How far back "recently closed" reaches.
pub const RECENTLY_CLOSED_DAYS: i64 = 30;

/// Renders the issues overview for one repository at a fixed instant.
#[derive(Debug, Clone)]
pub struct SectionRenderer<'a> {
    repo: &'a RepoRef,
    now: DateTime<Utc>,
}

impl<'a> SectionRenderer<'a> {
    /// Creates a renderer. `now` drives the header date, the recently
    /// closed window and the generation timestamp.
    #[must_use]
    pub fn new(repo: &'a RepoRef, now: DateTime<Utc>) -> Self {
        Self { repo, now }
    }

    /// Renders the full section, starting with [`SECTION_MARKER`].
    #[must_use]
    pub fn render(&self, buckets: &Buckets<'_>) -> String {
        let mut out = String::new();

        self.write_header(&mut out, buckets);
        self.write_open_issues(&mut out, &buckets.open);
        write_subsection(&mut out, "🐛 Bug Reports", &buckets.bugs, Some(BUG_REPORTS_LIMIT));
        write_subsection(
            &mut out,
            "✨ Feature Requests",
            &buckets.enhancements,
            Some(FEATURE_REQUESTS_LIMIT),
        );
        write_subsection(
            &mut out,
            "🙋 Help Wanted",
            &buckets.help_wanted,
            Some(HELP_WANTED_LIMIT),
        );
        write_subsection(&mut out, "🌱 Good First Issues", &buckets.good_first_issues, None);

        let recent = self.recently_closed(&buckets.closed);
        write_subsection(
            &mut out,
            "✅ Recently Closed",
            &recent,
            Some(RECENTLY_CLOSED_LIMIT),
        );

        self.write_statistics(&mut out, buckets);
        out
    }

    fn write_header(&self, out: &mut String, buckets: &Buckets<'_>) {
        let _ = writeln!(out, "{SECTION_MARKER}\n");
        let _ = writeln!(
            out,
            "> Automatically generated overview of issues in [{}]({}). Last updated: {}\n",
            self.repo,
            self.repo.html_url(),
            self.now.format("%Y-%m-%d")
        );
        let _ = writeln!(
            out,
            "**Total:** {} | **Open:** {} | **Closed:** {}\n",
            buckets.total(),
            buckets.open.len(),
            buckets.closed.len()
        );
    }

    fn write_open_issues(&self, out: &mut String, open: &[&Issue]) {
        if open.is_empty() {
            return;
        }

        write_subsection(out, "🟢 Open Issues", open, Some(OPEN_ISSUES_LIMIT));

        if open.len() > OPEN_ISSUES_LIMIT {
            // Pointer goes inside the list, before its trailing blank line.
            out.pop();
            let _ = writeln!(
                out,
                "- …and {} more open issues ([view all]({}))\n",
                open.len() - OPEN_ISSUES_LIMIT,
                self.repo.issues_search_url("is:issue is:open")
            );
        }
    }

    /// Closed issues whose `closed_at` falls within the window, in bucket order.
    fn recently_closed<'b>(&self, closed: &[&'b Issue]) -> Vec<&'b Issue> {
        let cutoff = self.now - Duration::days(RECENTLY_CLOSED_DAYS);
        closed
            .iter()
            .filter(|i| i.closed_at.is_some_and(|at| at >= cutoff))
            .copied()
            .collect()
    }

    fn write_statistics(&self, out: &mut String, buckets: &Buckets<'_>) {
        let counts = buckets.counts();
        let rows = [
            ("Total Issues", counts.total),
            ("Open", counts.open),
            ("Closed", counts.closed),
            ("Bug Reports", counts.bugs),
            ("Feature Requests", counts.enhancements),
            ("Documentation", counts.documentation),
            ("Help Wanted", counts.help_wanted),
            ("Good First Issues", counts.good_first_issues),
        ];

        out.push_str("### 📊 Statistics\n\n");
        out.push_str("| Metric | Count |\n");
        out.push_str("|--------|-------|\n");
        for (metric, count) in rows {
            let _ = writeln!(out, "| {metric} | {count} |");
        }
        let _ = writeln!(
            out,
            "\n*Generated at {}*",
            self.now.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
    }
}

/// Writes a `###` subsection listing at most `limit` issues; nothing if empty.
fn write_subsection(out: &mut String, title: &str, issues: &[&Issue], limit: Option<usize>) {
    if issues.is_empty() {
        return;
    }

    let shown = &issues[..limit.map_or(issues.len(), |l| l.min(issues.len()))];
    let mixed = shown.iter().any(|i| i.is_open()) && shown.iter().any(|i| !i.is_open());

    let _ = writeln!(out, "### {title}\n");
    for issue in shown {
        out.push_str(&issue_line(issue, mixed));
        out.push('\n');
    }
    out.push('\n');
}

/// One list entry: `- [#42](url) **Title** `label` (assigned to @login)`.
fn issue_line(issue: &Issue, show_state: bool) -> String {
    let mut line = String::from("- ");

    if show_state {
        line.push_str(if issue.is_open() { "🟢 " } else { "✅ " });
    }

    let _ = write!(
        line,
        "[#{}]({}) **{}**",
        issue.number, issue.html_url, issue.title
    );

    if !issue.labels.is_empty() {
        let labels: Vec<String> = issue.labels.iter().map(|l| format!("`{l}`")).collect();
        let _ = write!(line, " {}", labels.join(" "));
    }

    if let Some(login) = &issue.assignee {
        let _ = write!(line, " (assigned to @{login})");
    }

    line
}

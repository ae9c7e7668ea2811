// SPDX-License-Identifier: Apache-2.0

//! Issue categorization.
//!
//! Issues are split two ways. State buckets (open, closed) are exclusive.
//! Label buckets are overlapping: an issue lands in every category whose
//! keyword set matches one of its labels. Pull requests are left out of
//! every bucket.

use serde::Serialize;

use crate::issues::Issue;

/// Label-derived issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelCategory {
    /// Bug-like labels.
    Bug,
    /// Feature and improvement requests.
    Enhancement,
    /// Documentation work.
    Documentation,
    /// Maintainers asking for outside help.
    HelpWanted,
    /// Entry-level issues.
    GoodFirstIssue,
}

impl LabelCategory {
    /// All categories, in rendering order.
    pub const ALL: [LabelCategory; 5] = [
        LabelCategory::Bug,
        LabelCategory::Enhancement,
        LabelCategory::Documentation,
        LabelCategory::HelpWanted,
        LabelCategory::GoodFirstIssue,
    ];

    /// Lowercase keywords; a label matches when it contains any of them.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            LabelCategory::Bug => &["bug", "error", "fix"],
            LabelCategory::Enhancement => &["enhancement", "feature", "improvement"],
            LabelCategory::Documentation => &["documentation", "docs"],
            LabelCategory::HelpWanted => &["help wanted", "help-wanted"],
            LabelCategory::GoodFirstIssue => &["good first issue", "beginner"],
        }
    }

    /// Whether a single label name belongs to this category.
    #[must_use]
    pub fn matches_label(self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.keywords().iter().any(|kw| label.contains(kw))
    }

    /// Whether any of the issue's labels belongs to this category.
    #[must_use]
    pub fn matches(self, issue: &Issue) -> bool {
        issue.labels.iter().any(|l| self.matches_label(l))
    }
}

/// Issues grouped by state and label category, in input order.
#[derive(Debug, Clone, Default)]
pub struct Buckets<'a> {
    /// Open issues.
    pub open: Vec<&'a Issue>,
    /// Closed issues.
    pub closed: Vec<&'a Issue>,
    /// Issues with bug-like labels.
    pub bugs: Vec<&'a Issue>,
    /// Issues with enhancement-like labels.
    pub enhancements: Vec<&'a Issue>,
    /// Issues with documentation-like labels.
    pub documentation: Vec<&'a Issue>,
    /// Issues with help-wanted-like labels.
    pub help_wanted: Vec<&'a Issue>,
    /// Issues with good-first-issue-like labels.
    pub good_first_issues: Vec<&'a Issue>,
}

impl<'a> Buckets<'a> {
    /// Categorizes `issues`, skipping pull requests.
    #[must_use]
    pub fn from_issues(issues: &'a [Issue]) -> Self {
        let mut buckets = Self::default();

        for issue in issues.iter().filter(|i| !i.is_pull_request) {
            if issue.is_open() {
                buckets.open.push(issue);
            } else {
                buckets.closed.push(issue);
            }

            for category in LabelCategory::ALL {
                if category.matches(issue) {
                    buckets.label_bucket_mut(category).push(issue);
                }
            }
        }

        buckets
    }

    /// The bucket for a label category.
    #[must_use]
    pub fn label_bucket(&self, category: LabelCategory) -> &[&'a Issue] {
        match category {
            LabelCategory::Bug => &self.bugs,
            LabelCategory::Enhancement => &self.enhancements,
            LabelCategory::Documentation => &self.documentation,
            LabelCategory::HelpWanted => &self.help_wanted,
            LabelCategory::GoodFirstIssue => &self.good_first_issues,
        }
    }

    fn label_bucket_mut(&mut self, category: LabelCategory) -> &mut Vec<&'a Issue> {
        match category {
            LabelCategory::Bug => &mut self.bugs,
            LabelCategory::Enhancement => &mut self.enhancements,
            LabelCategory::Documentation => &mut self.documentation,
            LabelCategory::HelpWanted => &mut self.help_wanted,
            LabelCategory::GoodFirstIssue => &mut self.good_first_issues,
        }
    }

    /// Number of categorized issues (open plus closed).
    #[must_use]
    pub fn total(&self) -> usize {
        self.open.len() + self.closed.len()
    }

    /// Whether no issue survived pull request exclusion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Bucket sizes.
    #[must_use]
    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts {
            total: self.total(),
            open: self.open.len(),
            closed: self.closed.len(),
            bugs: self.bugs.len(),
            enhancements: self.enhancements.len(),
            documentation: self.documentation.len(),
            help_wanted: self.help_wanted.len(),
            good_first_issues: self.good_first_issues.len(),
        }
    }
}

/// Bucket sizes, as shown in the statistics table and `stats` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    /// Issues after pull request exclusion.
    pub total: usize,
    /// Open issues.
    pub open: usize,
    /// Closed issues.
    pub closed: usize,
    /// Bug reports, open and closed.
    pub bugs: usize,
    /// Feature requests, open and closed.
    pub enhancements: usize,
    /// Documentation issues.
    pub documentation: usize,
    /// Help-wanted issues.
    pub help_wanted: usize,
    /// Good first issues.
    pub good_first_issues: usize,
}

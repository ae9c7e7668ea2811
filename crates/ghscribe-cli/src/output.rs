// SPDX-License-Identifier: Apache-2.0

//! Rendering of command results for the terminal.

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table, presets};
use console::style;
use ghscribe_core::{CategoryCounts, ReadmeOutcome, ReviewOutcome};
use serde::Serialize;

use crate::cli::OutputContext;

/// Category counts for one repository, as printed by `stats`.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    /// `owner/repo`.
    pub repository: String,
    /// Bucket sizes.
    #[serde(flatten)]
    pub counts: CategoryCounts,
    /// Pull requests left out of the counts.
    pub pull_requests: usize,
    /// Records skipped as malformed.
    pub skipped_records: usize,
}

/// Builds the `stats` table.
pub fn stats_table(report: &StatsReport) -> Table {
    let counts = &report.counts;
    let rows = [
        ("Total issues", counts.total),
        ("Open", counts.open),
        ("Closed", counts.closed),
        ("Bug reports", counts.bugs),
        ("Feature requests", counts.enhancements),
        ("Documentation", counts.documentation),
        ("Help wanted", counts.help_wanted),
        ("Good first issues", counts.good_first_issues),
    ];

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(&report.repository).add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
        ]);

    for (label, count) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Prints the `stats` report as a table.
pub fn print_stats(report: &StatsReport, ctx: &OutputContext) {
    println!("{}", stats_table(report));
    if !ctx.quiet && (report.pull_requests > 0 || report.skipped_records > 0) {
        println!(
            "{}",
            style(format!(
                "{} pull requests excluded, {} malformed records skipped",
                report.pull_requests, report.skipped_records
            ))
            .dim()
        );
    }
}

/// Prints the result of a README update.
pub fn print_readme_outcome(outcome: &ReadmeOutcome, ctx: &OutputContext) {
    if ctx.quiet {
        return;
    }

    match outcome {
        ReadmeOutcome::NoIssues => {
            println!(
                "{} No issues found, README left unchanged",
                style("!").yellow().bold()
            );
        }
        ReadmeOutcome::Updated {
            path,
            counts,
            pull_requests,
            failures,
        } => {
            println!(
                "{} Updated {} ({} issues: {} open, {} closed)",
                style("*").green().bold(),
                style(path.display()).cyan(),
                counts.total,
                counts.open,
                counts.closed
            );
            if *pull_requests > 0 {
                println!("  Pull requests excluded: {pull_requests}");
            }
            if *failures > 0 {
                println!(
                    "  {} malformed records skipped",
                    style(failures).yellow()
                );
            }
        }
    }
}

/// Prints the result of a review run. In dry-run mode the comment goes to
/// stdout even when quiet.
pub fn print_review_outcome(outcome: &ReviewOutcome, ctx: &OutputContext, dry_run: bool) {
    match outcome {
        ReviewOutcome::EmptyDiff => {
            if !ctx.quiet {
                println!(
                    "{} No changes to review",
                    style("!").yellow().bold()
                );
            }
        }
        ReviewOutcome::Reviewed {
            comment,
            comment_url,
        } => {
            if dry_run {
                print!("{comment}");
                return;
            }
            if ctx.quiet {
                return;
            }
            match comment_url {
                Some(url) => println!(
                    "{} Review posted: {}",
                    style("*").green().bold(),
                    style(url).cyan()
                ),
                None => println!(
                    "{} Review generated but could not be posted (see log)",
                    style("!").yellow().bold()
                ),
            }
        }
    }
}

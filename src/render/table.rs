//! Terminal rendering for reports and diffs.
//!
//! Formats output as plain aligned text:
//! - Reports group links under per-repo headings
//! - Diffs split into "newly broken" and "previously known" sections
//! - Summary listing mirrors the database ordering (newest first)

use crate::model::{ReportSnapshot, ReportSummary};
use crate::render::sorted;
use crate::store::diff::ReportDiff;

pub fn render_report(snapshot: &ReportSnapshot) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "report {} ({})\n",
        snapshot.report_id,
        snapshot.report_date.format("%Y-%m-%d %H:%M:%S")
    ));

    if snapshot.repos.is_empty() {
        output.push_str("No broken links recorded.\n");
        return output;
    }

    for repo in &snapshot.repos {
        output.push_str(&format!("\n{} ({})\n", repo.repo_name, repo.repo_url));
        output.push_str(&"-".repeat(40));
        output.push('\n');

        for link in &repo.broken_links {
            output.push_str(&format!(
                "  {:<30} {:>5}  {}\n",
                truncate(&link.file, 30),
                link.status_code,
                link.url
            ));
        }
    }

    output.push_str(&format!("\n{} broken links total\n", snapshot.link_count()));
    output
}

pub fn render_diff(diff: &ReportDiff) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Current report: {} ({})\n",
        diff.report_id,
        diff.report_date.format("%Y-%m-%d %H:%M:%S")
    ));

    if diff.is_empty() {
        output.push_str("\nNothing broken. Clean run.\n");
        return output;
    }

    if !diff.new.is_empty() {
        output.push_str(&format!("\nNewly broken ({}):\n", diff.new.len()));
        for row in sorted(&diff.new) {
            output.push_str(&format!(
                "  [new] {}: {} -> {} ({})\n",
                row.repo_name, row.file, row.url, row.status_code
            ));
        }
    }

    if !diff.existing.is_empty() {
        output.push_str(&format!("\nPreviously known ({}):\n", diff.existing.len()));
        for row in sorted(&diff.existing) {
            output.push_str(&format!(
                "  [known] {}: {} -> {} ({})\n",
                row.repo_name, row.file, row.url, row.status_code
            ));
        }
    }

    output
}

pub fn render_summaries(summaries: &[ReportSummary]) -> String {
    if summaries.is_empty() {
        return String::from("No reports stored. Run 'linkledger ingest' to add one.\n");
    }

    let mut output = String::new();
    output.push_str(&format!("{:<38} {:<20}\n", "Report", "Date"));
    output.push_str(&"-".repeat(58));
    output.push('\n');

    for summary in summaries {
        output.push_str(&format!(
            "{:<38} {:<20}\n",
            summary.report_id,
            summary.report_date.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

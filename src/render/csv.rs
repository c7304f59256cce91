//! Delimited export.
//!
//! Column contract: repo_name,repo_url,file,url,status_code, plus a
//! trailing state column (new/existing) when rendering diff output.

use crate::model::{LinkRow, ReportSnapshot, ReportSummary};
use crate::render::sorted;
use crate::store::diff::ReportDiff;

const HEADER: &str = "repo_name,repo_url,file,url,status_code";

pub fn render_report(snapshot: &ReportSnapshot) -> String {
    let rows = snapshot.link_rows();
    let mut output = String::new();
    output.push_str(HEADER);
    output.push('\n');

    for row in sorted(&rows) {
        push_row(&mut output, row, None);
    }

    output
}

pub fn render_diff(diff: &ReportDiff) -> String {
    let mut output = String::new();
    output.push_str(HEADER);
    output.push_str(",state\n");

    for row in sorted(&diff.new) {
        push_row(&mut output, row, Some("new"));
    }
    for row in sorted(&diff.existing) {
        push_row(&mut output, row, Some("existing"));
    }

    output
}

pub fn render_summaries(summaries: &[ReportSummary]) -> String {
    let mut output = String::from("report_id,report_date\n");

    for summary in summaries {
        output.push_str(&format!(
            "{},{}\n",
            summary.report_id,
            summary.report_date.format("%Y-%m-%dT%H:%M:%S")
        ));
    }

    output
}

fn push_row(output: &mut String, row: &LinkRow, state: Option<&str>) {
    output.push_str(&format!(
        "{},{},{},{},{}",
        escape(&row.repo_name),
        escape(&row.repo_url),
        escape(&row.file),
        escape(&row.url),
        row.status_code
    ));
    if let Some(state) = state {
        output.push(',');
        output.push_str(state);
    }
    output.push('\n');
}

/// Quote a field only when it contains a delimiter, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BrokenLink, RepoLinks, ReportId};
    use chrono::NaiveDateTime;

    fn date() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2023-03-20T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn row(file: &str) -> LinkRow {
        LinkRow {
            repo_name: "libx".to_string(),
            repo_url: "https://example.com/libx".to_string(),
            file: file.to_string(),
            url: format!("https://dead.example.com/{file}"),
            status_code: 404,
        }
    }

    #[test]
    fn report_csv_has_contract_columns_and_one_row_per_link() {
        let snapshot = ReportSnapshot {
            report_id: ReportId::generate(),
            report_date: date(),
            repos: vec![RepoLinks {
                repo_name: "libx".to_string(),
                repo_url: "https://example.com/libx".to_string(),
                broken_links: vec![
                    BrokenLink {
                        file: "a.md".to_string(),
                        url: "https://dead.example.com/a".to_string(),
                        status_code: 404,
                    },
                    BrokenLink {
                        file: "b.md".to_string(),
                        url: "https://dead.example.com/b".to_string(),
                        status_code: 500,
                    },
                ],
            }],
        };

        let rendered = render_report(&snapshot);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "repo_name,repo_url,file,url,status_code");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "libx,https://example.com/libx,a.md,https://dead.example.com/a,404"
        );
    }

    #[test]
    fn diff_csv_tags_rows_with_state() {
        let diff = ReportDiff {
            new: vec![row("c.md")],
            existing: vec![row("a.md")],
            report_id: ReportId::generate(),
            report_date: date(),
        };

        let rendered = render_diff(&diff);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "repo_name,repo_url,file,url,status_code,state");
        assert!(lines[1].ends_with(",new"));
        assert!(lines[2].ends_with(",existing"));
    }

    #[test]
    fn summary_csv_lists_one_report_per_line() {
        let summaries = vec![
            ReportSummary {
                report_id: ReportId::generate(),
                report_date: date(),
            },
            ReportSummary {
                report_id: ReportId::generate(),
                report_date: date(),
            },
        ];

        let rendered = render_summaries(&summaries);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "report_id,report_date");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            format!("{},2023-03-20T10:00:00", summaries[0].report_id)
        );
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}

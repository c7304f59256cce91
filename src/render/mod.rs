pub mod csv;
pub mod table;

use crate::model::{LinkRow, ReportSnapshot, ReportSummary};
use crate::store::diff::ReportDiff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
    Csv,
}

impl Format {
    pub fn from_flags(json: bool, csv: bool) -> Self {
        if csv {
            Format::Csv
        } else if json {
            Format::Json
        } else {
            Format::Table
        }
    }
}

pub fn print_report(snapshot: &ReportSnapshot, format: Format) {
    match format {
        Format::Table => print!("{}", table::render_report(snapshot)),
        Format::Json => println!("{}", to_json(snapshot)),
        Format::Csv => print!("{}", csv::render_report(snapshot)),
    }
}

pub fn print_diff(diff: &ReportDiff, format: Format) {
    match format {
        Format::Table => print!("{}", table::render_diff(diff)),
        Format::Json => println!("{}", to_json(diff)),
        Format::Csv => print!("{}", csv::render_diff(diff)),
    }
}

pub fn print_summaries(summaries: &[ReportSummary], format: Format) {
    match format {
        Format::Table => print!("{}", table::render_summaries(summaries)),
        Format::Json => println!("{}", to_json(&summaries)),
        Format::Csv => print!("{}", csv::render_summaries(summaries)),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| String::from("{}"))
}

/// Stable display order for link rows. The diff engine leaves ordering
/// unspecified, so output paths sort before rendering.
pub(crate) fn sorted<'a>(rows: &'a [LinkRow]) -> Vec<&'a LinkRow> {
    let mut ordered: Vec<&LinkRow> = rows.iter().collect();
    ordered.sort_by(|a, b| {
        (&a.repo_name, &a.file, &a.url).cmp(&(&b.repo_name, &b.file, &b.url))
    });
    ordered
}

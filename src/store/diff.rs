//! Report comparison engine.
//!
//! Partitions the links of the most recent report into newly broken and
//! previously known:
//! - Matches links by (repo_name, repo_url, file), not by url or status
//!   code; a link whose status code changed is still the same link
//! - No previous report, or a previous report with zero links, means
//!   everything is newly broken
//! - Links that were fixed since the previous report appear in neither
//!   set; this engine only reports what is currently broken

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{LinkKey, LinkRow, ReportId};
use crate::store::history::History;
use crate::store::{Store, StoreError};

/// The partition of the current report's links, plus which report was
/// considered current.
#[derive(Debug, Serialize)]
pub struct ReportDiff {
    #[serde(rename = "new_broken_links")]
    pub new: Vec<LinkRow>,
    #[serde(rename = "existing_broken_links")]
    pub existing: Vec<LinkRow>,
    #[serde(rename = "last_report_id")]
    pub report_id: ReportId,
    #[serde(rename = "last_report_date")]
    pub report_date: NaiveDateTime,
}

impl ReportDiff {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.existing.is_empty()
    }
}

/// Split `new_rows` by whether their identity key appeared in `prev_rows`.
///
/// Returns (existing, new). Duplicate keys in the input are kept as-is;
/// de-duplicating here would silently discard producer data.
pub fn classify(prev_rows: &[LinkRow], new_rows: Vec<LinkRow>) -> (Vec<LinkRow>, Vec<LinkRow>) {
    let prev_keys: HashSet<LinkKey> = prev_rows.iter().map(LinkRow::key).collect();

    new_rows
        .into_iter()
        .partition(|row| prev_keys.contains(&row.key()))
}

/// Diff a specific pair of reports.
///
/// `new_id` must exist; a missing current report is `NoReportData`, which
/// is distinct from merely having no previous report (`prev_id = None`,
/// everything classified new).
pub fn diff_reports(
    store: &Store,
    prev_id: Option<ReportId>,
    new_id: ReportId,
) -> Result<ReportDiff, StoreError> {
    let current = match store.load(new_id) {
        Ok(snapshot) => snapshot,
        Err(StoreError::NotFound) => return Err(StoreError::NoReportData),
        Err(e) => return Err(e),
    };

    let prev_rows = match prev_id {
        Some(id) => store.load(id)?.link_rows(),
        None => Vec::new(),
    };

    // an empty baseline (no previous report, or a clean one) falls out of
    // classification naturally: no keys to match means everything is new
    let (existing, new) = classify(&prev_rows, current.link_rows());

    log::debug!(
        "diff against {}: {} new, {} existing",
        current.report_id,
        new.len(),
        existing.len()
    );

    Ok(ReportDiff {
        new,
        existing,
        report_id: current.report_id,
        report_date: current.report_date,
    })
}

/// Diff the two most recent reports.
///
/// Zero stored reports is its own failure (`NoReportData`), distinct
/// from having exactly one (`InsufficientData`).
pub fn diff_latest(store: &Store) -> Result<ReportDiff, StoreError> {
    let history = History::new(store);

    match history.latest_two() {
        Ok((prev, recent)) => diff_reports(store, Some(prev.report_id), recent.report_id),
        Err(StoreError::InsufficientData) => match history.latest() {
            Ok(_) => Err(StoreError::InsufficientData),
            Err(StoreError::NotFound) => Err(StoreError::NoReportData),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    }
}

//! Domain model for broken-link reports.
//!
//! A report is a point-in-time snapshot of every broken hyperlink found
//! across a fleet of repositories. Reports are immutable once stored; the
//! store hands out `ReportSnapshot` values rebuilt from flat rows.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque report identifier. Assigned by the store at persist time;
/// clients never supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    pub(crate) fn generate() -> Self {
        ReportId(Uuid::new_v4())
    }

    pub fn parse(input: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(input).map(ReportId)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for ReportId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for ReportId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            Uuid::parse_str(text)
                .map(ReportId)
                .map_err(|e| FromSqlError::Other(Box::new(e)))
        })
    }
}

/// One broken hyperlink: where it was found and what it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    /// Repo-relative path of the file containing the link.
    pub file: String,
    /// The target that failed.
    pub url: String,
    /// HTTP status observed when the link was checked.
    pub status_code: u16,
}

/// All broken links found in a single repository. A repo with an empty
/// link list is a clean repo, which is still worth recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLinks {
    pub repo_name: String,
    pub repo_url: String,
    pub broken_links: Vec<BrokenLink>,
}

/// Incoming report payload, as the link-check producer submits it.
/// No id: the store assigns one on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmission {
    #[serde(rename = "report")]
    pub repos: Vec<RepoLinks>,
    pub report_date: NaiveDateTime,
}

/// A stored report, grouped by repository in name order.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    pub report_id: ReportId,
    pub report_date: NaiveDateTime,
    #[serde(rename = "report")]
    pub repos: Vec<RepoLinks>,
}

impl ReportSnapshot {
    /// Rebuild the grouped report from flat link rows.
    ///
    /// Rows sharing a repo name fold into one `RepoLinks`; every row in a
    /// group carries the same repo_url by construction, so the first
    /// member's value is taken. Groups come out ordered by repo name.
    /// A report with zero rows is an empty report, not a missing one.
    pub fn from_rows(report_id: ReportId, report_date: NaiveDateTime, rows: Vec<LinkRow>) -> Self {
        let mut groups: BTreeMap<String, RepoLinks> = BTreeMap::new();

        for row in rows {
            let group = groups.entry(row.repo_name.clone()).or_insert_with(|| RepoLinks {
                repo_name: row.repo_name.clone(),
                repo_url: row.repo_url.clone(),
                broken_links: Vec::new(),
            });

            group.broken_links.push(BrokenLink {
                file: row.file,
                url: row.url,
                status_code: row.status_code,
            });
        }

        ReportSnapshot {
            report_id,
            report_date,
            repos: groups.into_values().collect(),
        }
    }

    /// Flatten back into rows, for diffing and delimited export.
    pub fn link_rows(&self) -> Vec<LinkRow> {
        self.repos
            .iter()
            .flat_map(|repo| {
                repo.broken_links.iter().map(move |link| LinkRow {
                    repo_name: repo.repo_name.clone(),
                    repo_url: repo.repo_url.clone(),
                    file: link.file.clone(),
                    url: link.url.clone(),
                    status_code: link.status_code,
                })
            })
            .collect()
    }

    pub fn link_count(&self) -> usize {
        self.repos.iter().map(|r| r.broken_links.len()).sum()
    }
}

/// Identity of a broken link across reports.
///
/// `url` and `status_code` are payload, not identity: a link whose status
/// code changed between runs is still the same broken link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub repo_name: String,
    pub repo_url: String,
    pub file: String,
}

/// Flat persisted shape of one broken link, as stored and as rendered in
/// diff output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRow {
    pub repo_name: String,
    pub repo_url: String,
    pub file: String,
    pub url: String,
    pub status_code: u16,
}

impl LinkRow {
    pub fn key(&self) -> LinkKey {
        LinkKey {
            repo_name: self.repo_name.clone(),
            repo_url: self.repo_url.clone(),
            file: self.file.clone(),
        }
    }
}

/// One line of `report --list` output: which reports exist and when.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub report_id: ReportId,
    pub report_date: NaiveDateTime,
}

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{LinkRow, ReportId, ReportSnapshot, ReportSubmission, ReportSummary};
use crate::store::history::History;
use crate::store::StoreError;

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    // report_date is UNIQUE at the schema level: the pre-check in save()
    // is not race-free on its own, the constraint is what actually
    // serializes two submissions for the same timestamp.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS reports (
            report_id TEXT PRIMARY KEY,
            report_date TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            report_id TEXT NOT NULL,
            repo_name TEXT NOT NULL,
            repo_url TEXT NOT NULL,
            file TEXT NOT NULL,
            url TEXT NOT NULL,
            status_code INTEGER NOT NULL,
            FOREIGN KEY(report_id) REFERENCES reports(report_id) ON DELETE CASCADE,
            UNIQUE(report_id, repo_name, repo_url, file)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_links_report_id ON links(report_id)",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command, reuse across all operations.
///
/// Constructor-injected: every store lives on its own connection, there
/// is no process-wide engine, and tests get isolated databases for free.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// True iff a report header with this id is present.
    pub fn exists(&self, report_id: ReportId) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM reports WHERE report_id = ?1 LIMIT 1",
                params![report_id],
                |_| Ok(()),
            )
            .optional()?;

        Ok(found.is_some())
    }

    /// True iff any report header has exactly this timestamp.
    pub fn exists_for_date(&self, report_date: NaiveDateTime) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM reports WHERE report_date = ?1 LIMIT 1",
                params![report_date],
                |_| Ok(()),
            )
            .optional()?;

        Ok(found.is_some())
    }

    /// Save a submitted report as a new immutable snapshot.
    ///
    /// Assigns a fresh id and writes the header plus all link rows in one
    /// transaction; a crash mid-save leaves nothing behind. Fails with
    /// `DuplicateTimestamp` when a report already holds this date.
    pub fn save(&mut self, submission: &ReportSubmission) -> Result<ReportId, StoreError> {
        History::new(self).ensure_date_unused(submission.report_date)?;

        let report_id = ReportId::generate();
        let report_date = submission.report_date;

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO reports (report_id, report_date) VALUES (?1, ?2)",
            params![report_id, report_date],
        )
        .map_err(|e| map_date_conflict(e, report_date))?;

        let mut stmt = tx.prepare_cached(
            "INSERT INTO links (report_id, repo_name, repo_url, file, url, status_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        let mut link_count = 0usize;
        for repo in &submission.repos {
            for link in &repo.broken_links {
                stmt.execute(params![
                    report_id,
                    repo.repo_name,
                    repo.repo_url,
                    link.file,
                    link.url,
                    link.status_code
                ])?;
                link_count += 1;
            }
        }

        drop(stmt);
        tx.commit()?;

        log::debug!("saved report {report_id} ({report_date}) with {link_count} broken links");
        Ok(report_id)
    }

    /// Load a report by id, grouped by repository in name order.
    ///
    /// A header with zero link rows loads as an empty report; only a
    /// missing header is `NotFound`.
    pub fn load(&self, report_id: ReportId) -> Result<ReportSnapshot, StoreError> {
        let report_date: Option<NaiveDateTime> = self
            .conn
            .query_row(
                "SELECT report_date FROM reports WHERE report_id = ?1",
                params![report_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(report_date) = report_date else {
            return Err(StoreError::NotFound);
        };

        let rows = self.link_rows(report_id)?;
        Ok(ReportSnapshot::from_rows(report_id, report_date, rows))
    }

    /// Flat link rows for one report, ordered by repo name then file.
    pub fn link_rows(&self, report_id: ReportId) -> Result<Vec<LinkRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT repo_name, repo_url, file, url, status_code
             FROM links
             WHERE report_id = ?1
             ORDER BY repo_name, file",
        )?;

        let rows = stmt
            .query_map(params![report_id], |row| {
                Ok(LinkRow {
                    repo_name: row.get(0)?,
                    repo_url: row.get(1)?,
                    file: row.get(2)?,
                    url: row.get(3)?,
                    status_code: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Delete one report and its link rows. Deleting an id that is not
    /// present is a no-op; other reports are never touched.
    pub fn delete(&mut self, report_id: ReportId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        // links go via ON DELETE CASCADE
        let removed = tx.execute(
            "DELETE FROM reports WHERE report_id = ?1",
            params![report_id],
        )?;
        tx.commit()?;

        if removed == 0 {
            log::debug!("delete: report {report_id} was not present");
        } else {
            log::debug!("deleted report {report_id}");
        }
        Ok(())
    }

    /// All stored reports, most recent first.
    pub fn list_summaries(&self) -> Result<Vec<ReportSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT report_id, report_date
             FROM reports
             ORDER BY report_date DESC",
        )?;

        let summaries = stmt
            .query_map([], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// The most recent report, if any exist.
    pub fn latest(&self) -> Result<Option<ReportSummary>, StoreError> {
        let summary = self
            .conn
            .query_row(
                "SELECT report_id, report_date
                 FROM reports
                 ORDER BY report_date DESC
                 LIMIT 1",
                [],
                summary_from_row,
            )
            .optional()?;

        Ok(summary)
    }

    /// The two most recent reports as (previous, recent), or None when
    /// fewer than two exist.
    pub fn latest_two(&self) -> Result<Option<(ReportSummary, ReportSummary)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT report_id, report_date
             FROM reports
             ORDER BY report_date DESC
             LIMIT 2",
        )?;

        let mut newest_first = stmt
            .query_map([], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        // popping newest-last order yields (previous, recent)
        let (Some(prev), Some(recent)) = (newest_first.pop(), newest_first.pop()) else {
            return Ok(None);
        };
        Ok(Some((prev, recent)))
    }

    /// Wipe every report. Reset tooling only.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM links", [])?;
        tx.execute("DELETE FROM reports", [])?;
        tx.commit()?;

        log::debug!("cleared all report data");
        Ok(())
    }
}

fn summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<ReportSummary> {
    Ok(ReportSummary {
        report_id: row.get(0)?,
        report_date: row.get(1)?,
    })
}

/// Losing the race on the report_date UNIQUE constraint is the duplicate
/// case, not a transport fault.
fn map_date_conflict(err: rusqlite::Error, report_date: NaiveDateTime) -> StoreError {
    let is_date_conflict = matches!(
        &err,
        rusqlite::Error::SqliteFailure(e, Some(message))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && message.contains("reports.report_date")
    );

    if is_date_conflict {
        StoreError::DuplicateTimestamp(report_date)
    } else {
        StoreError::Storage(err)
    }
}

//! SQLite report storage.
//!
//! Persists broken-link reports to a local SQLite database with two tables:
//! - reports: report_id, report_date (unique)
//! - links: report_id, repo_name, repo_url, file, url, status_code
//!
//! Supports:
//! - Atomic save of a report (header + all link rows in one transaction)
//! - Reconstructing a report grouped by repository
//! - Listing report history, newest first
//! - Diffing the two most recent reports

pub mod diff;
pub mod history;
pub mod report;

pub use report::Store;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Every way a store or diff operation can come back empty-handed.
///
/// The first four variants are expected outcomes the caller must branch
/// on; `Storage` is a transport fault and is not recovered locally.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A report already exists with this exact timestamp. Corrections go
    /// in as a new report with a new timestamp, never as an overwrite.
    #[error("a report already exists for {0}")]
    DuplicateTimestamp(NaiveDateTime),

    /// No report with the requested id.
    #[error("report not found")]
    NotFound,

    /// Fewer than two reports stored; there is nothing to compare yet.
    #[error("need at least two reports to compare")]
    InsufficientData,

    /// A diff was requested but no report data exists at all.
    #[error("no report data stored")]
    NoReportData,

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

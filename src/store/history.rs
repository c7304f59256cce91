//! Report lifecycle guard.
//!
//! Ingestion and diffing both ask "what is the newest report?" and "is
//! this timestamp taken?"; this wraps the store's raw queries in typed
//! errors so every empty/short-history case has to be branched on.

use chrono::NaiveDateTime;

use crate::model::ReportSummary;
use crate::store::{Store, StoreError};

pub struct History<'a> {
    store: &'a Store,
}

impl<'a> History<'a> {
    pub fn new(store: &'a Store) -> Self {
        History { store }
    }

    /// The most recent report; `NotFound` when nothing is stored.
    pub fn latest(&self) -> Result<ReportSummary, StoreError> {
        self.store.latest()?.ok_or(StoreError::NotFound)
    }

    /// The two most recent reports as (previous, recent).
    ///
    /// `InsufficientData` until at least two reports exist; callers never
    /// see a partial pair.
    pub fn latest_two(&self) -> Result<(ReportSummary, ReportSummary), StoreError> {
        self.store.latest_two()?.ok_or(StoreError::InsufficientData)
    }

    /// One report per timestamp: rejects a date that is already taken.
    /// The schema-level UNIQUE constraint backs this up under races.
    pub fn ensure_date_unused(&self, report_date: NaiveDateTime) -> Result<(), StoreError> {
        if self.store.exists_for_date(report_date)? {
            return Err(StoreError::DuplicateTimestamp(report_date));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReportSubmission;

    fn date(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn empty_submission(datestamp: &str) -> ReportSubmission {
        ReportSubmission {
            repos: Vec::new(),
            report_date: date(datestamp),
        }
    }

    #[test]
    fn latest_on_an_empty_store_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = History::new(&store).latest().unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn latest_two_needs_two_reports() {
        let mut store = Store::open_in_memory().unwrap();

        let history = History::new(&store);
        assert!(matches!(
            history.latest_two().unwrap_err(),
            StoreError::InsufficientData
        ));

        store.save(&empty_submission("2023-03-14T14:15:34")).unwrap();
        let history = History::new(&store);
        assert!(matches!(
            history.latest_two().unwrap_err(),
            StoreError::InsufficientData
        ));

        store.save(&empty_submission("2023-03-20T10:00:00")).unwrap();
        let history = History::new(&store);
        let (prev, recent) = history.latest_two().unwrap();
        assert_eq!(prev.report_date, date("2023-03-14T14:15:34"));
        assert_eq!(recent.report_date, date("2023-03-20T10:00:00"));
    }

    #[test]
    fn ensure_date_unused_flags_a_taken_timestamp() {
        let mut store = Store::open_in_memory().unwrap();
        store.save(&empty_submission("2023-03-14T14:15:34")).unwrap();

        let history = History::new(&store);
        assert!(history.ensure_date_unused(date("2023-03-20T10:00:00")).is_ok());
        assert!(matches!(
            history.ensure_date_unused(date("2023-03-14T14:15:34")).unwrap_err(),
            StoreError::DuplicateTimestamp(_)
        ));
    }
}

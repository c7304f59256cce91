use chrono::NaiveDateTime;
use tempfile::TempDir;

use linkledger::model::{BrokenLink, RepoLinks, ReportSubmission};
use linkledger::store::diff;
use linkledger::store::{Store, StoreError};

fn date(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").unwrap()
}

fn libx(files: &[&str]) -> RepoLinks {
    RepoLinks {
        repo_name: "libx".to_string(),
        repo_url: "https://example.com/libx".to_string(),
        broken_links: files
            .iter()
            .map(|file| BrokenLink {
                file: file.to_string(),
                url: format!("https://dead.example.com/{file}"),
                status_code: 404,
            })
            .collect(),
    }
}

fn submission(datestamp: &str, repos: Vec<RepoLinks>) -> ReportSubmission {
    ReportSubmission {
        repos,
        report_date: date(datestamp),
    }
}

#[test]
fn full_cycle_ingest_list_diff_on_disk() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("ledger.db");

    let mut store = Store::open(&db_path).unwrap();

    let first = store
        .save(&submission(
            "2023-03-14T14:15:34",
            vec![libx(&["a.md", "b.md"])],
        ))
        .unwrap();
    let second = store
        .save(&submission(
            "2023-03-20T10:00:00",
            vec![libx(&["a.md", "c.md"])],
        ))
        .unwrap();

    let summaries = store.list_summaries().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].report_id, second);
    assert_eq!(summaries[1].report_id, first);

    let diff = diff::diff_latest(&store).unwrap();
    assert_eq!(diff.report_id, second);

    let existing: Vec<&str> = diff.existing.iter().map(|r| r.file.as_str()).collect();
    let new: Vec<&str> = diff.new.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(existing, vec!["a.md"]);
    assert_eq!(new, vec!["c.md"]);
    // b.md was fixed since the first report: it appears in neither set
    assert!(!existing.contains(&"b.md"));
    assert!(!new.contains(&"b.md"));
}

#[test]
fn reports_survive_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("ledger.db");

    let id = {
        let mut store = Store::open(&db_path).unwrap();
        store
            .save(&submission("2023-03-14T14:15:34", vec![libx(&["a.md"])]))
            .unwrap()
    };

    let store = Store::open(&db_path).unwrap();
    let snapshot = store.load(id).unwrap();
    assert_eq!(snapshot.report_date, date("2023-03-14T14:15:34"));
    assert_eq!(snapshot.link_count(), 1);
}

#[test]
fn duplicate_timestamp_rejected_across_connections() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("ledger.db");

    {
        let mut store = Store::open(&db_path).unwrap();
        store
            .save(&submission("2023-03-14T14:15:34", vec![libx(&["a.md"])]))
            .unwrap();
    }

    let mut store = Store::open(&db_path).unwrap();
    let err = store
        .save(&submission("2023-03-14T14:15:34", Vec::new()))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateTimestamp(_)));
    assert_eq!(store.list_summaries().unwrap().len(), 1);
}

#[test]
fn clear_all_then_diff_reports_no_data() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("ledger.db");

    let mut store = Store::open(&db_path).unwrap();
    store
        .save(&submission("2023-03-14T14:15:34", vec![libx(&["a.md"])]))
        .unwrap();
    store
        .save(&submission("2023-03-20T10:00:00", vec![libx(&["a.md"])]))
        .unwrap();

    store.clear_all().unwrap();

    let err = diff::diff_latest(&store).unwrap_err();
    assert!(matches!(err, StoreError::NoReportData));
}

#![forbid(unsafe_code)]

use chrono::NaiveDate;
use covertype::history::export;
use covertype::{
    BatchRecord, ExportFormat, FixedClock, HistoryFile, HistoryKind, HistoryQuery,
    HistoryRepository, HistoryStore, JsonFileRepository, MemoryRepository, SingleRecord,
};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::tempdir;

fn single(name: &str, confidence: f64) -> SingleRecord {
    SingleRecord {
        prediction_name: Some(name.to_owned()),
        confidence: Some(confidence),
        ..SingleRecord::default()
    }
}

fn file_store(dir: &std::path::Path, cap: usize) -> HistoryStore {
    let repo = JsonFileRepository::new(dir.join("dataset/history.json"), dir.join("dataset/history_backup"));
    HistoryStore::new(Box::new(repo), cap)
}

#[test]
fn appended_aspen_record_is_found_by_text() {
    let dir = tempdir().unwrap();
    let mut store = file_store(dir.path(), 5000);
    store.append(single("Aspen", 81.0)).unwrap();
    store.append(single("Krummholz", 64.0)).unwrap();
    store.append(BatchRecord::new("plots.csv", 2, vec![1, 7])).unwrap();

    let found = store.query(HistoryKind::Single, &HistoryQuery::default().text("Aspen"));
    assert_eq!(found.len(), 1);
    match &found[0] {
        covertype::HistoryRecord::Single(record) => assert_eq!(record.prediction_name.as_deref(), Some("Aspen")),
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn appends_survive_a_new_process() {
    let dir = tempdir().unwrap();
    {
        let mut store = file_store(dir.path(), 5000);
        store.append(single("Aspen", 81.0)).unwrap();
    }
    let mut reopened = file_store(dir.path(), 5000);
    assert_eq!(reopened.load().single.len(), 1);
    assert!(reopened.load().single[0].timestamp.is_some());
}

#[test]
fn load_twice_is_identical() {
    let dir = tempdir().unwrap();
    let mut writer = file_store(dir.path(), 5000);
    writer.append(single("Aspen", 81.0)).unwrap();
    writer.append(BatchRecord::new("plots.csv", 3, vec![5, 5, 2])).unwrap();

    let repo = JsonFileRepository::new(
        dir.path().join("dataset/history.json"),
        dir.path().join("dataset/history_backup"),
    );
    assert_eq!(repo.load(), repo.load());

    let mut store = file_store(dir.path(), 5000);
    let first = store.load().clone();
    assert_eq!(&first, store.load());
}

#[test]
fn retention_cap_keeps_the_most_recent_five_thousand() {
    let repo = Arc::new(MemoryRepository::default());
    let mut store = HistoryStore::new(Box::new(SharedRepo(repo.clone())), 5000);
    for rows in 0..5003 {
        store.append(BatchRecord::new("f.csv", rows, Vec::new())).unwrap();
    }

    let saved = repo.snapshot();
    assert_eq!(saved.batch.len(), 5000);
    assert_eq!(saved.batch.first().and_then(|r| r.rows), Some(3));
    assert_eq!(saved.batch.last().and_then(|r| r.rows), Some(5002));
}

/// Lets a test keep a handle on the repository the store owns.
struct SharedRepo(Arc<MemoryRepository>);

impl HistoryRepository for SharedRepo {
    fn load(&self) -> HistoryFile {
        self.0.load()
    }

    fn save(&self, file: &HistoryFile) -> Result<(), covertype::HistoryError> {
        self.0.save(file)
    }
}

#[test]
fn corrupt_history_is_quarantined_and_reset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset/history.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"single": "oops"}"#).unwrap();

    let at = NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let repo = JsonFileRepository::new(&path, dir.path().join("dataset/history_backup"))
        .with_clock(Arc::new(FixedClock(at)));
    let mut store = HistoryStore::new(Box::new(repo), 5000);

    assert_eq!(store.load(), &HistoryFile::default());
    let backup = dir
        .path()
        .join("dataset/history_backup/history_corrupt_20240701_093000.json");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), r#"{"single": "oops"}"#);

    // The store keeps working after recovery.
    store.append(single("Aspen", 90.0)).unwrap();
    assert!(path.exists());
}

#[test]
fn json_export_round_trips_query_results() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset/history.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let legacy = serde_json::json!({
        "timestamp": "2023-03-03 03:03:03",
        "path": null,
        "prediction_name": null,
        "confidence": 42.0,
        "inputs": {"elevation": 2100}
    });
    std::fs::write(&path, serde_json::json!({"single": [legacy.clone()]}).to_string()).unwrap();

    let mut store = file_store(dir.path(), 5000);
    let mut with_extra = single("Douglas-fir", 55.5);
    with_extra
        .extra
        .insert("notes".into(), serde_json::json!({"plot": 12}));
    store.append(with_extra).unwrap();
    store.append(single("Aspen", 70.0)).unwrap();

    let records = store.query(HistoryKind::Single, &HistoryQuery::default());
    let bytes = export(&records, ExportFormat::Json).unwrap();
    let parsed: Vec<SingleRecord> = serde_json::from_slice(&bytes).unwrap();

    let queried: Vec<SingleRecord> = records
        .into_iter()
        .map(|r| match r {
            covertype::HistoryRecord::Single(s) => s,
            covertype::HistoryRecord::Batch(_) => unreachable!(),
        })
        .collect();
    assert_eq!(parsed, queried);

    let exported: Vec<serde_json::Value> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported[2], legacy);
}

#[test]
fn csv_export_covers_mixed_records() {
    let mut store = HistoryStore::new(Box::new(MemoryRepository::default()), 5000);
    store.append(BatchRecord::new("a.csv", 1, vec![3])).unwrap();
    let mut tagged = BatchRecord::new("b.csv", 2, vec![1, 2]);
    tagged.extra.insert("operator".into(), "kim".into());
    store.append(tagged).unwrap();

    let records = store.query(HistoryKind::Batch, &HistoryQuery::default());
    let csv = String::from_utf8(export(&records, ExportFormat::Csv).unwrap()).unwrap();
    let rows = covertype::tabular::parse(&csv).unwrap();

    let op = rows[0].iter().position(|h| h == "operator").unwrap();
    let preview = rows[0].iter().position(|h| h == "predictions_preview").unwrap();
    assert_eq!(rows[1][op], "kim");
    assert_eq!(rows[2][op], "");
    assert_eq!(rows[1][preview], "[1,2]");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn cap_keeps_newest(cap in 1usize..20, appends in 0usize..60) {
        let mut store = HistoryStore::new(Box::new(MemoryRepository::default()), cap);
        for rows in 0..appends {
            store.append(BatchRecord::new("f.csv", rows, Vec::new())).unwrap();
        }
        let kept: Vec<usize> = store.load().batch.iter().filter_map(|r| r.rows).collect();
        let expected: Vec<usize> = (appends.saturating_sub(cap)..appends).collect();
        prop_assert_eq!(kept, expected);
    }
}

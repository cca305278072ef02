//! Integration tests for file-backed record sources.
//!
//! Each scenario writes a JSONL file, opens it as a `FileStorage` and pulls
//! a cursor to exhaustion.

use futures::stream::StreamExt;
use ndtable::{Cursor, CursorState, FileStorage, Query, Record, RecordSource, ScanConfig};
use rstest::rstest;
use serde_json::{Value, json};
use std::pin::pin;
use tempfile::TempDir;

mod common;
use common::{CITIES, write_data};

async fn collect(path: &std::path::Path, query: Query) -> (Vec<Record>, usize) {
    let storage = FileStorage::open(path).await.unwrap();
    let mut cursor = storage.query(query);
    let mut records = Vec::new();
    while let Some(record) = cursor.next().await.unwrap() {
        records.push(record);
    }
    (records, cursor.position())
}

fn ids(records: &[Record]) -> Vec<Value> {
    records.iter().map(|r| r["id"].clone()).collect()
}

#[tokio::test]
async fn filter_by_field_value() {
    let dir = TempDir::new().unwrap();
    let path = write_data(&dir, "storage.dat", CITIES);

    let (records, position) = collect(&path, Query::new().with("city", "Roma")).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0], json!({"city": "Roma", "id": 1}));
    assert_eq!(records[1], json!({"city": "Roma", "id": 3}));
    assert_eq!(position, 3);
}

#[tokio::test]
async fn empty_query_yields_every_line_in_order() {
    let dir = TempDir::new().unwrap();
    let path = write_data(&dir, "storage.dat", CITIES);

    let (records, position) = collect(&path, Query::all()).await;
    assert_eq!(ids(&records), vec![json!(1), json!(2), json!(3)]);
    assert_eq!(position, 3);
}

#[tokio::test]
async fn malformed_only_line_fails_first_pull() {
    let dir = TempDir::new().unwrap();
    let path = write_data(&dir, "bad.jsonl", "{bad json");

    let storage = FileStorage::open(&path).await.unwrap();
    let mut cursor = storage.query(Query::all());

    let err = cursor.next().await.unwrap_err();
    assert!(err.is_parse());
    assert_eq!(cursor.state(), CursorState::Failed);
    assert!(cursor.next().await.unwrap().is_none());
}

#[tokio::test]
async fn empty_file_is_immediately_exhausted() {
    let dir = TempDir::new().unwrap();
    let path = write_data(&dir, "empty.jsonl", "");

    let storage = FileStorage::open(&path).await.unwrap();
    let mut cursor = storage.query(Query::all());

    assert!(cursor.next().await.unwrap().is_none());
    assert_eq!(cursor.state(), CursorState::Exhausted);
    assert_eq!(cursor.position(), 0);
}

#[tokio::test]
async fn records_missing_the_field_never_match() {
    let dir = TempDir::new().unwrap();
    let path = write_data(
        &dir,
        "sparse.jsonl",
        "{\"id\":1,\"city\":\"Roma\",\"zip\":100}\n{\"id\":2,\"zip\":100}\n{\"id\":3,\"city\":\"Roma\"}\n",
    );

    let (records, position) = collect(&path, Query::new().with("zip", 100)).await;
    assert_eq!(ids(&records), vec![json!(1)]);
    assert_eq!(position, 3);

    let (records, _) = collect(&path, Query::new().with("city", "Roma").with("zip", 100)).await;
    assert_eq!(ids(&records), vec![json!(1)]);
}

#[rstest]
#[case::array("[1,2]")]
#[case::number("42")]
#[case::null("null")]
#[tokio::test]
async fn non_object_lines_only_pass_the_empty_query(#[case] line: &str) {
    let dir = TempDir::new().unwrap();
    let content = format!("{{\"city\":\"Roma\",\"id\":1}}\n{line}\n{{\"city\":\"Roma\",\"id\":3}}\n");
    let path = write_data(&dir, "mixed.jsonl", &content);

    let (records, position) = collect(&path, Query::new().with("city", "Roma")).await;
    assert_eq!(ids(&records), vec![json!(1), json!(3)]);
    assert_eq!(position, 3);

    let (records, position) = collect(&path, Query::all()).await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[1], serde_json::from_str::<Value>(line).unwrap());
    assert_eq!(position, 3);
}

#[rstest]
#[case::lf("{\"id\":1}\n{\"id\":2}\n")]
#[case::crlf("{\"id\":1}\r\n{\"id\":2}\r\n")]
#[case::no_final_newline("{\"id\":1}\r\n{\"id\":2}")]
#[tokio::test]
async fn line_endings_do_not_matter(#[case] content: &str) {
    let dir = TempDir::new().unwrap();
    let path = write_data(&dir, "data.jsonl", content);

    let (records, position) = collect(&path, Query::all()).await;
    assert_eq!(ids(&records), vec![json!(1), json!(2)]);
    assert_eq!(position, 2);
}

#[tokio::test]
async fn matched_records_carry_query_values() {
    let dir = TempDir::new().unwrap();
    let mut content = String::new();
    for i in 0..500 {
        let kind = ["a", "b", "c"][i % 3];
        let flag = i % 2 == 0;
        content.push_str(&format!("{{\"id\":{i},\"kind\":\"{kind}\",\"flag\":{flag}}}\n"));
    }
    let path = write_data(&dir, "many.jsonl", &content);

    let query = Query::new().with("kind", "b").with("flag", true);
    let (records, position) = collect(&path, query.clone()).await;

    assert_eq!(position, 500);
    assert!(!records.is_empty());
    for record in &records {
        assert!(query.matches(record));
        assert_eq!(record["kind"], json!("b"));
        assert_eq!(record["flag"], json!(true));
    }
    let seen: Vec<u64> = records.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "order must be preserved");
}

#[tokio::test]
async fn cursor_stream_matches_pull_loop() {
    let dir = TempDir::new().unwrap();
    let path = write_data(&dir, "storage.dat", CITIES);

    let storage = FileStorage::open(&path).await.unwrap();
    let cursor = storage.query(Query::new().with("city", "Roma"));
    let records: Vec<Record> = pin!(cursor.into_stream())
        .map(|r| r.expect("all lines are valid"))
        .collect()
        .await;

    assert_eq!(ids(&records), vec![json!(1), json!(3)]);
}

#[tokio::test]
async fn independent_scans_each_see_the_whole_file() {
    let dir = TempDir::new().unwrap();
    let path = write_data(&dir, "storage.dat", CITIES);
    let config = ScanConfig::default();

    let roma = ndtable::scan(&path, Query::new().with("city", "Roma"), &config)
        .await
        .unwrap();
    let milano = ndtable::scan(&path, Query::new().with("city", "Milano"), &config)
        .await
        .unwrap();

    let roma = pin!(roma);
    let milano = pin!(milano);
    let (roma, milano) =
        futures::join!(roma.collect::<Vec<_>>(), milano.collect::<Vec<_>>());

    assert_eq!(roma.len(), 2);
    assert_eq!(milano.len(), 1);
    assert!(roma.iter().chain(&milano).all(Result::is_ok));
}

#[tokio::test]
async fn scan_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = ScanConfig::default();
    let result = ndtable::scan(dir.path().join("absent.jsonl"), Query::all(), &config)
    .await;
    assert!(result.is_err_and(|err| err.is_open()));
}

#[cfg(unix)]
#[tokio::test]
async fn stalled_read_times_out_and_fails_cursor() {
    use std::io::Write;
    use std::process::Command;
    use std::sync::mpsc;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stalled.fifo");
    let status = Command::new("mkfifo").arg(&path).status().unwrap();
    assert!(status.success());

    // The writer sends part of a line, then holds the pipe open until told to stop.
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let writer_path = path.clone();
    let writer = std::thread::spawn(move || {
        let mut fifo = std::fs::OpenOptions::new()
            .write(true)
            .open(&writer_path)
            .unwrap();
        fifo.write_all(b"{\"id\":1").unwrap();
        fifo.flush().unwrap();
        let _ = done_rx.recv();
    });

    let config = ScanConfig {
        read_timeout_ms: Some(50),
        ..ScanConfig::default()
    };
    let storage = FileStorage::open_with(&path, &config).await.unwrap();
    let mut cursor = storage.query(Query::all());

    let err = cursor.next().await.unwrap_err();
    assert!(err.is_stream());
    assert!(!err.is_parse());
    assert_eq!(err.line_number(), Some(1));
    assert_eq!(cursor.state(), CursorState::Failed);
    assert_eq!(cursor.position(), 0);
    assert!(storage.is_closed().await);
    assert!(cursor.next().await.unwrap().is_none());

    done_tx.send(()).unwrap();
    writer.join().unwrap();
}

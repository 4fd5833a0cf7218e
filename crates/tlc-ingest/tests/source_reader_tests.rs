//! Source reader tests against a mocked HTTP archive
//!
//! These tests exercise the fetch + decode path end to end: gzip payloads,
//! batch sizing, order preservation, restartability, and the fatal error
//! cases (missing resource, coercion failure mid-run).

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use tlc_common::IngestError;
use tlc_ingest::record::Value;
use tlc_ingest::schema::{Column, ColumnType, TableSchema};
use tlc_ingest::source::SourceReader;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_schema() -> TableSchema {
    TableSchema::new(vec![
        Column::new("id", ColumnType::Integer),
        Column::new("amount", ColumnType::Float),
        Column::new("note", ColumnType::Text),
    ])
    .unwrap()
}

/// CSV body with `rows` data rows: id = 1..=rows
fn csv_body(rows: usize) -> String {
    let mut body = String::from("id,amount,note\n");
    for i in 1..=rows {
        body.push_str(&format!("{},{}.5,note{}\n", i, i, i));
    }
    body
}

fn gzip(content: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

async fn serve(server: &MockServer, route: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_batches_from_gzip_source() {
    let server = MockServer::start().await;
    serve(&server, "/data.csv.gz", gzip(&csv_body(250))).await;

    let url = format!("{}/data.csv.gz", server.uri());
    let reader = SourceReader::new(url, test_schema(), 100).unwrap();
    let mut batches = reader.read().await.unwrap();

    // 250 rows at chunk 100: two full batches plus a 50-row tail
    let b0 = batches.next_batch().unwrap().unwrap();
    assert_eq!((b0.index, b0.len()), (0, 100));
    assert_eq!(b0.rows[0].values[0], Value::Integer(Some(1)));

    let b1 = batches.next_batch().unwrap().unwrap();
    assert_eq!((b1.index, b1.len()), (1, 100));
    assert_eq!(b1.rows[0].values[0], Value::Integer(Some(101)));

    let b2 = batches.next_batch().unwrap().unwrap();
    assert_eq!((b2.index, b2.len()), (2, 50));
    assert_eq!(b2.rows[49].values[0], Value::Integer(Some(250)));

    assert!(batches.next_batch().unwrap().is_none());
}

#[tokio::test]
async fn test_plain_csv_source() {
    // The zone lookup file is served uncompressed; the reader must not
    // require gzip.
    let server = MockServer::start().await;
    serve(&server, "/lookup.csv", csv_body(3).into_bytes()).await;

    let url = format!("{}/lookup.csv", server.uri());
    let reader = SourceReader::new(url, test_schema(), 10).unwrap();
    let mut batches = reader.read().await.unwrap();

    let batch = batches.next_batch().unwrap().unwrap();
    assert_eq!(batch.len(), 3);
    assert!(batches.next_batch().unwrap().is_none());
}

#[tokio::test]
async fn test_read_is_restartable() {
    let server = MockServer::start().await;
    serve(&server, "/data.csv.gz", gzip(&csv_body(5))).await;

    let url = format!("{}/data.csv.gz", server.uri());
    let reader = SourceReader::new(url, test_schema(), 2).unwrap();

    // An exhausted sequence is never reused; a fresh read() re-fetches and
    // yields the full sequence again.
    for _ in 0..2 {
        let mut batches = reader.read().await.unwrap();
        let mut total = 0;
        while let Some(batch) = batches.next_batch().unwrap() {
            total += batch.len();
        }
        assert_eq!(total, 5);
    }
}

#[tokio::test]
async fn test_empty_source_yields_no_batches() {
    let server = MockServer::start().await;
    serve(&server, "/empty.csv.gz", gzip("id,amount,note\n")).await;

    let url = format!("{}/empty.csv.gz", server.uri());
    let reader = SourceReader::new(url, test_schema(), 100).unwrap();
    let mut batches = reader.read().await.unwrap();
    assert!(batches.next_batch().unwrap().is_none());
}

#[tokio::test]
async fn test_missing_resource_is_fetch_error() {
    let server = MockServer::start().await;

    let url = format!("{}/absent.csv.gz", server.uri());
    let reader = SourceReader::new(url, test_schema(), 100).unwrap();
    let err = reader.read().await.unwrap_err();
    assert!(matches!(err, IngestError::Fetch(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_coercion_failure_in_second_batch() {
    // Bad value lands in batch 2 (rows 101..=200): batch 1 decodes fine,
    // batch 2 fails the run.
    let mut body = String::from("id,amount,note\n");
    for i in 1..=250 {
        if i == 150 {
            body.push_str("oops,1.5,bad\n");
        } else {
            body.push_str(&format!("{},{}.5,note{}\n", i, i, i));
        }
    }

    let server = MockServer::start().await;
    serve(&server, "/data.csv.gz", gzip(&body)).await;

    let url = format!("{}/data.csv.gz", server.uri());
    let reader = SourceReader::new(url, test_schema(), 100).unwrap();
    let mut batches = reader.read().await.unwrap();

    let b0 = batches.next_batch().unwrap().unwrap();
    assert_eq!(b0.len(), 100);

    let err = batches.next_batch().unwrap_err();
    match err {
        IngestError::TypeCoercion { column, line, .. } => {
            assert_eq!(column, "id");
            // Header is line 1; row 150 is source line 151
            assert_eq!(line, 151);
        }
        other => panic!("expected coercion error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_header_mismatch_is_config_error() {
    let server = MockServer::start().await;
    serve(&server, "/data.csv.gz", gzip("id,amount\n1,1.5\n")).await;

    let url = format!("{}/data.csv.gz", server.uri());
    let reader = SourceReader::new(url, test_schema(), 100).unwrap();
    let err = reader.read().await.unwrap_err();
    assert!(matches!(err, IngestError::Config(_)));
}

//! Integration tests for the export pipeline
//!
//! These tests run the real coercion and JSON file writer against mock
//! extractors and uploaders.

use chrono::NaiveDate;
use eyre::{Result, eyre};
use pg_ftp_export::etl::{Extractor, Pipeline, Uploader};
use pg_ftp_export::storage::JsonFileWriter;
use pg_ftp_export::transform::ValueCoercer;
use pg_ftp_export::{ColumnValue, Record, Stage};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Mock extractor returning fixed records, or failing when given none
struct MockExtractor {
    records: Option<Vec<Record>>,
}

impl MockExtractor {
    fn new(records: Vec<Record>) -> Self {
        Self {
            records: Some(records),
        }
    }

    fn failing() -> Self {
        Self { records: None }
    }
}

impl Extractor for MockExtractor {
    type Item = Record;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        self.records
            .clone()
            .ok_or_else(|| eyre!("could not connect to server: Connection refused"))
    }
}

/// Mock uploader that records every file it is asked to upload
#[derive(Clone, Default)]
struct RecordingUploader {
    uploads: Arc<Mutex<Vec<PathBuf>>>,
}

impl Uploader for RecordingUploader {
    async fn upload(&self, file: &Path) -> Result<()> {
        self.uploads.lock().unwrap().push(file.to_path_buf());
        Ok(())
    }
}

fn user(id: i64, name: &str) -> Record {
    [
        ("id", ColumnValue::Integer(id)),
        ("name", ColumnValue::Text(name.to_string())),
    ]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn test_users_are_written_and_uploaded_once() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("saved_data").join("pg_data.json");
    let uploader = RecordingUploader::default();

    let pipeline = Pipeline::new(
        MockExtractor::new(vec![user(1, "Ann"), user(2, "Bo")]),
        ValueCoercer,
        JsonFileWriter::new(&file),
        uploader.clone(),
    );
    let summary = pipeline.run().await?;

    assert_eq!(summary.records, 2);
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
    assert_eq!(
        written,
        json!([{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bo"}])
    );
    assert_eq!(*uploader.uploads.lock().unwrap(), vec![file]);

    Ok(())
}

#[tokio::test]
async fn test_output_keeps_record_and_key_structure() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("pg_data.json");

    let mut sparse = Record::new();
    sparse.insert("id", ColumnValue::Integer(3));
    let mut wide = user(4, "Cy");
    wide.insert("score", ColumnValue::Float(9.5));
    wide.insert("active", ColumnValue::Bool(true));
    wide.insert("deleted_at", ColumnValue::Null);
    let records = vec![user(1, "Ann"), sparse, wide];
    let expected_keys: Vec<Vec<String>> = records
        .iter()
        .map(|r| r.keys().map(str::to_string).collect())
        .collect();

    Pipeline::new(
        MockExtractor::new(records),
        ValueCoercer,
        JsonFileWriter::new(&file),
        RecordingUploader::default(),
    )
    .run()
    .await?;

    let written: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
    assert_eq!(written.len(), 3);
    for (object, keys) in written.iter().zip(&expected_keys) {
        let actual: Vec<String> = object.as_object().unwrap().keys().cloned().collect();
        assert_eq!(&actual, keys);
    }

    Ok(())
}

#[tokio::test]
async fn test_dates_and_decimals_are_written_as_strings() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("pg_data.json");

    let created = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_opt(13, 45, 0)
        .unwrap();
    let mut record = user(1, "Ann");
    record.insert("created_at", ColumnValue::Timestamp(created));
    record.insert("birthday", ColumnValue::Date(created.date()));
    record.insert("balance", ColumnValue::Decimal("100.10".to_string()));

    Pipeline::new(
        MockExtractor::new(vec![record]),
        ValueCoercer,
        JsonFileWriter::new(&file),
        RecordingUploader::default(),
    )
    .run()
    .await?;

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
    assert_eq!(written[0]["created_at"], json!("2024-02-29 13:45:00"));
    assert_eq!(written[0]["birthday"], json!("2024-02-29"));
    assert_eq!(written[0]["balance"], json!("100.10"));

    Ok(())
}

#[tokio::test]
async fn test_repeated_runs_are_byte_identical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("saved_data").join("pg_data.json");
    let records = vec![user(1, "Ann"), user(2, "Bo")];

    let mut outputs = Vec::new();
    for _ in 0..2 {
        Pipeline::new(
            MockExtractor::new(records.clone()),
            ValueCoercer,
            JsonFileWriter::new(&file),
            RecordingUploader::default(),
        )
        .run()
        .await?;
        outputs.push(std::fs::read(&file)?);
    }

    assert_eq!(outputs[0], outputs[1]);

    Ok(())
}

#[tokio::test]
async fn test_extract_failure_leaves_no_file_and_no_upload() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("saved_data").join("pg_data.json");
    let uploader = RecordingUploader::default();

    let err = Pipeline::new(
        MockExtractor::failing(),
        ValueCoercer,
        JsonFileWriter::new(&file),
        uploader.clone(),
    )
    .run()
    .await
    .unwrap_err();

    assert_eq!(err.stage, Stage::Extract);
    assert!(err.to_string().contains("Connection refused"));
    assert!(!file.exists());
    assert!(uploader.uploads.lock().unwrap().is_empty());
    // The output directory is prepared before extraction
    assert!(file.parent().unwrap().is_dir());

    Ok(())
}

#[tokio::test]
async fn test_write_failure_skips_upload() -> Result<()> {
    let temp_dir = TempDir::new()?;
    // A directory where the export file should go makes the write fail
    let file = temp_dir.path().join("pg_data.json");
    std::fs::create_dir_all(&file)?;
    let uploader = RecordingUploader::default();

    let err = Pipeline::new(
        MockExtractor::new(vec![user(1, "Ann")]),
        ValueCoercer,
        JsonFileWriter::new(&file),
        uploader.clone(),
    )
    .run()
    .await
    .unwrap_err();

    assert_eq!(err.stage, Stage::Serialize);
    assert!(uploader.uploads.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_existing_output_directory_is_reused() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("saved_data");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("keep.txt"), "untouched")?;
    let permissions = std::fs::metadata(&dir)?.permissions();

    Pipeline::new(
        MockExtractor::new(vec![]),
        ValueCoercer,
        JsonFileWriter::new(dir.join("pg_data.json")),
        RecordingUploader::default(),
    )
    .run()
    .await?;

    assert_eq!(std::fs::read_to_string(dir.join("keep.txt"))?, "untouched");
    assert_eq!(std::fs::metadata(&dir)?.permissions(), permissions);
    assert_eq!(std::fs::read_to_string(dir.join("pg_data.json"))?, "[]\n");

    Ok(())
}

//! Export run wiring
//!
//! Pipeline: PostgresExtractor → ValueCoercer → JsonFileWriter → FtpUploader

use crate::config::Config;
use crate::error::StageError;
use crate::etl::{ExportSummary, Pipeline};
use crate::ftp::FtpUploader;
use crate::postgres::PostgresExtractor;
use crate::storage::JsonFileWriter;
use crate::transform::ValueCoercer;

/// Export the configured table to JSON and upload it
///
/// # Errors
/// Returns a [`StageError`] for the first step that failed
pub async fn run_export(config: &Config) -> Result<ExportSummary, StageError> {
    log::debug!("Export configuration: {:?}", config);

    let pipeline = Pipeline::new(
        PostgresExtractor::new(config.database.clone()),
        ValueCoercer,
        JsonFileWriter::new(&config.export_file),
        FtpUploader::new(config.ftp.clone()),
    );

    pipeline.run().await
}

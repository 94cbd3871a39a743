//! Pipeline orchestration for export runs

use super::{Extractor, Loader, Transformer, Uploader};
use crate::error::{Stage, StageError};
use crate::storage::ensure_parent_dir;
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Outcome of a successful export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of records written to the export file
    pub records: usize,
    /// The export file that was uploaded
    pub file: PathBuf,
}

/// Export pipeline that runs Extract, Transform, Load and Upload in sequence
///
/// The run moves through `Prepare → Extract → Serialize → Upload`. The first
/// failing stage ends the run; no later stage is invoked.
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
/// - `U`: Uploader type (receives the loader's destination file)
///
/// # Example
/// ```no_run
/// use pg_ftp_export::etl::Pipeline;
/// use pg_ftp_export::ftp::FtpUploader;
/// use pg_ftp_export::postgres::PostgresExtractor;
/// use pg_ftp_export::storage::JsonFileWriter;
/// use pg_ftp_export::transform::ValueCoercer;
/// use pg_ftp_export::Config;
///
/// # async fn example() -> eyre::Result<()> {
/// let config = Config::from_env()?;
/// let pipeline = Pipeline::new(
///     PostgresExtractor::new(config.database.clone()),
///     ValueCoercer,
///     JsonFileWriter::new(&config.export_file),
///     FtpUploader::new(config.ftp.clone()),
/// );
///
/// let summary = pipeline.run().await?;
/// println!("Exported {} records", summary.records);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L, U> {
    extractor: E,
    transformer: T,
    loader: L,
    uploader: U,
}

impl<E, T, L, U> Pipeline<E, T, L, U>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
    U: Uploader,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L, uploader: U) -> Self {
        Self {
            extractor,
            transformer,
            loader,
            uploader,
        }
    }

    /// Run the complete export
    ///
    /// Steps:
    /// 1. Ensure the loader's output directory exists
    /// 2. Extract all records from the source
    /// 3. Transform each record and write the export file
    /// 4. Upload the export file
    ///
    /// An empty extraction is still written and uploaded.
    ///
    /// # Errors
    /// Returns a [`StageError`] naming the first stage that failed
    pub async fn run(&self) -> Result<ExportSummary, StageError> {
        log::info!("Starting export pipeline");
        let file = self.loader.destination();

        // Prepare
        log::debug!("Ensuring output directory for {}", file.display().bright_black());
        ensure_parent_dir(file).map_err(|e| failed(Stage::Prepare, e))?;

        // Extract
        log::debug!("Extracting from source...");
        let records = self
            .extractor
            .extract()
            .await
            .map_err(|e| failed(Stage::Extract, e))?;
        log::info!("Extracted {} records", records.len());

        if records.is_empty() {
            log::warn!("No records extracted, exporting an empty array");
        }

        // Serialize
        log::debug!("Serializing records to {}...", file.display().bright_black());
        let items = self
            .transformer
            .transform_many(records)
            .map_err(|e| failed(Stage::Serialize, e))?;
        let count = self
            .loader
            .load(items)
            .await
            .map_err(|e| failed(Stage::Serialize, e))?;
        log::info!("Saved {} records to {}", count, file.display().bright_black());

        // Upload
        log::debug!("Uploading {}...", file.display().bright_black());
        self.uploader
            .upload(file)
            .await
            .map_err(|e| failed(Stage::Upload, e))?;
        log::info!("Uploaded {}", file.display().bright_black());

        Ok(ExportSummary {
            records: count,
            file: file.to_path_buf(),
        })
    }
}

fn failed(stage: Stage, cause: eyre::Report) -> StageError {
    log::error!("Error during {} step: {:#}", stage, cause);
    StageError::new(stage, cause)
}

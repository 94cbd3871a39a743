//! PostgreSQL to FTP exporter
//!
//! Reads one database table, writes it to a JSON file and uploads that file
//! to an FTP server.

pub mod config;
pub mod error;
pub mod etl;
pub mod export;
pub mod ftp;
pub mod postgres;
pub mod record;
pub mod storage;
pub mod transform;

// Re-exports for convenience
pub use config::{Config, DatabaseConfig, FtpConfig};
pub use error::{Stage, StageError};
pub use etl::{ExportSummary, Extractor, Loader, Pipeline, Transformer, Uploader};
pub use export::run_export;
pub use record::{ColumnValue, Record};

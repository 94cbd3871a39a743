//! Uploader trait for publishing a local file to a remote store

use eyre::Result;
use std::path::Path;

/// Uploader trait for transferring a local file to a remote destination
///
/// # Example
/// ```no_run
/// use pg_ftp_export::etl::Uploader;
/// use eyre::{Result, eyre};
/// use std::path::{Path, PathBuf};
///
/// struct CopyUploader {
///     target_dir: PathBuf,
/// }
///
/// impl Uploader for CopyUploader {
///     async fn upload(&self, file: &Path) -> Result<()> {
///         let name = file.file_name().ok_or_else(|| eyre!("no file name"))?;
///         std::fs::copy(file, self.target_dir.join(name))?;
///         Ok(())
///     }
/// }
/// ```
pub trait Uploader: Send + Sync {
    /// Transfer `file` to the remote destination
    ///
    /// # Errors
    /// Returns an error if connecting, authenticating, or transferring fails
    fn upload(&self, file: &Path) -> impl std::future::Future<Output = Result<()>> + Send;
}

//! Loader trait for writing items to a local file

use eyre::Result;
use std::path::Path;

/// Loader trait for persisting a full item set to a local file
///
/// The file written by a loader is what the pipeline hands to the
/// [`Uploader`](super::Uploader) afterwards.
///
/// # Example
/// ```no_run
/// use pg_ftp_export::etl::Loader;
/// use eyre::Result;
/// use std::path::{Path, PathBuf};
///
/// struct LinesLoader {
///     path: PathBuf,
/// }
///
/// impl Loader for LinesLoader {
///     type Item = String;
///
///     fn destination(&self) -> &Path {
///         &self.path
///     }
///
///     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
///         std::fs::write(&self.path, items.join("\n"))?;
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// Path of the file this loader writes
    fn destination(&self) -> &Path;

    /// Write items to the destination, replacing any previous content
    ///
    /// Returns the number of items written
    ///
    /// # Errors
    /// Returns an error if encoding or file I/O fails
    fn load(
        &self,
        items: Vec<Self::Item>,
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}

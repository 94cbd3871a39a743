//! Extractor trait for reading records from a source

use eyre::Result;

/// Extractor trait for extracting data from a source
///
/// Implementors define how to read the complete item set from a source,
/// such as a database table.
///
/// # Example
/// ```no_run
/// use pg_ftp_export::etl::Extractor;
/// use eyre::Result;
///
/// struct StaticExtractor {
///     rows: Vec<String>,
/// }
///
/// impl Extractor for StaticExtractor {
///     type Item = String;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         Ok(self.rows.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract all items from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (connection, query, decoding, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}

//! Core ETL (Extract, Transform, Load, Upload) abstractions
//!
//! This module provides the trait definitions for each export step and the
//! pipeline that runs them in strict sequence.

mod extract;
mod load;
mod pipeline;
mod transform;
mod upload;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::{ExportSummary, Pipeline};
pub use transform::Transformer;
pub use upload::Uploader;

//! Structured errors raised at the pipeline boundary

use std::fmt;

/// A step of the export run, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Ensure the output directory exists
    Prepare,
    /// Read every record from the source table
    Extract,
    /// Coerce records to JSON and write the export file
    Serialize,
    /// Transfer the export file to the remote server
    Upload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepare => write!(f, "prepare"),
            Self::Extract => write!(f, "extract"),
            Self::Serialize => write!(f, "serialize"),
            Self::Upload => write!(f, "upload"),
        }
    }
}

/// Failure of a single pipeline stage, carrying the stage and its full cause chain
#[derive(Debug, thiserror::Error)]
#[error("{stage} step failed: {cause:#}")]
pub struct StageError {
    pub stage: Stage,
    pub cause: eyre::Report,
}

impl StageError {
    pub fn new(stage: Stage, cause: eyre::Report) -> Self {
        Self { stage, cause }
    }
}

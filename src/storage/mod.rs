//! File system storage operations
//!
//! This module handles the local side of an export:
//! - JSON array file writing
//! - Output directory creation

mod json_file;

pub use json_file::{JsonFileWriter, ensure_parent_dir};

//! JSON array file output

use crate::etl::Loader;
use eyre::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const INDENT: &[u8] = b"    ";

/// Write JSON values to a file as a single indented array
///
/// Every write replaces the file's previous content. The same input always
/// produces the same bytes.
pub struct JsonFileWriter {
    path: PathBuf,
}

impl JsonFileWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Write `items` as a JSON array, truncating any existing file
    pub fn write(&self, items: &[Value]) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create JSON file: {}", self.path.display()))?;
        self.encode(items, BufWriter::new(file))
    }

    fn encode<W: Write>(&self, items: &[Value], mut writer: W) -> Result<()> {
        let mut serializer =
            Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(INDENT));
        items
            .serialize(&mut serializer)
            .with_context(|| format!("Failed to encode JSON file: {}", self.path.display()))?;

        writeln!(writer)
            .with_context(|| format!("Failed to write JSON file: {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write JSON file: {}", self.path.display()))?;

        Ok(())
    }
}

impl Loader for JsonFileWriter {
    type Item = Value;

    fn destination(&self) -> &Path {
        &self.path
    }

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.write(&items)?;
        Ok(items.len())
    }
}

/// Create the parent directory of `path` if it does not exist yet
///
/// Succeeds without changes when the directory is already present or when
/// `path` is a bare file name.
pub fn ensure_parent_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
        _ => {}
    }
    Ok(())
}

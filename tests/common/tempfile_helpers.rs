//! Helper functions for tempfile usage in tests

use anyhow::Context;
use std::io::Write;

/// Write `contents` to a named temp file with a `.json` suffix.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_temp_json(contents: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::with_suffix(".json")
        .context("Failed to create temporary JSON file for test")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write temporary JSON file")?;
    file.flush().context("Failed to flush temporary JSON file")?;
    Ok(file)
}

/// Create a temp directory with a helpful error message.
#[allow(dead_code)]
pub fn create_temp_dir() -> anyhow::Result<tempfile::TempDir> {
    tempfile::tempdir().context("Failed to create temporary directory for test")
}

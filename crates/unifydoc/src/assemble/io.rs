//! Writing the sealed document

use crate::types::*;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Save a sealed document to `path`.
///
/// The bytes go to a temporary file next to `path` that is renamed into
/// place only after a complete write, so a failed save never leaves a
/// truncated PDF at `path`.
pub fn save_pdf(mut doc: lopdf::Document, path: &Path) -> Result<()> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(&writer)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

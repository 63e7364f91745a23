//! Zip-slip-safe archive extraction

use crate::types::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extract `archive_path` below `dest_root` and list every regular file there.
///
/// Entries whose names would resolve outside `dest_root` (`../` escapes,
/// absolute names) are logged and skipped. The returned list is sorted and
/// covers everything under `dest_root`, not only what this archive added.
pub fn expand_zip(archive_path: &Path, dest_root: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest_root)?;

    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut extracted = 0usize;
    let mut skipped = 0usize;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let entry_path = match entry.enclosed_name() {
            Some(p) => p,
            None => {
                log::warn!("Skipped unsafe file path: {}", entry.name());
                skipped += 1;
                continue;
            }
        };

        let output_path = dest_root.join(&entry_path);
        if entry.is_dir() {
            fs::create_dir_all(&output_path)?;
        } else {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&output_path)?;
            io::copy(&mut entry, &mut outfile)?;
            extracted += 1;
        }
    }

    log::info!(
        "Extracted {} files from {} ({} unsafe entries skipped)",
        extracted,
        archive_path.display(),
        skipped
    );

    list_files(dest_root)
}

/// Sorted regular files below `root`
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

//! Turning command-line inputs into the flat path list the assembler takes

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Files gathered from one command-line input
#[derive(Debug, Clone, PartialEq)]
pub struct InputGroup {
    /// Directory the files are listed relative to
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Expand `inputs` in order: zips are extracted below `work_dir`,
/// directories are walked and plain files are used in place.
pub fn gather_inputs(inputs: &[PathBuf], work_dir: &Path) -> Result<Vec<InputGroup>> {
    let mut groups = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        if input.is_dir() {
            let files = unifydoc::list_files(input)
                .with_context(|| format!("Failed to list {}", input.display()))?;
            groups.push(InputGroup {
                root: input.clone(),
                files,
            });
        } else if is_zip(input) {
            let dest = work_dir.join(extract_dir_name(input, index));
            let files = unifydoc::expand_zip(input, &dest)
                .with_context(|| format!("Failed to extract {}", input.display()))?;
            groups.push(InputGroup { root: dest, files });
        } else if input.is_file() {
            let root = input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            groups.push(InputGroup {
                root,
                files: vec![input.clone()],
            });
        } else {
            bail!("Input not found: {}", input.display());
        }
    }

    Ok(groups)
}

/// Every file of every group, in order
pub fn flatten(groups: &[InputGroup]) -> Vec<PathBuf> {
    groups.iter().flat_map(|g| g.files.iter().cloned()).collect()
}

fn is_zip(path: &Path) -> bool {
    unifydoc::extension_of(path) == ".zip"
}

fn extract_dir_name(archive: &Path, index: usize) -> String {
    let stem = archive
        .file_stem()
        .map(|s| sanitize_filename::sanitize(s.to_string_lossy()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "archive".to_string());
    format!("{}-{}", index, stem)
}

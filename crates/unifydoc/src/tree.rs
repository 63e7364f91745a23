//! Nested folder/file view of an upload, for a confirmation step
//!
//! The assembler does not use this; it exists so a caller can show the user
//! what will be converted before running.

use crate::classify::{extension_of, is_hidden_listing};
use crate::constants::TREE_INDENT_PER_LEVEL;
use crate::options::ClassifyOptions;
use std::path::{Component, Path, PathBuf};

#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FileTree {
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileNode>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FolderNode {
    /// Folder name with a trailing `/`
    pub name: String,
    /// 1 for top-level folders
    pub level: usize,
    pub indent: usize,
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileNode>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FileNode {
    pub name: String,
    pub full_path: PathBuf,
    /// Number of path segments below the base directory
    pub level: usize,
    pub indent: usize,
}

impl FolderNode {
    fn new(name: String, level: usize) -> Self {
        Self {
            name,
            level,
            indent: level * TREE_INDENT_PER_LEVEL,
            folders: Vec::new(),
            files: Vec::new(),
        }
    }
}

impl FileTree {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    /// Every file in display order (depth first, files after subfolders)
    pub fn file_paths(&self) -> Vec<&Path> {
        fn collect<'a>(folders: &'a [FolderNode], files: &'a [FileNode], out: &mut Vec<&'a Path>) {
            for folder in folders {
                collect(&folder.folders, &folder.files, out);
            }
            out.extend(files.iter().map(|f| f.full_path.as_path()));
        }

        let mut out = Vec::new();
        collect(&self.folders, &self.files, &mut out);
        out
    }
}

/// Build the tree for `paths` relative to `base_dir`.
///
/// Folders keep the order in which they are first seen. Hidden paths,
/// `__MACOSX` content and anything outside the text and image sets are left
/// out.
pub fn build_file_tree(
    paths: &[impl AsRef<Path>],
    base_dir: &Path,
    options: &ClassifyOptions,
) -> FileTree {
    let mut root = FolderNode::new(String::new(), 0);

    for path in paths {
        let path = path.as_ref();
        let relative = path.strip_prefix(base_dir).unwrap_or(path);

        if is_hidden_listing(&relative.to_string_lossy()) {
            continue;
        }
        if !options.is_listed_extension(&extension_of(path)) {
            continue;
        }

        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let Some((file_name, dirs)) = parts.split_last() else {
            continue;
        };

        let mut current = &mut root;
        for (depth, part) in dirs.iter().enumerate() {
            let folder_name = format!("{}/", part);
            let idx = match current.folders.iter().position(|f| f.name == folder_name) {
                Some(idx) => idx,
                None => {
                    current.folders.push(FolderNode::new(folder_name, depth + 1));
                    current.folders.len() - 1
                }
            };
            current = &mut current.folders[idx];
        }

        let level = parts.len();
        current.files.push(FileNode {
            name: file_name.clone(),
            full_path: path.to_path_buf(),
            level,
            indent: level * TREE_INDENT_PER_LEVEL,
        });
    }

    FileTree {
        folders: root.folders,
        files: root.files,
    }
}

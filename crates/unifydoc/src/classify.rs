//! File classification
//!
//! Decides, from the path alone, whether a file is rendered and by which
//! renderer. Shared by the assembler and the confirmation tree.

use crate::constants::{HIDDEN_PREFIXES, MACOS_RESOURCE_DIR, RESOURCE_FORK_PREFIX, WORD_DOC_EXTENSION};
use crate::options::ClassifyOptions;
use crate::types::*;
use std::path::{Component, Path, PathBuf};

/// One entry of an assembly run
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub path: PathBuf,
    /// Basename shown in the `File:` banner
    pub name: String,
    /// Path shown in the `File Path:` banner
    pub relative_path: String,
    pub classification: Classification,
}

impl InputFile {
    pub fn kind(&self) -> Option<FileKind> {
        match self.classification {
            Classification::Render(kind) => Some(kind),
            Classification::Skip(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    options: ClassifyOptions,
}

impl Classifier {
    pub fn new(options: ClassifyOptions) -> Self {
        Self { options }
    }

    /// Build the immutable input record for `path`
    pub fn input_file(&self, path: &Path) -> InputFile {
        InputFile {
            path: path.to_path_buf(),
            name: file_name(path),
            relative_path: self.relative_path(path),
            classification: self.classify(path),
        }
    }

    pub fn classify(&self, path: &Path) -> Classification {
        let name = file_name(path);

        if name.starts_with(RESOURCE_FORK_PREFIX) || has_segment(path, MACOS_RESOURCE_DIR) {
            return Classification::Skip(SkipReason::ResourceFork);
        }
        if HIDDEN_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            return Classification::Skip(SkipReason::Hidden);
        }
        if self.in_temp_environment(path) {
            return Classification::Skip(SkipReason::TempEnvironment);
        }

        let ext = extension_of(path);
        let options = &self.options;
        if options.is_pdf_extension(&ext) {
            Classification::Render(FileKind::EmbeddedPdf)
        } else if ext.eq_ignore_ascii_case(WORD_DOC_EXTENSION) && options.is_text_extension(&ext) {
            Classification::Render(FileKind::WordDoc)
        } else if options.is_image_extension(&ext) {
            Classification::Render(FileKind::Image)
        } else if options.is_text_extension(&ext) {
            Classification::Render(FileKind::Text)
        } else {
            Classification::Skip(SkipReason::Unsupported)
        }
    }

    /// Strip the upload root for display; paths outside it are shown unchanged
    pub fn relative_path(&self, path: &Path) -> String {
        self.options
            .upload_root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .filter(|rel| !rel.as_os_str().is_empty())
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    fn in_temp_environment(&self, path: &Path) -> bool {
        let marker = self.options.temp_env_marker.as_str();
        !marker.is_empty() && has_segment(path, marker)
    }
}

fn has_segment(path: &Path, segment: &str) -> bool {
    path.components().any(|c| match c {
        Component::Normal(part) => part == segment,
        _ => false,
    })
}

/// Lowercased extension with its leading dot, or an empty string
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Paths the confirmation tree hides: dot paths and `__MACOSX` content
pub(crate) fn is_hidden_listing(path: &str) -> bool {
    path.starts_with('.') || path.contains("/.") || path.contains(MACOS_RESOURCE_DIR)
}

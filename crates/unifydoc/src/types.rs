use crate::constants::{A4_DIMENSIONS, LEGAL_DIMENSIONS, LETTER_DIMENSIONS};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to write")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, AssembleError>;

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    #[default]
    Portrait,
    /// Width and height of the preset are swapped
    Landscape,
}

/// Named page size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PageSize {
    #[default]
    Letter,
    A4,
    Legal,
}

impl PageSize {
    /// Get base dimensions in points (portrait)
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            PageSize::Letter => LETTER_DIMENSIONS,
            PageSize::A4 => A4_DIMENSIONS,
            PageSize::Legal => LEGAL_DIMENSIONS,
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_pt();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Look up a preset by name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "letter" => Some(PageSize::Letter),
            "a4" => Some(PageSize::A4),
            "legal" => Some(PageSize::Legal),
            _ => None,
        }
    }
}

/// Renderable file kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Text,
    WordDoc,
    Image,
    EmbeddedPdf,
}

/// Why a file contributes no pages without being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Basename starts with `.` or `__`
    Hidden,
    /// macOS AppleDouble file (`._name`) or `__MACOSX` content
    ResourceFork,
    /// A path segment is the temp-environment marker (e.g. `.venv`)
    TempEnvironment,
    /// Extension is not in any configured set
    Unsupported,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Hidden => "hidden or system file",
            SkipReason::ResourceFork => "macOS resource fork",
            SkipReason::TempEnvironment => "inside a temporary environment",
            SkipReason::Unsupported => "unsupported extension",
        };
        f.write_str(s)
    }
}

/// Result of classifying one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Render(FileKind),
    Skip(SkipReason),
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// The file produced this many pages
    Rendered { pages: usize },
    Skipped(SkipReason),
    /// The file was attempted and dropped; carries the logged message
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub output: PathBuf,
    pub page_count: usize,
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn rendered_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Rendered { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed(_)))
            .count()
    }
}

/// Terminal outcome of a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// Abandoned at a checkpoint; nothing was written
    Cancelled,
}

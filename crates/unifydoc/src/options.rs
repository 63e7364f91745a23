use crate::constants::*;
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Layout configuration for one assembly run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderSettings {
    // Geometry
    pub margin_pt: f32,
    pub orientation: Orientation,
    pub page_size: PageSize,

    // Repeated notes; empty strings count as absent
    pub header_note: Option<String>,
    pub footer_note: Option<String>,

    /// Print the `File:` / `File Path:` banner
    pub show_file_info: bool,

    // Body text
    pub font_size_pt: f32,
    pub line_height_pt: f32,
    pub max_chars_per_line: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            margin_pt: DEFAULT_MARGIN_PT,
            orientation: Orientation::Portrait,
            page_size: PageSize::Letter,
            header_note: None,
            footer_note: None,
            show_file_info: true,
            font_size_pt: DEFAULT_FONT_SIZE_PT,
            line_height_pt: DEFAULT_LINE_HEIGHT_PT,
            max_chars_per_line: DEFAULT_MAX_CHARS_PER_LINE,
        }
    }
}

impl RenderSettings {
    /// Load settings from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings = serde_json::from_slice(&bytes)
            .map_err(|e| AssembleError::Config(format!("Failed to parse settings: {}", e)))?;
        Ok(settings)
    }

    /// Save settings to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AssembleError::Config(format!("Failed to serialize settings: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Page (width, height) in points with orientation applied
    pub fn page_dimensions(&self) -> (f32, f32) {
        self.page_size.dimensions_with_orientation(self.orientation)
    }

    pub fn header_note(&self) -> Option<&str> {
        self.header_note.as_deref().filter(|s| !s.is_empty())
    }

    pub fn footer_note(&self) -> Option<&str> {
        self.footer_note.as_deref().filter(|s| !s.is_empty())
    }

    /// Space kept free at the bottom of a page while flowing body text
    pub fn reserved_space(&self) -> f32 {
        match self.footer_note() {
            Some(_) => self.margin_pt + self.line_height_pt * FOOTER_RESERVED_LINES,
            None => self.margin_pt,
        }
    }

    /// Vertical space consumed by the header block on every content page
    pub fn header_block_height(&self) -> f32 {
        let mut lines = 0.0;
        if self.header_note().is_some() {
            lines += HEADER_LINE_ADVANCE;
        }
        if self.show_file_info {
            lines += HEADER_LINE_ADVANCE * 2.0;
        }
        lines * self.line_height_pt
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !self.margin_pt.is_finite() || self.margin_pt < 0.0 {
            return Err(AssembleError::Config(
                "Margin must be a non-negative number".to_string(),
            ));
        }
        if !(self.font_size_pt.is_finite() && self.font_size_pt > 0.0) {
            return Err(AssembleError::Config(
                "Font size must be positive".to_string(),
            ));
        }
        if !(self.line_height_pt.is_finite() && self.line_height_pt > 0.0) {
            return Err(AssembleError::Config(
                "Line height must be positive".to_string(),
            ));
        }
        if self.max_chars_per_line == 0 {
            return Err(AssembleError::Config(
                "Max characters per line must be at least 1".to_string(),
            ));
        }

        let (width, height) = self.page_dimensions();
        if self.margin_pt * 2.0 >= width {
            return Err(AssembleError::Config(format!(
                "Margin {} leaves no printable width on a {}pt wide page",
                self.margin_pt, width
            )));
        }

        // A fresh page must hold the header block plus one body line
        let first_line_bottom =
            self.margin_pt + self.header_block_height() + self.line_height_pt;
        if first_line_bottom > height - self.reserved_space() {
            return Err(AssembleError::Config(format!(
                "Margin {} and line height {} leave no room for content on a {}pt tall page",
                self.margin_pt, self.line_height_pt, height
            )));
        }

        Ok(())
    }
}

/// Which files are rendered and as what
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassifyOptions {
    /// Extensions rendered as text (`.docx` here is rendered as a Word document)
    pub text_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
    pub pdf_extension: String,
    /// Prefix stripped from paths shown in the `File Path:` banner
    pub upload_root: Option<PathBuf>,
    /// Any file below a directory with this name is skipped
    pub temp_env_marker: String,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            text_extensions: DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pdf_extension: PDF_EXTENSION.to_string(),
            upload_root: None,
            temp_env_marker: DEFAULT_TEMP_ENV_MARKER.to_string(),
        }
    }
}

impl ClassifyOptions {
    pub fn with_upload_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.upload_root = Some(root.into());
        self
    }

    /// `ext` includes its leading dot; matching ignores case
    pub fn is_text_extension(&self, ext: &str) -> bool {
        contains_ignore_case(&self.text_extensions, ext)
    }

    pub fn is_image_extension(&self, ext: &str) -> bool {
        contains_ignore_case(&self.image_extensions, ext)
    }

    pub fn is_pdf_extension(&self, ext: &str) -> bool {
        self.pdf_extension.eq_ignore_ascii_case(ext)
    }

    /// Extensions shown in the confirmation tree (PDFs are not listed)
    pub fn is_listed_extension(&self, ext: &str) -> bool {
        self.is_text_extension(ext) || self.is_image_extension(ext)
    }
}

fn contains_ignore_case(set: &[String], ext: &str) -> bool {
    set.iter().any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

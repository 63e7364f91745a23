//! Shared constants for document assembly
//!
//! This module centralizes the layout numbers used throughout
//! the assembler and its renderers.

// =============================================================================
// Page Presets (points, portrait)
// =============================================================================

/// US Letter: 8.5" × 11"
pub const LETTER_DIMENSIONS: (f32, f32) = (612.0, 792.0);

/// ISO A4, rounded to whole points
pub const A4_DIMENSIONS: (f32, f32) = (595.0, 842.0);

/// US Legal: 8.5" × 14"
pub const LEGAL_DIMENSIONS: (f32, f32) = (612.0, 1008.0);

// =============================================================================
// Default Render Settings
// =============================================================================

pub const DEFAULT_MARGIN_PT: f32 = 10.0;
pub const DEFAULT_FONT_SIZE_PT: f32 = 10.0;
pub const DEFAULT_LINE_HEIGHT_PT: f32 = 12.0;
pub const DEFAULT_MAX_CHARS_PER_LINE: usize = 90;

// =============================================================================
// Header / Footer
// =============================================================================

/// Font size for the header note and the `File:` line
pub const HEADER_FONT_SIZE_PT: f32 = 12.0;

/// Font size for the `File Path:` line
pub const FILE_PATH_FONT_SIZE_PT: f32 = 10.0;

/// Font size for the footer note
pub const FOOTER_FONT_SIZE_PT: f32 = 10.0;

/// Each header line advances the cursor by this many line heights
pub const HEADER_LINE_ADVANCE: f32 = 2.0;

/// Line heights held back above the bottom margin when a footer is configured
pub const FOOTER_RESERVED_LINES: f32 = 2.0;

// =============================================================================
// Images
// =============================================================================

/// Image frame width as a fraction of the printable width
pub const IMAGE_WIDTH_RATIO: f32 = 0.5;

/// Image frame height as a fraction of the frame width
pub const IMAGE_ASPECT_RATIO: f32 = 0.75;

/// Minimum room (points) below the cursor before an image forces a new page
pub const IMAGE_MIN_ROOM_PT: f32 = 200.0;

/// Vertical gap after a placed image
pub const IMAGE_SPACING_PT: f32 = 20.0;

// =============================================================================
// Text
// =============================================================================

/// Tab stops used when expanding tabs before wrapping
pub const TAB_WIDTH: usize = 8;

/// Substitute for characters outside the WinAnsi range of the standard fonts
pub const REPLACEMENT_BYTE: u8 = b'?';

// =============================================================================
// Classification
// =============================================================================

pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    ".py", ".txt", ".html", ".js", ".css", ".java", ".cpp", ".c", ".json", ".md", ".php", ".sql",
    ".doc", ".docx",
];

pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".bmp"];

pub const PDF_EXTENSION: &str = ".pdf";

pub const WORD_DOC_EXTENSION: &str = ".docx";

/// Path segment marking a virtual/temporary environment
pub const DEFAULT_TEMP_ENV_MARKER: &str = ".venv";

/// Basename prefix of macOS AppleDouble resource-fork files
pub const RESOURCE_FORK_PREFIX: &str = "._";

/// Basename prefixes of hidden or system files
pub const HIDDEN_PREFIXES: &[&str] = &[".", "__"];

/// Directory macOS adds to archives for resource forks
pub const MACOS_RESOURCE_DIR: &str = "__MACOSX";

// =============================================================================
// File Tree
// =============================================================================

/// Indentation (UI pixels) per nesting level
pub const TREE_INDENT_PER_LEVEL: usize = 20;

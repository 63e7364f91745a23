//! Content renderers
//!
//! One renderer per [`FileKind`], selected through a lookup table. A
//! renderer either places all of a file's content or returns an error; the
//! assembler rolls back any pages it started in the latter case.

mod docx;
mod pdf;
mod raster;
mod text;

pub use docx::extract_paragraph_text;
pub use text::read_text;

use crate::assemble::PageFlow;
use crate::classify::InputFile;
use crate::types::*;

pub(crate) trait Renderer: Sync {
    fn render(&self, file: &InputFile, flow: &mut PageFlow<'_>) -> Result<()>;
}

static RENDERERS: [(FileKind, &dyn Renderer); 4] = [
    (FileKind::Text, &text::TextRenderer),
    (FileKind::WordDoc, &text::WordDocRenderer),
    (FileKind::Image, &raster::ImageRenderer),
    (FileKind::EmbeddedPdf, &pdf::PdfRenderer),
];

pub(crate) fn renderer_for(kind: FileKind) -> &'static dyn Renderer {
    RENDERERS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, renderer)| *renderer)
        .unwrap_or(&text::TextRenderer)
}

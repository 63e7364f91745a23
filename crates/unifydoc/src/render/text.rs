//! Plain text and Word documents
//!
//! Both kinds reduce to a string that is wrapped and flowed line by line.

use super::Renderer;
use super::docx::extract_paragraph_text;
use crate::assemble::PageFlow;
use crate::classify::InputFile;
use crate::types::*;
use crate::wrap::wrap_text;
use std::path::Path;

pub(crate) struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, file: &InputFile, flow: &mut PageFlow<'_>) -> Result<()> {
        let content = read_text(&file.path)?;
        flow_text(flow, &content);
        Ok(())
    }
}

pub(crate) struct WordDocRenderer;

impl Renderer for WordDocRenderer {
    fn render(&self, file: &InputFile, flow: &mut PageFlow<'_>) -> Result<()> {
        let content = extract_paragraph_text(&file.path)?;
        flow_text(flow, &content);
        Ok(())
    }
}

/// Read a text file as UTF-8, falling back to Latin-1
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_text(bytes))
}

pub(crate) fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        // Every byte is a valid Latin-1 code point
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

fn flow_text(flow: &mut PageFlow<'_>, content: &str) {
    let lines = wrap_text(content, flow.settings().max_chars_per_line);

    flow.start_content_page();
    for line in &lines {
        flow.emit_line(line);
    }
    flow.finish_file();
}

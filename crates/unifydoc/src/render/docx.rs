//! Paragraph text of `.docx` files
//!
//! Only top-level body paragraphs are read. Tables, images and other
//! embedded content are not rendered.

use crate::types::*;
use std::io::Read;
use std::path::Path;

const MAIN_PART: &str = "word/document.xml";

/// Body paragraphs joined by newlines
pub fn extract_paragraph_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive.by_name(MAIN_PART)?.read_to_string(&mut xml)?;
    paragraphs_from_xml(&xml)
}

pub(crate) fn paragraphs_from_xml(xml: &str) -> Result<String> {
    let doc = roxmltree::Document::parse(xml)?;
    let body = doc
        .root_element()
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "body")
        .ok_or_else(|| AssembleError::Decode("document.xml has no body".to_string()))?;

    let paragraphs: Vec<String> = body
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "p")
        .map(|p| paragraph_text(&p))
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &roxmltree::Node) -> String {
    let mut text = String::new();
    for node in paragraph.descendants().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "t" => text.push_str(node.text().unwrap_or_default()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

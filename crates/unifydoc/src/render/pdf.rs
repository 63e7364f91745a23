//! Embedded PDF pages
//!
//! Every page of a source PDF becomes one output page. The source page is
//! wrapped in a Form XObject and drawn scaled to fit the output page,
//! centered, with no header, footer or margin.

use super::Renderer;
use crate::assemble::PageFlow;
use crate::classify::InputFile;
use crate::layout::SourcePageItem;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

pub(crate) struct PdfRenderer;

impl Renderer for PdfRenderer {
    fn render(&self, file: &InputFile, flow: &mut PageFlow<'_>) -> Result<()> {
        let source = Document::load(&file.path)?;
        let (target_width, target_height) = flow.page_size();

        // Copy everything first so a bad page leaves no output pages behind
        let mut cache: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut placed = Vec::new();
        for (index, page_id) in source.get_pages().into_values().enumerate() {
            let bbox = page_box(&source, page_id)?;
            let xobject = create_page_xobject(flow.pdf_mut(), &source, page_id, &bbox, &mut cache)?;
            let (scale, offset) = fit_to_page(&bbox, target_width, target_height);
            placed.push(SourcePageItem {
                xobject,
                source_index: index,
                scale,
                offset,
            });
        }

        if placed.is_empty() {
            log::warn!("{} has no pages", file.path.display());
        }

        for item in placed {
            flow.push_source_page(item);
        }
        Ok(())
    }
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject in `output` holding the source page's content.
fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    bbox: &[f32; 4],
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let content_data = get_page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set(
        "BBox",
        Object::Array(bbox.iter().map(|&v| Object::Real(v)).collect()),
    );
    xobject_dict.set("FormType", Object::Integer(1));

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources")? {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, &resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

/// Look up a page attribute, following the `Parent` chain for inherited ones.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut node = doc.get_dictionary(page_id)?;
    // Bounded walk; page trees are shallow and cycles are malformed
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => node = doc.get_dictionary(parent_id)?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// MediaBox of a page as `[x0, y0, x1, y1]`, defaulting to US Letter
fn page_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4]> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")?;
    let mut resolved = media_box;
    if let Some(Object::Reference(id)) = resolved {
        resolved = Some(doc.get_object(id)?.clone());
    }

    let values: Vec<f32> = match resolved {
        Some(Object::Array(items)) => items.iter().filter_map(extract_number).collect(),
        _ => Vec::new(),
    };

    match values.as_slice() {
        [x0, y0, x1, y1] if (x1 - x0).abs() > f32::EPSILON && (y1 - y0).abs() > f32::EPSILON => {
            Ok([x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)])
        }
        _ => {
            let (w, h) = crate::constants::LETTER_DIMENSIONS;
            Ok([0.0, 0.0, w, h])
        }
    }
}

/// Uniform scale and PDF-space offset that fit `bbox` centered on the page
fn fit_to_page(bbox: &[f32; 4], page_width: f32, page_height: f32) -> (f32, (f32, f32)) {
    let width = bbox[2] - bbox[0];
    let height = bbox[3] - bbox[1];
    let scale = (page_width / width).min(page_height / height);
    let offset_x = (page_width - width * scale) / 2.0 - bbox[0] * scale;
    let offset_y = (page_height - height * scale) / 2.0 - bbox[1] * scale;
    (scale, (offset_x, offset_y))
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the decoded content stream data from a page.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            Object::Stream(stream) => decoded_stream(stream),
            _ => Ok(Vec::new()),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            if let Ok(stream) = doc.get_object(*id)?.as_stream() {
                result.extend_from_slice(&decoded_stream(stream)?);
                result.push(b'\n');
            }
        }
    }

    Ok(result)
}

fn decoded_stream(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| AssembleError::Decode(format!("Unsupported content stream: {}", e)))
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// The cache maps source ids to output ids. Ids are reserved before the
/// referenced object is copied, so reference cycles terminate.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = match source.get_object(*id) {
                Ok(referenced) => copy_object_deep(output, source, referenced, cache)?,
                // Dangling references read as null
                Err(_) => Object::Null,
            };
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let dict = copy_dictionary(output, source, &stream.dict, cache)?;
            // Already-filtered streams must not be compressed a second time
            let allows_compression =
                stream.allows_compression && stream.dict.get(b"Filter").is_err();
            Ok(Object::Stream(Stream {
                dict,
                content: stream.content.clone(),
                allows_compression,
                start_position: None,
            }))
        }
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        // Back-references into the source page tree would drag it along
        if key.as_slice() == b"Parent" || key.as_slice() == b"P" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

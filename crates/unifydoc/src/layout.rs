//! In-memory page model
//!
//! The assembler places text runs, images and copied source pages on
//! [`Page`]s. Coordinates are measured from the top-left corner of the page,
//! matching the cursor; they are flipped into PDF space only when the
//! document is sealed.
//!
//! Image and source-page XObjects are added to the output [`lopdf::Document`]
//! as soon as a file is rendered, so a page item only needs their object id.
//! Objects left behind by a file that was rolled back are pruned on seal.

use crate::constants::REPLACEMENT_BYTE;
use crate::types::*;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat};

// =============================================================================
// Geometry
// =============================================================================

/// Rectangle with a top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

// =============================================================================
// Fonts
// =============================================================================

/// Faces of the standard Courier family used on every page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Courier",
            Font::Bold => "Courier-Bold",
            Font::Oblique => "Courier-Oblique",
        }
    }
}

// =============================================================================
// Page Items
// =============================================================================

/// One line of text; `y` is the baseline measured from the top
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font: Font,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageItem {
    /// Slot reserved on the page
    pub frame: Rect,
    /// Area the bitmap covers inside the frame (aspect ratio preserved)
    pub drawn: Rect,
    pub xobject: ObjectId,
}

/// A source PDF page embedded as a Form XObject
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePageItem {
    pub xobject: ObjectId,
    /// Page index inside the source document
    pub source_index: usize,
    pub scale: f32,
    /// PDF-space translation applied after scaling
    pub offset: (f32, f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Text(TextRun),
    Image(ImageItem),
    SourcePage(SourcePageItem),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width: f32,
    pub height: f32,
    pub items: Vec<PageItem>,
}

impl Page {
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text(run) => Some(run),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageItem> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Image(image) => Some(image),
            _ => None,
        })
    }

    pub fn source_page(&self) -> Option<&SourcePageItem> {
        self.items.iter().find_map(|item| match item {
            PageItem::SourcePage(source) => Some(source),
            _ => None,
        })
    }

    /// Text of every run in placement order
    pub fn lines(&self) -> Vec<&str> {
        self.text_runs().map(|run| run.text.as_str()).collect()
    }
}

// =============================================================================
// Document
// =============================================================================

/// The output document while it is being assembled
pub struct Document {
    pdf: lopdf::Document,
    pages: Vec<Page>,
    page_size: (f32, f32),
    pages_id: ObjectId,
    fonts_id: ObjectId,
}

impl Document {
    pub fn new(width: f32, height: f32) -> Self {
        let mut pdf = lopdf::Document::with_version("1.7");
        let pages_id = pdf.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let mut font_dict = Dictionary::new();
            font_dict.set("Type", Object::Name(b"Font".to_vec()));
            font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
            font_dict.set("BaseFont", Object::Name(font.base_font().as_bytes().to_vec()));
            font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            let font_id = pdf.add_object(font_dict);
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }
        let fonts_id = pdf.add_object(fonts);

        Self {
            pdf,
            pages: Vec::new(),
            page_size: (width, height),
            pages_id,
            fonts_id,
        }
    }

    pub fn page_size(&self) -> (f32, f32) {
        self.page_size
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a blank page of the document's size
    pub(crate) fn push_page(&mut self) -> &mut Page {
        let (width, height) = self.page_size;
        self.pages.push(Page {
            width,
            height,
            items: Vec::new(),
        });
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub(crate) fn current_page_mut(&mut self) -> Option<&mut Page> {
        self.pages.last_mut()
    }

    /// Drop every page after the first `len`
    pub(crate) fn truncate(&mut self, len: usize) {
        self.pages.truncate(len);
    }

    pub(crate) fn pdf_mut(&mut self) -> &mut lopdf::Document {
        &mut self.pdf
    }

    /// Write the pages into the output PDF and return it, ready to save.
    pub fn seal(self) -> Result<lopdf::Document> {
        let Document {
            mut pdf,
            pages,
            pages_id,
            fonts_id,
            ..
        } = self;

        if pages.is_empty() {
            return Err(AssembleError::NoPages);
        }

        let mut page_refs = Vec::with_capacity(pages.len());
        for page in &pages {
            let page_id = write_page(&mut pdf, page, pages_id, fonts_id)?;
            page_refs.push(Object::Reference(page_id));
        }

        // Create pages tree
        let count = page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        pdf.objects.insert(pages_id, Object::Dictionary(pages_dict));

        // Create catalog
        let catalog_id = pdf.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        pdf.trailer.set("Root", catalog_id);

        let info_id = pdf.add_object(Dictionary::from_iter(vec![(
            "Producer",
            Object::String(b"unifydoc".to_vec(), StringFormat::Literal),
        )]));
        pdf.trailer.set("Info", info_id);

        // XObjects of rolled-back files are unreachable from the catalog
        pdf.prune_objects();
        pdf.compress();

        Ok(pdf)
    }
}

fn write_page(
    pdf: &mut lopdf::Document,
    page: &Page,
    parent_pages_id: ObjectId,
    fonts_id: ObjectId,
) -> Result<ObjectId> {
    let mut operations = Vec::new();
    let mut xobjects = Dictionary::new();

    for item in &page.items {
        match item {
            PageItem::Text(run) => {
                operations.extend(text_operations(run, page.height));
            }
            PageItem::Image(image) => {
                let name = format!("Im{}", xobjects.len());
                xobjects.set(name.as_bytes(), Object::Reference(image.xobject));
                let drawn = &image.drawn;
                operations.extend(place_xobject(
                    &name,
                    [
                        drawn.width,
                        0.0,
                        0.0,
                        drawn.height,
                        drawn.x,
                        page.height - drawn.bottom(),
                    ],
                ));
            }
            PageItem::SourcePage(source) => {
                let name = format!("P{}", xobjects.len());
                xobjects.set(name.as_bytes(), Object::Reference(source.xobject));
                operations.extend(place_xobject(
                    &name,
                    [
                        source.scale,
                        0.0,
                        0.0,
                        source.scale,
                        source.offset.0,
                        source.offset.1,
                    ],
                ));
            }
        }
    }

    let content = Content { operations }.encode()?;
    let content_id = pdf.add_object(Stream::new(Dictionary::new(), content));

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Reference(fonts_id));
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page.width),
            Object::Real(page.height),
        ]),
    );
    page_dict.set("Resources", Object::Dictionary(resources));
    page_dict.set("Contents", Object::Reference(content_id));

    Ok(pdf.add_object(page_dict))
}

fn text_operations(run: &TextRun, page_height: f32) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(run.font.resource_name().as_bytes().to_vec()),
                Object::Real(run.size),
            ],
        ),
        Operation::new(
            "Td",
            vec![Object::Real(run.x), Object::Real(page_height - run.y)],
        ),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&run.text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

fn place_xobject(name: &str, matrix: [f32; 6]) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("cm", matrix.iter().map(|&v| Object::Real(v)).collect()),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

// =============================================================================
// Text Encoding
// =============================================================================

/// Encode text for the standard fonts' WinAnsi encoding.
///
/// Characters without a WinAnsi code become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            0x20..=0x7E | 0xA0..=0xFF => ch as u8,
            _ => win_ansi_extra(ch).unwrap_or(REPLACEMENT_BYTE),
        })
        .collect()
}

/// Codes 0x80–0x9F, where WinAnsi departs from Latin-1
fn win_ansi_extra(ch: char) -> Option<u8> {
    let byte = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

//! Page-break state machine
//!
//! A [`PageFlow`] is created for each input file. It owns the vertical
//! cursor, starts pages, repeats the header block on every content page and
//! stamps the footer note before a page is left behind.

use crate::classify::InputFile;
use crate::constants::*;
use crate::layout::{Document, Font, ImageItem, PageItem, Rect, SourcePageItem, TextRun};
use crate::options::RenderSettings;
use lopdf::ObjectId;

pub(crate) struct PageFlow<'a> {
    doc: &'a mut Document,
    settings: &'a RenderSettings,
    file: &'a InputFile,
    /// Distance from the top of the current page
    cursor: f32,
}

impl<'a> PageFlow<'a> {
    pub fn new(doc: &'a mut Document, settings: &'a RenderSettings, file: &'a InputFile) -> Self {
        Self {
            doc,
            settings,
            file,
            cursor: settings.margin_pt,
        }
    }

    pub fn settings(&self) -> &'a RenderSettings {
        self.settings
    }

    pub fn page_size(&self) -> (f32, f32) {
        self.doc.page_size()
    }

    pub fn pdf_mut(&mut self) -> &mut lopdf::Document {
        self.doc.pdf_mut()
    }

    /// Start a blank page with the cursor at the top margin
    pub fn start_page(&mut self) {
        self.doc.push_page();
        self.cursor = self.settings.margin_pt;
    }

    /// Start a page and write the header block on it
    pub fn start_content_page(&mut self) {
        self.start_page();
        self.write_header();
    }

    fn write_header(&mut self) {
        let settings = self.settings;
        let file = self.file;
        let advance = settings.line_height_pt * HEADER_LINE_ADVANCE;

        if let Some(note) = settings.header_note() {
            self.place_text(note, Font::Bold, HEADER_FONT_SIZE_PT);
            self.cursor += advance;
        }

        if settings.show_file_info {
            self.place_text(&format!("File: {}", file.name), Font::Bold, HEADER_FONT_SIZE_PT);
            self.cursor += advance;
            self.place_text(
                &format!("File Path: {}", file.relative_path),
                Font::Bold,
                FILE_PATH_FONT_SIZE_PT,
            );
            self.cursor += advance;
        }
    }

    /// Emit one wrapped body line, breaking to a new page first if needed
    pub fn emit_line(&mut self, line: &str) {
        let settings = self.settings;
        let (_, page_height) = self.page_size();

        if self.cursor + settings.line_height_pt > page_height - settings.reserved_space() {
            self.stamp_footer();
            log::debug!(
                "Page break in {} after page {}",
                self.file.name,
                self.doc.page_count()
            );
            self.start_content_page();
        }

        self.place_text(line, Font::Regular, settings.font_size_pt);
        self.cursor += settings.line_height_pt;
    }

    /// Close the file: footer on the current page if it fits, else on a page of its own
    pub fn finish_file(&mut self) {
        if self.settings.footer_note().is_none() {
            return;
        }

        let (_, page_height) = self.page_size();
        if self.cursor + self.settings.line_height_pt > page_height - self.settings.margin_pt {
            self.start_page();
        }
        self.stamp_footer();
    }

    fn stamp_footer(&mut self) {
        let settings = self.settings;
        let Some(note) = settings.footer_note() else {
            return;
        };

        let (_, page_height) = self.page_size();
        let run = TextRun {
            x: settings.margin_pt,
            y: page_height - settings.margin_pt - settings.line_height_pt,
            text: note.to_string(),
            font: Font::Oblique,
            size: FOOTER_FONT_SIZE_PT,
        };
        self.push_item(PageItem::Text(run));
    }

    /// Place an image XObject of `pixel_width` × `pixel_height` below the cursor
    pub fn place_image(&mut self, xobject: ObjectId, pixel_width: u32, pixel_height: u32) {
        let margin = self.settings.margin_pt;
        let (page_width, page_height) = self.page_size();

        let frame_width = (page_width - 2.0 * margin) * IMAGE_WIDTH_RATIO;
        let frame_height = frame_width * IMAGE_ASPECT_RATIO;

        let needed = IMAGE_MIN_ROOM_PT.max(frame_height);
        if self.cursor + needed > page_height - margin {
            self.start_content_page();
        }

        let frame = Rect::new(
            (page_width - frame_width) / 2.0,
            self.cursor,
            frame_width,
            frame_height,
        );
        let drawn = fit_inside(&frame, pixel_width as f32, pixel_height as f32);

        self.push_item(PageItem::Image(ImageItem {
            frame,
            drawn,
            xobject,
        }));
        self.cursor += frame_height + IMAGE_SPACING_PT;
    }

    /// Add a page holding only a copied source page
    pub fn push_source_page(&mut self, item: SourcePageItem) {
        self.doc.push_page().items.push(PageItem::SourcePage(item));
    }

    fn place_text(&mut self, text: &str, font: Font, size: f32) {
        let run = TextRun {
            x: self.settings.margin_pt,
            y: self.cursor,
            text: text.to_string(),
            font,
            size,
        };
        self.push_item(PageItem::Text(run));
    }

    fn push_item(&mut self, item: PageItem) {
        match self.doc.current_page_mut() {
            Some(page) => page.items.push(item),
            None => self.doc.push_page().items.push(item),
        }
    }
}

/// Largest rect with the bitmap's aspect ratio centered inside `frame`
fn fit_inside(frame: &Rect, width: f32, height: f32) -> Rect {
    if width <= 0.0 || height <= 0.0 {
        return *frame;
    }
    let scale = (frame.width / width).min(frame.height / height);
    let drawn_width = width * scale;
    let drawn_height = height * scale;
    Rect::new(
        frame.x + (frame.width - drawn_width) / 2.0,
        frame.y + (frame.height - drawn_height) / 2.0,
        drawn_width,
        drawn_height,
    )
}

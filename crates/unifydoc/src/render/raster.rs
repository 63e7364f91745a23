//! Raster images
//!
//! The bitmap is decoded before any page is started, then drawn inside a
//! fixed frame (half the printable width, 3:4 height) centered on the page.

use super::Renderer;
use crate::assemble::PageFlow;
use crate::classify::InputFile;
use crate::types::*;
use image::DynamicImage;
use lopdf::{Dictionary, Object, ObjectId, Stream};

pub(crate) struct ImageRenderer;

impl Renderer for ImageRenderer {
    fn render(&self, file: &InputFile, flow: &mut PageFlow<'_>) -> Result<()> {
        let decoded = image::open(&file.path)?;
        let bitmap = Bitmap::from_image(&decoded);

        flow.start_content_page();
        let xobject = bitmap.add_to(flow.pdf_mut());
        flow.place_image(xobject, bitmap.width, bitmap.height);
        flow.finish_file();
        Ok(())
    }
}

/// Decoded pixels in the layout the PDF image XObject expects
pub(crate) struct Bitmap {
    pub width: u32,
    pub height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl Bitmap {
    pub fn from_image(img: &DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let mut rgb = Vec::with_capacity((width * height * 3) as usize);
            let mut alpha = Vec::with_capacity((width * height) as usize);
            for pixel in rgba.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
                alpha.push(pixel.0[3]);
            }
            Self {
                width,
                height,
                rgb,
                alpha: Some(alpha),
            }
        } else {
            Self {
                width,
                height,
                rgb: img.to_rgb8().into_raw(),
                alpha: None,
            }
        }
    }

    /// Add the image (and its soft mask) to the output document
    pub fn add_to(&self, pdf: &mut lopdf::Document) -> ObjectId {
        let mut dict = self.image_dict(b"DeviceRGB");
        if let Some(alpha) = &self.alpha {
            let mask_id = pdf.add_object(Stream::new(
                self.image_dict(b"DeviceGray"),
                alpha.clone(),
            ));
            dict.set("SMask", Object::Reference(mask_id));
        }
        pdf.add_object(Stream::new(dict, self.rgb.clone()))
    }

    fn image_dict(&self, color_space: &[u8]) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(self.width as i64));
        dict.set("Height", Object::Integer(self.height as i64));
        dict.set("ColorSpace", Object::Name(color_space.to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict
    }
}

//! Image processing functionality for DOCX output

use std::borrow::Cow;
use std::io::Cursor;

use docx_rs::*;

use crate::Result;
use crate::output::ImageRun;

/// English Metric Units per CSS pixel.
const EMU_PER_PIXEL: f64 = 9525.0;

/// Image processor for DOCX documents
pub struct DocxImageProcessor;

impl DocxImageProcessor {
    /// Create a new image processor
    pub fn new() -> Self {
        Self
    }

    /// Creates a picture at the display size of the image. Formats other
    /// than PNG and JPEG are converted to PNG first.
    pub fn create_pic(&self, image: &ImageRun) -> Result<Pic> {
        let data = match image::guess_format(&image.data) {
            Ok(image::ImageFormat::Png | image::ImageFormat::Jpeg) => Cow::Borrowed(&*image.data),
            _ => Cow::Owned(self.convert_to_png(&image.data)?),
        };

        Ok(Pic::new(&data).size(px_to_emu(image.width), px_to_emu(image.height)))
    }

    fn convert_to_png(&self, data: &[u8]) -> Result<Vec<u8>> {
        let img = image::load_from_memory(data)
            .map_err(|e| format!("Unable to load image: {e}"))?;

        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .map_err(|e| format!("PNG encoding error: {e}"))?;
        Ok(buffer)
    }
}

fn px_to_emu(px: f64) -> u32 {
    (px.max(0.0) * EMU_PER_PIXEL).round() as u32
}

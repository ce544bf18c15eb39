//! PNG encoding
//!
//! Straight-alpha RGBA bitmaps go through the `image` crate's PNG encoder.

use image::{ImageBuffer, ImageEncoder, RgbaImage};
use snipprok_core::{
    error::{ExportError, Result},
    traits::Encoder,
    types::BitmapData,
};

/// First eight bytes of every PNG stream
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode an RGBA bitmap as PNG
///
/// The buffer must hold exactly `width * height * 4` bytes.
pub fn encode_bitmap_to_png(bitmap: &BitmapData) -> Result<Vec<u8>> {
    let expected = (bitmap.width as usize)
        .checked_mul(bitmap.height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| {
            ExportError::EncodingFailed(format!(
                "{}x{} bitmap is too large",
                bitmap.width, bitmap.height
            ))
        })?;

    if bitmap.width == 0 || bitmap.height == 0 {
        return Err(ExportError::EncodingFailed(format!(
            "cannot encode an empty {}x{} bitmap",
            bitmap.width, bitmap.height
        ))
        .into());
    }
    if bitmap.data.len() != expected {
        return Err(ExportError::EncodingFailed(format!(
            "Buffer size mismatch: expected {} bytes for {}x{} RGBA, got {}",
            expected,
            bitmap.width,
            bitmap.height,
            bitmap.data.len()
        ))
        .into());
    }

    let img: RgbaImage = ImageBuffer::from_raw(bitmap.width, bitmap.height, bitmap.data.clone())
        .ok_or_else(|| ExportError::EncodingFailed("Failed to create image buffer".into()))?;

    let mut png_data = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        &mut png_data,
        image::codecs::png::CompressionType::Default,
        image::codecs::png::FilterType::Sub,
    );
    encoder
        .write_image(img.as_raw(), bitmap.width, bitmap.height, image::ExtendedColorType::Rgba8)
        .map_err(|e| ExportError::EncodingFailed(format!("PNG encoding failed: {e}")))?;

    log::debug!(
        "encoded {}x{} PNG ({} bytes)",
        bitmap.width,
        bitmap.height,
        png_data.len()
    );
    Ok(png_data)
}

/// PNG encoder stage backend
#[derive(Debug, Default, Clone, Copy)]
pub struct PngExporter;

impl PngExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for PngExporter {
    fn name(&self) -> &'static str {
        "png"
    }

    fn encode(&self, bitmap: &BitmapData) -> Result<Vec<u8>> {
        encode_bitmap_to_png(bitmap)
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

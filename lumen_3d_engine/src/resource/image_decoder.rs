//! Image decoding seam.
//!
//! Textures never touch image files directly: they receive decoded pixels
//! from an [`ImageDecoder`]. [`ImageFileDecoder`] is the stock
//! implementation backed by the `image` crate.

use std::path::Path;

use crate::error::{Error, Result};

/// Decoded 8-bit image, rows stored top to bottom unless flipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Tightly packed pixel data
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Channels per pixel (1 to 4)
    pub channels: u32,
}

impl DecodedImage {
    /// Solid single-color RGBA image
    pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = color.iter().copied().cycle().take(Self::packed_len(width, height, 4)).collect();
        Self { pixels, width, height, channels: 4 }
    }

    /// Byte length of tightly packed pixels, computed without `u32` overflow
    pub fn packed_len(width: u32, height: u32, channels: u32) -> usize {
        width as usize * height as usize * channels as usize
    }
}

/// Decodes an image file into raw pixels
pub trait ImageDecoder {
    /// Decode the file at `path`; unreadable or unsupported files yield
    /// [`Error::ResourceLoad`]
    fn decode(&self, path: &Path) -> Result<DecodedImage>;
}

/// `image`-crate decoder (PNG and JPEG)
///
/// The vertical flip is chosen once, when the decoder is created, and then
/// applies to every image it decodes.
#[derive(Debug, Clone, Copy)]
pub struct ImageFileDecoder {
    flip_vertically: bool,
}

impl ImageFileDecoder {
    pub fn new(flip_vertically: bool) -> Self {
        Self { flip_vertically }
    }

    pub fn flip_vertically(&self) -> bool {
        self.flip_vertically
    }
}

impl Default for ImageFileDecoder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ImageDecoder for ImageFileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let image = image::open(path).map_err(|e| Error::resource_load(path, e))?;
        let image = if self.flip_vertically { image.flipv() } else { image };

        let (width, height) = (image.width(), image.height());
        let (pixels, channels) = match image.color().channel_count() {
            1 => (image.to_luma8().into_raw(), 1),
            2 => (image.to_luma_alpha8().into_raw(), 2),
            3 => (image.to_rgb8().into_raw(), 3),
            _ => (image.to_rgba8().into_raw(), 4),
        };

        Ok(DecodedImage { pixels, width, height, channels })
    }
}

#[cfg(test)]
#[path = "image_decoder_tests.rs"]
mod tests;

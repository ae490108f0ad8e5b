//! Raster images exchanged with rendering and capture collaborators.

use serde::{Deserialize, Serialize};

/// An 8-bit RGB raster, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterImage {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Pixel data, `width * height * 3` bytes
    #[serde(skip_serializing)]
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Create a raster from packed RGB bytes.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Self {
        Self { width, height, rgb }
    }

    /// A raster filled with one color.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut rgb = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            rgb.extend_from_slice(&color);
        }
        Self { width, height, rgb }
    }

    /// Number of bytes the dimensions call for.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Whether the buffer matches the dimensions and is non-empty.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.rgb.len() == self.expected_len()
    }

    /// Size of the pixel data in bytes.
    pub fn size(&self) -> usize {
        self.rgb.len()
    }

    /// Whether the image is wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

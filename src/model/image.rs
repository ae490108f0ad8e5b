//! Image XObjects carried from the source document into blocks.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{GrayImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::geometry::Affine;

/// How an embedded image's `data` is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    /// Unfiltered samples, row-major, no padding
    Raw,
    /// A JPEG file (`/DCTDecode`)
    Jpeg,
    /// A JPEG 2000 codestream (`/JPXDecode`)
    Jpeg2000,
}

impl ImageEncoding {
    /// The PDF filter that reads this encoding back.
    pub fn pdf_filter(self) -> &'static str {
        match self {
            ImageEncoding::Raw => "FlateDecode",
            ImageEncoding::Jpeg => "DCTDecode",
            ImageEncoding::Jpeg2000 => "JPXDecode",
        }
    }
}

/// Device color space of an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
}

impl ImageColorSpace {
    /// Parse a PDF color space name.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"DeviceGray" | b"G" => Some(ImageColorSpace::DeviceGray),
            b"DeviceRGB" | b"RGB" => Some(ImageColorSpace::DeviceRGB),
            b"DeviceCMYK" | b"CMYK" => Some(ImageColorSpace::DeviceCMYK),
            _ => None,
        }
    }

    /// The PDF name.
    pub fn name(self) -> &'static str {
        match self {
            ImageColorSpace::DeviceGray => "DeviceGray",
            ImageColorSpace::DeviceRGB => "DeviceRGB",
            ImageColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }

    pub fn components(self) -> usize {
        match self {
            ImageColorSpace::DeviceGray => 1,
            ImageColorSpace::DeviceRGB => 3,
            ImageColorSpace::DeviceCMYK => 4,
        }
    }
}

/// A raster image XObject lifted out of a page.
///
/// `frame` maps the image's unit square (PDF image space, y up) into the
/// coordinate space of whatever holds it: viewport pixels on a
/// [`crate::backend::VectorNode`], the block's local box on a
/// [`crate::model::VectorContent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// Width in samples
    pub width: u32,

    /// Height in samples
    pub height: u32,

    pub color_space: ImageColorSpace,

    pub bits_per_component: u8,

    pub encoding: ImageEncoding,

    /// Sample data in `encoding`
    #[serde(default, skip_serializing)]
    pub data: Vec<u8>,

    /// Unit square to owner space
    pub frame: Affine,
}

impl EmbeddedImage {
    /// Bytes a raw image of these dimensions holds.
    pub fn expected_raw_len(&self) -> usize {
        let bits = self.width as usize * self.color_space.components() * self.bits_per_component as usize;
        bits.div_ceil(8) * self.height as usize
    }

    /// Whether the data is plausible for the dimensions and encoding.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && !self.data.is_empty()
            && (self.encoding != ImageEncoding::Raw || self.data.len() == self.expected_raw_len())
    }

    /// The same image under a different frame.
    pub fn with_frame(&self, frame: Affine) -> Self {
        Self {
            frame,
            ..self.clone()
        }
    }

    /// MIME type of [`EmbeddedImage::data_url`].
    pub fn mime_type(&self) -> &'static str {
        match self.encoding {
            ImageEncoding::Raw => "image/png",
            ImageEncoding::Jpeg => "image/jpeg",
            ImageEncoding::Jpeg2000 => "image/jp2",
        }
    }

    /// The image as a `data:` URL, converting raw samples to PNG.
    ///
    /// Returns `None` for raw images that are not 8 bits per component.
    pub fn data_url(&self) -> Option<String> {
        let bytes = match self.encoding {
            ImageEncoding::Raw => self.to_png()?,
            ImageEncoding::Jpeg | ImageEncoding::Jpeg2000 => self.data.clone(),
        };
        Some(format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(bytes)))
    }

    fn to_png(&self) -> Option<Vec<u8>> {
        if self.bits_per_component != 8 || !self.is_valid() {
            return None;
        }
        let mut png = Vec::new();
        let mut cursor = Cursor::new(&mut png);
        let written = match self.color_space {
            ImageColorSpace::DeviceGray => GrayImage::from_raw(self.width, self.height, self.data.clone())?
                .write_to(&mut cursor, ImageFormat::Png),
            ImageColorSpace::DeviceRGB => RgbImage::from_raw(self.width, self.height, self.data.clone())?
                .write_to(&mut cursor, ImageFormat::Png),
            ImageColorSpace::DeviceCMYK => {
                let rgb = self
                    .data
                    .chunks_exact(4)
                    .flat_map(|px| {
                        let k = 255 - u16::from(px[3]);
                        [0, 1, 2].map(|i| ((255 - u16::from(px[i])) * k / 255) as u8)
                    })
                    .collect();
                RgbImage::from_raw(self.width, self.height, rgb)?.write_to(&mut cursor, ImageFormat::Png)
            }
        };
        match written {
            Ok(()) => Some(png),
            Err(e) => {
                log::debug!("PNG encoding failed: {}", e);
                None
            }
        }
    }

    /// SVG `<image>` element covering the frame.
    ///
    /// SVG images run y down from their top-left corner, so the unit square
    /// is flipped before the frame applies.
    pub fn svg_markup(&self) -> String {
        let [a, b, c, d, e, f] = (self.frame * Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, 1.0])).as_coeffs();
        let href = self
            .data_url()
            .map(|url| format!(" href=\"{url}\""))
            .unwrap_or_default();
        format!(
            "<image width=\"1\" height=\"1\" preserveAspectRatio=\"none\" transform=\"matrix({a} {b} {c} {d} {e} {f})\"{href}/>"
        )
    }
}

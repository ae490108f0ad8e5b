//! Rasterized export of the edited scene.
//!
//! Each page is captured as an image by a [`ScreenshotCapture`] and placed,
//! full bleed, on a page of an output document built by a
//! [`DocumentAssembler`]. Pages go strictly one after another in index
//! order. Any failure aborts before the assembler is finalized, so no partial
//! file is produced.

use crate::backend::{CaptureOptions, DocumentAssembler, Orientation, ScreenshotCapture};
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size, PX_TO_PT};
use crate::scene::SceneModel;

/// Lowest device pixel ratio used for captures.
pub const MIN_DEVICE_PIXEL_RATIO: f64 = 2.0;

/// Export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Capture device pixel ratio, never below [`MIN_DEVICE_PIXEL_RATIO`]
    pub device_pixel_ratio: f64,

    /// Background fill behind each capture
    pub background: Option<String>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device pixel ratio; values below the minimum are raised to it.
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Set the background fill.
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    /// The ratio actually used for captures.
    pub fn effective_ratio(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() {
            self.device_pixel_ratio.max(MIN_DEVICE_PIXEL_RATIO)
        } else {
            MIN_DEVICE_PIXEL_RATIO
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            device_pixel_ratio: MIN_DEVICE_PIXEL_RATIO,
            background: Some("#ffffff".to_string()),
        }
    }
}

/// Output page size in points for a page of `size` CSS pixels.
pub fn page_size_pt(size: Size) -> Size {
    Size::new(size.width * PX_TO_PT, size.height * PX_TO_PT)
}

/// Capture every page of the scene and assemble the images into one document.
pub fn export(
    scene: &SceneModel,
    capture: &mut dyn ScreenshotCapture,
    assembler: &mut dyn DocumentAssembler,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    if scene.page_count() == 0 {
        return Err(Error::Export("scene has no pages".to_string()));
    }
    let capture_options = CaptureOptions {
        scale: options.effective_ratio(),
        background: options.background.clone(),
    };

    for (n, page) in scene.pages().enumerate() {
        let blocks = scene.blocks_on_page(page.index);
        let image = capture
            .capture(page, &blocks, &capture_options)
            .map_err(|e| match e {
                Error::Capture { .. } => e,
                other => Error::Capture {
                    page: page.index + 1,
                    reason: other.to_string(),
                },
            })?;
        if !image.is_valid() {
            return Err(Error::Capture {
                page: page.index + 1,
                reason: format!("{}x{} image has a malformed buffer", image.width, image.height),
            });
        }

        // The capture is taken at the device pixel ratio; divide it back out
        // so the page keeps its CSS-pixel size.
        let css = Size::new(
            f64::from(image.width) / capture_options.scale,
            f64::from(image.height) / capture_options.scale,
        );
        let size = page_size_pt(css);
        let orientation = Orientation::from_size(size);

        if n == 0 {
            assembler.new_document(size, orientation)?;
        } else {
            assembler.add_page(size, orientation)?;
        }
        assembler.embed_image(&image, Rect::new(0.0, 0.0, size.width, size.height))?;
        log::info!(
            "Exported page {} ({:.0}x{:.0} pt, {} blocks)",
            page.index + 1,
            size.width,
            size.height,
            blocks.len()
        );
    }

    assembler.finalize()
}

//! Collaborator boundary.
//!
//! The engine never decodes, rasterizes, screenshots, or assembles documents
//! itself. Those jobs sit behind the traits here so the concrete library
//! (lopdf today) stays isolated from extraction and editing logic.

mod image_placements;
mod lopdf_renderer;
mod pdf_assembler;
mod text_runs;

pub use lopdf_renderer::LopdfRenderer;
pub use pdf_assembler::PdfAssembler;

pub(crate) use pdf_assembler::PageTree;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Affine, Rect, Size, Viewport};
use crate::model::{Block, EmbeddedImage, Metadata, Page, RasterImage};

/// Page orientation chosen from its width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape when wider than tall.
    pub fn from_size(size: Size) -> Self {
        if size.width > size.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// One positioned text run as reported by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRunInput {
    /// Decoded text
    pub text: String,

    /// Advance width in document units
    pub width: f64,

    /// Run height in document units
    pub height: f64,

    /// Placement matrix in document space (font size included)
    pub transform: Affine,

    /// Key into [`TextContentInput::styles`]
    pub font_ref: String,

    /// Fill color in effect when the run was shown
    pub color: Option<String>,
}

/// What a renderer knows about a font.
///
/// Every field is optional; missing values fall back to name heuristics and
/// then to defaults during extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRecord {
    /// Generic or concrete family, e.g. "serif", "Helvetica"
    pub font_family: Option<String>,

    /// Full font name, e.g. "Helvetica-BoldOblique"
    pub font_name: Option<String>,

    /// Numeric weight from the font descriptor
    pub weight: Option<u16>,

    /// Italic flag from the font descriptor
    pub italic: Option<bool>,

    /// Default fill color
    pub color: Option<String>,
}

/// Text runs of one page plus the style table they reference.
#[derive(Debug, Clone, Default)]
pub struct TextContentInput {
    /// Runs in content stream order
    pub runs: Vec<TextRunInput>,

    /// Style records keyed by font reference
    pub styles: HashMap<String, StyleRecord>,
}

/// A top-level node of a page's vector tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorNode {
    /// Element name, e.g. "path", "g", "defs"
    pub tag: String,

    /// Full markup of the node in viewport coordinates
    pub markup: String,

    /// Bounding box in viewport coordinates, if computable
    pub bbox: Option<Rect>,

    /// Source image XObject, for `image` nodes
    pub image: Option<EmbeddedImage>,
}

impl VectorNode {
    /// An `image` node for an image whose frame is in viewport pixels.
    pub fn image(image: EmbeddedImage) -> Self {
        let bbox = image.frame.transform_rect_bbox(Rect::new(0.0, 0.0, 1.0, 1.0));
        Self {
            tag: "image".to_string(),
            markup: image.svg_markup(),
            bbox: Some(bbox),
            image: Some(image),
        }
    }

    /// Whether this is the shared definitions node.
    pub fn is_defs(&self) -> bool {
        self.tag.eq_ignore_ascii_case("defs")
    }
}

/// A page's vector content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorTree {
    /// Shared reusable definitions
    pub defs: String,

    /// Top-level nodes in paint order
    pub nodes: Vec<VectorNode>,
}

/// Decodes a source document and exposes per-page content.
pub trait DocumentRenderer {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Viewport of a page (0-based) at the given scale.
    fn viewport(&self, page: u32, scale: f64) -> Result<Viewport>;

    /// Rasterize a page. Returns [`crate::Error::Unavailable`] when the
    /// renderer cannot rasterize.
    fn render(&self, page: u32, viewport: &Viewport) -> Result<RasterImage>;

    /// Text runs and the style table of a page.
    fn text_content(&self, page: u32) -> Result<TextContentInput>;

    /// Vector tree of a page in viewport coordinates.
    fn vector_tree(&self, page: u32, viewport: &Viewport) -> Result<VectorTree>;

    /// Document metadata.
    fn metadata(&self) -> Metadata {
        Metadata {
            page_count: self.page_count(),
            ..Metadata::default()
        }
    }
}

/// Options passed to a screenshot collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Device pixel ratio
    pub scale: f64,

    /// Background fill, if any
    pub background: Option<String>,
}

/// Rasterizes the presented state of one page.
pub trait ScreenshotCapture {
    /// Capture a page with its blocks given bottom to top.
    fn capture(&mut self, page: &Page, blocks: &[&Block], options: &CaptureOptions)
        -> Result<RasterImage>;
}

/// Builds an output document from an ordered sequence of page images.
pub trait DocumentAssembler {
    /// Start the document with its first page.
    fn new_document(&mut self, size_pt: Size, orientation: Orientation) -> Result<()>;

    /// Start another page.
    fn add_page(&mut self, size_pt: Size, orientation: Orientation) -> Result<()>;

    /// Draw an image on the current page. `rect` is in points with the origin
    /// at the top-left corner.
    fn embed_image(&mut self, image: &RasterImage, rect: Rect) -> Result<()>;

    /// Finish and return the document bytes.
    fn finalize(&mut self) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_size() {
        assert_eq!(
            Orientation::from_size(Size::new(842.0, 595.0)),
            Orientation::Landscape
        );
        assert_eq!(
            Orientation::from_size(Size::new(595.0, 842.0)),
            Orientation::Portrait
        );
        assert_eq!(
            Orientation::from_size(Size::new(500.0, 500.0)),
            Orientation::Portrait
        );
    }

    #[test]
    fn test_defs_node_detection() {
        let node = VectorNode {
            tag: "defs".to_string(),
            markup: "<defs/>".to_string(),
            bbox: None,
            image: None,
        };
        assert!(node.is_defs());
    }

    #[test]
    fn test_image_node_box_covers_frame() {
        let image = EmbeddedImage {
            width: 1,
            height: 1,
            color_space: crate::model::ImageColorSpace::DeviceGray,
            bits_per_component: 8,
            encoding: crate::model::ImageEncoding::Raw,
            data: vec![0],
            frame: Affine::new([0.0, 40.0, -30.0, 0.0, 100.0, 10.0]),
        };
        let node = VectorNode::image(image);
        assert_eq!(node.tag, "image");
        assert!(!node.is_defs());
        assert_eq!(node.bbox, Some(Rect::new(70.0, 10.0, 100.0, 50.0)));
        assert!(node.markup.starts_with("<image"));
    }
}

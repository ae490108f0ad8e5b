//! # pdfblocks
//!
//! Turn PDF pages into independently editable blocks.
//!
//! Each text run and each vector shape of a page becomes a [`Block`] with a
//! fixed base transform taken from the source document. User edits
//! (drag, rotate, resize) are kept separately as an [`EditState`] and
//! composed on top, so a block always lands exactly where its source
//! placement plus its edits say it should.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfblocks::{load_file, to_json, DocumentState, JsonFormat};
//!
//! fn main() -> pdfblocks::Result<()> {
//!     let loaded = load_file("document.pdf")?;
//!     println!("{} blocks", loaded.scene.len());
//!
//!     let state = DocumentState::from_scene(&loaded.scene);
//!     println!("{}", to_json(&state, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Exact placement**: text blocks keep the source typography's skew,
//!   rotation and scale in their base transform
//! - **Self-contained vectors**: every vector block carries its own defs
//! - **Images**: image XObjects become blocks that keep their samples
//! - **Single selection editing**: nudges, gestures, style toggles that
//!   return to the document's own styling
//! - **Export**: rasterized pages through pluggable collaborators, or a
//!   direct PDF rewrite of the text and images

pub mod backend;
pub mod color;
pub mod detect;
pub mod edit;
pub mod error;
pub mod export;
pub mod extract;
pub mod geometry;
pub mod loader;
pub mod model;
pub mod scene;
pub mod service;
pub mod transform;
pub mod transport;
pub mod writer;

// Re-export commonly used types
pub use backend::{
    DocumentAssembler, DocumentRenderer, LopdfRenderer, Orientation, PdfAssembler,
    ScreenshotCapture,
};
pub use detect::{is_pdf_bytes, sniff_bytes, sniff_path, SourceFormat};
pub use edit::{
    apply, EditConfig, EditController, EditIntent, EditOutcome, GestureEvent, PropertyEdit,
    StyleAxis,
};
pub use error::{Error, Result};
pub use export::{export, ExportOptions};
pub use extract::{extract_text, extract_vector, ExtractOptions};
pub use geometry::{Affine, BaseTransform, Point, Rect, Size, Vec2, Viewport};
pub use loader::{
    load_document, DocumentSession, ErrorMode, LoadOptions, LoadReport, LoadStatus, Loaded,
    PageSelection,
};
pub use model::{
    Block, BlockContent, BlockId, BlockKind, EmbeddedImage, FontSlant, FontWeight, ImageColorSpace,
    ImageEncoding, Metadata, Page, RasterImage, TextAlign, TextContent, TextStyle, Toggle,
    ToggleState, VectorContent,
};
pub use scene::{ReorderDirection, SceneModel, DUPLICATE_OFFSET};
pub use service::DocumentService;
pub use transform::{compose, compose_with, EditState, ScaleFrame};
pub use transport::{apply_state, to_json, DocumentState, DocumentSummary, JsonFormat};
pub use writer::write_pdf;

use std::path::Path;

/// Load a PDF file into a scene with default options.
///
/// # Example
///
/// ```no_run
/// use pdfblocks::load_file;
///
/// let loaded = load_file("document.pdf").unwrap();
/// println!("Pages: {}", loaded.scene.page_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Loaded> {
    load_file_with_options(path, &LoadOptions::default())
}

/// Load a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfblocks::{load_file_with_options, LoadOptions, PageSelection};
///
/// let options = LoadOptions::new()
///     .lenient()
///     .with_pages(PageSelection::Range(1..=3));
/// let loaded = load_file_with_options("document.pdf", &options).unwrap();
/// ```
pub fn load_file_with_options<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Loaded> {
    let path = path.as_ref();
    sniff_path(path)?;
    let renderer = LopdfRenderer::load_file(path)?;
    load_document(&renderer, options)
}

/// Load a PDF from bytes.
pub fn load_bytes(data: &[u8]) -> Result<Loaded> {
    load_bytes_with_options(data, &LoadOptions::default())
}

/// Load a PDF from bytes with custom options.
pub fn load_bytes_with_options(data: &[u8], options: &LoadOptions) -> Result<Loaded> {
    sniff_bytes(data)?;
    let renderer = LopdfRenderer::load_bytes(data)?;
    load_document(&renderer, options)
}

/// Builder for loading documents.
///
/// # Example
///
/// ```no_run
/// use pdfblocks::PdfBlocks;
///
/// let loaded = PdfBlocks::new()
///     .lenient()
///     .text_only()
///     .with_scale(2.0)
///     .open("document.pdf")?;
/// # Ok::<(), pdfblocks::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfBlocks {
    options: LoadOptions,
}

impl PdfBlocks {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep loading when a page's text cannot be read.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Extract text blocks only.
    pub fn text_only(mut self) -> Self {
        self.options.extract = self.options.extract.text_only();
        self
    }

    /// Set the rendering scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.options = self.options.with_scale(scale);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// The options this builder will load with.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load a file.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<Loaded> {
        load_file_with_options(path, &self.options)
    }

    /// Load from bytes.
    pub fn open_bytes(&self, data: &[u8]) -> Result<Loaded> {
        load_bytes_with_options(data, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let builder = PdfBlocks::new()
            .lenient()
            .text_only()
            .with_scale(2.0)
            .with_pages(PageSelection::Range(1..=5));

        let options = builder.options();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.extract.text);
        assert!(!options.extract.vectors);
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.pages, PageSelection::Range(1..=5));
    }

    #[test]
    fn test_builder_default() {
        let builder = PdfBlocks::default();
        assert_eq!(builder.options().error_mode, ErrorMode::Strict);
        assert_eq!(builder.options().scale, geometry::DEFAULT_RENDER_SCALE);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_load_bytes_empty_data() {
        assert!(matches!(load_bytes(&[]), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_load_bytes_unknown_magic() {
        let data = b"<!DOCTYPE html><html></html>";
        assert!(matches!(load_bytes(data), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_load_bytes_truncated_pdf() {
        // Valid header but no body
        let result = load_bytes(b"%PDF-1.7\n%test");
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_open_invalid_bytes() {
        assert!(PdfBlocks::new().open_bytes(b"not a pdf").is_err());
    }
}

//! Page-level types.

use serde::{Deserialize, Serialize};

use super::{BlockId, RasterImage};
use crate::geometry::{Size, Viewport};

/// A page of the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: u32,

    /// Viewport width in pixels at the load scale
    pub width: f64,

    /// Viewport height in pixels at the load scale
    pub height: f64,

    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,

    /// Document-to-pixel mapping the page was loaded with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,

    /// Block ids, bottom to top
    pub(crate) block_ids: Vec<BlockId>,

    /// Rendered page raster, when a rasterizer was available
    #[serde(skip)]
    pub background: Option<RasterImage>,
}

impl Page {
    /// Create an empty page with the given viewport size.
    pub fn new(index: u32, width: f64, height: f64) -> Self {
        Self {
            index,
            width,
            height,
            rotation: 0,
            viewport: None,
            block_ids: Vec::new(),
            background: None,
        }
    }

    /// Create an empty page sized and rotated after a viewport.
    pub fn from_viewport(index: u32, viewport: Viewport) -> Self {
        Self {
            rotation: viewport.rotation,
            viewport: Some(viewport),
            ..Self::new(index, viewport.width, viewport.height)
        }
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: u16) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the background raster.
    pub fn with_background(mut self, background: RasterImage) -> Self {
        self.background = Some(background);
        self
    }

    /// Block ids in paint order (bottom first).
    pub fn block_ids(&self) -> &[BlockId] {
        &self.block_ids
    }

    /// Number of blocks on the page.
    pub fn block_count(&self) -> usize {
        self.block_ids.len()
    }

    /// Check if the page has no blocks.
    pub fn is_empty(&self) -> bool {
        self.block_ids.is_empty()
    }

    /// Viewport size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the page is wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page() {
        let page = Page::new(0, 816.0, 1056.0);
        assert!(page.is_empty());
        assert_eq!(page.block_count(), 0);
        assert!(!page.is_landscape());
        assert_eq!(page.size(), Size::new(816.0, 1056.0));
    }

    #[test]
    fn test_page_from_viewport() {
        let vp = Viewport::for_page(crate::geometry::Rect::new(0.0, 0.0, 612.0, 792.0), 2.0, 90);
        let page = Page::from_viewport(1, vp);
        assert_eq!(page.size(), Size::new(1584.0, 1224.0));
        assert_eq!(page.rotation, 90);
        assert_eq!(page.viewport, Some(vp));
    }

    #[test]
    fn test_page_background_not_serialized() {
        let page = Page::new(2, 100.0, 50.0).with_background(RasterImage::filled(1, 1, [0, 0, 0]));
        let json = serde_json::to_string(&page).unwrap();
        assert!(!json.contains("background"));
        assert!(page.is_landscape());
    }
}

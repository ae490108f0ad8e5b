//! Blocks: the editable units of a page.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{EmbeddedImage, TextStyle};
use crate::geometry::{Affine, BaseTransform, Point, Rect, Size, Vec2};
use crate::transform::{block_outline, compose, outline_contains, EditState};

/// Unique block identifier.
///
/// Generated fresh on extraction and on duplication; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Generate a new random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its hyphenated string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of content a block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Vector,
    /// A vector block that carries an embedded raster image
    Image,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Text => write!(f, "text"),
            BlockKind::Vector => write!(f, "vector"),
            BlockKind::Image => write!(f, "image"),
        }
    }
}

/// Text run content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The run's text
    pub text: String,

    /// Font size in viewport pixels
    pub font_size: f64,

    /// Resolved style
    pub style: TextStyle,
}

impl TextContent {
    /// Create text content with a default style.
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            text: text.into(),
            font_size,
            style: TextStyle::default(),
        }
    }

    /// Set the style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

/// A self-contained vector graphic fragment.
///
/// `defs` is a private copy of the page's reusable definitions, so the block
/// renders the same after its siblings or the source tree are gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorContent {
    /// Reusable definitions (gradients, clip paths, patterns)
    pub defs: String,

    /// Shape markup, expressed relative to the block's local origin
    pub body: String,

    /// Bounding box of the shape in page space, before re-expression
    pub source_box: Rect,

    /// Source image, framed in the block's local box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbeddedImage>,
}

impl VectorContent {
    /// Render the fragment as a standalone SVG document of the given size.
    pub fn to_svg(&self, size: Size) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
            size.width, size.height, size.width, size.height
        );
        if !self.defs.is_empty() {
            svg.push_str("<defs>");
            svg.push_str(&self.defs);
            svg.push_str("</defs>");
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }
}

/// Block payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockContent {
    Text(TextContent),
    Vector(VectorContent),
}

impl BlockContent {
    /// The matching block kind.
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Vector(vector) if vector.image.is_some() => BlockKind::Image,
            BlockContent::Vector(_) => BlockKind::Vector,
        }
    }
}

/// One editable unit on a page.
///
/// The base transform is fixed at construction. Edit state, z-order and
/// content change only through [`crate::scene::SceneModel`] and
/// [`crate::edit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    page_index: u32,
    base: BaseTransform,
    edit: EditState,
    local_size: Size,
    z_order: u32,
    content: BlockContent,
}

impl Block {
    /// Create a text block with an identity edit state.
    pub fn text(page_index: u32, base: BaseTransform, local_size: Size, content: TextContent) -> Self {
        Self::new(page_index, base, local_size, BlockContent::Text(content))
    }

    /// Create a vector block with an identity edit state.
    pub fn vector(
        page_index: u32,
        base: BaseTransform,
        local_size: Size,
        content: VectorContent,
    ) -> Self {
        Self::new(page_index, base, local_size, BlockContent::Vector(content))
    }

    fn new(page_index: u32, base: BaseTransform, local_size: Size, content: BlockContent) -> Self {
        Self {
            id: BlockId::new(),
            page_index,
            base,
            edit: EditState::IDENTITY,
            local_size,
            z_order: 0,
            content,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    /// The placement derived from the source document.
    pub fn base(&self) -> &BaseTransform {
        &self.base
    }

    pub fn edit(&self) -> &EditState {
        &self.edit
    }

    /// Width and height in the block's untransformed local space.
    pub fn local_size(&self) -> Size {
        self.local_size
    }

    /// Position in the page's paint order, `1..=N` once in a scene.
    pub fn z_order(&self) -> u32 {
        self.z_order
    }

    pub fn content(&self) -> &BlockContent {
        &self.content
    }

    /// Text content, if this is a text block.
    pub fn as_text(&self) -> Option<&TextContent> {
        match &self.content {
            BlockContent::Text(text) => Some(text),
            BlockContent::Vector(_) => None,
        }
    }

    /// Vector content, if this is a vector block.
    pub fn as_vector(&self) -> Option<&VectorContent> {
        match &self.content {
            BlockContent::Vector(vector) => Some(vector),
            BlockContent::Text(_) => None,
        }
    }

    /// Base transform composed with the current edit state.
    pub fn composite(&self) -> Affine {
        compose(&self.base, &self.edit)
    }

    /// Map from the local pixel box to viewport pixels.
    ///
    /// This is the composite with the base axes normalised to unit length,
    /// so a text block's box is measured in pixels rather than in em units.
    /// Vector blocks already have unit base axes and get the composite as is.
    pub fn placement(&self) -> Affine {
        let unit = |len: f64| if len > 0.0 { 1.0 / len } else { 1.0 };
        let sx = unit(self.base.x_axis().hypot());
        let sy = unit(self.base.y_axis().hypot());
        if sx == 1.0 && sy == 1.0 {
            return self.composite();
        }
        self.composite() * Affine::scale_non_uniform(sx, sy)
    }

    /// Size of the placed box: each local extent times the length of its
    /// placement axis.
    pub fn composite_size(&self) -> Size {
        let [a, b, c, d, ..] = self.placement().as_coeffs();
        Size::new(
            self.local_size.width * Vec2::new(a, b).hypot(),
            self.local_size.height * Vec2::new(c, d).hypot(),
        )
    }

    /// Corners of the placed box in viewport pixels.
    pub fn outline(&self) -> [Point; 4] {
        block_outline(self.placement(), self.local_size)
    }

    /// Whether a viewport point falls inside the placed box.
    pub fn contains(&self, point: Point) -> bool {
        outline_contains(self.placement(), self.local_size, point)
    }

    pub(crate) fn edit_mut(&mut self) -> &mut EditState {
        &mut self.edit
    }

    pub(crate) fn content_mut(&mut self) -> &mut BlockContent {
        &mut self.content
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut TextContent> {
        match &mut self.content {
            BlockContent::Text(text) => Some(text),
            BlockContent::Vector(_) => None,
        }
    }

    /// Ratio of the font size to the size the base transform was typeset
    /// at. 1 for vector blocks and for text whose size was never edited.
    pub fn font_scale(&self) -> f64 {
        let typeset = self.base.font_height();
        match &self.content {
            BlockContent::Text(text) if typeset > 0.0 && text.font_size > 0.0 => {
                text.font_size / typeset
            }
            _ => 1.0,
        }
    }

    /// Rescale the local box after the font size changed from `previous`.
    pub(crate) fn fit_box_to_font(&mut self, previous: f64) {
        let Some(size) = self.as_text().map(|text| text.font_size) else {
            return;
        };
        if previous > 0.0 && size > 0.0 {
            let ratio = size / previous;
            self.local_size = Size::new(self.local_size.width * ratio, self.local_size.height * ratio);
        }
    }

    pub(crate) fn set_z_order(&mut self, z_order: u32) {
        self.z_order = z_order;
    }

    /// Clone under a fresh id with the edit translation shifted by `offset`.
    pub(crate) fn duplicate(&self, offset: f64) -> Block {
        let mut clone = self.clone();
        clone.id = BlockId::new();
        clone.edit.translate_x += offset;
        clone.edit.translate_y += offset;
        clone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text_block() -> Block {
        Block::text(
            0,
            BaseTransform::new(Affine::new([16.0, 0.0, 0.0, 16.0, 66.0, 120.0])),
            Size::new(80.0, 16.0),
            TextContent::new("Hello", 16.0),
        )
    }

    #[test]
    fn test_new_block_has_identity_edit() {
        let block = sample_text_block();
        assert!(block.edit().is_identity());
        assert_eq!(block.kind(), BlockKind::Text);
        assert_eq!(block.composite(), block.base().affine());
        assert!(block.as_vector().is_none());
    }

    #[test]
    fn test_block_ids_are_unique() {
        let a = sample_text_block();
        let b = sample_text_block();
        assert_ne!(a.id(), b.id());
        assert_eq!(BlockId::parse(&a.id().to_string()), Some(a.id()));
        assert_eq!(BlockId::parse("not-a-uuid"), None);
    }

    #[test]
    fn test_duplicate_offsets_edit_only() {
        let block = sample_text_block();
        let copy = block.duplicate(10.0);
        assert_ne!(copy.id(), block.id());
        assert_eq!(copy.base(), block.base());
        assert_eq!(copy.edit().translate_x, 10.0);
        assert_eq!(copy.edit().translate_y, 10.0);
        assert_eq!(copy.content(), block.content());
    }

    #[test]
    fn test_composite_size_follows_axes() {
        let mut block = Block::vector(
            1,
            BaseTransform::from_translation(10.0, 20.0),
            Size::new(30.0, 40.0),
            VectorContent {
                defs: String::new(),
                body: "<rect width=\"30\" height=\"40\"/>".to_string(),
                source_box: Rect::new(10.0, 20.0, 40.0, 60.0),
                image: None,
            },
        );
        assert_eq!(block.composite_size(), Size::new(30.0, 40.0));
        block.edit_mut().scale_x = 2.0;
        assert_eq!(block.composite_size(), Size::new(60.0, 40.0));
    }

    #[test]
    fn test_text_placement_is_pixel_box() {
        let mut block = sample_text_block();
        assert_eq!(block.composite_size(), Size::new(80.0, 16.0));
        assert!(block.contains(Point::new(100.0, 130.0)));
        assert!(!block.contains(Point::new(150.0, 130.0)));

        block.edit_mut().scale_y = 2.0;
        assert_eq!(block.composite_size(), Size::new(80.0, 32.0));
        let corners = block.outline();
        assert_eq!(corners[0], Point::new(66.0, 120.0));
        assert_eq!(corners[2], Point::new(146.0, 152.0));
    }

    #[test]
    fn test_font_edit_scales_box() {
        let mut block = sample_text_block();
        assert_eq!(block.font_scale(), 1.0);

        if let Some(text) = block.text_mut() {
            text.font_size = 32.0;
        }
        block.fit_box_to_font(16.0);
        assert_eq!(block.font_scale(), 2.0);
        assert_eq!(block.local_size(), Size::new(160.0, 32.0));
        assert_eq!(block.composite(), block.base().affine());
    }

    #[test]
    fn test_image_content_has_image_kind() {
        let image = crate::model::EmbeddedImage {
            width: 1,
            height: 1,
            color_space: crate::model::ImageColorSpace::DeviceRGB,
            bits_per_component: 8,
            encoding: crate::model::ImageEncoding::Raw,
            data: vec![0; 3],
            frame: Affine::scale_non_uniform(30.0, 40.0),
        };
        let block = Block::vector(
            0,
            BaseTransform::from_translation(0.0, 0.0),
            Size::new(30.0, 40.0),
            VectorContent {
                defs: String::new(),
                body: image.svg_markup(),
                source_box: Rect::new(0.0, 0.0, 30.0, 40.0),
                image: Some(image),
            },
        );
        assert_eq!(block.kind(), BlockKind::Image);
        assert_eq!(block.kind().to_string(), "image");
        assert!(block.as_vector().is_some());
    }

    #[test]
    fn test_vector_to_svg() {
        let content = VectorContent {
            defs: "<linearGradient id=\"g\"/>".to_string(),
            body: "<rect width=\"30\" height=\"40\" fill=\"url(#g)\"/>".to_string(),
            source_box: Rect::new(0.0, 0.0, 30.0, 40.0),
            image: None,
        };
        let svg = content.to_svg(Size::new(30.0, 40.0));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<defs><linearGradient id=\"g\"/></defs>"));
        assert!(svg.contains("viewBox=\"0 0 30 40\""));
        assert!(svg.ends_with("</svg>"));
    }
}

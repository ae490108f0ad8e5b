//! [`DocumentRenderer`] backed by lopdf.
//!
//! Reads page geometry, text runs, font information and image XObjects
//! straight from the document structure. Vector trees hold one `image` node
//! per painted image; paths are not traced. It cannot rasterize pages, so
//! [`DocumentRenderer::render`] reports [`Error::Unavailable`] and the loader
//! disables page backgrounds and says why.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::image_placements::collect_placements;
use super::text_runs::{collect_runs, decode_text_simple, number, FontMetrics};
use super::{DocumentRenderer, StyleRecord, TextContentInput, VectorNode, VectorTree};
use crate::error::{Error, Result};
use crate::geometry::{Affine, Rect, Viewport};
use crate::model::{EmbeddedImage, ImageColorSpace, ImageEncoding, Metadata, RasterImage};

/// US Letter, used when a page has no usable `/MediaBox`.
const DEFAULT_MEDIA_BOX: Rect = Rect::new(0.0, 0.0, 612.0, 792.0);

/// Bound on `/Parent` hops when resolving inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// `/Flags` bit marking an italic font.
const ITALIC_FLAG: i64 = 1 << 6;

/// lopdf-based renderer.
pub struct LopdfRenderer {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
    source_name: Option<String>,
}

impl LopdfRenderer {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = LopdfDocument::load(path)?;
        let name = path.file_name().map(|n| n.to_string_lossy().to_string());
        let mut renderer = Self::from_document(doc);
        renderer.source_name = name;
        Ok(renderer)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already-parsed document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            source_name: None,
        }
    }

    /// Set the name reported in metadata.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(page as usize)
            .copied()
            .ok_or(Error::PageOutOfRange(page + 1, self.pages.len() as u32))
    }

    /// Look up a page attribute, following `/Parent` for inherited keys.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(obj) = dict.get(key) {
                return self.doc.dereference(obj).ok().map(|(_, o)| o);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn media_box(&self, page_id: ObjectId) -> Rect {
        self.inherited(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| {
                let values: Vec<f64> = arr.iter().filter_map(number).collect();
                match values.as_slice() {
                    [x0, y0, x1, y1] => Some(Rect::new(*x0, *y0, *x1, *y1).abs()),
                    _ => None,
                }
            })
            .filter(|rect| rect.area() > 0.0)
            .unwrap_or(DEFAULT_MEDIA_BOX)
    }

    fn rotation(&self, page_id: ObjectId) -> i32 {
        self.inherited(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0) as i32
    }

    /// Concatenated content streams of a page. Errors carry the reason only.
    fn page_content(&self, page_id: ObjectId) -> std::result::Result<Vec<u8>, String> {
        let page_dict = self.doc.get_dictionary(page_id).map_err(|e| e.to_string())?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let streams: Vec<&Object> = match contents {
            Object::Array(arr) => arr.iter().collect(),
            other => vec![other],
        };

        let mut content = Vec::new();
        for obj in streams {
            let stream = self
                .doc
                .dereference(obj)
                .ok()
                .and_then(|(_, o)| o.as_stream().ok())
                .ok_or_else(|| "invalid content stream".to_string())?;
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            content.extend_from_slice(&data);
            content.push(b' ');
        }
        Ok(content)
    }

    fn font_metrics(&self, font: &Dictionary) -> FontMetrics {
        let subtype = font.get(b"Subtype").and_then(|o| o.as_name()).ok();
        if subtype == Some(b"Type0".as_slice()) {
            let default_width = font
                .get(b"DescendantFonts")
                .ok()
                .and_then(|o| self.resolve(o).as_array().ok())
                .and_then(|arr| arr.first())
                .and_then(|o| self.resolve(o).as_dict().ok())
                .and_then(|d| d.get(b"DW").ok())
                .and_then(number)
                .unwrap_or(1000.0);
            return FontMetrics::composite(default_width);
        }

        let widths: Option<Vec<f64>> = font
            .get(b"Widths")
            .ok()
            .and_then(|o| self.resolve(o).as_array().ok())
            .map(|arr| arr.iter().map(|o| number(self.resolve(o)).unwrap_or(0.0)).collect());
        let Some(widths) = widths else {
            return FontMetrics::default();
        };

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0)
            .max(0) as u32;
        let missing_width = self
            .font_descriptor(font)
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(number)
            .unwrap_or(0.0);
        FontMetrics::simple(first_char, widths, missing_width)
    }

    fn font_descriptor<'a>(&'a self, font: &'a Dictionary) -> Option<&'a Dictionary> {
        font.get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.resolve(o).as_dict().ok())
    }

    fn style_record(&self, font: &Dictionary) -> StyleRecord {
        let font_name = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string());

        let descriptor = self.font_descriptor(font);
        let weight = descriptor
            .and_then(|d| d.get(b"FontWeight").ok())
            .and_then(number)
            .map(|w| w.clamp(100.0, 900.0) as u16);
        let italic = descriptor.map(|d| {
            let flags = d.get(b"Flags").and_then(|o| o.as_i64()).unwrap_or(0);
            let angle = d.get(b"ItalicAngle").ok().and_then(number).unwrap_or(0.0);
            flags & ITALIC_FLAG != 0 || angle != 0.0
        });

        StyleRecord {
            font_family: font_name.as_deref().map(family_from_name),
            font_name,
            weight,
            italic,
            color: None,
        }
    }

    /// Image XObject streams named in the page's (possibly inherited)
    /// resources.
    fn page_xobjects(&self, page_id: ObjectId) -> HashMap<Vec<u8>, &Stream> {
        self.inherited(page_id, b"Resources")
            .and_then(|resources| resources.as_dict().ok())
            .and_then(|resources| resources.get(b"XObject").ok())
            .and_then(|xobjects| self.resolve(xobjects).as_dict().ok())
            .map(|xobjects| {
                xobjects
                    .iter()
                    .filter_map(|(name, obj)| {
                        let stream = self.resolve(obj).as_stream().ok()?;
                        Some((name.clone(), stream))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Lift an image XObject, framed by `frame`.
    ///
    /// Unfiltered and plain Flate samples are kept raw; JPEG and JPEG 2000
    /// data passes through untouched. Masks, predictors, other filters and
    /// non-device color spaces are not supported.
    fn embedded_image(&self, stream: &Stream, frame: Affine) -> Option<EmbeddedImage> {
        let dict = &stream.dict;
        let subtype = dict.get(b"Subtype").and_then(|o| o.as_name()).ok();
        if subtype != Some(b"Image".as_slice()) {
            return None;
        }
        if dict.get(b"ImageMask").and_then(|o| o.as_bool()).unwrap_or(false) {
            return None;
        }

        let width = self.dimension(dict, b"Width")?;
        let height = self.dimension(dict, b"Height")?;
        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(8);

        let filters: Vec<&[u8]> = match dict.get(b"Filter").map(|o| self.resolve(o)) {
            Ok(Object::Name(name)) => vec![name.as_slice()],
            Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_name().ok()).collect(),
            _ => Vec::new(),
        };
        let (encoding, data) = match filters.as_slice() {
            [] => (ImageEncoding::Raw, stream.content.clone()),
            [b"FlateDecode"] if !self.has_predictor(dict) => {
                (ImageEncoding::Raw, inflate(&stream.content)?)
            }
            [b"DCTDecode"] => (ImageEncoding::Jpeg, stream.content.clone()),
            [b"JPXDecode"] => (ImageEncoding::Jpeg2000, stream.content.clone()),
            _ => return None,
        };

        let color_space = match dict.get(b"ColorSpace") {
            Ok(obj) => self.color_space(obj)?,
            // JPEG 2000 streams may carry their own color space.
            Err(_) if encoding == ImageEncoding::Jpeg2000 => ImageColorSpace::DeviceRGB,
            Err(_) => return None,
        };

        let image = EmbeddedImage {
            width,
            height,
            color_space,
            bits_per_component: bits,
            encoding,
            data,
            frame,
        };
        image.is_valid().then_some(image)
    }

    fn dimension(&self, dict: &Dictionary, key: &[u8]) -> Option<u32> {
        dict.get(key)
            .ok()
            .and_then(|o| self.resolve(o).as_i64().ok())
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
    }

    fn has_predictor(&self, dict: &Dictionary) -> bool {
        dict.get(b"DecodeParms")
            .ok()
            .and_then(|o| self.resolve(o).as_dict().ok())
            .and_then(|parms| parms.get(b"Predictor").ok())
            .and_then(|o| o.as_i64().ok())
            .is_some_and(|predictor| predictor > 1)
    }

    /// Device color spaces by name, and ICC-based ones by component count.
    fn color_space(&self, obj: &Object) -> Option<ImageColorSpace> {
        match self.resolve(obj) {
            Object::Name(name) => ImageColorSpace::from_name(name),
            Object::Array(items) => {
                let family = items.first().and_then(|o| o.as_name().ok())?;
                if family != b"ICCBased" {
                    return None;
                }
                let profile = self.resolve(items.get(1)?).as_stream().ok()?;
                match profile.dict.get(b"N").and_then(|o| o.as_i64()).ok()? {
                    1 => Some(ImageColorSpace::DeviceGray),
                    3 => Some(ImageColorSpace::DeviceRGB),
                    4 => Some(ImageColorSpace::DeviceCMYK),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        self.doc.dereference(obj).map(|(_, o)| o).unwrap_or(obj)
    }

    fn info_string(&self, info: &Dictionary, key: &[u8]) -> Option<String> {
        match info.get(key).ok().map(|o| self.resolve(o))? {
            Object::String(bytes, _) => Some(decode_text_simple(bytes)),
            Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).to_string()),
            _ => None,
        }
    }
}

impl DocumentRenderer for LopdfRenderer {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn viewport(&self, page: u32, scale: f64) -> Result<Viewport> {
        let page_id = self.page_id(page)?;
        Ok(Viewport::for_page(
            self.media_box(page_id),
            scale,
            self.rotation(page_id),
        ))
    }

    fn render(&self, _page: u32, _viewport: &Viewport) -> Result<RasterImage> {
        Err(Error::unavailable(
            "Page rasterization",
            "the lopdf renderer reads document structure only",
        ))
    }

    fn text_content(&self, page: u32) -> Result<TextContentInput> {
        let page_id = self.page_id(page)?;
        let data = self.page_content(page_id).map_err(|e| text_error(page, e))?;
        let content = Content::decode(&data).map_err(|e| text_error(page, e))?;
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| text_error(page, e))?;

        let mut metrics = HashMap::with_capacity(fonts.len());
        let mut styles = HashMap::with_capacity(fonts.len());
        for (name, dict) in &fonts {
            metrics.insert(name.clone(), self.font_metrics(dict));
            styles.insert(String::from_utf8_lossy(name).to_string(), self.style_record(dict));
        }

        let runs = collect_runs(&content.operations, &metrics, |font, bytes| {
            fonts
                .get(font)
                .and_then(|f| f.get_font_encoding(&self.doc).ok())
                .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
                .unwrap_or_else(|| decode_text_simple(bytes))
        });

        log::debug!("Page {}: {} text runs", page + 1, runs.len());
        Ok(TextContentInput { runs, styles })
    }

    fn vector_tree(&self, page: u32, viewport: &Viewport) -> Result<VectorTree> {
        let page_id = self.page_id(page)?;
        let data = self.page_content(page_id).map_err(|e| vector_error(page, e))?;
        let content = Content::decode(&data).map_err(|e| vector_error(page, e))?;
        let xobjects = self.page_xobjects(page_id);

        let mut nodes = Vec::new();
        for placement in collect_placements(&content.operations) {
            let name = String::from_utf8_lossy(&placement.name);
            let Some(stream) = xobjects.get(&placement.name) else {
                log::debug!("Page {}: no XObject named /{}", page + 1, name);
                continue;
            };
            match self.embedded_image(stream, viewport.transform * placement.ctm) {
                Some(image) => nodes.push(VectorNode::image(image)),
                None => log::debug!("Page {}: skipping XObject /{}", page + 1, name),
            }
        }

        log::debug!("Page {}: {} image XObjects", page + 1, nodes.len());
        Ok(VectorTree {
            defs: String::new(),
            nodes,
        })
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.version());
        metadata.page_count = self.page_count();
        metadata.source_name = self.source_name.clone();

        let info = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|o| self.resolve(o).as_dict().ok());
        if let Some(info) = info {
            metadata.title = self.info_string(info, b"Title");
            metadata.author = self.info_string(info, b"Author");
            metadata.creator = self.info_string(info, b"Creator");
            metadata.producer = self.info_string(info, b"Producer");
        }
        metadata
    }
}

fn text_error(page: u32, reason: impl ToString) -> Error {
    Error::TextExtract {
        page: page + 1,
        reason: reason.to_string(),
    }
}

fn vector_error(page: u32, reason: impl ToString) -> Error {
    Error::VectorExtract {
        page: page + 1,
        reason: reason.to_string(),
    }
}

fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    match ZlibDecoder::new(data).read_to_end(&mut out) {
        Ok(_) => Some(out),
        Err(e) => {
            log::debug!("Image inflate failed: {}", e);
            None
        }
    }
}

/// Drop the `ABCDEF+` tag embedded subsets carry.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Family part of a PostScript font name ("Helvetica-Bold" -> "Helvetica").
fn family_from_name(name: &str) -> String {
    name.split(['-', ','])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::approx_eq;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream, StringFormat};

    fn sample_pdf(rotate: Option<i64>) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.7");
        let pages_id = doc.new_object_id();

        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "ABCDEF+Helvetica-Oblique",
            "Flags" => 64_i64,
            "ItalicAngle" => -12_i64,
            "FontWeight" => 400_i64,
        });
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "ABCDEF+Helvetica-Oblique",
            "FirstChar" => 72_i64,
            "Widths" => vec![Object::Integer(722), Object::Integer(222)],
            "FontDescriptor" => Object::Reference(descriptor_id),
        });

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new(
                    "Tm",
                    vec![
                        Object::Integer(1),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(1),
                        Object::Integer(50),
                        Object::Integer(700),
                    ],
                ),
                Operation::new(
                    "Tj",
                    vec![Object::String(b"HI".to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    [100, 0, 0, 50, 200, 300].into_iter().map(Object::Integer).collect(),
                ),
                Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
                Operation::new("Q", vec![]),
                Operation::new("Do", vec![Object::Name(b"Missing".to_vec())]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2_i64,
                "Height" => 1_i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            vec![255, 0, 0, 0, 0, 255],
        ));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
                "XObject" => dictionary! { "Im1" => Object::Reference(image_id) },
            },
        };
        if let Some(rotate) = rotate {
            page.set("Rotate", rotate);
        }
        let page_id = doc.add_object(page);

        // MediaBox is inherited from the page tree node.
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 1_i64,
                "Kids" => vec![Object::Reference(page_id)],
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            }),
        );
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(b"Quarterly".to_vec(), StringFormat::Literal),
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.trailer.set("Info", Object::Reference(info_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_page_count_and_viewport() {
        let renderer = LopdfRenderer::load_bytes(&sample_pdf(None)).unwrap();
        assert_eq!(renderer.page_count(), 1);
        let vp = renderer.viewport(0, 1.0).unwrap();
        assert_eq!(vp.width, 612.0);
        assert_eq!(vp.height, 792.0);
        assert!(matches!(
            renderer.viewport(3, 1.0),
            Err(Error::PageOutOfRange(4, 1))
        ));
    }

    #[test]
    fn test_inherited_rotation() {
        let renderer = LopdfRenderer::load_bytes(&sample_pdf(Some(90))).unwrap();
        let vp = renderer.viewport(0, 1.0).unwrap();
        assert_eq!(vp.rotation, 90);
        assert_eq!(vp.width, 792.0);
    }

    #[test]
    fn test_text_content_runs_and_styles() {
        let renderer = LopdfRenderer::load_bytes(&sample_pdf(None)).unwrap();
        let content = renderer.text_content(0).unwrap();
        assert_eq!(content.runs.len(), 1);

        let run = &content.runs[0];
        assert_eq!(run.text, "HI");
        assert_eq!(run.font_ref, "F1");
        assert!(approx_eq(
            run.transform,
            crate::geometry::Affine::new([12.0, 0.0, 0.0, 12.0, 50.0, 700.0]),
            1e-9
        ));
        // (722 + 222) / 1000 * 12
        assert!((run.width - 11.328).abs() < 1e-9);

        let style = &content.styles["F1"];
        assert_eq!(style.font_name.as_deref(), Some("Helvetica-Oblique"));
        assert_eq!(style.font_family.as_deref(), Some("Helvetica"));
        assert_eq!(style.weight, Some(400));
        assert_eq!(style.italic, Some(true));
    }

    #[test]
    fn test_render_is_unavailable() {
        let renderer = LopdfRenderer::load_bytes(&sample_pdf(None)).unwrap();
        let vp = renderer.viewport(0, 1.0).unwrap();
        assert!(renderer.render(0, &vp).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_vector_tree_holds_placed_images() {
        let renderer = LopdfRenderer::load_bytes(&sample_pdf(None)).unwrap();
        let vp = renderer.viewport(0, 2.0).unwrap();
        let tree = renderer.vector_tree(0, &vp).unwrap();
        assert_eq!(tree.nodes.len(), 1);

        let node = &tree.nodes[0];
        assert_eq!(node.tag, "image");
        let image = node.image.as_ref().unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.color_space, ImageColorSpace::DeviceRGB);
        assert_eq!(image.encoding, ImageEncoding::Raw);
        assert_eq!(image.data, vec![255, 0, 0, 0, 0, 255]);

        // 100x50 points at (200, 300), y flipped on a 792pt page at 2x.
        let bbox = node.bbox.unwrap();
        assert!((bbox.x0 - 400.0).abs() < 1e-9);
        assert!((bbox.y0 - 884.0).abs() < 1e-9);
        assert!((bbox.width() - 200.0).abs() < 1e-9);
        assert!((bbox.height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_metadata() {
        let renderer = LopdfRenderer::load_bytes(&sample_pdf(None))
            .unwrap()
            .with_source_name("q.pdf");
        let meta = renderer.metadata();
        assert_eq!(meta.title.as_deref(), Some("Quarterly"));
        assert_eq!(meta.source_name.as_deref(), Some("q.pdf"));
        assert_eq!(meta.page_count, 1);
        assert_eq!(meta.pdf_version, "1.7");
    }

    #[test]
    fn test_load_garbage_fails() {
        assert!(LopdfRenderer::load_bytes(b"not a pdf").is_err());
    }

    #[test]
    fn test_font_name_helpers() {
        assert_eq!(strip_subset_prefix("ABCDEF+Times-Roman"), "Times-Roman");
        assert_eq!(strip_subset_prefix("Abc+Times"), "Abc+Times");
        assert_eq!(family_from_name("Helvetica-Bold"), "Helvetica");
        assert_eq!(family_from_name("Arial,BoldItalic"), "Arial");
    }
}

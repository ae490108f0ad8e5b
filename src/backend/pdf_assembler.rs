//! Output document assembly with lopdf.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::{DocumentAssembler, Orientation};
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::model::RasterImage;

/// PDF version written by the assembler.
const OUTPUT_VERSION: &str = "1.7";

/// A growing page tree.
///
/// Pages are appended in order; [`PageTree::finish`] writes the page tree
/// node and catalog and serializes the document.
pub(crate) struct PageTree {
    doc: LopdfDocument,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PageTree {
    pub(crate) fn new() -> Self {
        let mut doc = LopdfDocument::with_version(OUTPUT_VERSION);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Add an indirect object.
    pub(crate) fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Append a page with the given media box, `/Rotate`, resources and
    /// operations.
    pub(crate) fn push_page(
        &mut self,
        media_box: Rect,
        rotation: u16,
        resources: Dictionary,
        operations: Vec<Operation>,
    ) -> Result<ObjectId> {
        let content = Content { operations }
            .encode()
            .map_err(|e| Error::Export(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => vec![
                Object::Real(media_box.x0 as f32),
                Object::Real(media_box.y0 as f32),
                Object::Real(media_box.x1 as f32),
                Object::Real(media_box.y1 as f32),
            ],
            "Resources" => resources,
            "Contents" => Object::Reference(content_id),
        };
        if rotation != 0 {
            page.set("Rotate", i64::from(rotation));
        }
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id);
        Ok(page_id)
    }

    /// Number of pages added so far.
    pub(crate) fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Write the page tree and catalog, then serialize.
    pub(crate) fn finish(mut self) -> Result<Vec<u8>> {
        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => self.kids.len() as i64,
            "Kids" => self.kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| Error::Export(format!("Save failed: {}", e)))?;
        Ok(buffer)
    }
}

/// A page being filled with images.
struct PendingPage {
    size: Size,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// [`DocumentAssembler`] that writes image-only pages with lopdf.
///
/// Each embedded raster becomes a Flate-compressed `/DeviceRGB` image
/// XObject.
#[derive(Default)]
pub struct PdfAssembler {
    tree: Option<PageTree>,
    current: Option<PendingPage>,
    image_count: usize,
}

impl PdfAssembler {
    /// Create an assembler with no document started.
    pub fn new() -> Self {
        Self::default()
    }

    fn start_page(&mut self, size: Size) -> Result<()> {
        if size.width <= 0.0 || size.height <= 0.0 {
            return Err(Error::Export(format!(
                "invalid page size {}x{}",
                size.width, size.height
            )));
        }
        self.flush_page()?;
        self.current = Some(PendingPage {
            size,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        });
        Ok(())
    }

    fn flush_page(&mut self) -> Result<()> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };
        let tree = self
            .tree
            .as_mut()
            .ok_or_else(|| Error::Export("no document started".to_string()))?;
        let resources = dictionary! { "XObject" => page.xobjects };
        let media_box = Rect::from_origin_size((0.0, 0.0), page.size);
        tree.push_page(media_box, 0, resources, page.operations)?;
        Ok(())
    }
}

impl DocumentAssembler for PdfAssembler {
    fn new_document(&mut self, size_pt: Size, orientation: Orientation) -> Result<()> {
        log::debug!("Starting output document ({:?})", orientation);
        self.tree = Some(PageTree::new());
        self.current = None;
        self.image_count = 0;
        self.start_page(size_pt)
    }

    fn add_page(&mut self, size_pt: Size, _orientation: Orientation) -> Result<()> {
        if self.tree.is_none() {
            return Err(Error::Export("add_page before new_document".to_string()));
        }
        self.start_page(size_pt)
    }

    fn embed_image(&mut self, image: &RasterImage, rect: Rect) -> Result<()> {
        if !image.is_valid() {
            return Err(Error::Export(format!(
                "image buffer does not match {}x{} RGB",
                image.width, image.height
            )));
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&image.rgb)?;
        let compressed = encoder.finish()?;

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
                "Filter" => "FlateDecode",
            },
            compressed,
        )
        .with_compression(false);

        let tree = self
            .tree
            .as_mut()
            .ok_or_else(|| Error::Export("embed_image before new_document".to_string()))?;
        let image_id = tree.add_object(stream);

        let page = self
            .current
            .as_mut()
            .ok_or_else(|| Error::Export("embed_image without a page".to_string()))?;

        self.image_count += 1;
        let name = format!("Im{}", self.image_count);
        page.xobjects.set(name.as_bytes().to_vec(), Object::Reference(image_id));

        // Flip from top-left origin to PDF user space.
        let y = page.size.height - rect.y1;
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(rect.width() as f32),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(rect.height() as f32),
                    Object::Real(rect.x0 as f32),
                    Object::Real(y as f32),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        self.flush_page()?;
        let tree = self
            .tree
            .take()
            .ok_or_else(|| Error::Export("finalize before new_document".to_string()))?;
        log::info!("Assembled {} page(s)", tree.page_count());
        tree.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_two_pages() {
        let mut assembler = PdfAssembler::new();
        let image = RasterImage::filled(4, 4, [200, 10, 10]);

        assembler
            .new_document(Size::new(612.0, 792.0), Orientation::Portrait)
            .unwrap();
        assembler
            .embed_image(&image, Rect::new(0.0, 0.0, 612.0, 792.0))
            .unwrap();
        assembler
            .add_page(Size::new(792.0, 612.0), Orientation::Landscape)
            .unwrap();
        assembler
            .embed_image(&image, Rect::new(0.0, 0.0, 792.0, 612.0))
            .unwrap();
        let bytes = assembler.finalize().unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        let doc = LopdfDocument::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_embed_before_document_fails() {
        let mut assembler = PdfAssembler::new();
        let image = RasterImage::filled(1, 1, [0, 0, 0]);
        assert!(assembler
            .embed_image(&image, Rect::new(0.0, 0.0, 1.0, 1.0))
            .is_err());
        assert!(assembler.finalize().is_err());
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        let mut assembler = PdfAssembler::new();
        assembler
            .new_document(Size::new(100.0, 100.0), Orientation::Portrait)
            .unwrap();
        let image = RasterImage::new(2, 2, vec![0; 3]);
        assert!(matches!(
            assembler.embed_image(&image, Rect::new(0.0, 0.0, 100.0, 100.0)),
            Err(Error::Export(_))
        ));
    }
}

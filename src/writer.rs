//! Direct PDF output of a scene.
//!
//! Unlike [`crate::export`], which rasterizes each page, this writes text
//! blocks as real PDF text and image blocks as image XObjects. Every page
//! keeps its source media box and rotation.
//!
//! A text block is drawn in Helvetica at size 1 with the text matrix
//! `viewport⁻¹ · composite · scale(font_scale)`, which puts it back where it
//! sits on screen, edits and font size changes included. An image block is
//! painted under `viewport⁻¹ · placement · frame`. Other vector blocks have
//! no PDF path form yet and are skipped.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::Operation;
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream, StringFormat};

use crate::backend::PageTree;
use crate::color::hex_to_rgb;
use crate::error::{Error, Result};
use crate::geometry::{Affine, Point, Rect, Viewport, DEFAULT_RENDER_SCALE, PX_TO_PT};
use crate::model::{BlockContent, EmbeddedImage, ImageEncoding, Page};
use crate::scene::SceneModel;

/// Resource name of the single text font.
const FONT_NAME: &[u8] = b"F1";

/// Write every page of the scene as a PDF.
pub fn write_pdf(scene: &SceneModel) -> Result<Vec<u8>> {
    if scene.page_count() == 0 {
        return Err(Error::Export("scene has no pages".to_string()));
    }

    let mut tree = PageTree::new();
    let font_id = tree.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    for page in scene.pages() {
        write_page(&mut tree, scene, page, font_id)?;
    }
    log::info!("Wrote {} page(s)", tree.page_count());
    tree.finish()
}

fn write_page(tree: &mut PageTree, scene: &SceneModel, page: &Page, font_id: ObjectId) -> Result<()> {
    let viewport = page_viewport(page);
    if viewport.transform.determinant() == 0.0 {
        return Err(Error::Export(format!(
            "page {} has a degenerate viewport",
            page.index + 1
        )));
    }
    let to_document = viewport.transform.inverse();

    let mut operations = Vec::new();
    let mut xobjects = Dictionary::new();
    let mut skipped = 0;
    for block in scene.blocks_on_page(page.index) {
        let text = match block.content() {
            BlockContent::Text(text) => text,
            BlockContent::Vector(vector) => {
                let Some(image) = &vector.image else {
                    skipped += 1;
                    continue;
                };
                let name = format!("Im{}", xobjects.len() + 1);
                let image_id = tree.add_object(image_xobject(image)?);
                xobjects.set(name.as_bytes(), Object::Reference(image_id));

                let matrix = to_document * block.placement() * image.frame;
                operations.extend([
                    Operation::new("q", vec![]),
                    Operation::new("cm", matrix.as_coeffs().iter().copied().map(real).collect()),
                    Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                    Operation::new("Q", vec![]),
                ]);
                continue;
            }
        };
        let (r, g, b) = hex_to_rgb(&text.style.color);
        let matrix = to_document * block.composite() * Affine::scale(block.font_scale());
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(FONT_NAME.to_vec()), Object::Integer(1)]),
            Operation::new("rg", vec![real(r), real(g), real(b)]),
            Operation::new("Tm", matrix.as_coeffs().iter().copied().map(real).collect()),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi(&text.text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }
    if skipped > 0 {
        log::warn!(
            "Page {}: {} vector block(s) not written",
            page.index + 1,
            skipped
        );
    }

    let mut resources = dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    };
    if !xobjects.is_empty() {
        resources.set("XObject", xobjects);
    }
    tree.push_page(media_box(&viewport, to_document), viewport.rotation, resources, operations)?;
    Ok(())
}

/// The viewport the page was loaded with, or an upright one at the default
/// scale for pages built by hand.
fn page_viewport(page: &Page) -> Viewport {
    page.viewport.unwrap_or_else(|| {
        let size = Rect::new(0.0, 0.0, page.width * PX_TO_PT, page.height * PX_TO_PT);
        let mut viewport = Viewport::for_page(size, DEFAULT_RENDER_SCALE, i32::from(page.rotation));
        if viewport.rotation % 180 != 0 {
            // Page width and height are already the rotated extents.
            let upright = Rect::new(0.0, 0.0, size.height(), size.width());
            viewport = Viewport::for_page(upright, DEFAULT_RENDER_SCALE, i32::from(page.rotation));
        }
        viewport
    })
}

/// Document-space box covered by the viewport.
fn media_box(viewport: &Viewport, to_document: Affine) -> Rect {
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(viewport.width, 0.0),
        Point::new(viewport.width, viewport.height),
        Point::new(0.0, viewport.height),
    ]
    .map(|p| to_document * p);
    corners
        .iter()
        .skip(1)
        .fold(Rect::from_points(corners[0], corners[0]), |rect, p| {
            rect.union_pt(*p)
        })
}

/// An image XObject stream for an embedded image.
///
/// Raw samples are Flate-compressed; JPEG data is written as is.
fn image_xobject(image: &EmbeddedImage) -> Result<Stream> {
    let data = match image.encoding {
        ImageEncoding::Raw => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&image.data)?;
            encoder.finish()?
        }
        ImageEncoding::Jpeg | ImageEncoding::Jpeg2000 => image.data.clone(),
    };
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width),
        "Height" => i64::from(image.height),
        "ColorSpace" => image.color_space.name(),
        "BitsPerComponent" => i64::from(image.bits_per_component),
        "Filter" => image.encoding.pdf_filter(),
    };
    Ok(Stream::new(dict, data).with_compression(false))
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

/// Encode text for a WinAnsi simple font; characters outside Latin-1
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7e | 0xa0..=0xff => c as u8,
            _ => b'?',
        })
        .collect()
}

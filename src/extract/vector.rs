//! Vector tree nodes to vector blocks.

use super::ExtractOptions;
use crate::backend::{VectorNode, VectorTree};
use crate::geometry::{Affine, BaseTransform, Rect, Size};
use crate::model::{Block, VectorContent};

/// Turn the top-level shapes of a vector tree into vector blocks.
///
/// The defs node is skipped, as are nodes without a bounding box or with a
/// zero-area one, and image nodes unless `options.images` is set. Each block
/// gets its own copy of the tree's defs, and its markup is shifted so the
/// bounding box origin sits at the local origin. An image node's frame is
/// re-expressed in the same local box.
pub fn extract_vector(tree: &VectorTree, page_index: u32, options: &ExtractOptions) -> Vec<Block> {
    let mut blocks = Vec::new();
    for node in &tree.nodes {
        if node.is_defs() || (node.image.is_some() && !options.images) {
            continue;
        }
        let Some(bbox) = visible_box(node) else {
            log::trace!("Skipping non-visual <{}> on page {}", node.tag, page_index + 1);
            continue;
        };

        let to_local = Affine::translate((-bbox.x0, -bbox.y0));
        let content = VectorContent {
            defs: tree.defs.clone(),
            body: relocate(&node.markup, bbox),
            source_box: bbox,
            image: node.image.as_ref().map(|image| image.with_frame(to_local * image.frame)),
        };
        blocks.push(Block::vector(
            page_index,
            BaseTransform::from_translation(bbox.x0, bbox.y0),
            Size::new(bbox.width(), bbox.height()),
            content,
        ));
    }
    blocks
}

fn visible_box(node: &VectorNode) -> Option<Rect> {
    let bbox = node.bbox?.abs();
    let finite = [bbox.x0, bbox.y0, bbox.x1, bbox.y1]
        .iter()
        .all(|v| v.is_finite());
    (finite && bbox.width() > 0.0 && bbox.height() > 0.0).then_some(bbox)
}

/// Wrap markup in a group that moves `bbox`'s origin to (0, 0).
fn relocate(markup: &str, bbox: Rect) -> String {
    format!(
        "<g transform=\"translate({} {})\">{}</g>",
        svg_number(-bbox.x0),
        svg_number(-bbox.y0),
        markup
    )
}

fn svg_number(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, EmbeddedImage, ImageColorSpace, ImageEncoding};

    fn node(tag: &str, bbox: Option<Rect>) -> VectorNode {
        VectorNode {
            tag: tag.to_string(),
            markup: format!("<{tag}/>"),
            bbox,
            image: None,
        }
    }

    fn image_node(frame: Affine) -> VectorNode {
        VectorNode::image(EmbeddedImage {
            width: 2,
            height: 2,
            color_space: ImageColorSpace::DeviceGray,
            bits_per_component: 8,
            encoding: ImageEncoding::Raw,
            data: vec![0, 255, 255, 0],
            frame,
        })
    }

    #[test]
    fn test_image_frame_moves_into_local_box() {
        let tree = VectorTree {
            defs: String::new(),
            nodes: vec![image_node(Affine::new([50.0, 0.0, 0.0, -25.0, 100.0, 200.0]))],
        };
        let blocks = extract_vector(&tree, 0, &ExtractOptions::default());
        assert_eq!(blocks.len(), 1);

        let block = &blocks[0];
        assert_eq!(block.kind(), BlockKind::Image);
        assert_eq!(block.local_size(), Size::new(50.0, 25.0));
        assert_eq!(block.base().translation(), crate::geometry::Vec2::new(100.0, 175.0));
        let image = block.as_vector().unwrap().image.as_ref().unwrap();
        assert_eq!(image.frame, Affine::new([50.0, 0.0, 0.0, -25.0, 0.0, 25.0]));
    }

    #[test]
    fn test_images_option_drops_image_nodes() {
        let tree = VectorTree {
            defs: String::new(),
            nodes: vec![
                image_node(Affine::scale(10.0)),
                node("rect", Some(Rect::new(0.0, 0.0, 4.0, 4.0))),
            ],
        };
        let options = ExtractOptions::new().with_images(false);
        let blocks = extract_vector(&tree, 0, &options);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind(), BlockKind::Vector);
    }

    #[test]
    fn test_bbox_becomes_translation_and_size() {
        let tree = VectorTree {
            defs: String::new(),
            nodes: vec![node("rect", Some(Rect::new(10.0, 20.0, 40.0, 60.0)))],
        };
        let blocks = extract_vector(&tree, 0, &ExtractOptions::default());
        assert_eq!(blocks.len(), 1);

        let block = &blocks[0];
        assert_eq!(block.base().translation(), crate::geometry::Vec2::new(10.0, 20.0));
        assert!(block.base().has_identity_axes());
        assert_eq!(block.local_size(), Size::new(30.0, 40.0));
        assert_eq!(
            block.as_vector().unwrap().body,
            "<g transform=\"translate(-10 -20)\"><rect/></g>"
        );
    }

    #[test]
    fn test_skips_defs_and_degenerate_nodes() {
        let tree = VectorTree {
            defs: "<clipPath id=\"c\"/>".to_string(),
            nodes: vec![
                node("defs", Some(Rect::new(0.0, 0.0, 10.0, 10.0))),
                node("path", None),
                node("line", Some(Rect::new(5.0, 5.0, 50.0, 5.0))),
                node("path", Some(Rect::new(0.0, 0.0, f64::NAN, 3.0))),
                node("circle", Some(Rect::new(0.0, 0.0, 8.0, 8.0))),
            ],
        };
        let blocks = extract_vector(&tree, 2, &ExtractOptions::default());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].page_index(), 2);
        assert_eq!(
            blocks[0].as_vector().unwrap().body,
            "<g transform=\"translate(0 0)\"><circle/></g>"
        );
    }

    #[test]
    fn test_defs_copied_per_block() {
        let tree = VectorTree {
            defs: "<linearGradient id=\"g\"/>".to_string(),
            nodes: vec![
                node("rect", Some(Rect::new(0.0, 0.0, 1.0, 1.0))),
                node("rect", Some(Rect::new(2.0, 2.0, 3.0, 3.0))),
            ],
        };
        let mut blocks = extract_vector(&tree, 0, &ExtractOptions::default());
        assert_eq!(blocks.len(), 2);
        let survivor = blocks.pop().unwrap();
        drop(blocks);
        drop(tree);
        assert_eq!(survivor.as_vector().unwrap().defs, "<linearGradient id=\"g\"/>");
    }
}

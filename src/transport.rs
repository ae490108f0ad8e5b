//! Flat JSON view of a scene.
//!
//! This is the shape exchanged with a remote editor: pages with their
//! elements, each element reduced to an id, a type, a paint order and a
//! placed box. Edits made on the remote side come back through
//! [`apply_state`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Block, BlockContent, BlockId, BlockKind};
use crate::scene::SceneModel;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// One block as seen by a remote editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementState {
    pub id: BlockId,

    #[serde(rename = "type")]
    pub kind: BlockKind,

    /// Paint order on the page, 1 at the bottom
    pub order: u32,

    /// Placed origin in viewport pixels
    pub x: f64,
    pub y: f64,

    /// Placed box size in viewport pixels
    pub width: f64,
    pub height: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// File name of the element's standalone SVG, for vector elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl ElementState {
    /// Describe a block.
    pub fn from_block(block: &Block) -> Self {
        let [.., x, y] = block.composite().as_coeffs();
        let size = block.composite_size();
        let (text, font_size, image_ref) = match block.content() {
            BlockContent::Text(content) => (Some(content.text.clone()), Some(content.font_size), None),
            BlockContent::Vector(_) => (None, None, Some(vector_ref(block.id()))),
        };
        Self {
            id: block.id(),
            kind: block.kind(),
            order: block.z_order(),
            x,
            y,
            width: size.width,
            height: size.height,
            text,
            font_size,
            image_ref,
        }
    }
}

/// File name used for a vector block's SVG fragment.
pub fn vector_ref(id: BlockId) -> String {
    format!("{id}.svg")
}

/// One page as seen by a remote editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub index: u32,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub elements: Vec<ElementState>,
}

/// The whole document as seen by a remote editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    #[serde(default)]
    pub pages: Vec<PageState>,
}

impl DocumentState {
    /// Describe every page of a scene, elements in paint order.
    pub fn from_scene(scene: &SceneModel) -> Self {
        let pages = scene
            .pages()
            .map(|page| PageState {
                index: page.index,
                width: page.width,
                height: page.height,
                elements: scene
                    .blocks_on_page(page.index)
                    .into_iter()
                    .map(ElementState::from_block)
                    .collect(),
            })
            .collect();
        Self { pages }
    }

    /// Parse a state document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }
}

/// Element counts of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub index: u32,
    pub element_count: usize,
    pub text_elements: usize,
    pub vector_elements: usize,
    pub image_elements: usize,
}

/// Element counts per page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub page_count: usize,
    pub element_count: usize,
    pub pages: Vec<PageSummary>,
}

impl DocumentSummary {
    /// Count the elements of a state document.
    pub fn from_state(state: &DocumentState) -> Self {
        let pages: Vec<PageSummary> = state
            .pages
            .iter()
            .map(|page| {
                let count = |kind: BlockKind| page.elements.iter().filter(|e| e.kind == kind).count();
                PageSummary {
                    index: page.index,
                    element_count: page.elements.len(),
                    text_elements: count(BlockKind::Text),
                    vector_elements: count(BlockKind::Vector),
                    image_elements: count(BlockKind::Image),
                }
            })
            .collect();
        Self {
            page_count: pages.len(),
            element_count: pages.iter().map(|p| p.element_count).sum(),
            pages,
        }
    }

    /// Count the blocks of a scene.
    pub fn from_scene(scene: &SceneModel) -> Self {
        Self::from_state(&DocumentState::from_scene(scene))
    }
}

/// Serialize any transport value to JSON.
pub fn to_json<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Serialize(format!("JSON serialization error: {}", e)))
}

/// Fold a remote editor's state back into the scene.
///
/// For every element whose id is known on the named page, the block is moved
/// so its placed origin is `(x, y)`, rescaled so its placed box is
/// `width x height`, and for text blocks its text and font size are replaced.
/// Sizes are magnitudes: a mirrored block stays mirrored. Paint order follows
/// `order`. Unknown pages and ids, and non-finite or non-positive numbers,
/// are skipped. Returns the number of elements applied.
pub fn apply_state(scene: &mut SceneModel, state: &DocumentState) -> usize {
    let mut applied = 0;
    for page in &state.pages {
        if scene.page(page.index).is_none() {
            log::debug!("Ignoring state for unknown page {}", page.index + 1);
            continue;
        }

        let mut ordered = Vec::new();
        for element in &page.elements {
            let on_page = scene
                .block(element.id)
                .is_some_and(|block| block.page_index() == page.index);
            if !on_page {
                log::debug!("Ignoring unknown element {}", element.id);
                continue;
            }
            apply_element(scene, element);
            ordered.push((element.order, element.id));
            applied += 1;
        }

        ordered.sort_by_key(|(order, _)| *order);
        for (order, id) in ordered {
            scene.move_to_z(id, order);
        }
    }
    applied
}

fn apply_element(scene: &mut SceneModel, element: &ElementState) {
    let Some(block) = scene.block(element.id) else {
        return;
    };
    let base = block.base().translation();
    let local = block.local_size();
    let mut edit = *block.edit();

    if element.x.is_finite() && element.y.is_finite() {
        edit.translate_x = element.x - base.x;
        edit.translate_y = element.y - base.y;
    }
    if let Some(scale) = scale_for(element.width, local.width, edit.scale_x) {
        edit.scale_x = scale;
    }
    if let Some(scale) = scale_for(element.height, local.height, edit.scale_y) {
        edit.scale_y = scale;
    }
    scene.set_edit_state(element.id, edit);

    let Some(block) = scene.block_mut(element.id) else {
        return;
    };
    if let Some(text) = block.text_mut() {
        if let Some(value) = &element.text {
            text.text = value.clone();
        }
        let previous_size = text.font_size;
        if let Some(size) = element.font_size.filter(|s| s.is_finite() && *s > 0.0) {
            text.font_size = size;
        }
        if text.font_size != previous_size {
            block.fit_box_to_font(previous_size);
        }
    }
}

/// Scale that gives a placed extent of `placed`, with the sign of `current`.
fn scale_for(placed: f64, local: f64, current: f64) -> Option<f64> {
    (placed.is_finite() && placed > 0.0 && local > 0.0)
        .then(|| (placed / local).copysign(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Affine, BaseTransform, Rect, Size};
    use crate::model::{Page, TextContent, VectorContent};

    fn scene() -> (SceneModel, BlockId, BlockId) {
        let mut scene = SceneModel::new();
        scene.add_page(Page::new(0, 800.0, 600.0));
        let vector = scene
            .add_block(Block::vector(
                0,
                BaseTransform::from_translation(10.0, 20.0),
                Size::new(30.0, 40.0),
                VectorContent {
                    defs: String::new(),
                    body: "<rect/>".into(),
                    source_box: Rect::new(10.0, 20.0, 40.0, 60.0),
                    image: None,
                },
            ))
            .unwrap();
        let text = scene
            .add_block(Block::text(
                0,
                BaseTransform::new(Affine::new([16.0, 0.0, 0.0, 16.0, 66.0, 120.0])),
                Size::new(80.0, 16.0),
                TextContent::new("Hello", 16.0),
            ))
            .unwrap();
        (scene, vector, text)
    }

    #[test]
    fn test_state_from_scene() {
        let (scene, vector, text) = scene();
        let state = DocumentState::from_scene(&scene);
        assert_eq!(state.pages.len(), 1);
        assert_eq!(state.element_count(), 2);

        let elements = &state.pages[0].elements;
        assert_eq!(elements[0].id, vector);
        assert_eq!((elements[0].x, elements[0].y), (10.0, 20.0));
        assert_eq!(elements[0].image_ref, Some(vector_ref(vector)));
        assert_eq!(elements[1].id, text);
        assert_eq!(elements[1].order, 2);
        assert_eq!((elements[1].width, elements[1].height), (80.0, 16.0));
        assert_eq!(elements[1].font_size, Some(16.0));
    }

    #[test]
    fn test_json_field_names() {
        let (scene, _, _) = scene();
        let json = to_json(&DocumentState::from_scene(&scene), JsonFormat::Compact).unwrap();
        assert!(json.contains("\"type\":\"vector\""));
        assert!(json.contains("\"fontSize\":16.0"));
        assert!(json.contains("\"imageRef\""));
        assert!(!json.contains('\n'));

        let back = DocumentState::from_json(&json).unwrap();
        assert_eq!(back.element_count(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let (scene, _, _) = scene();
        let summary = DocumentSummary::from_scene(&scene);
        assert_eq!(summary.page_count, 1);
        assert_eq!(summary.element_count, 2);
        assert_eq!(summary.pages[0].text_elements, 1);
        assert_eq!(summary.pages[0].vector_elements, 1);
        assert_eq!(summary.pages[0].image_elements, 0);
        let json = to_json(&summary, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"textElements\": 1"));
    }

    #[test]
    fn test_apply_state_moves_resizes_and_reorders() {
        let (mut scene, vector, text) = scene();
        let mut state = DocumentState::from_scene(&scene);
        {
            let elements = &mut state.pages[0].elements;
            elements[0].x = 110.0;
            elements[0].width = 60.0;
            elements[0].order = 2;
            elements[1].order = 1;
            elements[1].text = Some("Bye".into());
            elements[1].height = f64::NAN;
        }
        let stranger = ElementState {
            id: BlockId::new(),
            ..state.pages[0].elements[0].clone()
        };
        state.pages[0].elements.push(stranger);

        assert_eq!(apply_state(&mut scene, &state), 2);

        let block = scene.block(vector).unwrap();
        assert_eq!(block.edit().translate_x, 100.0);
        assert_eq!(block.edit().scale_x, 2.0);
        assert_eq!(block.z_order(), 2);

        let block = scene.block(text).unwrap();
        assert_eq!(block.z_order(), 1);
        assert_eq!(block.as_text().unwrap().text, "Bye");
        assert_eq!(block.edit().scale_y, 1.0);
    }

    #[test]
    fn test_unchanged_state_keeps_mirroring() {
        let (mut scene, vector, text) = scene();
        scene.select(text);
        crate::edit::apply(&mut scene, crate::edit::EditIntent::SetScale { x: -1.0, y: 1.0 });
        scene.select(vector);
        crate::edit::apply(&mut scene, crate::edit::EditIntent::SetScale { x: 2.0, y: -0.5 });

        let state = DocumentState::from_scene(&scene);
        assert_eq!(state.pages[0].elements[1].width, 80.0);
        assert_eq!(apply_state(&mut scene, &state), 2);

        let edit = scene.block(text).unwrap().edit();
        assert_eq!((edit.scale_x, edit.scale_y), (-1.0, 1.0));
        let edit = scene.block(vector).unwrap().edit();
        assert_eq!((edit.scale_x, edit.scale_y), (2.0, -0.5));
    }

    #[test]
    fn test_apply_state_font_size_resizes_text_box() {
        let (mut scene, _, text) = scene();
        let mut state = DocumentState::from_scene(&scene);
        state.pages[0].elements[1].font_size = Some(32.0);
        apply_state(&mut scene, &state);

        let block = scene.block(text).unwrap();
        assert_eq!(block.as_text().unwrap().font_size, 32.0);
        assert_eq!(block.font_scale(), 2.0);
        assert_eq!(block.composite_size(), Size::new(160.0, 32.0));
        assert_eq!(block.edit().scale_y, 1.0);

        // Sending the new state back changes nothing.
        let again = DocumentState::from_scene(&scene);
        apply_state(&mut scene, &again);
        assert_eq!(DocumentState::from_scene(&scene), again);
    }

    #[test]
    fn test_apply_state_ignores_unknown_page() {
        let (mut scene, _, _) = scene();
        let mut state = DocumentState::from_scene(&scene);
        state.pages[0].index = 7;
        assert_eq!(apply_state(&mut scene, &state), 0);
    }
}

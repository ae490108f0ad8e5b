//! The block registry.
//!
//! A [`SceneModel`] owns every block of a loaded document, keyed by id, plus
//! one ordered id list per page. The position of an id in its page list is
//! the block's paint order; `z_order` on the block mirrors it as `1..=N` and
//! is rewritten after every mutation, so the two never disagree.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::model::{Block, BlockId, Metadata, Page};
use crate::transform::EditState;

/// Translation added to both axes of a duplicate, in viewport pixels.
pub const DUPLICATE_OFFSET: f64 = 10.0;

/// Direction for a one-step z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// One step toward the top.
    Forward,
    /// One step toward the bottom.
    Backward,
}

/// Pages, blocks and the current selection of one document.
#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    metadata: Metadata,
    pages: BTreeMap<u32, Page>,
    blocks: HashMap<BlockId, Block>,
    selection: Option<BlockId>,
}

impl SceneModel {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene carrying document metadata.
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Insert a page.
    ///
    /// A page already present at the same index is cleared and replaced.
    pub fn add_page(&mut self, mut page: Page) {
        if self.pages.contains_key(&page.index) {
            self.clear_page(page.index);
        }
        page.block_ids.clear();
        self.pages.insert(page.index, page);
    }

    /// Get a page by index.
    pub fn page(&self, index: u32) -> Option<&Page> {
        self.pages.get(&index)
    }

    /// All pages in index order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a block by id.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    /// Blocks of a page in paint order (bottom first).
    pub fn blocks_on_page(&self, index: u32) -> Vec<&Block> {
        self.pages
            .get(&index)
            .map(|page| {
                page.block_ids
                    .iter()
                    .filter_map(|id| self.blocks.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All blocks, page by page, each page in paint order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages
            .values()
            .flat_map(|page| page.block_ids.iter().filter_map(|id| self.blocks.get(id)))
    }

    /// Total number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the scene holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Add a block on top of its page.
    pub fn add_block(&mut self, block: Block) -> Result<BlockId> {
        let id = block.id();
        let page_index = block.page_index();
        let page = self
            .pages
            .get_mut(&page_index)
            .ok_or(Error::PageNotFound(page_index))?;
        page.block_ids.push(id);
        self.blocks.insert(id, block);
        self.renumber(page_index);
        Ok(id)
    }

    /// Add several blocks in order, each on top of the previous one.
    pub fn add_blocks(&mut self, blocks: impl IntoIterator<Item = Block>) -> Result<Vec<BlockId>> {
        blocks.into_iter().map(|block| self.add_block(block)).collect()
    }

    /// Remove a block and compact its page's z-order.
    ///
    /// Clears the selection when it pointed at the removed block.
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let block = self.blocks.remove(&id)?;
        let page_index = block.page_index();
        if let Some(page) = self.pages.get_mut(&page_index) {
            page.block_ids.retain(|other| *other != id);
        }
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.renumber(page_index);
        Some(block)
    }

    /// Clone a block under a fresh id, offset by [`DUPLICATE_OFFSET`], on top
    /// of its page.
    pub fn duplicate_block(&mut self, id: BlockId) -> Result<BlockId> {
        let source = self.blocks.get(&id).ok_or(Error::BlockNotFound(id))?;
        if !self.pages.contains_key(&source.page_index()) {
            return Err(Error::PageNotFound(source.page_index()));
        }
        let copy = source.duplicate(DUPLICATE_OFFSET);
        self.add_block(copy)
    }

    /// Swap a block with its neighbour in the given direction.
    ///
    /// Returns `false` when the block is unknown or already at that end.
    pub fn reorder(&mut self, id: BlockId, direction: ReorderDirection) -> bool {
        let Some((page_index, pos)) = self.position(id) else {
            return false;
        };
        let Some(page) = self.pages.get_mut(&page_index) else {
            return false;
        };
        let other = match direction {
            ReorderDirection::Forward if pos + 1 < page.block_ids.len() => pos + 1,
            ReorderDirection::Backward if pos > 0 => pos - 1,
            _ => return false,
        };
        page.block_ids.swap(pos, other);
        self.renumber(page_index);
        true
    }

    /// Move a block to a 1-based z position, clamped to the page's range.
    pub fn move_to_z(&mut self, id: BlockId, position: u32) -> bool {
        let Some((page_index, pos)) = self.position(id) else {
            return false;
        };
        let Some(page) = self.pages.get_mut(&page_index) else {
            return false;
        };
        let target = (position.max(1) as usize - 1).min(page.block_ids.len() - 1);
        if target == pos {
            return false;
        }
        let moved = page.block_ids.remove(pos);
        page.block_ids.insert(target, moved);
        self.renumber(page_index);
        true
    }

    /// Select a block, replacing any previous selection.
    pub fn select(&mut self, id: BlockId) -> bool {
        if !self.blocks.contains_key(&id) {
            return false;
        }
        self.selection = Some(id);
        true
    }

    /// Clear the selection, returning what was selected.
    pub fn deselect(&mut self) -> Option<BlockId> {
        self.selection.take()
    }

    pub fn selection(&self) -> Option<BlockId> {
        self.selection
    }

    /// The selected block, if any.
    pub fn selected_block(&self) -> Option<&Block> {
        self.selection.and_then(|id| self.blocks.get(&id))
    }

    /// Drop every block of a page, keeping the page itself.
    pub fn clear_page(&mut self, index: u32) -> usize {
        let Some(page) = self.pages.get_mut(&index) else {
            return 0;
        };
        let ids = std::mem::take(&mut page.block_ids);
        for id in &ids {
            self.blocks.remove(id);
        }
        if self.selection.is_some_and(|id| ids.contains(&id)) {
            self.selection = None;
        }
        ids.len()
    }

    /// Replace a block's edit state.
    pub(crate) fn set_edit_state(&mut self, id: BlockId, edit: EditState) -> bool {
        match self.blocks.get_mut(&id) {
            Some(block) => {
                *block.edit_mut() = edit;
                true
            }
            None => false,
        }
    }

    /// The topmost block on a page whose placed box contains `point`.
    pub fn hit_test(&self, page: u32, point: Point) -> Option<BlockId> {
        self.blocks_on_page(page)
            .into_iter()
            .rev()
            .find(|block| block.contains(point))
            .map(Block::id)
    }

    fn position(&self, id: BlockId) -> Option<(u32, usize)> {
        let page_index = self.blocks.get(&id)?.page_index();
        let pos = self
            .pages
            .get(&page_index)?
            .block_ids
            .iter()
            .position(|other| *other == id)?;
        Some((page_index, pos))
    }

    fn renumber(&mut self, page_index: u32) {
        let Some(page) = self.pages.get(&page_index) else {
            return;
        };
        for (i, id) in page.block_ids.iter().enumerate() {
            if let Some(block) = self.blocks.get_mut(id) {
                block.set_z_order(i as u32 + 1);
            }
        }
    }
}

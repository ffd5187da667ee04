use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{
    Block, BlockId, BlockUpdate, FormatKind, FormatValue, InlineElement, InlineElementId,
    InlineElementUpdate, NewBlock, NewInlineElement,
};

/// Content of the single paragraph a fresh document starts with
pub const DEFAULT_CONTENT: &str = "Start writing your content here...";

/// Resolved cursor or highlighted span inside one block.
///
/// Offsets are character offsets into the block's plain-text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    pub block_id: BlockId,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl SelectionRange {
    pub fn new(block_id: BlockId, start_offset: usize, end_offset: usize) -> Self {
        Self {
            block_id,
            start_offset,
            end_offset,
        }
    }

    pub fn caret(block_id: BlockId, offset: usize) -> Self {
        Self::new(block_id, offset, offset)
    }

    /// A caret has no extent
    pub fn is_caret(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Offsets ordered low..high
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_offset.min(self.end_offset)..self.start_offset.max(self.end_offset)
    }
}

/// Why a restored snapshot was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("document has no blocks")]
    NoBlocks,
    #[error("duplicate block id: {0}")]
    DuplicateBlockId(BlockId),
}

/// Whole editor state: ordered blocks, inline elements and the current selection.
///
/// Every operation is pure: it returns a new state (`Some`) or reports a no-op
/// (`None`) without touching `self`. Blocks are reference counted so a new state
/// shares every block it did not change with its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub blocks: Vec<Arc<Block>>,
    #[serde(default)]
    pub inline_elements: Vec<InlineElement>,
    /// Transient; never written to or read from a snapshot
    #[serde(skip)]
    pub selection: Option<SelectionRange>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::with_default_content(DEFAULT_CONTENT)
    }
}

impl EditorState {
    /// A document holding one paragraph with the given content
    pub fn with_default_content(content: &str) -> Self {
        Self {
            blocks: vec![Arc::new(Block::paragraph(BlockId::from("1"), content))],
            inline_elements: Vec::new(),
            selection: None,
        }
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id).map(Arc::as_ref)
    }

    pub fn block_index(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    pub fn inline_element(&self, id: &InlineElementId) -> Option<&InlineElement> {
        self.inline_elements.iter().find(|e| &e.id == id)
    }

    /// Inline elements anchored to `block_id`, in creation order
    pub fn inline_elements_for<'a>(
        &'a self,
        block_id: &'a BlockId,
    ) -> impl Iterator<Item = &'a InlineElement> + 'a {
        self.inline_elements
            .iter()
            .filter(move |e| &e.block_id == block_id)
    }

    /// Check the invariants a restored snapshot must satisfy
    pub fn validate(&self) -> Result<(), StateError> {
        if self.blocks.is_empty() {
            return Err(StateError::NoBlocks);
        }
        let mut seen = HashSet::new();
        for block in &self.blocks {
            if !seen.insert(&block.id) {
                return Err(StateError::DuplicateBlockId(block.id.clone()));
            }
        }
        Ok(())
    }

    pub fn with_block_updated(&self, id: &BlockId, update: &BlockUpdate) -> Option<Self> {
        let index = self.block_index(id)?;
        let updated = update.apply_to(&self.blocks[index]);
        if updated == *self.blocks[index] {
            return None;
        }
        let mut next = self.clone();
        next.blocks[index] = Arc::new(updated);
        Some(next)
    }

    /// Insert after `after` (or append when absent/unknown); returns the state and the new id
    pub fn with_block_inserted(&self, data: NewBlock, after: Option<&BlockId>) -> (Self, BlockId) {
        let id = self.fresh_block_id();
        let block = Arc::new(data.into_block(id.clone()));
        let mut next = self.clone();
        match after.and_then(|after| self.block_index(after)) {
            Some(index) => next.blocks.insert(index + 1, block),
            None => next.blocks.push(block),
        }
        (next, id)
    }

    /// Remove a block and the inline elements anchored to it
    pub fn without_block(&self, id: &BlockId) -> Option<Self> {
        let index = self.block_index(id)?;
        let mut next = self.clone();
        next.blocks.remove(index);
        next.inline_elements.retain(|e| &e.block_id != id);
        Some(next)
    }

    pub fn with_format(&self, id: &BlockId, kind: FormatKind, value: FormatValue) -> Option<Self> {
        let index = self.block_index(id)?;
        let block = &self.blocks[index];
        if block.format.get(kind) == Some(&value) {
            return None;
        }
        let mut updated = Block::clone(block);
        updated.format.set(kind, value);
        let mut next = self.clone();
        next.blocks[index] = Arc::new(updated);
        Some(next)
    }

    pub fn with_inline_element(&self, element: NewInlineElement) -> (Self, InlineElementId) {
        let mut id = InlineElementId::generate();
        while self.inline_element(&id).is_some() {
            id = InlineElementId::generate();
        }
        let mut next = self.clone();
        next.inline_elements.push(element.into_element(id.clone()));
        (next, id)
    }

    pub fn with_inline_element_updated(
        &self,
        id: &InlineElementId,
        update: &InlineElementUpdate,
    ) -> Option<Self> {
        let index = self.inline_elements.iter().position(|e| &e.id == id)?;
        let updated = update.apply_to(&self.inline_elements[index]);
        if updated == self.inline_elements[index] {
            return None;
        }
        let mut next = self.clone();
        next.inline_elements[index] = updated;
        Some(next)
    }

    pub fn without_inline_element(&self, id: &InlineElementId) -> Option<Self> {
        let index = self.inline_elements.iter().position(|e| &e.id == id)?;
        let mut next = self.clone();
        next.inline_elements.remove(index);
        Some(next)
    }

    /// Replace the selection unconditionally (last writer wins)
    pub fn with_selection(&self, selection: Option<SelectionRange>) -> Option<Self> {
        if self.selection == selection {
            return None;
        }
        Some(Self {
            blocks: self.blocks.clone(),
            inline_elements: self.inline_elements.clone(),
            selection,
        })
    }

    fn fresh_block_id(&self) -> BlockId {
        loop {
            let id = BlockId::generate();
            if self.block_index(&id).is_none() {
                return id;
            }
        }
    }
}

use std::sync::Arc;
use tempfile::TempDir;

use crate::editing::Document;
use crate::models::{Block, BlockId, BlockType, EditorState, SelectionRange};

/// Create a temporary directory for snapshot files
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Build a block with a fixed id
pub fn block(id: &str, block_type: BlockType, content: &str) -> Block {
    let mut block = Block::paragraph(BlockId::from(id), content);
    block.block_type = block_type;
    block.normalize();
    block
}

/// Document holding exactly `blocks`, without a snapshot store
pub fn document_with(blocks: Vec<Block>) -> Document {
    Document::from_state(EditorState {
        blocks: blocks.into_iter().map(Arc::new).collect(),
        inline_elements: Vec::new(),
        selection: None,
    })
}

/// Place a caret in `block_id` at `offset`
pub fn select(doc: &mut Document, block_id: &str, start: usize, end: usize) {
    doc.update_selection(Some(SelectionRange::new(BlockId::from(block_id), start, end)));
}

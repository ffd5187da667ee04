use crate::models::BlockId;

/// Request to place the caret at a character offset inside a block's editable region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretRequest {
    pub block_id: BlockId,
    pub offset: usize,
}

impl CaretRequest {
    pub fn new(block_id: BlockId, offset: usize) -> Self {
        Self { block_id, offset }
    }
}

/// Result of handling one input event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Patch {
    /// The surface must not run its own default handling for the event
    pub prevent_default: bool,
    /// Blocks inserted or modified by the event
    pub changed: Vec<BlockId>,
    /// Caret placement to apply once the new content has been materialized
    pub caret: Option<CaretRequest>,
    /// Document version after the event
    pub version: u64,
}

impl Patch {
    /// Event not handled; the surface keeps its default behavior
    pub fn pass_through(version: u64) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    /// Event consumed, whether or not anything changed
    pub fn handled(version: u64) -> Self {
        Self {
            prevent_default: true,
            version,
            ..Default::default()
        }
    }

    pub fn with_changed(mut self, block_id: BlockId) -> Self {
        self.changed.push(block_id);
        self
    }

    pub fn with_caret(mut self, block_id: BlockId, offset: usize) -> Self {
        self.caret = Some(CaretRequest::new(block_id, offset));
        self
    }
}

pub mod block;
pub mod format;
pub mod inline;
pub mod state;

pub use block::{Block, BlockId, BlockType, BlockUpdate, CalloutType, NewBlock, TabPolicy};
pub use format::{FormatKind, FormatState, FormatValue};
pub use inline::{
    InlineElement, InlineElementId, InlineElementType, InlineElementUpdate, NewInlineElement,
};
pub use state::{DEFAULT_CONTENT, EditorState, SelectionRange, StateError};

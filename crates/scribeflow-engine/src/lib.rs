pub mod editing;
pub mod formatting;
pub mod io;
pub mod models;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{
    CaretRequest, Document, EditorSession, KeyEvent, Patch, PasteEvent, RawSelection, Snapshot,
    SurfaceResolver,
};
pub use io::{FileStore, IoError, MemoryStore, SnapshotStore};
pub use models::{Block, BlockId, BlockType, EditorState, FormatKind, FormatState};

use std::sync::Arc;

use crate::editing::snapshot::{self, Snapshot};
use crate::io::{self, SnapshotStore};
use crate::models::{
    Block, BlockId, BlockUpdate, EditorState, FormatKind, FormatValue, InlineElementId,
    InlineElementUpdate, NewBlock, NewInlineElement, SelectionRange,
};

/// Explicit state container for the editor (the document model).
///
/// `Document` is the only writer of [`EditorState`]. Every other component reads
/// through [`Document::state`] and asks for changes through the operations below.
///
/// ## Semantics
///
/// - **Immutable snapshots**: each effective operation swaps in a new
///   `Arc<EditorState>`; holders of an older handle keep seeing the old state.
/// - **Silent no-ops**: operations addressing an id that does not exist leave the
///   state (and its `Arc`) untouched and return `false`.
/// - **Fire-and-forget persistence**: after every change the full state is handed to
///   the attached [`SnapshotStore`]; failures are logged and editing continues.
///
/// ```rust
/// # use scribeflow_engine::editing::Document;
/// # use scribeflow_engine::models::{BlockType, NewBlock};
/// let mut doc = Document::new();
/// let first = doc.blocks()[0].id.clone();
///
/// let id = doc.insert_block(NewBlock::new(BlockType::Quote), Some(&first));
/// assert_eq!(doc.block_index(&id), Some(1));
/// ```
pub struct Document {
    state: Arc<EditorState>,
    /// Incremented on every effective change
    version: u64,
    store: Option<Box<dyn SnapshotStore>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("state", &self.state)
            .field("version", &self.version)
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl Document {
    /// Fresh document with the default paragraph and no persistence
    pub fn new() -> Self {
        Self::from_state(EditorState::default())
    }

    pub fn from_state(state: EditorState) -> Self {
        Self {
            state: Arc::new(state),
            version: 0,
            store: None,
        }
    }

    /// Restore from `store` (or start from `default_content`) and persist into it from now on
    pub fn open(store: Box<dyn SnapshotStore>, default_content: &str) -> Self {
        let state = io::restore_or_default(store.as_ref(), default_content);
        Self {
            state: Arc::new(state),
            version: 0,
            store: Some(store),
        }
    }

    /// Shared read-only handle on the current state
    pub fn state(&self) -> Arc<EditorState> {
        Arc::clone(&self.state)
    }

    pub fn blocks(&self) -> &[Arc<Block>] {
        &self.state.blocks
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.state.block(id)
    }

    pub fn block_index(&self, id: &BlockId) -> Option<usize> {
        self.state.block_index(id)
    }

    pub fn selection(&self) -> Option<&SelectionRange> {
        self.state.selection.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Merge `update` into the block with `id`
    pub fn update_block(&mut self, id: &BlockId, update: BlockUpdate) -> bool {
        let next = self.state.with_block_updated(id, &update);
        self.commit(next)
    }

    /// Insert a block after `after` (appending when absent or unknown) and return its id
    pub fn insert_block(&mut self, data: NewBlock, after: Option<&BlockId>) -> BlockId {
        let (next, id) = self.state.with_block_inserted(data, after);
        self.commit(Some(next));
        id
    }

    /// Remove a block. Keeping at least one block is the caller's policy.
    pub fn delete_block(&mut self, id: &BlockId) -> bool {
        let next = self.state.without_block(id);
        self.commit(next)
    }

    /// Set one format value on a block
    pub fn format_text(
        &mut self,
        block_id: &BlockId,
        kind: FormatKind,
        value: impl Into<FormatValue>,
    ) -> bool {
        let next = self.state.with_format(block_id, kind, value.into());
        self.commit(next)
    }

    pub fn add_inline_element(&mut self, element: NewInlineElement) -> InlineElementId {
        let (next, id) = self.state.with_inline_element(element);
        self.commit(Some(next));
        id
    }

    pub fn update_inline_element(
        &mut self,
        id: &InlineElementId,
        update: InlineElementUpdate,
    ) -> bool {
        let next = self.state.with_inline_element_updated(id, &update);
        self.commit(next)
    }

    pub fn remove_inline_element(&mut self, id: &InlineElementId) -> bool {
        let next = self.state.without_inline_element(id);
        self.commit(next)
    }

    /// Replace the current selection (last writer wins). Selection is not persisted.
    pub fn update_selection(&mut self, selection: Option<SelectionRange>) {
        if let Some(next) = self.state.with_selection(selection) {
            self.state = Arc::new(next);
            self.version += 1;
        }
    }

    /// Display data for the rendering collaborator
    pub fn snapshot(&self) -> Snapshot {
        snapshot::create_snapshot(&self.state, self.version)
    }

    fn commit(&mut self, next: Option<EditorState>) -> bool {
        let Some(next) = next else {
            return false;
        };
        self.state = Arc::new(next);
        self.version += 1;
        self.persist();
        true
    }

    fn persist(&self) {
        if let Some(store) = &self.store
            && let Err(e) = store.save(&self.state)
        {
            log::warn!("Failed to save editor state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{IoError, MemoryStore};
    use crate::models::{BlockType, CalloutType, FormatState, InlineElementType};
    use crate::tests::{block, document_with};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn load(&self) -> Result<Option<EditorState>, IoError> {
            Ok(None)
        }

        fn save(&self, _state: &EditorState) -> Result<(), IoError> {
            Err(IoError::Invalid("disk full".to_string()))
        }
    }

    fn ids(doc: &Document) -> Vec<String> {
        doc.blocks().iter().map(|b| b.id.to_string()).collect()
    }

    #[test]
    fn test_insert_places_block_after_target() {
        let mut doc = document_with(vec![
            block("1", BlockType::Paragraph, "one"),
            block("2", BlockType::Paragraph, "two"),
        ]);

        let id = doc.insert_block(NewBlock::default(), Some(&BlockId::from("1")));

        assert_eq!(ids(&doc), vec!["1".to_string(), id.to_string(), "2".to_string()]);
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_update_missing_block_keeps_identical_state() {
        let mut doc = document_with(vec![block("1", BlockType::Paragraph, "one")]);
        let before = doc.state();
        let bytes = serde_json::to_string(&*before).unwrap();

        let changed = doc.update_block(&BlockId::from("nope"), BlockUpdate::default().content("x"));

        assert!(!changed);
        assert!(Arc::ptr_eq(&before, &doc.state()));
        assert_eq!(serde_json::to_string(&*doc.state()).unwrap(), bytes);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_old_handles_see_old_state() {
        let mut doc = document_with(vec![block("1", BlockType::Paragraph, "one")]);
        let before = doc.state();

        doc.update_block(&BlockId::from("1"), BlockUpdate::default().content("uno"));

        assert_eq!(before.blocks[0].content, "one");
        assert_eq!(doc.block(&BlockId::from("1")).unwrap().content, "uno");
    }

    #[test]
    fn test_delete_block_does_not_enforce_minimum() {
        let mut doc = document_with(vec![block("1", BlockType::Paragraph, "")]);
        assert!(doc.delete_block(&BlockId::from("1")));
        assert!(doc.blocks().is_empty());
        assert!(!doc.delete_block(&BlockId::from("1")));
    }

    #[test]
    fn test_format_text_sets_value() {
        let mut doc = document_with(vec![block("1", BlockType::Paragraph, "x")]);

        assert!(doc.format_text(&BlockId::from("1"), FormatKind::Color, "blue"));
        assert!(!doc.format_text(&BlockId::from("2"), FormatKind::Bold, true));

        let expected = FormatState::new().with(FormatKind::Color, "blue");
        assert_eq!(doc.block(&BlockId::from("1")).unwrap().format, expected);
    }

    #[test]
    fn test_inline_element_crud() {
        let mut doc = document_with(vec![block("1", BlockType::Paragraph, "see docs")]);
        let id = doc.add_inline_element(NewInlineElement::link(
            BlockId::from("1"),
            4..8,
            "https://example.com",
            "Link",
        ));

        assert!(doc.update_inline_element(&id, InlineElementUpdate::default().range(0..3)));
        let element = doc.state().inline_element(&id).cloned().unwrap();
        assert_eq!(element.element_type, InlineElementType::Link);
        assert_eq!((element.start_offset, element.end_offset), (0, 3));

        assert!(doc.remove_inline_element(&id));
        assert!(!doc.remove_inline_element(&id));
        assert!(doc.state().inline_elements.is_empty());
    }

    #[test]
    fn test_update_selection_replaces_unconditionally() {
        let mut doc = document_with(vec![block("1", BlockType::Paragraph, "abc")]);

        doc.update_selection(Some(SelectionRange::new(BlockId::from("1"), 0, 2)));
        doc.update_selection(Some(SelectionRange::caret(BlockId::from("1"), 1)));
        assert_eq!(doc.selection(), Some(&SelectionRange::caret(BlockId::from("1"), 1)));

        doc.update_selection(None);
        assert_eq!(doc.selection(), None);
    }

    #[test]
    fn test_every_change_is_persisted() {
        let store = Rc::new(MemoryStore::new());
        let mut doc = Document::open(Box::new(Rc::clone(&store)), "hello");
        let first = doc.blocks()[0].id.clone();

        doc.update_block(&first, BlockUpdate::default().block_type(BlockType::Callout));
        doc.update_block(&BlockId::from("missing"), BlockUpdate::default().indent(1));

        assert_eq!(store.save_count(), 1);
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.blocks[0].callout_type, Some(CalloutType::Info));
    }

    #[test]
    fn test_selection_changes_are_not_persisted() {
        let store = Rc::new(MemoryStore::new());
        let mut doc = Document::open(Box::new(Rc::clone(&store)), "hello");
        let first = doc.blocks()[0].id.clone();
        let version = doc.version();

        doc.update_selection(Some(SelectionRange::caret(first.clone(), 2)));
        doc.update_selection(Some(SelectionRange::new(first.clone(), 0, 5)));

        assert_eq!(store.save_count(), 0);
        assert_eq!(doc.version(), version + 2);
        assert_eq!(doc.selection().map(|s| s.end_offset), Some(5));

        doc.update_block(&first, BlockUpdate::default().content("bye"));
        let saved = store.load().unwrap().unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(saved.selection, None);
    }

    #[test]
    fn test_persistence_failure_does_not_block_editing() {
        let mut doc = Document::open(Box::new(FailingStore), "hello");
        let first = doc.blocks()[0].id.clone();

        assert!(doc.update_block(&first, BlockUpdate::default().content("still works")));
        assert_eq!(doc.block(&first).unwrap().content, "still works");
    }

    #[test]
    fn test_open_with_malformed_snapshot_falls_back() {
        let doc = Document::open(Box::new(MemoryStore::with_json("{\"blocks\": 5}")), "fresh");
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.blocks()[0].content, "fresh");
    }
}

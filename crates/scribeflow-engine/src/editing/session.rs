use std::collections::VecDeque;

use crate::editing::clipboard::{self, PasteEvent};
use crate::editing::commands::{self, KeyEvent};
use crate::editing::selection::{RawSelection, SelectionTracker, SurfaceResolver, TrackerState};
use crate::editing::snapshot::Snapshot;
use crate::editing::{CaretRequest, Document, Patch};
use crate::models::{
    BlockId, BlockType, BlockUpdate, CalloutType, FormatKind, InlineElementId, NewBlock,
    NewInlineElement, SelectionRange,
};

/// One editor instance wired to one editing surface.
///
/// Every input event from the surface enters through an `on_*` method and is
/// handled to completion before the next. Caret placements that depend on new
/// content being on screen are queued and handed out by
/// [`EditorSession::take_caret_requests`] once the host has redrawn.
#[derive(Debug)]
pub struct EditorSession<R: SurfaceResolver> {
    document: Document,
    tracker: SelectionTracker,
    resolver: R,
    pending_carets: VecDeque<CaretRequest>,
}

impl<R: SurfaceResolver> EditorSession<R> {
    pub fn new(document: Document, resolver: R) -> Self {
        Self {
            document,
            tracker: SelectionTracker::new(),
            resolver,
            pending_carets: VecDeque::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Mutable access for hosts whose layout changes between events
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn tracker_state(&self) -> &TrackerState {
        self.tracker.state()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.document.snapshot()
    }

    pub fn on_selection_change(
        &mut self,
        raw: Option<&RawSelection<R::Position>>,
    ) -> &TrackerState {
        self.tracker
            .on_selection_change(&mut self.document, &self.resolver, raw)
    }

    /// Key pressed with the current selection as target
    pub fn on_key_down(&mut self, event: &KeyEvent) -> Patch {
        let patch = commands::dispatch(&mut self.document, event);
        self.defer_caret(&patch);
        patch
    }

    /// Key pressed inside a specific block's editable region
    pub fn on_key_down_in_block(&mut self, block_id: &BlockId, event: &KeyEvent) -> Patch {
        let patch = commands::dispatch_for_block(&mut self.document, block_id, event);
        self.defer_caret(&patch);
        patch
    }

    pub fn on_paste(&mut self, event: &PasteEvent<R::Position>) -> Patch {
        let patch = clipboard::handle_paste(&mut self.document, &self.resolver, event);
        self.defer_caret(&patch);
        patch
    }

    /// The surface's text for a block changed through ordinary typing
    pub fn on_content_change(&mut self, block_id: &BlockId, text: impl Into<String>) -> bool {
        self.document
            .update_block(block_id, BlockUpdate::default().content(text))
    }

    /// Caret placements queued since the last call, oldest first
    pub fn take_caret_requests(&mut self) -> Vec<CaretRequest> {
        self.pending_carets.drain(..).collect()
    }

    // Toolbar actions. All of them target the block holding the selection.

    pub fn toggle_format(&mut self, kind: FormatKind) -> bool {
        let Some(block) = self.selected_block_id().and_then(|id| self.document.block(&id)) else {
            return false;
        };
        let active = block.format.is_active(kind);
        let id = block.id.clone();
        self.document.format_text(&id, kind, !active)
    }

    pub fn change_block_type(&mut self, block_type: BlockType) -> bool {
        let Some(id) = self.selected_block_id() else {
            return false;
        };
        self.document
            .update_block(&id, BlockUpdate::default().block_type(block_type))
    }

    /// Insert an empty block of `block_type` after the selected block (or at the end)
    pub fn insert_block_element(&mut self, block_type: BlockType) -> BlockId {
        let after = self.selected_block_id();
        let callout_type = (block_type == BlockType::Callout).then_some(CalloutType::Info);
        let data = NewBlock::new(block_type).with_callout_type(callout_type);
        let id = self.document.insert_block(data, after.as_ref());
        self.pending_carets.push_back(CaretRequest::new(id.clone(), 0));
        id
    }

    /// Only meaningful on callout blocks; a no-op elsewhere
    pub fn set_callout_type(&mut self, callout_type: CalloutType) -> bool {
        let Some(id) = self.selected_block_id() else {
            return false;
        };
        self.document
            .update_block(&id, BlockUpdate::default().callout_type(callout_type))
    }

    pub fn block_type_label(&self) -> &'static str {
        self.selected_block_id()
            .and_then(|id| self.document.block(&id))
            .map(|block| block.block_type.label())
            .unwrap_or(BlockType::Paragraph.label())
    }

    pub fn is_format_active(&self, kind: FormatKind) -> bool {
        self.selected_block_id()
            .and_then(|id| self.document.block(&id))
            .is_some_and(|block| block.format.is_active(kind))
    }

    // Selection-menu actions. They need a non-empty selection.

    /// Switch `kind` on for the selected block (menu buttons set, never clear)
    pub fn apply_format(&mut self, kind: FormatKind) -> bool {
        let Some(selection) = self.menu_selection() else {
            return false;
        };
        self.document.format_text(&selection.block_id, kind, true)
    }

    /// Attach a link over the selected range
    pub fn create_link(&mut self, url: &str, text: &str) -> Option<InlineElementId> {
        let selection = self.menu_selection()?;
        self.document.block(&selection.block_id)?;
        let range = selection.range();
        Some(self.document.add_inline_element(NewInlineElement::link(
            selection.block_id,
            range,
            url,
            text,
        )))
    }

    fn selected_block_id(&self) -> Option<BlockId> {
        self.document.selection().map(|s| s.block_id.clone())
    }

    fn menu_selection(&self) -> Option<SelectionRange> {
        self.tracker
            .state()
            .selection()
            .filter(|selection| !selection.is_caret())
            .cloned()
    }

    fn defer_caret(&mut self, patch: &Patch) {
        if let Some(caret) = &patch.caret {
            self.pending_carets.push_back(caret.clone());
        }
    }
}

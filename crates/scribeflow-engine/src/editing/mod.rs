/*!
 * # Editing Core
 *
 * Everything between raw input from an editing surface and the persisted
 * [`EditorState`](crate::models::EditorState).
 *
 * ## Architecture Overview
 *
 * ### 1. Single writer
 * - [`Document`] owns the current state behind an `Arc` and is the only code path
 *   that replaces it
 * - Every effective change bumps the document version and hands the full state to
 *   the attached snapshot store; store failures are logged, never propagated
 * - Operations on ids that no longer exist are silent no-ops
 *
 * ### 2. Surface-agnostic input
 * - The surface reports selections, key presses and pastes in its own position type
 * - A [`SurfaceResolver`] maps those positions back to blocks
 * - Key presses decode into [`EditCommand`]s; each handled event returns a [`Patch`]
 *   telling the surface whether to suppress its default and where to put the caret
 *
 * ### 3. Read API: immutable snapshots
 * - Renderers consume [`Snapshot`]s of [`RenderBlock`]s carrying the formatted
 *   markup, plain text, list depth and numbering for each block
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` state container
 * - **`selection`**: selection tracker state machine and the `SurfaceResolver` seam
 * - **`commands`**: key decoding and the edit-command dispatcher
 * - **`clipboard`**: plain-text paste
 * - **`session`**: `EditorSession` wiring all of the above for one surface
 * - **`snapshot`**: display data for renderers
 * - **`patch`**: per-event result metadata
 * - **`text`**: char-offset helpers and rope splicing
 *
 * ## Usage Pattern
 *
 * ```rust
 * use scribeflow_engine::editing::*;
 * use scribeflow_engine::models::BlockId;
 *
 * struct Rows(Vec<BlockId>);
 *
 * impl SurfaceResolver for Rows {
 *     type Position = usize;
 *
 *     fn contains(&self, row: &usize) -> bool {
 *         *row < self.0.len()
 *     }
 *
 *     fn resolve_block_for_position(&self, row: &usize) -> Option<BlockId> {
 *         self.0.get(*row).cloned()
 *     }
 * }
 *
 * let doc = Document::new();
 * let rows = Rows(doc.blocks().iter().map(|b| b.id.clone()).collect());
 * let mut session = EditorSession::new(doc, rows);
 *
 * // Caret at the end of the first block, then Enter
 * session.on_selection_change(Some(&RawSelection {
 *     anchor: 0,
 *     start_offset: 5,
 *     end_offset: 5,
 *     bounds: None,
 * }));
 * let patch = session.on_key_down(&KeyEvent::plain(Key::Enter));
 *
 * assert!(patch.prevent_default);
 * assert_eq!(session.snapshot().blocks.len(), 2);
 * assert_eq!(session.take_caret_requests().len(), 1);
 * ```
 */

pub mod clipboard;
pub mod commands;
pub mod document;
pub mod patch;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod text;

pub use clipboard::{PasteEvent, handle_paste};
pub use commands::{EditCommand, Key, KeyEvent, Modifiers, dispatch, dispatch_for_block};
pub use document::Document;
pub use patch::{CaretRequest, Patch};
pub use selection::{
    MenuAnchor, RawSelection, Rect, SelectionTracker, SurfaceResolver, TrackerState,
};
pub use session::EditorSession;
pub use snapshot::{ContentGroup, ListItem, RenderBlock, RenderKind, Snapshot, render_block};

use crate::editing::selection::SurfaceResolver;
use crate::editing::text::{char_len, splice};
use crate::editing::{Document, Patch};
use crate::models::BlockUpdate;

/// Raw paste event from the editing surface
#[derive(Debug, Clone, PartialEq)]
pub struct PasteEvent<P> {
    /// Live cursor position
    pub position: P,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Plain-text clipboard payload
    pub plain_text: Option<String>,
    /// Rich payload; never inserted
    pub html: Option<String>,
}

impl<P> PasteEvent<P> {
    /// Plain-text paste at a caret
    pub fn text(position: P, offset: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            start_offset: offset,
            end_offset: offset,
            plain_text: Some(text.into()),
            html: None,
        }
    }
}

/// Splice the plain-text payload of `event` into the block under the cursor.
///
/// Passes through (surface default) when no block resolves or there is no plain
/// text. Otherwise the selected span is replaced and a caret placement just after
/// the pasted text is requested.
pub fn handle_paste<R: SurfaceResolver>(
    doc: &mut Document,
    resolver: &R,
    event: &PasteEvent<R::Position>,
) -> Patch {
    let Some(text) = event.plain_text.as_deref().filter(|text| !text.is_empty()) else {
        return Patch::pass_through(doc.version());
    };
    if !resolver.contains(&event.position) {
        return Patch::pass_through(doc.version());
    }
    let Some(block_id) = resolver.resolve_block_for_position(&event.position) else {
        return Patch::pass_through(doc.version());
    };
    let Some(block) = doc.block(&block_id) else {
        log::debug!("Ignoring paste into missing block {block_id}");
        return Patch::pass_through(doc.version());
    };
    if event.html.is_some() {
        log::debug!("Discarding rich clipboard payload");
    }

    let start = event.start_offset.min(event.end_offset);
    let content = splice(&block.content, event.start_offset..event.end_offset, text);
    let caret = start.min(char_len(&block.content)) + char_len(text);

    doc.update_block(&block_id, BlockUpdate::default().content(content));
    Patch::handled(doc.version())
        .with_changed(block_id.clone())
        .with_caret(block_id, caret)
}

use crate::editing::Document;
use crate::models::{BlockId, SelectionRange};

/// Vertical gap between the top of a selection and the floating menu anchor
pub const MENU_OFFSET: f32 = 40.0;

/// Capability supplied by the editing surface to interpret its own positions.
///
/// The tracker never looks at how a surface represents positions (DOM nodes,
/// terminal cells, ...). It only asks whether a position lies inside the editable
/// region and which block, if any, owns it.
pub trait SurfaceResolver {
    type Position;

    /// Whether `position` lies inside the editable region
    fn contains(&self, position: &Self::Position) -> bool;

    /// Nearest enclosing block of `position`
    fn resolve_block_for_position(&self, position: &Self::Position) -> Option<BlockId>;
}

/// Bounding box of a selection in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

/// Live selection reported by the editing surface
#[derive(Debug, Clone, PartialEq)]
pub struct RawSelection<P> {
    /// Where the selection is anchored (its start container)
    pub anchor: P,
    pub start_offset: usize,
    pub end_offset: usize,
    pub bounds: Option<Rect>,
}

/// Where the floating selection-action menu should be drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuAnchor {
    pub top: f32,
    pub left: f32,
}

impl MenuAnchor {
    /// Just above `bounds`, horizontally centered on it
    pub fn above(bounds: &Rect) -> Self {
        Self {
            top: bounds.top - MENU_OFFSET,
            left: bounds.left + bounds.width / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrackerState {
    /// No selection; menu hidden
    #[default]
    Idle,
    /// Selection or caret resolved to a block
    Active {
        selection: SelectionRange,
        /// Present only while the selection spans characters
        menu: Option<MenuAnchor>,
    },
}

impl TrackerState {
    pub fn selection(&self) -> Option<&SelectionRange> {
        match self {
            TrackerState::Idle => None,
            TrackerState::Active { selection, .. } => Some(selection),
        }
    }

    pub fn menu(&self) -> Option<MenuAnchor> {
        match self {
            TrackerState::Idle => None,
            TrackerState::Active { menu, .. } => *menu,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TrackerState::Active { .. })
    }
}

/// Turns raw selection notifications into block-relative selections
#[derive(Debug, Default)]
pub struct SelectionTracker {
    state: TrackerState,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Handle one selection-change notification and mirror the result into `doc`
    pub fn on_selection_change<R: SurfaceResolver>(
        &mut self,
        doc: &mut Document,
        resolver: &R,
        raw: Option<&RawSelection<R::Position>>,
    ) -> &TrackerState {
        self.state = match Self::resolve(resolver, raw) {
            Some((selection, bounds)) => {
                let menu = if selection.is_caret() {
                    None
                } else {
                    bounds.as_ref().map(MenuAnchor::above)
                };
                doc.update_selection(Some(selection.clone()));
                TrackerState::Active { selection, menu }
            }
            None => {
                doc.update_selection(None);
                TrackerState::Idle
            }
        };
        &self.state
    }

    /// Drop back to Idle, e.g. when the surface loses focus
    pub fn reset(&mut self, doc: &mut Document) {
        self.state = TrackerState::Idle;
        doc.update_selection(None);
    }

    fn resolve<R: SurfaceResolver>(
        resolver: &R,
        raw: Option<&RawSelection<R::Position>>,
    ) -> Option<(SelectionRange, Option<Rect>)> {
        let raw = raw?;
        if !resolver.contains(&raw.anchor) {
            return None;
        }
        let block_id = resolver.resolve_block_for_position(&raw.anchor)?;
        Some((
            SelectionRange::new(block_id, raw.start_offset, raw.end_offset),
            raw.bounds,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockType;
    use crate::tests::{block, document_with};
    use pretty_assertions::assert_eq;

    /// Positions are (row, column); rows 0..3 belong to blocks "a", "b", "c",
    /// row 3 is a non-block gutter and rows past 3 are outside the editor.
    struct Rows;

    impl SurfaceResolver for Rows {
        type Position = (usize, usize);

        fn contains(&self, position: &(usize, usize)) -> bool {
            position.0 <= 3
        }

        fn resolve_block_for_position(&self, position: &(usize, usize)) -> Option<BlockId> {
            ["a", "b", "c"].get(position.0).map(|id| BlockId::from(*id))
        }
    }

    fn raw(row: usize, start: usize, end: usize) -> RawSelection<(usize, usize)> {
        RawSelection {
            anchor: (row, start),
            start_offset: start,
            end_offset: end,
            bounds: Some(Rect {
                top: 100.0,
                left: 20.0,
                width: 60.0,
                height: 18.0,
            }),
        }
    }

    fn doc() -> Document {
        document_with(vec![
            block("a", BlockType::Paragraph, "alpha"),
            block("b", BlockType::Paragraph, "beta"),
            block("c", BlockType::Paragraph, "gamma"),
        ])
    }

    #[test]
    fn test_caret_activates_without_menu() {
        let mut doc = doc();
        let mut tracker = SelectionTracker::new();

        let state = tracker.on_selection_change(&mut doc, &Rows, Some(&raw(1, 2, 2)));

        assert_eq!(state.selection(), Some(&SelectionRange::caret(BlockId::from("b"), 2)));
        assert_eq!(state.menu(), None);
        assert_eq!(doc.selection(), Some(&SelectionRange::caret(BlockId::from("b"), 2)));
    }

    #[test]
    fn test_span_shows_menu_above_center() {
        let mut doc = doc();
        let mut tracker = SelectionTracker::new();

        let state = tracker.on_selection_change(&mut doc, &Rows, Some(&raw(2, 1, 4)));

        assert_eq!(
            state.menu(),
            Some(MenuAnchor {
                top: 60.0,
                left: 50.0
            })
        );
    }

    #[test]
    fn test_no_selection_goes_idle() {
        let mut doc = doc();
        let mut tracker = SelectionTracker::new();
        tracker.on_selection_change(&mut doc, &Rows, Some(&raw(0, 0, 3)));

        let state = tracker.on_selection_change(&mut doc, &Rows, None);

        assert_eq!(state, &TrackerState::Idle);
        assert_eq!(doc.selection(), None);
    }

    #[test]
    fn test_outside_editor_goes_idle() {
        let mut doc = doc();
        let mut tracker = SelectionTracker::new();

        let state = tracker.on_selection_change(&mut doc, &Rows, Some(&raw(7, 0, 1)));

        assert!(!state.is_active());
    }

    #[test]
    fn test_inside_editor_but_outside_any_block_goes_idle() {
        let mut doc = doc();
        let mut tracker = SelectionTracker::new();
        tracker.on_selection_change(&mut doc, &Rows, Some(&raw(0, 0, 0)));

        let state = tracker.on_selection_change(&mut doc, &Rows, Some(&raw(3, 0, 0)));

        assert!(!state.is_active());
        assert_eq!(doc.selection(), None);
    }

    #[test]
    fn test_menu_hides_when_span_collapses() {
        let mut doc = doc();
        let mut tracker = SelectionTracker::new();
        tracker.on_selection_change(&mut doc, &Rows, Some(&raw(0, 0, 3)));

        let state = tracker.on_selection_change(&mut doc, &Rows, Some(&raw(0, 3, 3)));

        assert!(state.is_active());
        assert_eq!(state.menu(), None);
    }
}

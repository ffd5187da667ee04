use crate::editing::text::{char_len, splice};
use crate::editing::{Document, Patch};
use crate::formatting;
use crate::models::{
    Block, BlockId, BlockType, BlockUpdate, FormatKind, FormatState, NewBlock, TabPolicy,
};

/// Key identity as reported by the editing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Control on most platforms, Command on macOS
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Raw key-down event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::ctrl())
    }
}

/// Structural edit recognized from a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    /// Enter: open a new sibling block below
    Split,
    /// Backspace on an empty block
    ClearOrMerge,
    /// Tab
    Indent,
    /// Shift+Tab
    Outdent,
    /// Ctrl/Cmd + b, i, u or e
    ToggleFormat(FormatKind),
    /// Reserved for a command palette; recognized but not acted on
    SlashCommand,
}

impl EditCommand {
    /// Decode a key event; `None` when the surface should handle it itself
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        let modifiers = event.modifiers;
        match event.key {
            Key::Enter if modifiers.is_empty() => Some(EditCommand::Split),
            Key::Backspace if !modifiers.command() && !modifiers.alt => {
                Some(EditCommand::ClearOrMerge)
            }
            Key::Tab if modifiers.command() || modifiers.alt => None,
            Key::Tab if modifiers.shift => Some(EditCommand::Outdent),
            Key::Tab => Some(EditCommand::Indent),
            Key::Char(c) if modifiers.command() => match c {
                'b' => Some(EditCommand::ToggleFormat(FormatKind::Bold)),
                'i' => Some(EditCommand::ToggleFormat(FormatKind::Italic)),
                'u' => Some(EditCommand::ToggleFormat(FormatKind::Underline)),
                'e' => Some(EditCommand::ToggleFormat(FormatKind::Code)),
                _ => None,
            },
            Key::Char('/') if !modifiers.alt => Some(EditCommand::SlashCommand),
            _ => None,
        }
    }
}

/// Interpret `event` against the block holding the current selection
pub fn dispatch(doc: &mut Document, event: &KeyEvent) -> Patch {
    let Some(block_id) = doc.selection().map(|s| s.block_id.clone()) else {
        return Patch::pass_through(doc.version());
    };
    dispatch_for_block(doc, &block_id, event)
}

/// Interpret `event` against a specific block
pub fn dispatch_for_block(doc: &mut Document, block_id: &BlockId, event: &KeyEvent) -> Patch {
    match EditCommand::from_key_event(event) {
        Some(command) => execute(doc, block_id, command),
        None => Patch::pass_through(doc.version()),
    }
}

/// Run `command` on `block_id`. Commands on a block that no longer exists are ignored.
pub fn execute(doc: &mut Document, block_id: &BlockId, command: EditCommand) -> Patch {
    let Some(block) = doc.block(block_id).cloned() else {
        log::debug!("Ignoring {command:?}: block {block_id} not found");
        return Patch::pass_through(doc.version());
    };

    match command {
        EditCommand::Split => split(doc, &block),
        EditCommand::ClearOrMerge => clear_or_merge(doc, &block),
        EditCommand::Indent => tab(doc, &block, true),
        EditCommand::Outdent => tab(doc, &block, false),
        EditCommand::ToggleFormat(kind) => {
            let active = block.format.is_active(kind);
            if doc.format_text(&block.id, kind, !active) {
                Patch::handled(doc.version()).with_changed(block.id.clone())
            } else {
                Patch::handled(doc.version())
            }
        }
        EditCommand::SlashCommand => {
            log::debug!("Slash command requested in block {}", block.id);
            Patch::pass_through(doc.version())
        }
    }
}

fn split(doc: &mut Document, block: &Block) -> Patch {
    let data = NewBlock::new(block.block_type.clone())
        .with_indent(block.indent)
        .with_callout_type(block.callout_type);
    let id = doc.insert_block(data, Some(&block.id));
    Patch::handled(doc.version())
        .with_changed(id.clone())
        .with_caret(id, 0)
}

fn clear_or_merge(doc: &mut Document, block: &Block) -> Patch {
    // Whitespace-only content counts as empty
    if !editable_text(block).trim().is_empty() {
        return Patch::pass_through(doc.version());
    }

    if doc.blocks().len() == 1 {
        let reset = BlockUpdate::default()
            .block_type(BlockType::Paragraph)
            .content("")
            .format(FormatState::new())
            .indent(0);
        doc.update_block(&block.id, reset);
        return Patch::handled(doc.version())
            .with_changed(block.id.clone())
            .with_caret(block.id.clone(), 0);
    }

    let Some(index) = doc.block_index(&block.id) else {
        return Patch::pass_through(doc.version());
    };
    // Caret moves to the end of the previous block, or the start of the next one
    // when the first block is removed
    let target = match index.checked_sub(1) {
        Some(previous) => {
            let previous = &doc.blocks()[previous];
            (previous.id.clone(), editable_len(previous))
        }
        None => (doc.blocks()[1].id.clone(), 0),
    };

    doc.delete_block(&block.id);
    Patch::handled(doc.version())
        .with_changed(block.id.clone())
        .with_caret(target.0, target.1)
}

fn tab(doc: &mut Document, block: &Block, forward: bool) -> Patch {
    match block.block_type.tab_policy() {
        TabPolicy::Indent => {
            let indent = if forward {
                block.indent.saturating_add(1)
            } else {
                block.indent.saturating_sub(1)
            };
            if doc.update_block(&block.id, BlockUpdate::default().indent(indent)) {
                Patch::handled(doc.version()).with_changed(block.id.clone())
            } else {
                Patch::handled(doc.version())
            }
        }
        TabPolicy::InsertTab if forward => {
            let range = match doc.selection() {
                Some(selection) if selection.block_id == block.id => selection.range(),
                _ => {
                    let end = char_len(&block.content);
                    end..end
                }
            };
            let start = range.start.min(range.end);
            let content = splice(&block.content, range, "\t");
            doc.update_block(&block.id, BlockUpdate::default().content(content));
            Patch::handled(doc.version())
                .with_changed(block.id.clone())
                .with_caret(block.id.clone(), start + 1)
        }
        TabPolicy::InsertTab | TabPolicy::Ignore => Patch::handled(doc.version()),
    }
}

/// Text the surface shows for `block`
fn editable_text(block: &Block) -> String {
    if block.block_type.applies_formatting() {
        formatting::plain_text(&block.content)
    } else {
        block.content.clone()
    }
}

/// Length of the text the surface shows for `block`, in chars
fn editable_len(block: &Block) -> usize {
    char_len(&editable_text(block))
}

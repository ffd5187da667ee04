use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use scribeflow_engine::editing::{
    Key, KeyEvent, Modifiers, RenderBlock, RenderKind, Snapshot, SurfaceResolver,
};
use scribeflow_engine::models::{BlockId, CalloutType, FormatKind, FormatState};

/// Screen placement of one visible block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRow {
    pub id: BlockId,
    pub row: u16,
    /// Column of the first editable character, after the block's prefix
    pub text_col: u16,
}

/// Where each visible block sits in the editor panel, one block per line
#[derive(Debug, Clone, Default)]
pub struct ScreenLayout {
    area: Rect,
    rows: Vec<BlockRow>,
}

impl ScreenLayout {
    /// Lay out `snapshot` inside `area`, starting at block index `scroll`
    pub fn compute(snapshot: &Snapshot, area: Rect, scroll: usize) -> Self {
        let rows = snapshot
            .blocks
            .iter()
            .skip(scroll)
            .take(area.height as usize)
            .zip(area.y..)
            .map(|(block, row)| BlockRow {
                id: block.id.clone(),
                row,
                text_col: area.x.saturating_add(prefix(block).chars().count() as u16),
            })
            .collect();
        Self { area, rows }
    }

    /// Screen cell of character `offset` in block `id`, if the block is visible
    pub fn position_of(&self, id: &BlockId, offset: usize) -> Option<Position> {
        let row = self.rows.iter().find(|r| &r.id == id)?;
        let last_col = self.area.right().saturating_sub(1);
        let x = row
            .text_col
            .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
            .min(last_col);
        Some(Position::new(x, row.row))
    }
}

impl SurfaceResolver for ScreenLayout {
    type Position = Position;

    fn contains(&self, position: &Position) -> bool {
        self.area.contains(*position)
    }

    fn resolve_block_for_position(&self, position: &Position) -> Option<BlockId> {
        // The prefix gutter is not part of any block's editable region
        self.rows
            .iter()
            .find(|r| r.row == position.y && position.x >= r.text_col)
            .map(|r| r.id.clone())
    }
}

/// Deepest list nesting drawn with its own indentation step
pub const MAX_VISUAL_DEPTH: usize = 8;

/// Non-editable marker drawn before a block's text
pub fn prefix(block: &RenderBlock) -> String {
    let indent = "  ".repeat(block.depth.min(MAX_VISUAL_DEPTH));
    match &block.kind {
        RenderKind::Paragraph => String::new(),
        RenderKind::Heading { level } => format!("{} ", "#".repeat(*level as usize)),
        RenderKind::ListItem { numbered: true } => {
            format!("{indent}{}. ", block.ordinal.unwrap_or(1))
        }
        RenderKind::ListItem { numbered: false } => format!("{indent}• "),
        RenderKind::CodeBlock => "│ ".to_string(),
        RenderKind::Quote => "▌ ".to_string(),
        RenderKind::Callout { callout_type } => match callout_type {
            CalloutType::Info => "ℹ ".to_string(),
            CalloutType::Warning => "⚠ ".to_string(),
            CalloutType::Error => "✖ ".to_string(),
        },
        RenderKind::Unsupported { .. } => "! ".to_string(),
    }
}

/// Base style of a block kind, before its format state is applied
pub fn kind_style(kind: &RenderKind) -> Style {
    match kind {
        RenderKind::Heading { .. } => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        RenderKind::CodeBlock => Style::default().fg(Color::Green).bg(Color::Black),
        RenderKind::Quote => Style::default().add_modifier(Modifier::ITALIC),
        RenderKind::Callout {
            callout_type: CalloutType::Info,
        } => Style::default().fg(Color::Blue),
        RenderKind::Callout {
            callout_type: CalloutType::Warning,
        } => Style::default().fg(Color::Yellow),
        RenderKind::Callout {
            callout_type: CalloutType::Error,
        } => Style::default().fg(Color::Red),
        RenderKind::Unsupported { .. } => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::DIM),
        RenderKind::Paragraph | RenderKind::ListItem { .. } => Style::default(),
    }
}

/// Terminal rendition of whole-block formatting
pub fn format_style(format: &FormatState) -> Style {
    let mut style = Style::default();
    if format.is_active(FormatKind::Bold) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if format.is_active(FormatKind::Italic) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if format.is_active(FormatKind::Underline) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if format.is_active(FormatKind::Code) {
        style = style.fg(Color::Magenta);
    }
    if let Some(color) = format
        .param(FormatKind::Color)
        .and_then(|c| c.parse::<Color>().ok())
    {
        style = style.fg(color);
    }
    if let Some(color) = format
        .param(FormatKind::Highlight)
        .and_then(|c| c.parse::<Color>().ok())
    {
        style = style.bg(color);
    }
    style
}

/// Translate a terminal key press into the editor's key event
pub fn to_key_event(key: &crossterm::event::KeyEvent) -> KeyEvent {
    let mut modifiers = Modifiers {
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        meta: key
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
    };
    let key = match key.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            modifiers.shift = true;
            Key::Tab
        }
        KeyCode::Char(c) if modifiers.command() => Key::Char(c.to_ascii_lowercase()),
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    };
    KeyEvent::new(key, modifiers)
}

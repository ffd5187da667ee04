mod surface;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use scribeflow_config::Config;
use scribeflow_engine::editing::{
    self, EditorSession, Key, PasteEvent, RawSelection, RenderBlock, text,
};
use scribeflow_engine::models::{BlockId, BlockType, CalloutType, DEFAULT_CONTENT, FormatKind};
use scribeflow_engine::{Document, FileStore};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};
use surface::ScreenLayout;

/// Placeholder target for links created from the selection menu
const LINK_URL: &str = "https://example.com";

/// Caret position: block index plus character offset, with an optional selection anchor
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    index: usize,
    offset: usize,
    anchor: Option<usize>,
}

impl Cursor {
    fn range(&self) -> (usize, usize) {
        let anchor = self.anchor.unwrap_or(self.offset);
        (anchor.min(self.offset), anchor.max(self.offset))
    }
}

/// Screen regions, derived from the terminal size
struct Panels {
    outline: Rect,
    editor: Rect,
    editor_inner: Rect,
    status: Rect,
    help: Rect,
}

impl Panels {
    fn split(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
            .split(area);
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
            .split(vertical[0]);
        let editor = horizontal[1];
        Self {
            outline: horizontal[0],
            editor,
            editor_inner: Block::default().borders(Borders::ALL).inner(editor),
            status: vertical[1],
            help: vertical[2],
        }
    }
}

struct App {
    session: EditorSession<ScreenLayout>,
    cursor: Cursor,
    scroll: usize,
    screen: Rect,
    status: String,
}

impl App {
    fn new(document: Document, screen: Rect) -> Self {
        let mut app = Self {
            session: EditorSession::new(document, ScreenLayout::default()),
            cursor: Cursor::default(),
            scroll: 0,
            screen,
            status: String::new(),
        };
        app.sync();
        app
    }

    fn current_id(&self) -> Option<BlockId> {
        self.session
            .document()
            .blocks()
            .get(self.cursor.index)
            .map(|b| b.id.clone())
    }

    /// Text the surface shows for the current block
    fn current_text(&self) -> Option<(BlockId, String, bool)> {
        let block = self.session.document().blocks().get(self.cursor.index)?;
        let editable = block.block_type.is_supported();
        Some((block.id.clone(), editing::render_block(block).text, editable))
    }

    fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('q') if ctrl => return false,
            KeyCode::Up => self.move_block(-1),
            KeyCode::Down => self.move_block(1),
            KeyCode::Left => self.move_offset(-1, shift),
            KeyCode::Right => self.move_offset(1, shift),
            KeyCode::Home => self.move_offset(isize::MIN, shift),
            KeyCode::End => self.move_offset(isize::MAX, shift),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::F(2) => self.cycle_block_type(),
            KeyCode::F(3) => self.cycle_callout_type(),
            KeyCode::F(4) => {
                self.session.insert_block_element(BlockType::Callout);
            }
            KeyCode::F(5) => self.apply_menu_format(FormatKind::Bold),
            KeyCode::F(6) => self.apply_menu_format(FormatKind::Italic),
            KeyCode::F(7) => self.apply_menu_format(FormatKind::Underline),
            KeyCode::F(8) => self.apply_menu_format(FormatKind::Code),
            KeyCode::Char('k') if ctrl => self.create_link(),
            _ => self.forward_key(&key),
        }

        self.sync();
        true
    }

    /// Let the editor core see the key first; fall back to plain text editing
    fn forward_key(&mut self, key: &crossterm::event::KeyEvent) {
        let Some(id) = self.current_id() else {
            return;
        };
        let event = surface::to_key_event(key);
        let patch = self.session.on_key_down_in_block(&id, &event);
        if patch.prevent_default {
            return;
        }

        match event.key {
            Key::Char(c) if !event.modifiers.command() && !event.modifiers.alt => {
                self.insert_text(&c.to_string());
            }
            Key::Backspace => self.delete_backward(),
            _ => {}
        }
    }

    fn paste(&mut self, clipboard: String) {
        let (start, end) = self.cursor.range();
        let Some(position) = self
            .current_id()
            .and_then(|id| self.session.resolver().position_of(&id, start))
        else {
            return;
        };
        let patch = self.session.on_paste(&PasteEvent {
            position,
            start_offset: start,
            end_offset: end,
            plain_text: Some(clipboard),
            html: None,
        });
        if !patch.prevent_default {
            self.status = "Nothing to paste into here".to_string();
        }
        self.sync();
    }

    fn resize(&mut self, screen: Rect) {
        self.screen = screen;
        self.sync();
    }

    fn insert_text(&mut self, inserted: &str) {
        let Some((id, current, true)) = self.current_text() else {
            return;
        };
        let (start, end) = self.cursor.range();
        let updated = text::splice(&current, start..end, inserted);
        self.session.on_content_change(&id, updated);
        self.cursor.offset = start + text::char_len(inserted);
        self.cursor.anchor = None;
    }

    fn delete_backward(&mut self) {
        let (start, end) = self.cursor.range();
        if start == end && start == 0 {
            return;
        }
        let from = if start == end { start - 1 } else { start };
        self.delete_range(from, end);
    }

    fn delete_forward(&mut self) {
        let (start, end) = self.cursor.range();
        let to = if start == end { end + 1 } else { end };
        self.delete_range(start, to);
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        let Some((id, current, true)) = self.current_text() else {
            return;
        };
        let end = end.min(text::char_len(&current));
        if start >= end {
            return;
        }
        self.session
            .on_content_change(&id, text::splice(&current, start..end, ""));
        self.cursor.offset = start;
        self.cursor.anchor = None;
    }

    fn move_block(&mut self, delta: isize) {
        let last = self.session.document().blocks().len().saturating_sub(1);
        self.cursor.index = self.cursor.index.saturating_add_signed(delta).min(last);
        self.cursor.anchor = None;
    }

    fn move_offset(&mut self, delta: isize, extend: bool) {
        if extend {
            self.cursor.anchor.get_or_insert(self.cursor.offset);
        } else {
            self.cursor.anchor = None;
        }
        self.cursor.offset = self.cursor.offset.saturating_add_signed(delta);
    }

    fn cycle_block_type(&mut self) {
        let Some(block) = self.session.document().blocks().get(self.cursor.index) else {
            return;
        };
        let position = BlockType::ALL
            .iter()
            .position(|t| *t == block.block_type)
            .unwrap_or(BlockType::ALL.len() - 1);
        let next = BlockType::ALL[(position + 1) % BlockType::ALL.len()].clone();
        self.session.change_block_type(next);
    }

    fn cycle_callout_type(&mut self) {
        let Some(current) = self
            .session
            .document()
            .blocks()
            .get(self.cursor.index)
            .and_then(|b| b.callout_type)
        else {
            self.status = "F3 only applies to callouts".to_string();
            return;
        };
        let next = match current {
            CalloutType::Info => CalloutType::Warning,
            CalloutType::Warning => CalloutType::Error,
            CalloutType::Error => CalloutType::Info,
        };
        self.session.set_callout_type(next);
    }

    fn apply_menu_format(&mut self, kind: FormatKind) {
        if !self.session.apply_format(kind) {
            self.status = "Select some text first".to_string();
        }
    }

    fn create_link(&mut self) {
        let Some((_, current, _)) = self.current_text() else {
            return;
        };
        let (start, end) = self.cursor.range();
        let label: String = current.chars().skip(start).take(end - start).collect();
        self.status = match self.session.create_link(LINK_URL, &label) {
            Some(_) => format!("Linked \"{label}\" to {LINK_URL}"),
            None => "Select some text first".to_string(),
        };
    }

    /// Re-layout, apply queued caret placements, then report the selection
    fn sync(&mut self) {
        self.relayout();

        for request in self.session.take_caret_requests() {
            if let Some(index) = self.session.document().block_index(&request.block_id) {
                self.cursor = Cursor {
                    index,
                    offset: request.offset,
                    anchor: None,
                };
            }
        }

        self.clamp_cursor();
        self.relayout();
        self.report_selection();
    }

    fn relayout(&mut self) {
        let area = Panels::split(self.screen).editor_inner;
        let visible = (area.height as usize).max(1);
        if self.cursor.index < self.scroll {
            self.scroll = self.cursor.index;
        } else if self.cursor.index >= self.scroll + visible {
            self.scroll = self.cursor.index + 1 - visible;
        }
        let snapshot = self.session.snapshot();
        *self.session.resolver_mut() = ScreenLayout::compute(&snapshot, area, self.scroll);
    }

    fn clamp_cursor(&mut self) {
        let blocks = self.session.document().blocks();
        self.cursor.index = self.cursor.index.min(blocks.len().saturating_sub(1));
        let len = self
            .current_text()
            .map(|(_, current, _)| text::char_len(&current))
            .unwrap_or(0);
        self.cursor.offset = self.cursor.offset.min(len);
        if let Some(anchor) = self.cursor.anchor {
            self.cursor.anchor = Some(anchor.min(len));
        }
    }

    fn report_selection(&mut self) {
        let (start, end) = self.cursor.range();
        let raw = self.current_id().and_then(|id| {
            let anchor = self.session.resolver().position_of(&id, start)?;
            Some(RawSelection {
                anchor,
                start_offset: start,
                end_offset: end,
                bounds: Some(editing::Rect {
                    top: f32::from(anchor.y),
                    left: f32::from(anchor.x),
                    width: (end - start) as f32,
                    height: 1.0,
                }),
            })
        });
        self.session.on_selection_change(raw.as_ref());
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let Some(log_path) = &config.log_path else {
        return Ok(());
    };
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    // Determine snapshot path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let mut config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", config_path.display());
            process::exit(1);
        }
    };

    match args.len() {
        1 => {}
        2 => config.snapshot_path = PathBuf::from(&args[1]),
        _ => {
            eprintln!("Usage: {} [snapshot-path]", args[0]);
            process::exit(1);
        }
    }

    init_logging(&config)?;
    log::info!(
        "scribeflow starting with snapshot {}",
        config.snapshot_path.display()
    );

    let default_content = config.default_content.as_deref().unwrap_or(DEFAULT_CONTENT);
    let document = Document::open(
        Box::new(FileStore::new(&config.snapshot_path)),
        default_content,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(document, Rect::new(0, 0, size.width, size.height));

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("Editor loop failed: {err:?}");
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if !app.handle_key(key) {
                    return Ok(());
                }
            }
            Event::Paste(clipboard) => app.paste(clipboard),
            Event::Resize(width, height) => app.resize(Rect::new(0, 0, width, height)),
            _ => {}
        }
    }
}

fn block_line(app: &App, block: &RenderBlock) -> Line<'static> {
    let kind_style = surface::kind_style(&block.kind);
    let mut spans = vec![Span::styled(
        surface::prefix(block),
        kind_style.add_modifier(Modifier::DIM),
    )];

    if block.text.is_empty() {
        spans.push(Span::styled(
            block.placeholder,
            Style::default().fg(Color::DarkGray),
        ));
        return Line::from(spans);
    }

    let style = match app.session.document().block(&block.id) {
        Some(model) if model.block_type.applies_formatting() => {
            kind_style.patch(surface::format_style(&model.format))
        }
        _ => kind_style,
    };

    let (start, end) = app.cursor.range();
    let selected = app.current_id().as_ref() == Some(&block.id) && start != end;
    if !selected {
        spans.push(Span::styled(block.text.clone(), style));
        return Line::from(spans);
    }

    let chars: Vec<char> = block.text.chars().collect();
    let end = end.min(chars.len());
    let start = start.min(end);
    spans.push(Span::styled(chars[..start].iter().collect::<String>(), style));
    spans.push(Span::styled(
        chars[start..end].iter().collect::<String>(),
        style.add_modifier(Modifier::REVERSED),
    ));
    spans.push(Span::styled(chars[end..].iter().collect::<String>(), style));
    Line::from(spans)
}

fn ui(f: &mut Frame, app: &App) {
    let panels = Panels::split(f.area());
    let snapshot = app.session.snapshot();

    // Block outline panel
    let outline_items: Vec<ListItem> = snapshot
        .blocks
        .iter()
        .map(|block| {
            let label = app
                .session
                .document()
                .block(&block.id)
                .map(|b| b.block_type.label())
                .unwrap_or("Paragraph");
            let links = if block.links.is_empty() {
                String::new()
            } else {
                format!(" ({} link)", block.links.len())
            };
            ListItem::new(Line::from(format!("{label}{links}")))
        })
        .collect();
    let outline = List::new(outline_items)
        .block(Block::default().borders(Borders::ALL).title("Blocks"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    let mut outline_state = ListState::default().with_selected(Some(app.cursor.index));
    f.render_stateful_widget(outline, panels.outline, &mut outline_state);

    // Editor panel
    let visible = panels.editor_inner.height as usize;
    let lines: Vec<Line> = snapshot
        .blocks
        .iter()
        .skip(app.scroll)
        .take(visible)
        .map(|block| block_line(app, block))
        .collect();
    let editor = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Document v{}", snapshot.version)),
    );
    f.render_widget(editor, panels.editor);

    if let Some(position) = app
        .current_id()
        .and_then(|id| app.session.resolver().position_of(&id, app.cursor.offset))
    {
        f.set_cursor_position(position);
    }

    // Status line: toolbar state, or the selection menu while text is selected
    let formats: Vec<&str> = [
        (FormatKind::Bold, "B"),
        (FormatKind::Italic, "I"),
        (FormatKind::Underline, "U"),
        (FormatKind::Code, "C"),
    ]
    .into_iter()
    .filter(|(kind, _)| app.session.is_format_active(*kind))
    .map(|(_, label)| label)
    .collect();
    let mut status = vec![
        Span::styled(
            format!(" {} ", app.session.block_type_label()),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw(format!(" [{}] ", formats.join(""))),
    ];
    if app.session.tracker_state().menu().is_some() {
        status.push(Span::styled(
            "F5 bold  F6 italic  F7 underline  F8 code  ^K link ",
            Style::default().bg(Color::White).fg(Color::Black),
        ));
    }
    status.push(Span::raw(app.status.clone()));
    f.render_widget(Paragraph::new(Line::from(status)), panels.status);

    let help_text = Line::from(vec![
        Span::raw("Esc/^Q: Quit | "),
        Span::raw("^B/^I/^U/^E: Format | "),
        Span::raw("Tab/S-Tab: Indent | "),
        Span::raw("F2: Block type | F3: Callout type | F4: Insert callout"),
    ]);
    f.render_widget(Paragraph::new(help_text), panels.help);
}

use std::{
    cell::Cell,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Modifier,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::{info, warn};
use unicode_width::UnicodeWidthStr;

use pagecraft::config::EditorConfig;
use pagecraft::editor::{EditorProps, Movement, RichTextEditor};
use pagecraft::import::{self, DocumentFormat};
use pagecraft::logging;
use pagecraft::render::{self, RenderResult};
use pagecraft::theme::Theme;
use pagecraft::toolbar::{self, TOOLBAR, ToolbarItem};
use pagecraft::{CommandName, Mode, Selection};

const MOUSE_SCROLL_LINES: usize = 3;

/// Terminal editor for CMS page content.
#[derive(Debug, Parser)]
#[command(name = "pagecraft", version, about)]
struct Cli {
    /// Configuration file; defaults to `~/.config/pagecraft/config.toml`.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Document to edit (.html, .ftml or .md).
    file: PathBuf,
}

fn main() -> Result<()> {
    run()
}

/// Returns the wrap width and the left padding for a text area `width`
/// columns wide.
fn editor_wrap_configuration(width: usize, max_wrap_width: usize) -> (usize, usize) {
    if width == 0 {
        return (1, 0);
    }
    if width < 60 {
        let wrap_width = width.saturating_sub(1).max(1);
        return (wrap_width, 0);
    }
    if width < max_wrap_width {
        let padding = 2.min(width / 2);
        let wrap_width = width.saturating_sub(padding.saturating_mul(2)).max(1);
        return (wrap_width, padding);
    }
    let mut left_padding = width.saturating_sub(max_wrap_width) / 2 + 4;
    let max_padding = width.saturating_sub(1) / 2;
    if left_padding > max_padding {
        left_padding = max_padding;
    }
    let wrap_width = width.saturating_sub(left_padding.saturating_mul(2)).max(1);
    (wrap_width, left_padding)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = EditorConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let _logging = logging::init(&config.log_dir());

    let (content, format, initial_status) = load_document(&cli.file)?;
    info!(path = %cli.file.display(), %format, "document opened");
    let mut app = App::new(content, cli.file, format, initial_status, config);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = &res {
        warn!(error = %err, "editor stopped with an error");
    }
    res
}

/// Reads `path` into editor HTML. Unparsable files open empty with a status
/// message instead of failing.
fn load_document(path: &Path) -> Result<(String, DocumentFormat, Option<String>)> {
    let format = DocumentFormat::from_path(path);
    if !path.exists() {
        return Ok((String::new(), format, Some("New document".to_string())));
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    match import::import(&content, format) {
        Ok(html) => Ok((html, format, None)),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "import failed");
            let message = format!("{err}. Starting with empty document.");
            Ok((String::new(), format, Some(message)))
        }
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit() {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt)?;
            needs_redraw = true;
        }

        if last_tick.elapsed() >= tick_rate {
            let had_message_before = app.has_status_message();
            app.on_tick();
            last_tick = Instant::now();
            if had_message_before && !app.has_status_message() {
                needs_redraw = true;
            }
        }
    }

    Ok(())
}

#[derive(Clone, Copy)]
struct MenuItem {
    item: &'static ToolbarItem,
    enabled: bool,
    active: bool,
}

enum MenuEntry {
    Section(&'static str),
    Separator,
    Item(MenuItem),
}

/// Toolbar items grouped for the format menu.
fn format_menu_entries(editor: &RichTextEditor) -> Vec<MenuEntry> {
    let snapshot = editor.snapshot();
    let sections: [(&'static str, fn(CommandName) -> bool); 4] = [
        ("Text", |name| name.inline_format().is_some()),
        ("Paragraph", |name| {
            matches!(
                name,
                CommandName::JustifyLeft
                    | CommandName::JustifyCenter
                    | CommandName::JustifyRight
                    | CommandName::InsertUnorderedList
                    | CommandName::InsertOrderedList
                    | CommandName::FormatBlock
            )
        }),
        ("Insert", |name| name.prompt().is_some()),
        ("History", |name| {
            matches!(name, CommandName::Undo | CommandName::Redo)
        }),
    ];

    let mut entries = Vec::new();
    for (idx, (title, belongs)) in sections.iter().enumerate() {
        if idx > 0 {
            entries.push(MenuEntry::Separator);
        }
        entries.push(MenuEntry::Section(*title));
        for item in TOOLBAR.iter().filter(|item| belongs(item.command)) {
            entries.push(MenuEntry::Item(MenuItem {
                item,
                enabled: item.is_enabled(snapshot),
                active: item.is_active(snapshot),
            }));
        }
    }
    entries
}

fn menu_label(item: &ToolbarItem) -> String {
    match item.argument {
        Some(argument) => format!("{} {}", item.command.as_str(), argument),
        None => item.command.as_str().to_string(),
    }
}

struct FormatMenuState {
    entries: Vec<MenuEntry>,
    selected_index: usize,
}

impl FormatMenuState {
    fn new(entries: Vec<MenuEntry>) -> Self {
        let selected_index = entries
            .iter()
            .enumerate()
            .find(|(_, entry)| matches!(entry, MenuEntry::Item(item) if item.enabled))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        Self {
            entries,
            selected_index,
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.entries.is_empty() {
            return;
        }

        let len = self.entries.len() as i32;
        let mut idx = self.selected_index as i32;

        for _ in 0..len {
            idx = (idx + delta).rem_euclid(len);
            if matches!(self.entries[idx as usize], MenuEntry::Item(_)) {
                self.selected_index = idx as usize;
                break;
            }
        }
    }

    fn current_item(&self) -> Option<&'static ToolbarItem> {
        match self.entries.get(self.selected_index) {
            Some(MenuEntry::Item(entry)) if entry.enabled => Some(entry.item),
            _ => None,
        }
    }

    /// Plain keys pick items by their shortcut letter.
    fn shortcut_item(&mut self, key: char, shift: bool) -> Option<&'static ToolbarItem> {
        for (idx, entry) in self.entries.iter().enumerate() {
            if let MenuEntry::Item(entry) = entry
                && let Some(shortcut) = entry.item.shortcut
                && shortcut.matches(key, shift)
            {
                self.selected_index = idx;
                return entry.enabled.then_some(entry.item);
            }
        }
        None
    }
}

fn is_format_menu_shortcut(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc => modifiers.is_empty(),
        KeyCode::Char(' ') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

struct App {
    editor: RichTextEditor,
    theme: Theme,
    config: EditorConfig,
    file_path: PathBuf,
    document_format: DocumentFormat,
    dirty: Rc<Cell<bool>>,
    scroll_top: usize,
    follow_cursor: bool,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
    format_menu: Option<FormatMenuState>,
    preferred_column: Option<u16>,
    last_render: Option<RenderResult>,
    last_text_area: Rect,
}

impl App {
    fn new(
        content: String,
        path: PathBuf,
        format: DocumentFormat,
        initial_status: Option<String>,
        config: EditorConfig,
    ) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let changed = Rc::clone(&dirty);
        let props = EditorProps::new(content, move |_: &str| changed.set(true))
            .with_placeholder(config.placeholder.clone())
            .with_height(config.height);
        let mut editor = RichTextEditor::new(props);
        editor.set_history_limit(config.history_limit);

        Self {
            editor,
            theme: Theme::default(),
            config,
            file_path: path,
            document_format: format,
            dirty,
            scroll_top: 0,
            follow_cursor: true,
            should_quit: false,
            status_message: initial_status.map(|msg| (msg, Instant::now())),
            format_menu: None,
            preferred_column: None,
            last_render: None,
            last_text_area: Rect::default(),
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn has_status_message(&self) -> bool {
        self.status_message.is_some()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height < 3 || area.width == 0 {
            return;
        }

        let editor_height = self.editor.height().min(area.height.saturating_sub(2)).max(1);
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(editor_height),
                Constraint::Length(1),
            ])
            .split(area);

        let toolbar_area = vertical[0];
        let editor_area = vertical[1];
        let status_area = vertical[2];

        frame.render_widget(Paragraph::new(self.toolbar_line()), toolbar_area);

        let width = editor_area.width.max(1) as usize;
        let (wrap_width, left_padding) =
            editor_wrap_configuration(width, usize::from(self.config.max_wrap_width));
        let text_area = Rect::new(
            editor_area.x + left_padding as u16,
            editor_area.y,
            (wrap_width as u16).min(editor_area.width.saturating_sub(left_padding as u16)).max(1),
            editor_area.height,
        );

        let render = self.render(wrap_width);
        let viewport_height = text_area.height as usize;
        self.adjust_scroll(&render, viewport_height);

        let paragraph = Paragraph::new(Text::from(render.lines.clone()))
            .block(Block::default().borders(Borders::NONE))
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, text_area);

        if self.editor.prompt().is_none()
            && self.format_menu.is_none()
            && let Some(cursor) = render.cursor
            && cursor.line >= self.scroll_top
            && cursor.line < self.scroll_top + viewport_height
        {
            let cursor_y = text_area.y + (cursor.line - self.scroll_top) as u16;
            let cursor_x = text_area.x + cursor.column.min(text_area.width - 1);
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }

        let status_line = self.status_line(status_area.width as usize);
        let status_widget = Paragraph::new(status_line).style(self.theme.status_bar_style());
        frame.render_widget(status_widget, status_area);

        if self.format_menu.is_some() {
            self.render_format_menu(frame, area);
        }
        if self.editor.prompt().is_some() {
            self.render_prompt(frame, area);
        }

        self.last_render = Some(render);
        self.last_text_area = text_area;
    }

    fn render(&self, wrap_width: usize) -> RenderResult {
        match (self.editor.mode(), self.editor.surface()) {
            (Mode::Editing, Some(surface)) if !self.editor.shows_placeholder() => {
                render::render_surface(surface, wrap_width, &self.theme)
            }
            (Mode::Editing, _) => {
                render::render_placeholder(self.editor.placeholder(), true, &self.theme)
            }
            (Mode::Preview, _) if self.editor.shows_placeholder() => {
                render::render_placeholder(self.editor.placeholder(), false, &self.theme)
            }
            (Mode::Preview, _) => render::render_preview(self.editor.value(), wrap_width, &self.theme),
        }
    }

    fn toolbar_line(&self) -> Line<'static> {
        let snapshot = self.editor.snapshot();
        let mut spans = Vec::with_capacity(TOOLBAR.len() * 2 + 2);
        for item in TOOLBAR {
            let style = if !item.is_enabled(snapshot) {
                self.theme.toolbar_disabled_style()
            } else if item.is_active(snapshot) {
                self.theme.toolbar_active_style()
            } else {
                self.theme.toolbar_style()
            };
            spans.push(Span::styled(format!(" {} ", item.label), style));
            spans.push(Span::styled(" ", self.theme.toolbar_style()));
        }
        let toggle = format!(" F2:{} ", self.editor.mode().toggled());
        spans.push(Span::styled(toggle, self.theme.toolbar_active_style()));
        Line::from(spans)
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect) {
        let Some(prompt) = self.editor.prompt() else {
            return;
        };
        let width = 60.min(area.width);
        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(3)) / 2,
            width,
            3.min(area.height),
        );
        frame.render_widget(Clear, popup_area);

        let content = if prompt.input().is_empty() {
            Span::styled(prompt.kind().placeholder(), self.theme.placeholder_style())
        } else {
            Span::raw(prompt.input().to_string())
        };
        let widget = Paragraph::new(Line::from(content)).style(self.theme.menu_style()).block(
            Block::default()
                .title(prompt.title())
                .borders(Borders::ALL)
                .style(self.theme.menu_style()),
        );
        frame.render_widget(widget, popup_area);

        let before: String = prompt.input().chars().take(prompt.cursor()).collect();
        let column = (before.width() as u16).min(popup_area.width.saturating_sub(3));
        frame.set_cursor_position(Position::new(popup_area.x + 1 + column, popup_area.y + 1));
    }

    fn render_format_menu(&self, frame: &mut Frame, area: Rect) {
        let Some(menu) = &self.format_menu else {
            return;
        };

        if area.width < 3 || area.height < 3 {
            return;
        }

        let mut max_label_width = 0usize;
        let mut max_shortcut_width = 0usize;
        for entry in &menu.entries {
            match entry {
                MenuEntry::Item(entry) => {
                    max_label_width = max_label_width.max(menu_label(entry.item).width());
                    if let Some(shortcut) = entry.item.shortcut {
                        max_shortcut_width = max_shortcut_width.max(shortcut.label().width());
                    }
                }
                MenuEntry::Section(title) => {
                    max_label_width = max_label_width.max(title.width());
                }
                MenuEntry::Separator => {}
            }
        }

        // Two columns for the active marker, two between label and shortcut.
        let content_width = (max_label_width + max_shortcut_width + 4) as u16;
        let min_width = 10.min(area.width);
        let width = (content_width + 4).min(area.width).max(min_width);
        let desired_height = (menu.entries.len() as u16 + 2).min(area.height);
        let height = desired_height.max(3.min(area.height));

        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup_area);

        let separator_width = popup_area.width.saturating_sub(4).max(4) as usize;
        let popup_style = self.theme.menu_style();

        let mut items = Vec::new();
        for entry in &menu.entries {
            match entry {
                MenuEntry::Section(title) => {
                    items.push(ListItem::new(Line::from(Span::styled(
                        *title,
                        popup_style.add_modifier(Modifier::BOLD),
                    ))));
                }
                MenuEntry::Separator => {
                    let line = "─".repeat(separator_width);
                    items.push(ListItem::new(Line::from(Span::styled(
                        line,
                        self.theme.menu_disabled_style(),
                    ))));
                }
                MenuEntry::Item(entry) => {
                    let marker = if entry.active { "✓ " } else { "  " };
                    let shortcut = entry
                        .item
                        .shortcut
                        .map(|shortcut| shortcut.label())
                        .unwrap_or_default();
                    let label = menu_label(entry.item);
                    let padding = max_label_width.saturating_sub(label.width()) + 2;
                    let content = format!("{marker}{label}{}{shortcut}", " ".repeat(padding));
                    let style = if entry.enabled {
                        popup_style
                    } else {
                        self.theme.menu_disabled_style()
                    };
                    items.push(ListItem::new(Line::from(Span::styled(content, style))));
                }
            }
        }

        let mut state = ListState::default();
        state.select(Some(menu.selected_index));

        let list = List::new(items)
            .highlight_style(self.theme.menu_selected_style())
            .style(popup_style)
            .block(
                Block::default()
                    .title("Format")
                    .borders(Borders::ALL)
                    .style(popup_style)
                    .border_style(self.theme.menu_disabled_style()),
            );

        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn open_format_menu(&mut self) {
        if self.editor.mode() == Mode::Preview {
            self.set_status("Formatting is unavailable in preview");
            return;
        }
        self.format_menu = Some(FormatMenuState::new(format_menu_entries(&self.editor)));
    }

    fn close_format_menu(&mut self) {
        self.format_menu = None;
    }

    fn handle_format_menu_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let Some(menu) = self.format_menu.as_mut() else {
            return false;
        };

        match code {
            KeyCode::Esc => self.close_format_menu(),
            KeyCode::Char(' ') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.close_format_menu();
            }
            KeyCode::Up => menu.move_selection(-1),
            KeyCode::Down => menu.move_selection(1),
            KeyCode::Enter => {
                if let Some(item) = menu.current_item() {
                    self.close_format_menu();
                    self.run_toolbar_item(item);
                }
            }
            KeyCode::Char(ch) => {
                let shift = modifiers.contains(KeyModifiers::SHIFT) || ch.is_ascii_uppercase();
                if let Some(item) = menu.shortcut_item(ch, shift) {
                    self.close_format_menu();
                    self.run_toolbar_item(item);
                }
            }
            _ => {}
        }
        true
    }

    fn run_toolbar_item(&mut self, item: &ToolbarItem) {
        self.editor.toolbar_action(item);
        self.after_edit();
    }

    fn handle_prompt_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.editor.prompt().is_none() {
            return false;
        }
        match code {
            KeyCode::Esc => self.editor.cancel_prompt(),
            KeyCode::Enter => {
                if self.editor.submit_prompt().is_none() {
                    self.set_status("Nothing entered");
                }
                self.after_edit();
            }
            _ => {
                let Some(prompt) = self.editor.prompt_mut() else {
                    return true;
                };
                match code {
                    KeyCode::Backspace => prompt.backspace(),
                    KeyCode::Delete => prompt.delete(),
                    KeyCode::Left => prompt.move_left(),
                    KeyCode::Right => prompt.move_right(),
                    KeyCode::Home => prompt.move_home(),
                    KeyCode::End => prompt.move_end(),
                    KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                        prompt.insert_char(ch)
                    }
                    _ => {}
                }
            }
        }
        true
    }

    fn status_line(&mut self, terminal_width: usize) -> Line<'static> {
        self.prune_status_message();

        let mode = format!(" {} ", self.editor.mode().label());

        if let Some((message, _)) = &self.status_message {
            return Line::from(vec![Span::raw(mode), Span::raw(message.clone())]);
        }

        let filename = self.file_path.display().to_string();
        let marker = if self.dirty.get() { "*" } else { "" };
        let formats = self.editor.snapshot().active_formats().join("+");

        let all_shortcuts = vec!["^Space:Format", "F2:Preview", "^S:Save", "^Q:Quit"];

        let mut spans = vec![Span::raw(mode)];
        spans.push(Span::styled(
            format!("{}{}", filename, marker),
            self.theme.filename_style(),
        ));
        if !formats.is_empty() {
            spans.push(Span::raw(format!(" [{formats}]")));
        }
        spans.push(Span::raw(format!(
            ", {} characters",
            self.editor.character_count()
        )));

        let left_width: usize = spans.iter().map(|span| span.content.width()).sum();

        let min_padding = 1;
        let mut shortcuts_to_show = Vec::new();
        let mut shortcuts_width = 0;

        // Most important shortcuts are kept when space runs out.
        for shortcut in all_shortcuts.iter().rev() {
            let test_width = if shortcuts_to_show.is_empty() {
                shortcut.chars().count()
            } else {
                shortcuts_width + 1 + shortcut.chars().count()
            };

            if left_width + min_padding + test_width <= terminal_width {
                shortcuts_to_show.insert(0, *shortcut);
                shortcuts_width = test_width;
            } else {
                break;
            }
        }

        if !shortcuts_to_show.is_empty() {
            let padding_needed = terminal_width
                .saturating_sub(left_width)
                .saturating_sub(shortcuts_width)
                .max(min_padding);
            spans.push(Span::raw(" ".repeat(padding_needed)));
            spans.push(Span::raw(shortcuts_to_show.join(" ")));
        }

        Line::from(spans)
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > self.config.status_timeout()
        {
            self.status_message = None;
        }
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render
            .total_lines
            .saturating_sub(viewport)
            .min(render.total_lines);
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
        if self.follow_cursor
            && let Some(cursor) = render.cursor
        {
            self.scroll_top = self.scroll_top_for_cursor(cursor.line, viewport, max_scroll);
        }
    }

    fn scroll_top_for_cursor(
        &self,
        cursor_line: usize,
        viewport: usize,
        max_scroll: usize,
    ) -> usize {
        let mut scroll = self.scroll_top.min(max_scroll);
        if viewport == 0 {
            return scroll;
        }

        let margin = if viewport >= 3 { 1 } else { 0 };
        if margin == 0 {
            if cursor_line < scroll {
                scroll = cursor_line;
            } else if cursor_line >= scroll.saturating_add(viewport) {
                let offset = viewport.saturating_sub(1);
                scroll = cursor_line.saturating_sub(offset);
            }
        } else {
            let top_limit = scroll.saturating_add(margin);
            let bottom_offset = viewport.saturating_sub(1).saturating_sub(margin);
            let bottom_limit = scroll.saturating_add(bottom_offset);
            if cursor_line < top_limit {
                scroll = cursor_line.saturating_sub(margin);
            } else if cursor_line > bottom_limit {
                scroll = cursor_line.saturating_sub(bottom_offset);
            }
        }

        scroll.min(max_scroll)
    }

    fn scroll_by_lines(&mut self, delta: isize) {
        self.follow_cursor = false;
        let total = self
            .last_render
            .as_ref()
            .map(|render| render.total_lines)
            .unwrap_or(0);
        let max_scroll = total.saturating_sub(self.last_text_area.height as usize);
        self.scroll_top = self
            .scroll_top
            .saturating_add_signed(delta)
            .min(max_scroll);
    }

    /// Called after anything that may have moved the caret or changed the
    /// document.
    fn after_edit(&mut self) {
        self.follow_cursor = true;
    }

    fn move_caret(&mut self, movement: Movement, extend: bool) {
        self.editor.move_caret(movement, extend);
        self.preferred_column = None;
        self.after_edit();
    }

    /// Moves the caret to the nearest position `delta` rendered lines away,
    /// skipping lines without any positions.
    fn move_vertically(&mut self, delta: isize, extend: bool) {
        let (Some(render), Some(surface)) = (self.last_render.as_ref(), self.editor.surface())
        else {
            return;
        };
        let Some(cursor) = render.cursor else {
            return;
        };
        let column = *self.preferred_column.get_or_insert(cursor.column);
        let mut line = cursor.line;
        let target = loop {
            let Some(next) = line.checked_add_signed(delta) else {
                break None;
            };
            if next >= render.total_lines {
                break None;
            }
            line = next;
            if let Some(position) = render.position_at(line, column) {
                break Some(position);
            }
        };
        let Some(target) = target else {
            return;
        };
        let anchor = if extend {
            surface.selection().anchor
        } else {
            target
        };
        self.editor.set_selection(Selection::new(anchor, target));
        self.after_edit();
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_by_lines(-(MOUSE_SCROLL_LINES as isize)),
            MouseEventKind::ScrollDown => self.scroll_by_lines(MOUSE_SCROLL_LINES as isize),
            MouseEventKind::Down(MouseButton::Left) => {
                let area = self.last_text_area;
                if event.row < area.y || event.row >= area.y + area.height {
                    return;
                }
                let line = self.scroll_top + (event.row - area.y) as usize;
                let column = event.column.saturating_sub(area.x);
                let position = self
                    .last_render
                    .as_ref()
                    .and_then(|render| render.position_at(line, column));
                if let Some(position) = position {
                    self.editor.set_selection(Selection::caret(position));
                    self.preferred_column = None;
                }
            }
            _ => {}
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code, modifiers)?,
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            Event::Paste(text) => {
                if let Some(prompt) = self.editor.prompt_mut() {
                    prompt.insert_str(&text);
                } else if self.editor.insert_text(&text) {
                    self.after_edit();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        if self.handle_prompt_key(code, modifiers) || self.handle_format_menu_key(code, modifiers)
        {
            return Ok(());
        }

        if is_format_menu_shortcut(code, modifiers) {
            self.open_format_menu();
            return Ok(());
        }

        let control = modifiers.contains(KeyModifiers::CONTROL);
        let shift = modifiers.contains(KeyModifiers::SHIFT);

        match code {
            KeyCode::Char('q') | KeyCode::Char('c') if control => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('s') if control => {
                self.save()?;
                return Ok(());
            }
            KeyCode::F(2) => {
                self.editor.toggle_mode();
                self.preferred_column = None;
                self.scroll_top = 0;
                self.set_status(format!("{} mode", self.editor.mode().label()));
                return Ok(());
            }
            KeyCode::PageUp => {
                let page = self.last_text_area.height.max(1) as isize;
                self.scroll_by_lines(-page);
                return Ok(());
            }
            KeyCode::PageDown => {
                let page = self.last_text_area.height.max(1) as isize;
                self.scroll_by_lines(page);
                return Ok(());
            }
            _ => {}
        }

        if self.editor.mode() == Mode::Preview {
            match code {
                KeyCode::Up => self.scroll_by_lines(-1),
                KeyCode::Down => self.scroll_by_lines(1),
                _ => {}
            }
            return Ok(());
        }

        match code {
            KeyCode::Char('a') if control => {
                self.editor.select_all();
                self.after_edit();
            }
            KeyCode::Char(ch) if control => {
                if let Some(item) = toolbar::find_by_shortcut(ch, shift) {
                    self.run_toolbar_item(item);
                }
            }
            KeyCode::Left if control => self.move_caret(Movement::WordLeft, shift),
            KeyCode::Right if control => self.move_caret(Movement::WordRight, shift),
            KeyCode::Left => self.move_caret(Movement::Left, shift),
            KeyCode::Right => self.move_caret(Movement::Right, shift),
            KeyCode::Home if control => self.move_caret(Movement::DocumentStart, shift),
            KeyCode::End if control => self.move_caret(Movement::DocumentEnd, shift),
            KeyCode::Home => self.move_caret(Movement::LineStart, shift),
            KeyCode::End => self.move_caret(Movement::LineEnd, shift),
            KeyCode::Up => self.move_vertically(-1, shift),
            KeyCode::Down => self.move_vertically(1, shift),
            KeyCode::Enter => {
                if shift {
                    self.editor.insert_line_break();
                } else {
                    self.editor.insert_paragraph();
                }
                self.preferred_column = None;
                self.after_edit();
            }
            KeyCode::Backspace => {
                self.editor.delete_backward();
                self.preferred_column = None;
                self.after_edit();
            }
            KeyCode::Delete => {
                self.editor.delete_forward();
                self.preferred_column = None;
                self.after_edit();
            }
            KeyCode::Tab => {
                self.editor.insert_text("\t");
                self.after_edit();
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::ALT) => {
                self.editor.insert_text(ch.encode_utf8(&mut [0; 4]));
                self.preferred_column = None;
                self.after_edit();
            }
            _ => {}
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        self.prune_status_message();
    }

    fn save(&mut self) -> Result<()> {
        let contents = match import::export(self.editor.value(), self.document_format) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(error = %err, "export failed");
                self.set_status(format!("Not saved: {err}"));
                return Ok(());
            }
        };
        fs::write(&self.file_path, contents)
            .with_context(|| format!("failed to write {}", self.file_path.display()))?;

        info!(path = %self.file_path.display(), format = %self.document_format, "document saved");
        self.dirty.set(false);
        self.set_status("Saved");
        Ok(())
    }
}

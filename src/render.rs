use std::collections::HashSet;
use std::str::FromStr;

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::command::{Alignment, InlineFormat, ListKind};
use crate::html::{self, Element, Node};
use crate::selection::Selection;
use crate::surface::{
    EditingSurface, Layout, Mark, RunKind, effective_alignment, element_chain, runs_in,
};
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
    /// Where each caret position ended up, in document order.
    pub positions: Vec<(usize, CursorVisualPosition)>,
}

impl RenderResult {
    pub fn visual_of(&self, position: usize) -> Option<CursorVisualPosition> {
        self.positions
            .iter()
            .find(|(candidate, _)| *candidate == position)
            .map(|(_, visual)| *visual)
    }

    /// The caret position drawn closest to `column` on `line`.
    pub fn position_at(&self, line: usize, column: u16) -> Option<usize> {
        self.positions
            .iter()
            .filter(|(_, visual)| visual.line == line)
            .min_by_key(|(_, visual)| visual.column.abs_diff(column))
            .map(|(position, _)| *position)
    }
}

/// Renders the live surface with its caret and selection.
pub fn render_surface(surface: &EditingSurface, width: usize, theme: &Theme) -> RenderResult {
    let mut renderer = Renderer::new(width.max(1), Some(surface.selection()), theme);
    renderer.render_root(surface.root());
    renderer.finish()
}

/// Renders `content` read-only, exactly as given.
pub fn render_preview(content: &str, width: usize, theme: &Theme) -> RenderResult {
    let root = html::parse(content);
    let mut renderer = Renderer::new(width.max(1), None, theme);
    renderer.render_root(&root);
    renderer.finish()
}

/// Stands in for an empty document.
pub fn render_placeholder(placeholder: &str, show_cursor: bool, theme: &Theme) -> RenderResult {
    let origin = CursorVisualPosition { line: 0, column: 0 };
    RenderResult {
        lines: vec![Line::from(vec![Span::styled(
            placeholder.to_string(),
            theme.placeholder_style(),
        )])],
        cursor: show_cursor.then_some(origin),
        total_lines: 1,
        positions: vec![(0, origin)],
    }
}

struct Renderer<'a> {
    wrap_width: usize,
    selection: Option<Selection>,
    theme: &'a Theme,
    cursor: Option<CursorVisualPosition>,
    positions: Vec<(usize, CursorVisualPosition)>,
    lines: Vec<Line<'static>>,
    current_line_index: usize,
    marked_items: HashSet<Vec<usize>>,
}

impl<'a> Renderer<'a> {
    fn new(wrap_width: usize, selection: Option<Selection>, theme: &'a Theme) -> Self {
        Self {
            wrap_width,
            selection,
            theme,
            cursor: None,
            positions: Vec::new(),
            lines: Vec::new(),
            current_line_index: 0,
            marked_items: HashSet::new(),
        }
    }

    fn render_root(&mut self, root: &Element) {
        let layout = Layout::compute(root);
        for (idx, container) in layout.containers.iter().enumerate() {
            if idx > 0 {
                self.push_blank_line();
            }
            let chain = element_chain(root, &container.parent);
            let block = self.block_context(&chain, &container.parent);

            let mut fragments = Vec::new();
            let mut position = layout.start_of(idx);
            for run in runs_in(root, container) {
                let style = marks_style(block.base_style(), &run.marks, self.theme);
                match &run.kind {
                    RunKind::Text(text) => {
                        let text = if block.preformatted {
                            text.clone()
                        } else {
                            collapse_line_breaks(text)
                        };
                        self.tokenize_selected(&text, style, position, &mut fragments);
                    }
                    RunKind::Atom(node) => self.tokenize_atom(node, style, position, &mut fragments),
                }
                position += run.len();
            }
            let trailing = self.events_at(position);
            push_trailing_events(&mut fragments, style_for_trailing(&block), trailing);

            self.render_block(&block, &fragments);
        }
    }

    fn block_context(&mut self, chain: &[&Element], path: &[usize]) -> BlockContext {
        let mut first_prefix = String::new();
        let mut continuation_prefix = String::new();
        let mut quoted = false;
        let mut heading = None;
        let mut preformatted = false;

        for (depth, element) in chain.iter().enumerate().skip(1) {
            match element.tag.as_str() {
                "blockquote" => {
                    first_prefix.push_str("│ ");
                    continuation_prefix.push_str("│ ");
                    quoted = true;
                }
                "li" => {
                    let marker = list_marker(chain[depth - 1], path[depth - 1]);
                    let item_path = path[..depth].to_vec();
                    let blank = " ".repeat(marker.chars().count());
                    if self.marked_items.insert(item_path) {
                        first_prefix.push_str(&marker);
                    } else {
                        first_prefix.push_str(&blank);
                    }
                    continuation_prefix.push_str(&blank);
                }
                "pre" => preformatted = true,
                tag => {
                    if let Some(level) = heading_level(tag) {
                        heading = Some(level);
                    }
                }
            }
        }

        BlockContext {
            first_prefix,
            continuation_prefix,
            quoted,
            heading,
            preformatted,
            alignment: effective_alignment(chain),
        }
    }

    fn render_block(&mut self, block: &BlockContext, fragments: &[FragmentItem]) {
        let prefix_style = if block.quoted {
            self.theme.quote_style()
        } else {
            Style::default()
        };
        let width = if block.preformatted {
            usize::MAX / 4
        } else {
            self.wrap_width
        };

        if block.preformatted {
            let fence = self.code_block_fence(&block.continuation_prefix);
            self.push_plain_line(&fence);
        }

        let mut lines = wrap_fragments(
            fragments,
            &block.first_prefix,
            &block.continuation_prefix,
            width,
            prefix_style,
        );
        if !block.preformatted {
            for line in &mut lines {
                align_line(line, block.alignment, self.wrap_width);
            }
        }
        self.consume_lines(lines);

        if let Some(level) = block.heading
            && level <= 2
        {
            let width = self.lines.last().map(|line| line_width(line)).unwrap_or(0);
            let underline_char = if level == 1 { '=' } else { '-' };
            let underline = underline_string(width, underline_char);
            self.push_plain_line(&underline);
        }

        if block.preformatted {
            let fence = self.code_block_fence(&block.continuation_prefix);
            self.push_plain_line(&fence);
        }
    }

    fn is_selected(&self, position: usize) -> bool {
        self.selection
            .is_some_and(|selection| selection.start() <= position && position < selection.end())
    }

    fn events_at(&self, position: usize) -> Vec<TextEvent> {
        let mut events = vec![TextEvent {
            offset: 0,
            kind: TextEventKind::Position(position),
        }];
        if self.selection.is_some_and(|selection| selection.focus == position) {
            events.push(TextEvent {
                offset: 0,
                kind: TextEventKind::Cursor,
            });
        }
        events
    }

    /// Splits `text` where the selection starts or ends so the selected part
    /// can be styled on its own.
    fn tokenize_selected(
        &self,
        text: &str,
        style: Style,
        start: usize,
        fragments: &mut Vec<FragmentItem>,
    ) {
        let chars: Vec<char> = text.chars().collect();
        let mut segment_start = 0;
        while segment_start < chars.len() {
            let selected = self.is_selected(start + segment_start);
            let mut segment_end = segment_start + 1;
            while segment_end < chars.len() && self.is_selected(start + segment_end) == selected {
                segment_end += 1;
            }
            let segment: String = chars[segment_start..segment_end].iter().collect();
            let segment_style = if selected {
                style.patch(self.theme.selection_style())
            } else {
                style
            };
            tokenize_text(
                &segment,
                segment_style,
                |offset| self.events_at(start + segment_start + offset),
                fragments,
            );
            segment_start = segment_end;
        }
    }

    fn tokenize_atom(
        &self,
        node: &Node,
        style: Style,
        position: usize,
        fragments: &mut Vec<FragmentItem>,
    ) {
        let Some(element) = node.as_element() else {
            return;
        };
        let (label, style) = match element.tag.as_str() {
            "br" => ("\n".to_string(), style),
            "img" => {
                let name = element
                    .attr("alt")
                    .filter(|alt| !alt.trim().is_empty())
                    .or_else(|| element.attr("src"))
                    .unwrap_or_default();
                (format!("[image: {name}]"), style.patch(self.theme.image_style()))
            }
            _ if element.is_void() => ("\u{fffc}".to_string(), style),
            _ => return,
        };
        let style = if self.is_selected(position) {
            style.patch(self.theme.selection_style())
        } else {
            style
        };
        tokenize_text(
            &label,
            style,
            |offset| {
                if offset == 0 {
                    self.events_at(position)
                } else {
                    Vec::new()
                }
            },
            fragments,
        );
    }

    fn push_blank_line(&mut self) {
        self.lines.push(Line::from(""));
        self.current_line_index += 1;
    }

    fn push_plain_line(&mut self, content: &str) {
        let span = Span::raw(content.to_string()).to_owned();
        let line = Line::from(vec![span]);
        self.lines.push(line);
        self.current_line_index += 1;
    }

    fn code_block_fence(&self, prefix: &str) -> String {
        const MIN_FENCE_WIDTH: usize = 4;
        let available_width = self.wrap_width.saturating_sub(prefix.chars().count());
        let dash_count = available_width.max(MIN_FENCE_WIDTH);
        format!("{}{}", prefix, "-".repeat(dash_count))
    }

    fn consume_lines(&mut self, outputs: Vec<LineOutput>) {
        for output in outputs {
            let mut spans: Vec<Span<'static>> = Vec::with_capacity(output.spans.len());
            for segment in output.spans {
                spans.push(Span::styled(segment.text.clone(), segment.style).to_owned());
            }
            let line = Line::from(spans);
            for event in output.events {
                let position = CursorVisualPosition {
                    line: self.current_line_index,
                    column: event.column,
                };
                match event.kind {
                    TextEventKind::Cursor => {
                        self.cursor = Some(position);
                    }
                    TextEventKind::Position(offset) => {
                        self.positions.push((offset, position));
                    }
                }
            }
            self.lines.push(line);
            self.current_line_index += 1;
        }
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
            positions: self.positions,
        }
    }
}

struct BlockContext {
    first_prefix: String,
    continuation_prefix: String,
    quoted: bool,
    heading: Option<u8>,
    preformatted: bool,
    alignment: Alignment,
}

impl BlockContext {
    fn base_style(&self) -> Style {
        match self.heading {
            Some(_) => Style::default().add_modifier(Modifier::BOLD),
            None if self.preformatted => Style::default().add_modifier(Modifier::DIM),
            None => Style::default(),
        }
    }
}

fn style_for_trailing(block: &BlockContext) -> Style {
    block.base_style()
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Bullet or number of the `li` at `index` among `list`'s children.
fn list_marker(list: &Element, index: usize) -> String {
    match ListKind::from_tag(&list.tag) {
        Some(ListKind::Ordered) => {
            let first = list
                .attr("start")
                .and_then(|start| start.trim().parse::<usize>().ok())
                .unwrap_or(1);
            let preceding = list.children[..index.min(list.children.len())]
                .iter()
                .filter(|node| node.as_element().is_some_and(|element| element.tag == "li"))
                .count();
            format!("{}. ", first + preceding)
        }
        _ => "• ".to_string(),
    }
}

/// Outside `<pre>` a source line break is just a space.
fn collapse_line_breaks(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .collect()
}

fn marks_style(base: Style, marks: &[Mark], theme: &Theme) -> Style {
    marks.iter().fold(base, |style, mark| merge_mark(style, mark, theme))
}

fn merge_mark(base: Style, mark: &Mark, theme: &Theme) -> Style {
    let mut style = base;
    for format in InlineFormat::ALL {
        if format.matches_tag(&mark.tag) {
            style = style.add_modifier(format_modifier(format));
        }
    }
    match mark.tag.as_str() {
        "a" => style = style.patch(theme.link_style()),
        "code" | "kbd" | "samp" => style = style.add_modifier(Modifier::DIM),
        "mark" => style = style.add_modifier(Modifier::REVERSED),
        "font" => {
            if let Some(color) = mark.attr("color").and_then(parse_color) {
                style = style.fg(color);
            }
        }
        _ => {}
    }
    if let Some(color) = mark.style_property("color").as_deref().and_then(parse_color) {
        style = style.fg(color);
    }
    if let Some(color) = mark
        .style_property("background-color")
        .as_deref()
        .and_then(parse_color)
    {
        style = style.bg(color);
    }
    style
}

fn format_modifier(format: InlineFormat) -> Modifier {
    match format {
        InlineFormat::Bold => Modifier::BOLD,
        InlineFormat::Italic => Modifier::ITALIC,
        InlineFormat::Underline => Modifier::UNDERLINED,
        InlineFormat::Strikethrough => Modifier::CROSSED_OUT,
    }
}

/// CSS colour names and `#rgb`/`#rrggbb` values.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#')
        && hex.len() == 3
        && hex.chars().all(|ch| ch.is_ascii_hexdigit())
    {
        let expanded: String = hex.chars().flat_map(|ch| [ch, ch]).collect();
        return Color::from_str(&format!("#{expanded}")).ok();
    }
    Color::from_str(value).ok()
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

#[derive(Clone)]
struct LineOutput {
    spans: Vec<LineSegment>,
    events: Vec<LocatedEvent>,
    prefix_width: usize,
    has_prefix: bool,
}

#[derive(Clone, Copy)]
struct LocatedEvent {
    column: u16,
    kind: TextEventKind,
}

#[derive(Clone)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    events: Vec<TextEvent>,
}

#[derive(Clone, Copy)]
enum FragmentKind {
    Word,
    Whitespace,
}

#[derive(Clone)]
enum FragmentItem {
    Token(Fragment),
    LineBreak,
}

#[derive(Clone)]
struct TextEvent {
    offset: usize,
    kind: TextEventKind,
}

#[derive(Clone, Copy)]
enum TextEventKind {
    /// A caret position starts here.
    Position(usize),
    Cursor,
}

/// Splits `text` into words, whitespace and line breaks. `events_for` is
/// asked for the events of every character offset.
fn tokenize_text(
    text: &str,
    style: Style,
    events_for: impl Fn(usize) -> Vec<TextEvent>,
    fragments: &mut Vec<FragmentItem>,
) {
    let mut builder: Option<TokenBuilder> = None;
    let mut pending_events: Vec<TextEvent> = Vec::new();

    for (offset, ch) in text.chars().enumerate() {
        pending_events.extend(events_for(offset));
        if ch == '\r' {
            continue;
        }
        if ch == '\n' {
            if let Some(mut token) = builder.take() {
                token.add_events(&mut pending_events);
                fragments.push(FragmentItem::Token(token.finish()));
            } else if !pending_events.is_empty() {
                fragments.push(FragmentItem::Token(Fragment {
                    text: String::new(),
                    style,
                    kind: FragmentKind::Word,
                    width: 0,
                    events: pending_events.drain(..).collect(),
                }));
            }
            fragments.push(FragmentItem::LineBreak);
            continue;
        }

        let actual = if ch == '\t' { ' ' } else { ch };
        let is_whitespace = actual.is_whitespace();
        if builder
            .as_ref()
            .map(|existing| existing.kind_matches(is_whitespace))
            .unwrap_or(false)
        {
            if let Some(current) = builder.as_mut() {
                current.add_events(&mut pending_events);
                current.push_char(actual);
            }
        } else {
            if let Some(existing) = builder.take() {
                fragments.push(FragmentItem::Token(existing.finish()));
            }
            let mut new_builder = TokenBuilder::new(style, is_whitespace);
            new_builder.add_events(&mut pending_events);
            new_builder.push_char(actual);
            builder = Some(new_builder);
        }
    }

    if let Some(mut token) = builder {
        token.add_events(&mut pending_events);
        fragments.push(FragmentItem::Token(token.finish()));
    } else if !pending_events.is_empty() {
        fragments.push(FragmentItem::Token(Fragment {
            text: String::new(),
            style,
            kind: FragmentKind::Word,
            width: 0,
            events: pending_events,
        }));
    }
}

/// Attaches `events` after the last character of the block.
fn push_trailing_events(fragments: &mut Vec<FragmentItem>, style: Style, events: Vec<TextEvent>) {
    if let Some(FragmentItem::Token(token)) = fragments.last_mut() {
        for mut event in events {
            event.offset = token.width;
            token.events.push(event);
        }
        return;
    }
    fragments.push(FragmentItem::Token(Fragment {
        text: String::new(),
        style,
        kind: FragmentKind::Word,
        width: 0,
        events,
    }));
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    events: Vec<TextEvent>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            events: Vec::new(),
        }
    }

    fn kind_matches(&self, is_whitespace: bool) -> bool {
        matches!(
            (self.kind, is_whitespace),
            (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
        )
    }

    fn add_events(&mut self, pending: &mut Vec<TextEvent>) {
        for mut event in pending.drain(..) {
            event.offset = self.width;
            self.events.push(event);
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            events: self.events,
        }
    }
}

fn wrap_fragments(
    fragments: &[FragmentItem],
    first_prefix: &str,
    continuation_prefix: &str,
    width: usize,
    prefix_style: Style,
) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new(first_prefix, prefix_style);
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment {
            FragmentItem::LineBreak => {
                builder.consume_pending(&mut pending_whitespace);
                outputs.push(builder.build_line());
                builder = LineBuilder::new(continuation_prefix, prefix_style);
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => {
                    pending_whitespace.push(token.clone());
                }
                FragmentKind::Word => {
                    let whitespace_width: usize =
                        pending_whitespace.iter().map(|item| item.width).sum();
                    if builder.current_width() > builder.prefix_width
                        && builder.current_width() + whitespace_width + token.width > width
                    {
                        builder.consume_pending(&mut pending_whitespace);
                        outputs.push(builder.build_line());
                        builder = LineBuilder::new(continuation_prefix, prefix_style);
                    }

                    builder.append_with_pending(token.clone(), &mut pending_whitespace);
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line());
    outputs
}

/// Pads a wrapped line so its content sits centred or flush right within
/// `width`. Trailing whitespace does not count.
fn align_line(line: &mut LineOutput, alignment: Alignment, width: usize) {
    if matches!(alignment, Alignment::Left | Alignment::Justify) {
        return;
    }
    let content: String = line
        .spans
        .iter()
        .skip(usize::from(line.has_prefix))
        .map(|segment| segment.text.as_str())
        .collect();
    let content_width = visible_width(content.trim_end());
    let available = width.saturating_sub(line.prefix_width);
    let free = available.saturating_sub(content_width);
    let padding = match alignment {
        Alignment::Center => free / 2,
        _ => free,
    };
    if padding == 0 {
        return;
    }
    let at = usize::from(line.has_prefix);
    line.spans.insert(
        at,
        LineSegment {
            text: " ".repeat(padding),
            style: Style::default(),
        },
    );
    for event in &mut line.events {
        if usize::from(event.column) >= line.prefix_width {
            event.column = event.column.saturating_add(padding as u16);
        }
    }
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    events: Vec<LocatedEvent>,
    width: usize,
    prefix_width: usize,
    has_prefix: bool,
}

impl LineBuilder {
    fn new(prefix: &str, prefix_style: Style) -> Self {
        let prefix_width = visible_width(prefix);
        let mut segments = Vec::new();
        if !prefix.is_empty() {
            segments.push(LineSegment {
                text: prefix.to_string(),
                style: prefix_style,
            });
        }
        Self {
            has_prefix: !segments.is_empty(),
            segments,
            events: Vec::new(),
            width: prefix_width,
            prefix_width,
        }
    }

    fn current_width(&self) -> usize {
        self.width
    }

    fn append_with_pending(&mut self, token: Fragment, pending_whitespace: &mut Vec<Fragment>) {
        self.consume_pending(pending_whitespace);
        self.append_token(token);
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append_token(fragment);
        }
    }

    fn append_token(&mut self, fragment: Fragment) {
        if !fragment.text.is_empty() {
            self.segments.push(LineSegment {
                text: fragment.text.clone(),
                style: fragment.style,
            });
            self.width += fragment.width;
        }

        for event in fragment.events {
            let column = self.width.saturating_sub(fragment.width) + event.offset;
            self.events.push(LocatedEvent {
                column: column as u16,
                kind: event.kind,
            });
        }
    }

    fn build_line(mut self) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment {
                text: String::new(),
                style: Style::default(),
            });
        }
        self.events.sort_by_key(|event| event.column);
        LineOutput {
            spans: self.segments,
            events: self.events,
            prefix_width: self.prefix_width,
            has_prefix: self.has_prefix,
        }
    }
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|span| visible_width(span.content.as_ref()))
        .sum()
}

fn underline_string(width: usize, ch: char) -> String {
    std::iter::repeat_n(ch, width.max(1)).collect()
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;

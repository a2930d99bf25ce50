//! The editable host document.
//!
//! [`EditingSurface`] plays the part a `contentEditable` element plays in a
//! browser: it owns a DOM and a selection, applies typing and formatting
//! primitives to them and queues notifications for whoever mirrors its
//! content. Nothing here fails; edits that do not apply return `false`.

mod blocks;
mod inline;
mod layout;
mod text;
mod typing;

use std::mem;

use tracing::debug;

use crate::command::{InlineFormat, ListKind};
use crate::history::{EditKind, History, HistoryEntry};
use crate::html::{self, Element, Node};
use crate::selection::{Selection, SelectionSnapshot};

pub(crate) use blocks::effective_alignment;
pub(crate) use inline::TypingStyle;
pub(crate) use layout::{Layout, Mark, RunKind, element_chain, runs_in};
pub use text::{char_to_byte_idx, next_word_boundary, previous_word_boundary};

/// Placeholder character standing in for an atom in [`EditingSurface::plain_text`].
pub const OBJECT_REPLACEMENT: char = '\u{fffc}';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceEvent {
    /// The content changed; consumers re-read it.
    Mutation,
    /// The caret, the selection or the formatting at the caret changed.
    SelectionChange,
}

/// Receives the notifications a surface queued since the last dispatch.
pub trait SurfaceObserver {
    fn on_surface_mutation(&mut self, surface: &EditingSurface);
    fn on_selection_change(&mut self, surface: &EditingSurface);
}

#[derive(Debug)]
pub struct EditingSurface {
    root: Element,
    selection: Selection,
    focused: bool,
    typing_style: TypingStyle,
    history: History,
    events: Vec<SurfaceEvent>,
}

impl Default for EditingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl EditingSurface {
    pub fn new() -> Self {
        Self {
            root: Element::root(),
            selection: Selection::default(),
            focused: false,
            typing_style: TypingStyle::default(),
            history: History::default(),
            events: Vec::new(),
        }
    }

    pub fn from_content(content: &str) -> Self {
        let mut surface = Self::new();
        surface.initialize(content);
        surface
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history.set_limit(limit);
    }

    /// Replaces the document. Markup the parser cannot make sense of is
    /// repaired, never rejected. The caret moves to the start and history
    /// is cleared.
    pub fn initialize(&mut self, content: &str) {
        self.root = html::parse(content);
        self.selection = Selection::caret(0);
        self.typing_style.clear();
        self.history.clear();
        self.events.clear();
        debug!(bytes = content.len(), "surface initialized");
        self.emit(SurfaceEvent::SelectionChange);
    }

    pub fn serialized_content(&self) -> String {
        html::serialize(&self.root)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub(crate) fn layout(&self) -> Layout {
        Layout::compute(&self.root)
    }

    /// Largest caret position.
    pub fn len(&self) -> usize {
        self.layout().len()
    }

    /// True when there is nothing to show, e.g. to decide on a placeholder.
    pub fn is_empty(&self) -> bool {
        self.root
            .children
            .iter()
            .all(|node| node.is_whitespace_text() || matches!(node, Node::Comment(_)))
    }

    /// Text of every container joined by newlines, one character per
    /// position. Atoms show up as [`OBJECT_REPLACEMENT`].
    pub fn plain_text(&self) -> String {
        let layout = self.layout();
        let mut out = String::new();
        for (idx, container) in layout.containers.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            for run in runs_in(&self.root, container) {
                match &run.kind {
                    RunKind::Text(text) => out.push_str(text),
                    RunKind::Atom(_) if run.len() > 0 => out.push(OBJECT_REPLACEMENT),
                    RunKind::Atom(_) => {}
                }
            }
        }
        out
    }

    pub fn focus(&mut self) {
        if !self.focused {
            self.focused = true;
            debug!("surface focused");
        }
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.len());
        self.after_caret_move();
    }

    pub fn select_all(&mut self) {
        self.selection = Selection::new(0, self.len());
        self.after_caret_move();
    }

    pub fn move_left(&mut self, extend: bool) {
        if !extend && !self.selection.is_collapsed() {
            let start = self.selection.start();
            self.move_focus(start, false);
            return;
        }
        let target = self.selection.focus.saturating_sub(1);
        self.move_focus(target, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        if !extend && !self.selection.is_collapsed() {
            let end = self.selection.end();
            self.move_focus(end, false);
            return;
        }
        let target = self.selection.focus + 1;
        self.move_focus(target, extend);
    }

    pub fn move_word_left(&mut self, extend: bool) {
        let target = previous_word_boundary(&self.plain_text(), self.selection.focus);
        self.move_focus(target, extend);
    }

    pub fn move_word_right(&mut self, extend: bool) {
        let target = next_word_boundary(&self.plain_text(), self.selection.focus);
        self.move_focus(target, extend);
    }

    /// Moves to the start of the caret's container.
    pub fn move_to_line_start(&mut self, extend: bool) {
        let layout = self.layout();
        let (idx, _) = layout.locate(self.selection.focus);
        self.move_focus(layout.start_of(idx), extend);
    }

    pub fn move_to_line_end(&mut self, extend: bool) {
        let layout = self.layout();
        let (idx, _) = layout.locate(self.selection.focus);
        self.move_focus(layout.position(idx, usize::MAX), extend);
    }

    pub fn move_to_start(&mut self, extend: bool) {
        self.move_focus(0, extend);
    }

    pub fn move_to_end(&mut self, extend: bool) {
        let end = self.len();
        self.move_focus(end, extend);
    }

    fn move_focus(&mut self, target: usize, extend: bool) {
        let selection = if extend {
            Selection::new(self.selection.anchor, target)
        } else {
            Selection::caret(target)
        };
        self.selection = selection.clamped(self.len());
        self.after_caret_move();
    }

    fn after_caret_move(&mut self) {
        self.typing_style.clear();
        self.history.break_run();
        self.emit(SurfaceEvent::SelectionChange);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let current = self.history_entry();
        match self.history.undo(current) {
            Some(entry) => {
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.history_entry();
        match self.history.redo(current) {
            Some(entry) => {
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            root: self.root.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.root = entry.root;
        self.selection = entry.selection.clamped(self.len());
        self.typing_style.clear();
        self.emit(SurfaceEvent::Mutation);
        self.emit(SurfaceEvent::SelectionChange);
    }

    /// Runs an edit, recording an undo step and queuing notifications when it
    /// changed anything.
    pub(crate) fn edit(&mut self, kind: EditKind, apply: impl FnOnce(&mut Self) -> bool) -> bool {
        let before = if self.history.coalesces(kind) {
            None
        } else {
            Some(self.history_entry())
        };
        let changed = apply(self);
        if changed {
            self.history.record(kind, before);
            self.emit(SurfaceEvent::Mutation);
            self.emit(SurfaceEvent::SelectionChange);
        }
        changed
    }

    pub(crate) fn emit(&mut self, event: SurfaceEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    /// Queues a mutation notification without changing anything.
    pub(crate) fn notify_mutation(&mut self) {
        self.emit(SurfaceEvent::Mutation);
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        mem::take(&mut self.events)
    }

    /// Hands queued notifications to `observer`: one mutation callback at
    /// most, then one selection callback.
    pub fn dispatch_events(&mut self, observer: &mut impl SurfaceObserver) {
        let events = self.drain_events();
        if events.contains(&SurfaceEvent::Mutation) {
            observer.on_surface_mutation(self);
        }
        if !events.is_empty() {
            observer.on_selection_change(self);
        }
    }

    /// Formatting in effect at the selection.
    pub fn snapshot(&self) -> SelectionSnapshot {
        let layout = self.layout();
        let mut snapshot = SelectionSnapshot {
            selection: Some(self.selection),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            ..SelectionSnapshot::default()
        };

        for format in InlineFormat::ALL {
            snapshot.set_active(format, self.format_active(&layout, format));
        }
        let mut marks = self.selection_marks(&layout);
        self.typing_style.apply(&mut marks);
        for (format, active) in self.typing_style.toggles() {
            snapshot.set_active(format, active);
        }
        snapshot.link = marks
            .iter()
            .rev()
            .find(|mark| mark.tag == "a")
            .and_then(|mark| mark.attr("href"))
            .map(str::to_string);
        snapshot.fore_color = inline::font_color(&marks);
        snapshot.hilite_color = inline::hilite_color(&marks);

        let (idx, _) = layout.locate(self.selection.start());
        let container = &layout.containers[idx];
        let chain = element_chain(&self.root, &container.parent);
        snapshot.block = chain
            .last()
            .filter(|element| !element.is_root())
            .map(|element| element.tag.clone());
        snapshot.list = chain
            .iter()
            .rev()
            .find_map(|element| ListKind::from_tag(&element.tag));
        snapshot.alignment = effective_alignment(&chain);
        snapshot
    }
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod surface_tests;

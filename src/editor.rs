//! The controlled rich-text editor component.
//!
//! A [`RichTextEditor`] is handed the document through [`EditorProps`] and
//! reports every change back through `on_change`. While editing it mounts an
//! [`EditingSurface`]; in preview the surface is dropped and only the
//! content string remains.

use std::fmt;

use tracing::{debug, info};

use crate::command::{Command, PromptKind};
use crate::dispatcher::{CommandDispatcher, Dispatch};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::prompt::PromptDialog;
use crate::selection::{Selection, SelectionSnapshot};
use crate::surface::EditingSurface;
use crate::sync::{ContentSynchronizer, Mode, visible_text_length};
use crate::toolbar::ToolbarItem;

pub const DEFAULT_PLACEHOLDER: &str = "Start writing…";
pub const DEFAULT_HEIGHT: u16 = 20;

pub struct EditorProps {
    pub value: String,
    pub on_change: Box<dyn FnMut(&str)>,
    pub placeholder: String,
    /// Rows the editing area asks for.
    pub height: u16,
}

impl EditorProps {
    pub fn new(value: impl Into<String>, on_change: impl FnMut(&str) + 'static) -> Self {
        Self {
            value: value.into(),
            on_change: Box::new(on_change),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }
}

impl fmt::Debug for EditorProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorProps")
            .field("value", &self.value)
            .field("placeholder", &self.placeholder)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Caret movements the host can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Left,
    Right,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
}

#[derive(Debug)]
pub struct RichTextEditor {
    value: String,
    surface: Option<EditingSurface>,
    mode: Mode,
    synchronizer: ContentSynchronizer,
    dispatcher: CommandDispatcher,
    prompt: Option<PromptDialog>,
    placeholder: String,
    height: u16,
    history_limit: usize,
}

impl RichTextEditor {
    pub fn new(props: EditorProps) -> Self {
        let EditorProps {
            value,
            on_change,
            placeholder,
            height,
        } = props;
        let mut editor = Self {
            value,
            surface: None,
            mode: Mode::Editing,
            synchronizer: ContentSynchronizer::new(on_change),
            dispatcher: CommandDispatcher::new(),
            prompt: None,
            placeholder,
            height,
            history_limit: DEFAULT_HISTORY_LIMIT,
        };
        editor.mount();
        editor
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_history_limit(limit);
        }
    }

    fn mount(&mut self) {
        let mut surface = EditingSurface::from_content(&self.value);
        surface.set_history_limit(self.history_limit);
        self.surface = Some(surface);
        self.flush();
    }

    /// Hands queued surface notifications to the synchronizer and keeps the
    /// working copy in step with what the parent was sent.
    fn flush(&mut self) {
        if let Some(surface) = self.surface.as_mut()
            && let Some(content) = self.synchronizer.flush(surface)
        {
            self.value = content;
        }
    }

    /// Accepts a new value from the parent. The surface is only rebuilt when
    /// the value differs from what it already shows, so echoes of our own
    /// `on_change` keep the caret where it is.
    pub fn set_value(&mut self, value: &str) {
        if value == self.value {
            return;
        }
        self.value = value.to_string();
        if let Some(surface) = self.surface.as_mut()
            && surface.serialized_content() != value
        {
            debug!(bytes = value.len(), "external value, reinitializing surface");
            surface.initialize(value);
            self.flush();
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Hands the content off, e.g. when the form is submitted.
    pub fn into_value(mut self) -> String {
        self.flush();
        self.value
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches between editing and preview. Content is not transformed; the
    /// selection does not survive the round trip.
    pub fn toggle_mode(&mut self) {
        match self.mode {
            Mode::Editing => {
                self.flush();
                self.surface = None;
                self.prompt = None;
                self.synchronizer.clear_snapshot();
                self.mode = Mode::Preview;
            }
            Mode::Preview => {
                self.mode = Mode::Editing;
                self.mount();
            }
        }
        info!(mode = %self.mode, "editor mode switched");
    }

    pub fn surface(&self) -> Option<&EditingSurface> {
        self.surface.as_ref()
    }

    pub fn snapshot(&self) -> &SelectionSnapshot {
        self.synchronizer.snapshot()
    }

    pub fn character_count(&self) -> usize {
        visible_text_length(&self.value)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// True when the placeholder should be shown instead of content.
    pub fn shows_placeholder(&self) -> bool {
        match &self.surface {
            Some(surface) => surface.is_empty(),
            None => self.value.trim().is_empty(),
        }
    }

    /// Runs `name` with `argument` (empty when absent) on the mounted
    /// surface and flushes the resulting notifications.
    pub fn execute(&mut self, name: &str, argument: Option<&str>) -> Dispatch {
        let outcome =
            self.dispatcher
                .execute_named(self.surface.as_mut(), name, argument.unwrap_or_default());
        self.flush();
        outcome
    }

    pub fn execute_command(&mut self, command: &Command) -> Dispatch {
        let outcome = self.dispatcher.execute(self.surface.as_mut(), command);
        self.flush();
        outcome
    }

    /// Runs a toolbar item, or opens its prompt when it needs input.
    pub fn toolbar_action(&mut self, item: &ToolbarItem) -> Option<Dispatch> {
        if let Some(kind) = item.command.prompt() {
            self.open_prompt(kind);
            return None;
        }
        item.command().map(|command| self.execute_command(&command))
    }

    /// Opens the input dialog for `kind`. A link prompt starts with the link
    /// under the caret.
    pub fn open_prompt(&mut self, kind: PromptKind) {
        if self.surface.is_none() {
            debug!(?kind, "no surface mounted, prompt not opened");
            return;
        }
        let existing = match kind {
            PromptKind::Link => self.snapshot().link.clone(),
            _ => None,
        };
        self.prompt = Some(match existing {
            Some(link) => PromptDialog::with_input(kind, link),
            None => PromptDialog::new(kind),
        });
    }

    pub fn prompt(&self) -> Option<&PromptDialog> {
        self.prompt.as_ref()
    }

    pub fn prompt_mut(&mut self) -> Option<&mut PromptDialog> {
        self.prompt.as_mut()
    }

    /// Closes the prompt and dispatches its command. Blank input dispatches
    /// nothing.
    pub fn submit_prompt(&mut self) -> Option<Dispatch> {
        let prompt = self.prompt.take()?;
        let kind = prompt.kind();
        match prompt.into_command() {
            Some(command) => Some(self.execute_command(&command)),
            None => {
                debug!(?kind, "prompt submitted empty, nothing dispatched");
                None
            }
        }
    }

    pub fn cancel_prompt(&mut self) {
        if let Some(prompt) = self.prompt.take() {
            debug!(kind = ?prompt.kind(), "prompt cancelled");
        }
    }

    fn with_surface(&mut self, apply: impl FnOnce(&mut EditingSurface) -> bool) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        surface.focus();
        let changed = apply(surface);
        self.flush();
        changed
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        self.with_surface(|surface| surface.insert_text(text))
    }

    pub fn insert_paragraph(&mut self) -> bool {
        self.with_surface(EditingSurface::insert_paragraph)
    }

    pub fn insert_line_break(&mut self) -> bool {
        self.with_surface(EditingSurface::insert_line_break)
    }

    pub fn delete_backward(&mut self) -> bool {
        self.with_surface(EditingSurface::delete_backward)
    }

    pub fn delete_forward(&mut self) -> bool {
        self.with_surface(EditingSurface::delete_forward)
    }

    pub fn move_caret(&mut self, movement: Movement, extend: bool) {
        self.with_surface(|surface| {
            match movement {
                Movement::Left => surface.move_left(extend),
                Movement::Right => surface.move_right(extend),
                Movement::WordLeft => surface.move_word_left(extend),
                Movement::WordRight => surface.move_word_right(extend),
                Movement::LineStart => surface.move_to_line_start(extend),
                Movement::LineEnd => surface.move_to_line_end(extend),
                Movement::DocumentStart => surface.move_to_start(extend),
                Movement::DocumentEnd => surface.move_to_end(extend),
            }
            false
        });
    }

    pub fn select_all(&mut self) {
        self.with_surface(|surface| {
            surface.select_all();
            false
        });
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.with_surface(|surface| {
            surface.set_selection(selection);
            false
        });
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;

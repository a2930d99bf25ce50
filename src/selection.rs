use crate::command::{Alignment, InlineFormat, ListKind};

/// A range over the linearized document. `anchor` stays put while `focus`
/// follows the caret, so a collapsed selection has both at the same place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: usize,
    pub focus: usize,
}

impl Selection {
    pub fn caret(position: usize) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }

    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.focus)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.focus)
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    pub(crate) fn clamped(self, max: usize) -> Self {
        Self {
            anchor: self.anchor.min(max),
            focus: self.focus.min(max),
        }
    }
}

/// Formatting in effect at the selection, captured as plain data whenever
/// the selection changes. Toolbars read this instead of asking the surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// `None` when no surface is mounted.
    pub selection: Option<Selection>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub alignment: Alignment,
    /// Tag of the block holding the caret; `None` for loose inline content.
    pub block: Option<String>,
    pub list: Option<ListKind>,
    pub link: Option<String>,
    pub fore_color: Option<String>,
    pub hilite_color: Option<String>,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl SelectionSnapshot {
    pub fn is_active(&self, format: InlineFormat) -> bool {
        match format {
            InlineFormat::Bold => self.bold,
            InlineFormat::Italic => self.italic,
            InlineFormat::Underline => self.underline,
            InlineFormat::Strikethrough => self.strikethrough,
        }
    }

    pub(crate) fn set_active(&mut self, format: InlineFormat, active: bool) {
        match format {
            InlineFormat::Bold => self.bold = active,
            InlineFormat::Italic => self.italic = active,
            InlineFormat::Underline => self.underline = active,
            InlineFormat::Strikethrough => self.strikethrough = active,
        }
    }

    /// Labels of the active inline formats, for status lines.
    pub fn active_formats(&self) -> Vec<&'static str> {
        InlineFormat::ALL
            .into_iter()
            .filter(|format| self.is_active(*format))
            .map(InlineFormat::label)
            .collect()
    }
}

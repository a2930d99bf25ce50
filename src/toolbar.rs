//! Toolbar description shared by every host.

use crate::command::{Alignment, Command, CommandName, ListKind};
use crate::selection::SelectionSnapshot;

/// Key that triggers an item together with the host's command modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shortcut {
    pub key: char,
    pub requires_shift: bool,
}

impl Shortcut {
    const fn new(key: char) -> Self {
        Self {
            key,
            requires_shift: false,
        }
    }

    const fn with_shift(key: char) -> Self {
        Self {
            key,
            requires_shift: true,
        }
    }

    pub fn matches(&self, key: char, shift: bool) -> bool {
        self.key.eq_ignore_ascii_case(&key) && self.requires_shift == shift
    }

    pub fn label(&self) -> String {
        if self.requires_shift {
            format!("^⇧{}", self.key.to_ascii_uppercase())
        } else {
            format!("^{}", self.key.to_ascii_uppercase())
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolbarItem {
    pub label: &'static str,
    pub command: CommandName,
    /// Fixed argument, e.g. `<h1>` for a heading button.
    pub argument: Option<&'static str>,
    pub shortcut: Option<Shortcut>,
}

impl ToolbarItem {
    const fn new(label: &'static str, command: CommandName) -> Self {
        Self {
            label,
            command,
            argument: None,
            shortcut: None,
        }
    }

    const fn block(label: &'static str, tag: &'static str) -> Self {
        Self {
            label,
            command: CommandName::FormatBlock,
            argument: Some(tag),
            shortcut: None,
        }
    }

    const fn shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// True when the item asks the user for input before dispatching.
    pub fn needs_prompt(&self) -> bool {
        self.command.prompt().is_some()
    }

    /// The command to dispatch directly, `None` for prompting items.
    pub fn command(&self) -> Option<Command> {
        if self.needs_prompt() {
            return None;
        }
        Some(Command::with_argument(self.command, self.argument.unwrap_or_default()))
    }

    pub fn is_active(&self, snapshot: &SelectionSnapshot) -> bool {
        if snapshot.selection.is_none() {
            return false;
        }
        if let Some(format) = self.command.inline_format() {
            return snapshot.is_active(format);
        }
        match self.command {
            CommandName::JustifyLeft => snapshot.alignment == Alignment::Left,
            CommandName::JustifyCenter => snapshot.alignment == Alignment::Center,
            CommandName::JustifyRight => snapshot.alignment == Alignment::Right,
            CommandName::InsertUnorderedList => snapshot.list == Some(ListKind::Unordered),
            CommandName::InsertOrderedList => snapshot.list == Some(ListKind::Ordered),
            CommandName::FormatBlock => self
                .argument
                .and_then(crate::command::parse_block_format)
                .is_some_and(|tag| snapshot.block.as_deref() == Some(tag)),
            CommandName::CreateLink => snapshot.link.is_some(),
            CommandName::ForeColor => snapshot.fore_color.is_some(),
            CommandName::HiliteColor => snapshot.hilite_color.is_some(),
            _ => false,
        }
    }

    /// Undo and redo grey out when there is nothing to step through.
    pub fn is_enabled(&self, snapshot: &SelectionSnapshot) -> bool {
        match self.command {
            CommandName::Undo => snapshot.can_undo,
            CommandName::Redo => snapshot.can_redo,
            _ => snapshot.selection.is_some(),
        }
    }
}

pub static TOOLBAR: &[ToolbarItem] = &[
    ToolbarItem::new("B", CommandName::Bold).shortcut(Shortcut::new('b')),
    ToolbarItem::new("I", CommandName::Italic).shortcut(Shortcut::new('i')),
    ToolbarItem::new("U", CommandName::Underline).shortcut(Shortcut::new('u')),
    ToolbarItem::new("S", CommandName::Strikethrough).shortcut(Shortcut::with_shift('x')),
    ToolbarItem::new("⇤", CommandName::JustifyLeft).shortcut(Shortcut::with_shift('l')),
    ToolbarItem::new("↔", CommandName::JustifyCenter).shortcut(Shortcut::with_shift('e')),
    ToolbarItem::new("⇥", CommandName::JustifyRight).shortcut(Shortcut::with_shift('r')),
    ToolbarItem::new("•", CommandName::InsertUnorderedList).shortcut(Shortcut::with_shift('u')),
    ToolbarItem::new("1.", CommandName::InsertOrderedList).shortcut(Shortcut::with_shift('o')),
    ToolbarItem::block("H1", "<h1>").shortcut(Shortcut::new('1')),
    ToolbarItem::block("H2", "<h2>").shortcut(Shortcut::new('2')),
    ToolbarItem::block("H3", "<h3>").shortcut(Shortcut::new('3')),
    ToolbarItem::block("¶", "<p>").shortcut(Shortcut::new('0')),
    ToolbarItem::block("❝", "<blockquote>").shortcut(Shortcut::with_shift('q')),
    ToolbarItem::new("Link", CommandName::CreateLink).shortcut(Shortcut::new('k')),
    ToolbarItem::new("Img", CommandName::InsertImage).shortcut(Shortcut::with_shift('i')),
    ToolbarItem::new("A", CommandName::ForeColor).shortcut(Shortcut::with_shift('c')),
    ToolbarItem::new("▒", CommandName::HiliteColor).shortcut(Shortcut::with_shift('h')),
    ToolbarItem::new("↶", CommandName::Undo).shortcut(Shortcut::new('z')),
    ToolbarItem::new("↷", CommandName::Redo).shortcut(Shortcut::new('y')),
];

pub fn find_by_shortcut(key: char, shift: bool) -> Option<&'static ToolbarItem> {
    TOOLBAR
        .iter()
        .find(|item| item.shortcut.is_some_and(|shortcut| shortcut.matches(key, shift)))
}

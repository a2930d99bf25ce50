//! Single-line input for commands that need a URL or a colour.
//!
//! The dialog never blocks: the host keeps feeding it keys and decides when
//! to submit or cancel. Only a submitted, non-blank value becomes a command.

use crate::command::{Command, PromptKind};
use crate::surface::char_to_byte_idx;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptDialog {
    kind: PromptKind,
    input: String,
    cursor: usize,
}

impl PromptDialog {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
            cursor: 0,
        }
    }

    /// Starts with `input` already filled in, e.g. the current link target.
    pub fn with_input(kind: PromptKind, input: impl Into<String>) -> Self {
        let input = input.into();
        let cursor = input.chars().count();
        Self { kind, input, cursor }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Caret position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let byte_idx = char_to_byte_idx(&self.input, self.cursor);
        self.input.insert(byte_idx, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_idx = char_to_byte_idx(&self.input, self.cursor);
        self.input.remove(byte_idx);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.input.chars().count() {
            return;
        }
        let byte_idx = char_to_byte_idx(&self.input, self.cursor);
        self.input.remove(byte_idx);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Trimmed input, `None` when blank.
    pub fn value(&self) -> Option<&str> {
        let trimmed = self.input.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// The command to dispatch on submit, `None` when there is nothing to
    /// dispatch.
    pub fn into_command(self) -> Option<Command> {
        let value = self.value()?.to_string();
        Some(Command::with_argument(self.kind.command(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandName;

    #[test]
    fn edits_at_the_cursor() {
        let mut prompt = PromptDialog::new(PromptKind::Link);
        prompt.insert_str("htps://x");
        prompt.move_home();
        prompt.move_right();
        prompt.move_right();
        prompt.insert_char('t');
        assert_eq!(prompt.input(), "https://x");

        prompt.move_end();
        prompt.backspace();
        prompt.move_home();
        prompt.delete();
        assert_eq!(prompt.input(), "ttps://");
        assert_eq!(prompt.cursor(), 0);
    }

    #[test]
    fn handles_multibyte_input() {
        let mut prompt = PromptDialog::with_input(PromptKind::Image, "ảnh");
        assert_eq!(prompt.cursor(), 3);
        prompt.move_left();
        prompt.backspace();
        assert_eq!(prompt.input(), "ảh");
    }

    #[test]
    fn blank_input_yields_no_command() {
        let mut prompt = PromptDialog::new(PromptKind::ForeColor);
        prompt.insert_str("   ");
        assert_eq!(prompt.value(), None);
        assert_eq!(prompt.into_command(), None);
    }

    #[test]
    fn submitted_input_becomes_the_command_argument() {
        let prompt = PromptDialog::with_input(PromptKind::HiliteColor, " #ffff00 ");
        assert_eq!(
            prompt.into_command(),
            Some(Command::with_argument(CommandName::HiliteColor, "#ffff00"))
        );
    }

    #[test]
    fn control_characters_are_ignored() {
        let mut prompt = PromptDialog::new(PromptKind::Link);
        prompt.insert_str("a\nb\t");
        assert_eq!(prompt.input(), "ab");
    }
}

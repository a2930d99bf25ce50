use crate::html::Element;
use crate::selection::Selection;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// What produced an undo step. Consecutive typing steps collapse into one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKind {
    Typing,
    Command,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub root: Element,
    pub selection: Selection,
}

#[derive(Debug)]
pub struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
    last_kind: Option<EditKind>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
            last_kind: None,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.trim();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.last_kind = None;
    }

    /// True when an edit of `kind` would extend the previous step instead of
    /// starting a new one, so no snapshot needs to be taken.
    pub fn coalesces(&self, kind: EditKind) -> bool {
        kind == EditKind::Typing
            && self.last_kind == Some(EditKind::Typing)
            && !self.undo.is_empty()
    }

    /// Records the state from before an edit.
    pub fn record(&mut self, kind: EditKind, before: Option<HistoryEntry>) {
        if let Some(entry) = before {
            self.undo.push(entry);
            self.trim();
        }
        self.redo.clear();
        self.last_kind = Some(kind);
    }

    /// Ends the current typing run; the next keystroke starts a new step.
    pub fn break_run(&mut self) {
        self.last_kind = None;
    }

    pub fn undo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        self.last_kind = None;
        Some(previous)
    }

    pub fn redo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        self.last_kind = None;
        Some(next)
    }

    fn trim(&mut self) {
        if self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::Node;

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry {
            root: Element::root().with_children(vec![Node::text(text)]),
            selection: Selection::caret(text.chars().count()),
        }
    }

    #[test]
    fn typing_steps_coalesce_until_the_run_breaks() {
        let mut history = History::new(10);
        assert!(!history.coalesces(EditKind::Typing));
        history.record(EditKind::Typing, Some(entry("")));
        assert!(history.coalesces(EditKind::Typing));
        history.record(EditKind::Typing, None);
        assert!(!history.coalesces(EditKind::Command));

        history.break_run();
        assert!(!history.coalesces(EditKind::Typing));
    }

    #[test]
    fn undo_and_redo_swap_entries() {
        let mut history = History::new(10);
        history.record(EditKind::Command, Some(entry("a")));
        let restored = history.undo(entry("ab")).expect("undo step");
        assert_eq!(restored, entry("a"));
        assert!(history.can_redo());

        let replayed = history.redo(entry("a")).expect("redo step");
        assert_eq!(replayed, entry("ab"));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn new_edits_clear_redo_and_respect_the_limit() {
        let mut history = History::new(2);
        history.record(EditKind::Command, Some(entry("1")));
        history.record(EditKind::Command, Some(entry("2")));
        history.record(EditKind::Command, Some(entry("3")));
        assert_eq!(history.undo(entry("4")), Some(entry("3")));
        assert_eq!(history.undo(entry("3")), Some(entry("2")));
        assert_eq!(history.undo(entry("2")), None);

        history.record(EditKind::Command, Some(entry("x")));
        assert!(!history.can_redo());
    }
}

//! Keeps the owning form's copy of the document in step with the surface.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::selection::SelectionSnapshot;
use crate::surface::{EditingSurface, SurfaceObserver};

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Editing,
    Preview,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Editing => Mode::Preview,
            Mode::Preview => Mode::Editing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Editing => "Edit",
            Mode::Preview => "Preview",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Removes everything that looks like a tag. Character references stay as
/// they are.
pub fn strip_tags(content: &str) -> String {
    TAG_PATTERN.replace_all(content, "").into_owned()
}

/// Number of characters left once tags are stripped.
pub fn visible_text_length(content: &str) -> usize {
    strip_tags(content).chars().count()
}

/// Forwards every surface mutation to `on_change` and keeps the formatting
/// snapshot current for the toolbar.
pub struct ContentSynchronizer {
    on_change: Box<dyn FnMut(&str)>,
    snapshot: SelectionSnapshot,
    notifications: usize,
}

impl fmt::Debug for ContentSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentSynchronizer")
            .field("snapshot", &self.snapshot)
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}

impl ContentSynchronizer {
    pub fn new(on_change: impl FnMut(&str) + 'static) -> Self {
        Self {
            on_change: Box::new(on_change),
            snapshot: SelectionSnapshot::default(),
            notifications: 0,
        }
    }

    /// Delivers whatever the surface queued. Returns the content handed to
    /// `on_change`, if the surface reported a mutation.
    pub fn flush(&mut self, surface: &mut EditingSurface) -> Option<String> {
        let before = self.notifications;
        surface.dispatch_events(self);
        (self.notifications > before).then(|| surface.serialized_content())
    }

    pub fn snapshot(&self) -> &SelectionSnapshot {
        &self.snapshot
    }

    /// Forgets the selection, e.g. once the surface is unmounted.
    pub fn clear_snapshot(&mut self) {
        self.snapshot = SelectionSnapshot::default();
    }

    /// How many times `on_change` has been called.
    pub fn notifications(&self) -> usize {
        self.notifications
    }
}

impl SurfaceObserver for ContentSynchronizer {
    fn on_surface_mutation(&mut self, surface: &EditingSurface) {
        let content = surface.serialized_content();
        self.notifications += 1;
        debug!(bytes = content.len(), "content changed");
        (self.on_change)(&content);
    }

    fn on_selection_change(&mut self, surface: &EditingSurface) {
        self.snapshot = surface.snapshot();
    }
}

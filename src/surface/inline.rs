use crate::command::InlineFormat;
use crate::history::EditKind;
use crate::html::{Element, Node};

use super::layout::{Layout, Mark, RunKind, insertion_marks, replace_runs, runs_in, split_runs};
use super::{EditingSurface, SurfaceEvent};

/// Formatting picked at a collapsed caret, applied to the next text typed
/// there.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TypingStyle {
    toggles: Vec<(InlineFormat, bool)>,
    fore_color: Option<String>,
    hilite_color: Option<String>,
}

impl TypingStyle {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn toggles(&self) -> impl Iterator<Item = (InlineFormat, bool)> + '_ {
        self.toggles.iter().copied()
    }

    fn toggle(&mut self, format: InlineFormat, active_at_caret: bool) {
        if let Some(entry) = self.toggles.iter_mut().find(|(existing, _)| *existing == format) {
            entry.1 = !entry.1;
        } else {
            self.toggles.push((format, !active_at_caret));
        }
    }

    pub fn apply(&self, marks: &mut Vec<Mark>) {
        for (format, enabled) in &self.toggles {
            let present = marks.iter().any(|mark| format.matches_tag(&mark.tag));
            if *enabled && !present {
                marks.push(Mark::new(format.tag()));
            } else if !*enabled {
                marks.retain(|mark| !format.matches_tag(&mark.tag));
            }
        }
        if let Some(color) = &self.fore_color {
            set_font_color(marks, color);
        }
        if let Some(color) = &self.hilite_color {
            set_hilite_color(marks, color);
        }
    }
}

fn is_highlight(mark: &Mark) -> bool {
    mark.tag == "span" && mark.style_property("background-color").is_some()
}

fn set_font_color(marks: &mut Vec<Mark>, color: &str) {
    match marks.iter_mut().rev().find(|mark| mark.tag == "font") {
        Some(font) => font.set_attr("color", color),
        None => marks.push(Mark::new("font").with_attr("color", color)),
    }
}

fn set_hilite_color(marks: &mut Vec<Mark>, color: &str) {
    match marks.iter_mut().rev().find(|mark| is_highlight(mark)) {
        Some(span) => span.set_style_property("background-color", color),
        None => {
            let mut span = Mark::new("span");
            span.set_style_property("background-color", color);
            marks.push(span);
        }
    }
}

pub(crate) fn font_color(marks: &[Mark]) -> Option<String> {
    marks.iter().rev().find_map(|mark| {
        if mark.tag == "font" {
            mark.attr("color").map(str::to_string)
        } else {
            mark.style_property("color")
        }
    })
}

pub(crate) fn hilite_color(marks: &[Mark]) -> Option<String> {
    marks
        .iter()
        .rev()
        .find_map(|mark| mark.style_property("background-color"))
}

impl EditingSurface {
    /// Marks of the character before the caret, or of the first selected
    /// character for a range.
    pub(crate) fn selection_marks(&self, layout: &Layout) -> Vec<Mark> {
        let selection = self.selection;
        if !selection.is_collapsed() {
            for (idx, range) in layout.selected(selection.start(), selection.end()) {
                if range.is_empty() {
                    continue;
                }
                let mut runs = runs_in(&self.root, &layout.containers[idx]);
                let from = split_runs(&mut runs, range.start);
                if let Some(run) = runs[from..].iter().find(|run| run.len() > 0) {
                    return run.marks.clone();
                }
            }
        }
        let (idx, offset) = layout.locate(selection.focus);
        insertion_marks(&runs_in(&self.root, &layout.containers[idx]), offset)
    }

    /// True when every selected character carries `format`, or, for a
    /// collapsed caret, when the character before it does.
    pub(crate) fn format_active(&self, layout: &Layout, format: InlineFormat) -> bool {
        let has_format = |marks: &[Mark]| marks.iter().any(|mark| format.matches_tag(&mark.tag));
        let selection = self.selection;
        if selection.is_collapsed() {
            return has_format(&self.selection_marks(layout));
        }

        let mut seen_text = false;
        for (idx, range) in layout.selected(selection.start(), selection.end()) {
            if range.is_empty() {
                continue;
            }
            let mut runs = runs_in(&self.root, &layout.containers[idx]);
            let from = split_runs(&mut runs, range.start);
            let to = split_runs(&mut runs, range.end);
            for run in runs[from..to].iter().filter(|run| run.is_text()) {
                if !has_format(&run.marks) {
                    return false;
                }
                seen_text = true;
            }
        }
        seen_text
    }

    /// Rewrites the marks of every selected run and reports whether any of
    /// them changed.
    fn map_selected_marks(&mut self, mut update: impl FnMut(&mut Vec<Mark>)) -> bool {
        let layout = self.layout();
        let selection = self.selection;
        let mut changed = false;
        for (idx, range) in layout.selected(selection.start(), selection.end()).into_iter().rev() {
            if range.is_empty() {
                continue;
            }
            let container = &layout.containers[idx];
            let mut runs = runs_in(&self.root, container);
            let from = split_runs(&mut runs, range.start);
            let to = split_runs(&mut runs, range.end);
            let mut touched = false;
            for run in runs[from..to].iter_mut().filter(|run| run.len() > 0) {
                let before = run.marks.clone();
                update(&mut run.marks);
                touched |= run.marks != before;
            }
            if touched {
                replace_runs(&mut self.root, container, &runs);
                changed = true;
            }
        }
        changed
    }

    /// Toggles an inline format over the selection. At a collapsed caret the
    /// toggle is remembered for the next typed text instead.
    pub fn toggle_format(&mut self, format: InlineFormat) -> bool {
        let layout = self.layout();
        if self.selection.is_collapsed() {
            let active = self.format_active(&layout, format);
            self.typing_style.toggle(format, active);
            self.emit(SurfaceEvent::SelectionChange);
            return false;
        }

        let active = self.format_active(&layout, format);
        self.edit(EditKind::Command, |surface| {
            surface.map_selected_marks(|marks| {
                if active {
                    marks.retain(|mark| !format.matches_tag(&mark.tag));
                } else if !marks.iter().any(|mark| format.matches_tag(&mark.tag)) {
                    marks.push(Mark::new(format.tag()));
                }
            })
        })
    }

    /// Links the selection to `url`. At a collapsed caret the URL itself is
    /// inserted as the link text.
    pub fn create_link(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }
        let link = Mark::new("a").with_attr("href", url);

        if self.selection.is_collapsed() {
            return self.edit(EditKind::Command, |surface| {
                let mut marks = surface.caret_marks();
                marks.retain(|mark| mark.tag != "a");
                marks.insert(0, link);
                surface.insert_run(RunKind::Text(url.to_string()), marks);
                true
            });
        }

        self.edit(EditKind::Command, |surface| {
            surface.map_selected_marks(|marks| {
                marks.retain(|mark| mark.tag != "a");
                marks.insert(0, link.clone());
            })
        })
    }

    /// Replaces the selection with an image.
    pub fn insert_image(&mut self, src: &str) -> bool {
        let src = src.trim();
        if src.is_empty() {
            return false;
        }
        self.edit(EditKind::Command, |surface| {
            surface.delete_selection_in_place();
            let image = Node::Element(Element::new("img").with_attr("src", src));
            let marks = surface.caret_marks();
            surface.insert_run(RunKind::Atom(image), marks);
            true
        })
    }

    pub fn fore_color(&mut self, color: &str) -> bool {
        let color = color.trim();
        if color.is_empty() {
            return false;
        }
        if self.selection.is_collapsed() {
            self.typing_style.fore_color = Some(color.to_string());
            self.emit(SurfaceEvent::SelectionChange);
            return false;
        }
        self.edit(EditKind::Command, |surface| {
            surface.map_selected_marks(|marks| set_font_color(marks, color))
        })
    }

    pub fn hilite_color(&mut self, color: &str) -> bool {
        let color = color.trim();
        if color.is_empty() {
            return false;
        }
        if self.selection.is_collapsed() {
            self.typing_style.hilite_color = Some(color.to_string());
            self.emit(SurfaceEvent::SelectionChange);
            return false;
        }
        self.edit(EditKind::Command, |surface| {
            surface.map_selected_marks(|marks| set_hilite_color(marks, color))
        })
    }
}

#[cfg(test)]
#[path = "inline_tests.rs"]
mod inline_tests;

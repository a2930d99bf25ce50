use crate::history::EditKind;
use crate::html::{Element, Node, is_heading_tag};
use crate::selection::Selection;

use super::EditingSurface;
use super::blocks::unwrap_list_item;
use super::layout::{
    Container, Mark, Run, RunKind, build_nodes, insertion_marks, remove_range, replace_runs,
    runs_in, runs_len, split_runs,
};

impl EditingSurface {
    /// Types `text` over the selection. Newlines split the block the way
    /// pressing Enter does.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if text.is_empty() {
            return false;
        }
        self.edit(EditKind::Typing, |surface| {
            surface.delete_selection_in_place();
            for (idx, line) in text.split('\n').enumerate() {
                if idx > 0 {
                    surface.split_block();
                }
                if !line.is_empty() {
                    let mut marks = surface.caret_marks();
                    surface.typing_style.apply(&mut marks);
                    surface.insert_run(RunKind::Text(line.to_string()), marks);
                }
            }
            surface.typing_style.clear();
            true
        })
    }

    /// Enter: splits the block at the caret.
    pub fn insert_paragraph(&mut self) -> bool {
        self.edit(EditKind::Command, |surface| {
            surface.delete_selection_in_place();
            surface.split_block()
        })
    }

    /// Shift+Enter: inserts a `<br>`.
    pub fn insert_line_break(&mut self) -> bool {
        self.edit(EditKind::Typing, |surface| {
            surface.delete_selection_in_place();
            let marks = surface.caret_marks();
            surface.insert_run(RunKind::Atom(Node::Element(Element::new("br"))), marks);
            true
        })
    }

    /// Backspace. At the start of a block the block is merged into the
    /// previous one.
    pub fn delete_backward(&mut self) -> bool {
        let selection = self.selection;
        if selection.is_collapsed() && selection.focus == 0 {
            return false;
        }
        self.edit(EditKind::Typing, |surface| {
            if selection.is_collapsed() {
                surface.delete_range(selection.focus - 1, selection.focus)
            } else {
                surface.delete_selection_in_place()
            }
        })
    }

    /// Delete. At the end of a block the next block is merged into it.
    pub fn delete_forward(&mut self) -> bool {
        let selection = self.selection;
        if selection.is_collapsed() && selection.focus >= self.len() {
            return false;
        }
        self.edit(EditKind::Typing, |surface| {
            if selection.is_collapsed() {
                surface.delete_range(selection.focus, selection.focus + 1)
            } else {
                surface.delete_selection_in_place()
            }
        })
    }

    pub fn delete_selection(&mut self) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        self.edit(EditKind::Typing, |surface| surface.delete_selection_in_place())
    }

    /// Marks that text typed at the caret picks up from its neighbour.
    pub(crate) fn caret_marks(&self) -> Vec<Mark> {
        let layout = self.layout();
        let (idx, offset) = layout.locate(self.selection.focus);
        insertion_marks(&runs_in(&self.root, &layout.containers[idx]), offset)
    }

    /// Inserts one run at the caret and moves the caret after it.
    pub(crate) fn insert_run(&mut self, kind: RunKind, marks: Vec<Mark>) {
        let layout = self.layout();
        let (idx, offset) = layout.locate(self.selection.focus);
        let container = &layout.containers[idx];
        let mut runs = runs_in(&self.root, container);
        let at = split_runs(&mut runs, offset);
        let run = Run { kind, marks };
        let inserted = run.len();
        runs.insert(at, run);
        replace_runs(&mut self.root, container, &runs);
        self.selection = Selection::caret(layout.position(idx, offset) + inserted);
    }

    pub(crate) fn delete_selection_in_place(&mut self) -> bool {
        let selection = self.selection;
        if selection.is_collapsed() {
            return false;
        }
        self.delete_range(selection.start(), selection.end())
    }

    /// Removes everything between two positions, merging the blocks at
    /// either end. The caret ends up at `start`.
    pub(crate) fn delete_range(&mut self, start: usize, end: usize) -> bool {
        if start >= end {
            return false;
        }
        let layout = self.layout();
        let (first, first_offset) = layout.locate(start);
        let (last, last_offset) = layout.locate(end);
        let head_container = layout.containers[first].clone();

        if first == last {
            let mut runs = runs_in(&self.root, &head_container);
            remove_range(&mut runs, first_offset, last_offset);
            replace_runs(&mut self.root, &head_container, &runs);
        } else {
            let mut tail = runs_in(&self.root, &layout.containers[last]);
            let at = split_runs(&mut tail, last_offset);
            let tail = tail.split_off(at);

            for container in layout.containers[first + 1..=last].iter().rev() {
                remove_container(&mut self.root, container);
            }

            let mut head = runs_in(&self.root, &head_container);
            let at = split_runs(&mut head, first_offset);
            head.truncate(at);
            head.extend(tail);
            replace_runs(&mut self.root, &head_container, &head);
        }

        self.selection = Selection::caret(layout.position(first, first_offset));
        true
    }

    /// Splits the caret's block in two and puts the caret at the start of
    /// the second half.
    pub(crate) fn split_block(&mut self) -> bool {
        let layout = self.layout();
        let (idx, offset) = layout.locate(self.selection.focus);
        let container = layout.containers[idx].clone();
        let position = layout.position(idx, offset);

        let mut head = runs_in(&self.root, &container);
        let at = split_runs(&mut head, offset);
        let tail = head.split_off(at);

        if !container.whole_block {
            let Some(parent) = self.root.descendant_mut(&container.parent) else {
                return false;
            };
            let halves = [
                Node::Element(Element::new("p").with_children(build_nodes(&head))),
                Node::Element(Element::new("p").with_children(build_nodes(&tail))),
            ];
            let end = container.range.end.min(parent.children.len());
            parent.children.splice(container.range.start..end, halves);
            self.selection = Selection::caret(position + 1);
            return true;
        }

        let Some((block_tag, block_attrs)) = self
            .root
            .descendant(&container.parent)
            .map(|block| (block.tag.clone(), block.attrs.clone()))
        else {
            return false;
        };
        match block_tag.as_str() {
            "pre" => {
                let marks = self.caret_marks();
                self.insert_run(RunKind::Text("\n".to_string()), marks);
                return true;
            }
            "td" | "th" | "caption" => {
                let marks = self.caret_marks();
                self.insert_run(RunKind::Atom(Node::Element(Element::new("br"))), marks);
                return true;
            }
            "li" if runs_len(&head) == 0 && runs_len(&tail) == 0 => {
                // Enter on an empty item leaves the list.
                unwrap_list_item(&mut self.root, &container.parent);
                return true;
            }
            _ => {}
        }

        let Some((&block_idx, parent_path)) = container.parent.split_last() else {
            return false;
        };
        let tag = if is_heading_tag(&block_tag) && runs_len(&tail) == 0 {
            "p".to_string()
        } else {
            block_tag
        };
        let mut second = Element::new(tag);
        second.attrs = block_attrs
            .into_iter()
            .filter(|(name, _)| name != "id")
            .collect();
        second.children = build_nodes(&tail);

        if let Some(block) = self.root.descendant_mut(&container.parent) {
            block.children = build_nodes(&head);
        }
        if let Some(parent) = self.root.descendant_mut(parent_path) {
            parent.children.insert(block_idx + 1, Node::Element(second));
        }
        self.selection = Selection::caret(position + 1);
        true
    }
}

/// Removes a container's nodes, dropping ancestors it leaves empty.
fn remove_container(root: &mut Element, container: &Container) {
    if container.whole_block {
        let Some((&idx, parent_path)) = container.parent.split_last() else {
            return;
        };
        if let Some(parent) = root.descendant_mut(parent_path)
            && idx < parent.children.len()
        {
            parent.children.remove(idx);
        }
        prune_empty_ancestors(root, parent_path);
    } else {
        if let Some(parent) = root.descendant_mut(&container.parent) {
            let end = container.range.end.min(parent.children.len());
            let start = container.range.start.min(end);
            parent.children.drain(start..end);
        }
        prune_empty_ancestors(root, &container.parent);
    }
}

fn prune_empty_ancestors(root: &mut Element, path: &[usize]) {
    let mut path = path;
    while let Some((&idx, parent_path)) = path.split_last() {
        let empty = root
            .descendant(path)
            .is_some_and(|element| element.children.iter().all(Node::is_whitespace_text));
        if !empty {
            break;
        }
        if let Some(parent) = root.descendant_mut(parent_path)
            && idx < parent.children.len()
        {
            parent.children.remove(idx);
        }
        path = parent_path;
    }
}

#[cfg(test)]
#[path = "typing_tests.rs"]
mod typing_tests;

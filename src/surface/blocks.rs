use std::mem;

use crate::command::{Alignment, ListKind};
use crate::history::EditKind;
use crate::html::{Element, Node, is_heading_tag, is_list_tag};

use super::EditingSurface;
use super::layout::{Container, element_chain};

/// Marks lists created by the current command so they can be merged with
/// their neighbours afterwards.
const NEW_LIST_MARKER: &str = "data-pagecraft-new";

/// Blocks `formatBlock` renames in place; anything else gets its content
/// wrapped instead.
const RENAMEABLE_BLOCKS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "div",
    "pre",
    "blockquote",
    "address",
];

/// Alignment in effect for the innermost element of `chain`.
pub(crate) fn effective_alignment(chain: &[&Element]) -> Alignment {
    chain
        .iter()
        .rev()
        .find_map(|element| declared_alignment(element))
        .unwrap_or_default()
}

fn declared_alignment(element: &Element) -> Option<Alignment> {
    element
        .style_property("text-align")
        .and_then(|value| Alignment::from_css(&value))
        .or_else(|| element.attr("align").and_then(Alignment::from_css))
}

impl EditingSurface {
    /// Turns every selected block into `tag`.
    pub fn format_block(&mut self, tag: &str) -> bool {
        self.edit(EditKind::Command, |surface| {
            let layout = surface.layout();
            let selection = surface.selection;
            let mut changed = false;
            for (idx, _) in layout.selected(selection.start(), selection.end()).into_iter().rev() {
                changed |= retag_container(&mut surface.root, &layout.containers[idx], tag);
            }
            changed
        })
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> bool {
        self.edit(EditKind::Command, |surface| {
            let layout = surface.layout();
            let selection = surface.selection;
            let mut changed = false;
            for (idx, _) in layout.selected(selection.start(), selection.end()).into_iter().rev() {
                changed |= align_container(&mut surface.root, &layout.containers[idx], alignment);
            }
            changed
        })
    }

    /// Puts the selected blocks into a list of `kind`, or takes them out of
    /// it when they all are in one already.
    pub fn toggle_list(&mut self, kind: ListKind) -> bool {
        self.edit(EditKind::Command, |surface| {
            let layout = surface.layout();
            let selection = surface.selection;
            let items: Vec<(usize, Option<Vec<usize>>)> = layout
                .selected(selection.start(), selection.end())
                .into_iter()
                .map(|(idx, _)| (idx, list_item_path(&surface.root, &layout.containers[idx])))
                .collect();

            let all_in_kind = items.iter().all(|(_, item)| {
                item.as_ref()
                    .is_some_and(|path| list_kind_of_item(&surface.root, path) == Some(kind))
            });
            if all_in_kind {
                let mut paths: Vec<Vec<usize>> =
                    items.into_iter().filter_map(|(_, item)| item).collect();
                paths.sort();
                paths.dedup();
                for path in paths.iter().rev() {
                    unwrap_list_item(&mut surface.root, path);
                }
                return true;
            }

            for (idx, item) in items.into_iter().rev() {
                match item {
                    Some(path) => {
                        let list_path = &path[..path.len() - 1];
                        if let Some(list) = surface.root.descendant_mut(list_path)
                            && list.tag != kind.tag()
                        {
                            list.tag = kind.tag().to_string();
                        }
                    }
                    None => wrap_in_list(&mut surface.root, &layout.containers[idx], kind),
                }
            }
            merge_new_lists(&mut surface.root);
            strip_marker(&mut surface.root);
            true
        })
    }
}

fn retag_container(root: &mut Element, container: &Container, tag: &str) -> bool {
    if container.whole_block {
        let Some(block) = root.descendant_mut(&container.parent) else {
            return false;
        };
        if block.tag == tag {
            return false;
        }
        if RENAMEABLE_BLOCKS.contains(&block.tag.as_str()) {
            block.tag = tag.to_string();
        } else {
            let children = mem::take(&mut block.children);
            block.children = vec![Node::Element(Element::new(tag).with_children(children))];
        }
        return true;
    }

    wrap_loose_run(root, container, Element::new(tag))
}

/// Moves the nodes of an anonymous container into `wrapper`.
fn wrap_loose_run(root: &mut Element, container: &Container, mut wrapper: Element) -> bool {
    let Some(parent) = root.descendant_mut(&container.parent) else {
        return false;
    };
    let end = container.range.end.min(parent.children.len());
    let start = container.range.start.min(end);
    wrapper.children = parent.children.drain(start..end).collect();
    parent.children.insert(start, Node::Element(wrapper));
    true
}

fn align_container(root: &mut Element, container: &Container, alignment: Alignment) -> bool {
    if !container.whole_block {
        let chain = element_chain(root, &container.parent);
        if effective_alignment(&chain) == alignment {
            return false;
        }
        let mut wrapper = Element::new("div");
        wrapper.set_style_property("text-align", alignment.css_value());
        return wrap_loose_run(root, container, wrapper);
    }

    let Some((_, parent_path)) = container.parent.split_last() else {
        return false;
    };
    let inherited = effective_alignment(&element_chain(root, parent_path));
    let Some(block) = root.descendant_mut(&container.parent) else {
        return false;
    };
    let before = block.attrs.clone();
    block.remove_attr("align");
    if alignment == inherited {
        block.remove_style_property("text-align");
    } else {
        block.set_style_property("text-align", alignment.css_value());
    }
    block.attrs != before
}

/// Path of the nearest `<li>` holding the container, if it sits in a list.
fn list_item_path(root: &Element, container: &Container) -> Option<Vec<usize>> {
    let path = &container.parent;
    (1..=path.len()).rev().find_map(|depth| {
        let candidate = &path[..depth];
        let item = root.descendant(candidate)?;
        let list = root.descendant(&candidate[..depth - 1])?;
        (item.tag == "li" && is_list_tag(&list.tag)).then(|| candidate.to_vec())
    })
}

fn list_kind_of_item(root: &Element, item_path: &[usize]) -> Option<ListKind> {
    let (_, list_path) = item_path.split_last()?;
    root.descendant(list_path)
        .and_then(|list| ListKind::from_tag(&list.tag))
}

fn new_list(kind: ListKind, item: Element) -> Node {
    Node::Element(
        Element::new(kind.tag())
            .with_attr(NEW_LIST_MARKER, "")
            .with_children(vec![Node::Element(item)]),
    )
}

fn wrap_in_list(root: &mut Element, container: &Container, kind: ListKind) {
    if !container.whole_block {
        let Some(parent) = root.descendant_mut(&container.parent) else {
            return;
        };
        let end = container.range.end.min(parent.children.len());
        let start = container.range.start.min(end);
        let nodes: Vec<Node> = parent.children.drain(start..end).collect();
        parent
            .children
            .insert(start, new_list(kind, Element::new("li").with_children(nodes)));
        return;
    }

    let Some((&idx, parent_path)) = container.parent.split_last() else {
        return;
    };
    let Some(parent) = root.descendant_mut(parent_path) else {
        return;
    };
    let Some(Node::Element(block)) = parent.children.get_mut(idx) else {
        return;
    };

    if matches!(block.tag.as_str(), "p" | "div") {
        let mut item = Element::new("li");
        item.attrs = mem::take(&mut block.attrs);
        item.children = mem::take(&mut block.children);
        parent.children[idx] = new_list(kind, item);
    } else if is_heading_tag(&block.tag) || matches!(block.tag.as_str(), "pre" | "blockquote" | "address") {
        let block = mem::replace(&mut parent.children[idx], Node::Text(String::new()));
        parent.children[idx] = new_list(kind, Element::new("li").with_children(vec![block]));
    } else {
        let children = mem::take(&mut block.children);
        block.children = vec![new_list(kind, Element::new("li").with_children(children))];
    }
}

/// Joins lists created by the current command with adjacent lists of the
/// same type.
fn merge_new_lists(element: &mut Element) {
    for child in element.children.iter_mut() {
        if let Node::Element(child) = child {
            merge_new_lists(child);
        }
    }

    let children = mem::take(&mut element.children);
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());
    let mut pending_whitespace: Vec<Node> = Vec::new();
    for child in children {
        if child.is_whitespace_text() {
            pending_whitespace.push(child);
            continue;
        }
        let joins_previous = match (&child, merged.last()) {
            (Node::Element(list), Some(Node::Element(previous))) => {
                is_list_tag(&list.tag)
                    && previous.tag == list.tag
                    && (list.attr(NEW_LIST_MARKER).is_some()
                        || previous.attr(NEW_LIST_MARKER).is_some())
            }
            _ => false,
        };
        if joins_previous {
            if let (Node::Element(list), Some(Node::Element(previous))) = (child, merged.last_mut()) {
                pending_whitespace.clear();
                previous.children.extend(list.children);
            }
            continue;
        }
        merged.append(&mut pending_whitespace);
        merged.push(child);
    }
    merged.append(&mut pending_whitespace);
    element.children = merged;
}

fn strip_marker(element: &mut Element) {
    element.remove_attr(NEW_LIST_MARKER);
    for child in element.children.iter_mut() {
        if let Node::Element(child) = child {
            strip_marker(child);
        }
    }
}

/// Takes one item out of its list. The item becomes a paragraph (or its
/// blocks are moved out as they are) and the list is split around it.
pub(crate) fn unwrap_list_item(root: &mut Element, item_path: &[usize]) {
    let Some((&item_idx, list_path)) = item_path.split_last() else {
        return;
    };
    let Some((&list_idx, parent_path)) = list_path.split_last() else {
        return;
    };
    let Some(parent) = root.descendant_mut(parent_path) else {
        return;
    };
    if !matches!(parent.children.get(list_idx), Some(Node::Element(list)) if item_idx < list.children.len())
    {
        return;
    }
    let Node::Element(list) = parent.children.remove(list_idx) else {
        return;
    };

    let Element {
        tag,
        attrs,
        children: mut before,
    } = list;
    let after = before.split_off(item_idx + 1);
    let item = before.pop();

    let mut replacement = Vec::new();
    if has_items(&before) {
        replacement.push(Node::Element(Element {
            tag: tag.clone(),
            attrs: attrs.clone(),
            children: before,
        }));
    }
    match item {
        Some(Node::Element(item)) if item.contains_block() => replacement.extend(item.children),
        Some(Node::Element(item)) => {
            let mut paragraph = Element::new("p");
            paragraph.attrs = item.attrs;
            paragraph.children = item.children;
            replacement.push(Node::Element(paragraph));
        }
        Some(other) => replacement.push(other),
        None => {}
    }
    if has_items(&after) {
        replacement.push(Node::Element(Element {
            tag,
            attrs: attrs.into_iter().filter(|(name, _)| name != "id").collect(),
            children: after,
        }));
    }
    parent.children.splice(list_idx..list_idx, replacement);
}

fn has_items(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| matches!(node, Node::Element(_)))
}

#[cfg(test)]
#[path = "blocks_tests.rs"]
mod blocks_tests;

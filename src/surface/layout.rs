//! Linearized view of the DOM.
//!
//! Inline content is grouped into containers: block elements that only hold
//! inline children, and runs of loose inline nodes sitting between blocks.
//! Positions count characters inside a container and one extra position for
//! each container boundary. Inside a container the nodes are flattened into
//! [`Run`]s that carry their chain of inline wrappers as [`Mark`]s, edited as
//! a flat list and written back with [`build_nodes`].

use std::ops::Range;

use crate::html::{Element, Node, style_declarations};

use super::text::split_text;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Container {
    /// Path from the root to the element whose children hold the content.
    pub parent: Vec<usize>,
    /// Children of `parent` that belong to this container.
    pub range: Range<usize>,
    /// `parent` is a block and the range covers all of its children.
    pub whole_block: bool,
    pub len: usize,
}

#[derive(Debug)]
pub(crate) struct Layout {
    pub containers: Vec<Container>,
    starts: Vec<usize>,
}

impl Layout {
    pub fn compute(root: &Element) -> Self {
        let mut containers = Vec::new();
        let mut path = Vec::new();
        collect(root, &mut path, &mut containers);
        if containers.is_empty() {
            let end = root.children.len();
            containers.push(Container {
                parent: Vec::new(),
                range: end..end,
                whole_block: false,
                len: 0,
            });
        }

        let mut starts = Vec::with_capacity(containers.len());
        let mut position = 0;
        for container in &containers {
            starts.push(position);
            position += container.len + 1;
        }
        Self { containers, starts }
    }

    /// Largest valid position.
    pub fn len(&self) -> usize {
        match (self.starts.last(), self.containers.last()) {
            (Some(start), Some(container)) => start + container.len,
            _ => 0,
        }
    }

    pub fn start_of(&self, idx: usize) -> usize {
        self.starts.get(idx).copied().unwrap_or_else(|| self.len())
    }

    /// Maps a position to `(container index, offset)`, clamping past the end.
    pub fn locate(&self, position: usize) -> (usize, usize) {
        let idx = match self.starts.binary_search(&position) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let offset = position
            .saturating_sub(self.starts[idx])
            .min(self.containers[idx].len);
        (idx, offset)
    }

    pub fn position(&self, idx: usize, offset: usize) -> usize {
        match self.containers.get(idx) {
            Some(container) => self.starts[idx] + offset.min(container.len),
            None => self.len(),
        }
    }

    /// Containers touched by `start..end` with the local range of each.
    ///
    /// A collapsed range yields the caret's container. Otherwise containers
    /// are included when the range covers some of their content, or when they
    /// are empty and lie inside the range.
    pub fn selected(&self, start: usize, end: usize) -> Vec<(usize, Range<usize>)> {
        if start >= end {
            let (idx, offset) = self.locate(start);
            return vec![(idx, offset..offset)];
        }

        let mut out = Vec::new();
        for (idx, container) in self.containers.iter().enumerate() {
            let from = self.starts[idx];
            let to = from + container.len;
            if to < start || from > end {
                continue;
            }
            let local = start.max(from) - from..end.min(to) - from;
            if !local.is_empty() || container.len == 0 {
                out.push((idx, local));
            }
        }
        if out.is_empty() {
            let (idx, offset) = self.locate(start);
            out.push((idx, offset..offset));
        }
        out
    }
}

fn collect(element: &Element, path: &mut Vec<usize>, out: &mut Vec<Container>) {
    if element.is_void() || element.is_raw_text() {
        return;
    }

    let children = &element.children;
    if !element.contains_block() {
        if !element.is_root() {
            out.push(Container {
                parent: path.clone(),
                range: 0..children.len(),
                whole_block: true,
                len: nodes_len(children),
            });
        } else if has_inline_content(children) {
            out.push(Container {
                parent: path.clone(),
                range: 0..children.len(),
                whole_block: false,
                len: nodes_len(children),
            });
        }
        return;
    }

    let mut idx = 0;
    while idx < children.len() {
        if children[idx].is_block_level() {
            if let Node::Element(child) = &children[idx] {
                path.push(idx);
                collect(child, path, out);
                path.pop();
            }
            idx += 1;
            continue;
        }

        let start = idx;
        while idx < children.len() && !children[idx].is_block_level() {
            idx += 1;
        }
        if has_inline_content(&children[start..idx]) {
            out.push(Container {
                parent: path.clone(),
                range: start..idx,
                whole_block: false,
                len: nodes_len(&children[start..idx]),
            });
        }
    }
}

fn has_inline_content(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Text(text) => !text.chars().all(char::is_whitespace),
        Node::Element(_) => true,
        Node::Comment(_) => false,
    })
}

pub(crate) fn node_len(node: &Node) -> usize {
    match node {
        Node::Text(text) => text.chars().count(),
        Node::Comment(_) => 0,
        Node::Element(element) if element.is_void() => 1,
        Node::Element(element) if element.is_raw_text() => 0,
        Node::Element(element) => nodes_len(&element.children),
    }
}

fn nodes_len(nodes: &[Node]) -> usize {
    nodes.iter().map(node_len).sum()
}

/// Elements along `path`, starting with `root`.
pub(crate) fn element_chain<'a>(root: &'a Element, path: &[usize]) -> Vec<&'a Element> {
    let mut chain = vec![root];
    let mut current = root;
    for idx in path {
        match current.children.get(*idx).and_then(Node::as_element) {
            Some(next) => {
                chain.push(next);
                current = next;
            }
            None => break,
        }
    }
    chain
}

/// An inline wrapper element without its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Mark {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl Mark {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    fn from_element(element: &Element) -> Self {
        Self {
            tag: element.tag.clone(),
            attrs: element.attrs.clone(),
        }
    }

    fn to_element(&self) -> Element {
        Element {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        let mut element = self.to_element();
        element.set_attr(name, value);
        self.attrs = element.attrs;
    }

    pub fn style_property(&self, property: &str) -> Option<String> {
        style_declarations(self.attr("style")?)
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    pub fn set_style_property(&mut self, property: &str, value: &str) {
        let mut element = self.to_element();
        element.set_style_property(property, value);
        self.attrs = element.attrs;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum RunKind {
    Text(String),
    /// A node that is never split: void elements, empty wrappers, comments
    /// and raw text elements.
    Atom(Node),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Run {
    pub kind: RunKind,
    pub marks: Vec<Mark>,
}

impl Run {
    pub fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            kind: RunKind::Text(text.into()),
            marks,
        }
    }

    pub fn atom(node: Node, marks: Vec<Mark>) -> Self {
        Self {
            kind: RunKind::Atom(node),
            marks,
        }
    }

    pub fn len(&self) -> usize {
        match &self.kind {
            RunKind::Text(text) => text.chars().count(),
            RunKind::Atom(node) => node_len(node),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(&self.kind, RunKind::Text(text) if !text.is_empty())
    }
}

pub(crate) fn flatten(nodes: &[Node]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut marks = Vec::new();
    flatten_into(nodes, &mut marks, &mut runs);
    runs
}

fn flatten_into(nodes: &[Node], marks: &mut Vec<Mark>, out: &mut Vec<Run>) {
    for node in nodes {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Text(text) => out.push(Run::text(text.clone(), marks.clone())),
            Node::Comment(_) => out.push(Run::atom(node.clone(), marks.clone())),
            Node::Element(element)
                if element.is_void() || element.is_raw_text() || element.children.is_empty() =>
            {
                out.push(Run::atom(node.clone(), marks.clone()));
            }
            Node::Element(element) => {
                marks.push(Mark::from_element(element));
                flatten_into(&element.children, marks, out);
                marks.pop();
            }
        }
    }
}

/// Rebuilds nodes from runs, nesting consecutive runs that share a mark
/// under one element and merging adjacent text.
pub(crate) fn build_nodes(runs: &[Run]) -> Vec<Node> {
    let kept: Vec<&Run> = runs
        .iter()
        .filter(|run| !matches!(&run.kind, RunKind::Text(text) if text.is_empty()))
        .collect();
    let mut out = Vec::new();
    build_level(&kept, 0, &mut out);
    out
}

fn build_level(runs: &[&Run], depth: usize, out: &mut Vec<Node>) {
    let mut idx = 0;
    while idx < runs.len() {
        let Some(mark) = runs[idx].marks.get(depth) else {
            match &runs[idx].kind {
                RunKind::Text(text) => {
                    if let Some(Node::Text(previous)) = out.last_mut() {
                        previous.push_str(text);
                    } else {
                        out.push(Node::Text(text.clone()));
                    }
                }
                RunKind::Atom(node) => out.push(node.clone()),
            }
            idx += 1;
            continue;
        };

        let mut end = idx + 1;
        while end < runs.len() && runs[end].marks.get(depth) == Some(mark) {
            end += 1;
        }
        let mut element = mark.to_element();
        build_level(&runs[idx..end], depth + 1, &mut element.children);
        if !element.children.is_empty() {
            out.push(Node::Element(element));
        }
        idx = end;
    }
}

/// Splits runs so that one starts exactly at `offset` and returns its index.
pub(crate) fn split_runs(runs: &mut Vec<Run>, offset: usize) -> usize {
    let mut acc = 0;
    for idx in 0..runs.len() {
        if acc == offset {
            return idx;
        }
        let len = runs[idx].len();
        if offset < acc + len {
            if let RunKind::Text(text) = &runs[idx].kind {
                let (head, tail) = split_text(text, offset - acc);
                let mut second = runs[idx].clone();
                second.kind = RunKind::Text(tail);
                runs[idx].kind = RunKind::Text(head);
                runs.insert(idx + 1, second);
            }
            return idx + 1;
        }
        acc += len;
    }
    runs.len()
}

pub(crate) fn runs_len(runs: &[Run]) -> usize {
    runs.iter().map(Run::len).sum()
}

/// Removes the content between two offsets.
pub(crate) fn remove_range(runs: &mut Vec<Run>, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let from = split_runs(runs, start);
    let to = split_runs(runs, end);
    runs.drain(from..to);
}

/// Marks a character typed at `offset` picks up: those of the character
/// before it, or of the first character when typing at the start. Typing at
/// either edge of a link does not extend the link.
pub(crate) fn insertion_marks(runs: &[Run], offset: usize) -> Vec<Mark> {
    let mut acc = 0;
    let mut first = None;
    for (idx, run) in runs.iter().enumerate() {
        let len = run.len();
        if len == 0 {
            continue;
        }
        if first.is_none() {
            first = Some(run);
        }
        if acc < offset && offset <= acc + len {
            let mut marks = run.marks.clone();
            if offset == acc + len {
                let next = runs[idx + 1..].iter().find(|next| next.len() > 0);
                marks.retain(|mark| {
                    mark.tag != "a" || next.is_some_and(|next| next.marks.contains(mark))
                });
            }
            return marks;
        }
        acc += len;
    }
    match first {
        Some(run) if offset == 0 => run
            .marks
            .iter()
            .filter(|mark| mark.tag != "a")
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn runs_in(root: &Element, container: &Container) -> Vec<Run> {
    root.descendant(&container.parent)
        .and_then(|parent| parent.children.get(container.range.clone()))
        .map(flatten)
        .unwrap_or_default()
}

/// Writes runs back over a container's nodes.
pub(crate) fn replace_runs(root: &mut Element, container: &Container, runs: &[Run]) {
    let Some(parent) = root.descendant_mut(&container.parent) else {
        return;
    };
    let end = container.range.end.min(parent.children.len());
    let start = container.range.start.min(end);
    parent.children.splice(start..end, build_nodes(runs));
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod layout_tests;

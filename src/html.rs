//! Minimal HTML DOM used as the editing surface's host document.
//!
//! The tree is deliberately small: elements, text and comments hanging off an
//! unnamed root element. [`parse`] never fails and [`serialize`] writes the
//! inner HTML of the root the same way every time, so the pair behaves like a
//! browser's `innerHTML` setter and getter.

mod entities;
mod parser;
mod serialize;

pub use entities::decode_entities;
pub use parser::parse;
pub use serialize::{escape_attribute, escape_text, serialize, serialize_node};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, Node::Text(text) if text.chars().all(char::is_whitespace))
    }

    /// True for elements that take part in block layout, either because of
    /// their tag or because they wrap block content.
    pub fn is_block_level(&self) -> bool {
        match self {
            Node::Element(element) => element.is_block() || element.contains_block(),
            _ => false,
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            for child in &element.children {
                collect_text(child, out);
            }
        }
        Node::Comment(_) => {}
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The unnamed container that holds a parsed fragment.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_root(&self) -> bool {
        self.tag.is_empty()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(existing) = self.attrs.iter_mut().find(|(key, _)| key == name) {
            existing.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Value of one declaration in the inline `style` attribute.
    pub fn style_property(&self, property: &str) -> Option<String> {
        let style = self.attr("style")?;
        style_declarations(style)
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    pub fn set_style_property(&mut self, property: &str, value: &str) {
        let mut declarations = self
            .attr("style")
            .map(style_declarations)
            .unwrap_or_default();
        if let Some(existing) = declarations
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
        {
            existing.1 = value.to_string();
        } else {
            declarations.push((property.to_string(), value.to_string()));
        }
        self.set_attr("style", &format_declarations(&declarations));
    }

    pub fn remove_style_property(&mut self, property: &str) {
        let Some(style) = self.attr("style") else {
            return;
        };
        let declarations: Vec<_> = style_declarations(style)
            .into_iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case(property))
            .collect();
        if declarations.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", &format_declarations(&declarations));
        }
    }

    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    pub fn is_block(&self) -> bool {
        is_block_tag(&self.tag)
    }

    pub fn is_raw_text(&self) -> bool {
        is_raw_text_tag(&self.tag)
    }

    pub fn contains_block(&self) -> bool {
        self.children.iter().any(Node::is_block_level)
    }

    /// Follows a path of child indices down from this element.
    pub fn descendant(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for idx in path {
            current = current.children.get(*idx)?.as_element()?;
        }
        Some(current)
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for idx in path {
            current = current.children.get_mut(*idx)?.as_element_mut()?;
        }
        Some(current)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            collect_text(child, &mut out);
        }
        out
    }
}

pub(crate) fn style_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() {
                None
            } else {
                Some((name.to_ascii_lowercase(), value.to_string()))
            }
        })
        .collect()
}

fn format_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

pub fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "textarea" | "title")
}

pub fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "dd"
            | "details"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "html"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "summary"
            | "table"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
            | "ul"
    )
}

pub fn is_heading_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

pub fn is_list_tag(tag: &str) -> bool {
    matches!(tag, "ul" | "ol")
}

/// Returns the children of `<body>` when the fragment is a full document,
/// otherwise the fragment unchanged.
pub fn extract_body(root: Element) -> Element {
    fn find_body(element: &Element) -> Option<&Element> {
        for child in &element.children {
            if let Node::Element(child) = child {
                if child.tag == "body" {
                    return Some(child);
                }
                if child.tag == "html"
                    && let Some(body) = find_body(child)
                {
                    return Some(body);
                }
            }
        }
        None
    }

    match find_body(&root) {
        Some(body) => Element::root().with_children(body.children.clone()),
        None => root,
    }
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod html_tests;

use super::{Element, Node, decode_entities, is_block_tag, is_raw_text_tag, is_void_tag};

/// Parses an HTML fragment into a root element.
///
/// Parsing never fails. Malformed markup is repaired the way browsers repair
/// it: unknown end tags are dropped, open elements are closed at the end of
/// input and an open paragraph is closed when a block starts inside it.
pub fn parse(input: &str) -> Element {
    let mut builder = TreeBuilder::new();
    let mut rest = input;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            builder.push_text(&decode_entities(rest));
            break;
        };
        if lt > 0 {
            builder.push_text(&decode_entities(&rest[..lt]));
            rest = &rest[lt..];
        }

        if let Some(after) = rest.strip_prefix("<!--") {
            let (comment, remaining) = match after.find("-->") {
                Some(end) => (&after[..end], &after[end + 3..]),
                None => (after, ""),
            };
            builder.push_comment(comment);
            rest = remaining;
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            // Doctype and processing instructions carry no content.
            rest = match rest.find('>') {
                Some(end) => &rest[end + 1..],
                None => "",
            };
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            if after.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
                let end = after.find('>').unwrap_or(after.len());
                let name = tag_name(&after[..end]);
                builder.close(&name);
                rest = after.get(end + 1..).unwrap_or("");
            } else {
                builder.push_text("</");
                rest = after;
            }
            continue;
        }

        let after = &rest[1..];
        if !after.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            builder.push_text("<");
            rest = after;
            continue;
        }

        let (tag, consumed) = read_start_tag(after);
        rest = &after[consumed..];

        if is_raw_text_tag(&tag.name) && !tag.self_closing {
            let (raw, remaining) = split_raw_text(rest, &tag.name);
            let mut element = Element::new(tag.name);
            element.attrs = tag.attrs;
            if !raw.is_empty() {
                element.children.push(Node::Text(raw.to_string()));
            }
            builder.append(Node::Element(element));
            rest = remaining;
            continue;
        }

        builder.open(tag);
    }

    builder.finish()
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
}

fn tag_name(raw: &str) -> String {
    raw.split(|ch: char| ch.is_whitespace() || ch == '/' || ch == '>')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Reads a start tag that begins right after `<`. Returns the tag and the
/// number of bytes consumed including the closing `>`.
fn read_start_tag(input: &str) -> (StartTag, usize) {
    let bytes = input.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() && !is_name_terminator(bytes[idx]) {
        idx += 1;
    }
    let name = input[..idx].to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
            idx += 1;
        }
        if idx >= bytes.len() {
            break;
        }
        match bytes[idx] {
            b'>' => {
                idx += 1;
                break;
            }
            b'/' => {
                idx += 1;
                if bytes.get(idx) == Some(&b'>') {
                    self_closing = true;
                }
                continue;
            }
            _ => {}
        }

        let name_start = idx;
        while idx < bytes.len()
            && !bytes[idx].is_ascii_whitespace()
            && !matches!(bytes[idx], b'=' | b'>' | b'/')
        {
            idx += 1;
        }
        if idx == name_start {
            // A lone `=` cannot start an attribute; skip it.
            idx += 1;
            continue;
        }
        let attr_name = input[name_start..idx].to_ascii_lowercase();

        while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
            idx += 1;
        }
        let mut value = String::new();
        if bytes.get(idx) == Some(&b'=') {
            idx += 1;
            while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
                idx += 1;
            }
            match bytes.get(idx) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    idx += 1;
                    let value_start = idx;
                    while idx < bytes.len() && bytes[idx] != quote {
                        idx += 1;
                    }
                    value = decode_entities(&input[value_start..idx]);
                    if idx < bytes.len() {
                        idx += 1;
                    }
                }
                _ => {
                    let value_start = idx;
                    while idx < bytes.len()
                        && !bytes[idx].is_ascii_whitespace()
                        && bytes[idx] != b'>'
                    {
                        idx += 1;
                    }
                    value = decode_entities(&input[value_start..idx]);
                }
            }
        }

        if !attrs.iter().any(|(existing, _)| *existing == attr_name) {
            attrs.push((attr_name, value));
        }
    }

    (
        StartTag {
            name,
            attrs,
            self_closing,
        },
        idx,
    )
}

fn is_name_terminator(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'/' || byte == b'>'
}

/// Splits raw text content off at the matching end tag.
fn split_raw_text<'a>(input: &'a str, name: &str) -> (&'a str, &'a str) {
    let lower = input.to_ascii_lowercase();
    let needle = format!("</{name}");
    match lower.find(&needle) {
        Some(start) => {
            let after_name = &input[start + needle.len()..];
            let remaining = match after_name.find('>') {
                Some(end) => &after_name[end + 1..],
                None => "",
            };
            (&input[..start], remaining)
        }
        None => (input, ""),
    }
}

struct TreeBuilder {
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::root()],
        }
    }

    fn current(&mut self) -> &mut Element {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn append(&mut self, node: Node) {
        self.current().children.push(node);
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let current = self.current();
        if let Some(Node::Text(existing)) = current.children.last_mut() {
            existing.push_str(text);
        } else {
            current.children.push(Node::Text(text.to_string()));
        }
    }

    fn push_comment(&mut self, text: &str) {
        self.append(Node::Comment(text.to_string()));
    }

    fn open(&mut self, tag: StartTag) {
        self.close_implied(&tag.name);

        let mut element = Element::new(tag.name);
        element.attrs = tag.attrs;
        if element.is_void() {
            self.append(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    fn close_implied(&mut self, name: &str) {
        if is_block_tag(name) || name == "table" {
            // An open paragraph ends when a block starts inside it.
            if let Some(idx) = self.position_of("p")
                && self.stack[idx + 1..].iter().all(|el| !el.is_block())
            {
                self.pop_to(idx);
            }
        }

        match name {
            "li" => self.close_sibling("li", &["ul", "ol"]),
            "dt" | "dd" => {
                self.close_sibling("dt", &["dl"]);
                self.close_sibling("dd", &["dl"]);
            }
            "tr" => self.close_sibling("tr", &["table", "tbody", "thead", "tfoot"]),
            "td" | "th" => {
                self.close_sibling("td", &["tr", "table"]);
                self.close_sibling("th", &["tr", "table"]);
            }
            "option" => self.close_sibling("option", &["select"]),
            _ => {}
        }
    }

    /// Closes an open `name` element unless one of `boundaries` sits between
    /// it and the top of the stack.
    fn close_sibling(&mut self, name: &str, boundaries: &[&str]) {
        for idx in (1..self.stack.len()).rev() {
            let tag = self.stack[idx].tag.as_str();
            if tag == name {
                self.pop_to(idx);
                return;
            }
            if boundaries.contains(&tag) {
                return;
            }
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        (1..self.stack.len())
            .rev()
            .find(|idx| self.stack[*idx].tag == name)
    }

    /// Pops elements down to and including `idx`, attaching each to its
    /// parent.
    fn pop_to(&mut self, idx: usize) {
        while self.stack.len() > idx.max(1) {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(element) = self.stack.pop() {
            self.append(Node::Element(element));
        }
    }

    fn close(&mut self, name: &str) {
        if let Some(idx) = self.position_of(name) {
            self.pop_to(idx);
            return;
        }
        match name {
            "p" => self.append(Node::Element(Element::new("p"))),
            "br" => self.append(Node::Element(Element::new("br"))),
            _ => {}
        }
    }

    fn finish(mut self) -> Element {
        self.pop_to(1);
        self.stack.pop().unwrap_or_default()
    }
}

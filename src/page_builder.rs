//! The page builder form that owns element content and hosts the editor.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::editor::{EditorProps, RichTextEditor};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Heading,
    Text,
    Image,
    Button,
}

impl ElementKind {
    /// Kinds whose content is rich text.
    pub fn is_rich_text(self) -> bool {
        matches!(self, ElementKind::Heading | ElementKind::Text)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementContent {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub content: ElementContent,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageForm {
    pub title: String,
    pub slug: String,
    pub elements: Vec<PageElement>,
    #[serde(skip)]
    pub dirty: bool,
}

/// Holds the form and, at most, one open editor bound to an element's
/// `content.text`.
#[derive(Debug)]
pub struct PageBuilder {
    form: Rc<RefCell<PageForm>>,
    open: Option<(usize, RichTextEditor)>,
    next_id: usize,
}

impl PageBuilder {
    pub fn new(form: PageForm) -> Self {
        let next_id = form.elements.len() + 1;
        Self {
            form: Rc::new(RefCell::new(form)),
            open: None,
            next_id,
        }
    }

    pub fn form(&self) -> Ref<'_, PageForm> {
        self.form.borrow()
    }

    pub fn add_element(&mut self, kind: ElementKind) -> usize {
        let mut form = self.form.borrow_mut();
        form.elements.push(PageElement {
            id: format!("element-{}", self.next_id),
            kind,
            content: ElementContent::default(),
        });
        form.dirty = true;
        self.next_id += 1;
        form.elements.len() - 1
    }

    /// Opens the editor on element `index`, closing any editor already open.
    /// Every change is written straight into the element's `content.text`.
    pub fn open_editor(&mut self, index: usize) -> Option<&mut RichTextEditor> {
        let (value, kind) = {
            let form = self.form.borrow();
            let element = form.elements.get(index)?;
            (element.content.text.clone(), element.kind)
        };
        if !kind.is_rich_text() {
            debug!(index, ?kind, "element has no rich text");
            return None;
        }
        self.close_editor();

        let form = Rc::clone(&self.form);
        let props = EditorProps::new(value, move |content: &str| {
            let mut form = form.borrow_mut();
            if let Some(element) = form.elements.get_mut(index) {
                element.content.text = content.to_string();
                form.dirty = true;
            }
        });
        let editor = RichTextEditor::new(props);
        debug!(index, "element editor opened");
        self.open = Some((index, editor));
        self.open.as_mut().map(|(_, editor)| editor)
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open.as_ref().map(|(index, _)| *index)
    }

    pub fn editor_mut(&mut self) -> Option<&mut RichTextEditor> {
        self.open.as_mut().map(|(_, editor)| editor)
    }

    /// Drops the open editor, handing its content off to the form.
    pub fn close_editor(&mut self) -> Option<String> {
        let (index, editor) = self.open.take()?;
        let content = editor.into_value();
        let mut form = self.form.borrow_mut();
        if let Some(element) = form.elements.get_mut(index)
            && element.content.text != content
        {
            element.content.text = content.clone();
            form.dirty = true;
        }
        Some(content)
    }

    /// Closes the editor and returns the form as it would be submitted.
    pub fn submit(&mut self) -> PageForm {
        self.close_editor();
        let mut form = self.form.borrow_mut();
        form.dirty = false;
        form.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn builder() -> PageBuilder {
        PageBuilder::new(PageForm {
            title: "Dịch vụ".to_string(),
            slug: "dich-vu".to_string(),
            elements: vec![
                PageElement {
                    id: "element-1".to_string(),
                    kind: ElementKind::Text,
                    content: ElementContent {
                        text: "<p>Intro</p>".to_string(),
                        ..ElementContent::default()
                    },
                },
                PageElement {
                    id: "element-2".to_string(),
                    kind: ElementKind::Image,
                    content: ElementContent {
                        image_url: Some("/hero.png".to_string()),
                        ..ElementContent::default()
                    },
                },
            ],
            dirty: false,
        })
    }

    #[test]
    fn edits_flow_into_the_element_content() {
        let mut builder = builder();
        let editor = builder.open_editor(0).expect("editor");
        assert_eq!(editor.value(), "<p>Intro</p>");
        editor.execute("formatBlock", Some("<h2>"));
        assert_eq!(builder.form().elements[0].content.text, "<h2>Intro</h2>");
        assert!(builder.form().dirty);
    }

    #[test]
    fn only_rich_text_elements_open_an_editor() {
        let mut builder = builder();
        assert!(builder.open_editor(1).is_none());
        assert!(builder.open_editor(9).is_none());
        assert_eq!(builder.open_index(), None);
    }

    #[test]
    fn opening_another_element_hands_off_the_first() {
        let mut builder = builder();
        let heading = builder.add_element(ElementKind::Heading);
        assert_eq!(builder.form().elements[heading].id, "element-3");

        if let Some(editor) = builder.open_editor(0) {
            editor.move_caret(crate::editor::Movement::DocumentEnd, false);
            editor.insert_text("!");
        }
        builder.open_editor(heading);
        assert_eq!(builder.open_index(), Some(heading));
        assert_eq!(builder.form().elements[0].content.text, "<p>Intro!</p>");

        if let Some(editor) = builder.editor_mut() {
            editor.insert_text("Title");
        }
        assert_eq!(builder.close_editor().as_deref(), Some("Title"));
        assert_eq!(builder.close_editor(), None);
    }

    #[test]
    fn submitted_forms_use_camel_case() {
        let mut builder = builder();
        builder.open_editor(0);
        let form = builder.submit();
        assert!(!form.dirty);
        assert_eq!(builder.open_index(), None);

        let value = serde_json::to_value(&form).expect("serialize");
        assert_eq!(value["elements"][1]["type"], json!("image"));
        assert_eq!(value["elements"][1]["content"]["imageUrl"], json!("/hero.png"));
        assert!(value["elements"][0]["content"].get("imageUrl").is_none());
        assert!(value.get("dirty").is_none());
    }
}

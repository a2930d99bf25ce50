use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::command::CommandName;
use crate::sync::strip_tags;
use crate::toolbar::TOOLBAR;

type Changes = Rc<RefCell<Vec<String>>>;

fn editor_with(value: &str) -> (RichTextEditor, Changes) {
    let changes: Changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let props = EditorProps::new(value, move |content: &str| sink.borrow_mut().push(content.to_string()));
    (RichTextEditor::new(props), changes)
}

fn surface_content(editor: &RichTextEditor) -> String {
    editor
        .surface()
        .map(EditingSurface::serialized_content)
        .unwrap_or_default()
}

#[test]
fn initial_value_round_trips_without_notifying() {
    let value = "<h1>Welcome</h1><p>Hello <b>World</b></p><ul><li>one</li></ul>";
    let (editor, changes) = editor_with(value);
    assert_eq!(surface_content(&editor), value);
    assert_eq!(editor.value(), value);
    assert!(changes.borrow().is_empty());
}

#[test]
fn malformed_initial_values_are_repaired_on_the_surface() {
    let (editor, changes) = editor_with("<p>Hello <b>World");
    assert_eq!(surface_content(&editor), "<p>Hello <b>World</b></p>");
    assert!(changes.borrow().is_empty());
}

#[test]
fn every_command_notifies_exactly_once_with_the_new_content() {
    let commands = [
        ("bold", None),
        ("italic", None),
        ("underline", None),
        ("strikethrough", None),
        ("justifyLeft", None),
        ("justifyCenter", None),
        ("justifyRight", None),
        ("insertUnorderedList", None),
        ("insertOrderedList", None),
        ("formatBlock", Some("<h1>")),
        ("createLink", Some("https://example.com")),
        ("insertImage", Some("/logo.png")),
        ("foreColor", Some("#ff0000")),
        ("hiliteColor", Some("#ffff00")),
        ("undo", None),
        ("redo", None),
    ];
    for (name, argument) in commands {
        let (mut editor, changes) = editor_with("<p>Hello World</p>");
        editor.select_all();
        let outcome = editor.execute(name, argument);
        assert!(outcome.was_dispatched(), "{name}");
        assert!(editor.surface().is_some_and(EditingSurface::is_focused));

        let changes = changes.borrow();
        assert_eq!(changes.len(), 1, "{name}");
        assert_eq!(changes[0], surface_content(&editor), "{name}");
        assert_eq!(editor.value(), changes[0]);
    }
}

#[test]
fn unknown_commands_notify_without_changing_content() {
    let (mut editor, changes) = editor_with("<p>x</p>");
    editor.execute("explode", Some("now"));
    assert_eq!(*changes.borrow(), vec!["<p>x</p>".to_string()]);
}

#[test]
fn cancelled_or_empty_prompts_change_nothing() {
    for command in [
        CommandName::CreateLink,
        CommandName::InsertImage,
        CommandName::ForeColor,
        CommandName::HiliteColor,
    ] {
        let (mut editor, changes) = editor_with("<p>Hello</p>");
        editor.select_all();
        let item = TOOLBAR
            .iter()
            .find(|item| item.command == command)
            .expect("toolbar item");

        assert_eq!(editor.toolbar_action(item), None);
        assert!(editor.prompt().is_some());
        editor.cancel_prompt();
        assert!(editor.prompt().is_none());

        editor.toolbar_action(item);
        if let Some(prompt) = editor.prompt_mut() {
            prompt.insert_str("   ");
        }
        assert_eq!(editor.submit_prompt(), None);

        assert_eq!(editor.execute(command.as_str(), None), Dispatch::MissingArgument);
        assert!(changes.borrow().is_empty());
        assert_eq!(surface_content(&editor), "<p>Hello</p>");
        assert!(!editor.snapshot().can_undo);
    }
}

#[test]
fn submitted_prompts_dispatch_once() {
    let (mut editor, changes) = editor_with("<p>docs</p>");
    editor.select_all();
    editor.open_prompt(PromptKind::Link);
    if let Some(prompt) = editor.prompt_mut() {
        prompt.insert_str("https://docs.rs");
    }
    let outcome = editor.submit_prompt();
    assert_eq!(outcome, Some(Dispatch::Applied { changed: true }));
    assert_eq!(
        *changes.borrow(),
        vec!["<p><a href=\"https://docs.rs\">docs</a></p>".to_string()]
    );
    assert!(editor.prompt().is_none());
}

#[test]
fn link_prompts_start_with_the_current_link() {
    let (mut editor, _) = editor_with("<p><a href=\"/about\">About</a></p>");
    editor.set_selection(Selection::caret(2));
    editor.open_prompt(PromptKind::Link);
    assert_eq!(editor.prompt().map(PromptDialog::input), Some("/about"));
}

#[test]
fn preview_round_trip_leaves_content_identical() {
    let value = "<p>Hello <b>World</b></p><p style=\"text-align: center;\">x</p>";
    let (mut editor, changes) = editor_with(value);
    editor.set_selection(Selection::new(2, 5));

    editor.toggle_mode();
    assert_eq!(editor.mode(), Mode::Preview);
    assert!(editor.surface().is_none());
    assert_eq!(editor.value(), value);
    assert_eq!(editor.snapshot().selection, None);

    editor.toggle_mode();
    assert_eq!(editor.mode(), Mode::Editing);
    assert_eq!(editor.value(), value);
    assert_eq!(surface_content(&editor), value);
    assert_eq!(editor.snapshot().selection, Some(Selection::caret(0)));
    assert!(changes.borrow().is_empty());
}

#[test]
fn edits_made_before_previewing_reach_the_parent() {
    let (mut editor, changes) = editor_with("<p>a</p>");
    editor.move_caret(Movement::DocumentEnd, false);
    editor.insert_text("b");
    editor.toggle_mode();
    assert_eq!(editor.value(), "<p>ab</p>");
    assert_eq!(changes.borrow().last().map(String::as_str), Some("<p>ab</p>"));
}

#[test]
fn commands_in_preview_are_silent_no_ops() {
    let (mut editor, changes) = editor_with("<p>x</p>");
    editor.toggle_mode();
    assert_eq!(editor.execute("bold", None), Dispatch::Unmounted);
    assert!(!editor.insert_text("y"));
    editor.open_prompt(PromptKind::Image);
    assert!(editor.prompt().is_none());
    assert!(changes.borrow().is_empty());
    assert_eq!(editor.value(), "<p>x</p>");
}

#[test]
fn character_count_ignores_markup() {
    let (editor, _) = editor_with("<p>Hello <b>World</b></p>");
    assert_eq!(editor.character_count(), 11);
}

#[test]
fn heading_typed_into_an_empty_document() {
    let (mut editor, changes) = editor_with("");
    assert!(editor.shows_placeholder());
    editor.execute("formatBlock", Some("<h1>"));
    for ch in "Title".chars() {
        editor.insert_text(&ch.to_string());
    }

    let changes = changes.borrow();
    let last = changes.last().expect("on_change was called");
    assert_eq!(strip_tags(last), "Title");
    assert!(last.contains("<h1>"));
    assert_eq!(editor.character_count(), 5);
    assert!(!editor.shows_placeholder());
}

#[test]
fn typing_notifies_once_per_keystroke() {
    let (mut editor, changes) = editor_with("<p></p>");
    editor.insert_text("a");
    editor.insert_text("b");
    editor.insert_paragraph();
    editor.delete_backward();
    assert_eq!(
        *changes.borrow(),
        vec![
            "<p>a</p>".to_string(),
            "<p>ab</p>".to_string(),
            "<p>ab</p><p></p>".to_string(),
            "<p>ab</p>".to_string(),
        ]
    );
}

#[test]
fn echoed_values_keep_the_caret() {
    let (mut editor, changes) = editor_with("<p>abc</p>");
    editor.move_caret(Movement::DocumentEnd, false);
    editor.insert_text("d");
    let echoed = changes.borrow().last().cloned().unwrap_or_default();
    editor.set_value(&echoed);
    assert_eq!(editor.snapshot().selection, Some(Selection::caret(4)));
    assert!(editor.snapshot().can_undo);
}

#[test]
fn external_values_reinitialize_the_surface() {
    let (mut editor, changes) = editor_with("<p>abc</p>");
    editor.move_caret(Movement::DocumentEnd, false);
    editor.set_value("<h2>Other</h2>");
    assert_eq!(surface_content(&editor), "<h2>Other</h2>");
    assert_eq!(editor.snapshot().selection, Some(Selection::caret(0)));
    assert_eq!(editor.snapshot().block.as_deref(), Some("h2"));
    assert!(changes.borrow().is_empty());
}

#[test]
fn toolbar_state_follows_the_caret() {
    let (mut editor, _) = editor_with("<p><i>slanted</i> upright</p>");
    editor.set_selection(Selection::caret(3));
    assert!(editor.snapshot().italic);
    editor.move_caret(Movement::LineEnd, false);
    assert!(!editor.snapshot().italic);
}

#[test]
fn history_limit_applies_to_remounted_surfaces() {
    let (mut editor, _) = editor_with("<p>abc</p>");
    editor.set_history_limit(1);
    editor.toggle_mode();
    editor.toggle_mode();
    editor.select_all();
    editor.execute("bold", None);
    editor.execute("italic", None);
    editor.execute("undo", None);
    assert!(!editor.snapshot().can_undo);
}

#[test]
fn into_value_hands_off_the_latest_content() {
    let (mut editor, _) = editor_with("<p></p>");
    editor.insert_text("done");
    assert_eq!(editor.into_value(), "<p>done</p>");
}

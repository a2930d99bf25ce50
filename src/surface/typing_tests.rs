use crate::command::InlineFormat;
use crate::selection::Selection;
use crate::surface::EditingSurface;

fn surface_at(content: &str, caret: usize) -> EditingSurface {
    let mut surface = EditingSurface::from_content(content);
    surface.set_selection(Selection::caret(caret));
    surface
}

#[test]
fn typing_into_an_empty_document_creates_loose_text() {
    let mut surface = surface_at("", 0);
    assert!(surface.insert_text("Title"));
    assert_eq!(surface.serialized_content(), "Title");
    assert_eq!(surface.selection(), Selection::caret(5));
}

#[test]
fn typing_inserts_at_the_caret() {
    let mut surface = surface_at("<p>Hello World</p>", 5);
    surface.insert_text(",");
    assert_eq!(surface.serialized_content(), "<p>Hello, World</p>");
    assert_eq!(surface.selection(), Selection::caret(6));
}

#[test]
fn typing_continues_the_formatting_before_the_caret() {
    let mut surface = surface_at("<p>Hello <b>World</b></p>", 11);
    surface.insert_text("!");
    assert_eq!(surface.serialized_content(), "<p>Hello <b>World!</b></p>");
}

#[test]
fn typing_at_the_end_of_a_link_does_not_extend_it() {
    let mut surface = surface_at("<p><a href=\"/x\">link</a></p>", 4);
    surface.insert_text("s");
    assert_eq!(surface.serialized_content(), "<p><a href=\"/x\">link</a>s</p>");
}

#[test]
fn typing_replaces_the_selection() {
    let mut surface = EditingSurface::from_content("<p>Hello World</p>");
    surface.set_selection(Selection::new(6, 11));
    surface.insert_text("Rust");
    assert_eq!(surface.serialized_content(), "<p>Hello Rust</p>");
}

#[test]
fn newlines_in_typed_text_split_blocks() {
    let mut surface = surface_at("", 0);
    surface.insert_text("a\nb");
    assert_eq!(surface.serialized_content(), "<p>a</p><p>b</p>");
    assert_eq!(surface.selection(), Selection::caret(3));
}

#[test]
fn enter_splits_the_current_block() {
    let mut surface = surface_at("<p>Hello World</p>", 5);
    assert!(surface.insert_paragraph());
    assert_eq!(surface.serialized_content(), "<p>Hello</p><p> World</p>");
    assert_eq!(surface.selection(), Selection::caret(6));
}

#[test]
fn enter_at_the_end_of_a_heading_starts_a_paragraph() {
    let mut surface = surface_at("<h1 id=\"top\">Title</h1>", 5);
    surface.insert_paragraph();
    assert_eq!(surface.serialized_content(), "<h1 id=\"top\">Title</h1><p></p>");
    surface.insert_text("Body");
    assert_eq!(surface.serialized_content(), "<h1 id=\"top\">Title</h1><p>Body</p>");
}

#[test]
fn enter_in_loose_text_wraps_both_halves_in_paragraphs() {
    let mut surface = surface_at("abc", 1);
    surface.insert_paragraph();
    assert_eq!(surface.serialized_content(), "<p>a</p><p>bc</p>");
}

#[test]
fn enter_on_an_empty_last_item_leaves_the_list() {
    let mut surface = surface_at("<ul><li>one</li><li></li></ul>", 4);
    surface.insert_paragraph();
    assert_eq!(surface.serialized_content(), "<ul><li>one</li></ul><p></p>");
    assert_eq!(surface.selection(), Selection::caret(4));
}

#[test]
fn enter_inside_preformatted_text_inserts_a_newline() {
    let mut surface = surface_at("<pre>ab</pre>", 1);
    surface.insert_paragraph();
    assert_eq!(surface.serialized_content(), "<pre>a\nb</pre>");
}

#[test]
fn shift_enter_inserts_a_line_break() {
    let mut surface = surface_at("<p>ab</p>", 1);
    assert!(surface.insert_line_break());
    assert_eq!(surface.serialized_content(), "<p>a<br>b</p>");
    assert_eq!(surface.selection(), Selection::caret(2));
}

#[test]
fn backspace_removes_the_previous_character() {
    let mut surface = surface_at("<p>abc</p>", 2);
    assert!(surface.delete_backward());
    assert_eq!(surface.serialized_content(), "<p>ac</p>");
    assert_eq!(surface.selection(), Selection::caret(1));
}

#[test]
fn backspace_at_a_block_start_merges_with_the_previous_block() {
    let mut surface = surface_at("<p>ab</p><p>cd</p>", 3);
    surface.delete_backward();
    assert_eq!(surface.serialized_content(), "<p>abcd</p>");
    assert_eq!(surface.selection(), Selection::caret(2));
}

#[test]
fn delete_at_a_block_end_pulls_the_next_block_in() {
    let mut surface = surface_at("<p>ab</p><p><i>cd</i></p>", 2);
    assert!(surface.delete_forward());
    assert_eq!(surface.serialized_content(), "<p>ab<i>cd</i></p>");
}

#[test]
fn deletion_at_the_document_edges_does_nothing() {
    let mut surface = surface_at("<p>ab</p>", 0);
    assert!(!surface.delete_backward());
    surface.move_to_end(false);
    assert!(!surface.delete_forward());
    assert!(!surface.delete_selection());
}

#[test]
fn deleting_across_blocks_drops_emptied_lists() {
    let mut surface = EditingSurface::from_content("<p>one</p><ul><li>two</li></ul><p>three</p>");
    surface.set_selection(Selection::new(2, 10));
    assert!(surface.delete_selection());
    assert_eq!(surface.serialized_content(), "<p>onree</p>");
    assert_eq!(surface.selection(), Selection::caret(2));
}

#[test]
fn collapsed_toggles_style_the_next_typed_text() {
    let mut surface = surface_at("<p>ab</p>", 2);
    assert!(!surface.toggle_format(InlineFormat::Bold));
    surface.insert_text("c");
    assert_eq!(surface.serialized_content(), "<p>ab<b>c</b></p>");

    surface.toggle_format(InlineFormat::Bold);
    surface.insert_text("d");
    assert_eq!(surface.serialized_content(), "<p>ab<b>c</b>d</p>");
}

#[test]
fn caret_moves_forget_the_typing_style() {
    let mut surface = surface_at("<p>ab</p>", 2);
    surface.toggle_format(InlineFormat::Italic);
    surface.move_left(false);
    surface.insert_text("x");
    assert_eq!(surface.serialized_content(), "<p>axb</p>");
}

#[test]
fn typing_runs_undo_as_one_step() {
    let mut surface = surface_at("<p></p>", 0);
    surface.insert_text("a");
    surface.insert_text("b");
    surface.insert_text("c");
    assert_eq!(surface.serialized_content(), "<p>abc</p>");

    assert!(surface.undo());
    assert_eq!(surface.serialized_content(), "<p></p>");
    assert!(surface.redo());
    assert_eq!(surface.serialized_content(), "<p>abc</p>");
    assert_eq!(surface.selection(), Selection::caret(3));
}

#[test]
fn caret_moves_end_a_typing_run() {
    let mut surface = surface_at("<p></p>", 0);
    surface.insert_text("a");
    surface.move_to_start(false);
    surface.insert_text("b");
    assert_eq!(surface.serialized_content(), "<p>ba</p>");

    surface.undo();
    assert_eq!(surface.serialized_content(), "<p>a</p>");
}

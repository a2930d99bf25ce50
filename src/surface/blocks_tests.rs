use crate::command::{Alignment, ListKind};
use crate::selection::Selection;
use crate::surface::EditingSurface;

fn surface_at(content: &str, caret: usize) -> EditingSurface {
    let mut surface = EditingSurface::from_content(content);
    surface.set_selection(Selection::caret(caret));
    surface
}

fn all_selected(content: &str) -> EditingSurface {
    let mut surface = EditingSurface::from_content(content);
    surface.select_all();
    surface
}

#[test]
fn format_block_renames_the_caret_block() {
    let mut surface = surface_at("<p>Title</p>", 2);
    assert!(surface.format_block("h1"));
    assert_eq!(surface.serialized_content(), "<h1>Title</h1>");
    assert_eq!(surface.snapshot().block.as_deref(), Some("h1"));

    assert!(!surface.format_block("h1"));
}

#[test]
fn format_block_wraps_loose_text() {
    let mut surface = surface_at("Hello", 0);
    surface.format_block("h2");
    assert_eq!(surface.serialized_content(), "<h2>Hello</h2>");
}

#[test]
fn heading_on_an_empty_document_then_typing() {
    let mut surface = surface_at("", 0);
    assert!(surface.format_block("h1"));
    assert_eq!(surface.serialized_content(), "<h1></h1>");
    surface.insert_text("Title");
    assert_eq!(surface.serialized_content(), "<h1>Title</h1>");
}

#[test]
fn format_block_wraps_list_item_content() {
    let mut surface = surface_at("<ul><li>item</li></ul>", 1);
    surface.format_block("h3");
    assert_eq!(surface.serialized_content(), "<ul><li><h3>item</h3></li></ul>");
}

#[test]
fn format_block_applies_to_every_selected_block() {
    let mut surface = all_selected("<p>a</p><h1>b</h1>");
    surface.format_block("blockquote");
    assert_eq!(
        surface.serialized_content(),
        "<blockquote>a</blockquote><blockquote>b</blockquote>"
    );
}

#[test]
fn alignment_sets_and_clears_text_align() {
    let mut surface = surface_at("<p>x</p>", 0);
    assert!(surface.set_alignment(Alignment::Center));
    assert_eq!(
        surface.serialized_content(),
        "<p style=\"text-align: center;\">x</p>"
    );
    assert_eq!(surface.snapshot().alignment, Alignment::Center);

    assert!(surface.set_alignment(Alignment::Left));
    assert_eq!(surface.serialized_content(), "<p>x</p>");
    assert!(!surface.set_alignment(Alignment::Left));
}

#[test]
fn aligning_loose_text_wraps_it_in_a_div() {
    let mut surface = surface_at("x", 0);
    assert!(!surface.set_alignment(Alignment::Left));
    assert!(surface.set_alignment(Alignment::Right));
    assert_eq!(
        surface.serialized_content(),
        "<div style=\"text-align: right;\">x</div>"
    );
}

#[test]
fn alignment_keeps_other_styles() {
    let mut surface = surface_at("<p style=\"color: red;\" align=\"center\">x</p>", 0);
    surface.set_alignment(Alignment::Right);
    assert_eq!(
        surface.serialized_content(),
        "<p style=\"color: red; text-align: right;\">x</p>"
    );
}

#[test]
fn lists_wrap_and_merge_selected_paragraphs() {
    let mut surface = all_selected("<p>one</p><p>two</p>");
    assert!(surface.toggle_list(ListKind::Unordered));
    assert_eq!(
        surface.serialized_content(),
        "<ul><li>one</li><li>two</li></ul>"
    );
    assert_eq!(surface.snapshot().list, Some(ListKind::Unordered));

    surface.toggle_list(ListKind::Unordered);
    assert_eq!(surface.serialized_content(), "<p>one</p><p>two</p>");
}

#[test]
fn list_type_switches_in_place() {
    let mut surface = surface_at("<ul><li>a</li></ul>", 0);
    surface.toggle_list(ListKind::Ordered);
    assert_eq!(surface.serialized_content(), "<ol><li>a</li></ol>");
}

#[test]
fn new_items_join_an_adjacent_list() {
    let mut surface = surface_at("<ul><li>a</li></ul><p>b</p>", 2);
    surface.toggle_list(ListKind::Unordered);
    assert_eq!(surface.serialized_content(), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn existing_lists_of_the_same_type_are_not_merged() {
    let mut surface = surface_at("<ul><li>a</li></ul><ul><li>b</li></ul>", 0);
    surface.toggle_list(ListKind::Ordered);
    assert_eq!(
        surface.serialized_content(),
        "<ol><li>a</li></ol><ul><li>b</li></ul>"
    );
}

#[test]
fn unlisting_a_middle_item_splits_the_list() {
    let mut surface = surface_at("<ol><li>a</li><li>b</li><li>c</li></ol>", 2);
    surface.toggle_list(ListKind::Ordered);
    assert_eq!(
        surface.serialized_content(),
        "<ol><li>a</li></ol><p>b</p><ol><li>c</li></ol>"
    );
    assert_eq!(surface.snapshot().block.as_deref(), Some("p"));
}

#[test]
fn loose_text_and_headings_become_items() {
    let mut surface = surface_at("hello", 0);
    surface.toggle_list(ListKind::Unordered);
    assert_eq!(surface.serialized_content(), "<ul><li>hello</li></ul>");

    let mut surface = surface_at("<h2>Title</h2>", 0);
    surface.toggle_list(ListKind::Ordered);
    assert_eq!(surface.serialized_content(), "<ol><li><h2>Title</h2></li></ol>");
}

#[test]
fn snapshot_reports_block_context() {
    let surface = surface_at("<ol><li style=\"text-align: right;\">x</li></ol>", 0);
    let snapshot = surface.snapshot();
    assert_eq!(snapshot.list, Some(ListKind::Ordered));
    assert_eq!(snapshot.block.as_deref(), Some("li"));
    assert_eq!(snapshot.alignment, Alignment::Right);
}

#[test]
fn block_commands_undo_in_one_step() {
    let mut surface = all_selected("<p>one</p><p>two</p>");
    surface.toggle_list(ListKind::Ordered);
    surface.format_block("h2");
    assert!(surface.undo());
    assert_eq!(surface.serialized_content(), "<ol><li>one</li><li>two</li></ol>");
    assert!(surface.undo());
    assert_eq!(surface.serialized_content(), "<p>one</p><p>two</p>");
    assert!(!surface.undo());
}

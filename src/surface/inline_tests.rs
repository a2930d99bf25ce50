use crate::command::InlineFormat;
use crate::selection::Selection;
use crate::surface::EditingSurface;

fn surface_with_selection(content: &str, anchor: usize, focus: usize) -> EditingSurface {
    let mut surface = EditingSurface::from_content(content);
    surface.set_selection(Selection::new(anchor, focus));
    surface
}

#[test]
fn bold_toggles_on_and_off_over_a_range() {
    let mut surface = surface_with_selection("<p>Hello World</p>", 0, 5);
    assert!(surface.toggle_format(InlineFormat::Bold));
    assert_eq!(surface.serialized_content(), "<p><b>Hello</b> World</p>");
    assert!(surface.snapshot().bold);

    assert!(surface.toggle_format(InlineFormat::Bold));
    assert_eq!(surface.serialized_content(), "<p>Hello World</p>");
    assert!(!surface.snapshot().bold);
}

#[test]
fn partially_formatted_selections_get_formatted_throughout() {
    let mut surface = surface_with_selection("<p>Hello <b>World</b></p>", 0, 11);
    assert!(!surface.snapshot().bold);
    surface.toggle_format(InlineFormat::Bold);
    assert_eq!(surface.serialized_content(), "<p><b>Hello World</b></p>");
}

#[test]
fn equivalent_tags_count_as_the_format() {
    let mut surface = surface_with_selection("<p><strong>x</strong>y</p>", 0, 1);
    assert!(surface.snapshot().bold);
    surface.toggle_format(InlineFormat::Bold);
    assert_eq!(surface.serialized_content(), "<p>xy</p>");

    let mut surface = surface_with_selection("<p><del>gone</del></p>", 0, 4);
    surface.toggle_format(InlineFormat::Strikethrough);
    assert_eq!(surface.serialized_content(), "<p>gone</p>");
}

#[test]
fn formats_apply_across_blocks() {
    let mut surface = surface_with_selection("<p>ab</p><p>cd</p>", 1, 4);
    surface.toggle_format(InlineFormat::Italic);
    assert_eq!(
        surface.serialized_content(),
        "<p>a<i>b</i></p><p><i>c</i>d</p>"
    );
    assert_eq!(surface.selection(), Selection::new(1, 4));
}

#[test]
fn links_wrap_the_selection_outermost() {
    let mut surface = surface_with_selection("<p>see <b>docs</b></p>", 4, 8);
    assert!(surface.create_link("https://x.dev"));
    assert_eq!(
        surface.serialized_content(),
        "<p>see <a href=\"https://x.dev\"><b>docs</b></a></p>"
    );
    surface.set_selection(Selection::caret(6));
    assert_eq!(surface.snapshot().link.as_deref(), Some("https://x.dev"));
}

#[test]
fn relinking_replaces_the_previous_target() {
    let mut surface = surface_with_selection("<p><a href=\"/old\">text</a></p>", 0, 4);
    surface.create_link("/new");
    assert_eq!(surface.serialized_content(), "<p><a href=\"/new\">text</a></p>");
}

#[test]
fn collapsed_links_insert_the_url_as_text() {
    let mut surface = surface_with_selection("<p>go </p>", 3, 3);
    assert!(surface.create_link("/x"));
    assert_eq!(surface.serialized_content(), "<p>go <a href=\"/x\">/x</a></p>");
    assert_eq!(surface.selection(), Selection::caret(5));
}

#[test]
fn images_replace_the_selection() {
    let mut surface = surface_with_selection("<p>abc</p>", 1, 2);
    assert!(surface.insert_image("/i.png"));
    assert_eq!(surface.serialized_content(), "<p>a<img src=\"/i.png\">c</p>");
    assert_eq!(surface.selection(), Selection::caret(2));
}

#[test]
fn text_colour_replaces_earlier_colours() {
    let mut surface = surface_with_selection("<p>red</p>", 0, 3);
    surface.fore_color("#ff0000");
    assert_eq!(
        surface.serialized_content(),
        "<p><font color=\"#ff0000\">red</font></p>"
    );
    surface.fore_color("#0000ff");
    assert_eq!(
        surface.serialized_content(),
        "<p><font color=\"#0000ff\">red</font></p>"
    );
    assert_eq!(surface.snapshot().fore_color.as_deref(), Some("#0000ff"));
}

#[test]
fn highlight_uses_a_background_span() {
    let mut surface = surface_with_selection("<p>hi</p>", 0, 2);
    assert!(surface.hilite_color("#ffff00"));
    assert_eq!(
        surface.serialized_content(),
        "<p><span style=\"background-color: #ffff00;\">hi</span></p>"
    );
    assert_eq!(surface.snapshot().hilite_color.as_deref(), Some("#ffff00"));
}

#[test]
fn collapsed_colours_apply_to_the_next_typed_text() {
    let mut surface = surface_with_selection("<p>a</p>", 1, 1);
    assert!(!surface.fore_color("#f00"));
    assert_eq!(surface.snapshot().fore_color.as_deref(), Some("#f00"));
    surface.insert_text("b");
    assert_eq!(
        surface.serialized_content(),
        "<p>a<font color=\"#f00\">b</font></p>"
    );
}

#[test]
fn snapshot_reads_formats_at_the_caret() {
    let mut surface = surface_with_selection("<p>Hello <b>World</b></p>", 8, 8);
    assert!(surface.snapshot().bold);
    surface.set_selection(Selection::caret(3));
    assert!(!surface.snapshot().bold);

    surface.toggle_format(InlineFormat::Underline);
    let snapshot = surface.snapshot();
    assert!(snapshot.underline);
    assert_eq!(snapshot.active_formats(), vec!["Underline"]);
}

#[test]
fn blank_arguments_change_nothing() {
    let mut surface = surface_with_selection("<p>abc</p>", 0, 3);
    assert!(!surface.create_link("  "));
    assert!(!surface.insert_image(""));
    assert!(!surface.fore_color(""));
    assert!(!surface.hilite_color(""));
    assert_eq!(surface.serialized_content(), "<p>abc</p>");
    assert!(!surface.can_undo());
}

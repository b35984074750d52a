//! End-to-end keystroke flows through the standard binding set, driving
//! the in-memory document the way a host frontend would.

use blockedit_engine::{BindingSet, BlockKind, ContentOp, Document, Key, KeyInput};
use pretty_assertions::assert_eq;

fn doc(ops: &[ContentOp]) -> Document {
    Document::from_ops(ops).unwrap()
}

#[test]
fn every_key_is_a_no_op_inside_paragraphs() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[ContentOp::text("one\ntwo\nthree\n")]);
    document.set_selection(4..4);
    let before = document.text();

    for key in [
        Key::Enter,
        Key::Backspace,
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
    ] {
        assert!(bindings.dispatch(&mut document, KeyInput::plain(key)));
    }

    assert_eq!(document.text(), before);
    assert_eq!(document.version(), 0);
}

#[test]
fn enter_escapes_a_quote_into_a_fresh_paragraph() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("quoted text"),
        ContentOp::line_break(BlockKind::Blockquote),
        ContentOp::line_break(BlockKind::Blockquote),
    ]);
    // Cursor on the trailing empty quote line.
    document.set_selection(12..12);

    let propagate = bindings.dispatch(&mut document, KeyInput::plain(Key::Enter));

    assert!(!propagate);
    // The empty quote line is gone; a fresh paragraph follows the quote.
    let expected = doc(&[
        ContentOp::text("quoted text"),
        ContentOp::line_break(BlockKind::Blockquote),
        ContentOp::text("\n"),
    ]);
    assert_eq!(document.text(), expected.text());
    assert_eq!(document.to_ops(), expected.to_ops());
    assert_eq!(document.selection(), 12..12);
    let (line, offset) = document.line_at(12);
    assert_eq!(line.kind, BlockKind::Paragraph);
    assert_eq!(offset, 0);
}

#[test]
fn enter_escape_is_not_reentrant() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("quoted text"),
        ContentOp::line_break(BlockKind::Blockquote),
        ContentOp::line_break(BlockKind::Blockquote),
    ]);
    document.set_selection(12..12);

    assert!(!bindings.dispatch(&mut document, KeyInput::plain(Key::Enter)));
    let after_first = document.to_ops();
    let version = document.version();

    // A second Enter lands on the fresh paragraph: no binding matches, the
    // deleted empty line must not come back.
    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Enter)));
    assert_eq!(document.to_ops(), after_first);
    assert_eq!(document.version(), version);
}

#[test]
fn single_line_quote_keeps_default_enter() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[ContentOp::line_break(BlockKind::Blockquote)]);
    document.set_selection(0..0);

    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Enter)));
    assert_eq!(document.text(), "\n");
}

#[test]
fn code_block_escapes_after_two_empty_lines() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("foo"),
        ContentOp::line_break(BlockKind::CodeBlock),
        ContentOp::line_break(BlockKind::CodeBlock),
        ContentOp::line_break(BlockKind::CodeBlock),
    ]);
    document.set_selection(5..5);

    assert!(!bindings.dispatch(&mut document, KeyInput::plain(Key::Enter)));

    let expected = doc(&[
        ContentOp::text("foo"),
        ContentOp::line_break(BlockKind::CodeBlock),
        ContentOp::text("\n"),
    ]);
    assert_eq!(document.to_ops(), expected.to_ops());
    assert_eq!(document.selection(), 4..4);
}

#[test]
fn code_block_without_trailing_empty_lines_keeps_default_enter() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("foo"),
        ContentOp::line_break(BlockKind::CodeBlock),
    ]);
    document.set_selection(3..3);

    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Enter)));
    assert_eq!(document.text(), "foo\n");
}

#[test]
fn backspace_dissolves_an_empty_spoiler() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[ContentOp::line_break(BlockKind::Spoiler)]);
    document.set_selection(0..0);

    assert!(!bindings.dispatch(&mut document, KeyInput::plain(Key::Backspace)));
    assert!(document.is_blank());
}

#[test]
fn backspace_keeps_default_on_populated_spoiler_lines() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("hello"),
        ContentOp::line_break(BlockKind::Spoiler),
        ContentOp::text("world"),
        ContentOp::line_break(BlockKind::Spoiler),
    ]);
    // Start of the second, non-empty line.
    document.set_selection(6..6);

    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Backspace)));
    assert_eq!(document.line(1).unwrap().kind, BlockKind::Spoiler);
}

#[test]
fn range_backspace_strips_only_at_the_document_head() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("hello"),
        ContentOp::line_break(BlockKind::Blockquote),
        ContentOp::text("world"),
        ContentOp::line_break(BlockKind::Blockquote),
    ]);

    // Selection over the second block's line: fallthrough.
    document.set_selection(6..11);
    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Backspace)));
    assert_eq!(document.line(1).unwrap().kind, BlockKind::Blockquote);

    // Selection over the first line: strip and restore the selection.
    document.set_selection(0..5);
    assert!(!bindings.dispatch(&mut document, KeyInput::plain(Key::Backspace)));
    assert_eq!(document.line(0).unwrap().kind, BlockKind::Paragraph);
    assert_eq!(document.line(1).unwrap().kind, BlockKind::Blockquote);
    assert_eq!(document.selection(), 0..5);
    assert_eq!(document.text(), "hello\nworld\n");
}

#[test]
fn arrow_up_escapes_a_quote_at_the_document_start() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("quoted"),
        ContentOp::line_break(BlockKind::Blockquote),
    ]);
    document.set_selection(0..0);

    // The arrow still propagates; the blank paragraph is a side effect.
    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Up)));
    assert_eq!(document.text(), "\nquoted\n");
    assert_eq!(document.line(0).unwrap().kind, BlockKind::Paragraph);
    assert_eq!(document.selection(), 0..0);
}

#[test]
fn arrow_right_escapes_a_code_block_at_the_document_end() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("code"),
        ContentOp::line_break(BlockKind::CodeBlock),
    ]);
    document.set_selection(4..4);

    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Right)));
    assert_eq!(document.text(), "code\n\n");
    assert_eq!(document.selection(), 5..5);
    let (line, _) = document.line_at(5);
    assert_eq!(line.kind, BlockKind::Paragraph);
}

#[test]
fn arrow_escapes_do_not_fire_away_from_the_boundary() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("quoted"),
        ContentOp::line_break(BlockKind::Blockquote),
    ]);
    document.set_selection(3..3);
    let before = document.text();

    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Up)));
    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Down)));

    assert_eq!(document.text(), before);
}

#[test]
fn escape_overrides_round_trip_through_content_ops() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("quoted text"),
        ContentOp::line_break(BlockKind::Blockquote),
        ContentOp::line_break(BlockKind::Blockquote),
    ]);
    document.set_selection(12..12);
    bindings.dispatch(&mut document, KeyInput::plain(Key::Enter));

    let reloaded = Document::from_ops(&document.to_ops()).unwrap();
    assert_eq!(reloaded.text(), document.text());
    assert_eq!(reloaded.to_ops(), document.to_ops());
}

#[test]
fn typing_inside_a_quote_then_escaping_matches_manual_construction() {
    let bindings = BindingSet::standard();
    let mut document = doc(&[
        ContentOp::text("quoted"),
        ContentOp::line_break(BlockKind::Blockquote),
    ]);

    // Type Enter at the end of the quote line: the host default splits the
    // line, inheriting the quote format.
    document.set_selection(6..6);
    assert!(bindings.dispatch(&mut document, KeyInput::plain(Key::Enter)));
    document.apply(blockedit_engine::Cmd::InsertText {
        at: 6,
        text: "\n".to_string(),
    });
    assert_eq!(document.selection(), 7..7);

    // Now the quote has a trailing empty line; Enter escapes it.
    assert!(!bindings.dispatch(&mut document, KeyInput::plain(Key::Enter)));

    let expected = doc(&[
        ContentOp::text("quoted"),
        ContentOp::line_break(BlockKind::Blockquote),
        ContentOp::text("\n"),
    ]);
    assert_eq!(document.to_ops(), expected.to_ops());
}

//! The escape rules themselves.
//!
//! Every rule is a total function over `(document, selection)`; it fully
//! produces its command list before returning so the host can apply the
//! override as one logical edit. Rules assume the binding criteria already
//! matched (selection shape, offset, block kind), but re-derive anything
//! they depend on rather than trusting call order.

use std::ops::Range;

use crate::editing::{BlockKind, Cmd, ContentOp, Line};
use crate::engine::DocumentQuery;
use crate::policy::Decision;

/// Enter inside a quote or spoiler: pressing Enter on a trailing empty
/// line escapes the block into a fresh paragraph below it.
///
/// Falls through unless the cursor line is the block's last line, holds no
/// text, and a previous line exists (a single-line block keeps its default
/// Enter behavior).
pub fn escape_multiline_enter(doc: &dyn DocumentQuery, range: &Range<usize>) -> Decision {
    let (line, _) = doc.line_at(range.start);
    if !line.is_last_in_block() {
        return Decision::Fallthrough;
    }
    if !line.is_empty() {
        return Decision::Fallthrough;
    }
    if line.is_first_in_block() {
        return Decision::Fallthrough;
    }
    insert_paragraph_after_block_and_trim(&line, 1)
}

/// Enter inside a code block: two empty lines already typed at the end of
/// the block escape it into a fresh paragraph below.
///
/// Code blocks preserve their newlines, so the trigger is the block text
/// ending in three consecutive newlines, and the trim removes two
/// characters instead of one.
pub fn escape_code_block_enter(doc: &dyn DocumentQuery, range: &Range<usize>) -> Decision {
    let (line, _) = doc.line_at(range.start);
    let block_text = doc.slice(line.block.start..line.block.end);
    if !block_text.ends_with("\n\n\n") {
        return Decision::Fallthrough;
    }
    insert_paragraph_after_block_and_trim(&line, 2)
}

/// Backspace at the start of a line in an escapable block: dissolve the
/// block back into plain paragraphs.
///
/// An empty line always strips, even when it is not alone in its block; a
/// non-empty line strips only when it is the sole line of a code block.
/// Anything else is an ordinary character-boundary backspace.
pub fn escape_block_backspace(doc: &dyn DocumentQuery, range: &Range<usize>) -> Decision {
    let (line, _) = doc.line_at(range.start);
    let sole_line = line.is_first_in_block() && line.is_last_in_block();
    if !line.is_empty() && !(sole_line && line.kind == BlockKind::CodeBlock) {
        return Decision::Fallthrough;
    }
    Decision::Override(vec![Cmd::FormatLines {
        range: line.block.start..line.block.end,
        kind: BlockKind::Paragraph,
    }])
}

/// Backspace over a range selection that starts on the document's very
/// first line: strip that line's block formatting and put the selection
/// back where it was.
///
/// Only fires when the line is non-empty and heads both its block and the
/// document; everywhere else the default range deletion runs.
pub fn strip_first_position_selection(doc: &dyn DocumentQuery, range: &Range<usize>) -> Decision {
    let (line, _) = doc.line_at(range.start);
    if line.is_empty() {
        return Decision::Fallthrough;
    }
    if !line.is_first_in_block() || !line.block.is_first_in_document() {
        return Decision::Fallthrough;
    }
    Decision::Override(vec![
        Cmd::FormatLines {
            range: line.start..line.end(),
            kind: BlockKind::Paragraph,
        },
        Cmd::SetSelection {
            range: range.clone(),
        },
    ])
}

/// Arrow Up/Left at the very start of the document while inside an
/// escapable block: there is nowhere to move to, so grow a blank paragraph
/// above the block for the cursor to land on.
///
/// The insertion is a side effect; default cursor movement always runs.
pub fn escape_before_document(doc: &dyn DocumentQuery, range: &Range<usize>) -> Decision {
    let (line, offset_in_line) = doc.line_at(range.start);
    if offset_in_line != 0 || !line.is_first_in_block() || !line.block.is_first_in_document() {
        return Decision::Fallthrough;
    }
    let mut ops = vec![ContentOp::text("\n")];
    ops.extend(doc.contents());
    Decision::FallthroughAfter(vec![Cmd::ReplaceContents { ops }])
}

/// Arrow Down/Right at the very end of the document while inside an
/// escapable block: grow a blank line below the block and move the cursor
/// just past the block boundary. Default movement still runs.
pub fn escape_after_document(doc: &dyn DocumentQuery, range: &Range<usize>) -> Decision {
    let (line, offset_in_line) = doc.line_at(range.start);
    let at_end_of_line = offset_in_line + 1 == line.len();
    if !at_end_of_line || !line.is_last_in_block() || line.block.end != doc.len() {
        return Decision::Fallthrough;
    }
    let mut ops = doc.contents();
    ops.push(ContentOp::text("\n"));
    let caret = range.start + 1;
    Decision::FallthroughAfter(vec![
        Cmd::ReplaceContents { ops },
        Cmd::SetSelection {
            range: caret..caret,
        },
    ])
}

/// Shared tail of the Enter escapes: a new empty paragraph right after the
/// block, then trim the typed-out empty line(s) the escape consumed.
///
/// Command positions are expressed against the pre-insert buffer; the
/// paragraph break lands at the block end, so the trim range below it is
/// untouched by the insert.
fn insert_paragraph_after_block_and_trim(line: &Line, trim: usize) -> Decision {
    let end = line.block.end;
    Decision::Override(vec![
        Cmd::InsertParagraphBreak { at: end },
        Cmd::DeleteRange {
            range: end - trim..end,
        },
        Cmd::SetSelection {
            range: end - trim..end - trim,
        },
    ])
}

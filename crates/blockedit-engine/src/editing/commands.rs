use std::ops::Range;

use xi_rope::delta::{Builder, DeltaElement};
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::content::ContentOp;
use crate::editing::document::BlockKind;

/// Commands that can be applied to the document.
///
/// Commands are the only mutation path; the policy layer expresses every
/// override as a command list and the host applies it in order as one
/// logical edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Insert text at a position. Inserted newlines split the line they
    /// land in; both halves keep that line's block format.
    InsertText { at: usize, text: String },
    /// Insert a single newline carrying the paragraph format, producing a
    /// new empty paragraph line at the position.
    InsertParagraphBreak { at: usize },
    /// Delete a byte range. Formats of deleted newlines are dropped so a
    /// merged line keeps the surviving newline's format.
    DeleteRange { range: Range<usize> },
    /// Set the block format of every line whose extent intersects the
    /// range. With `BlockKind::Paragraph` this is the formatting strip.
    FormatLines { range: Range<usize>, kind: BlockKind },
    /// Replace the whole document with a new content-op stream.
    ReplaceContents { ops: Vec<ContentOp> },
    /// Move the cursor/selection, clamped to valid offsets.
    SetSelection { range: Range<usize> },
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub changed: Vec<Range<usize>>,
    pub new_selection: Range<usize>,
    pub version: u64,
}

pub(crate) fn insert_delta(buffer: &Rope, at: usize, text: &str) -> Delta<RopeInfo> {
    let mut builder = Builder::new(buffer.len());
    builder.replace(at..at, Rope::from(text));
    builder.build()
}

pub(crate) fn delete_delta(buffer: &Rope, range: Range<usize>) -> Delta<RopeInfo> {
    let mut builder = Builder::new(buffer.len());
    builder.delete(range);
    builder.build()
}

/// Byte ranges inserted by a delta, in post-edit coordinates.
pub(crate) fn inserted_ranges(delta: &Delta<RopeInfo>) -> Vec<Range<usize>> {
    let mut changed = Vec::new();
    let mut cursor = 0;
    for op in delta.els.iter() {
        match op {
            DeltaElement::Copy(_from, to) => {
                cursor = *to;
            }
            DeltaElement::Insert(inserted) => {
                let start = cursor;
                let end = cursor + inserted.len();
                changed.push(start..end);
                cursor = end;
            }
        }
    }
    changed
}

/// Transform a selection through the command about to be applied.
///
/// `ReplaceContents` and `SetSelection` resolve their selection in the
/// apply pipeline itself (both need the post-edit document length).
pub(crate) fn transform_selection(range: &Range<usize>, cmd: &Cmd) -> Range<usize> {
    match cmd {
        Cmd::InsertText { at, text } => shift_for_insert(range, *at, text.len()),
        Cmd::InsertParagraphBreak { at } => shift_for_insert(range, *at, 1),
        Cmd::DeleteRange { range: del } => {
            let del_len = del.end - del.start;
            if del.end <= range.start {
                // Deletion is completely before the selection.
                (range.start - del_len)..(range.end - del_len)
            } else if del.start >= range.end {
                // Deletion is completely after the selection.
                range.clone()
            } else {
                // Deletion overlaps the selection; collapse to its start.
                del.start..del.start
            }
        }
        Cmd::FormatLines { .. } | Cmd::ReplaceContents { .. } | Cmd::SetSelection { .. } => {
            range.clone()
        }
    }
}

fn shift_for_insert(range: &Range<usize>, at: usize, len: usize) -> Range<usize> {
    if at <= range.start {
        (range.start + len)..(range.end + len)
    } else if at < range.end {
        // Insertion inside the selection grows its end.
        range.start..(range.end + len)
    } else {
        range.clone()
    }
}

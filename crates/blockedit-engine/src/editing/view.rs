use std::ops::Range;

use crate::editing::document::{BlockKind, Document};

/// The block a line belongs to, resolved as a span over the buffer.
///
/// Blocks are derived: a run of consecutive lines sharing a multi-line
/// kind forms one block, a paragraph line is a block of its own. `end` is
/// the offset just past the block's final newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub kind: BlockKind,
    pub start: usize,
    pub end: usize,
    pub first_line: usize,
    pub last_line: usize,
}

impl BlockSpan {
    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }

    pub fn is_first_in_document(&self) -> bool {
        self.start == 0
    }
}

/// Owned view of one line, resolved from a document snapshot.
///
/// `text` excludes the terminating newline; [`Line::len`] includes it, so
/// `start + len` is the offset of the next line (or the end of the
/// enclosing block for its last line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub index: usize,
    pub kind: BlockKind,
    pub text: String,
    pub start: usize,
    pub block: BlockSpan,
}

impl Line {
    /// Line length in bytes, terminating newline included.
    pub fn len(&self) -> usize {
        self.text.len() + 1
    }

    /// True when the line holds no text (only its newline).
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Offset just past the terminating newline.
    pub fn end(&self) -> usize {
        self.start + self.len()
    }

    pub fn is_first_in_block(&self) -> bool {
        self.index == self.block.first_line
    }

    pub fn is_last_in_block(&self) -> bool {
        self.index == self.block.last_line
    }
}

impl Document {
    /// Resolve a line by index.
    pub fn line(&self, index: usize) -> Option<Line> {
        (index < self.line_count()).then(|| self.line_view(index))
    }

    /// Resolve the line containing a cursor offset, returning the line and
    /// the offset within it.
    ///
    /// The offset must be a valid cursor position (`offset < len`); an
    /// out-of-range offset is a caller contract violation and panics.
    pub fn line_at(&self, offset: usize) -> (Line, usize) {
        assert!(
            offset < self.len(),
            "offset {offset} out of range for document of length {}",
            self.len()
        );
        let index = self.buffer.line_of_offset(offset);
        let line = self.line_view(index);
        let offset_in_line = offset - line.start;
        (line, offset_in_line)
    }

    /// Copy a byte range out of the buffer.
    pub fn slice(&self, range: Range<usize>) -> String {
        self.buffer.slice_to_cow(range).into_owned()
    }

    fn line_view(&self, index: usize) -> Line {
        let start = self.line_start(index);
        let end = self.line_break_offset(index);
        let kind = self.line_kinds[index];
        let (first_line, last_line) = self.block_lines_around(index);
        let block = BlockSpan {
            kind,
            start: self.line_start(first_line),
            end: self.line_break_offset(last_line) + 1,
            first_line,
            last_line,
        };
        Line {
            index,
            kind,
            text: self.buffer.slice_to_cow(start..end).into_owned(),
            start,
            block,
        }
    }

    fn block_lines_around(&self, index: usize) -> (usize, usize) {
        let kind = self.line_kinds[index];
        if !kind.is_escapable() {
            return (index, index);
        }
        let mut first = index;
        while first > 0 && self.line_kinds[first - 1] == kind {
            first -= 1;
        }
        let mut last = index;
        while last + 1 < self.line_kinds.len() && self.line_kinds[last + 1] == kind {
            last += 1;
        }
        (first, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::content::ContentOp;
    use pretty_assertions::assert_eq;

    fn mixed_doc() -> Document {
        // paragraph / two quote lines / code line
        Document::from_ops(&[
            ContentOp::text("intro"),
            ContentOp::text("\n"),
            ContentOp::text("first quoted"),
            ContentOp::line_break(BlockKind::Blockquote),
            ContentOp::text("second quoted"),
            ContentOp::line_break(BlockKind::Blockquote),
            ContentOp::text("code"),
            ContentOp::line_break(BlockKind::CodeBlock),
        ])
        .unwrap()
    }

    #[test]
    fn paragraph_lines_are_their_own_block() {
        let doc = mixed_doc();
        let line = doc.line(0).unwrap();
        assert_eq!(line.kind, BlockKind::Paragraph);
        assert_eq!(line.block.line_count(), 1);
        assert!(line.is_first_in_block() && line.is_last_in_block());
        assert!(line.block.is_first_in_document());
    }

    #[test]
    fn quote_run_resolves_as_one_block() {
        let doc = mixed_doc();
        let first = doc.line(1).unwrap();
        let second = doc.line(2).unwrap();

        assert_eq!(first.block, second.block);
        assert_eq!(first.block.line_count(), 2);
        assert!(first.is_first_in_block() && !first.is_last_in_block());
        assert!(!second.is_first_in_block() && second.is_last_in_block());
        assert!(!first.block.is_first_in_document());
    }

    #[test]
    fn block_span_covers_exact_byte_range() {
        let doc = mixed_doc();
        let line = doc.line(1).unwrap();
        // "intro\n" is 6 bytes; the quote block is the next two lines.
        assert_eq!(line.block.start, 6);
        assert_eq!(
            doc.slice(line.block.start..line.block.end),
            "first quoted\nsecond quoted\n"
        );
    }

    #[test]
    fn line_at_returns_offset_within_line() {
        let doc = mixed_doc();
        let (line, offset) = doc.line_at(8);
        assert_eq!(line.index, 1);
        assert_eq!(offset, 2);
        assert_eq!(line.text, "first quoted");
        assert_eq!(line.len(), 13);
    }

    #[test]
    fn line_at_on_a_newline_belongs_to_its_line() {
        let doc = mixed_doc();
        let (line, offset) = doc.line_at(5);
        assert_eq!(line.index, 0);
        assert_eq!(offset, line.text.len());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn line_at_past_end_is_a_contract_violation() {
        let doc = mixed_doc();
        let _ = doc.line_at(doc.len());
    }

    #[test]
    fn adjacent_blocks_of_different_kinds_stay_separate() {
        let doc = Document::from_ops(&[
            ContentOp::text("spoiled"),
            ContentOp::line_break(BlockKind::Spoiler),
            ContentOp::text("quoted"),
            ContentOp::line_break(BlockKind::Blockquote),
        ])
        .unwrap();

        let spoiler = doc.line(0).unwrap();
        let quote = doc.line(1).unwrap();
        assert_eq!(spoiler.block.line_count(), 1);
        assert_eq!(quote.block.line_count(), 1);
        assert_eq!(spoiler.block.end, quote.block.start);
    }
}

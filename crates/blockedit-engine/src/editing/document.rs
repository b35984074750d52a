use std::ops::Range;

use serde::{Deserialize, Serialize};
use xi_rope::Rope;

use crate::editing::commands::{self, Cmd, Patch};
use crate::editing::content::{self, ContentError, ContentOp, OpsBuilder};

/// Block format of a single line.
///
/// The format travels with the line's terminating newline, so consecutive
/// lines sharing a multi-line kind make up one block. `Paragraph` lines are
/// always blocks of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Blockquote,
    Spoiler,
    CodeBlock,
}

impl BlockKind {
    /// Multi-line kinds that keystrokes can escape from into a plain
    /// paragraph.
    pub fn is_escapable(&self) -> bool {
        !matches!(self, BlockKind::Paragraph)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Blockquote => "blockquote",
            BlockKind::Spoiler => "spoiler",
            BlockKind::CodeBlock => "code-block",
        }
    }
}

/// The host engine's authoritative editing state.
///
/// Invariants:
/// - the buffer is never empty and always ends with `\n` (an empty document
///   is one empty paragraph line),
/// - the number of newlines in the buffer equals `line_kinds.len()`,
/// - the selection stays within `0..len`, never past the terminal newline.
///
/// Valid cursor offsets are byte offsets on character boundaries strictly
/// below [`Document::len`]. Handing an out-of-range offset to a query is a
/// caller contract violation and panics; it is not a recoverable error.
#[derive(Debug)]
pub struct Document {
    /// Linear character stream, one `\n` per line, always terminated.
    pub(crate) buffer: Rope,
    /// Block format per line, indexed in line order.
    pub(crate) line_kinds: Vec<BlockKind>,
    /// Current selection/cursor as byte offsets into the buffer.
    pub(crate) selection: Range<usize>,
    /// Version counter incremented on each applied command.
    pub(crate) version: u64,
}

impl Document {
    /// The empty document: one empty paragraph line.
    pub fn new() -> Self {
        Self {
            buffer: Rope::from("\n"),
            line_kinds: vec![BlockKind::Paragraph],
            selection: 0..0,
            version: 0,
        }
    }

    /// Build a document from a content-op stream, validating it first.
    ///
    /// A stream missing its final newline is normalized by appending an
    /// empty paragraph line; an empty stream yields the empty document.
    /// The cursor starts at the end of the last line.
    pub fn from_ops(ops: &[ContentOp]) -> Result<Self, ContentError> {
        content::validate(ops)?;
        let (buffer, line_kinds) = content::build(ops);
        let last = buffer.len() - 1;
        let doc = Self {
            buffer,
            line_kinds,
            selection: last..last,
            version: 0,
        };
        doc.check_invariants();
        Ok(doc)
    }

    /// Serialize the document back into canonical content ops.
    ///
    /// Adjacent unformatted inserts are coalesced, so the output is stable
    /// under round-trips through [`Document::from_ops`].
    pub fn to_ops(&self) -> Vec<ContentOp> {
        let mut builder = OpsBuilder::default();
        for (index, kind) in self.line_kinds.iter().enumerate() {
            let start = self.line_start(index);
            let end = self.line_break_offset(index);
            if end > start {
                builder.push_text(&self.buffer.slice_to_cow(start..end));
            }
            builder.push_line_break(*kind);
        }
        builder.finish()
    }

    /// The full text of the document, terminal newline included.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True for the pristine empty document (one empty paragraph line).
    pub fn is_blank(&self) -> bool {
        self.len() == 1 && self.line_kinds[0] == BlockKind::Paragraph
    }

    pub fn line_count(&self) -> usize {
        self.line_kinds.len()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Move the selection directly, clamped to valid cursor offsets.
    pub fn set_selection(&mut self, selection: Range<usize>) {
        self.selection = self.clamp_selection(&selection);
    }

    /// Apply a command to the document.
    ///
    /// The pipeline mirrors the command's effect in three coupled places:
    /// the rope buffer (via a compiled delta), the line format table (one
    /// entry per newline), and the selection (transformed through the
    /// edit). Commands are the only mutation path; a caller holding a
    /// command list can apply it as one logical edit transaction.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        tracing::debug!(version = self.version, command = ?cmd, "applying edit command");

        let old_selection = self.selection.clone();
        let mut new_selection = commands::transform_selection(&old_selection, &cmd);
        let mut changed: Vec<Range<usize>> = Vec::new();

        match &cmd {
            Cmd::InsertText { at, text } => {
                assert!(
                    *at <= self.len(),
                    "insert position {at} out of range for document of length {}",
                    self.len()
                );
                if !text.is_empty() {
                    self.splice_kinds_for_insert(*at, text);
                    let delta = commands::insert_delta(&self.buffer, *at, text);
                    changed = commands::inserted_ranges(&delta);
                    self.buffer = delta.apply(&self.buffer);
                }
            }
            Cmd::InsertParagraphBreak { at } => {
                assert!(
                    *at <= self.len(),
                    "paragraph break position {at} out of range for document of length {}",
                    self.len()
                );
                let index = self.line_index_for_insert(*at);
                self.line_kinds.insert(index, BlockKind::Paragraph);
                let delta = commands::insert_delta(&self.buffer, *at, "\n");
                changed = commands::inserted_ranges(&delta);
                self.buffer = delta.apply(&self.buffer);
            }
            Cmd::DeleteRange { range } => {
                assert!(
                    range.start <= range.end && range.end <= self.len(),
                    "delete range {range:?} out of range for document of length {}",
                    self.len()
                );
                if range.start < range.end {
                    self.drain_kinds_for_delete(range);
                    let delta = commands::delete_delta(&self.buffer, range.clone());
                    self.buffer = delta.apply(&self.buffer);
                    self.restore_termination();
                }
            }
            Cmd::FormatLines { range, kind } => {
                assert!(
                    range.start <= range.end && range.end <= self.len(),
                    "format range {range:?} out of range for document of length {}",
                    self.len()
                );
                let last_offset = self.len() - 1;
                let first = self.buffer.line_of_offset(range.start.min(last_offset));
                let last = if range.end > range.start {
                    self.buffer.line_of_offset((range.end - 1).min(last_offset))
                } else {
                    first
                };
                for index in first..=last {
                    self.line_kinds[index] = *kind;
                }
                changed.push(self.line_start(first)..self.line_break_offset(last) + 1);
            }
            Cmd::ReplaceContents { ops } => {
                let (buffer, line_kinds) = content::build(ops);
                self.buffer = buffer;
                self.line_kinds = line_kinds;
                changed.push(0..self.len());
                new_selection = old_selection;
            }
            Cmd::SetSelection { range } => {
                new_selection = range.clone();
            }
        }

        let new_selection = self.clamp_selection(&new_selection);
        self.selection = new_selection.clone();
        self.version += 1;
        self.check_invariants();

        Patch {
            changed,
            new_selection,
            version: self.version,
        }
    }

    /// Offset of the first character of the given line.
    pub(crate) fn line_start(&self, index: usize) -> usize {
        self.buffer.offset_of_line(index)
    }

    /// Offset of the given line's terminating newline.
    pub(crate) fn line_break_offset(&self, index: usize) -> usize {
        self.buffer.offset_of_line(index + 1) - 1
    }

    fn line_index_for_insert(&self, at: usize) -> usize {
        if at >= self.len() {
            self.line_count()
        } else {
            self.buffer.line_of_offset(at)
        }
    }

    fn splice_kinds_for_insert(&mut self, at: usize, text: &str) {
        let newlines = text.matches('\n').count();
        if newlines == 0 {
            return;
        }
        // An inserted newline splits the line it lands in; both halves keep
        // that line's format.
        let index = self.line_index_for_insert(at);
        let inherited = self
            .line_kinds
            .get(index)
            .copied()
            .unwrap_or(BlockKind::Paragraph);
        for _ in 0..newlines {
            self.line_kinds.insert(index, inherited);
        }
    }

    fn drain_kinds_for_delete(&mut self, range: &Range<usize>) {
        let deleted = self
            .buffer
            .slice_to_cow(range.clone())
            .matches('\n')
            .count();
        if deleted == 0 {
            return;
        }
        // A deleted newline merges its line into the following one, which
        // keeps the surviving newline's format.
        let first = self.buffer.line_of_offset(range.start);
        self.line_kinds.drain(first..first + deleted);
    }

    /// A delete that consumed the terminal newline leaves the buffer
    /// unterminated (or empty); re-terminate with a paragraph line so the
    /// document never becomes fully empty.
    fn restore_termination(&mut self) {
        if self.buffer.len() == 0 || !self.buffer.to_string().ends_with('\n') {
            let len = self.buffer.len();
            let delta = commands::insert_delta(&self.buffer, len, "\n");
            self.buffer = delta.apply(&self.buffer);
            self.line_kinds.push(BlockKind::Paragraph);
        }
    }

    fn clamp_selection(&self, range: &Range<usize>) -> Range<usize> {
        let last = self.len() - 1;
        let start = range.start.min(last);
        let end = range.end.clamp(start, last);
        start..end
    }

    fn check_invariants(&self) {
        debug_assert!(
            !self.line_kinds.is_empty(),
            "document must keep at least one line"
        );
        if cfg!(debug_assertions) {
            let text = self.buffer.to_string();
            debug_assert!(text.ends_with('\n'), "buffer must stay newline-terminated");
            debug_assert_eq!(
                text.matches('\n').count(),
                self.line_kinds.len(),
                "line format table out of step with buffer"
            );
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

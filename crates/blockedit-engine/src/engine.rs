//! Capability traits between the policy layer and a host editing engine.
//!
//! The policy is written against [`DocumentQuery`] alone, so it can be
//! evaluated as a pure function of a document snapshot. A host that wants
//! the policy's commands applied implements [`EditingEngine`] on top. The
//! in-memory [`Document`] implements both and doubles as the reference
//! host; an adapter over a third-party editor engine would implement the
//! same pair.

use std::ops::Range;

use crate::editing::{Cmd, ContentOp, Document, Line, Patch};

/// Read-only document surface.
///
/// Offsets follow the document contract: valid cursor offsets are strictly
/// below [`DocumentQuery::len`]; out-of-range offsets are caller contract
/// violations and panic.
pub trait DocumentQuery {
    /// Buffer length in bytes, terminal newline included.
    fn len(&self) -> usize;

    fn line_count(&self) -> usize;

    /// Resolve a line by index.
    fn line(&self, index: usize) -> Option<Line>;

    /// Resolve the line containing an offset, with the offset within it.
    fn line_at(&self, offset: usize) -> (Line, usize);

    /// Copy a byte range out of the buffer.
    fn slice(&self, range: Range<usize>) -> String;

    /// Serialize the document as content ops.
    fn contents(&self) -> Vec<ContentOp>;
}

/// Full engine surface: queries plus the mutation path.
pub trait EditingEngine: DocumentQuery {
    fn selection(&self) -> Range<usize>;

    fn apply(&mut self, cmd: Cmd) -> Patch;
}

impl DocumentQuery for Document {
    fn len(&self) -> usize {
        Document::len(self)
    }

    fn line_count(&self) -> usize {
        Document::line_count(self)
    }

    fn line(&self, index: usize) -> Option<Line> {
        Document::line(self, index)
    }

    fn line_at(&self, offset: usize) -> (Line, usize) {
        Document::line_at(self, offset)
    }

    fn slice(&self, range: Range<usize>) -> String {
        Document::slice(self, range)
    }

    fn contents(&self) -> Vec<ContentOp> {
        self.to_ops()
    }
}

impl EditingEngine for Document {
    fn selection(&self) -> Range<usize> {
        Document::selection(self)
    }

    fn apply(&mut self, cmd: Cmd) -> Patch {
        Document::apply(self, cmd)
    }
}

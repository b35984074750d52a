use serde::{Deserialize, Serialize};
use thiserror::Error;
use xi_rope::Rope;

use crate::editing::document::BlockKind;

/// One operation of the serialized document stream.
///
/// Plain text ops carry inline content; a `"\n"` op with an attribute
/// closes the current line with that block format. A newline without an
/// attribute closes a paragraph line. Attributes on ops without newlines
/// are ignored when building a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOp {
    pub insert: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BlockKind>,
}

impl ContentOp {
    pub fn text(insert: impl Into<String>) -> Self {
        Self {
            insert: insert.into(),
            attributes: None,
        }
    }

    pub fn line_break(kind: BlockKind) -> Self {
        Self {
            insert: "\n".to_string(),
            attributes: Some(kind),
        }
    }
}

/// Malformed content-op streams, rejected at the loading boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("content op {index} has an empty insert")]
    EmptyInsert { index: usize },
    #[error("content op {index} contains a carriage return")]
    CarriageReturn { index: usize },
}

pub(crate) fn validate(ops: &[ContentOp]) -> Result<(), ContentError> {
    for (index, op) in ops.iter().enumerate() {
        if op.insert.is_empty() {
            return Err(ContentError::EmptyInsert { index });
        }
        if op.insert.contains('\r') {
            return Err(ContentError::CarriageReturn { index });
        }
    }
    Ok(())
}

/// Build the buffer and line format table from an op stream.
///
/// Lenient on purpose: `Document::apply` replaces contents through this
/// path and must stay total, so validation belongs to the loading boundary
/// ([`validate`]), not here. A stream without a final newline gains an
/// empty paragraph terminator; the empty stream yields `"\n"`.
pub(crate) fn build(ops: &[ContentOp]) -> (Rope, Vec<BlockKind>) {
    let mut text = String::new();
    let mut kinds = Vec::new();
    for op in ops {
        let mut pieces = op.insert.split('\n');
        if let Some(first) = pieces.next() {
            text.push_str(first);
        }
        for piece in pieces {
            text.push('\n');
            kinds.push(op.attributes.unwrap_or(BlockKind::Paragraph));
            text.push_str(piece);
        }
    }
    if !text.ends_with('\n') {
        text.push('\n');
        kinds.push(BlockKind::Paragraph);
    }
    (Rope::from(text.as_str()), kinds)
}

/// Accumulates content ops in canonical form: adjacent unformatted
/// inserts are merged into one op.
#[derive(Default)]
pub(crate) struct OpsBuilder {
    ops: Vec<ContentOp>,
}

impl OpsBuilder {
    pub(crate) fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.ops.last_mut()
            && last.attributes.is_none()
        {
            last.insert.push_str(text);
        } else {
            self.ops.push(ContentOp::text(text));
        }
    }

    pub(crate) fn push_line_break(&mut self, kind: BlockKind) {
        if kind == BlockKind::Paragraph {
            self.push_text("\n");
        } else {
            self.ops.push(ContentOp::line_break(kind));
        }
    }

    pub(crate) fn finish(self) -> Vec<ContentOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn block_kinds_serialize_kebab_case() {
        assert_eq!(
            serde_json::to_string(&BlockKind::CodeBlock).unwrap(),
            "\"code-block\""
        );
        assert_eq!(
            serde_json::to_string(&BlockKind::Blockquote).unwrap(),
            "\"blockquote\""
        );
    }

    #[test]
    fn plain_ops_omit_attributes_in_json() {
        let ops = vec![
            ContentOp::text("quoted"),
            ContentOp::line_break(BlockKind::Blockquote),
        ];
        insta::assert_snapshot!(
            serde_json::to_string(&ops).unwrap(),
            @r#"[{"insert":"quoted"},{"insert":"\n","attributes":"blockquote"}]"#
        );
    }

    #[test]
    fn ops_deserialize_without_attributes_field() {
        let ops: Vec<ContentOp> =
            serde_json::from_str(r#"[{"insert":"hi\n"}]"#).unwrap();
        assert_eq!(ops, vec![ContentOp::text("hi\n")]);
    }

    #[test]
    fn build_of_empty_stream_is_one_empty_paragraph() {
        let (rope, kinds) = build(&[]);
        assert_eq!(rope.to_string(), "\n");
        assert_eq!(kinds, vec![BlockKind::Paragraph]);
    }

    #[test]
    fn build_attaches_op_attribute_to_each_newline_in_the_op() {
        let (rope, kinds) = build(&[ContentOp {
            insert: "a\nb\n".to_string(),
            attributes: Some(BlockKind::Spoiler),
        }]);
        assert_eq!(rope.to_string(), "a\nb\n");
        assert_eq!(kinds, vec![BlockKind::Spoiler, BlockKind::Spoiler]);
    }

    #[test]
    fn validate_flags_carriage_returns() {
        let err = validate(&[ContentOp::text("bad\r\n")]).unwrap_err();
        assert_eq!(err, ContentError::CarriageReturn { index: 0 });
    }

    #[test]
    fn ops_builder_coalesces_plain_runs() {
        let mut builder = OpsBuilder::default();
        builder.push_text("one");
        builder.push_line_break(BlockKind::Paragraph);
        builder.push_text("two");
        builder.push_line_break(BlockKind::Blockquote);
        builder.push_line_break(BlockKind::Paragraph);

        assert_eq!(
            builder.finish(),
            vec![
                ContentOp::text("one\ntwo"),
                ContentOp::line_break(BlockKind::Blockquote),
                ContentOp::text("\n"),
            ]
        );
    }
}

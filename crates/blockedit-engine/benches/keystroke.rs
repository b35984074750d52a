use std::hint::black_box;

use blockedit_engine::policy::rules;
use blockedit_engine::{BlockKind, ContentOp, Document};
use criterion::{criterion_group, criterion_main, Criterion};

fn large_quote(lines: usize) -> Document {
    let mut ops = Vec::with_capacity(lines * 2 + 1);
    for i in 0..lines {
        ops.push(ContentOp::text(format!("quoted line {i}")));
        ops.push(ContentOp::line_break(BlockKind::Blockquote));
    }
    ops.push(ContentOp::line_break(BlockKind::Blockquote));
    Document::from_ops(&ops).unwrap()
}

fn bench_line_resolution(c: &mut Criterion) {
    let doc = large_quote(1000);
    let offset = doc.len() / 2;
    c.bench_function("line_at_mid_document", |b| {
        b.iter(|| black_box(doc.line_at(black_box(offset))))
    });
}

fn bench_enter_decision(c: &mut Criterion) {
    let doc = large_quote(1000);
    // Collapsed cursor on the trailing empty quote line.
    let cursor = doc.len() - 1;
    c.bench_function("enter_escape_decision_large_quote", |b| {
        b.iter(|| black_box(rules::escape_multiline_enter(&doc, &(cursor..cursor))))
    });
}

criterion_group!(benches, bench_line_resolution, bench_enter_decision);
criterion_main!(benches);

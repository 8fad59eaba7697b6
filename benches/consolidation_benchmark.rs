//! Benchmarks for consolidation and box merging.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paperweave::labeling::{
    fix_double_begin_markers, relabel_table_figure_as_paragraph, revert_bad_spans,
    ConsolidationOptions, TaggedRow, TaggedSequence,
};
use paperweave::layout::{collapse_tokens_to_line_boxes, merge_touching_graphic_objects};
use paperweave::model::{BoundingBox, GraphicObject, LayoutToken, StructuralObject};

/// A sequence alternating paragraphs and tables of `table_rows` rows each.
fn create_sequence(tables: usize, table_rows: usize) -> (TaggedSequence, Vec<StructuralObject>) {
    let mut rows = Vec::new();
    let mut objects = Vec::new();

    for t in 0..tables {
        for w in 0..20 {
            let label = if w == 0 { "I-<paragraph>" } else { "<paragraph>" };
            rows.push(TaggedRow::new([format!("word{w}")], label));
        }
        let mut tokens = Vec::new();
        for r in 0..table_rows {
            let text = if r == 0 { "Table".to_string() } else { format!("c{t}_{r}") };
            let label = if r == 0 { "I-<table>" } else { "<table>" };
            tokens.push(LayoutToken::without_coords(text.as_str(), r));
            rows.push(TaggedRow::new([text], label));
        }
        if t % 2 == 0 {
            objects.push(StructuralObject::table(tokens));
        }
    }

    (TaggedSequence::from_rows(rows), objects)
}

/// A grid of touching cells, as drawn by ruled tables.
fn create_grid(side: usize) -> Vec<GraphicObject> {
    let mut objects = Vec::new();
    for row in 0..side {
        for col in 0..side {
            objects.push(GraphicObject::vector_box(BoundingBox::from_point_and_dimensions(
                1,
                50.0 + col as f64 * 20.0,
                50.0 + row as f64 * 10.0,
                20.0,
                10.0,
            )));
        }
    }
    objects
}

fn create_tokens(count: usize) -> Vec<LayoutToken> {
    (0..count)
        .map(|i| {
            let line = (i / 12) as f64;
            let column = (i % 12) as f64;
            LayoutToken::new(
                "word",
                i,
                BoundingBox::from_point_and_dimensions(1, 50.0 + column * 30.0, 50.0 + line * 14.0, 25.0, 10.0),
            )
        })
        .collect()
}

fn bench_consolidation(c: &mut Criterion) {
    let mut group = c.benchmark_group("consolidation");

    for tables in [10, 50, 200].iter() {
        let (sequence, objects) = create_sequence(*tables, 30);

        group.bench_function(format!("revert_{}_tables", tables), |b| {
            b.iter(|| {
                revert_bad_spans(
                    black_box(&objects),
                    black_box(&sequence),
                    &ConsolidationOptions::default(),
                )
            });
        });

        group.bench_function(format!("relabel_{}_tables", tables), |b| {
            b.iter(|| relabel_table_figure_as_paragraph(black_box(&sequence)));
        });
    }

    let (sequence, _) = create_sequence(50, 30);
    group.bench_function("fix_double_begin", |b| {
        b.iter(|| fix_double_begin_markers(black_box(&sequence)));
    });

    let text = sequence.to_string();
    group.bench_function("parse_sequence", |b| {
        b.iter(|| TaggedSequence::parse(black_box(&text)).unwrap());
    });

    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");

    for side in [5, 15].iter() {
        let grid = create_grid(*side);
        group.bench_function(format!("merge_touching_{}x{}", side, side), |b| {
            b.iter(|| merge_touching_graphic_objects(black_box(&grid)));
        });
    }

    let tokens = create_tokens(2_000);
    group.bench_function("collapse_tokens_to_lines", |b| {
        b.iter(|| collapse_tokens_to_line_boxes(black_box(&tokens)));
    });

    group.finish();
}

criterion_group!(benches, bench_consolidation, bench_geometry);
criterion_main!(benches);

//! Benchmarks for column building, reorder detection and cell formatting.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gridsync::columns::{create_columns, detect_move, detect_moved_column};
use gridsync::style::StyleComputer;
use gridsync::{ColumnMetadata, Row};
use serde_json::Value;

fn metadata(count: usize) -> Vec<ColumnMetadata> {
    (0..count)
        .map(|i| {
            let declared = if i % 3 == 0 { "integer" } else { "string" };
            ColumnMetadata::new(format!("{i:04}"), format!("column {i}"), declared)
        })
        .collect()
}

/// Column set construction for growing widths
fn bench_create_columns(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_columns");

    for count in [10, 100, 1000] {
        let meta = metadata(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("normal", count), &meta, |b, meta| {
            b.iter(|| create_columns(black_box(meta), false, None))
        });
        group.bench_with_input(BenchmarkId::new("preview", count), &meta, |b, meta| {
            b.iter(|| create_columns(black_box(meta), true, None))
        });
    }

    group.finish();
}

/// Worst case for the reorder diff: first column dragged to the end
fn bench_detect_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_move");

    for count in [10, 100, 1000] {
        let previous: Vec<String> = (0..count).map(|i| format!("{i:04}")).collect();
        let mut current = previous.clone();
        let first = current.remove(0);
        current.push(first);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("ids", count),
            &(previous, current),
            |b, (previous, current)| b.iter(|| detect_move(black_box(previous), black_box(current))),
        );
    }

    let meta = metadata(200);
    let previous = create_columns(&meta, false, None);
    let mut current = previous.clone();
    let moved = current.remove(1);
    current.push(moved);
    group.bench_function("definitions_200", |b| {
        b.iter(|| detect_moved_column(black_box(&previous), black_box(&current)))
    });

    group.finish();
}

/// Cell markup with hidden characters, preview markers and highlight
fn bench_format_cell(c: &mut Criterion) {
    let meta = metadata(2);
    let columns = create_columns(&meta, false, None);
    let column = columns.get(2).expect("data column");
    let mut styles = StyleComputer::new();
    styles.highlight_cells_containing("0001", "  Paris\nFrance ");

    let row = Row::new()
        .with("tdpId", 1)
        .with("0001", "  Paris\nFrance ")
        .with("__tdpRowDiff", "update");
    let raw = Value::from("  Paris\nFrance ");

    c.bench_function("format_cell", |b| {
        b.iter(|| styles.format_cell(black_box(column), black_box(&raw), black_box(&row)))
    });
}

criterion_group!(
    benches,
    bench_create_columns,
    bench_detect_move,
    bench_format_cell,
);

criterion_main!(benches);

use criterion::{Criterion, criterion_group, criterion_main};
use scribeflow_engine::formatting;
use scribeflow_engine::models::{FormatKind, FormatState};
mod common;

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");

    let text = common::generate_paragraph(500);
    let format = FormatState::new()
        .with(FormatKind::Bold, true)
        .with(FormatKind::Italic, true)
        .with(FormatKind::Highlight, "yellow");
    let rendered = formatting::render(&text, &format);

    group.bench_function("render_plain", |b| {
        b.iter(|| formatting::render(std::hint::black_box(&text), &format));
    });

    group.bench_function("render_rendered", |b| {
        b.iter(|| formatting::render(std::hint::black_box(&rendered), &format));
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    group.sample_size(20);

    let doc = common::generate_document(50);

    group.bench_function("snapshot_450_blocks", |b| {
        b.iter(|| std::hint::black_box(doc.snapshot()));
    });

    group.finish();
}

criterion_group!(benches, bench_formatting, bench_snapshot);
criterion_main!(benches);

//! Benchmarks for dirx
//!
//! Run with: cargo bench

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dirx::stats::{raw_extension, summarize, Canonicalizer, ExtensionTable, FileRecord, SortOrder};

const NAMES: &[&str] = &[
    "photo.jpg", "photo.JPEG", "main.rs", "Cargo.toml", "README", ".bashrc",
    "index.html", "page.htm", "notes.markdown", "archive.tar.bz2", "song.mid",
    "lib.cc", "trailing.", "config.yml", "data.csv", "image.tif",
];

fn records(count: usize) -> Vec<FileRecord> {
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    (0..count)
        .map(|i| FileRecord::new(NAMES[i % NAMES.len()], (i as u64) * 17, at))
        .collect()
}

fn benchmark_raw_extension(c: &mut Criterion) {
    c.bench_function("raw_extension", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(raw_extension(black_box(name)));
            }
        })
    });
}

fn benchmark_canonicalize(c: &mut Criterion) {
    let canon = Canonicalizer::builtin().unwrap();

    c.bench_function("canonicalize", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(canon.canonicalize(raw_extension(name)));
            }
        })
    });
}

fn benchmark_table_observe(c: &mut Criterion) {
    let batch = records(10_000);

    c.bench_function("table_observe_10k", |b| {
        b.iter(|| {
            let mut table = ExtensionTable::new();
            for record in &batch {
                table.observe(record);
            }
            black_box(table.len())
        })
    });
}

fn benchmark_summarize(c: &mut Criterion) {
    let canon = Canonicalizer::builtin().unwrap();
    let table: ExtensionTable = records(10_000).into_iter().collect();

    c.bench_function("summarize", |b| {
        b.iter(|| {
            let stats = table.clone().into_stats();
            black_box(summarize(stats, &canon, SortOrder::Size))
        })
    });
}

criterion_group!(
    benches,
    benchmark_raw_extension,
    benchmark_canonicalize,
    benchmark_table_observe,
    benchmark_summarize,
);
criterion_main!(benches);

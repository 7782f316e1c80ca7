//! Criterion benchmarks for the band pipeline.
//!
//! Benchmarks:
//! 1. EMA over a long close series
//! 2. Single episode-extraction pass
//! 3. Full three-pass band build plus tier classification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use devband_core::bands::{extract_episodes, DeviationBands};
use devband_core::data::SyntheticProvider;
use devband_core::domain::PriceSeries;
use devband_core::indicators::ema_of_series;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(years: i32) -> PriceSeries {
    let start = chrono::NaiveDate::from_ymd_opt(2024 - years, 1, 1).unwrap();
    let end = chrono::NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let points = SyntheticProvider::default().generate("BENCH.NS", start, end);
    PriceSeries::from_unordered("BENCH.NS", points)
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_ema(c: &mut Criterion) {
    let closes = make_series(20).closes();
    c.bench_function("ema_200_20y", |b| {
        b.iter(|| ema_of_series(black_box(&closes), 200))
    });
}

fn bench_extract(c: &mut Criterion) {
    let series = make_series(20);
    let bands = DeviationBands::build(&series, 200);
    c.bench_function("extract_episodes_vs_ema_20y", |b| {
        b.iter(|| extract_episodes(black_box(&series), black_box(&bands.ema)))
    });
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("band_build");
    for years in [5, 10, 20] {
        let series = make_series(years);
        group.bench_with_input(BenchmarkId::from_parameter(years), &series, |b, s| {
            b.iter(|| {
                let bands = DeviationBands::build(black_box(s), 200);
                let avg = bands.avg_line_tier(s);
                let lower = bands.lower_line_tier(s);
                (bands, avg, lower)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ema, bench_extract, bench_build);
criterion_main!(benches);

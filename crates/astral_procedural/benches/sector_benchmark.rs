//! Benchmark for sector generation.
//!
//! Sector generation sits on the navigation hot path: entering a sector
//! generates it and prefetches 26 neighbours.
//!
//! Run with: cargo bench --package astral_procedural --bench sector_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use astral_procedural::{SectorCoords, SectorGenerator, SectorRng};

fn benchmark_rng_draws(c: &mut Criterion) {
    c.bench_function("rng_next_f64", |b| {
        let mut rng = SectorRng::new(42);
        b.iter(|| black_box(rng.next_f64()));
    });
}

fn benchmark_single_sector(c: &mut Criterion) {
    let generator = SectorGenerator::new(42);

    c.bench_function("single_sector_generation", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x = x.wrapping_add(1);
            black_box(generator.generate(SectorCoords::new(x, x / 2, -x)))
        });
    });
}

fn benchmark_neighbourhood(c: &mut Criterion) {
    let generator = SectorGenerator::new(42);
    let centre = SectorCoords::new(100, -40, 7);

    let mut group = c.benchmark_group("neighbourhood");
    group.throughput(Throughput::Elements(27));
    group.bench_function("centre_plus_26_neighbours", |b| {
        b.iter(|| {
            black_box(generator.generate(centre));
            for coords in centre.neighbors() {
                black_box(generator.generate(coords));
            }
        });
    });
    group.finish();
}

fn benchmark_fingerprint(c: &mut Criterion) {
    let sector = SectorGenerator::new(42).generate(SectorCoords::new(3, 3, 3));

    c.bench_function("static_content_fingerprint", |b| {
        b.iter(|| black_box(sector.static_content().fingerprint()));
    });
}

criterion_group!(
    benches,
    benchmark_rng_draws,
    benchmark_single_sector,
    benchmark_neighbourhood,
    benchmark_fingerprint,
);
criterion_main!(benches);

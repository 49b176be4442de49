//! Benchmarks for segment intersection detection and topology building.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use arcgraph::intersect::find_segment_intersections;
use arcgraph::topology::{BuildOptions, Dataset, LayerInput};
use arcgraph::{ArcStore, Point2};

/// A zigzag between y = 0 and y = 1 crossed by `n` vertical lines.
fn generate_comb(n: usize) -> ArcStore<f64> {
    let zigzag: Vec<Point2<f64>> = (0..=n)
        .map(|i| Point2::new(i as f64, (i % 2) as f64))
        .collect();
    let mut arcs = vec![zigzag];
    for i in 0..n {
        let x = i as f64 + 0.25;
        arcs.push(vec![Point2::new(x, -1.0), Point2::new(x, 2.0)]);
    }
    ArcStore::from_arcs(&arcs).unwrap()
}

/// A grid of unit squares sharing their edges.
fn generate_grid(side: usize) -> LayerInput<f64> {
    let mut rings = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let (x, y) = (col as f64, row as f64);
            rings.push(vec![
                Point2::new(x, y),
                Point2::new(x, y + 1.0),
                Point2::new(x + 1.0, y + 1.0),
                Point2::new(x + 1.0, y),
                Point2::new(x, y),
            ]);
        }
    }
    LayerInput::polygons(rings)
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_segment_intersections");

    for size in [100, 1000, 5000] {
        let arcs = generate_comb(size);
        group.throughput(Throughput::Elements(arcs.point_count() as u64));

        group.bench_with_input(BenchmarkId::new("comb", size), &arcs, |b, arcs| {
            b.iter(|| find_segment_intersections(black_box(arcs)))
        });
    }

    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");

    for side in [10, 50, 100] {
        group.throughput(Throughput::Elements((side * side) as u64));

        group.bench_with_input(BenchmarkId::new("grid", side), &side, |b, &side| {
            b.iter(|| Dataset::import(vec![generate_grid(black_box(side))], BuildOptions::default()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detection, bench_import);
criterion_main!(benches);

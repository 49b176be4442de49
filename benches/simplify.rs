//! Benchmarks for vertex threshold computation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use arcgraph::simplify::{compute_thresholds, SimplifyMethod, SimplifyOptions};
use arcgraph::{ArcStore, Point2};

/// Generates a noisy sine wave polyline.
fn generate_sine_wave(num_points: usize) -> Vec<Point2<f64>> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64 * 4.0 * std::f64::consts::PI;
            let noise = ((i * 17) % 100) as f64 / 1000.0; // Deterministic "noise"
            Point2::new(t, t.sin() + noise)
        })
        .collect()
}

/// Generates a random walk polyline.
fn generate_random_walk(num_points: usize, seed: u64) -> Vec<Point2<f64>> {
    let mut points = Vec::with_capacity(num_points);
    let mut x = 0.0;
    let mut y = 0.0;
    let mut state = seed;

    for _ in 0..num_points {
        points.push(Point2::new(x, y));

        // Simple xorshift for deterministic "random" steps
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;

        let angle = (state as f64 / u64::MAX as f64) * 2.0 * std::f64::consts::PI;
        x += angle.cos() * 0.1;
        y += angle.sin() * 0.1;
    }

    points
}

fn methods() -> [(&'static str, SimplifyMethod<f64>); 3] {
    [
        ("douglas_peucker", SimplifyMethod::DouglasPeucker),
        ("visvalingam", SimplifyMethod::Visvalingam),
        (
            "weighted_visvalingam",
            SimplifyMethod::WeightedVisvalingam { weighting: 0.7 },
        ),
    ]
}

fn bench_thresholds(c: &mut Criterion) {
    for (name, method) in methods() {
        let mut group = c.benchmark_group(name);
        let opts = SimplifyOptions::with_method(method);

        for size in [100, 1000, 10000, 50000] {
            let arcs = ArcStore::from_arcs(&[generate_sine_wave(size)]).unwrap();
            group.throughput(Throughput::Elements(size as u64));

            group.bench_with_input(BenchmarkId::new("sine_wave", size), &arcs, |b, arcs| {
                b.iter(|| compute_thresholds(black_box(arcs), black_box(&opts)))
            });
        }

        for size in [1000, 10000] {
            let arcs = ArcStore::from_arcs(&[generate_random_walk(size, 12345)]).unwrap();
            group.throughput(Throughput::Elements(size as u64));

            group.bench_with_input(BenchmarkId::new("random_walk", size), &arcs, |b, arcs| {
                b.iter(|| compute_thresholds(black_box(arcs), black_box(&opts)))
            });
        }

        group.finish();
    }
}

fn bench_spherical(c: &mut Criterion) {
    let mut group = c.benchmark_group("spherical");

    let size = 5000;
    let arcs = ArcStore::from_arcs(&[generate_random_walk(size, 987)]).unwrap();
    group.throughput(Throughput::Elements(size as u64));

    for (name, method) in methods() {
        let opts = SimplifyOptions::with_method(method).spherical(true);
        group.bench_function(name, |b| {
            b.iter(|| compute_thresholds(black_box(&arcs), black_box(&opts)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_thresholds, bench_spherical);
criterion_main!(benches);

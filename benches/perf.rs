use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use pl_playstyle::cluster_eval::sweep_cluster_counts;
use pl_playstyle::kmeans::{self, KMeansConfig};

/// Synthetic embedding: `per_blob` jittered points around each of four
/// well-separated centers.
fn sample_embedding(per_blob: usize) -> Vec<[f64; 2]> {
    let centers = [[0.0, 0.0], [12.0, 12.0], [-12.0, 12.0], [0.0, -15.0]];
    let mut points = Vec::with_capacity(4 * per_blob);
    for (b, center) in centers.iter().enumerate() {
        for i in 0..per_blob {
            // Deterministic jitter, enough to keep points distinct.
            let dx = ((i * 7 + b * 3) % 11) as f64 * 0.05;
            let dy = ((i * 13 + b * 5) % 11) as f64 * 0.05;
            points.push([center[0] + dx, center[1] + dy]);
        }
    }
    points
}

fn bench_kmeans_fit(c: &mut Criterion) {
    let points = sample_embedding(125);
    let config = KMeansConfig::default();

    c.bench_function("kmeans_fit_500_k4", |b| {
        b.iter(|| {
            let fit = kmeans::fit(black_box(&points), 4, &config).unwrap();
            black_box(fit.inertia);
        })
    });
}

fn bench_cluster_sweep(c: &mut Criterion) {
    let points = sample_embedding(50);
    let config = KMeansConfig::default();

    c.bench_function("cluster_sweep_200_k2_10", |b| {
        b.iter(|| {
            let sweep = sweep_cluster_counts(black_box(&points), 2, 10, &config).unwrap();
            black_box(sweep.selected_k);
        })
    });
}

criterion_group!(benches, bench_kmeans_fit, bench_cluster_sweep);
criterion_main!(benches);

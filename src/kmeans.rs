use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct KMeansConfig {
    pub max_iterations: usize,
    /// Independent random initializations; the fit with lowest inertia wins.
    pub n_init: u32,
    /// Seeds the initialization draws: run i uses `seed + i`.
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            n_init: 10,
            seed: 42,
        }
    }
}

/// Labels and centroids from one clustering call; the two are produced
/// together and stay mutually consistent.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<[f64; 2]>,
    /// Total squared distance from each point to its assigned centroid.
    pub inertia: f64,
    pub iterations: usize,
}

/// Partition 2-D points into k clusters: k-means++ seeding, alternate
/// assign/update until assignments stabilize or `max_iterations` is hit,
/// best of `n_init` restarts by inertia.
pub fn fit(points: &[[f64; 2]], k: usize, config: &KMeansConfig) -> Result<KMeansFit> {
    let n = points.len();
    if n == 0 {
        bail!("cannot cluster an empty point set");
    }
    if k == 0 {
        bail!("cluster count must be at least 1");
    }
    if k > n {
        bail!("cluster count {k} exceeds point count {n}");
    }

    let mut best: Option<KMeansFit> = None;
    for init in 0..config.n_init.max(1) {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(init as u64));
        let result = fit_single(points, k, config.max_iterations, &mut rng);
        if best.as_ref().is_none_or(|b| result.inertia < b.inertia) {
            best = Some(result);
        }
    }

    Ok(best.expect("n_init >= 1 always produces a fit"))
}

fn fit_single(
    points: &[[f64; 2]],
    k: usize,
    max_iterations: usize,
    rng: &mut StdRng,
) -> KMeansFit {
    let n = points.len();
    let mut centroids = plus_plus_init(points, k, rng);
    let mut labels = vec![0usize; n];
    let mut iterations = 0;

    for _ in 0..max_iterations {
        iterations += 1;

        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }

        let mut sums = vec![[0.0f64; 2]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            sums[label][0] += point[0];
            sums[label][1] += point[1];
        }
        for c in 0..k {
            if counts[c] > 0 {
                centroids[c] = [sums[c][0] / counts[c] as f64, sums[c][1] / counts[c] as f64];
            } else {
                // Lost centroid: restart it from a random point.
                centroids[c] = points[rng.gen_range(0..n)];
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &c)| squared_dist(p, &centroids[c]))
        .sum();

    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}

/// k-means++: first centroid uniform, the rest drawn with probability
/// proportional to squared distance from the nearest chosen centroid.
fn plus_plus_init(points: &[[f64; 2]], k: usize, rng: &mut StdRng) -> Vec<[f64; 2]> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)]);

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| squared_dist(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();

        let total: f64 = weights.iter().sum();
        if total <= 1e-15 {
            // All remaining mass at chosen centroids; fall back to uniform.
            centroids.push(points[rng.gen_range(0..n)]);
            continue;
        }

        let threshold = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        let mut chosen = n - 1;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if cumulative >= threshold {
                chosen = i;
                break;
            }
        }
        centroids.push(points[chosen]);
    }

    centroids
}

fn nearest_centroid(point: &[f64; 2], centroids: &[[f64; 2]]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, c) in centroids.iter().enumerate() {
        let d = squared_dist(point, c);
        if d < best_dist {
            best_dist = d;
            best = idx;
        }
    }
    best
}

pub fn squared_dist(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

pub fn dist(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    squared_dist(a, b).sqrt()
}

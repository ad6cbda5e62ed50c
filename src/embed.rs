use anyhow::{Result, bail};
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Clamp on repulsive force updates; large negative-sample gradients can
/// otherwise throw points far outside the layout.
const REPULSIVE_FORCE_CLAMP: f64 = 4.0;

/// Scale of the random initial layout.
const INIT_SCALE: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// Neighborhood size for the kNN graph.
    pub n_neighbors: usize,
    /// Points closer than this in the layout receive no further attraction.
    pub min_dist: f64,
    /// SGD epochs for the layout optimization.
    pub n_epochs: usize,
    /// None reproduces the source behavior (fresh entropy every run); set a
    /// seed for bit-identical embeddings.
    pub seed: Option<u64>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 15,
            min_dist: 0.1,
            n_epochs: 200,
            seed: None,
        }
    }
}

/// Project d-dimensional rows to 2-D, preserving approximate local
/// neighborhood structure.
///
/// Builds a fuzzy k-nearest-neighbor graph (per-point bandwidth found by
/// binary search so membership mass sums to log2(k)), symmetrizes it, and
/// lays the points out with stochastic gradient descent: attraction along
/// graph edges, repulsion against sampled non-edges.
pub fn embed(rows: &[Vec<f64>], config: &EmbedConfig) -> Result<Vec<[f64; 2]>> {
    let n = rows.len();
    if n < 3 {
        bail!("insufficient rows for embedding: got {n}, need at least 3");
    }

    let k = config.n_neighbors.min(n - 1);
    if k < config.n_neighbors {
        warn!(
            "reducing embedding neighborhood from {} to {} ({} rows)",
            config.n_neighbors, k, n
        );
    }

    // Full pairwise Euclidean distances, one row per point.
    let dists: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| (0..n).map(|j| euclidean(&rows[i], &rows[j])).collect())
        .collect();

    // Directed fuzzy memberships over each point's k nearest neighbors.
    let mut memberships = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        let mut neighbors: Vec<(usize, f64)> = (0..n)
            .filter(|&j| j != i)
            .map(|j| (j, dists[i][j]))
            .collect();
        neighbors.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        neighbors.truncate(k);

        let rho = neighbors.first().map(|&(_, d)| d).unwrap_or(0.0);
        let target = (k as f64).log2().max(1.0);
        let sigma = find_sigma(&neighbors, rho, target);

        for &(j, d) in &neighbors {
            memberships[i][j] = if d <= rho {
                1.0
            } else {
                (-(d - rho) / sigma).exp()
            };
        }
    }

    // Symmetrize: p ∪ q = p + q − pq, then collect the edge list.
    let mut edges: Vec<(usize, usize, f64)> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let p = memberships[i][j];
            let q = memberships[j][i];
            let weight = p + q - p * q;
            if weight > 1e-10 {
                edges.push((i, j, weight));
            }
        }
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut layout: Vec<[f64; 2]> = (0..n)
        .map(|_| {
            [
                rng.gen_range(-INIT_SCALE..INIT_SCALE),
                rng.gen_range(-INIT_SCALE..INIT_SCALE),
            ]
        })
        .collect();

    let min_dist_sq = config.min_dist * config.min_dist;
    let initial_lr = 1.0;
    let negatives_per_epoch = (5 * edges.len()).min(n * n);

    for epoch in 0..config.n_epochs {
        let lr = initial_lr * (1.0 - epoch as f64 / config.n_epochs as f64).max(0.001);

        for &(i, j, weight) in &edges {
            let dx = layout[i][0] - layout[j][0];
            let dy = layout[i][1] - layout[j][1];
            let dist_sq = dx * dx + dy * dy + 1e-10;
            if dist_sq <= min_dist_sq {
                continue;
            }
            let grad = -2.0 / (1.0 + dist_sq);
            let force = weight * grad * lr;
            layout[i][0] += force * dx;
            layout[i][1] += force * dy;
            layout[j][0] -= force * dx;
            layout[j][1] -= force * dy;
        }

        for _ in 0..negatives_per_epoch {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            if i == j || memberships[i][j] > 1e-10 || memberships[j][i] > 1e-10 {
                continue;
            }
            let dx = layout[i][0] - layout[j][0];
            let dy = layout[i][1] - layout[j][1];
            let dist_sq = dx * dx + dy * dy + 1e-10;
            let grad = 2.0 / ((0.001 + dist_sq) * (1.0 + dist_sq));
            let force = grad * lr;
            layout[i][0] += (force * dx).clamp(-REPULSIVE_FORCE_CLAMP, REPULSIVE_FORCE_CLAMP);
            layout[i][1] += (force * dy).clamp(-REPULSIVE_FORCE_CLAMP, REPULSIVE_FORCE_CLAMP);
        }
    }

    Ok(layout)
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Binary search for the local bandwidth so the membership mass over the
/// neighborhood approximates `target`.
fn find_sigma(neighbors: &[(usize, f64)], rho: f64, target: f64) -> f64 {
    let mut lo = 1e-10_f64;
    let mut hi = 100.0_f64;

    for _ in 0..64 {
        let mid = (lo + hi) / 2.0;
        let mass: f64 = neighbors
            .iter()
            .map(|&(_, d)| {
                if d <= rho {
                    1.0
                } else {
                    (-(d - rho) / mid).exp()
                }
            })
            .sum();
        if mass > target {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    (lo + hi) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_rows() -> Vec<Vec<f64>> {
        // Two loose groups in 4-D.
        let mut rows = Vec::new();
        for i in 0..6 {
            let off = i as f64 * 0.1;
            rows.push(vec![off, off, 0.0, 0.0]);
            rows.push(vec![8.0 + off, 8.0 + off, 8.0, 8.0]);
        }
        rows
    }

    #[test]
    fn output_shape_matches_input_rows() {
        let rows = blob_rows();
        let layout = embed(&rows, &EmbedConfig::default()).unwrap();
        assert_eq!(layout.len(), rows.len());
        assert!(layout.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
    }

    #[test]
    fn neighborhood_shrinks_for_small_inputs() {
        let rows: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64, 0.0]).collect();
        // n_neighbors (15) exceeds n - 1 (4); must degrade, not crash.
        let layout = embed(&rows, &EmbedConfig::default()).unwrap();
        assert_eq!(layout.len(), 5);
    }

    #[test]
    fn too_few_rows_is_a_clear_error() {
        let rows = vec![vec![0.0], vec![1.0]];
        let err = embed(&rows, &EmbedConfig::default()).unwrap_err();
        assert!(err.to_string().contains("insufficient rows"));
    }

    #[test]
    fn fixed_seed_reproduces_the_layout() {
        let rows = blob_rows();
        let config = EmbedConfig {
            seed: Some(7),
            n_epochs: 50,
            ..EmbedConfig::default()
        };
        let a = embed(&rows, &config).unwrap();
        let b = embed(&rows, &config).unwrap();
        assert_eq!(a, b);
    }
}

use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::kmeans::{self, KMeansConfig, dist};

/// Both quality scores for one candidate cluster count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    pub k: usize,
    pub silhouette: f64,
    pub davies_bouldin: f64,
}

/// Diagnostic artifact from one cluster-count sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSweep {
    pub version: u32,
    pub selected_k: usize,
    pub scores: Vec<SweepPoint>,
}

/// Sweep candidate cluster counts over the embedding, scoring each k with
/// Silhouette and Davies–Bouldin, and pick the k maximizing Silhouette
/// (first maximum wins, so ties resolve to the smallest k).
///
/// The range is clipped to [2, n−1]; a range with no valid k left is an
/// insufficient-data error.
pub fn sweep_cluster_counts(
    points: &[[f64; 2]],
    k_min: usize,
    k_max: usize,
    config: &KMeansConfig,
) -> Result<ClusterSweep> {
    let n = points.len();
    let lo = k_min.max(2);
    let hi = k_max.min(n.saturating_sub(1));

    if hi < lo {
        bail!(
            "insufficient rows for cluster-count sweep: got {n}, need at least {}",
            lo + 1
        );
    }
    if lo != k_min || hi != k_max {
        warn!("clipping cluster-count range {k_min}..={k_max} to {lo}..={hi} for {n} rows");
    }

    let mut scores = Vec::with_capacity(hi - lo + 1);
    for k in lo..=hi {
        let fit = kmeans::fit(points, k, config).with_context(|| format!("cluster with k={k}"))?;
        let silhouette = silhouette_score(points, &fit.labels, k);
        let davies_bouldin = davies_bouldin_score(points, &fit.labels, k);
        info!("k={k}: silhouette={silhouette:.3}, davies-bouldin={davies_bouldin:.3}");
        scores.push(SweepPoint {
            k,
            silhouette,
            davies_bouldin,
        });
    }

    let selected_k = select_best_k(&scores).expect("sweep range is non-empty");
    info!("selected cluster count k={selected_k}");

    Ok(ClusterSweep {
        version: 1,
        selected_k,
        scores,
    })
}

/// First k attaining the maximum Silhouette score.
pub fn select_best_k(scores: &[SweepPoint]) -> Option<usize> {
    let mut best: Option<&SweepPoint> = None;
    for point in scores {
        if best.is_none_or(|b| point.silhouette > b.silhouette) {
            best = Some(point);
        }
    }
    best.map(|p| p.k)
}

/// Mean silhouette coefficient s = (b − a) / max(a, b) over all points,
/// where a is the mean distance to same-cluster points and b the mean
/// distance to the nearest other cluster. Singleton clusters score 0.
pub fn silhouette_score(points: &[[f64; 2]], labels: &[usize], k: usize) -> f64 {
    let n = points.len();
    if n == 0 || k < 2 {
        return 0.0;
    }

    let mut cluster_sizes = vec![0usize; k];
    for &label in labels {
        cluster_sizes[label] += 1;
    }

    let mut total = 0.0;
    for i in 0..n {
        let own = labels[i];
        if cluster_sizes[own] <= 1 {
            continue; // s = 0 for singletons
        }

        let mut sums = vec![0.0f64; k];
        for j in 0..n {
            if i != j {
                sums[labels[j]] += dist(&points[i], &points[j]);
            }
        }

        let a = sums[own] / (cluster_sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && cluster_sizes[c] > 0)
            .map(|c| sums[c] / cluster_sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 && b.is_finite() {
            total += (b - a) / denom;
        }
    }

    total / n as f64
}

/// Davies–Bouldin index: for each cluster, the worst-case ratio of summed
/// within-cluster scatter to centroid separation, averaged over clusters.
/// Lower is better.
pub fn davies_bouldin_score(points: &[[f64; 2]], labels: &[usize], k: usize) -> f64 {
    if k < 2 {
        return 0.0;
    }

    let mut centroids = vec![[0.0f64; 2]; k];
    let mut counts = vec![0usize; k];
    for (point, &label) in points.iter().zip(labels) {
        centroids[label][0] += point[0];
        centroids[label][1] += point[1];
        counts[label] += 1;
    }
    for c in 0..k {
        if counts[c] > 0 {
            centroids[c][0] /= counts[c] as f64;
            centroids[c][1] /= counts[c] as f64;
        }
    }

    // Mean distance of members to their own centroid.
    let mut scatter = vec![0.0f64; k];
    for (point, &label) in points.iter().zip(labels) {
        scatter[label] += dist(point, &centroids[label]);
    }
    for c in 0..k {
        if counts[c] > 0 {
            scatter[c] /= counts[c] as f64;
        }
    }

    let mut total = 0.0;
    let mut used = 0usize;
    for i in 0..k {
        if counts[i] == 0 {
            continue;
        }
        let mut worst = 0.0f64;
        for j in 0..k {
            if i == j || counts[j] == 0 {
                continue;
            }
            let separation = dist(&centroids[i], &centroids[j]).max(1e-12);
            worst = worst.max((scatter[i] + scatter[j]) / separation);
        }
        total += worst;
        used += 1;
    }

    if used == 0 { 0.0 } else { total / used as f64 }
}

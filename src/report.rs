use crate::features::FeatureMatrix;
use crate::kmeans::{KMeansFit, dist};

/// Features reported per cluster.
const TOP_FEATURES: usize = 5;
/// Nearest-to-centroid members reported per cluster.
const REPRESENTATIVES: usize = 3;

/// One feature that stands out for a cluster, with its mean over the
/// cluster and the ratio to the feature's global mean. The ranking is the
/// source's heuristic (raw means, not z-scores) kept for compatibility.
#[derive(Debug, Clone)]
pub struct FeatureHighlight {
    pub name: String,
    pub cluster_mean: f64,
    /// cluster mean / global mean; 0 when the global mean is ~0.
    pub vs_global: f64,
}

#[derive(Debug, Clone)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    pub top_features: Vec<FeatureHighlight>,
    /// Player names closest to the cluster centroid, nearest first.
    pub representatives: Vec<String>,
}

/// Per-cluster summaries: top features by raw mean and the members nearest
/// the centroid in embedding space.
pub fn summarize_clusters(
    names: &[String],
    matrix: &FeatureMatrix,
    embedding: &[[f64; 2]],
    fit: &KMeansFit,
) -> Vec<ClusterSummary> {
    let k = fit.centroids.len();
    let d = matrix.n_cols();
    let global_means: Vec<f64> = (0..d).map(|col| matrix.column_mean(col)).collect();

    let mut summaries = Vec::with_capacity(k);
    for c in 0..k {
        let members: Vec<usize> = fit
            .labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == c)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            summaries.push(ClusterSummary {
                cluster: c,
                size: 0,
                top_features: Vec::new(),
                representatives: Vec::new(),
            });
            continue;
        }

        let mut means: Vec<(usize, f64)> = (0..d)
            .map(|col| {
                let sum: f64 = members.iter().map(|&i| matrix.rows[i][col]).sum();
                (col, sum / members.len() as f64)
            })
            .collect();
        means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let top_features = means
            .iter()
            .take(TOP_FEATURES)
            .map(|&(col, cluster_mean)| FeatureHighlight {
                name: matrix.columns[col].clone(),
                cluster_mean,
                vs_global: if global_means[col].abs() > 1e-12 {
                    cluster_mean / global_means[col]
                } else {
                    0.0
                },
            })
            .collect();

        let mut by_distance: Vec<(usize, f64)> = members
            .iter()
            .map(|&i| (i, dist(&embedding[i], &fit.centroids[c])))
            .collect();
        by_distance.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let representatives = by_distance
            .iter()
            .take(REPRESENTATIVES)
            .map(|&(i, _)| names.get(i).cloned().unwrap_or_default())
            .collect();

        summaries.push(ClusterSummary {
            cluster: c,
            size: members.len(),
            top_features,
            representatives,
        });
    }

    summaries
}

/// The combined per-player output table: identity, cluster, embedding
/// coordinates, then every prepared feature value.
pub fn results_table(
    names: &[String],
    matrix: &FeatureMatrix,
    embedding: &[[f64; 2]],
    labels: &[usize],
) -> Vec<Vec<String>> {
    let mut header = vec![
        "Name".to_string(),
        "Cluster".to_string(),
        "UMAP1".to_string(),
        "UMAP2".to_string(),
    ];
    header.extend(matrix.columns.iter().cloned());

    let mut rows = vec![header];
    for (i, name) in names.iter().enumerate() {
        let mut row = vec![
            name.clone(),
            labels[i].to_string(),
            embedding[i][0].to_string(),
            embedding[i][1].to_string(),
        ];
        row.extend(matrix.rows[i].iter().map(|v| v.to_string()));
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureMatrix;
    use crate::kmeans::KMeansFit;

    fn fixture() -> (Vec<String>, FeatureMatrix, Vec<[f64; 2]>, KMeansFit) {
        let names: Vec<String> = (0..6).map(|i| format!("Player {i}")).collect();
        let matrix = FeatureMatrix {
            columns: vec!["Goals".to_string(), "Tackles".to_string()],
            rows: vec![
                vec![4.0, 1.0],
                vec![5.0, 1.0],
                vec![6.0, 1.0],
                vec![0.0, 8.0],
                vec![0.0, 9.0],
                vec![0.0, 10.0],
            ],
        };
        let embedding = vec![
            [0.0, 0.0],
            [0.5, 0.0],
            [1.0, 0.0],
            [10.0, 10.0],
            [10.5, 10.0],
            [11.0, 10.0],
        ];
        let fit = KMeansFit {
            labels: vec![0, 0, 0, 1, 1, 1],
            centroids: vec![[0.5, 0.0], [10.5, 10.0]],
            inertia: 0.0,
            iterations: 1,
        };
        (names, matrix, embedding, fit)
    }

    #[test]
    fn top_features_rank_by_cluster_mean() {
        let (names, matrix, embedding, fit) = fixture();
        let summaries = summarize_clusters(&names, &matrix, &embedding, &fit);

        assert_eq!(summaries[0].top_features[0].name, "Goals");
        assert_eq!(summaries[1].top_features[0].name, "Tackles");

        // Cluster 0 mean goals = 5, global mean = 2.5 → ratio 2.
        let goals = &summaries[0].top_features[0];
        assert!((goals.cluster_mean - 5.0).abs() < 1e-12);
        assert!((goals.vs_global - 2.0).abs() < 1e-12);
    }

    #[test]
    fn representatives_are_nearest_to_centroid() {
        let (names, matrix, embedding, fit) = fixture();
        let summaries = summarize_clusters(&names, &matrix, &embedding, &fit);

        // Player 1 sits exactly on cluster 0's centroid.
        assert_eq!(summaries[0].representatives[0], "Player 1");
        assert_eq!(summaries[0].representatives.len(), 3);

        for summary in &summaries {
            let reported: Vec<f64> = summary
                .representatives
                .iter()
                .map(|name| {
                    let i = names.iter().position(|n| n == name).unwrap();
                    dist(&embedding[i], &fit.centroids[summary.cluster])
                })
                .collect();
            let worst_reported = reported.iter().cloned().fold(0.0f64, f64::max);
            for (i, &label) in fit.labels.iter().enumerate() {
                if label == summary.cluster && !summary.representatives.contains(&names[i]) {
                    let d = dist(&embedding[i], &fit.centroids[summary.cluster]);
                    assert!(d >= worst_reported);
                }
            }
        }
    }

    #[test]
    fn results_table_joins_identity_cluster_and_features() {
        let (names, matrix, embedding, fit) = fixture();
        let rows = results_table(&names, &matrix, &embedding, &fit.labels);

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0][..4], ["Name", "Cluster", "UMAP1", "UMAP2"]);
        assert_eq!(rows[0][4], "Goals");
        assert_eq!(rows[1][0], "Player 0");
        assert_eq!(rows[1][1], "0");
        assert_eq!(rows[4][1], "1");
        assert_eq!(rows[4][4], "0");
    }
}

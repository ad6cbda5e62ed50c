use std::path::PathBuf;

use crate::embed::EmbedConfig;
use crate::kmeans::KMeansConfig;

/// Everything one batch run needs, collected up front and passed explicitly
/// through the pipeline stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub embedding_csv: PathBuf,
    pub embedding_plot: PathBuf,
    pub silhouette_plot: PathBuf,
    pub davies_bouldin_plot: PathBuf,
    pub sweep_json: PathBuf,
    pub cluster_plot: PathBuf,
    pub results_csv: PathBuf,
    pub team_stats_dir: PathBuf,
    /// Inclusive candidate range for the cluster-count sweep.
    pub k_min: usize,
    pub k_max: usize,
    pub kmeans: KMeansConfig,
    pub embed: EmbedConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("results.csv"),
            embedding_csv: PathBuf::from("umap_results_clean.csv"),
            embedding_plot: PathBuf::from("umap_visualization.png"),
            silhouette_plot: PathBuf::from("silhouette_score.png"),
            davies_bouldin_plot: PathBuf::from("davies_bouldin_score.png"),
            sweep_json: PathBuf::from("cluster_sweep.json"),
            cluster_plot: PathBuf::from("kmeans_clusters.png"),
            results_csv: PathBuf::from("kmeans_cluster_results.csv"),
            team_stats_dir: PathBuf::from("team_stats_results"),
            k_min: 2,
            k_max: 10,
            kmeans: KMeansConfig::default(),
            embed: EmbedConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Build a config from the environment, falling back to the fixed
    /// defaults for anything unset. A bare run needs no environment at all.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = env_path("PLSTYLE_INPUT") {
            config.input_path = path;
        }
        if let Some(dir) = env_path("PLSTYLE_OUT_DIR") {
            config.embedding_csv = dir.join("umap_results_clean.csv");
            config.embedding_plot = dir.join("umap_visualization.png");
            config.silhouette_plot = dir.join("silhouette_score.png");
            config.davies_bouldin_plot = dir.join("davies_bouldin_score.png");
            config.sweep_json = dir.join("cluster_sweep.json");
            config.cluster_plot = dir.join("kmeans_clusters.png");
            config.results_csv = dir.join("kmeans_cluster_results.csv");
            config.team_stats_dir = dir.join("team_stats_results");
        }

        config.k_min = env_parse("PLSTYLE_K_MIN").unwrap_or(config.k_min).max(2);
        config.k_max = env_parse("PLSTYLE_K_MAX")
            .unwrap_or(config.k_max)
            .max(config.k_min);
        config.kmeans.seed = env_parse("PLSTYLE_KMEANS_SEED").unwrap_or(config.kmeans.seed);
        config.embed.seed = env_parse("PLSTYLE_EMBED_SEED").or(config.embed.seed);

        config
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse::<T>().ok())
}

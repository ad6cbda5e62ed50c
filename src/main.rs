use anyhow::{Context, Result};
use log::info;

use pl_playstyle::config::PipelineConfig;
use pl_playstyle::dataset::PlayerTable;
use pl_playstyle::{
    cluster_eval, embed, export, features, kmeans, plot, report, standardize, team_stats,
};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::from_env();
    run(&config)
}

fn run(config: &PipelineConfig) -> Result<()> {
    info!("loading player table from {}", config.input_path.display());
    let table = PlayerTable::from_csv(&config.input_path).context("load player stats table")?;
    info!("{} players loaded", table.len());

    let matrix = features::prepare_features(&table).context("prepare feature matrix")?;
    let (scaled, _scaling) = standardize::standardize(&matrix);

    info!(
        "embedding {} players x {} features",
        matrix.n_rows(),
        matrix.n_cols()
    );
    let embedding = embed::embed(&scaled, &config.embed).context("embed players")?;

    let names = table.player_names();
    export::write_embedding_csv(&config.embedding_csv, &names, &embedding)
        .context("write embedding table")?;
    plot::embedding_scatter(&config.embedding_plot, &embedding)?;

    let sweep =
        cluster_eval::sweep_cluster_counts(&embedding, config.k_min, config.k_max, &config.kmeans)
            .context("select cluster count")?;
    plot::silhouette_plot(&config.silhouette_plot, &sweep.scores)?;
    plot::davies_bouldin_plot(&config.davies_bouldin_plot, &sweep.scores)?;
    export::write_sweep_json(&config.sweep_json, &sweep).context("write sweep artifact")?;

    let fit =
        kmeans::fit(&embedding, sweep.selected_k, &config.kmeans).context("cluster embedding")?;
    plot::cluster_scatter(&config.cluster_plot, &embedding, &fit)?;

    let summaries = report::summarize_clusters(&names, &matrix, &embedding, &fit);
    for summary in &summaries {
        info!("cluster {} ({} players)", summary.cluster, summary.size);
        for feature in &summary.top_features {
            info!(
                "  {}: {:.2} ({:.1}x average)",
                feature.name, feature.cluster_mean, feature.vs_global
            );
        }
        info!("  representatives: {}", summary.representatives.join(", "));
    }

    let rows = report::results_table(&names, &matrix, &embedding, &fit.labels);
    export::write_rows_csv(&config.results_csv, &rows).context("write cluster results table")?;

    team_stats::export_team_stats(&table, &matrix, &config.team_stats_dir)
        .context("export team statistics")?;

    info!("pipeline complete");
    Ok(())
}

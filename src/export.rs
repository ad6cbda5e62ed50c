use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cluster_eval::ClusterSweep;

/// Write a header-plus-data row table as CSV, overwriting any previous run.
pub fn write_rows_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        writer
            .write_record(row)
            .with_context(|| format!("write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// The embedding-only table: `Player, UMAP1, UMAP2`, one row per input row.
pub fn write_embedding_csv(path: &Path, names: &[String], embedding: &[[f64; 2]]) -> Result<()> {
    let mut rows = Vec::with_capacity(names.len() + 1);
    rows.push(vec![
        "Player".to_string(),
        "UMAP1".to_string(),
        "UMAP2".to_string(),
    ]);
    for (name, point) in names.iter().zip(embedding) {
        rows.push(vec![
            name.clone(),
            point[0].to_string(),
            point[1].to_string(),
        ]);
    }
    write_rows_csv(path, &rows)
}

/// The cluster-count-sweep diagnostic artifact.
pub fn write_sweep_json(path: &Path, sweep: &ClusterSweep) -> Result<()> {
    let json = serde_json::to_string_pretty(sweep).context("serialize sweep artifact")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

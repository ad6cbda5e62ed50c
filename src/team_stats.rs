use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;

use crate::dataset::PlayerTable;
use crate::export::write_rows_csv;
use crate::features::FeatureMatrix;

/// Per-team aggregation over the prepared feature matrix: a Median/Mean/Std
/// table per team plus an Overall row, the best team per metric, and the
/// top 3 players per metric.
///
/// Ancillary to the clustering core: a table without a `Team` column is
/// skipped with a warning rather than failing the run.
pub fn export_team_stats(
    table: &PlayerTable,
    matrix: &FeatureMatrix,
    out_dir: &Path,
) -> Result<()> {
    let Some(team_col) = table.column_index("Team") else {
        warn!("input has no 'Team' column; skipping team statistics");
        return Ok(());
    };

    fs::create_dir_all(out_dir)
        .with_context(|| format!("create team stats directory {}", out_dir.display()))?;

    let teams = table.column(team_col);
    let mut by_team: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, team) in teams.iter().enumerate() {
        if !team.is_empty() {
            by_team.entry(team).or_default().push(i);
        }
    }

    write_summary_table(matrix, &by_team, &out_dir.join("results2.csv"))?;
    write_top_team_per_metric(matrix, &by_team, &out_dir.join("top_team_per_metric.txt"))?;
    write_top_players(table, matrix, &out_dir.join("top_3_ranking.txt"))?;

    Ok(())
}

fn write_summary_table(
    matrix: &FeatureMatrix,
    by_team: &BTreeMap<&str, Vec<usize>>,
    path: &Path,
) -> Result<()> {
    let mut header = vec!["Team".to_string()];
    for name in &matrix.columns {
        header.push(format!("{name}_Median"));
        header.push(format!("{name}_Mean"));
        header.push(format!("{name}_Std"));
    }

    let mut rows = vec![header];
    for (team, members) in by_team {
        rows.push(summary_row(team, matrix, members));
    }
    let everyone: Vec<usize> = (0..matrix.n_rows()).collect();
    rows.push(summary_row("Overall", matrix, &everyone));

    write_rows_csv(path, &rows)
}

fn summary_row(label: &str, matrix: &FeatureMatrix, members: &[usize]) -> Vec<String> {
    let mut row = vec![label.to_string()];
    for col in 0..matrix.n_cols() {
        let values: Vec<f64> = members.iter().map(|&i| matrix.rows[i][col]).collect();
        row.push(format!("{:.2}", median(&values)));
        row.push(format!("{:.2}", mean(&values)));
        row.push(format!("{:.2}", sample_std(&values)));
    }
    row
}

fn write_top_team_per_metric(
    matrix: &FeatureMatrix,
    by_team: &BTreeMap<&str, Vec<usize>>,
    path: &Path,
) -> Result<()> {
    let mut lines = Vec::with_capacity(matrix.n_cols());
    for (col, name) in matrix.columns.iter().enumerate() {
        let mut best: Option<(&str, f64)> = None;
        for (team, members) in by_team {
            let avg = mean(&members.iter().map(|&i| matrix.rows[i][col]).collect::<Vec<_>>());
            if best.is_none_or(|(_, b)| avg > b) {
                best = Some((team, avg));
            }
        }
        if let Some((team, value)) = best {
            lines.push(format!("{name}: {team} ({value:.2})"));
        }
    }

    fs::write(path, lines.join("\n")).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn write_top_players(table: &PlayerTable, matrix: &FeatureMatrix, path: &Path) -> Result<()> {
    let names = table.player_names();
    let team_col = table.column_index("Team");
    let teams: Vec<String> = match team_col {
        Some(idx) => table.column(idx).iter().map(|t| t.to_string()).collect(),
        None => vec![String::new(); table.len()],
    };

    let mut lines = Vec::new();
    for (col, metric) in matrix.columns.iter().enumerate() {
        let mut ranked: Vec<usize> = (0..matrix.n_rows()).collect();
        ranked.sort_by(|&a, &b| {
            matrix.rows[b][col]
                .partial_cmp(&matrix.rows[a][col])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        lines.push(format!("\n{metric}:"));
        for &i in ranked.iter().take(3) {
            lines.push(format!(
                "  {} ({}): {:.2}",
                names[i], teams[i], matrix.rows[i][col]
            ));
        }
    }

    fs::write(path, lines.join("\n")).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Sample standard deviation (n − 1 denominator); 0 for fewer than 2 values.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

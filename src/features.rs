use anyhow::{Result, bail};

use crate::dataset::{MISSING_TOKEN, PlayerTable};

/// The fixed set of per-player metrics fed to the clustering pipeline,
/// spanning passing, shooting, creation, defense, possession and
/// goalkeeping. Column order here is the column order of the matrix.
pub const FEATURE_COLUMNS: [&str; 39] = [
    "Progressive Carries (PrgC)",
    "Goals per 90",
    "Assists per 90",
    "xG per 90",
    "xAG per 90",
    "Goals Against per 90 (GA90)",
    "Save Percentage (Save%)",
    "Clean Sheets Percentage (CS%)",
    "Penalty Kicks Save Percentage",
    "Shots on Target Percentage (SoT%)",
    "Shots on Target per 90 (SoT/90)",
    "Goals per Shot (G/Sh)",
    "Average Shot Distance (Dist)",
    "Pass Completion Percentage (Cmp%)",
    "Key Passes (KP)",
    "Passes into Final Third (1/3)",
    "Passes into Penalty Area (PPA)",
    "Shot-Creating Actions (SCA)",
    "SCA per 90",
    "Goal-Creating Actions (GCA)",
    "GCA per 90",
    "Tackles Won (TklW)",
    "Challenges (Tkl)",
    "Challenges Lost (TklD)",
    "Blocked Shots (Sh)",
    "Interceptions (Int)",
    "Touches in Attacking Third",
    "Take-On Success Percentage (Succ%)",
    "Take-On Tackled Percentage (Tkl%)",
    "Carries",
    "Progressive Carrying Distance (TotDist)",
    "Carries into Final Third (1/3)",
    "Carries into Penalty Area (CPA)",
    "Passes Received (Rec)",
    "Progressive Passes Received (PrgR)",
    "Offsides (Off)",
    "Crosses (Crs)",
    "Ball Recoveries (Recov)",
    "Aerials Won Percentage (Won%)",
];

/// Fully numeric players × features matrix. Invariant: every cell is a
/// finite f64 (imputation has already run).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_values(&self, col: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[col]).collect()
    }

    /// Mean of one column over all rows.
    pub fn column_mean(&self, col: usize) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.rows.iter().map(|row| row[col]).sum::<f64>() / self.rows.len() as f64
    }
}

/// Project the raw table to the fixed feature columns, coerce every cell to
/// a number, and fill gaps with the per-column median of present values.
///
/// A feature column missing from the header, or present but with no
/// parseable value in any row, is a configuration error and aborts the run.
pub fn prepare_features(table: &PlayerTable) -> Result<FeatureMatrix> {
    prepare_named_features(table, &FEATURE_COLUMNS)
}

pub fn prepare_named_features(table: &PlayerTable, columns: &[&str]) -> Result<FeatureMatrix> {
    let mut indices = Vec::with_capacity(columns.len());
    for &name in columns {
        let Some(idx) = table.column_index(name) else {
            bail!("feature column '{name}' missing from input table");
        };
        indices.push(idx);
    }

    let n = table.len();
    let mut rows = vec![vec![0.0f64; columns.len()]; n];

    for (out_col, (&name, &src_col)) in columns.iter().zip(&indices).enumerate() {
        let cells = table.column(src_col);
        let parsed: Vec<Option<f64>> = cells.iter().map(|cell| parse_cell(cell)).collect();

        let mut present: Vec<f64> = parsed.iter().filter_map(|v| *v).collect();
        if present.is_empty() {
            bail!("feature column '{name}' has no numeric values; median imputation undefined");
        }
        let fill = median(&mut present);

        for (row, value) in rows.iter_mut().zip(&parsed) {
            row[out_col] = value.unwrap_or(fill);
        }
    }

    Ok(FeatureMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}

/// Parse one raw cell. The `N/a` sentinel, empty cells, bare dashes and
/// anything unparseable all count as absent. Thousands separators and a
/// trailing percent sign are tolerated.
pub fn parse_cell(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" || s.eq_ignore_ascii_case(MISSING_TOKEN) {
        return None;
    }
    let cleaned = s.replace(',', "");
    let cleaned = cleaned.trim_end_matches('%');
    let value = cleaned.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Median of the given values; sorts in place.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

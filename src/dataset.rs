use std::path::Path;

use anyhow::{Context, Result, bail};

/// Missing-value token used by the upstream collection stage.
pub const MISSING_TOKEN: &str = "N/a";

/// One season of player statistics, as read from disk: every cell kept as
/// raw text so downstream stages decide how to interpret it.
#[derive(Debug, Clone)]
pub struct PlayerTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    name_col: usize,
}

impl PlayerTable {
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .from_path(path)
            .with_context(|| format!("open player stats table {}", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .context("read header row")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let Some(name_col) = headers.iter().position(|h| h == "Name") else {
            bail!("required column 'Name' missing from {}", path.display());
        };

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("read row {}", idx + 1))?;
            rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
        }

        Ok(Self {
            headers,
            rows,
            name_col,
        })
    }

    /// Build a table directly from rows, for callers that already hold the
    /// data in memory. Fails if `headers` has no `Name` column.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let Some(name_col) = headers.iter().position(|h| h == "Name") else {
            bail!("required column 'Name' missing from headers");
        };
        Ok(Self {
            headers,
            rows,
            name_col,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn player_names(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(self.name_col).cloned().unwrap_or_default())
            .collect()
    }

    /// Raw cells of one column, empty string for short rows.
    pub fn column(&self, idx: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_column_is_required() {
        let err = PlayerTable::from_rows(
            vec!["Team".to_string(), "Goals".to_string()],
            vec![vec!["Arsenal".to_string(), "2".to_string()]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("Name"));
    }

    #[test]
    fn player_names_follow_row_order() {
        let table = PlayerTable::from_rows(
            vec!["Name".to_string(), "Goals".to_string()],
            vec![
                vec!["Saka".to_string(), "14".to_string()],
                vec!["Haaland".to_string(), "27".to_string()],
            ],
        )
        .unwrap();
        assert_eq!(table.player_names(), vec!["Saka", "Haaland"]);
        assert_eq!(table.column(1), vec!["14", "27"]);
    }
}

use pl_playstyle::dataset::PlayerTable;
use pl_playstyle::features::{FEATURE_COLUMNS, prepare_features};
use pl_playstyle::standardize::standardize;

/// Build a table carrying every pipeline feature column, with values derived
/// from the row index and a sprinkling of `N/a` cells.
fn synthetic_table(n_players: usize) -> PlayerTable {
    let mut headers = vec!["Name".to_string(), "Team".to_string()];
    headers.extend(FEATURE_COLUMNS.iter().map(|c| c.to_string()));

    let mut rows = Vec::with_capacity(n_players);
    for i in 0..n_players {
        let mut row = vec![format!("Player {i}"), format!("Team {}", i % 4)];
        for (j, _) in FEATURE_COLUMNS.iter().enumerate() {
            if (i + j) % 7 == 3 {
                row.push("N/a".to_string());
            } else {
                row.push(format!("{}", (i * 3 + j) % 20));
            }
        }
        rows.push(row);
    }
    PlayerTable::from_rows(headers, rows).unwrap()
}

#[test]
fn prepares_every_configured_feature_column() {
    let table = synthetic_table(12);
    let matrix = prepare_features(&table).unwrap();

    assert_eq!(matrix.n_rows(), 12);
    assert_eq!(matrix.n_cols(), FEATURE_COLUMNS.len());
    assert!(
        matrix
            .rows
            .iter()
            .all(|row| row.iter().all(|v| v.is_finite()))
    );
}

#[test]
fn preparation_is_idempotent() {
    let table = synthetic_table(10);
    let first = prepare_features(&table).unwrap();

    // Feed the prepared output straight back through the preparer.
    let mut headers = vec!["Name".to_string()];
    headers.extend(first.columns.iter().cloned());
    let rows = first
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut out = vec![format!("Player {i}")];
            out.extend(row.iter().map(|v| v.to_string()));
            out
        })
        .collect();
    let round_trip = PlayerTable::from_rows(headers, rows).unwrap();
    let second = prepare_features(&round_trip).unwrap();

    assert_eq!(first, second);
}

#[test]
fn standardized_features_are_centered() {
    let table = synthetic_table(20);
    let matrix = prepare_features(&table).unwrap();
    let (scaled, _) = standardize(&matrix);

    for j in 0..matrix.n_cols() {
        let mean: f64 = scaled.iter().map(|r| r[j]).sum::<f64>() / scaled.len() as f64;
        let var: f64 =
            scaled.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / scaled.len() as f64;
        assert!(mean.abs() < 1e-9, "column {j} mean {mean}");
        // Constant columns standardize to all zeros; everything else to unit variance.
        assert!(var.abs() < 1e-9 || (var - 1.0).abs() < 1e-9, "column {j} var {var}");
    }
}

#[test]
fn a_table_missing_one_feature_column_fails_by_name() {
    let dropped = FEATURE_COLUMNS[5];
    let mut headers = vec!["Name".to_string()];
    headers.extend(
        FEATURE_COLUMNS
            .iter()
            .filter(|&&c| c != dropped)
            .map(|c| c.to_string()),
    );
    let rows = vec![{
        let mut row = vec!["Player".to_string()];
        row.extend(std::iter::repeat_n("1".to_string(), FEATURE_COLUMNS.len() - 1));
        row
    }];
    let table = PlayerTable::from_rows(headers, rows).unwrap();

    let err = prepare_features(&table).unwrap_err();
    assert!(err.to_string().contains(dropped));
}

use crate::features::FeatureMatrix;

/// Per-column scaling parameters learned from one matrix. Local to a single
/// pipeline run; never persisted.
#[derive(Debug, Clone)]
pub struct ColumnScaling {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

/// Rescale each column to zero mean and unit variance (population std).
/// Zero-variance columns come out as all zeros rather than dividing by a
/// vanishing std.
pub fn standardize(matrix: &FeatureMatrix) -> (Vec<Vec<f64>>, ColumnScaling) {
    let n = matrix.n_rows();
    let d = matrix.n_cols();
    let mut means = vec![0.0f64; d];
    let mut stds = vec![0.0f64; d];

    if n == 0 {
        return (Vec::new(), ColumnScaling { means, stds });
    }

    for row in &matrix.rows {
        for (j, &v) in row.iter().enumerate() {
            means[j] += v;
        }
    }
    for m in &mut means {
        *m /= n as f64;
    }

    for row in &matrix.rows {
        for (j, &v) in row.iter().enumerate() {
            stds[j] += (v - means[j]).powi(2);
        }
    }
    for s in &mut stds {
        *s = (*s / n as f64).sqrt();
    }

    let scaled = matrix
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(j, &v)| {
                    if stds[j] <= 1e-12 {
                        0.0
                    } else {
                        (v - means[j]) / stds[j]
                    }
                })
                .collect()
        })
        .collect();

    (scaled, ColumnScaling { means, stds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureMatrix;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let cols = (0..rows[0].len()).map(|i| format!("f{i}")).collect();
        FeatureMatrix {
            columns: cols,
            rows,
        }
    }

    #[test]
    fn columns_come_out_centered_with_unit_variance() {
        let m = matrix(vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ]);
        let (scaled, scaling) = standardize(&m);

        for j in 0..2 {
            let mean: f64 = scaled.iter().map(|r| r[j]).sum::<f64>() / scaled.len() as f64;
            let var: f64 =
                scaled.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / scaled.len() as f64;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
        assert!((scaling.means[0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn constant_column_maps_to_zeros() {
        let m = matrix(vec![vec![2.0], vec![2.0], vec![2.0], vec![2.0]]);
        let (scaled, _) = standardize(&m);
        assert!(scaled.iter().all(|r| r[0] == 0.0));
    }
}

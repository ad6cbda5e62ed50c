use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::cluster_eval::SweepPoint;
use crate::kmeans::KMeansFit;

const LINE_PLOT_SIZE: (u32, u32) = (800, 600);
const SCATTER_PLOT_SIZE: (u32, u32) = (1200, 800);

/// Silhouette score vs candidate k.
pub fn silhouette_plot(path: &Path, scores: &[SweepPoint]) -> Result<()> {
    let series: Vec<(f64, f64)> = scores.iter().map(|p| (p.k as f64, p.silhouette)).collect();
    score_line_plot(
        path,
        "Silhouette Score for Optimal Cluster Selection",
        "Silhouette Score",
        &series,
        &BLUE,
    )
    .with_context(|| format!("render silhouette plot {}", path.display()))
}

/// Davies–Bouldin score vs candidate k (lower is better).
pub fn davies_bouldin_plot(path: &Path, scores: &[SweepPoint]) -> Result<()> {
    let series: Vec<(f64, f64)> = scores
        .iter()
        .map(|p| (p.k as f64, p.davies_bouldin))
        .collect();
    score_line_plot(
        path,
        "Davies-Bouldin Score (lower is better)",
        "Davies-Bouldin Score",
        &series,
        &RED,
    )
    .with_context(|| format!("render davies-bouldin plot {}", path.display()))
}

fn score_line_plot(
    path: &Path,
    title: &str,
    y_label: &str,
    series: &[(f64, f64)],
    color: &RGBColor,
) -> Result<()> {
    let root = BitMapBackend::new(path, LINE_PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_range, y_range) = padded_ranges(series);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("Number of clusters")
        .y_desc(y_label)
        .draw()?;

    chart.draw_series(LineSeries::new(series.iter().copied(), color))?;
    chart.draw_series(
        series
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Plain embedding scatter, before any clustering.
pub fn embedding_scatter(path: &Path, embedding: &[[f64; 2]]) -> Result<()> {
    let root = BitMapBackend::new(path, SCATTER_PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let series: Vec<(f64, f64)> = embedding.iter().map(|p| (p[0], p[1])).collect();
    let (x_range, y_range) = padded_ranges(&series);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Player Distribution by Technical Characteristics",
            ("sans-serif", 28),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("UMAP Dimension 1")
        .y_desc("UMAP Dimension 2")
        .draw()?;

    chart.draw_series(
        series
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.7).filled())),
    )?;

    root.present()
        .with_context(|| format!("render embedding scatter {}", path.display()))?;
    Ok(())
}

/// Cluster assignment scatter: points colored by cluster, convex hulls for
/// clusters with at least 3 members, centroids marked and annotated with
/// the cluster id and size.
pub fn cluster_scatter(path: &Path, embedding: &[[f64; 2]], fit: &KMeansFit) -> Result<()> {
    let root = BitMapBackend::new(path, SCATTER_PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let series: Vec<(f64, f64)> = embedding.iter().map(|p| (p[0], p[1])).collect();
    let (x_range, y_range) = padded_ranges(&series);

    let k = fit.centroids.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Player Clustering with KMeans (k={k})"), ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("UMAP Dimension 1")
        .y_desc("UMAP Dimension 2")
        .draw()?;

    for c in 0..k {
        let members: Vec<[f64; 2]> = embedding
            .iter()
            .zip(&fit.labels)
            .filter(|&(_, &label)| label == c)
            .map(|(p, _)| *p)
            .collect();
        let color = Palette99::pick(c);

        if members.len() >= 3 {
            let hull = convex_hull(&members);
            if hull.len() >= 3 {
                chart.draw_series(std::iter::once(Polygon::new(
                    hull.iter().map(|p| (p[0], p[1])).collect::<Vec<_>>(),
                    color.mix(0.1),
                )))?;
            }
        }

        chart.draw_series(
            members
                .iter()
                .map(|p| Circle::new((p[0], p[1]), 4, color.mix(0.8).filled())),
        )?;
    }

    let cluster_sizes: Vec<usize> = (0..k)
        .map(|c| fit.labels.iter().filter(|&&l| l == c).count())
        .collect();
    for (c, centroid) in fit.centroids.iter().enumerate() {
        let point = (centroid[0], centroid[1]);
        chart.draw_series(std::iter::once(Circle::new(point, 8, RED.filled())))?;
        chart.draw_series(std::iter::once(Circle::new(
            point,
            8,
            ShapeStyle::from(&BLACK).stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("C{c} ({})", cluster_sizes[c]),
            point,
            ("sans-serif", 18),
        )))?;
    }

    root.present()
        .with_context(|| format!("render cluster scatter {}", path.display()))?;
    Ok(())
}

fn padded_ranges(series: &[(f64, f64)]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(x, y) in series {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if series.is_empty() {
        return (0.0..1.0, 0.0..1.0);
    }
    let x_pad = ((x_max - x_min) * 0.05).max(0.5);
    let y_pad = ((y_max - y_min) * 0.05).max(0.1);
    (
        (x_min - x_pad)..(x_max + x_pad),
        (y_min - y_pad)..(y_max + y_pad),
    )
}

/// Convex hull by Andrew's monotone chain, vertices in counter-clockwise
/// order. Degenerate inputs (collinear, duplicates) return fewer than 3
/// vertices and callers skip drawing.
pub fn convex_hull(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut pts: Vec<[f64; 2]> = points.to_vec();
    pts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    pts.dedup();
    let n = pts.len();
    if n < 3 {
        return pts;
    }

    let cross = |o: &[f64; 2], a: &[f64; 2], b: &[f64; 2]| {
        (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
    };

    let mut hull: Vec<[f64; 2]> = Vec::with_capacity(2 * n);
    for &p in &pts {
        while hull.len() >= 2
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], &p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev() {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], &p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop(); // closing point duplicates the first
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hull_drops_interior_points() {
        let points = vec![
            [0.0, 0.0],
            [4.0, 0.0],
            [4.0, 4.0],
            [0.0, 4.0],
            [2.0, 2.0],
            [1.0, 3.0],
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(hull.contains(&[0.0, 0.0]));
        assert!(hull.contains(&[4.0, 4.0]));
        assert!(!hull.contains(&[2.0, 2.0]));
    }

    #[test]
    fn collinear_points_yield_a_degenerate_hull() {
        let points = vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let hull = convex_hull(&points);
        assert!(hull.len() < 3);
    }
}

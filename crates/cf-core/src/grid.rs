//! 2D grid histogram: one row per parameter point, columns shared with the inputs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hist::{Axis, Hist1D};

/// Rows of 1D histograms repacked into a single 2D histogram.
///
/// The X axis is copied from the first row; `values[row][col]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid2D {
    /// Grid name (`2D_<hist>`).
    pub name: String,
    /// Grid title.
    pub title: String,
    /// Shared X axis, including bin labels.
    pub x_axis: Axis,
    /// One label per row, in insertion order.
    pub row_labels: Vec<String>,
    /// Bin contents, one vector of `x_axis.n_bins` values per row.
    pub values: Vec<Vec<f64>>,
}

impl Grid2D {
    /// Build a grid from labelled histograms, preserving their order.
    ///
    /// Rows whose bin count differs from the first histogram are truncated or
    /// zero-padded to the first histogram's bin count.
    pub fn from_rows(hist_name: &str, rows: &[(String, Hist1D)]) -> Result<Self> {
        let Some((_, first)) = rows.first() else {
            return Err(Error::EmptyGrid(format!("no histograms for '{hist_name}'")));
        };

        let x_axis = first.axis.clone();
        let n_cols = x_axis.n_bins;
        let mut row_labels = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());

        for (label, hist) in rows {
            if hist.n_bins() != n_cols {
                tracing::warn!(
                    "row '{}' has {} bins, grid has {}; extra bins dropped, missing bins set to 0",
                    label,
                    hist.n_bins(),
                    n_cols
                );
            }
            let mut row: Vec<f64> = hist.contents.iter().copied().take(n_cols).collect();
            row.resize(n_cols, 0.0);
            row_labels.push(label.clone());
            values.push(row);
        }

        Ok(Self {
            name: format!("2D_{hist_name}"),
            title: format!("2D {hist_name}"),
            x_axis,
            row_labels,
            values,
        })
    }

    /// Number of columns (X bins).
    pub fn n_cols(&self) -> usize {
        self.x_axis.n_bins
    }

    /// Number of rows (parameter points).
    pub fn n_rows(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(label: &str, contents: &[f64]) -> (String, Hist1D) {
        let axis = Axis::uniform(contents.len(), 0.0, contents.len() as f64)
            .with_labels(["all", "trigger", "met", "track"])
            .with_title("cut");
        (label.to_string(), Hist1D::new(label, axis, contents.to_vec()).unwrap())
    }

    #[test]
    fn rows_follow_input_order() {
        let rows = vec![
            labelled("0.1 (L)", &[10.0, 8.0, 5.0, 1.0]),
            labelled("1 (L)", &[12.0, 9.0, 4.0, 2.0]),
            labelled("10k (H)", &[11.0, 7.0, 3.0, 0.0]),
        ];
        let grid = Grid2D::from_rows("EventCutFlow", &rows).unwrap();

        assert_eq!(grid.n_rows(), 3);
        assert_eq!(grid.n_cols(), 4);
        assert_eq!(grid.row_labels, vec!["0.1 (L)", "1 (L)", "10k (H)"]);
        for (k, (_, h)) in rows.iter().enumerate() {
            assert_eq!(grid.values[k], h.contents);
        }
        assert_eq!(grid.x_axis.label(1), Some("trigger"));
        assert_eq!(grid.x_axis.title, "cut");
        assert_eq!(grid.name, "2D_EventCutFlow");
    }

    #[test]
    fn empty_rows_rejected() {
        assert!(matches!(Grid2D::from_rows("h", &[]), Err(Error::EmptyGrid(_))));
    }

    #[test]
    fn mismatched_rows_are_padded_or_truncated() {
        let short = Hist1D::new("s", Axis::uniform(2, 0.0, 2.0), vec![5.0, 4.0]).unwrap();
        let long = Hist1D::new("l", Axis::uniform(5, 0.0, 5.0), vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap();
        let rows =
            vec![labelled("a", &[1.0, 1.0, 1.0, 1.0]), ("s".into(), short), ("l".into(), long)];
        let grid = Grid2D::from_rows("h", &rows).unwrap();
        assert_eq!(grid.values[1], vec![5.0, 4.0, 0.0, 0.0]);
        assert_eq!(grid.values[2], vec![1.0, 2.0, 3.0, 4.0]);
    }
}

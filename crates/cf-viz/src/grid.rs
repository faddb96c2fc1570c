//! Grid (rows of 1D histograms as a 2D colour map) artifact.

use cf_core::{Grid2D, Result};
use serde::{Deserialize, Serialize};

use crate::meta::ArtifactMeta;

/// Schema tag of [`GridArtifact`].
pub const GRID_SCHEMA: &str = "cutflow.grid.v1";

/// Everything needed to draw a grid plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridArtifact {
    /// Always [`GRID_SCHEMA`].
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Grid name (`2D_<hist>`).
    pub name: String,
    /// Plot title.
    pub title: String,
    /// X bin edges.
    pub x_edges: Vec<f64>,
    /// One label per column: the bin label, or the bin centre when unlabeled.
    pub x_labels: Vec<String>,
    /// X axis title.
    pub x_title: String,
    /// One label per row, bottom row first.
    pub y_labels: Vec<String>,
    /// Y axis title.
    pub y_title: String,
    /// Colour-scale title.
    pub z_title: String,
    /// `values[row][col]`.
    pub values: Vec<Vec<f64>>,
    /// Log colour scale.
    pub log_z: bool,
    /// Rows were normalized to their first bin.
    pub normalized: bool,
}

/// Display options of a grid plot.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    /// Y axis title.
    pub y_title: String,
    /// Colour-scale title.
    pub z_title: String,
    /// Log colour scale.
    pub log_z: bool,
    /// Rows were normalized.
    pub normalized: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            y_title: "c\u{03C4} [mm] (Decay Type)".to_string(),
            z_title: "Counts".to_string(),
            log_z: true,
            normalized: false,
        }
    }
}

/// Package a grid for rendering.
pub fn grid_artifact(grid: &Grid2D, options: GridOptions) -> Result<GridArtifact> {
    let axis = &grid.x_axis;
    let x_labels = (0..grid.n_cols())
        .map(|i| match axis.label(i) {
            Some(label) => label.to_string(),
            None if axis.has_labels() => String::new(),
            None => format_center(axis.center(i)),
        })
        .collect();

    Ok(GridArtifact {
        schema_version: GRID_SCHEMA.to_string(),
        meta: ArtifactMeta::now()?,
        name: grid.name.clone(),
        title: grid.title.clone(),
        x_edges: axis.edges.clone(),
        x_labels,
        x_title: axis.title.clone(),
        y_labels: grid.row_labels.clone(),
        y_title: options.y_title,
        z_title: options.z_title,
        values: grid.values.clone(),
        log_z: options.log_z,
        normalized: options.normalized,
    })
}

fn format_center(x: f64) -> String {
    if (x - x.round()).abs() < 1e-9 { format!("{}", x.round()) } else { format!("{x:.2}") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::{Axis, Hist1D};

    fn row(label: &str, axis: &Axis, contents: &[f64]) -> (String, Hist1D) {
        (label.to_string(), Hist1D::new(label, axis.clone(), contents.to_vec()).unwrap())
    }

    #[test]
    fn labelled_columns() {
        let axis = Axis::uniform(3, 0.0, 3.0).with_labels(["all", "trigger"]).with_title("cut");
        let grid = Grid2D::from_rows(
            "EventCutFlow",
            &[row("0.1 (L)", &axis, &[3.0, 2.0, 1.0]), row("1 (L)", &axis, &[4.0, 0.0, 0.0])],
        )
        .unwrap();
        let art = grid_artifact(&grid, GridOptions::default()).unwrap();

        assert_eq!(art.schema_version, GRID_SCHEMA);
        assert_eq!(art.x_labels, vec!["all", "trigger", ""]);
        assert_eq!(art.y_labels, vec!["0.1 (L)", "1 (L)"]);
        assert_eq!(art.values[1], vec![4.0, 0.0, 0.0]);
        assert_eq!(art.x_title, "cut");
        assert_eq!(art.z_title, "Counts");
        assert!(art.log_z);
    }

    #[test]
    fn unlabelled_columns_use_bin_centres() {
        let axis = Axis::uniform(2, 0.0, 1.0);
        let grid = Grid2D::from_rows("h", &[row("a", &axis, &[1.0, 2.0])]).unwrap();
        let art = grid_artifact(&grid, GridOptions::default()).unwrap();
        assert_eq!(art.x_labels, vec!["0.25", "0.75"]);

        let axis = Axis::uniform(2, 0.5, 2.5);
        let grid = Grid2D::from_rows("h", &[row("a", &axis, &[1.0, 2.0])]).unwrap();
        let art = grid_artifact(&grid, GridOptions::default()).unwrap();
        assert_eq!(art.x_labels, vec!["1", "2"]);

        let back: GridArtifact =
            serde_json::from_str(&serde_json::to_string(&art).unwrap()).unwrap();
        assert_eq!(back.values, art.values);
    }
}

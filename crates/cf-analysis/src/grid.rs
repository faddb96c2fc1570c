//! Grid builder: one row per (decay channel, cτ) point.

use cf_core::sample::grid_output_name;
use cf_core::{CTau, DecaySelection, Grid2D, Hist1D, SignalPoint};
use cf_viz::{GridArtifact, GridOptions, grid_artifact};

use crate::error::BuildError;
use crate::loader::HistogramLoader;

/// Parameters of one grid plot.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRequest {
    /// Histogram to collect (e.g. `EventCutFlow`).
    pub hist_name: String,
    /// Gluino mass in GeV.
    pub gluino_mass: u32,
    /// Neutralino mass in GeV.
    pub neutralino_mass: u32,
    /// cτ points, in row order within each decay channel.
    pub ctaus: Vec<CTau>,
    /// Decay channels (outer loop).
    pub decays: DecaySelection,
    /// Production era.
    pub era: String,
    /// Normalize each row to its first bin.
    pub normalize: bool,
    /// Log colour scale.
    pub log_z: bool,
}

impl GridRequest {
    /// Default output name, without extension.
    pub fn output_name(&self) -> String {
        grid_output_name(
            &self.hist_name,
            self.gluino_mass,
            self.neutralino_mass,
            self.decays,
            &self.ctaus,
        )
    }

    /// Signal points in row order: decay channel outer, cτ inner.
    pub fn points(&self) -> Vec<SignalPoint> {
        let mut out = Vec::with_capacity(self.ctaus.len() * 2);
        for decay in self.decays.channels() {
            for ctau in &self.ctaus {
                out.push(SignalPoint {
                    gluino_mass: self.gluino_mass,
                    neutralino_mass: self.neutralino_mass,
                    ctau: ctau.clone(),
                    decay,
                    era: self.era.clone(),
                });
            }
        }
        out
    }
}

/// Load every point of the request, skipping the ones that fail.
///
/// Returns `(row label, histogram)` pairs in row order.
pub fn collect_rows(loader: &HistogramLoader, request: &GridRequest) -> Vec<(String, Hist1D)> {
    let loader = loader.clone().normalized(request.normalize);
    let mut rows = Vec::new();
    for point in request.points() {
        match loader.load(&point.file_name(), &request.hist_name) {
            Some(hist) => rows.push((point.ctau.grid_label(point.decay), hist)),
            None => {
                tracing::warn!("Skipping {} {} due to loading failure", point.ctau, point.decay)
            }
        }
    }
    rows
}

/// Collect the rows and repack them into a grid artifact.
pub fn build_grid(
    loader: &HistogramLoader,
    request: &GridRequest,
) -> Result<GridArtifact, BuildError> {
    let rows = collect_rows(loader, request);
    if rows.is_empty() {
        return Err(BuildError::NoHistograms {
            hist_name: request.hist_name.clone(),
            attempted: request.points().len(),
        });
    }
    tracing::info!("collected {} of {} rows", rows.len(), request.points().len());

    let grid = Grid2D::from_rows(&request.hist_name, &rows)?;
    let options = GridOptions {
        z_title: if request.normalize { "Fraction of events" } else { "Counts" }.to_string(),
        log_z: request.log_z,
        normalized: request.normalize,
        ..GridOptions::default()
    };
    Ok(grid_artifact(&grid, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::{DEFAULT_ERA, DecayChannel};

    fn request(decays: DecaySelection) -> GridRequest {
        GridRequest {
            hist_name: "EventCutFlow".into(),
            gluino_mass: 1800,
            neutralino_mass: 1300,
            ctaus: CTau::parse_list("0p1mm,10000mm").unwrap(),
            decays,
            era: DEFAULT_ERA.into(),
            normalize: false,
            log_z: true,
        }
    }

    #[test]
    fn points_iterate_decay_then_ctau() {
        let pts = request(DecaySelection::Both).points();
        let order: Vec<(DecayChannel, &str)> =
            pts.iter().map(|p| (p.decay, p.ctau.as_str())).collect();
        assert_eq!(
            order,
            vec![
                (DecayChannel::Light, "0p1mm"),
                (DecayChannel::Light, "10000mm"),
                (DecayChannel::Heavy, "0p1mm"),
                (DecayChannel::Heavy, "10000mm"),
            ]
        );
        assert_eq!(
            request(DecaySelection::Both).output_name(),
            "2D_EventCutFlow_gluino1800_chi101300_both_0p1mm_10000mm"
        );
    }

    #[test]
    fn nothing_loaded_is_an_error() {
        let loader = HistogramLoader::new("/nonexistent/ntuples");
        let err = build_grid(&loader, &request(DecaySelection::One(DecayChannel::Heavy)))
            .unwrap_err();
        assert!(matches!(err, BuildError::NoHistograms { attempted: 2, .. }));
    }
}

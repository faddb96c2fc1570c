//! Ratio builder: two cτ points of the same mass point and decay channel.

use cf_core::sample::ratio_output_name;
use cf_core::{CTau, DecayChannel, SignalPoint};
use cf_viz::{RatioArtifact, RatioInput, RatioOptions, ratio_artifact};

use crate::error::BuildError;
use crate::loader::HistogramLoader;

/// Parameters of one ratio plot.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioRequest {
    /// Histogram to compare (e.g. `EventCutFlow`).
    pub hist_name: String,
    /// Gluino mass in GeV.
    pub gluino_mass: u32,
    /// Neutralino mass in GeV.
    pub neutralino_mass: u32,
    /// Numerator cτ.
    pub numerator: CTau,
    /// Denominator cτ.
    pub denominator: CTau,
    /// Decay channel of both samples.
    pub decay: DecayChannel,
    /// Production era.
    pub era: String,
    /// Log scale on the top panel.
    pub log_scale: bool,
    /// Explicit ratio-panel ticks.
    pub ratio_y_ticks: Option<Vec<f64>>,
    /// Explicit top-panel ticks.
    pub overlay_y_ticks: Option<Vec<f64>>,
}

impl RatioRequest {
    fn point(&self, ctau: &CTau) -> SignalPoint {
        SignalPoint {
            gluino_mass: self.gluino_mass,
            neutralino_mass: self.neutralino_mass,
            ctau: ctau.clone(),
            decay: self.decay,
            era: self.era.clone(),
        }
    }

    /// Ntuple file of the numerator.
    pub fn numerator_file(&self) -> String {
        self.point(&self.numerator).file_name()
    }

    /// Ntuple file of the denominator.
    pub fn denominator_file(&self) -> String {
        self.point(&self.denominator).file_name()
    }

    /// Default output name, without extension.
    pub fn output_name(&self) -> String {
        ratio_output_name(
            &self.hist_name,
            self.gluino_mass,
            self.neutralino_mass,
            &self.numerator,
            &self.denominator,
            self.decay,
        )
    }
}

/// Legend label of one input: `cτ = 0.1 mm (L)`.
pub fn format_ctau_label(ctau: &CTau, decay: DecayChannel) -> String {
    ctau.legend_label(decay)
}

/// Load, normalize and divide the two inputs.
///
/// Both loads are attempted (and logged) before a missing input aborts.
pub fn build_ratio(
    loader: &HistogramLoader,
    request: &RatioRequest,
) -> Result<RatioArtifact, BuildError> {
    let loader = loader.clone().normalized(true);
    let num_file = request.numerator_file();
    let den_file = request.denominator_file();

    let numerator = loader.load(&num_file, &request.hist_name);
    let denominator = loader.load(&den_file, &request.hist_name);

    let numerator =
        numerator.ok_or(BuildError::MissingInput { role: "numerator", file: num_file })?;
    let denominator =
        denominator.ok_or(BuildError::MissingInput { role: "denominator", file: den_file })?;

    let ratio = numerator.divide(&denominator)?;
    let num_label = format_ctau_label(&request.numerator, request.decay);
    let den_label = format_ctau_label(&request.denominator, request.decay);
    tracing::info!("built ratio {} ({} bins)", ratio.name, ratio.n_bins());

    let artifact = ratio_artifact(
        &request.hist_name,
        RatioInput::new(&numerator, request.numerator.as_str(), &num_label),
        RatioInput::new(&denominator, request.denominator.as_str(), &den_label),
        &ratio,
        RatioOptions {
            log_y: request.log_scale,
            ratio_y_ticks: request.ratio_y_ticks.clone(),
            overlay_y_ticks: request.overlay_y_ticks.clone(),
        },
    )?;
    Ok(artifact)
}

//! Overlay + ratio artifact (numbers-first).

use cf_core::{Error, Hist1D, Result};
use serde::{Deserialize, Serialize};

use crate::meta::ArtifactMeta;

/// Schema tag of [`RatioArtifact`].
pub const RATIO_SCHEMA: &str = "cutflow.ratio.v1";

/// Everything needed to draw a two-panel ratio plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioArtifact {
    /// Always [`RATIO_SCHEMA`].
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Name of the compared histogram (e.g. `EventCutFlow`).
    pub hist_name: String,
    /// Plot title.
    pub title: String,
    /// Shared bin edges.
    pub bin_edges: Vec<f64>,
    /// Per-bin labels, empty when the histograms have none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bin_labels: Vec<String>,
    /// X axis title.
    #[serde(default)]
    pub x_title: String,
    /// Top-panel numerator series.
    pub numerator: RatioSeries,
    /// Top-panel denominator series.
    pub denominator: RatioSeries,
    /// Bin-by-bin `numerator / denominator`.
    pub ratio_y: Vec<f64>,
    /// Ratio errors.
    pub ratio_yerr: Vec<f64>,
    /// What happens where the denominator is zero.
    pub zero_policy: String,
    /// Log scale on the top panel.
    pub log_y: bool,
    /// Explicit ticks (and range) of the ratio panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio_y_ticks: Option<Vec<f64>>,
    /// Explicit ticks (and range) of the top panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_y_ticks: Option<Vec<f64>>,
}

/// One normalized input histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSeries {
    /// Legend label, e.g. `cτ = 0.1 mm (L)`.
    pub label: String,
    /// Histogram name after loading.
    pub name: String,
    /// File the histogram was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Bin contents.
    pub y: Vec<f64>,
    /// Bin errors.
    pub yerr: Vec<f64>,
}

/// Display options carried into the artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatioOptions {
    /// Log scale on the top panel.
    pub log_y: bool,
    /// Explicit ratio-panel ticks.
    pub ratio_y_ticks: Option<Vec<f64>>,
    /// Explicit top-panel ticks.
    pub overlay_y_ticks: Option<Vec<f64>>,
}

/// One side of the ratio: the histogram, the short tag naming it in the
/// title (`0p1mm`) and its legend label (`cτ = 0.1 mm (L)`).
#[derive(Debug, Clone, Copy)]
pub struct RatioInput<'a> {
    /// Normalized histogram.
    pub hist: &'a Hist1D,
    /// Title tag.
    pub tag: &'a str,
    /// Legend label.
    pub label: &'a str,
}

impl<'a> RatioInput<'a> {
    /// Bundle a histogram with its tag and label.
    pub fn new(hist: &'a Hist1D, tag: &'a str, label: &'a str) -> Self {
        Self { hist, tag, label }
    }
}

impl RatioSeries {
    fn from_hist(h: &Hist1D, label: &str) -> Self {
        Self {
            label: label.to_string(),
            name: h.name.clone(),
            source_file: h.source.as_ref().map(|s| s.file.display().to_string()),
            y: h.contents.clone(),
            yerr: h.errors(),
        }
    }
}

/// Package two normalized histograms and their ratio.
///
/// The title reads `<hist_name> Ratio: <numerator tag> / <denominator tag>`.
pub fn ratio_artifact(
    hist_name: &str,
    numerator: RatioInput<'_>,
    denominator: RatioInput<'_>,
    ratio: &Hist1D,
    options: RatioOptions,
) -> Result<RatioArtifact> {
    let (num, den) = (numerator.hist, denominator.hist);
    let n = num.n_bins();
    if den.n_bins() != n || ratio.n_bins() != n {
        return Err(Error::BinningMismatch(format!(
            "ratio artifact: numerator={} denominator={} ratio={} bins",
            n,
            den.n_bins(),
            ratio.n_bins()
        )));
    }
    for ticks in [&options.ratio_y_ticks, &options.overlay_y_ticks].into_iter().flatten() {
        if ticks.is_empty() || ticks.iter().any(|t| !t.is_finite()) {
            return Err(Error::Validation(format!("invalid tick list {:?}", ticks)));
        }
    }

    Ok(RatioArtifact {
        schema_version: RATIO_SCHEMA.to_string(),
        meta: ArtifactMeta::now()?,
        hist_name: hist_name.to_string(),
        title: format!("{hist_name} Ratio: {} / {}", numerator.tag, denominator.tag),
        bin_edges: num.axis.edges.clone(),
        bin_labels: if num.axis.has_labels() { num.axis.labels.clone() } else { Vec::new() },
        x_title: num.axis.title.clone(),
        numerator: RatioSeries::from_hist(num, numerator.label),
        denominator: RatioSeries::from_hist(den, denominator.label),
        ratio_y: ratio.contents.clone(),
        ratio_yerr: ratio.errors(),
        zero_policy: "zero".to_string(),
        log_y: options.log_y,
        ratio_y_ticks: options.ratio_y_ticks,
        overlay_y_ticks: options.overlay_y_ticks,
    })
}

//! Owned 1D histogram and the transforms applied to cut-flow counters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Binning of one histogram axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Number of bins (excluding under/overflow).
    pub n_bins: usize,
    /// Lower edge of the first bin.
    pub x_min: f64,
    /// Upper edge of the last bin.
    pub x_max: f64,
    /// Bin edges (length = n_bins + 1).
    pub edges: Vec<f64>,
    /// Axis title, possibly empty.
    #[serde(default)]
    pub title: String,
    /// Per-bin labels (length = n_bins when present, empty strings for unlabeled bins).
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Axis {
    /// Uniform binning with `n_bins` bins on `[x_min, x_max]`.
    pub fn uniform(n_bins: usize, x_min: f64, x_max: f64) -> Self {
        let width = if n_bins == 0 { 0.0 } else { (x_max - x_min) / n_bins as f64 };
        let edges = (0..=n_bins).map(|i| x_min + i as f64 * width).collect();
        Self { n_bins, x_min, x_max, edges, title: String::new(), labels: Vec::new() }
    }

    /// Attach per-bin labels. Shorter lists are padded with empty labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.resize(self.n_bins, String::new());
        self.labels = labels;
        self
    }

    /// Set the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Label of bin `i` (0-based), if one is set and non-empty.
    pub fn label(&self, i: usize) -> Option<&str> {
        self.labels.get(i).map(String::as_str).filter(|s| !s.is_empty())
    }

    /// Whether any bin carries a label.
    pub fn has_labels(&self) -> bool {
        self.labels.iter().any(|l| !l.is_empty())
    }

    /// Centre of bin `i` (0-based).
    pub fn center(&self, i: usize) -> f64 {
        (self.edges[i] + self.edges[i + 1]) / 2.0
    }

    /// Same bin count and range as `other` (labels and title are not compared).
    pub fn same_binning(&self, other: &Axis) -> bool {
        self.n_bins == other.n_bins
            && (self.x_min - other.x_min).abs() < 1e-12
            && (self.x_max - other.x_max).abs() < 1e-12
    }
}

/// Where a histogram was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistSource {
    /// Path of the result file.
    pub file: PathBuf,
    /// Internal directory the histogram was found under.
    pub directory: String,
}

/// Outcome of [`Hist1D::normalize_by_first_bin`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Every bin was divided by this first-bin value.
    Scaled(f64),
    /// The first bin was not positive; the histogram is unchanged.
    Skipped,
}

/// A 1D histogram that owns all of its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// X axis.
    pub axis: Axis,
    /// Bin contents (length = axis.n_bins).
    pub contents: Vec<f64>,
    /// Sum of weights squared per bin, if known.
    pub sumw2: Option<Vec<f64>>,
    /// Number of entries.
    pub entries: f64,
    /// File and directory the histogram came from.
    pub source: Option<HistSource>,
}

impl Hist1D {
    /// Build a histogram from an axis and its bin contents.
    pub fn new(name: impl Into<String>, axis: Axis, contents: Vec<f64>) -> Result<Self> {
        if contents.len() != axis.n_bins {
            return Err(Error::BinningMismatch(format!(
                "{} contents for an axis with {} bins",
                contents.len(),
                axis.n_bins
            )));
        }
        let entries = contents.iter().sum();
        Ok(Self {
            name: name.into(),
            title: String::new(),
            axis,
            contents,
            sumw2: None,
            entries,
            source: None,
        })
    }

    /// Attach per-bin sum of squared weights.
    pub fn with_sumw2(mut self, sumw2: Vec<f64>) -> Result<Self> {
        if sumw2.len() != self.contents.len() {
            return Err(Error::BinningMismatch(format!(
                "sumw2 has {} entries, histogram '{}' has {} bins",
                sumw2.len(),
                self.name,
                self.contents.len()
            )));
        }
        self.sumw2 = Some(sumw2);
        Ok(self)
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.contents.len()
    }

    /// Squared error of bin `i`; Poisson (`|content|`) when no sumw2 is stored.
    pub fn error_sq(&self, i: usize) -> f64 {
        match &self.sumw2 {
            Some(w2) => w2[i],
            None => self.contents[i].abs(),
        }
    }

    /// Statistical error of every bin.
    pub fn errors(&self) -> Vec<f64> {
        (0..self.n_bins()).map(|i| self.error_sq(i).sqrt()).collect()
    }

    /// Divide every bin by the first bin (the "all events" counter of a cut flow).
    ///
    /// A histogram without sumw2 gets Poisson sumw2 first so its errors scale too.
    /// If the first bin is not positive the histogram is left untouched and a
    /// warning is logged.
    pub fn normalize_by_first_bin(&mut self) -> Normalization {
        let total = self.contents.first().copied().unwrap_or(0.0);
        if total > 0.0 {
            let mut w2 = self
                .sumw2
                .take()
                .unwrap_or_else(|| self.contents.iter().map(|c| c.abs()).collect());
            // Division, not a reciprocal factor: the first bin must come out as exactly 1.0.
            for (c, e) in self.contents.iter_mut().zip(w2.iter_mut()) {
                *c /= total;
                *e /= total * total;
            }
            self.sumw2 = Some(w2);
            Normalization::Scaled(total)
        } else {
            tracing::warn!(
                "histogram '{}' has zero events in its first bin, cannot normalize",
                self.name
            );
            Normalization::Skipped
        }
    }

    /// Bin-by-bin ratio `self / denominator`.
    ///
    /// Bins with a zero denominator are set to 0 (content and error). Errors are
    /// propagated assuming uncorrelated inputs.
    pub fn divide(&self, denominator: &Hist1D) -> Result<Hist1D> {
        if self.n_bins() != denominator.n_bins() {
            return Err(Error::BinningMismatch(format!(
                "cannot divide '{}' ({} bins) by '{}' ({} bins)",
                self.name,
                self.n_bins(),
                denominator.name,
                denominator.n_bins()
            )));
        }

        let n = self.n_bins();
        let mut contents = Vec::with_capacity(n);
        let mut sumw2 = Vec::with_capacity(n);
        for i in 0..n {
            let num = self.contents[i];
            let den = denominator.contents[i];
            if den == 0.0 {
                contents.push(0.0);
                sumw2.push(0.0);
                continue;
            }
            let d2 = den * den;
            contents.push(num / den);
            sumw2.push((self.error_sq(i) * d2 + denominator.error_sq(i) * num * num) / (d2 * d2));
        }

        Ok(Hist1D {
            name: format!("ratio_{}_{}", self.name, denominator.name),
            title: self.title.clone(),
            axis: self.axis.clone(),
            entries: contents.iter().sum(),
            contents,
            sumw2: Some(sumw2),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(name: &str, contents: &[f64]) -> Hist1D {
        let axis = Axis::uniform(contents.len(), 0.0, contents.len() as f64);
        Hist1D::new(name, axis, contents.to_vec()).unwrap()
    }

    fn assert_bins(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len());
        for (i, (g, w)) in got.iter().zip(want).enumerate() {
            assert!((g - w).abs() < 1e-12, "bin {i}: {g} vs {w}");
        }
    }

    #[test]
    fn normalize_divides_by_first_bin() {
        let mut h = hist("num", &[100.0, 50.0, 25.0, 10.0]);
        assert_eq!(h.normalize_by_first_bin(), Normalization::Scaled(100.0));
        assert_bins(&h.contents, &[1.0, 0.5, 0.25, 0.1]);
        // Poisson errors scaled by 1/V
        assert!((h.errors()[1] - 50.0_f64.sqrt() / 100.0).abs() < 1e-12);
    }

    #[test]
    fn normalized_first_bin_is_exactly_one() {
        for v in 1..=200 {
            let v = f64::from(v);
            let mut h = hist("cutflow", &[v, 7.0, 3.0]);
            h.normalize_by_first_bin();
            assert_eq!(h.contents[0], 1.0, "first bin {v}");
            assert_eq!(h.contents[1], 7.0 / v);
            assert_eq!(h.contents[2], 3.0 / v);
        }
    }

    #[test]
    fn normalize_zero_first_bin_is_noop() {
        let mut h = hist("empty", &[0.0, 3.0, 2.0]);
        let before = h.clone();
        assert_eq!(h.normalize_by_first_bin(), Normalization::Skipped);
        assert_eq!(h, before);
    }

    #[test]
    fn normalize_empty_histogram_is_noop() {
        let mut h = hist("none", &[]);
        assert_eq!(h.normalize_by_first_bin(), Normalization::Skipped);
    }

    #[test]
    fn divide_matches_worked_example() {
        let mut num = hist("num", &[100.0, 50.0, 25.0, 10.0]);
        let mut den = hist("den", &[200.0, 80.0, 40.0, 10.0]);
        num.normalize_by_first_bin();
        den.normalize_by_first_bin();
        assert_bins(&den.contents, &[1.0, 0.4, 0.2, 0.05]);

        let ratio = num.divide(&den).unwrap();
        assert_bins(&ratio.contents, &[1.0, 1.25, 1.25, 2.0]);
        assert_eq!(ratio.name, "ratio_num_den");
    }

    #[test]
    fn divide_by_zero_bin_yields_zero() {
        let num = hist("a", &[4.0, 3.0]);
        let den = hist("b", &[2.0, 0.0]);
        let ratio = num.divide(&den).unwrap();
        assert_bins(&ratio.contents, &[2.0, 0.0]);
        assert_eq!(ratio.errors()[1], 0.0);
    }

    #[test]
    fn divide_propagates_errors() {
        let num = hist("a", &[4.0]).with_sumw2(vec![4.0]).unwrap();
        let den = hist("b", &[2.0]).with_sumw2(vec![1.0]).unwrap();
        let ratio = num.divide(&den).unwrap();
        // (4*4 + 1*16) / 16 = 2
        assert!((ratio.error_sq(0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn divide_rejects_mismatched_binning() {
        let num = hist("a", &[1.0, 2.0]);
        let den = hist("b", &[1.0, 2.0, 3.0]);
        assert!(matches!(num.divide(&den), Err(Error::BinningMismatch(_))));
    }

    #[test]
    fn labels_are_padded() {
        let ax = Axis::uniform(3, 0.0, 3.0).with_labels(["all", "trigger"]);
        assert_eq!(ax.label(0), Some("all"));
        assert_eq!(ax.label(2), None);
        assert!(ax.has_labels());
        assert!(!Axis::uniform(3, 0.0, 3.0).has_labels());
    }

    #[test]
    fn axis_title_and_labels_default_when_absent() {
        let json = r#"{"n_bins":2,"x_min":0.0,"x_max":2.0,"edges":[0.0,1.0,2.0]}"#;
        let ax: Axis = serde_json::from_str(json).unwrap();
        assert!(ax.title.is_empty());
        assert!(!ax.has_labels());
        assert!(ax.same_binning(&Axis::uniform(2, 0.0, 2.0)));
    }

    #[test]
    fn new_rejects_wrong_length() {
        assert!(Hist1D::new("h", Axis::uniform(2, 0.0, 1.0), vec![1.0]).is_err());
    }
}

//! Histogram type returned by [`RootFile::get_histogram`](crate::RootFile::get_histogram).

/// A 1D histogram decoded from a `TH1` object.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
    /// Stored class (`TH1D`, `TH1F`, `TH1I`, ...).
    pub class_name: String,
    /// Number of bins, excluding under/overflow.
    pub n_bins: usize,
    /// Lower edge of the first bin.
    pub x_min: f64,
    /// Upper edge of the last bin.
    pub x_max: f64,
    /// Bin edges (`n_bins + 1` values).
    pub bin_edges: Vec<f64>,
    /// Bin contents without under/overflow.
    pub bin_content: Vec<f64>,
    /// Sum of squared weights per bin, when the file stores it.
    pub sumw2: Option<Vec<f64>>,
    /// `fEntries`.
    pub entries: f64,
    /// Underflow bin content.
    pub underflow: f64,
    /// Overflow bin content.
    pub overflow: f64,
    /// X axis title.
    pub x_title: String,
    /// Alphanumeric bin labels; empty when the axis has none, otherwise one
    /// entry per bin (empty string for unlabeled bins).
    pub bin_labels: Vec<String>,
}

//! Shared histogram loader.

use std::path::{Path, PathBuf};

use cf_core::{Axis, Hist1D, HistSource};
use cf_root::{RootError, RootFile};

use crate::error::LoadError;

/// Analyzer directories searched for histograms, in order.
pub const DEFAULT_PREFIXES: [&str; 2] = ["HSCPMiniAODAnalyzer", "HSCPFullAODAnalyzer"];

/// Reads named histograms out of ntuple files in one directory.
#[derive(Debug, Clone)]
pub struct HistogramLoader {
    ntuples_dir: PathBuf,
    prefixes: Vec<String>,
    normalize: bool,
}

impl HistogramLoader {
    /// Loader over `ntuples_dir` with the default prefixes, without normalization.
    pub fn new(ntuples_dir: impl Into<PathBuf>) -> Self {
        Self {
            ntuples_dir: ntuples_dir.into(),
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            normalize: false,
        }
    }

    /// Replace the directory prefixes.
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Normalize every loaded histogram to its first bin.
    pub fn normalized(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Directory the file names are resolved against.
    pub fn ntuples_dir(&self) -> &Path {
        &self.ntuples_dir
    }

    /// Whether loaded histograms are normalized.
    pub fn normalizes(&self) -> bool {
        self.normalize
    }

    /// Load `hist_name` from `file_name`.
    ///
    /// The file is closed before returning; the histogram is renamed
    /// `<hist_name>_<file stem>`.
    pub fn try_load(&self, file_name: &str, hist_name: &str) -> Result<Hist1D, LoadError> {
        let path = self.ntuples_dir.join(file_name);
        if !path.is_file() {
            return Err(LoadError::FileNotFound(path));
        }
        tracing::info!("Loading: {} -> {}", path.display(), hist_name);

        let file = RootFile::open(&path)
            .map_err(|source| LoadError::Open { path: path.clone(), source })?;

        let mut tried = Vec::with_capacity(self.prefixes.len());
        for prefix in &self.prefixes {
            let object = format!("{prefix}/{hist_name}");
            match file.get_histogram(&object) {
                Ok(h) => {
                    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
                    let source = HistSource { file: path.clone(), directory: prefix.clone() };
                    let mut hist = into_hist1d(h, format!("{hist_name}_{stem}"), source)?;
                    if self.normalize {
                        hist.normalize_by_first_bin();
                    }
                    return Ok(hist);
                }
                Err(RootError::KeyNotFound(_) | RootError::NotADirectory { .. }) => {
                    tracing::debug!("{} not in {}", object, path.display());
                    tried.push(object);
                }
                Err(RootError::UnsupportedClass(class)) => {
                    tracing::debug!("{object} in {} is not a histogram: {class}", path.display());
                    tried.push(object);
                }
                Err(source) => return Err(LoadError::Read { file: path, object, source }),
            }
        }
        Err(LoadError::HistogramNotFound { file: path, tried })
    }

    /// Like [`try_load`](Self::try_load), but logs the failure and returns `None`.
    pub fn load(&self, file_name: &str, hist_name: &str) -> Option<Hist1D> {
        match self.try_load(file_name, hist_name) {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }
}

/// Copy a decoded ROOT histogram into an owned [`Hist1D`].
fn into_hist1d(
    h: cf_root::Histogram,
    name: String,
    source: HistSource,
) -> Result<Hist1D, cf_core::Error> {
    let axis = Axis {
        n_bins: h.n_bins,
        x_min: h.x_min,
        x_max: h.x_max,
        edges: h.bin_edges,
        title: h.x_title,
        labels: h.bin_labels,
    };
    let mut hist = Hist1D::new(name, axis, h.bin_content)?;
    if let Some(w2) = h.sumw2 {
        hist = hist.with_sumw2(w2)?;
    }
    hist.title = h.title;
    hist.entries = h.entries;
    hist.source = Some(source);
    Ok(hist)
}

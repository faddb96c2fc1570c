//! Error types for loading and building.

use std::path::PathBuf;

use cf_root::RootError;
use thiserror::Error;

/// Why a single histogram could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The ntuple file does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but cannot be opened as a ROOT file.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// File path.
        path: PathBuf,
        /// Reader error.
        source: RootError,
    },

    /// None of the directory prefixes holds the histogram.
    #[error("histogram not found in {}; tried {}", file.display(), tried.join(", "))]
    HistogramNotFound {
        /// File path.
        file: PathBuf,
        /// Internal paths that were tried, in order.
        tried: Vec<String>,
    },

    /// The histogram exists but could not be decoded.
    #[error("cannot read {object} from {}: {source}", file.display())]
    Read {
        /// File path.
        file: PathBuf,
        /// Internal path of the object.
        object: String,
        /// Reader error.
        source: RootError,
    },

    /// The decoded histogram is inconsistent.
    #[error(transparent)]
    Invalid(#[from] cf_core::Error),
}

/// Why a plot could not be built.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A mandatory ratio input failed to load.
    #[error("could not load {role} histogram from {file}")]
    MissingInput {
        /// `numerator` or `denominator`.
        role: &'static str,
        /// Ntuple file name.
        file: String,
    },

    /// Not a single grid input could be loaded.
    #[error("no histograms named '{hist_name}' could be loaded ({attempted} files tried)")]
    NoHistograms {
        /// Requested histogram.
        hist_name: String,
        /// Number of files tried.
        attempted: usize,
    },

    /// Transform or artifact failure.
    #[error(transparent)]
    Core(#[from] cf_core::Error),
}

//! # cf-analysis
//!
//! Loads cut-flow histograms out of HSCP ntuple files and turns them into
//! plot artifacts:
//!
//! - [`build_ratio`]: two normalized histograms and their bin-by-bin ratio.
//!   Both inputs are mandatory; a missing one aborts the build.
//! - [`build_grid`]: one row per (decay channel, cτ) point. Inputs that fail
//!   to load are skipped with a warning; only an empty result is an error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod grid;
pub mod loader;
pub mod ratio;

pub use error::{BuildError, LoadError};
pub use grid::{GridRequest, build_grid, collect_rows};
pub use loader::{DEFAULT_PREFIXES, HistogramLoader};
pub use ratio::{RatioRequest, build_ratio, format_ctau_label};

//! # cf-core
//!
//! Core types for cutflow: owned 1D histograms with the normalize / divide
//! transforms, the 2D grid built from rows of 1D histograms, and the naming
//! conventions of the HSCP signal samples.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod grid;
pub mod hist;
pub mod sample;

pub use error::{Error, Result};
pub use grid::Grid2D;
pub use hist::{Axis, Hist1D, HistSource, Normalization};
pub use sample::{CTau, DecayChannel, DecaySelection, SignalPoint, DEFAULT_ERA};

/// Crate version, reported by `cutflow --version` and stamped into artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

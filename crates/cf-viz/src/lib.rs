//! # cf-viz
//!
//! Plot artifacts for cutflow.
//!
//! Artifacts are numbers-first: flat arrays of everything a renderer needs,
//! serializable to JSON so a plot can be reproduced or inspected without
//! re-reading the ntuples.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// 2D grid (parameter point × cut) artifacts.
pub mod grid;
/// Shared artifact metadata.
pub mod meta;
/// Two-histogram overlay + ratio artifacts.
pub mod ratio;

pub use grid::{GridArtifact, GridOptions, grid_artifact};
pub use meta::ArtifactMeta;
pub use ratio::{RatioArtifact, RatioInput, RatioOptions, RatioSeries, ratio_artifact};

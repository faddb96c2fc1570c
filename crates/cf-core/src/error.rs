//! Error types for cutflow core.

use thiserror::Error;

/// cutflow core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Two histograms that must share binning do not.
    #[error("Binning mismatch: {0}")]
    BinningMismatch(String),

    /// A grid was requested from an empty set of rows.
    #[error("Empty grid: {0}")]
    EmptyGrid(String),

    /// Malformed user-supplied value (decay channel, cτ token, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

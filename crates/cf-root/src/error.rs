//! Error types for ROOT file reading.

use thiserror::Error;

/// Errors produced while reading a ROOT file.
#[derive(Error, Debug)]
pub enum RootError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with the `root` magic.
    #[error("not a ROOT file (bad magic or truncated header)")]
    BadMagic,

    /// Read past the end of a buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Read position.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes left.
        have: usize,
    },

    /// No key with this name in the directory.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A path component resolved to something that is not a directory.
    #[error("'{name}' is not a directory (class {class})")]
    NotADirectory {
        /// Path component.
        name: String,
        /// Class stored under that key.
        class: String,
    },

    /// The object's class cannot be decoded as a histogram.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),

    /// Malformed streamer data.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A compressed block could not be expanded.
    #[error("decompression error: {0}")]
    Decompression(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, RootError>;

//! # cf-root
//!
//! Native reader for 1D histograms stored in ROOT result files.
//!
//! Handles small and large files, nested `TDirectoryFile`s and zlib, LZ4,
//! ZSTD and XZ compressed records. Decodes `TH1D`/`TH1F`/`TH1I`/`TH1S`/`TH1C`
//! including the X axis title and alphanumeric bin labels.
//!
//! ```no_run
//! use cf_root::RootFile;
//!
//! let f = RootFile::open("ntuple.root").unwrap();
//! for key in f.list_keys_recursive().unwrap() {
//!     println!("{} ({})", key.path, key.class_name);
//! }
//! let h = f.get_histogram("HSCPMiniAODAnalyzer/EventCutFlow").unwrap();
//! println!("{} bins, first label {:?}", h.n_bins, h.bin_labels.first());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
pub mod histogram;
pub mod key;
pub mod objects;
pub mod rbuffer;

pub use error::{Result, RootError};
pub use file::RootFile;
pub use histogram::Histogram;
pub use key::KeyInfo;

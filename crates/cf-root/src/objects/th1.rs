//! `TH1x` deserialization.
//!
//! Layout of a streamed 1D histogram:
//! ```text
//! TH1D | TH1F | TH1I | TH1S | TH1C    version header
//!   TH1                               version header
//!     TNamed                          name, title
//!     TAttLine, TAttFill, TAttMarker  skipped by byte count
//!     fNcells                         i32
//!     fXaxis                          TAxis (title, binning, labels)
//!     fYaxis, fZaxis                  skipped by byte count
//!     fBarOffset, fBarWidth           i16
//!     fEntries, fTsumw, fTsumw2, fTsumwx, fTsumwx2
//!     fMaximum, fMinimum              v >= 2
//!     fNormFactor                     v >= 3
//!     fContour, fSumw2                TArrayD
//!     ...                             skipped to the TH1 end
//!   TArrayX                           fNcells values, under/overflow included
//! ```

use crate::error::{Result, RootError};
use crate::histogram::Histogram;
use crate::rbuffer::RBuffer;

use super::labels::{RawLabel, read_axis_labels, spread_labels};

/// Element type of the bin content array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinStorage {
    F64,
    F32,
    I32,
    I16,
    I8,
}

impl BinStorage {
    pub(crate) fn for_class(class_name: &str) -> Option<Self> {
        match class_name {
            "TH1D" => Some(Self::F64),
            "TH1F" => Some(Self::F32),
            "TH1I" => Some(Self::I32),
            "TH1S" => Some(Self::I16),
            "TH1C" => Some(Self::I8),
            _ => None,
        }
    }

    fn read(self, r: &mut RBuffer) -> Result<f64> {
        Ok(match self {
            Self::F64 => r.read_f64()?,
            Self::F32 => f64::from(r.read_f32()?),
            Self::I32 => f64::from(r.read_i32()?),
            Self::I16 => f64::from(r.read_i16()?),
            Self::I8 => f64::from(r.read_u8()? as i8),
        })
    }
}

struct TAxisRecord {
    n_bins: usize,
    x_min: f64,
    x_max: f64,
    edges: Vec<f64>,
    title: String,
    labels: Vec<RawLabel>,
}

struct Th1Record {
    name: String,
    title: String,
    n_cells: usize,
    x_axis: TAxisRecord,
    entries: f64,
    sumw2: Vec<f64>,
}

pub(super) fn read_th1(payload: &[u8], class_name: &str, storage: BinStorage) -> Result<Histogram> {
    let mut r = RBuffer::new(payload);
    let (_version, _end) = r.read_version()?;
    let base = read_th1_base(&mut r)?;

    let n = r.read_array_len()?;
    if n != base.n_cells {
        return Err(RootError::Deserialization(format!(
            "{class_name} '{}': {n} stored cells, fNcells = {}",
            base.name, base.n_cells
        )));
    }
    let cells = (0..n).map(|_| storage.read(&mut r)).collect::<Result<Vec<f64>>>()?;

    into_histogram(base, class_name, cells)
}

fn read_th1_base(r: &mut RBuffer) -> Result<Th1Record> {
    let (version, end) = r.read_version()?;
    let Some(end) = end else {
        return Err(RootError::Deserialization("TH1 written without byte count".into()));
    };

    let (name, title) = r.read_tnamed()?;
    for what in ["TAttLine", "TAttFill", "TAttMarker"] {
        r.skip_object(what)?;
    }

    let n_cells = r.read_array_len()?;
    let x_axis = read_taxis(r)?;
    r.skip_object("fYaxis")?;
    r.skip_object("fZaxis")?;

    let _bar_offset = r.read_i16()?;
    let _bar_width = r.read_i16()?;
    let entries = r.read_f64()?;
    // fTsumw, fTsumw2, fTsumwx, fTsumwx2
    r.skip(4 * 8)?;
    if version >= 2 {
        r.skip(2 * 8)?;
    }
    if version >= 3 {
        r.skip(8)?;
    }
    let _contour = r.read_array_f64()?;
    let sumw2 = r.read_array_f64()?;

    // fOption, fFunctions, fBuffer and the stat options are not needed.
    r.seek(end)?;

    Ok(Th1Record { name, title, n_cells, x_axis, entries, sumw2 })
}

fn read_taxis(r: &mut RBuffer) -> Result<TAxisRecord> {
    let (version, end) = r.read_version()?;
    let (_name, title) = r.read_tnamed()?;
    r.skip_object("TAttAxis")?;

    let n_bins = r.read_array_len()?;
    let x_min = r.read_f64()?;
    let x_max = r.read_f64()?;
    let edges = r.read_array_f64()?;

    let mut labels = Vec::new();
    if version >= 9 {
        let _first = r.read_i32()?;
        let _last = r.read_i32()?;
        let _bits2 = r.read_u16()?;
        let _time_display = r.read_u8()?;
        let _time_format = r.read_string()?;
        match read_axis_labels(r) {
            Ok(found) => labels = found,
            Err(e) => tracing::debug!("ignoring unreadable bin labels on axis '{title}': {e}"),
        }
    }

    match end {
        Some(end) => r.seek(end)?,
        None if version >= 9 => {
            return Err(RootError::Deserialization("TAxis written without byte count".into()));
        }
        None => {}
    }

    Ok(TAxisRecord { n_bins, x_min, x_max, edges, title, labels })
}

fn into_histogram(base: Th1Record, class_name: &str, cells: Vec<f64>) -> Result<Histogram> {
    let axis = base.x_axis;
    let n_bins = axis.n_bins;
    if cells.len() != n_bins + 2 {
        return Err(RootError::Deserialization(format!(
            "'{}': {} cells for {} bins",
            base.name,
            cells.len(),
            n_bins
        )));
    }

    let bin_edges = if axis.edges.len() == n_bins + 1 {
        axis.edges
    } else {
        let width = (axis.x_max - axis.x_min) / n_bins.max(1) as f64;
        (0..=n_bins).map(|i| axis.x_min + i as f64 * width).collect()
    };

    let sumw2 = (base.sumw2.len() == cells.len()).then(|| base.sumw2[1..=n_bins].to_vec());

    Ok(Histogram {
        name: base.name,
        title: base.title,
        class_name: class_name.to_string(),
        n_bins,
        x_min: axis.x_min,
        x_max: axis.x_max,
        bin_edges,
        bin_content: cells[1..=n_bins].to_vec(),
        sumw2,
        entries: base.entries,
        underflow: cells[0],
        overflow: cells[n_bins + 1],
        x_title: axis.title,
        bin_labels: spread_labels(axis.labels, n_bins),
    })
}

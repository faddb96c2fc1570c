//! Alphanumeric axis labels (`TAxis::fLabels`).
//!
//! ROOT keeps labels in a `THashList` of `TObjString`, where each string's
//! `fUniqueID` holds its 1-based bin number.

use crate::error::{Result, RootError};
use crate::rbuffer::{ObjectTag, RBuffer};

const LIST_CLASSES: &[&str] = &["THashList", "TList"];

/// A label as stored: `fUniqueID` (1-based bin number) and text.
pub(super) type RawLabel = (u32, String);

/// Read the `fLabels` pointer as stored, without spreading it over bins.
///
/// Returns an empty vector when the axis has no labels.
pub(super) fn read_axis_labels(r: &mut RBuffer) -> Result<Vec<RawLabel>> {
    let end = match r.read_object_tag()? {
        ObjectTag::Null | ObjectTag::Reference(_) => return Ok(Vec::new()),
        ObjectTag::NewClass { class, end } => {
            if !LIST_CLASSES.contains(&class.as_str()) {
                return Err(RootError::UnsupportedClass(format!("{class} as axis labels")));
            }
            end
        }
        ObjectTag::KnownClass { end, .. } => end,
    };

    let entries = read_string_list(r)?;
    if let Some(end) = end {
        r.seek(end)?;
    }
    Ok(entries)
}

/// Spread stored labels over `n_bins` slots.
///
/// `n_bins` must already be checked against the stored bin contents.
pub(super) fn spread_labels(entries: Vec<RawLabel>, n_bins: usize) -> Vec<String> {
    if entries.is_empty() {
        return Vec::new();
    }
    let mut labels = vec![String::new(); n_bins];
    for (i, (bin, text)) in entries.into_iter().enumerate() {
        // fUniqueID is the bin number; fall back to list order if it is out of range.
        let slot = match bin as usize {
            b if (1..=n_bins).contains(&b) => b - 1,
            _ if i < n_bins => i,
            _ => continue,
        };
        labels[slot] = text;
    }
    labels
}

/// Body of a `TList` whose items are `TObjString`s: `(fUniqueID, string)` pairs.
fn read_string_list(r: &mut RBuffer) -> Result<Vec<RawLabel>> {
    let (version, end) = r.read_version()?;
    r.read_tobject()?;
    let _name = r.read_string()?;
    let n = r.read_array_len()?;

    // Every item takes at least one byte.
    let mut out = Vec::with_capacity(n.min(r.remaining()));
    let mut last_class = String::new();
    for _ in 0..n {
        let item = match r.read_object_tag()? {
            ObjectTag::NewClass { class, end } => {
                last_class = class;
                Some(end)
            }
            ObjectTag::KnownClass { end, .. } => Some(end),
            ObjectTag::Null | ObjectTag::Reference(_) => None,
        };
        if let Some(item_end) = item {
            if last_class == "TObjString" {
                out.push(read_objstring(r)?);
            }
            match item_end {
                Some(e) => r.seek(e)?,
                None if last_class != "TObjString" => {
                    return Err(RootError::Deserialization(format!(
                        "cannot skip list item of class {last_class}"
                    )));
                }
                None => {}
            }
        }

        // Per-item draw option.
        let short = r.read_u8()?;
        let len = if version > 4 && short == 255 { r.read_u32()? as usize } else { short as usize };
        r.skip(len)?;
    }

    if let Some(end) = end {
        r.seek(end)?;
    }
    Ok(out)
}

fn read_objstring(r: &mut RBuffer) -> Result<RawLabel> {
    let (_, end) = r.read_version()?;
    let (unique_id, _bits) = r.read_tobject()?;
    let text = r.read_string()?;
    if let Some(end) = end {
        r.seek(end)?;
    }
    Ok((unique_id, text))
}

//! Decoding of stored objects by class name.

mod labels;
mod th1;

use crate::error::{Result, RootError};
use crate::histogram::Histogram;

use th1::BinStorage;

/// Decode a histogram payload of the given class.
pub fn read_histogram(payload: &[u8], class_name: &str) -> Result<Histogram> {
    let storage = BinStorage::for_class(class_name)
        .ok_or_else(|| RootError::UnsupportedClass(class_name.to_string()))?;
    th1::read_th1(payload, class_name, storage)
}

/// Whether objects of this class can be read with [`read_histogram`].
pub fn is_histogram_class(class_name: &str) -> bool {
    BinStorage::for_class(class_name).is_some()
}

//! Backing bytes of an open ROOT file.

use std::ops::Deref;

/// File contents, either memory-mapped from disk or held in memory.
pub enum DataSource {
    /// Bytes handed over by the caller.
    Owned(Vec<u8>),
    /// Read-only mapping of a file on disk.
    Mapped(memmap2::Mmap),
}

impl Deref for DataSource {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(bytes) => bytes,
            DataSource::Mapped(map) => map,
        }
    }
}

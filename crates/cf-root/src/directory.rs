//! `TDirectory` records and their key lists.

use crate::error::Result;
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// Location of a directory's key list, from its `TDirectory` streamer.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryRecord {
    /// Offset of the key list.
    pub seek_keys: u64,
    /// Size of the key list record.
    pub nbytes_keys: u32,
}

impl DirectoryRecord {
    /// Parse a `TDirectory` streamer at the reader's position.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let version = r.read_u16()?;
        let _datime_c = r.read_u32()?;
        let _datime_m = r.read_u32()?;
        let nbytes_keys = r.read_u32()?;
        let _nbytes_name = r.read_u32()?;
        let large = version > 1000;
        let _seek_dir = r.read_seek(large)?;
        let _seek_parent = r.read_seek(large)?;
        let seek_keys = r.read_seek(large)?;
        Ok(Self { seek_keys, nbytes_keys })
    }
}

/// The keys of one directory, in file order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list a [`DirectoryRecord`] points to.
    ///
    /// The list is itself stored behind a `TKey` header, followed by a u32
    /// count and that many key headers.
    pub fn read(file: &[u8], record: DirectoryRecord, file_is_large: bool) -> Result<Self> {
        if record.seek_keys == 0 {
            return Ok(Self::default());
        }
        let mut r = RBuffer::at(file, record.seek_keys as usize);
        let _list_key = Key::read(&mut r, file_is_large)?;
        let n = r.read_u32()? as usize;
        let keys = (0..n).map(|_| Key::read(&mut r, file_is_large)).collect::<Result<_>>()?;
        Ok(Self { keys })
    }

    /// All keys, in file order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Highest cycle stored under `name`.
    pub fn find(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }

    /// Keys with only the highest cycle of each name kept, in file order.
    pub fn latest_cycles(&self) -> Vec<&Key> {
        self.keys
            .iter()
            .filter(|k| self.find(&k.name).is_some_and(|best| best.cycle == k.cycle))
            .collect()
    }
}

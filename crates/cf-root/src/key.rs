//! `TKey` records: the headers ROOT writes in front of every stored object.

use crate::decompress::decompress;
use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;

/// Class names that denote a subdirectory.
const DIRECTORY_CLASSES: &[&str] = &["TDirectoryFile", "TDirectory"];

/// A parsed `TKey` header.
#[derive(Debug, Clone)]
pub struct Key {
    /// Bytes on disk: key header plus (possibly compressed) object.
    pub n_bytes: u32,
    /// Key class version; above 1000 the seek fields are 64-bit.
    pub version: u16,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Length of the key header.
    pub key_len: u16,
    /// Cycle number within the directory.
    pub cycle: u16,
    /// Absolute file offset of this key.
    pub seek_key: u64,
    /// Offset of the owning directory.
    pub seek_pdir: u64,
    /// Class of the stored object.
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

/// Summary of a key, returned by the listing functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Slash-separated path from the top directory.
    pub path: String,
    /// Class of the stored object (`TH1D`, `TDirectoryFile`, ...).
    pub class_name: String,
    /// Cycle number.
    pub cycle: u16,
    /// Object title.
    pub title: String,
}

impl Key {
    /// Parse a key header at the reader's position.
    pub fn read(r: &mut RBuffer, file_is_large: bool) -> Result<Self> {
        let n_bytes = r.read_u32()?;
        let version = r.read_u16()?;
        let obj_len = r.read_u32()?;
        let _datime = r.read_u32()?;
        let key_len = r.read_u16()?;
        let cycle = r.read_u16()?;
        let large = file_is_large || version > 1000;
        let seek_key = r.read_seek(large)?;
        let seek_pdir = r.read_seek(large)?;
        let class_name = r.read_string()?;
        let name = r.read_string()?;
        let title = r.read_string()?;
        Ok(Self {
            n_bytes,
            version,
            obj_len,
            key_len,
            cycle,
            seek_key,
            seek_pdir,
            class_name,
            name,
            title,
        })
    }

    /// Whether the key holds a subdirectory.
    pub fn is_directory(&self) -> bool {
        DIRECTORY_CLASSES.contains(&self.class_name.as_str())
    }

    /// Whether the object is stored compressed.
    pub fn is_compressed(&self) -> bool {
        self.obj_len != self.n_bytes.saturating_sub(u32::from(self.key_len))
    }

    /// Read the object bytes from the file, decompressing when needed.
    pub fn payload(&self, file: &[u8]) -> Result<Vec<u8>> {
        let start = usize::try_from(self.seek_key)
            .map_err(|_| RootError::Deserialization(format!("seek {} too large", self.seek_key)))?;
        let end = start + self.n_bytes as usize;
        if end > file.len() || (self.key_len as u32) > self.n_bytes {
            return Err(RootError::BufferUnderflow {
                offset: start,
                need: self.n_bytes as usize,
                have: file.len().saturating_sub(start),
            });
        }
        let stored = &file[start + self.key_len as usize..end];
        if self.is_compressed() {
            decompress(stored, self.obj_len as usize)
        } else {
            Ok(stored.to_vec())
        }
    }

    /// Listing entry for this key under `parent` (empty for the top directory).
    pub fn info(&self, parent: &str) -> KeyInfo {
        let path =
            if parent.is_empty() { self.name.clone() } else { format!("{parent}/{}", self.name) };
        KeyInfo {
            path,
            class_name: self.class_name.clone(),
            cycle: self.cycle,
            title: self.title.clone(),
        }
    }
}

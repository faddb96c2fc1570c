//! File header parsing and the top-level [`RootFile`] interface.

use std::fs;
use std::path::{Path, PathBuf};

use crate::datasource::DataSource;
use crate::directory::{Directory, DirectoryRecord};
use crate::error::{Result, RootError};
use crate::histogram::Histogram;
use crate::key::{Key, KeyInfo};
use crate::objects;
use crate::rbuffer::RBuffer;

const ROOT_MAGIC: &[u8; 4] = b"root";
/// Smallest header that still holds every field read by [`FileHeader::parse`].
const MIN_HEADER_LEN: usize = 45;

/// Fields of the file header needed to find the top directory.
#[derive(Debug, Clone, Copy)]
struct FileHeader {
    is_large: bool,
    top: DirectoryRecord,
}

impl FileHeader {
    /// Parse the header at offset 0.
    ///
    /// ```text
    /// 0   "root"
    /// 4   fVersion       >= 1000000 means 64-bit seeks
    /// 8   fBEGIN
    /// 12  fEND, fSeekFree               (u32 or u64)
    /// ..  fNbytesFree, nfree, fNbytesName, fUnits, fCompress, fSeekInfo, fNbytesInfo
    /// ```
    /// The top `TDirectory` record sits at `fBEGIN + fNbytesName`.
    fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_HEADER_LEN || &data[..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let mut r = RBuffer::at(data, 4);
        let version = r.read_u32()?;
        let is_large = version >= 1_000_000;
        let begin = r.read_u32()? as usize;
        let _end = r.read_seek(is_large)?;
        let _seek_free = r.read_seek(is_large)?;
        let _nbytes_free = r.read_u32()?;
        let _nfree = r.read_u32()?;
        let nbytes_name = r.read_u32()? as usize;

        let dir_at = begin + nbytes_name;
        if dir_at >= data.len() {
            return Err(RootError::Deserialization(format!(
                "top directory offset {dir_at} past end of file ({} bytes)",
                data.len()
            )));
        }
        let top = DirectoryRecord::read(&mut RBuffer::at(data, dir_at))?;
        Ok(Self { is_large, top })
    }
}

/// A ROOT file opened for reading histograms.
pub struct RootFile {
    data: DataSource,
    header: FileHeader,
    path: PathBuf,
}

impl RootFile {
    /// Memory-map and parse a file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        // SAFETY: the mapping is read-only; result files are not rewritten while plots are made.
        let map = unsafe { memmap2::Mmap::map(&file)? };
        Self::from_source(DataSource::Mapped(map), path)
    }

    /// Parse a file already held in memory.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_source(DataSource::Owned(data), path.into())
    }

    fn from_source(data: DataSource, path: PathBuf) -> Result<Self> {
        let header = FileHeader::parse(&data)?;
        Ok(Self { data, header, path })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys of the top directory (latest cycle of each name).
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        let top = self.top_directory()?;
        Ok(top.latest_cycles().into_iter().map(|k| k.info("")).collect())
    }

    /// Keys of every directory, depth first, with slash-separated paths.
    pub fn list_keys_recursive(&self) -> Result<Vec<KeyInfo>> {
        let mut out = Vec::new();
        self.walk(&self.top_directory()?, "", &mut out)?;
        Ok(out)
    }

    /// Keys of the directory at `path` (`""` for the top directory).
    pub fn list_directory(&self, path: &str) -> Result<Vec<KeyInfo>> {
        let dir = self.directory_at(path)?;
        let parent = path.trim_matches('/');
        Ok(dir.latest_cycles().into_iter().map(|k| k.info(parent)).collect())
    }

    /// Whether `path` names a directory in this file.
    pub fn has_directory(&self, path: &str) -> bool {
        self.directory_at(path).is_ok()
    }

    /// Decode the histogram at `path`, e.g. `"HSCPMiniAODAnalyzer/EventCutFlow"`.
    pub fn get_histogram(&self, path: &str) -> Result<Histogram> {
        let (dir_path, name) = match path.trim_matches('/').rsplit_once('/') {
            Some((dir, name)) => (dir, name),
            None => ("", path.trim_matches('/')),
        };
        if name.is_empty() {
            return Err(RootError::KeyNotFound(path.to_string()));
        }

        let dir = self.directory_at(dir_path)?;
        let key = dir.find(name).ok_or_else(|| RootError::KeyNotFound(path.to_string()))?;
        if !objects::is_histogram_class(&key.class_name) {
            return Err(RootError::UnsupportedClass(format!("{} ({path})", key.class_name)));
        }
        let payload = key.payload(&self.data)?;
        objects::read_histogram(&payload, &key.class_name)
    }

    fn top_directory(&self) -> Result<Directory> {
        Directory::read(&self.data, self.header.top, self.header.is_large)
    }

    fn directory_at(&self, path: &str) -> Result<Directory> {
        let mut dir = self.top_directory()?;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            let key = dir
                .find(part)
                .ok_or_else(|| RootError::KeyNotFound(format!("{part} (in {path})")))?;
            dir = self.subdirectory(key)?;
        }
        Ok(dir)
    }

    fn subdirectory(&self, key: &Key) -> Result<Directory> {
        if !key.is_directory() {
            return Err(RootError::NotADirectory {
                name: key.name.clone(),
                class: key.class_name.clone(),
            });
        }
        let payload = key.payload(&self.data)?;
        let record = DirectoryRecord::read(&mut RBuffer::new(&payload))?;
        Directory::read(&self.data, record, self.header.is_large)
    }

    fn walk(&self, dir: &Directory, prefix: &str, out: &mut Vec<KeyInfo>) -> Result<()> {
        for key in dir.latest_cycles() {
            let info = key.info(prefix);
            let child = key.is_directory().then(|| info.path.clone());
            out.push(info);
            if let Some(child) = child {
                self.walk(&self.subdirectory(key)?, &child, out)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RootFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootFile")
            .field("path", &self.path)
            .field("len", &self.data.len())
            .field("is_large", &self.header.is_large)
            .finish()
    }
}

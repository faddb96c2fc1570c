//! Cursor over ROOT's big-endian streamer encoding.

use crate::error::{Result, RootError};

/// Set on the first u32 of a streamed object when a byte count follows.
pub const BYTE_COUNT_MASK: u32 = 0x4000_0000;
/// Tag announcing a class name that has not been seen in this buffer.
pub const NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
/// Set on tags that refer back to an already-announced class.
pub const CLASS_MASK: u32 = 0x8000_0000;
/// `TObject::kIsReferenced`: a 2-byte process id follows the bits.
const IS_REFERENCED: u32 = 0x0000_0010;

/// Header of an object written through a pointer (`TBuffer::WriteObjectAny`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectTag {
    /// Null pointer.
    Null,
    /// First occurrence of `class` in this buffer; the object body follows.
    NewClass {
        /// Class name.
        class: String,
        /// Absolute end of the object, if a byte count was written.
        end: Option<usize>,
    },
    /// Object of a class announced earlier in the buffer; the body follows.
    KnownClass {
        /// Offset-encoded class reference.
        tag: u32,
        /// Absolute end of the object, if a byte count was written.
        end: Option<usize>,
    },
    /// Reference to an object already read; no body follows.
    Reference(u32),
}

/// Read cursor over a byte slice.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_be {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Read a big-endian `", stringify!($ty), "`.")]
            pub fn $name(&mut self) -> Result<$ty> {
                const N: usize = std::mem::size_of::<$ty>();
                let mut raw = [0u8; N];
                raw.copy_from_slice(self.read_bytes(N)?);
                Ok(<$ty>::from_be_bytes(raw))
            }
        )*
    };
}

impl<'a> RBuffer<'a> {
    /// Start reading at offset 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute position inside the buffer.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: pos.saturating_sub(self.pos),
                have: self.remaining(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Borrow the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len()).ok_or(
            RootError::BufferUnderflow { offset: self.pos, need: n, have: self.remaining() },
        )?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    read_be! {
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_f32 => f32,
        read_f64 => f64,
    }

    /// Read a seek pointer, 64-bit when `large`.
    pub fn read_seek(&mut self, large: bool) -> Result<u64> {
        if large { self.read_u64() } else { self.read_u32().map(u64::from) }
    }

    /// Read a `TString`: one length byte, or 255 followed by a u32 length.
    pub fn read_string(&mut self) -> Result<String> {
        let short = self.read_u8()?;
        let len = if short == 255 { self.read_u32()? as usize } else { short as usize };
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a NUL-terminated C string (class names in object tags).
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let Some(nul) = rest.iter().position(|&b| b == 0) else {
            return Err(RootError::Deserialization(format!(
                "unterminated class name at offset {}",
                self.pos
            )));
        };
        let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(s)
    }

    /// Read a streamer version header.
    ///
    /// Returns the class version and, when a byte count is present, the
    /// absolute position where the object ends.
    pub fn read_version(&mut self) -> Result<(u16, Option<usize>)> {
        let start = self.pos;
        let raw = self.read_u32()?;
        if raw & BYTE_COUNT_MASK == 0 {
            // Old-style header: just the u16 version.
            self.pos = start;
            return Ok((self.read_u16()?, None));
        }
        let count = (raw & !BYTE_COUNT_MASK) as usize;
        let version = self.read_u16()?;
        Ok((version, Some(start + 4 + count)))
    }

    /// Skip a versioned object using its byte count.
    pub fn skip_object(&mut self, what: &str) -> Result<()> {
        let start = self.pos;
        match self.read_version()? {
            (_, Some(end)) => self.seek(end),
            (_, None) => Err(RootError::Deserialization(format!(
                "cannot skip {what} at offset {start}: no byte count"
            ))),
        }
    }

    /// Read a `TObject` base: returns `(fUniqueID, fBits)`.
    pub fn read_tobject(&mut self) -> Result<(u32, u32)> {
        let _version = self.read_u16()?;
        let unique_id = self.read_u32()?;
        let bits = self.read_u32()?;
        if bits & IS_REFERENCED != 0 {
            self.skip(2)?;
        }
        Ok((unique_id, bits))
    }

    /// Read a `TNamed` base: returns `(fName, fTitle)`.
    pub fn read_tnamed(&mut self) -> Result<(String, String)> {
        let (_, end) = self.read_version()?;
        self.read_tobject()?;
        let name = self.read_string()?;
        let title = self.read_string()?;
        if let Some(end) = end {
            self.seek(end)?;
        }
        Ok((name, title))
    }

    /// Read the header written in front of an object pointer.
    pub fn read_object_tag(&mut self) -> Result<ObjectTag> {
        let start = self.pos;
        let raw = self.read_u32()?;
        if raw == 0 {
            return Ok(ObjectTag::Null);
        }

        let (end, tag) = if raw & BYTE_COUNT_MASK != 0 && raw != NEW_CLASS_TAG {
            let count = (raw & !BYTE_COUNT_MASK) as usize;
            (Some(start + 4 + count), self.read_u32()?)
        } else {
            (None, raw)
        };

        if tag == NEW_CLASS_TAG {
            let class = self.read_cstring()?;
            Ok(ObjectTag::NewClass { class, end })
        } else if tag & CLASS_MASK != 0 {
            Ok(ObjectTag::KnownClass { tag: tag & !CLASS_MASK, end })
        } else {
            Ok(ObjectTag::Reference(tag))
        }
    }

    /// Read a `TArrayD` body (i32 length, then values).
    pub fn read_array_f64(&mut self) -> Result<Vec<f64>> {
        let n = self.read_array_len()?;
        (0..n).map(|_| self.read_f64()).collect()
    }

    /// Read `n` big-endian f64 values.
    pub fn read_f64_values(&mut self, n: usize) -> Result<Vec<f64>> {
        (0..n).map(|_| self.read_f64()).collect()
    }

    /// Read an array length prefix, rejecting negative values.
    pub fn read_array_len(&mut self) -> Result<usize> {
        let n = self.read_i32()?;
        usize::try_from(n)
            .map_err(|_| RootError::Deserialization(format!("negative array length {n}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_big_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18];
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert!((r.read_f64().unwrap() - std::f64::consts::PI).abs() < 1e-15);
        assert_eq!(r.remaining(), 0);
        assert!(matches!(r.read_u8(), Err(RootError::BufferUnderflow { need: 1, have: 0, .. })));
    }

    #[test]
    fn short_and_long_strings() {
        let mut data = vec![3, b'a', b'b', b'c', 255, 0, 0, 1, 0];
        data.extend(std::iter::repeat_n(b'x', 256));
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_string().unwrap(), "abc");
        assert_eq!(r.read_string().unwrap().len(), 256);
    }

    #[test]
    fn version_with_byte_count() {
        let mut data = Vec::new();
        data.extend_from_slice(&(BYTE_COUNT_MASK | 16).to_be_bytes());
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 14]);
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_version().unwrap(), (3, Some(20)));
        assert_eq!(r.pos(), 6);
    }

    #[test]
    fn version_without_byte_count() {
        let data = [0x00, 0x02, 0xAA, 0xBB];
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_version().unwrap(), (2, None));
        assert_eq!(r.pos(), 2);
        r.seek(0).unwrap();
        assert!(r.skip_object("TAttLine").is_err());
    }

    #[test]
    fn object_tags() {
        let mut data = Vec::new();
        // null pointer
        data.extend_from_slice(&0u32.to_be_bytes());
        // new class with byte count
        let body_len = 4 + 6 + 2;
        data.extend_from_slice(&(BYTE_COUNT_MASK | body_len).to_be_bytes());
        data.extend_from_slice(&NEW_CLASS_TAG.to_be_bytes());
        data.extend_from_slice(b"TList\0");
        data.extend_from_slice(&[0xAB, 0xCD]);
        // known class
        data.extend_from_slice(&(BYTE_COUNT_MASK | 4).to_be_bytes());
        data.extend_from_slice(&(CLASS_MASK | 0x42).to_be_bytes());
        // back reference
        data.extend_from_slice(&0x0000_0100u32.to_be_bytes());

        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_object_tag().unwrap(), ObjectTag::Null);
        let tag = r.read_object_tag().unwrap();
        assert_eq!(tag, ObjectTag::NewClass { class: "TList".into(), end: Some(20) });
        r.seek(20).unwrap();
        let known = r.read_object_tag().unwrap();
        assert_eq!(known, ObjectTag::KnownClass { tag: 0x42, end: Some(28) });
        assert_eq!(r.read_object_tag().unwrap(), ObjectTag::Reference(0x100));
    }

    #[test]
    fn referenced_tobject_skips_pid() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&7u32.to_be_bytes());
        data.extend_from_slice(&(0x0300_0000 | IS_REFERENCED).to_be_bytes());
        data.extend_from_slice(&[0, 1]);
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_tobject().unwrap().0, 7);
        assert_eq!(r.remaining(), 0);
    }
}

//! Expansion of ROOT compressed records.
//!
//! A compressed object is a sequence of blocks, each with a 9-byte header:
//! ```text
//! 0..2  algorithm ("ZL" zlib, "L4" lz4, "ZS" zstd, "XZ" lzma)
//! 2     method byte
//! 3..6  compressed size, little-endian u24
//! 6..9  uncompressed size, little-endian u24
//! ```

use std::io::Read;

use crate::error::{Result, RootError};

const BLOCK_HEADER: usize = 9;
/// LZ4 blocks carry an xxhash64 of the payload before the compressed data.
const LZ4_CHECKSUM: usize = 8;

/// Expand all blocks of `src`, which must add up to `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut rest = src;

    while out.len() < expected_len {
        if rest.len() < BLOCK_HEADER {
            return Err(RootError::Decompression(format!(
                "truncated block header after {} of {} bytes",
                out.len(),
                expected_len
            )));
        }
        let (header, tail) = rest.split_at(BLOCK_HEADER);
        let c_size = le24(&header[3..6]);
        let u_size = le24(&header[6..9]);
        if c_size > tail.len() {
            return Err(RootError::Decompression(format!(
                "block claims {c_size} compressed bytes, {} available",
                tail.len()
            )));
        }
        let (block, next) = tail.split_at(c_size);

        let before = out.len();
        match &header[..2] {
            b"ZL" => read_all(flate2::read::ZlibDecoder::new(block), &mut out, "zlib")?,
            b"XZ" => {
                lzma_rs::xz_decompress(&mut std::io::BufReader::new(block), &mut out)
                    .map_err(|e| RootError::Decompression(format!("xz: {e}")))?;
            }
            b"L4" => {
                let data = block.get(LZ4_CHECKSUM..).ok_or_else(|| {
                    RootError::Decompression("lz4 block shorter than its checksum".into())
                })?;
                let expanded = lz4_flex::block::decompress(data, u_size)
                    .map_err(|e| RootError::Decompression(format!("lz4: {e}")))?;
                out.extend_from_slice(&expanded);
            }
            b"ZS" => {
                let mut source = block;
                let decoder = ruzstd::decoding::StreamingDecoder::new(&mut source)
                    .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
                read_all(decoder, &mut out, "zstd")?;
            }
            other => {
                return Err(RootError::Decompression(format!(
                    "unknown compression algorithm {:?}",
                    String::from_utf8_lossy(other)
                )));
            }
        }

        let produced = out.len() - before;
        if produced != u_size {
            return Err(RootError::Decompression(format!(
                "block expanded to {produced} bytes, header says {u_size}"
            )));
        }
        rest = next;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "expanded {} bytes, key says {}",
            out.len(),
            expected_len
        )));
    }
    Ok(out)
}

fn read_all(mut reader: impl Read, out: &mut Vec<u8>, algo: &str) -> Result<()> {
    reader.read_to_end(out).map_err(|e| RootError::Decompression(format!("{algo}: {e}")))?;
    Ok(())
}

fn le24(b: &[u8]) -> usize {
    usize::from(b[0]) | usize::from(b[1]) << 8 | usize::from(b[2]) << 16
}

/// Wrap `data` in a single zlib block.
#[cfg(any(test, feature = "fixtures"))]
pub(crate) fn zlib_block(data: &[u8]) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing into a Vec cannot fail.
    let _ = enc.write_all(data);
    let compressed = enc.finish().unwrap_or_default();
    frame(b"ZL", 8, &compressed, data.len())
}

#[cfg(any(test, feature = "fixtures"))]
fn frame(tag: &[u8; 2], method: u8, compressed: &[u8], u_len: usize) -> Vec<u8> {
    let mut block = Vec::with_capacity(BLOCK_HEADER + compressed.len());
    block.extend_from_slice(tag);
    block.push(method);
    block.extend_from_slice(&(compressed.len() as u32).to_le_bytes()[..3]);
    block.extend_from_slice(&(u_len as u32).to_le_bytes()[..3]);
    block.extend_from_slice(compressed);
    block
}

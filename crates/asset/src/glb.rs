//! GLB container layout: a 12-byte header followed by length-prefixed
//! chunks, the first of which must be JSON and the second, if present, the
//! binary payload.
//!
//! All multi-byte values are little-endian. Floats are the raw IEEE-754
//! bits of the on-disk u32; no rounding or re-encoding happens anywhere.

use crate::error::FormatError;

/// ASCII "glTF".
pub const MAGIC: u32 = 0x4654_6C67;
/// The only container version this decoder accepts.
pub const SUPPORTED_VERSION: u32 = 2;
/// ASCII "JSON".
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// ASCII "BIN\0".
pub const CHUNK_BIN: u32 = 0x004E_4942;

pub const HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;

/// Decoded 12-byte container header.
#[derive(Clone, Copy, Debug)]
pub struct Header {
    pub version: u32,
    /// Total container length as declared by the file. Informational only;
    /// actual reads are bounds-checked against the real buffer.
    pub declared_length: u32,
}

/// Bounds-checked little-endian u32 read.
#[inline]
pub fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Bounds-checked little-endian f32 read (bit-for-bit reinterpretation).
#[inline]
pub fn read_f32(buf: &[u8], offset: usize) -> Option<f32> {
    read_u32(buf, offset).map(f32::from_bits)
}

/// Validate magic and version, returning the header fields.
pub fn read_header(buf: &[u8]) -> Result<Header, FormatError> {
    let magic = read_u32(buf, 0).ok_or(FormatError::Truncated { offset: 0 })?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic);
    }
    let version = read_u32(buf, 4).ok_or(FormatError::Truncated { offset: 4 })?;
    if version != SUPPORTED_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    let declared_length = read_u32(buf, 8).ok_or(FormatError::Truncated { offset: 8 })?;
    Ok(Header {
        version,
        declared_length,
    })
}

/// Chunk header at `offset`: payload length and type, followed by the
/// payload itself.
#[derive(Clone, Copy, Debug)]
pub struct Chunk {
    pub length: usize,
    pub kind: u32,
    pub data_offset: usize,
}

impl Chunk {
    /// First byte past this chunk's payload.
    #[inline]
    pub fn end(&self) -> usize {
        self.data_offset + self.length
    }
}

/// Read the chunk header at `offset`. The declared payload must fit in the
/// remaining buffer.
pub fn read_chunk(buf: &[u8], offset: usize) -> Result<Chunk, FormatError> {
    let length = read_u32(buf, offset).ok_or(FormatError::Truncated { offset })? as usize;
    let kind = read_u32(buf, offset + 4).ok_or(FormatError::Truncated { offset: offset + 4 })?;
    let data_offset = offset + CHUNK_HEADER_LEN;
    if length > buf.len().saturating_sub(data_offset) {
        return Err(FormatError::Truncated { offset: data_offset });
    }
    Ok(Chunk {
        length,
        kind,
        data_offset,
    })
}

/// Slice the JSON chunk as text.
///
/// Chunk 0 must be JSON-typed. glTF pads the chunk to 4-byte alignment with
/// spaces or NULs; trailing padding is stripped before the text reaches the
/// JSON parser.
pub fn extract_json(buf: &[u8]) -> Result<&str, FormatError> {
    read_header(buf)?;
    let chunk = read_chunk(buf, HEADER_LEN)?;
    if chunk.kind != CHUNK_JSON {
        return Err(FormatError::MissingJsonChunk);
    }
    let raw = &buf[chunk.data_offset..chunk.end()];
    let text =
        std::str::from_utf8(raw).map_err(|e| FormatError::InvalidJson(e.to_string()))?;
    Ok(text.trim_end_matches(|c: char| c == '\0' || c.is_ascii_whitespace()))
}

/// Byte range of the BIN chunk, relative to the whole buffer.
#[derive(Clone, Copy, Debug)]
pub struct BinChunk {
    pub offset: usize,
    pub length: usize,
}

/// Locate the BIN chunk that follows the JSON chunk.
///
/// Returns `None` when fewer than 8 bytes remain or the next chunk is not
/// BIN-typed; many valid files keep all their data external or embedded as
/// base64 and carry no BIN chunk at all.
pub fn locate_bin_chunk(buf: &[u8], json_chunk_end: usize) -> Option<BinChunk> {
    let chunk = read_chunk(buf, json_chunk_end).ok()?;
    (chunk.kind == CHUNK_BIN).then_some(BinChunk {
        offset: chunk.data_offset,
        length: chunk.length,
    })
}

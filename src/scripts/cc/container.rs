//! Container framing: a CC file is a 0x18-byte header whose last four bytes
//! double as the LZSS size prefix, followed by the compressed body. In its
//! decompressed form the same header is kept and the body follows it
//! uncompressed.
use super::lzss;
use crate::types::ScriptError;

/// Size of the container header kept verbatim through the pipeline.
pub const HEADER_LEN: usize = 0x18;
/// Offset of the little-endian u16 holding the decompressed body length.
pub const SIZE_FIELD_OFFSET: usize = 0x14;
/// The body length must fit the 16-bit size field.
pub const MAX_BODY_LEN: usize = 0xFFFF;

/// Decompresses a raw container into header-plus-body form.
pub fn unframe(raw: &[u8]) -> Result<Vec<u8>, ScriptError> {
    if raw.len() < HEADER_LEN {
        return Err(ScriptError::FileTooSmall(raw.len()));
    }
    // The LZSS input starts at the size field: its u32 prefix occupies
    // [0x14, 0x18) of the header.
    let body = lzss::decompress(&raw[SIZE_FIELD_OFFSET..])?;
    let mut script = Vec::with_capacity(HEADER_LEN + body.len());
    script.extend_from_slice(&raw[..HEADER_LEN]);
    script.extend_from_slice(&body);
    Ok(script)
}

/// Recompresses a decompressed container back into its on-disk form.
pub fn frame(script: &[u8]) -> Result<Vec<u8>, ScriptError> {
    if script.len() < HEADER_LEN {
        return Err(ScriptError::FileTooSmall(script.len()));
    }
    let body = &script[HEADER_LEN..];
    if body.len() > MAX_BODY_LEN {
        return Err(ScriptError::BodyTooLarge(body.len()));
    }
    let compressed = lzss::compress(body);
    let mut raw = Vec::with_capacity(SIZE_FIELD_OFFSET + compressed.len());
    raw.extend_from_slice(&script[..SIZE_FIELD_OFFSET]);
    // The codec's size prefix lands back at [0x14, 0x18).
    raw.extend_from_slice(&compressed);
    Ok(raw)
}

/// Reads the declared body length from a decompressed container.
pub fn body_len_field(script: &[u8]) -> u16 {
    u16::from_le_bytes([script[SIZE_FIELD_OFFSET], script[SIZE_FIELD_OFFSET + 1]])
}

/// Rewrites the declared body length of a decompressed container. The two
/// bytes after the field are left untouched.
pub fn set_body_len_field(script: &mut [u8], len: u16) {
    script[SIZE_FIELD_OFFSET..SIZE_FIELD_OFFSET + 2].copy_from_slice(&len.to_le_bytes());
}

//! Basic types
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Text Encoding
pub enum Encoding {
    /// UTF-8 encoding
    Utf8,
    /// Shift-JIS encoding
    Cp932,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Cp932
    }
}

impl Encoding {
    /// Returns true if the encoding is Shift-JIS (CP932).
    pub fn is_jis(&self) -> bool {
        matches!(self, Self::Cp932)
    }
}

/// Result of a per-file operation.
pub enum ScriptResult {
    /// Operation completed successfully.
    Ok,
    /// Operation completed but some records were skipped.
    /// The output file is still a valid, loadable script.
    Partial,
    /// Nothing to do for this file.
    /// For example, no text records found, or no matching translator file.
    Ignored,
}

#[derive(Debug, Error)]
/// Structural failures of the script pipeline. Each kind fails the file it
/// occurred in; the batch continues with the next file.
pub enum ScriptError {
    /// File is shorter than the 0x18-byte container header.
    #[error("file too small for a script header: {0} bytes")]
    FileTooSmall(usize),
    /// The compressed stream cannot be decoded.
    #[error("corrupt LZSS stream: {0}")]
    CorruptLzss(&'static str),
    /// The decompressed body does not fit the 16-bit size field.
    #[error("decompressed body too large to repack: {0} bytes")]
    BodyTooLarge(usize),
    /// Translator line count differs from the script's record count.
    #[error("record count mismatch: script has {records} records, text has {lines} lines")]
    Mismatch { records: usize, lines: usize },
    /// A record's original bytes were not found at or after the rewrite
    /// cursor.
    #[error("original record bytes not found at or after offset {cursor:#x}")]
    LostAnchor { cursor: usize },
}

//! Error types for A2M/A2T decoding.

use crate::depack::Compression;

/// Result type for decoder operations.
pub type Result<T> = std::result::Result<T, A2mError>;

/// Errors that can occur while decoding an AdLib Tracker 2 module.
///
/// Any failure aborts the whole decode; no partially built song is returned.
#[derive(thiserror::Error, Debug)]
pub enum A2mError {
    /// Buffer ended before a declared or required field.
    #[error("truncated data: needed {needed} bytes at offset {offset}, only {available} available")]
    Truncated {
        /// Offset where the read was attempted
        offset: usize,
        /// Number of bytes requested
        needed: usize,
        /// Number of bytes left at that offset
        available: usize,
    },

    /// Header signature matches neither `_A2module_` nor `_A2tiny_module_`.
    #[error("not an AdLib Tracker 2 module (bad magic)")]
    BadMagic,

    /// Version outside the decodable set.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    /// Compression scheme has no depacker.
    #[error("unsupported compression scheme: {0}")]
    UnsupportedCompression(Compression),

    /// Compressed data is invalid before its declared length was consumed.
    #[error("corrupt compressed stream: {0}")]
    CorruptStream(String),

    /// Depacked length disagrees with the length the format declares.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Length required by the format
        expected: usize,
        /// Length actually produced or supplied
        actual: usize,
    },

    /// IO error while reading a module from disk
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl A2mError {
    /// Re-tag a cursor underrun inside a compressed stream as stream corruption.
    pub(crate) fn into_corrupt(self, context: &str) -> Self {
        match self {
            A2mError::Truncated { offset, .. } => A2mError::CorruptStream(format!(
                "{context}: input exhausted at byte {offset}"
            )),
            other => other,
        }
    }
}

//! Block decompression for A2M/A2T modules.
//!
//! Every length-prefixed block in a module is compressed with the scheme
//! selected by the file's format version:
//!
//! | version | scheme  |
//! |---------|---------|
//! | 1, 5    | sixpack |
//! | 2, 6    | LZW (no depacker) |
//! | 3, 7    | LZSS (no depacker) |
//! | 4, 8    | raw     |
//! | 9-11    | aPlib   |
//!
//! Depacked output is zero-extended to the target size, since the final
//! pattern group of a song is usually shorter than a full group.

pub mod aplib;
pub mod sixpack;

use std::fmt;

use crate::error::{A2mError, Result};

/// Compression scheme used for the blocks of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Adaptive Huffman + LZ77 ("sixpack")
    Sixpack,
    /// LZW
    Lzw,
    /// LZSS
    Lzss,
    /// Stored verbatim
    Raw,
    /// aPlib
    Aplib,
}

impl Compression {
    /// Scheme used by a given format version, if the version exists.
    pub fn for_version(version: u8) -> Option<Self> {
        match version {
            1 | 5 => Some(Compression::Sixpack),
            2 | 6 => Some(Compression::Lzw),
            3 | 7 => Some(Compression::Lzss),
            4 | 8 => Some(Compression::Raw),
            9..=11 => Some(Compression::Aplib),
            _ => None,
        }
    }

    /// Whether a depacker exists for this scheme.
    pub fn is_supported(self) -> bool {
        !matches!(self, Compression::Lzw | Compression::Lzss)
    }

    /// Short lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Compression::Sixpack => "sixpack",
            Compression::Lzw => "lzw",
            Compression::Lzss => "lzss",
            Compression::Raw => "raw",
            Compression::Aplib => "aplib",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expand `src` into a buffer of exactly `target_len` bytes.
///
/// Fails with [`A2mError::SizeMismatch`] when the stream expands past
/// `target_len` or a raw block's length differs from it.
pub fn depack(scheme: Compression, src: &[u8], target_len: usize) -> Result<Vec<u8>> {
    let mut out = match scheme {
        Compression::Sixpack => sixpack::depack(src, target_len)?,
        Compression::Aplib => aplib::depack(src, target_len)?,
        Compression::Raw => {
            if src.len() != target_len {
                return Err(A2mError::SizeMismatch {
                    expected: target_len,
                    actual: src.len(),
                });
            }
            src.to_vec()
        }
        Compression::Lzw | Compression::Lzss => {
            return Err(A2mError::UnsupportedCompression(scheme));
        }
    };

    log::trace!(
        "{scheme}: {} packed -> {} depacked (target {target_len})",
        src.len(),
        out.len()
    );
    out.resize(target_len, 0);
    Ok(out)
}

//! Container detection and header parsing.
//!
//! A2M header (16 bytes):
//! ```text
//! 0   10  "_A2module_"
//! 10   4  checksum (u32 LE)
//! 14   1  format version
//! 15   1  pattern count
//! ```
//!
//! A2T header (23 bytes):
//! ```text
//! 0   15  "_A2tiny_module_"
//! 15   4  checksum (u32 LE)
//! 19   1  format version
//! 20   1  pattern count
//! 21   1  tempo
//! 22   1  speed
//! ```
//!
//! The variable header that follows holds the block-length table; for A2T it
//! also carries the song settings that A2M keeps in its song-data block.

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::{A2mError, Result};
use crate::song::SongSettings;

use super::profile::{FormatProfile, LengthWidth};

/// A2M signature.
pub const A2M_MAGIC: &[u8; 10] = b"_A2module_";

/// A2T signature.
pub const A2T_MAGIC: &[u8; 15] = b"_A2tiny_module_";

/// Container flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Container {
    /// Full module (`_A2module_`)
    A2m,
    /// Tiny module (`_A2tiny_module_`)
    A2t,
}

impl Container {
    /// Signature bytes.
    pub fn magic(self) -> &'static [u8] {
        match self {
            Container::A2m => A2M_MAGIC,
            Container::A2t => A2T_MAGIC,
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Container::A2m => "a2m",
            Container::A2t => "a2t",
        }
    }
}

/// Fixed module header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Container flavour
    pub container: Container,
    /// Stored checksum (not verified)
    pub checksum: u32,
    /// Format version
    pub version: u8,
    /// Declared pattern count
    pub pattern_count: u8,
    /// Initial tempo (A2T only, zero for A2M)
    pub tempo: u8,
    /// Initial speed (A2T only, zero for A2M)
    pub speed: u8,
}

/// Variable header: settings (A2T) and the block-length table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarHeader {
    /// Song settings; defaults for A2M, which stores them in song data
    pub settings: SongSettings,
    /// Compressed length of each block, in file order
    pub block_lengths: Vec<u32>,
}

/// Identify the container from the leading signature.
///
/// A buffer that is a strict prefix of a signature is reported as
/// [`A2mError::Truncated`] rather than [`A2mError::BadMagic`].
pub fn detect_container(data: &[u8]) -> Result<Container> {
    for container in [Container::A2m, Container::A2t] {
        let magic = container.magic();
        if data.starts_with(magic) {
            return Ok(container);
        }
        if data.len() < magic.len() && magic.starts_with(data) {
            return Err(A2mError::Truncated {
                offset: 0,
                needed: magic.len(),
                available: data.len(),
            });
        }
    }
    Err(A2mError::BadMagic)
}

/// Parse the fixed header; leaves the cursor at the variable header.
pub fn parse_header(cursor: &mut ByteCursor<'_>) -> Result<Header> {
    let rest = cursor.peek_at(cursor.position(), cursor.remaining())?;
    let container = detect_container(rest)?;
    cursor.skip(container.magic().len())?;

    let checksum = cursor.read_u32_le()?;
    let version = cursor.read_u8()?;
    let pattern_count = cursor.read_u8()?;
    let (tempo, speed) = match container {
        Container::A2m => (0, 0),
        Container::A2t => (cursor.read_u8()?, cursor.read_u8()?),
    };

    Ok(Header {
        container,
        checksum,
        version,
        pattern_count,
        tempo,
        speed,
    })
}

/// Parse the variable header for a validated version.
pub fn parse_var_header(
    cursor: &mut ByteCursor<'_>,
    container: Container,
    profile: &FormatProfile,
) -> Result<VarHeader> {
    let mut settings = SongSettings::default();
    let version = profile.version;

    if container == Container::A2t && version >= 5 {
        settings.common_flag = cursor.read_u8()?;
        if version >= 9 {
            settings.pattern_length = cursor.read_u16_le()?;
            settings.track_count = cursor.read_u8()?;
            settings.macro_speedup = cursor.read_u16_le()?;
        }
        if version >= 10 {
            settings.flag_4op = cursor.read_u8()?;
            settings.lock_flags = cursor.read_array::<20>()?;
        }
    }

    let (entries, width) = profile.block_table(container);
    let block_lengths = (0..entries)
        .map(|_| match width {
            LengthWidth::U16 => cursor.read_u16_le().map(u32::from),
            LengthWidth::U32 => cursor.read_u32_le(),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VarHeader {
        settings,
        block_lengths,
    })
}

/// Cheap signature check without decoding.
pub fn is_a2m_data(data: &[u8]) -> bool {
    data.starts_with(A2M_MAGIC) || data.starts_with(A2T_MAGIC)
}

//! Per-version format profile.
//!
//! Every size, count and layout that differs between format versions lives
//! here so the decoding stages never branch on raw version numbers.

use crate::depack::Compression;
use crate::error::{A2mError, Result};

use super::header::Container;
use super::macros::{DISABLED_FM_REGS_SIZE, INSTRUMENT_MACRO_SIZE, MACRO_TABLE_SIZE};
use super::songdata;

/// Entries in the order list.
pub const ORDER_SIZE: usize = 128;

/// Instrument slots that carry macros (version >= 9).
pub const MACRO_SLOTS: usize = 255;

/// Pattern storage family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Versions 1-4: 9 channels, 4-byte events, row-major patterns
    Classic,
    /// Versions 5-8: 18 channels, 4-byte events, channel-major patterns
    Opl3,
    /// Versions 9-11: 20 channels, 256 rows, 6-byte events
    Extended,
}

impl Family {
    /// Family of a format version.
    pub fn of(version: u8) -> Self {
        match version {
            0..=4 => Family::Classic,
            5..=8 => Family::Opl3,
            _ => Family::Extended,
        }
    }

    /// Patterns stored in one pattern-group block.
    pub const fn patterns_per_block(self) -> usize {
        match self {
            Family::Classic => 16,
            Family::Opl3 | Family::Extended => 8,
        }
    }

    /// Channels per pattern.
    pub const fn channels(self) -> usize {
        match self {
            Family::Classic => 9,
            Family::Opl3 => 18,
            Family::Extended => 20,
        }
    }

    /// Rows per pattern.
    pub const fn rows(self) -> usize {
        match self {
            Family::Classic | Family::Opl3 => 64,
            Family::Extended => 256,
        }
    }

    /// Stored bytes per event.
    pub const fn event_size(self) -> usize {
        match self {
            Family::Classic | Family::Opl3 => 4,
            Family::Extended => 6,
        }
    }

    /// Number of pattern-group blocks in a module.
    pub const fn pattern_groups(self) -> usize {
        match self {
            Family::Classic => 4,
            Family::Opl3 => 8,
            Family::Extended => 16,
        }
    }

    /// Depacked size of one pattern-group block.
    pub const fn group_size(self) -> usize {
        self.patterns_per_block() * self.channels() * self.rows() * self.event_size()
    }

    /// Total pattern slots across all groups.
    pub const fn pattern_slots(self) -> usize {
        self.patterns_per_block() * self.pattern_groups()
    }

    /// Byte offset of an event inside a depacked pattern-group block.
    ///
    /// Classic groups are stored pattern -> row -> channel, the others
    /// pattern -> channel -> row.
    pub const fn event_offset(self, pattern: usize, channel: usize, row: usize) -> usize {
        let cell = match self {
            Family::Classic => (pattern * self.rows() + row) * self.channels() + channel,
            Family::Opl3 | Family::Extended => {
                (pattern * self.channels() + channel) * self.rows() + row
            }
        };
        cell * self.event_size()
    }
}

/// Width of the entries of a block-length table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthWidth {
    /// 16-bit little-endian lengths
    U16,
    /// 32-bit little-endian lengths
    U32,
}

/// Role of one length-prefixed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// A2M song data (names, instruments, order, settings)
    SongData,
    /// A2T instrument records
    Instruments,
    /// A2T instrument register macros
    InstrumentMacros,
    /// A2T arpeggio/vibrato macro tables
    MacroTable,
    /// A2T disabled FM-register columns
    DisabledFmRegs,
    /// A2T order list
    Order,
    /// Pattern group with its index
    PatternGroup(usize),
}

/// Version-dependent decoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatProfile {
    /// Format version (1-11)
    pub version: u8,
    /// Pattern storage family
    pub family: Family,
    /// Block compression scheme
    pub compression: Compression,
}

impl FormatProfile {
    /// Placeholder profile for a version that failed validation.
    pub(crate) const FALLBACK: FormatProfile = FormatProfile {
        version: 11,
        family: Family::Extended,
        compression: Compression::Aplib,
    };

    /// Profile for a format version.
    ///
    /// Fails with [`A2mError::UnsupportedVersion`] outside 1-11.
    pub fn for_version(version: u8) -> Result<Self> {
        let compression =
            Compression::for_version(version).ok_or(A2mError::UnsupportedVersion(version))?;
        Ok(Self {
            version,
            family: Family::of(version),
            compression,
        })
    }

    /// Reject versions whose compression has no depacker (2, 3, 6, 7).
    pub fn ensure_decodable(&self) -> Result<()> {
        if self.compression.is_supported() {
            Ok(())
        } else {
            Err(A2mError::UnsupportedVersion(self.version))
        }
    }

    /// Number of instrument slots.
    pub fn instrument_count(&self) -> usize {
        if self.version < 9 {
            250
        } else {
            255
        }
    }

    /// Size of one stored instrument record.
    pub fn instrument_record_size(&self) -> usize {
        if self.version < 9 {
            13
        } else {
            14
        }
    }

    /// Size of one A2M instrument-name field.
    pub fn instrument_name_size(&self) -> usize {
        if self.version < 10 {
            33
        } else {
            43
        }
    }

    /// Whether byte 11 of an instrument record is a panning value.
    pub fn has_panning(&self) -> bool {
        self.version >= 5
    }

    /// Whether instrument records carry a trailing type byte.
    pub fn has_instrument_type(&self) -> bool {
        self.version >= 9
    }

    /// Whether the module stores instrument macros and macro tables.
    pub fn has_macros(&self) -> bool {
        self.version >= 9
    }

    /// Number and width of the block-length table entries.
    pub fn block_table(&self, container: Container) -> (usize, LengthWidth) {
        match (container, self.family) {
            (Container::A2m, Family::Classic) => (5, LengthWidth::U16),
            (Container::A2m, Family::Opl3) => (9, LengthWidth::U16),
            (Container::A2m, Family::Extended) => (17, LengthWidth::U32),
            (Container::A2t, Family::Classic) => (6, LengthWidth::U16),
            (Container::A2t, Family::Opl3) => (10, LengthWidth::U16),
            (Container::A2t, Family::Extended) if self.version < 11 => (20, LengthWidth::U32),
            (Container::A2t, Family::Extended) => (21, LengthWidth::U32),
        }
    }

    /// Block roles in file order.
    pub fn block_layout(&self, container: Container) -> Vec<BlockKind> {
        let mut layout = match container {
            Container::A2m => vec![BlockKind::SongData],
            Container::A2t => {
                let mut kinds = vec![BlockKind::Instruments];
                if self.has_macros() {
                    kinds.push(BlockKind::InstrumentMacros);
                    kinds.push(BlockKind::MacroTable);
                }
                if self.version == 11 {
                    kinds.push(BlockKind::DisabledFmRegs);
                }
                kinds.push(BlockKind::Order);
                kinds
            }
        };
        layout.extend((0..self.family.pattern_groups()).map(BlockKind::PatternGroup));
        layout
    }

    /// Depacked size of a block.
    pub fn block_target_size(&self, kind: BlockKind) -> usize {
        match kind {
            BlockKind::SongData => songdata::song_data_size(self),
            BlockKind::Instruments => self.instrument_count() * self.instrument_record_size(),
            BlockKind::InstrumentMacros => MACRO_SLOTS * INSTRUMENT_MACRO_SIZE,
            BlockKind::MacroTable => MACRO_SLOTS * MACRO_TABLE_SIZE,
            BlockKind::DisabledFmRegs => MACRO_SLOTS * DISABLED_FM_REGS_SIZE,
            BlockKind::Order => ORDER_SIZE,
            BlockKind::PatternGroup(_) => self.family.group_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_range() {
        assert!(matches!(
            FormatProfile::for_version(0),
            Err(A2mError::UnsupportedVersion(0))
        ));
        assert!(matches!(
            FormatProfile::for_version(12),
            Err(A2mError::UnsupportedVersion(12))
        ));
        for v in 1..=11 {
            assert!(FormatProfile::for_version(v).is_ok());
        }
    }

    #[test]
    fn test_decodable_versions() {
        for v in 1..=11u8 {
            let profile = FormatProfile::for_version(v).unwrap();
            let ok = profile.ensure_decodable().is_ok();
            assert_eq!(ok, !matches!(v, 2 | 3 | 6 | 7), "version {v}");
        }
    }

    #[test]
    fn test_family_geometry() {
        assert_eq!(Family::Classic.group_size(), 16 * 64 * 9 * 4);
        assert_eq!(Family::Opl3.group_size(), 8 * 18 * 64 * 4);
        assert_eq!(Family::Extended.group_size(), 8 * 20 * 256 * 6);
        assert_eq!(Family::Classic.pattern_slots(), 64);
        assert_eq!(Family::Opl3.pattern_slots(), 64);
        assert_eq!(Family::Extended.pattern_slots(), 128);
    }

    #[test]
    fn test_event_offsets() {
        assert_eq!(Family::Classic.event_offset(1, 2, 3), ((64 + 3) * 9 + 2) * 4);
        assert_eq!(Family::Opl3.event_offset(1, 2, 3), ((18 + 2) * 64 + 3) * 4);
        assert_eq!(Family::Extended.event_offset(1, 2, 3), ((20 + 2) * 256 + 3) * 6);
    }

    #[test]
    fn test_block_layouts_match_table_sizes() {
        for v in 1..=11u8 {
            let profile = FormatProfile::for_version(v).unwrap();
            for container in [Container::A2m, Container::A2t] {
                let (entries, _) = profile.block_table(container);
                assert_eq!(
                    profile.block_layout(container).len(),
                    entries,
                    "version {v} {container:?}"
                );
            }
        }
    }

    #[test]
    fn test_a2t_v11_layout() {
        let profile = FormatProfile::for_version(11).unwrap();
        let layout = profile.block_layout(Container::A2t);
        assert_eq!(
            &layout[..5],
            &[
                BlockKind::Instruments,
                BlockKind::InstrumentMacros,
                BlockKind::MacroTable,
                BlockKind::DisabledFmRegs,
                BlockKind::Order,
            ]
        );
        assert_eq!(layout[5], BlockKind::PatternGroup(0));
        assert_eq!(layout[20], BlockKind::PatternGroup(15));
    }

    #[test]
    fn test_instrument_sizes() {
        let v8 = FormatProfile::for_version(8).unwrap();
        let v9 = FormatProfile::for_version(9).unwrap();
        assert_eq!(v8.block_target_size(BlockKind::Instruments), 250 * 13);
        assert_eq!(v9.block_target_size(BlockKind::Instruments), 255 * 14);
    }
}

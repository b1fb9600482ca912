//! Decoded, version-independent song model.
//!
//! A [`Song`] is produced once by [`crate::load_song`] and never mutated
//! afterwards; every accessor is a read-only view.

use bitflags::bitflags;

use crate::a2m_parser::effects::Command;
use crate::a2m_parser::header::Container;
use crate::a2m_parser::instrument::Instrument;
use crate::a2m_parser::macros::{DisabledFmRegs, InstrumentMacro, MacroTable};
use crate::a2m_parser::profile::FormatProfile;

/// Number of entries in the pattern order list.
pub const ORDER_LEN: usize = 128;

/// Order list value marking an unused slot.
pub const ORDER_UNUSED: u8 = 128;

/// Canonical "no note" value (raw note byte 255 decodes to this).
pub const NOTE_EMPTY: u8 = 127;

bitflags! {
    /// Playback capabilities requested by the song.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlaybackFlags: u8 {
        /// Song targets the OPL3 (all versions >= 5)
        const OPL3 = 0x01;
        /// Deep tremolo (AM depth bit)
        const TREMOLO = 0x02;
        /// Deep vibrato (VIB depth bit)
        const VIBRATO = 0x04;
    }
}

impl PlaybackFlags {
    /// Derive flags from a format version and the song's common-flag byte.
    ///
    /// Bits 3 and 4 of the common flag only exist from version 5 onward.
    pub fn from_common_flag(version: u8, common_flag: u8) -> Self {
        let mut flags = PlaybackFlags::empty();
        if version >= 5 {
            flags |= PlaybackFlags::OPL3;
            if common_flag & 0x08 != 0 {
                flags |= PlaybackFlags::TREMOLO;
            }
            if common_flag & 0x10 != 0 {
                flags |= PlaybackFlags::VIBRATO;
            }
        }
        flags
    }
}

/// Global song settings stored in the variable header or song-data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongSettings {
    /// Raw common-flag byte (version >= 5)
    pub common_flag: u8,
    /// Rows per pattern as set in the tracker (version >= 9)
    pub pattern_length: u16,
    /// Number of tracks in use (version >= 9)
    pub track_count: u8,
    /// Macro speed-up factor (version >= 9)
    pub macro_speedup: u16,
    /// 4-operator channel flags (version >= 10)
    pub flag_4op: u8,
    /// Per-channel lock flags (version >= 10)
    pub lock_flags: [u8; 20],
}

impl Default for SongSettings {
    fn default() -> Self {
        Self {
            common_flag: 0,
            pattern_length: 64,
            track_count: 18,
            macro_speedup: 1,
            flag_4op: 0,
            lock_flags: [0; 20],
        }
    }
}

/// Effect bytes carried verbatim (no canonical mapping).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RawEffect {
    /// Raw effect id
    pub def: u8,
    /// Raw effect parameter byte
    pub param: u8,
}

/// One decoded cell of a track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Event {
    /// Note (0-127, [`NOTE_EMPTY`] = none)
    pub note: u8,
    /// Instrument index
    pub instrument: u8,
    /// Canonical command id (255 = no canonical equivalent)
    pub command: u8,
    /// First parameter
    pub param1: u8,
    /// Second parameter
    pub param2: u8,
    /// Second effect column of version 9-11 events, kept raw
    pub secondary: RawEffect,
}

impl Event {
    /// The canonical command, if its id has a name.
    pub fn command_kind(&self) -> Option<Command> {
        Command::from_id(self.command)
    }

    /// Whether the cell is still at its default value.
    pub fn is_empty(&self) -> bool {
        *self == Event::default()
    }
}

/// Flattened track/event grid.
///
/// Track `t` holds `rows` events; the track for a pattern and channel is
/// `pattern * channels + channel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackGrid {
    channels: usize,
    rows: usize,
    events: Vec<Event>,
}

impl TrackGrid {
    pub(crate) fn new(patterns: usize, channels: usize, rows: usize) -> Self {
        Self {
            channels,
            rows,
            events: vec![Event::default(); patterns * channels * rows],
        }
    }

    /// Channels per pattern.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Rows per track.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of tracks.
    pub fn track_count(&self) -> usize {
        if self.rows == 0 {
            0
        } else {
            self.events.len() / self.rows
        }
    }

    /// Number of pattern slots covered by the grid.
    pub fn pattern_count(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.track_count() / self.channels
        }
    }

    /// Events of one track, indexed by row.
    pub fn track(&self, index: usize) -> Option<&[Event]> {
        let start = index.checked_mul(self.rows)?;
        self.events.get(start..start + self.rows)
    }

    /// Event at a pattern/channel/row position.
    pub fn event(&self, pattern: usize, channel: usize, row: usize) -> Option<&Event> {
        if channel >= self.channels || row >= self.rows {
            return None;
        }
        self.track(pattern * self.channels + channel)?.get(row)
    }

    /// Iterate over all tracks in index order.
    pub fn tracks(&self) -> impl Iterator<Item = &[Event]> {
        self.events.chunks(self.rows.max(1))
    }

    pub(crate) fn set(&mut self, track: usize, row: usize, event: Event) {
        self.events[track * self.rows + row] = event;
    }
}

/// A fully decoded AdLib Tracker 2 module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub(crate) container: Container,
    pub(crate) version: u8,
    pub(crate) checksum: u32,
    pub(crate) pattern_count: u8,
    pub(crate) tempo: u8,
    pub(crate) speed: u8,
    pub(crate) order: [u8; ORDER_LEN],
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) flags: PlaybackFlags,
    pub(crate) settings: SongSettings,
    pub(crate) instruments: Vec<Instrument>,
    pub(crate) instrument_macros: Vec<InstrumentMacro>,
    pub(crate) macro_tables: Vec<MacroTable>,
    pub(crate) disabled_fm_regs: Vec<DisabledFmRegs>,
    pub(crate) pattern_names: Vec<String>,
    pub(crate) tracks: TrackGrid,
}

impl Song {
    /// Container flavour the song was read from.
    pub fn container(&self) -> Container {
        self.container
    }

    /// Format version (1-11).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Format profile for this song's version.
    pub fn profile(&self) -> FormatProfile {
        // The version was validated while decoding
        FormatProfile::for_version(self.version).unwrap_or(FormatProfile::FALLBACK)
    }

    /// Header checksum, stored as read (never verified).
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Pattern count declared in the header.
    pub fn pattern_count(&self) -> u8 {
        self.pattern_count
    }

    /// Initial tempo.
    pub fn tempo(&self) -> u8 {
        self.tempo
    }

    /// Initial speed.
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Raw pattern order list ([`ORDER_UNUSED`] marks empty slots).
    pub fn order(&self) -> &[u8; ORDER_LEN] {
        &self.order
    }

    /// Order entries that are not [`ORDER_UNUSED`].
    pub fn used_order(&self) -> impl Iterator<Item = u8> + '_ {
        self.order.iter().copied().filter(|&p| p != ORDER_UNUSED)
    }

    /// Song title (empty for A2T files).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Composer (empty for A2T files).
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Playback flags.
    pub fn flags(&self) -> PlaybackFlags {
        self.flags
    }

    /// Global settings from the header or song-data block.
    pub fn settings(&self) -> &SongSettings {
        &self.settings
    }

    /// Instrument table (250 entries up to version 8, 255 from version 9).
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Instrument register macros (version >= 9, otherwise empty).
    pub fn instrument_macros(&self) -> &[InstrumentMacro] {
        &self.instrument_macros
    }

    /// Arpeggio/vibrato macro tables (version >= 9, otherwise empty).
    pub fn macro_tables(&self) -> &[MacroTable] {
        &self.macro_tables
    }

    /// Disabled FM-register columns per instrument (version 11, otherwise empty).
    pub fn disabled_fm_regs(&self) -> &[DisabledFmRegs] {
        &self.disabled_fm_regs
    }

    /// Pattern names (version 11 A2M, otherwise empty).
    pub fn pattern_names(&self) -> &[String] {
        &self.pattern_names
    }

    /// Decoded track grid.
    pub fn tracks(&self) -> &TrackGrid {
        &self.tracks
    }

    /// Player refresh rate in Hz.
    ///
    /// A tempo of 18 stands for the PC timer's 18.2 Hz base rate.
    pub fn refresh_rate(&self) -> f32 {
        if self.tempo != 18 {
            self.tempo as f32
        } else {
            18.2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_only_from_version_5() {
        assert_eq!(
            PlaybackFlags::from_common_flag(4, 0xFF),
            PlaybackFlags::empty()
        );
        assert_eq!(PlaybackFlags::from_common_flag(5, 0), PlaybackFlags::OPL3);
        assert_eq!(
            PlaybackFlags::from_common_flag(9, 0x08),
            PlaybackFlags::OPL3 | PlaybackFlags::TREMOLO
        );
        assert_eq!(
            PlaybackFlags::from_common_flag(11, 0x18),
            PlaybackFlags::all()
        );
    }

    #[test]
    fn test_grid_geometry() {
        let mut grid = TrackGrid::new(2, 9, 64);
        assert_eq!(grid.track_count(), 18);
        assert_eq!(grid.pattern_count(), 2);

        let event = Event {
            note: 60,
            ..Event::default()
        };
        grid.set(9 + 3, 10, event);
        assert_eq!(grid.event(1, 3, 10), Some(&event));
        assert_eq!(grid.track(12).unwrap()[10], event);
        assert!(grid.event(1, 9, 0).is_none());
        assert!(grid.event(2, 0, 0).is_none());
        assert!(grid.event(0, 0, 64).is_none());
        assert_eq!(grid.tracks().count(), 18);
    }

    #[test]
    fn test_default_event_is_empty() {
        assert!(Event::default().is_empty());
        assert!(!Event {
            command: 8,
            ..Event::default()
        }
        .is_empty());
    }
}

//! Song metadata trait and serializable summary.

use serde::Serialize;

use crate::a2m_parser::header::Container;
use crate::song::{PlaybackFlags, Song};

/// Format-independent metadata view of a decoded song.
pub trait SongMetadata {
    /// Song title.
    fn title(&self) -> &str;

    /// Author/composer name.
    fn author(&self) -> &str;

    /// File format identifier.
    fn format(&self) -> &str {
        "AdLib Tracker 2"
    }

    /// Number of instrument slots.
    fn instrument_count(&self) -> usize;

    /// Name of instrument `index` (0-based), if the slot exists.
    fn instrument_name(&self, index: usize) -> Option<&str>;

    /// Player refresh rate in Hz.
    fn refresh_rate(&self) -> f32;
}

impl SongMetadata for Song {
    fn title(&self) -> &str {
        Song::title(self)
    }

    fn author(&self) -> &str {
        Song::author(self)
    }

    fn instrument_count(&self) -> usize {
        self.instruments().len()
    }

    fn instrument_name(&self, index: usize) -> Option<&str> {
        self.instruments().get(index).map(|i| i.name.as_str())
    }

    fn refresh_rate(&self) -> f32 {
        Song::refresh_rate(self)
    }
}

/// Flat summary of a song, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongSummary {
    /// Format identifier
    pub format: String,
    /// Container flavour
    pub container: Container,
    /// Format version
    pub version: u8,
    /// Song title
    pub title: String,
    /// Composer
    pub author: String,
    /// Initial tempo
    pub tempo: u8,
    /// Initial speed
    pub speed: u8,
    /// Refresh rate in Hz
    pub refresh_rate: f32,
    /// Declared pattern count
    pub pattern_count: u8,
    /// Used order entries
    pub order: Vec<u8>,
    /// Channels per pattern
    pub channels: usize,
    /// Rows per pattern
    pub rows: usize,
    /// Instrument slots
    pub instrument_count: usize,
    /// Instruments with non-zero registers
    pub used_instruments: usize,
    /// Song targets the OPL3
    pub opl3: bool,
    /// Deep tremolo requested
    pub tremolo: bool,
    /// Deep vibrato requested
    pub vibrato: bool,
}

impl SongSummary {
    /// Summarize a decoded song.
    pub fn from_song(song: &Song) -> Self {
        let flags = song.flags();
        Self {
            format: song.format().to_string(),
            container: song.container(),
            version: song.version(),
            title: song.title().to_string(),
            author: song.author().to_string(),
            tempo: song.tempo(),
            speed: song.speed(),
            refresh_rate: song.refresh_rate(),
            pattern_count: song.pattern_count(),
            order: song.used_order().collect(),
            channels: song.tracks().channels(),
            rows: song.tracks().rows(),
            instrument_count: song.instruments().len(),
            used_instruments: song.instruments().iter().filter(|i| !i.is_empty()).count(),
            opl3: flags.contains(PlaybackFlags::OPL3),
            tremolo: flags.contains(PlaybackFlags::TREMOLO),
            vibrato: flags.contains(PlaybackFlags::VIBRATO),
        }
    }
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        SongSummary::from_song(song)
    }
}

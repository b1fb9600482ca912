//! A2M song-data block.
//!
//! The first block of an A2M module holds everything except the patterns.
//! Fields are read in stored order; later versions only append or widen:
//!
//! ```text
//! title[43] author[43]                 Pascal strings
//! instrument names[N][33 | 43]         43 from version 10
//! instrument records[N][13 | 14]
//! instrument macros[255][3831]         version >= 9
//! macro tables[255][521]               version >= 9
//! order[128] tempo speed
//! common_flag                          version >= 5
//! patt_len(u16) nm_tracks macro_speedup(u16)   version >= 9
//! flag_4op lock_flags[20]              version >= 10
//! pattern_names[128][43]               version >= 10 (used for 11)
//! disabled FM regs[255][28]            version >= 10 (used for 11)
//! ```

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::song::{SongSettings, ORDER_LEN};

use super::instrument::{decode_instruments, Instrument};
use super::macros::{
    decode_disabled_fm_regs, decode_instrument_macros, decode_macro_tables, DisabledFmRegs,
    InstrumentMacro, MacroTable, DISABLED_FM_REGS_SIZE, INSTRUMENT_MACRO_SIZE, MACRO_TABLE_SIZE,
};
use super::profile::{FormatProfile, MACRO_SLOTS};

/// Title/author field size.
pub const TEXT_FIELD_SIZE: usize = 43;

/// Number of named pattern slots.
pub const PATTERN_NAME_COUNT: usize = 128;

/// Decoded A2M song-data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongData {
    /// Song title
    pub title: String,
    /// Composer
    pub author: String,
    /// Instrument table with names attached
    pub instruments: Vec<Instrument>,
    /// Register macros (version >= 9)
    pub instrument_macros: Vec<InstrumentMacro>,
    /// Arpeggio/vibrato tables (version >= 9)
    pub macro_tables: Vec<MacroTable>,
    /// Pattern order
    pub order: [u8; ORDER_LEN],
    /// Initial tempo
    pub tempo: u8,
    /// Initial speed
    pub speed: u8,
    /// Global settings
    pub settings: SongSettings,
    /// Pattern names (version 11)
    pub pattern_names: Vec<String>,
    /// Disabled FM-register columns (version 11)
    pub disabled_fm_regs: Vec<DisabledFmRegs>,
}

/// Depacked size of the song-data block for a version.
pub fn song_data_size(profile: &FormatProfile) -> usize {
    let count = profile.instrument_count();
    let mut size = 2 * TEXT_FIELD_SIZE
        + count * profile.instrument_name_size()
        + count * profile.instrument_record_size()
        + ORDER_LEN
        + 2;
    if profile.version >= 5 {
        size += 1;
    }
    if profile.version >= 9 {
        size += MACRO_SLOTS * (INSTRUMENT_MACRO_SIZE + MACRO_TABLE_SIZE) + 5;
    }
    if profile.version >= 10 {
        size += 1
            + 20
            + PATTERN_NAME_COUNT * TEXT_FIELD_SIZE
            + MACRO_SLOTS * DISABLED_FM_REGS_SIZE;
    }
    size
}

/// Decode a depacked song-data block.
pub fn decode_song_data(profile: &FormatProfile, bytes: &[u8]) -> Result<SongData> {
    let version = profile.version;
    let count = profile.instrument_count();
    let mut cursor = ByteCursor::new(bytes);

    let title = cursor.read_pascal_string(TEXT_FIELD_SIZE)?;
    let author = cursor.read_pascal_string(TEXT_FIELD_SIZE)?;
    let names = (0..count)
        .map(|_| cursor.read_pascal_string(profile.instrument_name_size()))
        .collect::<Result<Vec<_>>>()?;
    let records = cursor.read(count * profile.instrument_record_size())?;
    let instruments = decode_instruments(profile, records, &names)?;

    let (instrument_macros, macro_tables) = if profile.has_macros() {
        let macros = decode_instrument_macros(cursor.read(MACRO_SLOTS * INSTRUMENT_MACRO_SIZE)?)?;
        let tables = decode_macro_tables(cursor.read(MACRO_SLOTS * MACRO_TABLE_SIZE)?)?;
        (macros, tables)
    } else {
        (Vec::new(), Vec::new())
    };

    let order = cursor.read_array::<ORDER_LEN>()?;
    let tempo = cursor.read_u8()?;
    let speed = cursor.read_u8()?;

    let mut settings = SongSettings::default();
    if version >= 5 {
        settings.common_flag = cursor.read_u8()?;
    }
    if version >= 9 {
        settings.pattern_length = cursor.read_u16_le()?;
        settings.track_count = cursor.read_u8()?;
        settings.macro_speedup = cursor.read_u16_le()?;
    }
    if version >= 10 {
        settings.flag_4op = cursor.read_u8()?;
        settings.lock_flags = cursor.read_array::<20>()?;
    }

    let mut pattern_names = Vec::new();
    let mut disabled_fm_regs = Vec::new();
    if version == 11 {
        pattern_names = (0..PATTERN_NAME_COUNT)
            .map(|_| cursor.read_pascal_string(TEXT_FIELD_SIZE))
            .collect::<Result<Vec<_>>>()?;
        disabled_fm_regs =
            decode_disabled_fm_regs(cursor.read(MACRO_SLOTS * DISABLED_FM_REGS_SIZE)?)?;
    }

    Ok(SongData {
        title,
        author,
        instruments,
        instrument_macros,
        macro_tables,
        order,
        tempo,
        speed,
        settings,
        pattern_names,
        disabled_fm_regs,
    })
}

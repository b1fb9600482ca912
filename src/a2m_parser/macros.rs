//! Instrument macros and arpeggio/vibrato tables (format versions 9-11).
//!
//! Register macro (3831 bytes):
//! ```text
//! 0   length, loop_begin, loop_length, keyoff_pos, arpeggio_table, vibrato_table
//! 6   255 x step: fm_data[11], freq_slide (i16 LE), panning, duration
//! ```
//!
//! Macro table (521 bytes):
//! ```text
//! 0   arpeggio: length, speed, loop_begin, loop_length, keyoff_pos, data[255]
//! 260 vibrato:  length, speed, delay, loop_begin, loop_length, keyoff_pos, data[255] (i8)
//! ```
//!
//! Step and table data are kept only up to each record's `length`.

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::Result;

use super::profile::MACRO_SLOTS;

/// Stored size of one register macro.
pub const INSTRUMENT_MACRO_SIZE: usize = 6 + 255 * REGISTER_STEP_SIZE;

/// Stored size of one arpeggio + vibrato table pair.
pub const MACRO_TABLE_SIZE: usize = (5 + 255) + (6 + 255);

/// Stored size of one disabled FM-register column set.
pub const DISABLED_FM_REGS_SIZE: usize = 28;

const REGISTER_STEP_SIZE: usize = 15;
const TABLE_DATA_LEN: usize = 255;

/// One step of a register macro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegisterStep {
    /// Raw FM register bytes
    pub fm_data: [u8; 11],
    /// Frequency slide
    pub freq_slide: i16,
    /// Panning
    pub panning: u8,
    /// Step duration in frames
    pub duration: u8,
}

/// Register macro attached to an instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstrumentMacro {
    /// Number of used steps
    pub length: u8,
    /// Loop start
    pub loop_begin: u8,
    /// Loop length
    pub loop_length: u8,
    /// Key-off position
    pub keyoff_pos: u8,
    /// Linked arpeggio table
    pub arpeggio_table: u8,
    /// Linked vibrato table
    pub vibrato_table: u8,
    /// Used steps
    pub steps: Vec<RegisterStep>,
}

/// Arpeggio macro table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArpeggioTable {
    /// Number of used entries
    pub length: u8,
    /// Speed
    pub speed: u8,
    /// Loop start
    pub loop_begin: u8,
    /// Loop length
    pub loop_length: u8,
    /// Key-off position
    pub keyoff_pos: u8,
    /// Used note offsets
    pub data: Vec<u8>,
}

/// Vibrato macro table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VibratoTable {
    /// Number of used entries
    pub length: u8,
    /// Speed
    pub speed: u8,
    /// Delay before the table starts
    pub delay: u8,
    /// Loop start
    pub loop_begin: u8,
    /// Loop length
    pub loop_length: u8,
    /// Key-off position
    pub keyoff_pos: u8,
    /// Used pitch offsets
    pub data: Vec<i8>,
}

/// Arpeggio/vibrato pair stored per instrument slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MacroTable {
    /// Arpeggio table
    pub arpeggio: ArpeggioTable,
    /// Vibrato table
    pub vibrato: VibratoTable,
}

/// FM-register columns disabled in the editor for one instrument.
pub type DisabledFmRegs = [bool; DISABLED_FM_REGS_SIZE];

fn read_instrument_macro(cursor: &mut ByteCursor<'_>) -> Result<InstrumentMacro> {
    let length = cursor.read_u8()?;
    let loop_begin = cursor.read_u8()?;
    let loop_length = cursor.read_u8()?;
    let keyoff_pos = cursor.read_u8()?;
    let arpeggio_table = cursor.read_u8()?;
    let vibrato_table = cursor.read_u8()?;

    let mut steps = Vec::with_capacity(length as usize);
    for i in 0..TABLE_DATA_LEN {
        let step = RegisterStep {
            fm_data: cursor.read_array::<11>()?,
            freq_slide: cursor.read_i16_le()?,
            panning: cursor.read_u8()?,
            duration: cursor.read_u8()?,
        };
        if i < length as usize {
            steps.push(step);
        }
    }

    Ok(InstrumentMacro {
        length,
        loop_begin,
        loop_length,
        keyoff_pos,
        arpeggio_table,
        vibrato_table,
        steps,
    })
}

fn read_macro_table(cursor: &mut ByteCursor<'_>) -> Result<MacroTable> {
    let length = cursor.read_u8()?;
    let speed = cursor.read_u8()?;
    let loop_begin = cursor.read_u8()?;
    let loop_length = cursor.read_u8()?;
    let keyoff_pos = cursor.read_u8()?;
    let data = cursor.read(TABLE_DATA_LEN)?[..length as usize].to_vec();
    let arpeggio = ArpeggioTable {
        length,
        speed,
        loop_begin,
        loop_length,
        keyoff_pos,
        data,
    };

    let length = cursor.read_u8()?;
    let speed = cursor.read_u8()?;
    let delay = cursor.read_u8()?;
    let loop_begin = cursor.read_u8()?;
    let loop_length = cursor.read_u8()?;
    let keyoff_pos = cursor.read_u8()?;
    let data = cursor.read(TABLE_DATA_LEN)?[..length as usize]
        .iter()
        .map(|&b| b as i8)
        .collect();
    let vibrato = VibratoTable {
        length,
        speed,
        delay,
        loop_begin,
        loop_length,
        keyoff_pos,
        data,
    };

    Ok(MacroTable { arpeggio, vibrato })
}

/// Decode the 255 register macros of a module.
pub fn decode_instrument_macros(region: &[u8]) -> Result<Vec<InstrumentMacro>> {
    let mut cursor = ByteCursor::new(region);
    (0..MACRO_SLOTS)
        .map(|_| read_instrument_macro(&mut cursor))
        .collect()
}

/// Decode the 255 arpeggio/vibrato table pairs of a module.
pub fn decode_macro_tables(region: &[u8]) -> Result<Vec<MacroTable>> {
    let mut cursor = ByteCursor::new(region);
    (0..MACRO_SLOTS)
        .map(|_| read_macro_table(&mut cursor))
        .collect()
}

/// Decode the disabled FM-register columns (non-zero byte = disabled).
pub fn decode_disabled_fm_regs(region: &[u8]) -> Result<Vec<DisabledFmRegs>> {
    let mut cursor = ByteCursor::new(region);
    (0..MACRO_SLOTS)
        .map(|_| {
            let mut cols = [false; DISABLED_FM_REGS_SIZE];
            for (col, &b) in cols.iter_mut().zip(cursor.read(DISABLED_FM_REGS_SIZE)?) {
                *col = b != 0;
            }
            Ok(cols)
        })
        .collect()
}

//! Instrument records.
//!
//! Stored record (13 bytes up to version 8, 14 from version 9):
//! ```text
//! 0-1   modulator/carrier AM-VIB-EG-KSR-MULT
//! 2-3   modulator/carrier KSL-TL
//! 4-5   modulator/carrier AR-DR
//! 6-7   modulator/carrier SL-RR
//! 8-9   modulator/carrier waveform
//! 10    feedback/connection
//! 11    misc (v1-4) or panning (v5+)
//! 12    fine-tune slide
//! 13    voice type (v9+)
//! ```
//!
//! Canonical register order puts feedback/connection first:
//! `[10, 0, 1, 4, 5, 6, 7, 8, 9, 2, 3]`.

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::Result;

use super::profile::FormatProfile;

/// Stored byte index for each canonical register slot.
pub const REGISTER_ORDER: [usize; 11] = [10, 0, 1, 4, 5, 6, 7, 8, 9, 2, 3];

/// Both speakers enabled in the feedback/connection register.
const PAN_BOTH: u8 = 0x30;

/// Decoded instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Instrument {
    /// Instrument name (A2M only)
    pub name: String,
    /// OPL registers in canonical order
    pub data: [u8; 11],
    /// Raw misc byte (versions 1-4)
    pub misc: u8,
    /// Fine-tune slide
    pub slide: u8,
    /// Voice type byte (versions 9-11, otherwise 0)
    pub voice_type: u8,
}

impl Instrument {
    /// Whether every register is zero, ignoring the speaker bits.
    pub fn is_empty(&self) -> bool {
        self.data[0] & !PAN_BOTH == 0 && self.data[1..].iter().all(|&b| b == 0)
    }
}

/// Remap one stored record into an [`Instrument`].
pub(crate) fn decode_instrument(
    profile: &FormatProfile,
    record: &[u8],
    name: String,
) -> Instrument {
    let mut data = [0u8; 11];
    for (slot, &src) in data.iter_mut().zip(REGISTER_ORDER.iter()) {
        *slot = record[src];
    }

    let mut misc = 0;
    if profile.has_panning() {
        let pan = record[11];
        if pan != 0 {
            data[0] |= (pan & 3) << 4;
        } else {
            data[0] |= PAN_BOTH;
        }
    } else {
        misc = record[11];
    }

    Instrument {
        name,
        data,
        misc,
        slide: record[12],
        voice_type: if profile.has_instrument_type() {
            record[13]
        } else {
            0
        },
    }
}

/// Decode a full instrument table.
///
/// Names are paired by index; missing names become empty strings.
pub fn decode_instruments(
    profile: &FormatProfile,
    region: &[u8],
    names: &[String],
) -> Result<Vec<Instrument>> {
    let mut cursor = ByteCursor::new(region);
    let record_size = profile.instrument_record_size();

    (0..profile.instrument_count())
        .map(|i| {
            let record = cursor.read(record_size)?;
            let name = names.get(i).cloned().unwrap_or_default();
            let inst = decode_instrument(profile, record, name);
            if !inst.is_empty() {
                log::trace!("instrument {}: {:?} {:02X?}", i + 1, inst.name, inst.data);
            }
            Ok(inst)
        })
        .collect()
}

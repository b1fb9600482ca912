//! Pattern-group decoding into the track grid.
//!
//! Each depacked group holds `patterns_per_block` patterns. Event bytes are
//! `note, instrument, effect_def, effect` plus, for versions 9-11, a second
//! raw `effect_def, effect` pair.

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::song::{Event, RawEffect, TrackGrid, NOTE_EMPTY};

use super::effects::{remap_classic, remap_modern};
use super::profile::Family;

/// Stored note value for an empty cell.
const RAW_NOTE_EMPTY: u8 = 255;

/// Decodes pattern groups of one family into a [`TrackGrid`].
#[derive(Debug, Clone, Copy)]
pub struct PatternDecoder {
    family: Family,
}

impl PatternDecoder {
    /// Create a decoder for a pattern family.
    pub fn new(family: Family) -> Self {
        Self { family }
    }

    /// Empty grid sized for every pattern slot of the family.
    pub fn empty_grid(&self) -> TrackGrid {
        let f = self.family;
        TrackGrid::new(f.pattern_slots(), f.channels(), f.rows())
    }

    /// Decode one raw event.
    pub(crate) fn decode_event(&self, raw: &[u8]) -> Event {
        let fx = match self.family {
            Family::Classic => remap_classic(raw[2], raw[3]),
            Family::Opl3 | Family::Extended => remap_modern(raw[2], raw[3]),
        };
        let secondary = match self.family {
            Family::Extended => RawEffect {
                def: raw[4],
                param: raw[5],
            },
            _ => RawEffect::default(),
        };

        Event {
            note: if raw[0] == RAW_NOTE_EMPTY {
                NOTE_EMPTY
            } else {
                raw[0]
            },
            instrument: raw[1],
            command: fx.command,
            param1: fx.param1,
            param2: fx.param2,
            secondary,
        }
    }

    /// Decode depacked group `group` into `grid`.
    ///
    /// Pattern `p` of the group lands on tracks
    /// `(group * patterns_per_block + p) * channels + channel`.
    pub fn decode_group(&self, group: usize, block: &[u8], grid: &mut TrackGrid) -> Result<()> {
        let f = self.family;
        let cursor = ByteCursor::new(block);
        let ppb = f.patterns_per_block();

        for p in 0..ppb {
            for c in 0..f.channels() {
                let track = (group * ppb + p) * f.channels() + c;
                for r in 0..f.rows() {
                    let raw = cursor.peek_at(f.event_offset(p, c, r), f.event_size())?;
                    grid.set(track, r, self.decode_event(raw));
                }
            }
        }
        Ok(())
    }
}

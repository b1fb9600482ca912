//! Effect command remapping.
//!
//! Stored effect ids differ between format families. Decoding maps them onto
//! one canonical command set:
//! - versions 1-4 go through [`CONVFX`], with extended sub-commands rewritten
//!   via [`CONVINF1`]
//! - versions 5-11 go through [`NEWCONVFX`], with the `&` command (raw 36)
//!   split into the two pattern delay forms

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Command id used when a raw effect has no canonical equivalent.
pub const NO_COMMAND: u8 = 255;

/// Versions 1-4: raw effect id -> canonical command.
pub const CONVFX: [u8; 16] = [0, 1, 2, 23, 24, 3, 5, 4, 6, 9, 17, 13, 11, 19, 7, 14];

/// Versions 1-4: extended sub-command (high nibble) remap.
pub const CONVINF1: [u8; 16] = [0, 1, 2, 6, 7, 8, 9, 4, 5, 3, 10, 11, 12, 13, 14, 15];

/// Versions 5-11: raw effect id -> canonical command.
///
/// Raw ids past the end of the table have no canonical equivalent.
pub const NEWCONVFX: [u8; 37] = [
    0, 1, 2, 3, 4, 5, 6, 23, 24, 21, 10, 11, 17, 13, 7, 19, //
    255, 255, 22, 25, 255, 15, 255, 255, 255, 255, 255, //
    255, 255, 255, 255, 255, 255, 255, 255, 14, 255,
];

/// Raw id of the `&` command in versions 5-11.
pub const RAW_EXTENDED2: u8 = 36;

/// Canonical command ids that have a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum Command {
    /// Arpeggio
    Arpeggio = 0,
    /// Frequency slide up
    FrequencySlideUp = 1,
    /// Frequency slide down
    FrequencySlideDown = 2,
    /// Tone portamento
    TonePortamento = 3,
    /// Vibrato
    Vibrato = 4,
    /// Tone portamento + volume slide
    TonePortamentoVolumeSlide = 5,
    /// Vibrato + volume slide
    VibratoVolumeSlide = 6,
    /// Set tempo
    SetTempo = 7,
    /// Key off
    KeyOff = 8,
    /// Volume slide
    VolumeSlide = 10,
    /// Position jump
    PositionJump = 11,
    /// Pattern break
    PatternBreak = 13,
    /// Extended command (sub-command in `param1`)
    Extended = 14,
    /// Set instrument volume
    SetInstrumentVolume = 17,
    /// Set speed
    SetSpeed = 19,
    /// Set modulator volume
    SetModulatorVolume = 21,
    /// Set carrier volume
    SetCarrierVolume = 22,
    /// Fine frequency slide up
    FineSlideUp = 23,
    /// Fine frequency slide down
    FineSlideDown = 24,
    /// Set waveform
    SetWaveform = 25,
    /// Fine volume slide
    FineVolumeSlide = 26,
    /// Pattern delay in frames
    PatternDelay = 29,
}

impl Command {
    /// Look up a canonical command id.
    pub fn from_id(id: u8) -> Option<Self> {
        Command::from_u8(id)
    }

    /// Canonical id.
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Canonical command and parameters of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalEffect {
    /// Canonical command id
    pub command: u8,
    /// First parameter
    pub param1: u8,
    /// Second parameter
    pub param2: u8,
}

/// Remap an effect stored by versions 1-4.
///
/// `effect_def` values outside [`CONVFX`] map to [`NO_COMMAND`] with the
/// parameter nibbles passed through.
pub fn remap_classic(effect_def: u8, effect: u8) -> CanonicalEffect {
    let mut command = CONVFX.get(effect_def as usize).copied().unwrap_or(NO_COMMAND);
    let mut param2 = effect & 0x0F;
    let mut param1;

    if command != Command::Extended.id() {
        param1 = effect >> 4;
    } else {
        param1 = CONVINF1[(effect >> 4) as usize];
        if param1 == 15 && param2 == 0 {
            command = Command::KeyOff.id();
            param1 = 0;
            param2 = 0;
        }
    }

    if command == Command::Extended.id() {
        match param1 {
            // define waveform
            2 => {
                command = Command::SetWaveform.id();
                param1 = param2;
                param2 = 0x0F;
            }
            // fine volume slide up
            8 => {
                command = Command::FineVolumeSlide.id();
                param1 = param2;
                param2 = 0;
            }
            // fine volume slide down
            9 => {
                command = Command::FineVolumeSlide.id();
                param1 = 0;
            }
            _ => {}
        }
    }

    CanonicalEffect {
        command,
        param1,
        param2,
    }
}

/// Remap an effect stored by versions 5-11.
pub fn remap_modern(effect_def: u8, effect: u8) -> CanonicalEffect {
    let mut out = CanonicalEffect {
        command: NEWCONVFX
            .get(effect_def as usize)
            .copied()
            .unwrap_or(NO_COMMAND),
        param1: effect >> 4,
        param2: effect & 0x0F,
    };

    if effect_def == RAW_EXTENDED2 {
        match out.param1 {
            0 => {
                out.command = Command::PatternDelay.id();
                out.param1 = 0;
            }
            1 => {
                out.command = Command::Extended.id();
                out.param1 = 8;
            }
            _ => {}
        }
    }
    out
}

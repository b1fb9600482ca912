//! A2M/A2T Format Parsing
//!
//! Stateless decoders for each part of a module. [`crate::a2m_loader`]
//! drives them in file order.
//!
//! - [`header`]: container signature, fixed header, block-length table
//! - [`profile`]: per-version sizes and block layouts
//! - [`songdata`]: A2M song-data block
//! - [`instrument`]: instrument records and register remapping
//! - [`macros`]: register macros and arpeggio/vibrato tables (v9+)
//! - [`pattern`] / [`effects`]: pattern groups and effect remapping

pub mod effects;
pub mod header;
pub mod instrument;
pub mod macros;
pub mod pattern;
pub mod profile;
pub mod songdata;

pub use effects::{CanonicalEffect, Command};
pub use header::{Container, Header, VarHeader};
pub use instrument::Instrument;
pub use macros::{ArpeggioTable, InstrumentMacro, MacroTable, RegisterStep, VibratoTable};
pub use pattern::PatternDecoder;
pub use profile::{BlockKind, Family, FormatProfile};
pub use songdata::SongData;

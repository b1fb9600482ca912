//! AdLib Tracker 2 module decoder
//!
//! Decodes A2M and A2T modules written by AdLib Tracker 2 (format versions
//! 1-11) into one immutable, version-independent [`Song`]: instruments with
//! OPL registers in canonical order, a pattern order list, and a track grid
//! whose effect commands are remapped onto a single canonical command set.
//!
//! # Features
//! - Both containers: `_A2module_` (A2M) and `_A2tiny_module_` (A2T)
//! - Sixpack (versions 1 and 5), raw (4 and 8) and aPlib (9-11) depackers
//! - Instrument macros, arpeggio/vibrato tables, pattern names and disabled
//!   FM-register columns for the later versions
//! - Playback flags (OPL3, deep tremolo, deep vibrato) and refresh rate
//!
//! Versions 2, 3, 6 and 7 use LZW/LZSS compression and are rejected with
//! [`A2mError::UnsupportedVersion`].
//!
//! # Crate feature flags
//! - `cli` (default): the `a2m-info` command line tool
//!
//! # Quick start
//! ```no_run
//! use adtrack2::load_song;
//! let data = std::fs::read("song.a2m").unwrap();
//! let song = load_song(&data).unwrap();
//! println!("{} by {} (v{})", song.title(), song.author(), song.version());
//! println!("refresh: {} Hz", song.refresh_rate());
//! let first = song.tracks().event(0, 0, 0).unwrap();
//! println!("note {} command {}", first.note, first.command);
//! ```

#![warn(missing_docs)]

pub mod a2m_loader; // A2M/A2T File I/O
pub mod a2m_parser; // A2M/A2T Format Parsing
pub mod cursor;
pub mod depack; // Block Decompression
pub mod error;
pub mod metadata;
pub mod song; // Decoded Song Model

pub use a2m_loader::{load_file, load_song, A2mFileLoader, SongAssembler};
pub use a2m_parser::header::is_a2m_data;
pub use a2m_parser::{Command, Container, FormatProfile, Instrument};
pub use depack::Compression;
pub use error::{A2mError, Result};
pub use metadata::{SongMetadata, SongSummary};
pub use song::{Event, PlaybackFlags, RawEffect, Song, SongSettings, TrackGrid};

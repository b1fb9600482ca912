//! Module assembly
//!
//! Walks a module in file order: header, variable header, then each
//! length-prefixed block. Every block is depacked to its fixed target size
//! and handed to the matching decoder from [`crate::a2m_parser`].

use log::{debug, trace};

use crate::a2m_parser::header::{parse_header, parse_var_header, Header};
use crate::a2m_parser::instrument::decode_instruments;
use crate::a2m_parser::macros::{
    decode_disabled_fm_regs, decode_instrument_macros, decode_macro_tables,
};
use crate::a2m_parser::pattern::PatternDecoder;
use crate::a2m_parser::profile::{BlockKind, FormatProfile};
use crate::a2m_parser::songdata::decode_song_data;
use crate::cursor::ByteCursor;
use crate::depack::depack;
use crate::error::Result;
use crate::song::{PlaybackFlags, Song, SongSettings, TrackGrid, ORDER_LEN};

/// Builds a [`Song`] from an in-memory module.
pub struct SongAssembler<'a> {
    data: &'a [u8],
}

impl<'a> SongAssembler<'a> {
    /// Wrap a complete module buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Decode the module.
    pub fn assemble(&self) -> Result<Song> {
        let mut cursor = ByteCursor::new(self.data);
        let header = parse_header(&mut cursor)?;
        let profile = FormatProfile::for_version(header.version)?;
        profile.ensure_decodable()?;
        debug!(
            "{:?} v{} ({}), {} patterns, {} bytes",
            header.container,
            header.version,
            profile.compression,
            header.pattern_count,
            self.data.len()
        );

        let var = parse_var_header(&mut cursor, header.container, &profile)?;
        let decoder = PatternDecoder::new(profile.family);
        let mut song = empty_song(&header, var.settings, decoder.empty_grid());

        let layout = profile.block_layout(header.container);
        for (kind, &len) in layout.into_iter().zip(&var.block_lengths) {
            let len = len as usize;
            if len == 0 && matches!(kind, BlockKind::PatternGroup(_)) {
                trace!("{kind:?}: empty, skipped");
                continue;
            }

            let packed = cursor.read(len)?;
            let target = profile.block_target_size(kind);
            trace!("{kind:?}: {len} packed bytes -> {target}");
            let bytes = depack(profile.compression, packed, target)?;

            match kind {
                BlockKind::SongData => {
                    let data = decode_song_data(&profile, &bytes)?;
                    song.title = data.title;
                    song.author = data.author;
                    song.instruments = data.instruments;
                    song.instrument_macros = data.instrument_macros;
                    song.macro_tables = data.macro_tables;
                    song.order = data.order;
                    song.tempo = data.tempo;
                    song.speed = data.speed;
                    song.settings = data.settings;
                    song.pattern_names = data.pattern_names;
                    song.disabled_fm_regs = data.disabled_fm_regs;
                }
                BlockKind::Instruments => {
                    song.instruments = decode_instruments(&profile, &bytes, &[])?;
                }
                BlockKind::InstrumentMacros => {
                    song.instrument_macros = decode_instrument_macros(&bytes)?;
                }
                BlockKind::MacroTable => {
                    song.macro_tables = decode_macro_tables(&bytes)?;
                }
                BlockKind::DisabledFmRegs => {
                    song.disabled_fm_regs = decode_disabled_fm_regs(&bytes)?;
                }
                BlockKind::Order => {
                    song.order.copy_from_slice(ByteCursor::new(&bytes).read(ORDER_LEN)?);
                }
                BlockKind::PatternGroup(group) => {
                    decoder.decode_group(group, &bytes, &mut song.tracks)?;
                }
            }
        }

        song.flags =
            PlaybackFlags::from_common_flag(profile.version, song.settings.common_flag);
        debug!(
            "decoded \"{}\": tempo {}, speed {}, flags {:?}",
            song.title, song.tempo, song.speed, song.flags
        );
        Ok(song)
    }
}

fn empty_song(header: &Header, settings: SongSettings, tracks: TrackGrid) -> Song {
    Song {
        container: header.container,
        version: header.version,
        checksum: header.checksum,
        pattern_count: header.pattern_count,
        tempo: header.tempo,
        speed: header.speed,
        order: [0; ORDER_LEN],
        title: String::new(),
        author: String::new(),
        flags: PlaybackFlags::empty(),
        settings,
        instruments: Vec::new(),
        instrument_macros: Vec::new(),
        macro_tables: Vec::new(),
        disabled_fm_regs: Vec::new(),
        pattern_names: Vec::new(),
        tracks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2m_parser::header::A2M_MAGIC;
    use crate::a2m_parser::songdata::song_data_size;
    use crate::depack::sixpack::encoder::pack;
    use crate::error::A2mError;
    use crate::song::NOTE_EMPTY;

    /// A2M module whose blocks are sixpack-compressed (version 1 or 5).
    fn sixpack_module(version: u8, song_data: &[u8], groups: &[Vec<u8>]) -> Vec<u8> {
        let mut blocks = vec![pack(song_data)];
        blocks.extend(groups.iter().map(|g| pack(g)));

        let mut out = A2M_MAGIC.to_vec();
        out.extend_from_slice(&0u32.to_le_bytes());
        out.push(version);
        out.push(1);
        let entries = if version < 5 { 5 } else { 9 };
        for i in 0..entries {
            let len = blocks.get(i).map_or(0, |b| b.len());
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
        for block in &blocks {
            out.extend_from_slice(block);
        }
        out
    }

    fn song_data(version: u8, tempo: u8, speed: u8, common_flag: u8) -> Vec<u8> {
        let profile = FormatProfile::for_version(version).unwrap();
        let mut bytes = vec![0u8; song_data_size(&profile)];
        bytes[0] = 4;
        bytes[1..5].copy_from_slice(b"Demo");
        let order_at = 86 + 250 * 33 + 250 * 13;
        bytes[order_at + 1..order_at + ORDER_LEN].fill(0x80);
        bytes[order_at + ORDER_LEN] = tempo;
        bytes[order_at + ORDER_LEN + 1] = speed;
        if version >= 5 {
            bytes[order_at + ORDER_LEN + 2] = common_flag;
        }
        bytes
    }

    #[test]
    fn test_sixpack_v1_module() {
        let profile = FormatProfile::for_version(1).unwrap();
        let mut group = vec![0u8; profile.family.group_size()];
        // pattern 0, row 0, channel 0: note 49, instrument 1, extended key off
        group[..4].copy_from_slice(&[49, 1, 15, 0xF0]);
        // pattern 0, row 1, channel 0: empty note
        let at = profile.family.event_offset(0, 0, 1);
        group[at] = 255;

        let data = sixpack_module(1, &song_data(1, 70, 6, 0), &[group]);
        let song = SongAssembler::new(&data).assemble().unwrap();

        assert_eq!(song.version(), 1);
        assert_eq!(song.title(), "Demo");
        assert_eq!(song.tempo(), 70);
        assert_eq!(song.speed(), 6);
        assert_eq!(song.instruments().len(), 250);
        assert_eq!(song.flags(), PlaybackFlags::empty());
        assert_eq!(song.used_order().collect::<Vec<_>>(), vec![0]);

        let tracks = song.tracks();
        assert_eq!(tracks.channels(), 9);
        let first = tracks.event(0, 0, 0).unwrap();
        assert_eq!((first.note, first.instrument, first.command), (49, 1, 8));
        assert_eq!(tracks.event(0, 0, 1).unwrap().note, NOTE_EMPTY);
        // Groups 1-3 were absent
        assert!(tracks.event(16, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_sixpack_v5_flags_and_layout() {
        let profile = FormatProfile::for_version(5).unwrap();
        let mut group = vec![0u8; profile.family.group_size()];
        // pattern 1, channel 17, row 63: raw '&' with high nibble 0
        let at = profile.family.event_offset(1, 17, 63);
        group[at..at + 4].copy_from_slice(&[30, 2, 36, 0x04]);

        let data = sixpack_module(5, &song_data(5, 18, 3, 0x10), &[group]);
        let song = SongAssembler::new(&data).assemble().unwrap();

        assert_eq!(song.flags(), PlaybackFlags::OPL3 | PlaybackFlags::VIBRATO);
        assert_eq!(song.settings().common_flag, 0x10);
        assert!((song.refresh_rate() - 18.2).abs() < 1e-4);

        let event = song.tracks().event(1, 17, 63).unwrap();
        assert_eq!((event.command, event.param1, event.param2), (29, 0, 4));
        assert_eq!(song.tracks().track(18 + 17).unwrap()[63], *event);
    }

    #[test]
    fn test_block_past_end_is_truncated() {
        let mut data = sixpack_module(1, &song_data(1, 70, 6, 0), &[]);
        data.truncate(data.len() - 1);
        let err = SongAssembler::new(&data).assemble().unwrap_err();
        assert!(matches!(err, A2mError::Truncated { .. }));
    }

    #[test]
    fn test_lzw_version_rejected_before_blocks() {
        let mut data = A2M_MAGIC.to_vec();
        data.extend_from_slice(&[0, 0, 0, 0, 6, 1]);
        let err = SongAssembler::new(&data).assemble().unwrap_err();
        assert!(matches!(err, A2mError::UnsupportedVersion(6)));
    }
}

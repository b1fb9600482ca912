//! Fixture builders for A2M/A2T integration tests.
#![allow(dead_code)]

use adtrack2::a2m_parser::profile::{Family, FormatProfile};
use adtrack2::a2m_parser::songdata::song_data_size;

pub const A2M_MAGIC: &[u8] = b"_A2module_";
pub const A2T_MAGIC: &[u8] = b"_A2tiny_module_";

/// Bit writer with interleaved tag bytes, mirroring the aPlib reader.
#[derive(Default)]
struct AplibWriter {
    out: Vec<u8>,
    tag_pos: usize,
    bits_left: u8,
}

impl AplibWriter {
    fn bit(&mut self, bit: bool) {
        if self.bits_left == 0 {
            self.tag_pos = self.out.len();
            self.out.push(0);
            self.bits_left = 8;
        }
        self.bits_left -= 1;
        if bit {
            self.out[self.tag_pos] |= 1 << self.bits_left;
        }
    }

    fn byte(&mut self, b: u8) {
        self.out.push(b);
    }

    fn gamma(&mut self, value: usize) {
        assert!(value >= 2);
        let top = usize::BITS - 1 - value.leading_zeros();
        for i in (0..top).rev() {
            self.bit((value >> i) & 1 != 0);
            self.bit(i != 0);
        }
    }
}

/// Pack `data` as an aPlib stream using literals and offset-1 runs.
pub fn aplib_pack(data: &[u8]) -> Vec<u8> {
    let mut w = AplibWriter::default();
    let Some((&first, _)) = data.split_first() else {
        return Vec::new();
    };
    w.byte(first);

    let mut after_match = false;
    let mut i = 1;
    while i < data.len() {
        let prev = data[i - 1];
        let run = data[i..].iter().take_while(|&&b| b == prev).count();
        if run >= 4 {
            w.bit(true);
            w.bit(false);
            w.gamma(if after_match { 2 } else { 3 });
            w.byte(1);
            w.gamma(run - 2);
            after_match = true;
            i += run;
        } else {
            w.bit(false);
            w.byte(data[i]);
            after_match = false;
            i += 1;
        }
    }

    // short match with offset 0 ends the stream
    w.bit(true);
    w.bit(true);
    w.bit(false);
    w.byte(0);
    w.out
}

/// Compress a block the way the given version stores it.
pub fn pack(version: u8, data: &[u8]) -> Vec<u8> {
    match version {
        4 | 8 => data.to_vec(),
        9..=11 => aplib_pack(data),
        _ => panic!("no fixture packer for version {version}"),
    }
}

pub fn profile(version: u8) -> FormatProfile {
    FormatProfile::for_version(version).unwrap()
}

/// Zeroed A2M song-data block.
pub fn blank_song_data(version: u8) -> Vec<u8> {
    vec![0u8; song_data_size(&profile(version))]
}

pub fn put_pascal(buf: &mut [u8], at: usize, s: &str) {
    buf[at] = s.len() as u8;
    buf[at + 1..at + 1 + s.len()].copy_from_slice(s.as_bytes());
}

/// Offset of instrument name `i` in the song-data block.
pub fn name_offset(version: u8, i: usize) -> usize {
    86 + i * profile(version).instrument_name_size()
}

/// Offset of instrument record `i` in the song-data block.
pub fn record_offset(version: u8, i: usize) -> usize {
    let p = profile(version);
    86 + p.instrument_count() * p.instrument_name_size() + i * p.instrument_record_size()
}

/// Offset of the first instrument macro (versions 9-11).
pub fn macros_offset(version: u8) -> usize {
    record_offset(version, profile(version).instrument_count())
}

/// Offset of the order list in the song-data block.
pub fn order_offset(version: u8) -> usize {
    let mut at = macros_offset(version);
    if version >= 9 {
        at += 255 * (3831 + 521);
    }
    at
}

/// Offset of the pattern names (versions 10-11).
pub fn pattern_names_offset(version: u8) -> usize {
    order_offset(version) + 128 + 2 + 1 + 5 + 21
}

/// Write order, tempo, speed and (v5+) the common flag.
pub fn put_song_settings(
    buf: &mut [u8],
    version: u8,
    order: &[u8],
    tempo: u8,
    speed: u8,
    flag: u8,
) {
    let at = order_offset(version);
    buf[at..at + 128].fill(0x80);
    buf[at..at + order.len()].copy_from_slice(order);
    buf[at + 128] = tempo;
    buf[at + 129] = speed;
    if version >= 5 {
        buf[at + 130] = flag;
    }
}

pub fn family(version: u8) -> Family {
    profile(version).family
}

/// Zeroed depacked pattern group.
pub fn blank_group(version: u8) -> Vec<u8> {
    vec![0u8; family(version).group_size()]
}

/// Store raw event bytes in a depacked group.
pub fn put_event(
    version: u8,
    group: &mut [u8],
    pattern: usize,
    channel: usize,
    row: usize,
    raw: &[u8],
) {
    let f = family(version);
    assert_eq!(raw.len(), f.event_size());
    let at = f.event_offset(pattern, channel, row);
    group[at..at + raw.len()].copy_from_slice(raw);
}

fn push_lengths(out: &mut Vec<u8>, version: u8, lengths: &[usize]) {
    for &len in lengths {
        if version >= 9 {
            out.extend_from_slice(&(len as u32).to_le_bytes());
        } else {
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
    }
}

/// Assemble packed blocks into a module; `None` slots get length 0.
fn assemble(mut out: Vec<u8>, version: u8, blocks: &[Option<Vec<u8>>]) -> Vec<u8> {
    let lengths: Vec<usize> = blocks
        .iter()
        .map(|b| b.as_ref().map_or(0, |b| b.len()))
        .collect();
    push_lengths(&mut out, version, &lengths);
    for block in blocks.iter().flatten() {
        out.extend_from_slice(block);
    }
    out
}

/// Build an A2M module. `groups` holds `(index, depacked group)` pairs.
pub fn a2m_module(version: u8, song_data: &[u8], groups: &[(usize, Vec<u8>)]) -> Vec<u8> {
    let mut out = A2M_MAGIC.to_vec();
    out.extend_from_slice(&0x1234_5678u32.to_le_bytes());
    out.push(version);
    out.push(groups.len() as u8);

    let group_count = family(version).pattern_groups();
    let mut blocks = vec![Some(pack(version, song_data))];
    blocks.extend((0..group_count).map(|g| {
        groups
            .iter()
            .find(|(i, _)| *i == g)
            .map(|(_, data)| pack(version, data))
    }));
    assemble(out, version, &blocks)
}

/// Depacked non-pattern blocks of an A2T module.
pub struct A2tParts {
    pub instruments: Vec<u8>,
    pub macros: Vec<u8>,
    pub macro_tables: Vec<u8>,
    pub disabled_fm_regs: Vec<u8>,
    pub order: Vec<u8>,
}

impl A2tParts {
    pub fn blank(version: u8) -> Self {
        let p = profile(version);
        let mut order = vec![0x80u8; 128];
        order[0] = 0;
        Self {
            instruments: vec![0; p.instrument_count() * p.instrument_record_size()],
            macros: vec![0; 255 * 3831],
            macro_tables: vec![0; 255 * 521],
            disabled_fm_regs: vec![0; 255 * 28],
            order,
        }
    }
}

/// Build an A2T module. `var_settings` is the raw variable-header prefix
/// (everything before the block-length table).
pub fn a2t_module(
    version: u8,
    tempo: u8,
    speed: u8,
    var_settings: &[u8],
    parts: &A2tParts,
    groups: &[(usize, Vec<u8>)],
) -> Vec<u8> {
    let mut out = A2T_MAGIC.to_vec();
    out.extend_from_slice(&0xCAFE_F00Du32.to_le_bytes());
    out.push(version);
    out.push(groups.len() as u8);
    out.push(tempo);
    out.push(speed);
    out.extend_from_slice(var_settings);

    let mut blocks = vec![Some(pack(version, &parts.instruments))];
    if version >= 9 {
        blocks.push(Some(pack(version, &parts.macros)));
        blocks.push(Some(pack(version, &parts.macro_tables)));
    }
    if version == 11 {
        blocks.push(Some(pack(version, &parts.disabled_fm_regs)));
    }
    blocks.push(Some(pack(version, &parts.order)));

    let group_count = family(version).pattern_groups();
    blocks.extend((0..group_count).map(|g| {
        groups
            .iter()
            .find(|(i, _)| *i == g)
            .map(|(_, data)| pack(version, data))
    }));
    assemble(out, version, &blocks)
}

//! aPlib depacker (used by format versions 9-11).
//!
//! Decodes the raw, headerless aPlib stream: one literal byte, then a
//! sequence of tag-bit driven tokens:
//!
//! ```text
//! 0          literal byte
//! 1 0 <γ>    long match (gamma-coded high offset + offset byte + γ length)
//! 1 1 0 <b>  short match (7-bit offset, length 2-3); offset 0 ends the stream
//! 1 1 1 xxxx single byte from a 4-bit offset (0 writes a zero byte)
//! ```
//!
//! Tag bytes are interleaved with the data bytes in the order they are
//! needed, so all reads go through one cursor.

use crate::cursor::ByteCursor;
use crate::error::{A2mError, Result};

/// Depack an aPlib stream, producing at most `max_len` bytes.
pub fn depack(src: &[u8], max_len: usize) -> Result<Vec<u8>> {
    AplibState::new(src, max_len)
        .run()
        .map_err(|e| e.into_corrupt("aplib"))
}

struct AplibState<'a> {
    cursor: ByteCursor<'a>,
    out: Vec<u8>,
    max_len: usize,
    tag: u8,
    bitcount: u8,
}

impl<'a> AplibState<'a> {
    fn new(src: &'a [u8], max_len: usize) -> Self {
        Self {
            cursor: ByteCursor::new(src),
            out: Vec::with_capacity(max_len),
            max_len,
            tag: 0,
            bitcount: 0,
        }
    }

    fn run(mut self) -> Result<Vec<u8>> {
        let first = self.cursor.read_u8()?;
        self.put(first)?;

        // Last match offset, reused by the gamma-2 form
        let mut last_offset = 0usize;
        // Set after a match; changes how the long-match high offset is biased
        let mut after_match = false;

        loop {
            if !self.bit()? {
                let b = self.cursor.read_u8()?;
                self.put(b)?;
                after_match = false;
                continue;
            }

            if !self.bit()? {
                let high = self.gamma()?;
                if !after_match && high == 2 {
                    let len = self.gamma()?;
                    self.copy(last_offset, len)?;
                } else {
                    let bias = if after_match { 2 } else { 3 };
                    let high = high.checked_sub(bias).ok_or_else(|| {
                        A2mError::CorruptStream(format!("invalid match offset prefix {high}"))
                    })?;
                    let offset = (high << 8) + self.cursor.read_u8()? as usize;
                    let mut len = self.gamma()?;
                    if offset >= 32000 {
                        len += 1;
                    }
                    if offset >= 1280 {
                        len += 1;
                    }
                    if offset < 128 {
                        len += 2;
                    }
                    self.copy(offset, len)?;
                    last_offset = offset;
                }
                after_match = true;
            } else if !self.bit()? {
                let b = self.cursor.read_u8()? as usize;
                let offset = b >> 1;
                if offset == 0 {
                    return Ok(self.out);
                }
                self.copy(offset, 2 + (b & 1))?;
                last_offset = offset;
                after_match = true;
            } else {
                let mut offset = 0usize;
                for _ in 0..4 {
                    offset = (offset << 1) | self.bit()? as usize;
                }
                if offset == 0 {
                    self.put(0)?;
                } else {
                    self.copy(offset, 1)?;
                }
                after_match = false;
            }
        }
    }

    fn bit(&mut self) -> Result<bool> {
        if self.bitcount == 0 {
            self.tag = self.cursor.read_u8()?;
            self.bitcount = 8;
        }
        self.bitcount -= 1;
        let bit = self.tag & 0x80 != 0;
        self.tag <<= 1;
        Ok(bit)
    }

    fn gamma(&mut self) -> Result<usize> {
        let mut value = 1usize;
        loop {
            value = (value << 1) | self.bit()? as usize;
            if value > self.max_len.max(1) << 1 {
                return Err(A2mError::CorruptStream(
                    "gamma code exceeds output size".to_string(),
                ));
            }
            if !self.bit()? {
                return Ok(value);
            }
        }
    }

    fn put(&mut self, b: u8) -> Result<()> {
        if self.out.len() >= self.max_len {
            return Err(A2mError::SizeMismatch {
                expected: self.max_len,
                actual: self.out.len() + 1,
            });
        }
        self.out.push(b);
        Ok(())
    }

    fn copy(&mut self, offset: usize, len: usize) -> Result<()> {
        if offset == 0 || offset > self.out.len() {
            return Err(A2mError::CorruptStream(format!(
                "back-reference {offset} before start of output ({} bytes written)",
                self.out.len()
            )));
        }
        if self.out.len() + len > self.max_len {
            return Err(A2mError::SizeMismatch {
                expected: self.max_len,
                actual: self.out.len() + len,
            });
        }
        let start = self.out.len() - offset;
        for i in 0..len {
            let b = self.out[start + i];
            self.out.push(b);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_only() {
        // 'A', tag 00110000, 'B', 'C', end
        let out = depack(&[0x41, 0x30, 0x42, 0x43, 0x00], 16).unwrap();
        assert_eq!(out, b"ABC");
    }

    #[test]
    fn test_short_match_and_nibble_copy() {
        // 'A' lit 'B' | short match off 2 len 3 | nibble copy off 2 | end
        let src = [0x41, 0x6E, 0x42, 0x05, 0x58, 0x00];
        let out = depack(&src, 16).unwrap();
        assert_eq!(out, b"ABABAB");
    }

    #[test]
    fn test_long_match_run() {
        // tag 1010_1100: long match, γ=3 (high 0), offset byte 1, γ=6 (+2 -> len 8)
        // tag 1100_0000: end marker
        let src = [0x5A, 0xAC, 0x01, 0b1100_0000, 0x00];
        let out = depack(&src, 16).unwrap();
        assert_eq!(out, vec![0x5A; 9]);
    }

    #[test]
    fn test_back_reference_before_start() {
        // 'A', then nibble copy with offset 2 while only one byte exists
        let err = depack(&[0x41, 0xE4], 16).unwrap_err();
        assert!(matches!(err, A2mError::CorruptStream(_)));
    }

    #[test]
    fn test_missing_terminator() {
        let err = depack(&[0x41, 0x00, 0x42], 16).unwrap_err();
        assert!(matches!(err, A2mError::CorruptStream(_)));
    }

    #[test]
    fn test_overflow_is_size_mismatch() {
        let err = depack(&[0x41, 0x30, 0x42, 0x43, 0x00], 2).unwrap_err();
        assert!(matches!(err, A2mError::SizeMismatch { expected: 2, .. }));
    }
}

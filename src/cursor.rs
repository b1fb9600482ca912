//! Bounds-checked reader over an in-memory byte buffer.
//!
//! Every decoder stage reads its input through [`ByteCursor`], so a short
//! buffer always surfaces as [`A2mError::Truncated`] at one place instead of
//! an out-of-range slice index somewhere deeper in the pipeline.

use crate::error::{A2mError, Result};

/// Sequential and random-access reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume exactly `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_at(self.pos, n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Read `n` bytes at an absolute offset without moving the cursor.
    pub fn peek_at(&self, offset: usize, n: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(n).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => Ok(&self.data[offset..end]),
            None => Err(A2mError::Truncated {
                offset,
                needed: n,
                available: self.data.len().saturating_sub(offset),
            }),
        }
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read(n).map(|_| ())
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    /// Read one signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let b = self.read(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a little-endian `i16`.
    pub fn read_i16_le(&mut self) -> Result<i16> {
        Ok(self.read_u16_le()? as i16)
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let b = self.read(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    /// Read a Pascal string stored in a fixed `capacity`-byte field.
    ///
    /// The first byte holds the length; it is clamped to the field size so a
    /// corrupt length never reads past the field.
    pub fn read_pascal_string(&mut self, capacity: usize) -> Result<String> {
        let field = self.read(capacity)?;
        Ok(pascal_string(field))
    }
}

/// Decode a Pascal string from a fixed field (length byte + characters).
pub(crate) fn pascal_string(field: &[u8]) -> String {
    let Some((&len, body)) = field.split_first() else {
        return String::new();
    };
    let len = (len as usize).min(body.len());
    body[..len].iter().map(|&b| b as char).collect()
}

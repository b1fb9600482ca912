//! Sixpack depacker (used by format versions 1 and 5).
//!
//! Sixpack is an LZ77 scheme whose literals, copy lengths and terminator
//! share one adaptive Huffman tree. Copy distances are sent as plain bit
//! fields whose width depends on the copy range encoded in the symbol.
//!
//! The packed stream is a sequence of little-endian 16-bit words read
//! most-significant bit first.

use crate::cursor::ByteCursor;
use crate::error::{A2mError, Result};

const MAXFREQ: u16 = 2000;
const MINCOPY: usize = 3;
const MAXCOPY: usize = 255;
const COPYRANGES: usize = 6;
const CODESPERRANGE: usize = MAXCOPY - MINCOPY + 1;
const TERMINATE: usize = 256;
const FIRSTCODE: usize = 257;
const MAXCHAR: usize = FIRSTCODE + COPYRANGES * CODESPERRANGE - 1;
const SUCCMAX: usize = MAXCHAR + 1;
const TWICEMAX: usize = 2 * MAXCHAR + 1;
const ROOT: usize = 1;

const COPYBITS: [u32; COPYRANGES] = [4, 6, 8, 10, 12, 14];
const COPYMIN: [usize; COPYRANGES] = [0, 16, 80, 336, 1360, 5456];

/// Depack a sixpack stream, producing at most `max_len` bytes.
pub fn depack(src: &[u8], max_len: usize) -> Result<Vec<u8>> {
    let mut bits = WordBits::new(src);
    let mut model = HuffmanModel::new();
    let mut out = Vec::with_capacity(max_len);

    loop {
        let code = model.read_symbol(&mut bits)?;
        if code == TERMINATE {
            return Ok(out);
        }

        if code < 256 {
            if out.len() >= max_len {
                return Err(A2mError::SizeMismatch {
                    expected: max_len,
                    actual: out.len() + 1,
                });
            }
            out.push(code as u8);
            continue;
        }

        let t = code - FIRSTCODE;
        let range = t / CODESPERRANGE;
        let len = t + MINCOPY - range * CODESPERRANGE;
        let dist = bits.read_code(COPYBITS[range])? + len + COPYMIN[range];

        if dist > out.len() {
            return Err(A2mError::CorruptStream(format!(
                "sixpack: copy distance {dist} exceeds {} bytes of output",
                out.len()
            )));
        }
        if out.len() + len > max_len {
            return Err(A2mError::SizeMismatch {
                expected: max_len,
                actual: out.len() + len,
            });
        }

        let start = out.len() - dist;
        for i in 0..len {
            let b = out[start + i];
            out.push(b);
        }
    }
}

/// MSB-first bit reader over little-endian 16-bit words.
struct WordBits<'a> {
    cursor: ByteCursor<'a>,
    word: u16,
    count: u32,
}

impl<'a> WordBits<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(src),
            word: 0,
            count: 0,
        }
    }

    fn bit(&mut self) -> Result<bool> {
        if self.count == 0 {
            self.word = self
                .cursor
                .read_u16_le()
                .map_err(|e| e.into_corrupt("sixpack"))?;
            self.count = 16;
        }
        self.count -= 1;
        let bit = self.word & 0x8000 != 0;
        self.word <<= 1;
        Ok(bit)
    }

    /// Read a `bits`-wide field, least-significant bit first.
    fn read_code(&mut self, bits: u32) -> Result<usize> {
        let mut code = 0usize;
        for i in 0..bits {
            if self.bit()? {
                code |= 1 << i;
            }
        }
        Ok(code)
    }
}

/// Adaptive Huffman tree shared by the depacker and the test encoder.
///
/// Internal nodes are `1..=MAXCHAR`, leaves are `SUCCMAX..=TWICEMAX`
/// (symbol `s` lives at leaf `s + SUCCMAX`).
struct HuffmanModel {
    left: Vec<usize>,
    right: Vec<usize>,
    dad: Vec<usize>,
    freq: Vec<u16>,
}

impl HuffmanModel {
    fn new() -> Self {
        let mut model = Self {
            left: vec![0; MAXCHAR + 1],
            right: vec![0; MAXCHAR + 1],
            dad: vec![0; TWICEMAX + 1],
            freq: vec![0; TWICEMAX + 1],
        };
        for i in 2..=TWICEMAX {
            model.dad[i] = i / 2;
            model.freq[i] = 1;
        }
        for i in 1..=MAXCHAR {
            model.left[i] = 2 * i;
            model.right[i] = 2 * i + 1;
        }
        model
    }

    fn read_symbol(&mut self, bits: &mut WordBits<'_>) -> Result<usize> {
        let mut node = ROOT;
        while node <= MAXCHAR {
            node = if bits.bit()? {
                self.right[node]
            } else {
                self.left[node]
            };
        }
        let code = node - SUCCMAX;
        self.update_model(code);
        Ok(code)
    }

    fn sibling(&self, node: usize) -> usize {
        let parent = self.dad[node];
        if self.left[parent] == node {
            self.right[parent]
        } else {
            self.left[parent]
        }
    }

    fn update_freq(&mut self, mut a: usize, mut b: usize) {
        loop {
            let parent = self.dad[a];
            self.freq[parent] = self.freq[a] + self.freq[b];
            a = parent;
            if a == ROOT {
                break;
            }
            b = self.sibling(a);
        }

        if self.freq[ROOT] == MAXFREQ {
            for f in &mut self.freq[1..] {
                *f >>= 1;
            }
        }
    }

    fn update_model(&mut self, code: usize) {
        let mut a = code + SUCCMAX;
        self.freq[a] += 1;
        if self.dad[a] == ROOT {
            return;
        }

        let mut code1 = self.dad[a];
        let b = self.sibling(a);
        self.update_freq(a, b);

        loop {
            let code2 = self.dad[code1];
            let b = self.sibling(code1);

            if self.freq[a] > self.freq[b] {
                // Swap `a` with its parent's sibling `b`
                if self.left[code2] == code1 {
                    self.right[code2] = a;
                } else {
                    self.left[code2] = a;
                }

                let c = if self.left[code1] == a {
                    self.left[code1] = b;
                    self.right[code1]
                } else {
                    self.right[code1] = b;
                    self.left[code1]
                };

                self.dad[b] = code1;
                self.dad[a] = code2;
                self.update_freq(b, c);
                a = b;
            }

            a = self.dad[a];
            code1 = self.dad[a];
            if code1 == ROOT {
                break;
            }
        }
    }

    /// Path from the root to `code`'s leaf (`true` = right branch).
    #[cfg(test)]
    fn path(&self, code: usize) -> Vec<bool> {
        let mut node = code + SUCCMAX;
        let mut path = Vec::new();
        while node != ROOT {
            let parent = self.dad[node];
            path.push(self.right[parent] == node);
            node = parent;
        }
        path.reverse();
        path
    }
}


#[cfg(test)]
mod tests {
    use super::encoder::{encode_tokens, pack, Token};
    use super::*;

    #[test]
    fn test_literals_round_trip() {
        let text = b"AdLib Tracker 2";
        let packed = encode_tokens(&text.iter().map(|&b| Token::Literal(b)).collect::<Vec<_>>());
        assert_eq!(depack(&packed, 64).unwrap(), text);
    }

    #[test]
    fn test_copy_token() {
        // Distances count from the current position and never overlap the copy
        let tokens = [
            Token::Literal(b'a'),
            Token::Literal(b'b'),
            Token::Literal(b'c'),
            Token::Copy { len: 3, dist: 3 },
            Token::Copy { len: 3, dist: 6 },
        ];
        let packed = encode_tokens(&tokens);
        assert_eq!(depack(&packed, 64).unwrap(), b"abcabcabc");
    }

    #[test]
    fn test_pack_long_zero_runs() {
        let mut data = vec![0u8; 5000];
        data[0] = 7;
        data[4000] = 9;
        let packed = pack(&data);
        assert!(packed.len() < data.len() / 4);
        assert_eq!(depack(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_model_rescales_without_breaking() {
        // Enough symbols to push the root frequency past MAXFREQ
        let data: Vec<u8> = (0..6000u32).map(|i| (i * 7 % 251) as u8).collect();
        let packed = encode_tokens(&data.iter().map(|&b| Token::Literal(b)).collect::<Vec<_>>());
        assert_eq!(depack(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_truncated_stream_is_corrupt() {
        let packed = encode_tokens(&[Token::Literal(1), Token::Literal(2), Token::Literal(3)]);
        let err = depack(&packed[..packed.len() - 2], 64).unwrap_err();
        assert!(matches!(err, A2mError::CorruptStream(_)));
    }

    #[test]
    fn test_distance_before_start_is_corrupt() {
        let packed = encode_tokens(&[Token::Literal(1), Token::Copy { len: 3, dist: 20 }]);
        let err = depack(&packed, 64).unwrap_err();
        assert!(matches!(err, A2mError::CorruptStream(_)));
    }

    #[test]
    fn test_output_overflow() {
        let packed = encode_tokens(&[Token::Literal(1), Token::Literal(2)]);
        let err = depack(&packed, 1).unwrap_err();
        assert!(matches!(err, A2mError::SizeMismatch { expected: 1, .. }));
    }
}

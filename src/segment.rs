//! Data segments and the bit buffer they are packed into.

use crate::error::{Error, Result};
use crate::tables::Version;

/// A segment of data in a QR code.
///
/// A segment owns its packed bit data and is immutable after construction. Only byte mode
/// has a factory function; the other modes exist so the mode table stays complete and
/// [`QrSegment::new`] can carry caller-encoded payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrSegment {
    mode: QrSegmentMode,
    numchars: usize,
    data: Vec<u8>,
    bitlength: usize,
}

impl QrSegment {
    /// Creates a segment for binary data in byte mode.
    ///
    /// Each byte contributes 8 bits, most significant bit first.
    pub fn make_bytes(data: &[u8]) -> Self {
        Self {
            mode: QrSegmentMode::Byte,
            numchars: data.len(),
            data: data.to_vec(),
            bitlength: data.len() * 8,
        }
    }

    /// Returns the segments needed to encode the given text.
    ///
    /// Empty text yields no segments. Anything else becomes a single byte-mode segment over
    /// its UTF-8 encoding.
    pub fn make_segments(text: &str) -> Vec<Self> {
        if text.is_empty() {
            Vec::new()
        } else {
            vec![QrSegment::make_bytes(text.as_bytes())]
        }
    }

    /// Creates a segment from already-packed bits.
    ///
    /// `data` holds `bitlength` bits, most significant bit of each byte first. Fails if the
    /// buffer is too short for `bitlength` or carries whole unused trailing bytes.
    pub fn new(mode: QrSegmentMode, numchars: usize, data: Vec<u8>, bitlength: usize) -> Result<Self> {
        if data.len() != (bitlength + 7) / 8 {
            return Err(Error::InvalidBitLength {
                bitlength,
                buffer_len: data.len(),
            });
        }
        Ok(Self {
            mode,
            numchars,
            data,
            bitlength,
        })
    }

    pub fn mode(&self) -> QrSegmentMode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Returns the packed payload bytes. Only the first [`bit_len`](Self::bit_len) bits count.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        self.bitlength
    }

    /// Iterates over the payload bits in order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bitlength).map(move |i| get_bit(self.data[i >> 3].into(), 7 - (i as u8 & 7)))
    }

    /// Calculates the number of bits needed to encode the given segments at the given version.
    ///
    /// Returns `None` if a segment has too many characters to fit its length field, or the
    /// total bits would overflow `usize`.
    pub fn get_total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            if let Some(limit) = (1usize).checked_shl(ccbits.into()) {
                if seg.numchars >= limit {
                    return None;
                }
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.bitlength)?;
        }
        Some(result)
    }
}

/// Describes how a segment's data bits are interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum QrSegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
    Eci,
}

impl QrSegmentMode {
    /// Returns the 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        use QrSegmentMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
            Kanji => 0x8,
            Eci => 0x7,
        }
    }

    /// Returns the bit width of the character count field for a segment in this mode
    /// in a QR Code at the given version number. The result is in the range [0, 16].
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use QrSegmentMode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
            Kanji => [8, 10, 12],
            Eci => [0, 0, 0],
        })[usize::from((ver.value() + 7) / 17)]
    }
}

/// An appendable sequence of bits, packed most significant bit first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity((bits + 7) / 8),
            length: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, most significant first.
    ///
    /// Requires `len <= 31` and `val < 2^len`.
    pub fn append_bits(&mut self, val: u32, len: u8) -> Result<()> {
        if len > 31 || (val >> len) != 0 {
            return Err(Error::InvalidAppend { value: val, len });
        }
        for i in (0..len).rev() {
            self.push_bit(get_bit(val, i));
        }
        Ok(())
    }

    /// Appends every payload bit of the given segment.
    pub fn append_segment_bits(&mut self, seg: &QrSegment) {
        for bit in seg.bits() {
            self.push_bit(bit);
        }
    }

    fn push_bit(&mut self, bit: bool) {
        let shift: u8 = 7 - ((self.length as u8) & 7);
        if shift == 7 {
            self.data.push(0);
        }
        if let Some(last) = self.data.last_mut() {
            *last |= u8::from(bit) << shift;
        }
        self.length += 1;
    }

    /// Returns the packed bytes. The final byte is zero-padded if the length is not a
    /// multiple of 8.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

pub(crate) fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

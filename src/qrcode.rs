#![forbid(unsafe_code)]
//! QR code encoding functionality.
//!
//! This module holds the symbol encoder and the module grid builder: version and ECC level
//! selection, bitstream assembly, block splitting with Reed-Solomon interleaving, function
//! pattern drawing, the zig-zag codeword placement, and mask selection.

use tracing::{debug, trace};

use crate::error::{DataTooLong, Error, Result};
use crate::mask::{penalty_score, Mask};
use crate::reed_solomon::ReedSolomonGenerator;
use crate::segment::{get_bit, BitBuffer, QrSegment};
use crate::tables::{
    ecc_codewords_per_block, num_data_codewords, num_error_correction_blocks,
    num_raw_data_modules, QrCodeEcc, Version,
};

/// A QR Code symbol, representing a square grid of dark and light modules.
///
/// This struct covers QR Code Model 2, versions 1 to 40 and all four error correction levels.
/// Instances are immutable after creation; the mask is always resolved to a concrete pattern.
///
/// # Creation
///
/// - High-level: Use [`QrCode::encode`], [`QrCode::encode_text`] or [`QrCode::encode_binary`].
/// - Mid-level: Use [`QrCode::encode_segments`].
/// - Low-level: Directly construct with [`QrCode::encode_codewords`].
///
/// # Example
///
/// ```rust
/// use qrpath::{QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// println!("Version: {}", qr.version().value());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    version: Version,

    /// The width and height of this QR Code, measured in modules, between
    /// 21 and 177 (inclusive). This is equal to version * 4 + 17.
    size: usize,

    errorcorrectionlevel: QrCodeEcc,

    mask: Mask,

    /// The modules of this QR Code (false = light, true = dark), row-major.
    modules: Vec<bool>,
}

/// Parameters for [`QrCode::encode`].
///
/// The defaults search every version, start at [`QrCodeEcc::Medium`], pick the mask
/// automatically and boost the ECC level when it costs no extra version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub min_version: Version,
    pub max_version: Version,
    pub ecl: QrCodeEcc,
    /// `None` selects the mask with the lowest penalty score.
    pub mask: Option<Mask>,
    pub boost_ecl: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            min_version: Version::MIN,
            max_version: Version::MAX,
            ecl: QrCodeEcc::Medium,
            mask: None,
            boost_ecl: true,
        }
    }
}

impl EncodeOptions {
    pub fn with_ecl(mut self, ecl: QrCodeEcc) -> Self {
        self.ecl = ecl;
        self
    }

    pub fn with_version_range(mut self, min: Version, max: Version) -> Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    pub fn with_mask(mut self, mask: Option<Mask>) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_boost_ecl(mut self, boost: bool) -> Self {
        self.boost_ecl = boost;
        self
    }

    /// Checks that the version range is not inverted.
    pub fn validate(&self) -> Result<()> {
        if self.min_version > self.max_version {
            return Err(Error::InvalidVersionRange {
                min: self.min_version.value(),
                max: self.max_version.value(),
            });
        }
        Ok(())
    }
}

impl QrCode {
    /// Encodes a text string into a QR code with the given options.
    ///
    /// Empty text produces a valid symbol with no data segments. Otherwise the text is stored
    /// as a single byte-mode segment of its UTF-8 encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataTooLong`] if the text does not fit any version in the requested
    /// range, and [`Error::InvalidVersionRange`] if the range is inverted.
    pub fn encode(text: &str, options: &EncodeOptions) -> Result<Self> {
        let segs: Vec<QrSegment> = QrSegment::make_segments(text);
        QrCode::encode_segments(&segs, options)
    }

    /// Encodes text at the given ECC level with every other option left at its default.
    pub fn encode_text(text: &str, ecl: QrCodeEcc) -> Result<Self> {
        QrCode::encode(text, &EncodeOptions::default().with_ecl(ecl))
    }

    /// Encodes arbitrary bytes as a single byte-mode segment.
    pub fn encode_binary(data: &[u8], ecl: QrCodeEcc) -> Result<Self> {
        let segs: [QrSegment; 1] = [QrSegment::make_bytes(data)];
        QrCode::encode_segments(&segs, &EncodeOptions::default().with_ecl(ecl))
    }

    /// Encodes caller-built segments.
    pub fn encode_segments(segs: &[QrSegment], options: &EncodeOptions) -> Result<Self> {
        let (datacodewords, ecl, version) = QrCode::encode_segments_to_codewords(segs, options)?;
        QrCode::encode_codewords(version, ecl, &datacodewords, options.mask)
    }

    /// Returns the data codewords for the given segments, along with the chosen ECC level
    /// and version.
    ///
    /// The smallest possible QR Code version within the given range is automatically
    /// chosen for the output. If `boost_ecl` is set, the ECC level may be higher than the
    /// requested one if it can be done without increasing the version.
    pub fn encode_segments_to_codewords(
        segs: &[QrSegment],
        options: &EncodeOptions,
    ) -> Result<(Vec<u8>, QrCodeEcc, Version)> {
        options.validate()?;
        let mut ecl: QrCodeEcc = options.ecl;

        // Find the minimal version number to use
        let mut version: Version = options.min_version;
        let datausedbits: usize = loop {
            let datacapacitybits: usize = num_data_codewords(version, ecl) * 8;
            let dataused: Option<usize> = QrSegment::get_total_bits(segs, version);
            match dataused {
                Some(n) if n <= datacapacitybits => break n,
                _ if version >= options.max_version => {
                    return Err(Error::DataTooLong(match dataused {
                        None => DataTooLong::SegmentTooLong,
                        Some(n) => DataTooLong::DataOverCapacity(n, datacapacitybits),
                    }));
                }
                _ => {}
            }
            version = version.next().ok_or(DataTooLong::SegmentTooLong)?;
        };

        // Increase the error correction level while the data still fits in the current version
        if options.boost_ecl {
            for &newecl in &[QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High] {
                if datausedbits <= num_data_codewords(version, newecl) * 8 {
                    ecl = ecl.max(newecl);
                }
            }
        }

        // Concatenate all segments to create the data bit string
        let datacapacitybits: usize = num_data_codewords(version, ecl) * 8;
        let mut bb = BitBuffer::with_capacity(datacapacitybits);
        for seg in segs {
            let numchars = u32::try_from(seg.num_chars()).map_err(|_| DataTooLong::SegmentTooLong)?;
            bb.append_bits(seg.mode().mode_bits(), 4)?;
            bb.append_bits(numchars, seg.mode().num_char_count_bits(version))?;
            bb.append_segment_bits(seg);
        }
        assert_eq!(bb.len(), datausedbits);

        // Add terminator and pad up to a byte if applicable
        let numzerobits: usize = core::cmp::min(4, datacapacitybits - bb.len());
        bb.append_bits(0, numzerobits as u8)?;
        let numzerobits: usize = bb.len().wrapping_neg() & 7;
        bb.append_bits(0, numzerobits as u8)?;
        debug_assert_eq!(bb.len() % 8, 0);

        // Pad with alternating bytes until data capacity is reached
        for &padbyte in [0xec, 0x11].iter().cycle() {
            if bb.len() >= datacapacitybits {
                break;
            }
            bb.append_bits(padbyte, 8)?;
        }
        assert_eq!(bb.len(), datacapacitybits);

        debug!(
            version = version.value(),
            ecl = ?ecl,
            used_bits = datausedbits,
            capacity_bits = datacapacitybits,
            "selected symbol parameters"
        );
        Ok((bb.into_bytes(), ecl, version))
    }

    /// Creates a new QR Code with the given version number,
    /// error correction level, data codeword bytes, and mask number.
    ///
    /// This is a low-level API that most users should not use directly.
    /// A mid-level API is the `encode_segments()` function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCodewordCount`] if `datacodewords` is not exactly the data
    /// capacity of `version` at `ecl`.
    pub fn encode_codewords(
        version: Version,
        ecl: QrCodeEcc,
        datacodewords: &[u8],
        msk: Option<Mask>,
    ) -> Result<Self> {
        let expected = num_data_codewords(version, ecl);
        if datacodewords.len() != expected {
            return Err(Error::InvalidCodewordCount {
                expected,
                actual: datacodewords.len(),
            });
        }

        // Compute ECC, draw modules
        let mut grid = ModuleGrid::new(version);
        grid.draw_function_patterns(ecl);
        let allcodewords: Vec<u8> = add_ecc_and_interleave(datacodewords, version, ecl)?;
        grid.draw_codewords(&allcodewords);

        // Do masking
        let msk: Mask = match msk {
            Some(m) => m,
            None => grid.choose_mask(ecl),
        };
        grid.apply_mask(msk); // Apply the final choice of mask
        grid.draw_format_bits(ecl, msk); // Overwrite old format bits
        debug!(mask = msk.value(), "mask applied");

        // The function-module map is dropped with the grid
        Ok(Self {
            version,
            size: grid.size,
            errorcorrectionlevel: ecl,
            mask: msk,
            modules: grid.modules,
        })
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> i32 {
        self.size as i32
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.errorcorrectionlevel
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the QR
    /// code's bounds return `false`.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size();
        range.contains(&x) && range.contains(&y) && self.modules[(y as usize) * self.size + (x as usize)]
    }

    /// Returns all modules, row-major, `size * size` long.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Iterates over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.modules.chunks(self.size)
    }
}

/// Appends ECC codewords to each block of `data` and interleaves the blocks column-wise.
///
/// Returns `floor(raw_data_modules / 8)` codewords.
fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: QrCodeEcc) -> Result<Vec<u8>> {
    assert_eq!(data.len(), num_data_codewords(ver, ecl));
    let numblocks: usize = num_error_correction_blocks(ver, ecl);
    let blockecclen: usize = ecc_codewords_per_block(ver, ecl);
    let rawcodewords: usize = num_raw_data_modules(ver) / 8;
    let numshortblocks: usize = numblocks - (rawcodewords % numblocks);
    let shortblockdatalen: usize = rawcodewords / numblocks - blockecclen;
    let rs = ReedSolomonGenerator::new(blockecclen)?;

    let mut result = vec![0u8; rawcodewords];
    let mut dat: &[u8] = data;
    for i in 0..numblocks {
        let datlen: usize = shortblockdatalen + usize::from(i >= numshortblocks);
        let ecc: Vec<u8> = rs.compute_remainder(&dat[..datlen]);
        // Short blocks have no entry in the last data column
        let mut k: usize = i;
        for j in 0..datlen {
            if j == shortblockdatalen {
                k -= numshortblocks;
            }
            result[k] = dat[j];
            k += numblocks;
        }
        let mut k: usize = data.len() + i;
        for &b in &ecc {
            result[k] = b;
            k += numblocks;
        }
        dat = &dat[datlen..];
    }
    debug_assert_eq!(dat.len(), 0);
    Ok(result)
}

/// Returns the positions of the alignment patterns in ascending order. These positions are
/// used on both the x and y axes. Each value in the list is in the range [0, 177).
pub(crate) fn alignment_pattern_positions(ver: Version) -> Vec<i32> {
    let ver: i32 = i32::from(ver.value());
    if ver == 1 {
        return Vec::new();
    }
    let size: i32 = ver * 4 + 17;
    let numalign: i32 = ver / 7 + 2;
    let step: i32 = if ver == 32 {
        26
    } else {
        ((ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2
    };
    let mut result: Vec<i32> = (0..numalign - 1).map(|i| size - 7 - i * step).collect();
    result.push(6);
    result.reverse();
    result
}

/// The module grid under construction, with a parallel map of function modules.
///
/// Drawing goes: function patterns, codewords, mask, final format bits.
#[derive(Clone)]
struct ModuleGrid {
    version: Version,
    size: usize,
    modules: Vec<bool>,
    isfunction: Vec<bool>,
}

impl ModuleGrid {
    fn new(version: Version) -> Self {
        let size = version.size();
        Self {
            version,
            size,
            modules: vec![false; size * size], // Initially all light
            isfunction: vec![false; size * size],
        }
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y as usize) * self.size + (x as usize)
    }

    fn draw_function_patterns(&mut self, ecl: QrCodeEcc) {
        let size = self.size as i32;

        // Draw horizontal and vertical timing patterns
        for i in 0..size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }

        // Draw 3 finder patterns (all corners except bottom right; overwrites some timing modules)
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size - 4, 3);
        self.draw_finder_pattern(3, size - 4);

        // Draw numerous alignment patterns
        let alignpatpos: Vec<i32> = alignment_pattern_positions(self.version);
        let numalign: usize = alignpatpos.len();
        for (i, &pos0) in alignpatpos.iter().enumerate() {
            for (j, &pos1) in alignpatpos.iter().enumerate() {
                // Don't draw on the three finder corners
                if !((i == 0 && j == 0) || (i == 0 && j == numalign - 1) || (i == numalign - 1 && j == 0)) {
                    self.draw_alignment_pattern(pos0, pos1);
                }
            }
        }

        // Draw configuration data
        self.draw_format_bits(ecl, Mask::new(0)); // Dummy mask value; overwritten later
        self.draw_version();
    }

    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        let size = self.size as i32;
        for dy in -4..=4 {
            for dx in -4..=4 {
                let xx: i32 = x + dx;
                let yy: i32 = y + dy;
                if (0..size).contains(&xx) && (0..size).contains(&yy) {
                    let dist: i32 = dx.abs().max(dy.abs()); // Chebyshev/infinity norm
                    self.set_function_module(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.set_function_module(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    fn draw_format_bits(&mut self, ecl: QrCodeEcc, mask: Mask) {
        let bits: u32 = format_bits(ecl, mask);

        // Draw first copy
        for i in 0..6 {
            self.set_function_module(8, i, get_bit(bits, i as u8));
        }
        self.set_function_module(8, 7, get_bit(bits, 6));
        self.set_function_module(8, 8, get_bit(bits, 7));
        self.set_function_module(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, get_bit(bits, i as u8));
        }

        // Draw second copy
        let size = self.size as i32;
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, get_bit(bits, i as u8));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, get_bit(bits, i as u8));
        }
        self.set_function_module(8, size - 8, true); // Always dark
    }

    fn draw_version(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let bits: u32 = version_bits(self.version);
        let size = self.size as i32;
        for i in 0..18 {
            let bit: bool = get_bit(bits, i as u8);
            let a: i32 = size - 11 + i % 3;
            let b: i32 = i / 3;
            self.set_function_module(a, b, bit);
            self.set_function_module(b, a, bit);
        }
    }

    fn set_function_module(&mut self, x: i32, y: i32, isdark: bool) {
        let idx = self.index(x, y);
        self.modules[idx] = isdark;
        self.isfunction[idx] = true;
    }

    /// Draws the given sequence of 8-bit codewords (data and error correction) onto the
    /// entire data area of this QR Code. Function modules must be marked beforehand.
    fn draw_codewords(&mut self, data: &[u8]) {
        assert_eq!(data.len(), num_raw_data_modules(self.version) / 8, "Illegal argument");
        let size = self.size as i32;
        let mut i: usize = 0; // Bit index into the data
        // Do the funny zigzag scan
        let mut right: i32 = size - 1; // Index of right column in each column pair
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..size {
                for j in 0..2 {
                    let x: i32 = right - j;
                    let upward: bool = ((right + 1) & 2) == 0;
                    let y: i32 = if upward { size - 1 - vert } else { vert };
                    let idx = self.index(x, y);
                    if !self.isfunction[idx] && i < data.len() * 8 {
                        self.modules[idx] = get_bit(data[i >> 3].into(), 7 - ((i as u8) & 7));
                        i += 1;
                    }
                    // Remainder bits (0 to 7) stay light
                }
            }
            right -= 2;
        }
        debug_assert_eq!(i, data.len() * 8);
    }

    /// XORs the codeword modules with the given mask pattern. Calling this twice with the
    /// same mask restores the grid.
    fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let idx = y * self.size + x;
                self.modules[idx] ^= mask.inverts(x, y) && !self.isfunction[idx];
            }
        }
    }

    fn penalty_score(&self) -> i32 {
        penalty_score(&self.modules, self.size)
    }

    /// Returns the mask with the lowest penalty score, preferring the lower index on ties.
    /// Leaves the grid as it was found, apart from the format bits.
    #[cfg(not(feature = "parallel"))]
    fn choose_mask(&mut self, ecl: QrCodeEcc) -> Mask {
        let mut best: Mask = Mask::new(0);
        let mut minpenalty = i32::MAX;
        for i in Mask::ALL {
            self.apply_mask(i);
            self.draw_format_bits(ecl, i);
            let penalty: i32 = self.penalty_score();
            trace!(mask = i.value(), penalty, "mask candidate");
            if penalty < minpenalty {
                best = i;
                minpenalty = penalty;
            }
            self.apply_mask(i); // Undoes the mask due to XOR
        }
        best
    }

    /// Returns the mask with the lowest penalty score, preferring the lower index on ties.
    /// Every candidate is scored on its own copy of the grid.
    #[cfg(feature = "parallel")]
    fn choose_mask(&mut self, ecl: QrCodeEcc) -> Mask {
        use rayon::prelude::*;

        let grid: &ModuleGrid = self;
        let (_, best) = Mask::ALL
            .par_iter()
            .map(|&i| {
                let mut trial = grid.clone();
                trial.apply_mask(i);
                trial.draw_format_bits(ecl, i);
                let penalty: i32 = trial.penalty_score();
                trace!(mask = i.value(), penalty, "mask candidate");
                (penalty, i)
            })
            .min()
            .unwrap_or((0, Mask::new(0)));
        best
    }
}

/// Returns the 15-bit format information for the given ECC level and mask: 5 data bits,
/// a 10-bit BCH remainder, XORed with 0x5412.
pub(crate) fn format_bits(ecl: QrCodeEcc, mask: Mask) -> u32 {
    let data = u32::from((ecl.format_bits() << 3) | mask.value());
    let mut rem: u32 = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    let bits = ((data << 10) | rem) ^ 0x5412;
    debug_assert_eq!(bits >> 15, 0);
    bits
}

/// Returns the 18-bit version information: 6 version bits and a 12-bit BCH remainder.
pub(crate) fn version_bits(ver: Version) -> u32 {
    let data = u32::from(ver.value());
    let mut rem: u32 = data;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
    }
    let bits = (data << 12) | rem;
    debug_assert_eq!(bits >> 18, 0);
    bits
}

//! Version numbers, error correction levels, and the capacity tables indexed by them.

use crate::error::Error;

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40]. Use [`Version::try_from`] for
    /// untrusted input.
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the side length of a symbol of this version, in the range [21, 177].
    pub const fn size(self) -> usize {
        (self.0 as usize) * 4 + 17
    }

    /// Returns the next larger version, or `None` at [`Version::MAX`].
    pub(crate) fn next(self) -> Option<Version> {
        (self < Version::MAX).then(|| Version(self.0 + 1))
    }
}

impl TryFrom<i32> for Version {
    type Error = Error;

    fn try_from(ver: i32) -> Result<Self, Error> {
        match u8::try_from(ver) {
            Ok(v) if (Version::MIN.value()..=Version::MAX.value()).contains(&v) => Ok(Version(v)),
            _ => Err(Error::VersionOutOfRange(ver)),
        }
    }
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[default]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    /// Returns an unsigned 2-bit integer (in the range 0 to 3).
    pub(crate) fn ordinal(self) -> usize {
        use QrCodeEcc::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns the 2-bit value stored in the format information.
    pub(crate) fn format_bits(self) -> u8 {
        use QrCodeEcc::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }
}

/// Returns the number of data bits that can be stored in a QR Code of the given version,
/// after all function modules are excluded. This includes remainder bits, so it might not
/// be a multiple of 8. The result is in the range [208, 29648].
pub fn num_raw_data_modules(ver: Version) -> usize {
    let ver = usize::from(ver.value());
    let mut result: usize = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let numalign: usize = ver / 7 + 2;
        result -= (25 * numalign - 10) * numalign - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    debug_assert!((208..=29648).contains(&result));
    result
}

/// Returns the number of 8-bit data codewords (not ECC) contained in a QR Code of the
/// given version and error correction level, with remainder bits discarded.
pub fn num_data_codewords(ver: Version, ecl: QrCodeEcc) -> usize {
    num_raw_data_modules(ver) / 8
        - ecc_codewords_per_block(ver, ecl) * num_error_correction_blocks(ver, ecl)
}

/// Returns the number of ECC codewords appended to each block.
pub fn ecc_codewords_per_block(ver: Version, ecl: QrCodeEcc) -> usize {
    table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
}

/// Returns the number of blocks the codewords are split into.
pub fn num_error_correction_blocks(ver: Version, ecl: QrCodeEcc) -> usize {
    table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: QrCodeEcc) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

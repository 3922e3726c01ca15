//! Reed-Solomon error correction over GF(2^8/0x11D).

use crate::error::{Error, Result};

/// Computes Reed-Solomon ECC codewords for data blocks, all using the same divisor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReedSolomonGenerator {
    /// Coefficients of the divisor polynomial, highest power first, excluding the leading 1.
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Builds the generator for the given degree, which must be in the range [1, 255].
    pub fn new(degree: usize) -> Result<Self> {
        Ok(Self {
            divisor: compute_divisor(degree)?,
        })
    }

    /// Returns the number of ECC codewords produced per block.
    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Returns the divisor polynomial coefficients.
    pub fn divisor(&self) -> &[u8] {
        &self.divisor
    }

    /// Returns the ECC codewords for the given data block.
    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        compute_remainder(data, &self.divisor)
    }
}

/// Returns the Reed-Solomon divisor polynomial of the given degree, highest power first
/// with the leading `1` term omitted. The polynomial is the product of `(x - r^i)` for
/// `i` in `0..degree`, where `r = 0x02` generates the field.
pub fn compute_divisor(degree: usize) -> Result<Vec<u8>> {
    if !(1..=255).contains(&degree) {
        return Err(Error::DegreeOutOfRange(degree));
    }
    // Start with the monomial x^0
    let mut result = vec![0u8; degree];
    result[degree - 1] = 1;

    // Multiply by (x - r^i) for each i, dropping the highest term which is always 1
    let mut root: u8 = 1;
    for _ in 0..degree {
        for j in 0..degree {
            result[j] = multiply(result[j], root);
            if j + 1 < degree {
                result[j] ^= result[j + 1];
            }
        }
        root = multiply(root, 0x02);
    }
    Ok(result)
}

/// Returns the remainder of polynomial division of `data` by `divisor`.
pub fn compute_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; divisor.len()];
    for b in data {
        let factor: u8 = b ^ result[0];
        result.copy_within(1.., 0);
        if let Some(last) = result.last_mut() {
            *last = 0;
        }
        for (x, &y) in result.iter_mut().zip(divisor.iter()) {
            *x ^= multiply(y, factor);
        }
    }
    result
}

/// Returns the product of the two given field elements modulo GF(2^8/0x11D).
/// All inputs are valid; operands wider than 8 bits cannot be expressed.
pub fn multiply(x: u8, y: u8) -> u8 {
    // Russian peasant multiplication
    let mut z: u8 = 0;
    for i in (0..8).rev() {
        z = (z << 1) ^ ((z >> 7) * 0x1d);
        z ^= ((y >> i) & 1) * x;
    }
    z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply() {
        assert_eq!(multiply(0x00, 0x00), 0x00);
        assert_eq!(multiply(0x01, 0x01), 0x01);
        assert_eq!(multiply(0x02, 0x02), 0x04);
        assert_eq!(multiply(0x00, 0x6E), 0x00);
        assert_eq!(multiply(0xB2, 0xDD), 0xE6);
        assert_eq!(multiply(0x41, 0x11), 0x25);
        assert_eq!(multiply(0xB0, 0x1F), 0x11);
        assert_eq!(multiply(0x05, 0x75), 0xBC);
        assert_eq!(multiply(0x52, 0xB5), 0xAE);
        assert_eq!(multiply(0xA8, 0x20), 0xA4);
        assert_eq!(multiply(0x0E, 0x44), 0x9F);
        assert_eq!(multiply(0xD4, 0x13), 0xA0);
        assert_eq!(multiply(0x31, 0x10), 0x37);
        assert_eq!(multiply(0x6C, 0x58), 0xCB);
        assert_eq!(multiply(0xB6, 0x75), 0x3E);
        assert_eq!(multiply(0xFF, 0xFF), 0xE2);
    }

    #[test]
    fn test_multiply_commutes() {
        for x in (0..=255u8).step_by(7) {
            for y in (0..=255u8).step_by(11) {
                assert_eq!(multiply(x, y), multiply(y, x));
            }
        }
    }

    #[test]
    fn test_divisor_degree_range() {
        assert_eq!(compute_divisor(0), Err(Error::DegreeOutOfRange(0)));
        assert_eq!(compute_divisor(256), Err(Error::DegreeOutOfRange(256)));
        assert_eq!(compute_divisor(255).map(|d| d.len()), Ok(255));
    }

    #[test]
    fn test_divisor_small_degrees() {
        assert_eq!(compute_divisor(1), Ok(vec![0x01]));
        assert_eq!(compute_divisor(2), Ok(vec![0x03, 0x02]));
        assert_eq!(compute_divisor(5), Ok(vec![0x1F, 0xC6, 0x3F, 0x93, 0x74]));
    }

    #[test]
    fn test_remainder_of_zero_block() {
        let rs = ReedSolomonGenerator::new(10).unwrap();
        assert_eq!(rs.compute_remainder(&[0u8; 16]), vec![0u8; 10]);
    }

    #[test]
    fn test_remainder_version1_medium() {
        // "01234567" in numeric mode at 1-M, a widely published worked example.
        let data = [
            0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
            0xEC, 0x11,
        ];
        let rs = ReedSolomonGenerator::new(10).unwrap();
        assert_eq!(
            rs.compute_remainder(&data),
            vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]
        );
    }

    #[test]
    fn test_codeword_is_divisible() {
        // Appending the remainder yields a polynomial with zero remainder.
        let rs = ReedSolomonGenerator::new(7).unwrap();
        let data: Vec<u8> = (0u8..19).map(|i| i.wrapping_mul(37)).collect();
        let mut codeword = data.clone();
        codeword.extend(rs.compute_remainder(&data));
        assert_eq!(rs.compute_remainder(&codeword), vec![0u8; 7]);
    }
}

//! Data mask patterns and the penalty score used to choose between them.

use crate::error::Error;

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Mask(u8);

impl Mask {
    /// All eight mask patterns in index order.
    pub const ALL: [Mask; 8] = [Mask(0), Mask(1), Mask(2), Mask(3), Mask(4), Mask(5), Mask(6), Mask(7)];

    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Interprets a forced-mask argument where `-1` means automatic selection.
    pub fn from_forced(mask: i32) -> Result<Option<Self>, Error> {
        match mask {
            -1 => Ok(None),
            m => Mask::try_from(m).map(Some),
        }
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns whether the module at (x, y) is inverted by this mask.
    pub fn inverts(self, x: usize, y: usize) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => ((x * y) % 2) + ((x * y) % 3) == 0,
            6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
            7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

impl TryFrom<i32> for Mask {
    type Error = Error;

    fn try_from(mask: i32) -> Result<Self, Error> {
        match u8::try_from(mask) {
            Ok(m) if m <= 7 => Ok(Mask(m)),
            _ => Err(Error::MaskOutOfRange(mask)),
        }
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Upper bound of [`penalty_score`] over every legal symbol size.
pub const MAX_PENALTY: i32 = 2_568_888;

/// Calculates the penalty score of a row-major `size` x `size` module grid.
///
/// The score adds four terms: long same-colored runs (N1), 2x2 same-colored blocks (N2),
/// finder-like 1:1:3:1:1 patterns (N3), and dark/light imbalance (N4).
pub fn penalty_score(modules: &[bool], size: usize) -> i32 {
    assert_eq!(modules.len(), size * size);
    let get = |x: usize, y: usize| modules[y * size + x];
    let mut result: i32 = 0;

    // Adjacent modules in row having same color, and finder-like patterns
    for y in 0..size {
        result += line_penalty((0..size).map(|x| get(x, y)), size);
    }
    // Adjacent modules in column having same color, and finder-like patterns
    for x in 0..size {
        result += line_penalty((0..size).map(|y| get(x, y)), size);
    }

    // 2*2 blocks of modules having same color
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color: bool = get(x, y);
            if color == get(x + 1, y) && color == get(x, y + 1) && color == get(x + 1, y + 1) {
                result += PENALTY_N2;
            }
        }
    }

    // Balance of dark and light modules
    let dark = modules.iter().filter(|&&m| m).count() as i32;
    let total = (size * size) as i32;
    // Compute the smallest integer k >= 0 such that (45-5k)% <= dark/total <= (55+5k)%
    let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    debug_assert!((0..=9).contains(&k));
    result += k * PENALTY_N4;

    debug_assert!((0..=MAX_PENALTY).contains(&result));
    result
}

fn line_penalty(line: impl Iterator<Item = bool>, size: usize) -> i32 {
    let mut result: i32 = 0;
    let mut runcolor = false;
    let mut runlen: i32 = 0;
    let mut runhistory = FinderPenalty::new(size);
    for color in line {
        if color == runcolor {
            runlen += 1;
            if runlen == 5 {
                result += PENALTY_N1;
            } else if runlen > 5 {
                result += 1;
            }
        } else {
            runhistory.add_history(runlen);
            if !runcolor {
                result += runhistory.count_patterns() * PENALTY_N3;
            }
            runcolor = color;
            runlen = 1;
        }
    }
    result + runhistory.terminate_and_count(runcolor, runlen) * PENALTY_N3
}

/// Sliding history of the last seven run lengths in a row or column, used to detect
/// finder-like patterns. The line is treated as if bordered by light modules.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: usize) -> Self {
        Self {
            qr_size: size as i32,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size; // Add light border to initial run
        }
        let len: usize = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    // Can only be called immediately after a light run is added.
    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        debug_assert!(n <= self.qr_size * 3);
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n)
            + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    // Must be called at the end of a line (row or column) of modules.
    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            // Terminate dark run
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size; // Add light border to final run
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}

//! Sequential code reader for Huffman-coded ADC words.
//!
//! Reads the codes packed into one coded word, MSB-first from bit 14. A code
//! is a run of zero bits terminated by a one bit; the reader yields the
//! number of zeros. Padding zeros below the lowest set bit are ignored.

use crate::codebuffer::CODED_FLAG;

/// Iterator over the codes of a single coded word.
#[derive(Clone, Debug)]
pub struct CodeReader {
    /// Word payload (bit 15 cleared).
    payload: u16,
    /// Next bit to examine.
    bit_pos: i32,
    /// Position of the lowest set bit (end of the last code).
    lowest: i32,
}

impl CodeReader {
    /// Create a reader over one coded word.
    ///
    /// # Returns
    /// `None` if the word carries no code at all.
    pub fn new(word: i16) -> Option<Self> {
        #[allow(clippy::cast_sign_loss)]
        let payload = (word as u16) & !CODED_FLAG;
        if payload == 0 {
            return None;
        }

        #[allow(clippy::cast_possible_wrap)]
        let lowest = payload.trailing_zeros() as i32;
        Some(Self {
            payload,
            bit_pos: 14,
            lowest,
        })
    }

    /// Get current bit position (14 before the first code).
    #[inline]
    pub fn position(&self) -> i32 {
        self.bit_pos
    }

    /// Check if there are more codes to read.
    #[inline]
    pub fn has_codes(&self) -> bool {
        self.bit_pos >= self.lowest
    }

    #[inline]
    fn bit(&self, pos: i32) -> bool {
        (self.payload >> pos) & 1 == 1
    }
}

impl Iterator for CodeReader {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if !self.has_codes() {
            return None;
        }

        let mut zeros = 0u32;
        while !self.bit(self.bit_pos) && self.bit_pos > self.lowest {
            zeros += 1;
            self.bit_pos -= 1;
        }
        // skip the terminating one bit
        self.bit_pos -= 1;

        Some(zeros)
    }
}

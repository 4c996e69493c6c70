//! Word buffer for building Huffman-coded ADC output.
//!
//! Codes are packed MSB-first into 16-bit "coded" words. Bit 15 of a coded
//! word is always 1; the first code starts at bit 14.
//!
//! ## Word Kinds
//! - Coded word: bit 15 = 1, bits 14..0 = codes, zero-padded at the bottom
//! - Raw word: bit 15 = 0, bit 14 = sign, bits 13..0 = magnitude
//!
//! The first word of a stream is neither: it is the literal first sample.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

/// Bit 15: marks a coded word.
pub const CODED_FLAG: u16 = 0x8000;

/// Bit 14 of a raw word: the stored sample is negative.
pub const RAW_SIGN: u16 = 0x4000;

/// Magnitude field of a raw word.
pub const RAW_MAGNITUDE: u16 = 0x3FFF;

/// Payload bits available in one coded word.
pub const CODE_BITS: u32 = 15;

/// Build a raw word for `value`.
///
/// Returns the word and whether the magnitude had to be saturated.
pub fn raw_word(value: i16) -> (i16, bool) {
    let magnitude = value.unsigned_abs();
    let saturated = magnitude > RAW_MAGNITUDE;
    let mut word = magnitude.min(RAW_MAGNITUDE);
    if value < 0 {
        word |= RAW_SIGN;
    }
    (word as i16, saturated)
}

/// Recover the sample stored in a raw word.
#[inline]
pub fn raw_value(word: i16) -> i16 {
    let bits = word as u16;
    let magnitude = (bits & RAW_MAGNITUDE) as i16;
    if bits & RAW_SIGN != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Whether `word` is a coded word.
#[inline]
pub fn is_coded(word: i16) -> bool {
    (word as u16) & CODED_FLAG != 0
}

/// Growing buffer of Huffman output words.
///
/// Holds one in-progress coded word; `cursor` is the position of the last
/// bit written into it (15 when empty).
#[derive(Clone, Debug)]
pub struct CodeBuffer {
    /// Flushed words.
    words: Vec<i16>,
    /// In-progress coded word.
    current: u16,
    /// Lowest bit position used in `current`.
    cursor: u32,
}

impl Default for CodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a buffer expecting about `words` output words.
    pub fn with_capacity(words: usize) -> Self {
        Self {
            words: Vec::with_capacity(words),
            current: CODED_FLAG,
            cursor: CODE_BITS,
        }
    }

    /// Number of flushed words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if no word has been flushed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Payload bits still free in the in-progress word.
    #[inline]
    pub fn free_bits(&self) -> u32 {
        self.cursor
    }

    /// Append a word verbatim (the leading literal sample).
    pub fn push_literal(&mut self, value: i16) {
        self.words.push(value);
    }

    /// Append a code made of `zeros` zero bits followed by a one bit.
    ///
    /// Starts a fresh coded word when the current one cannot hold it.
    pub fn append_code(&mut self, zeros: u32) {
        let len = zeros + 1;
        debug_assert!(len <= CODE_BITS);

        if self.cursor < len {
            self.flush();
        }
        self.cursor -= len;
        self.current |= 1 << self.cursor;
    }

    /// Append a raw word, flushing the in-progress coded word first if it
    /// holds any code.
    ///
    /// # Returns
    /// The value a decoder reads back: `value` itself, or `value` clamped
    /// to the raw magnitude range.
    pub fn append_raw(&mut self, value: i16) -> i16 {
        if self.cursor < CODE_BITS {
            self.flush();
        }
        let (word, _) = raw_word(value);
        self.words.push(word);
        raw_value(word)
    }

    /// Flush the in-progress coded word, even if it carries no code.
    pub fn flush(&mut self) {
        self.words.push(self.current as i16);
        self.current = CODED_FLAG;
        self.cursor = CODE_BITS;
    }

    /// Flush the final word and return all words.
    pub fn finish(mut self) -> Vec<i16> {
        self.flush();
        self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let buf = CodeBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.free_bits(), 15);
    }

    #[test]
    fn test_single_code() {
        let mut buf = CodeBuffer::new();
        buf.append_code(2); // 001
        let words = buf.finish();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0] as u16, 0x8000 | 0x1000);
    }

    #[test]
    fn test_codes_pack_msb_first() {
        let mut buf = CodeBuffer::new();
        buf.append_code(0); // 1
        buf.append_code(1); // 01
        buf.append_code(0); // 1
        let words = buf.finish();
        // flag | 1 | 01 | 1 | padding
        assert_eq!(words[0] as u16, 0b1101_1000_0000_0000);
    }

    #[test]
    fn test_overflow_starts_new_word() {
        let mut buf = CodeBuffer::new();
        // 7 zeros + 1 = 8 bits, twice = 16 bits > 15
        buf.append_code(7);
        assert_eq!(buf.free_bits(), 7);
        buf.append_code(7);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.free_bits(), 7);
        let words = buf.finish();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0] as u16, 0x8000 | (1 << 7));
        assert_eq!(words[1] as u16, 0x8000 | (1 << 7));
    }

    #[test]
    fn test_exact_fill() {
        let mut buf = CodeBuffer::new();
        for _ in 0..15 {
            buf.append_code(0);
        }
        assert_eq!(buf.free_bits(), 0);
        assert_eq!(buf.len(), 0);
        let words = buf.finish();
        assert_eq!(words, vec![-1]);
    }

    #[test]
    fn test_raw_without_pending_codes() {
        let mut buf = CodeBuffer::new();
        buf.push_literal(100);
        assert_eq!(buf.append_raw(-25), -25);
        assert_eq!(buf.append_raw(700), 700);
        let words = buf.finish();
        // no empty coded word ahead of either raw word
        assert_eq!(words.len(), 4);
        assert_eq!(words[0], 100);
        assert_eq!(words[1] as u16, RAW_SIGN | 25);
        assert_eq!(words[2], 700);
        assert_eq!(words[3] as u16, CODED_FLAG);
    }

    #[test]
    fn test_raw_flushes_pending_codes() {
        let mut buf = CodeBuffer::new();
        buf.push_literal(100);
        buf.append_code(1); // 01
        assert_eq!(buf.append_raw(-25), -25);
        let words = buf.finish();
        assert_eq!(words.len(), 4);
        assert_eq!(words[1] as u16, CODED_FLAG | (1 << 13));
        assert_eq!(words[2] as u16, RAW_SIGN | 25);
        assert_eq!(words[3] as u16, CODED_FLAG);
    }

    #[test]
    fn test_raw_after_full_word() {
        let mut buf = CodeBuffer::new();
        for _ in 0..15 {
            buf.append_code(0);
        }
        buf.append_raw(9);
        assert_eq!(buf.finish(), vec![-1, 9, i16::MIN]);
    }

    #[test]
    fn test_append_raw_reports_clamped_value() {
        let mut buf = CodeBuffer::new();
        assert_eq!(buf.append_raw(16_384), 16_383);
        assert_eq!(buf.append_raw(i16::MIN), -16_383);
    }

    #[test]
    fn test_raw_word_round_trip() {
        for value in [0i16, 1, -1, 4095, -4095, 16383, -16383] {
            let (word, saturated) = raw_word(value);
            assert!(!saturated);
            assert!(!is_coded(word));
            assert_eq!(raw_value(word), value);
        }
    }

    #[test]
    fn test_raw_word_saturates() {
        let (word, saturated) = raw_word(20_000);
        assert!(saturated);
        assert_eq!(raw_value(word), 16383);

        let (word, saturated) = raw_word(i16::MIN);
        assert!(saturated);
        assert_eq!(raw_value(word), -16383);
    }
}

//! Zero suppression of ADC waveforms.
//!
//! Ticks whose magnitude exceeds a threshold are kept in contiguous blocks;
//! everything else is dropped and decodes to zero (or to the pedestal).
//!
//! ## Encoded Layout
//! All words are `i16`; header fields hold `u16` bit patterns.
//!
//! | words                         | content                         |
//! |-------------------------------|---------------------------------|
//! | `[0]`                         | uncompressed sample count `N`   |
//! | `[1]`                         | block count `B`                 |
//! | `[2 .. 2+B)`                  | first tick of each block        |
//! | `[2+B .. 2+2B)`               | tick count of each block        |
//! | `[2+2B ..)`                   | samples of all blocks, in order |
//!
//! ## Nearest Neighbours
//! With `nearest_neighbor = n > 0` a block starts up to `n` ticks before the
//! first tick above threshold and stays open for `n` quiet ticks after the
//! last one. A block starting at or before the end of the previous one is
//! merged into it.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::CodecError;
use crate::neighbors::NeighborRing;

/// Largest waveform whose length fits the header word.
pub const MAX_SAMPLES: usize = u16::MAX as usize;

/// Low ADC bits inspected by the sticky-code check.
pub const STICKY_CODE_MASK: u16 = 0x3F;

/// Distance from pedestal below which a sticky code is ignored.
pub const STICKY_CODE_WINDOW: i32 = 64;

/// Words before the block table.
const HEADER_WORDS: usize = 2;

/// Distance of an ADC value from the pedestal, ignoring sticky codes.
///
/// Some front-end ADCs get stuck with their six low bits all 0 or all 1.
/// With `sticky_code` set, such values within 64 counts of the pedestal are
/// treated as no signal and give 0.
pub fn adc_sticky_code_check(value: i16, pedestal: i16, sticky_code: bool) -> i32 {
    let distance = (i32::from(value) - i32::from(pedestal)).abs();
    if !sticky_code {
        return distance;
    }

    let low_bits = (value as u16) & STICKY_CODE_MASK;
    let stuck = low_bits == 0 || low_bits == STICKY_CODE_MASK;
    if stuck && distance < STICKY_CODE_WINDOW {
        0
    } else {
        distance
    }
}

/// Value compared against the threshold for one sample.
#[inline]
pub(crate) fn tick_value(sample: i16, pedestal: Option<i16>, sticky_code: bool) -> i32 {
    match pedestal {
        Some(pedestal) => adc_sticky_code_check(sample, pedestal, sticky_code),
        None => i32::from(sample).abs(),
    }
}

#[inline]
fn header_word(value: usize) -> i16 {
    value as u16 as i16
}

#[inline]
fn header_value(word: i16) -> usize {
    usize::from(word as u16)
}

/// A run of kept ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// First tick.
    pub begin: usize,
    /// Number of ticks.
    pub size: usize,
}

impl Block {
    /// One past the last tick.
    #[inline]
    pub fn end(&self) -> usize {
        self.begin + self.size
    }
}

/// Find the blocks of ticks to keep.
///
/// `test` gives the value of each tick that is compared against
/// `threshold`.
pub fn find_blocks(
    len: usize,
    threshold: u32,
    nearest_neighbor: usize,
    test: impl Fn(usize) -> i32,
) -> Vec<Block> {
    let threshold = i64::from(threshold);
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Option<Block> = None;
    let mut quiet = 0usize;

    for tick in 0..len {
        let above = i64::from(test(tick)) > threshold;

        if above {
            if current.is_none() {
                let start = tick.saturating_sub(nearest_neighbor);
                let reopen = blocks.last().map_or(false, |last| last.end() >= start);
                let begin = if reopen {
                    blocks.pop().map_or(start, |last| last.begin)
                } else {
                    start
                };
                current = Some(Block {
                    begin,
                    size: tick - begin,
                });
            }
            if let Some(block) = current.as_mut() {
                block.size += 1;
            }
            quiet = 0;
        } else if let Some(block) = current.as_mut() {
            if quiet < nearest_neighbor {
                block.size += 1;
                quiet += 1;
            } else {
                blocks.push(*block);
                current = None;
            }
        }
    }

    // a block still open at the end closes at the buffer end
    if let Some(block) = current {
        blocks.push(block);
    }

    blocks
}

/// Serialize the kept blocks of `adc` into the zero-suppressed layout.
fn encode_blocks(adc: &[i16], blocks: &[Block]) -> Vec<i16> {
    let payload: usize = blocks.iter().map(|b| b.size).sum();
    let mut encoded = Vec::with_capacity(HEADER_WORDS + 2 * blocks.len() + payload);

    encoded.push(header_word(adc.len()));
    encoded.push(header_word(blocks.len()));
    encoded.extend(blocks.iter().map(|b| header_word(b.begin)));
    encoded.extend(blocks.iter().map(|b| header_word(b.size)));
    for block in blocks {
        trace!(begin = block.begin, size = block.size, "zero-suppression block");
        encoded.extend_from_slice(&adc[block.begin..block.end()]);
    }

    encoded
}

/// Zero-suppression parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroSuppressionSettings {
    /// Ticks whose test value exceeds this are kept.
    pub threshold: u32,
    /// Ticks kept before and after each excursion.
    pub nearest_neighbor: usize,
    /// Pedestal subtracted before the threshold test.
    pub pedestal: Option<i16>,
    /// Ignore sticky ADC codes near the pedestal. Needs a pedestal.
    pub sticky_code: bool,
}

impl ZeroSuppressionSettings {
    /// Settings with a threshold and neighbour window, no pedestal.
    pub fn new(threshold: u32, nearest_neighbor: usize) -> Self {
        Self {
            threshold,
            nearest_neighbor,
            pedestal: None,
            sticky_code: false,
        }
    }

    /// Add a pedestal and the sticky-code policy.
    pub fn with_pedestal(mut self, pedestal: i16, sticky_code: bool) -> Self {
        self.pedestal = Some(pedestal);
        self.sticky_code = sticky_code;
        self
    }

    /// Zero-suppress `adc` in place.
    pub fn suppress(&self, adc: &mut Vec<i16>) -> Result<(), CodecError> {
        self.run(adc, None)
    }

    /// Zero-suppress `adc` in place, also keeping ticks where a buffered
    /// neighbour channel is above threshold.
    pub fn suppress_with_neighbors(
        &self,
        neighbors: &NeighborRing,
        adc: &mut Vec<i16>,
    ) -> Result<(), CodecError> {
        self.run(adc, Some(neighbors))
    }

    fn run(&self, adc: &mut Vec<i16>, neighbors: Option<&NeighborRing>) -> Result<(), CodecError> {
        let samples = adc.len();
        if samples > MAX_SAMPLES {
            return Err(CodecError::WaveformTooLong(samples));
        }

        let blocks = find_blocks(samples, self.threshold, self.nearest_neighbor, |tick| {
            let own = tick_value(adc[tick], self.pedestal, self.sticky_code);
            neighbors.map_or(own, |ring| {
                own.max(ring.max_abs_at(tick, self.pedestal, self.sticky_code))
            })
        });

        *adc = encode_blocks(adc, &blocks);

        debug!(
            samples,
            blocks = blocks.len(),
            words = adc.len(),
            threshold = self.threshold,
            "zero-suppressed waveform"
        );
        Ok(())
    }
}

/// Zero-suppress `adc` in place on `|sample| > threshold`.
pub fn zero_suppression(
    adc: &mut Vec<i16>,
    threshold: u32,
    nearest_neighbor: usize,
) -> Result<(), CodecError> {
    ZeroSuppressionSettings::new(threshold, nearest_neighbor).suppress(adc)
}

/// Zero-suppress `adc` in place on the pedestal-subtracted magnitude.
pub fn zero_suppression_with_pedestal(
    adc: &mut Vec<i16>,
    threshold: u32,
    pedestal: i16,
    nearest_neighbor: usize,
    sticky_code: bool,
) -> Result<(), CodecError> {
    ZeroSuppressionSettings::new(threshold, nearest_neighbor)
        .with_pedestal(pedestal, sticky_code)
        .suppress(adc)
}

/// Zero-suppress `adc` in place on the largest magnitude across this
/// channel and its buffered neighbours.
pub fn zero_suppression_with_neighbors(
    neighbors: &NeighborRing,
    adc: &mut Vec<i16>,
    threshold: u32,
    nearest_neighbor: usize,
) -> Result<(), CodecError> {
    ZeroSuppressionSettings::new(threshold, nearest_neighbor)
        .suppress_with_neighbors(neighbors, adc)
}

/// Neighbour-aware zero suppression on pedestal-subtracted magnitudes.
pub fn zero_suppression_with_neighbors_and_pedestal(
    neighbors: &NeighborRing,
    adc: &mut Vec<i16>,
    threshold: u32,
    pedestal: i16,
    nearest_neighbor: usize,
    sticky_code: bool,
) -> Result<(), CodecError> {
    ZeroSuppressionSettings::new(threshold, nearest_neighbor)
        .with_pedestal(pedestal, sticky_code)
        .suppress_with_neighbors(neighbors, adc)
}

/// Read-only view of a zero-suppressed waveform.
#[derive(Clone, Copy, Debug)]
pub struct ZeroSuppressedView<'a> {
    samples: usize,
    begins: &'a [i16],
    sizes: &'a [i16],
    payload: &'a [i16],
}

impl<'a> ZeroSuppressedView<'a> {
    /// Parse and validate the layout.
    pub fn parse(encoded: &'a [i16]) -> Result<Self, CodecError> {
        if encoded.len() < HEADER_WORDS {
            return Err(CodecError::MalformedBlocks(format!(
                "{} words, header needs {HEADER_WORDS}",
                encoded.len()
            )));
        }

        let samples = header_value(encoded[0]);
        let block_count = header_value(encoded[1]);
        let table_end = HEADER_WORDS + 2 * block_count;
        if encoded.len() < table_end {
            return Err(CodecError::MalformedBlocks(format!(
                "{block_count} blocks need {table_end} words, got {}",
                encoded.len()
            )));
        }

        let view = Self {
            samples,
            begins: &encoded[HEADER_WORDS..HEADER_WORDS + block_count],
            sizes: &encoded[HEADER_WORDS + block_count..table_end],
            payload: &encoded[table_end..],
        };

        let mut previous_end = 0usize;
        let mut total = 0usize;
        for (&begin, &size) in view.begins.iter().zip(view.sizes) {
            let begin = header_value(begin);
            let end = begin + header_value(size);
            if begin < previous_end || end > samples {
                return Err(CodecError::MalformedBlocks(format!(
                    "block [{begin}, {end}) overlaps or exceeds {samples} samples"
                )));
            }
            previous_end = end;
            total += end - begin;
        }
        if total != view.payload.len() {
            return Err(CodecError::MalformedBlocks(format!(
                "block sizes add up to {total}, payload has {} words",
                view.payload.len()
            )));
        }

        Ok(view)
    }

    /// Uncompressed sample count.
    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.begins.len()
    }

    /// Number of stored samples.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Iterate over `(first tick, samples)` of each block.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, &'a [i16])> + 'a {
        let payload = self.payload;
        self.begins
            .iter()
            .zip(self.sizes)
            .scan(0usize, move |offset, (&begin, &size)| {
                let start = *offset;
                *offset += header_value(size);
                Some((header_value(begin), &payload[start..*offset]))
            })
    }
}

/// Rebuild a zero-suppressed waveform, filling dropped ticks with 0.
pub fn zero_unsuppression(adc: &[i16], uncompressed: &mut [i16]) -> Result<(), CodecError> {
    zero_unsuppression_with_pedestal(adc, uncompressed, 0)
}

/// Rebuild a zero-suppressed waveform, filling dropped ticks with `pedestal`.
///
/// `uncompressed` must hold at least the stored sample count; every element
/// of it is overwritten.
pub fn zero_unsuppression_with_pedestal(
    adc: &[i16],
    uncompressed: &mut [i16],
    pedestal: i16,
) -> Result<(), CodecError> {
    let view = ZeroSuppressedView::parse(adc)?;
    if uncompressed.len() < view.samples() {
        return Err(CodecError::OutputTooShort {
            needed: view.samples(),
            actual: uncompressed.len(),
        });
    }

    uncompressed.fill(pedestal);
    for (begin, samples) in view.blocks() {
        uncompressed[begin..begin + samples.len()].copy_from_slice(samples);
    }

    Ok(())
}

/// Rebuild a zero-suppressed waveform into a new vector of the stored
/// length.
pub fn zero_unsuppression_to_vec(adc: &[i16], pedestal: i16) -> Result<Vec<i16>, CodecError> {
    let samples = ZeroSuppressedView::parse(adc)?.samples();
    let mut uncompressed = vec![pedestal; samples];
    zero_unsuppression_with_pedestal(adc, &mut uncompressed, pedestal)?;
    Ok(uncompressed)
}

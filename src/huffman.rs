//! Huffman run/delta coding of ADC waveforms.
//!
//! The first output word is the literal first sample. Every following
//! sample is coded by its difference from the previous one:
//!
//! | difference                     | code       |
//! |--------------------------------|------------|
//! | 0, and the next three are 0    | `1`        |
//! | 0                              | `01`       |
//! | +1                             | `001`      |
//! | -1                             | `0001`     |
//! | +2                             | `00001`    |
//! | -2                             | `000001`   |
//! | +3                             | `0000001`  |
//! | -3                             | `00000001` |
//! | anything else                  | raw word   |
//!
//! Codes are packed into coded words by [`CodeBuffer`]; a raw word holds
//! the sample itself as sign and 14-bit magnitude.

#![allow(clippy::cast_possible_truncation)]

use tracing::{debug, trace, warn};

use crate::codebuffer::{is_coded, raw_value, CodeBuffer};
use crate::codereader::CodeReader;

/// Zero count of the "four unchanged samples" code.
const FOUR_ZEROS: u32 = 0;

/// Sample differences indexed by code zero count minus one.
const DELTAS: [i16; 7] = [0, 1, -1, 2, -2, 3, -3];

/// Zero count of the code for a single difference, if it has one.
#[inline]
fn delta_code(diff: i16) -> Option<u32> {
    DELTAS
        .iter()
        .position(|&d| d == diff)
        .map(|index| index as u32 + 1)
}

/// Compress a waveform in place with the run/delta Huffman coder.
///
/// Differences are taken against the value a decoder reconstructs, with
/// wrapping 16-bit arithmetic to match the wrapping accumulation on decode.
///
/// Samples that need a raw word must fit its 14-bit magnitude. A raw
/// sample beyond +/-16383 is clamped to that bound and reported with a
/// warning; every other sample, including out-of-range samples reached by
/// a small difference, decodes exactly.
pub fn compress_huffman(adc: &mut Vec<i16>) {
    if adc.is_empty() {
        return;
    }

    let original = std::mem::take(adc);
    let samples = original.len();

    let mut output = CodeBuffer::with_capacity(samples);
    output.push_literal(original[0]);

    let mut last = original[0];
    let mut clamped = 0usize;
    let mut i = 1;
    while i < samples {
        if i + 3 < samples && original[i..i + 4].iter().all(|&s| s == last) {
            output.append_code(FOUR_ZEROS);
            i += 4;
            continue;
        }

        let sample = original[i];
        last = match delta_code(sample.wrapping_sub(last)) {
            Some(zeros) => {
                output.append_code(zeros);
                sample
            }
            None => {
                let stored = output.append_raw(sample);
                if stored != sample {
                    clamped += 1;
                }
                stored
            }
        };
        i += 1;
    }

    *adc = output.finish();

    if clamped > 0 {
        warn!(
            clamped,
            "ADC values beyond the raw word range were clamped during Huffman coding"
        );
    }
    debug!(samples, words = adc.len(), "huffman compressed waveform");
}

/// Walk a Huffman-coded stream, handing each decoded sample to `emit`.
///
/// Decoding stops as soon as `emit` returns `false`.
fn decode_stream(encoded: &[i16], mut emit: impl FnMut(i16) -> bool) {
    let Some((&first, rest)) = encoded.split_first() else {
        return;
    };

    let mut current = first;
    if !emit(current) {
        return;
    }

    for (offset, &word) in rest.iter().enumerate() {
        if !is_coded(word) {
            current = raw_value(word);
            if !emit(current) {
                return;
            }
            continue;
        }

        let Some(reader) = CodeReader::new(word) else {
            trace!(word = offset + 1, "skipping coded word without codes");
            continue;
        };

        for zeros in reader {
            if zeros == FOUR_ZEROS {
                for _ in 0..4 {
                    if !emit(current) {
                        return;
                    }
                }
                continue;
            }

            match DELTAS.get(zeros as usize - 1) {
                Some(&delta) => {
                    current = current.wrapping_add(delta);
                    if !emit(current) {
                        return;
                    }
                }
                None => warn!(word = offset + 1, zeros, "ignoring unknown Huffman code"),
            }
        }
    }
}

/// Decode a Huffman-coded waveform into `uncompressed`.
///
/// Decoding stops when the output is full or the input is exhausted. A code
/// of eight or more zeros cannot come from [`compress_huffman`]; it is
/// skipped with a warning, so the samples after it shift towards the start.
///
/// # Returns
/// Number of samples written.
pub fn uncompress_huffman(adc: &[i16], uncompressed: &mut [i16]) -> usize {
    let capacity = uncompressed.len();
    let mut written = 0usize;

    decode_stream(adc, |value| {
        if written < capacity {
            uncompressed[written] = value;
            written += 1;
        }
        written < capacity
    });

    written
}

/// Decode a complete Huffman-coded waveform into a new vector.
pub fn uncompress_huffman_to_vec(adc: &[i16]) -> Vec<i16> {
    let mut uncompressed = Vec::with_capacity(adc.len() * 2);
    decode_stream(adc, |value| {
        uncompressed.push(value);
        true
    });
    uncompressed
}

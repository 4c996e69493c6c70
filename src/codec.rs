//! Compression mode dispatch.
//!
//! Routes a waveform through the Huffman coder, the zero suppressor, or
//! both, according to a [`Compression`] mode:
//! - [`Compression::None`]: samples untouched
//! - [`Compression::Huffman`]: [`compress_huffman`]
//! - [`Compression::ZeroSuppression`]: zero suppression
//! - [`Compression::ZeroHuffman`]: zero suppression, then Huffman

use tracing::debug;

use crate::codebuffer::RAW_MAGNITUDE;
use crate::error::CodecError;
use crate::huffman::{compress_huffman, uncompress_huffman, uncompress_huffman_to_vec};
use crate::mode::Compression;
use crate::neighbors::NeighborRing;
use crate::zero_suppression::{zero_unsuppression_with_pedestal, ZeroSuppressionSettings};

/// Compress a waveform in place.
///
/// `settings` only matter for the zero-suppressed modes.
///
/// # Errors
/// `adc` is left untouched on error.
/// - [`CodecError::WaveformTooLong`] if a zero-suppressed mode is asked for
///   a waveform longer than 65535 ticks
/// - [`CodecError::HeaderOutOfRange`] if [`Compression::ZeroHuffman`]
///   would need a block count, begin or size above 16383, which a raw
///   Huffman word cannot hold
pub fn compress(
    adc: &mut Vec<i16>,
    compression: Compression,
    settings: &ZeroSuppressionSettings,
) -> Result<(), CodecError> {
    compress_impl(adc, compression, settings, None)
}

/// Compress a waveform in place, letting buffered neighbour channels keep
/// ticks during zero suppression.
///
/// # Errors
/// As [`compress`].
pub fn compress_with_neighbors(
    neighbors: &NeighborRing,
    adc: &mut Vec<i16>,
    compression: Compression,
    settings: &ZeroSuppressionSettings,
) -> Result<(), CodecError> {
    compress_impl(adc, compression, settings, Some(neighbors))
}

fn compress_impl(
    adc: &mut Vec<i16>,
    compression: Compression,
    settings: &ZeroSuppressionSettings,
    neighbors: Option<&NeighborRing>,
) -> Result<(), CodecError> {
    let samples = adc.len();

    if compression == Compression::ZeroHuffman {
        let mut suppressed = adc.clone();
        match neighbors {
            Some(ring) => settings.suppress_with_neighbors(ring, &mut suppressed)?,
            None => settings.suppress(&mut suppressed)?,
        }
        check_raw_header(&suppressed)?;
        *adc = suppressed;
    } else if compression.is_zero_suppressed() {
        match neighbors {
            Some(ring) => settings.suppress_with_neighbors(ring, adc)?,
            None => settings.suppress(adc)?,
        }
    }
    if matches!(compression, Compression::Huffman | Compression::ZeroHuffman) {
        compress_huffman(adc);
    }

    debug!(%compression, samples, words = adc.len(), "compressed waveform");
    Ok(())
}

/// Check that the block count and the begin/size tables of a suppressed
/// layout fit raw Huffman words. The sample count is the literal first word
/// and needs no check.
#[allow(clippy::cast_sign_loss)]
fn check_raw_header(suppressed: &[i16]) -> Result<(), CodecError> {
    let Some(&count) = suppressed.get(1) else {
        return Ok(());
    };
    let header = suppressed.len().min(2 + 2 * (count as u16 as usize));

    let words = &suppressed[1..header];
    match words.iter().position(|&word| word as u16 > RAW_MAGNITUDE) {
        Some(offset) => Err(CodecError::HeaderOutOfRange {
            index: offset + 1,
            value: words[offset] as u16,
        }),
        None => Ok(()),
    }
}

/// Decode a waveform into `uncompressed`, which must be sized to the
/// original sample count.
///
/// Dropped zero-suppressed ticks decode to 0.
pub fn uncompress(
    adc: &[i16],
    uncompressed: &mut [i16],
    compression: Compression,
) -> Result<(), CodecError> {
    uncompress_with_pedestal(adc, uncompressed, 0, compression)
}

/// Decode a waveform into `uncompressed`, filling dropped zero-suppressed
/// ticks with `pedestal`.
pub fn uncompress_with_pedestal(
    adc: &[i16],
    uncompressed: &mut [i16],
    pedestal: i16,
    compression: Compression,
) -> Result<(), CodecError> {
    match compression {
        Compression::None => {
            if uncompressed.len() < adc.len() {
                return Err(CodecError::OutputTooShort {
                    needed: adc.len(),
                    actual: uncompressed.len(),
                });
            }
            uncompressed[..adc.len()].copy_from_slice(adc);
        }
        Compression::Huffman => {
            uncompress_huffman(adc, uncompressed);
        }
        Compression::ZeroSuppression => {
            zero_unsuppression_with_pedestal(adc, uncompressed, pedestal)?;
        }
        Compression::ZeroHuffman => {
            let suppressed = uncompress_huffman_to_vec(adc);
            zero_unsuppression_with_pedestal(&suppressed, uncompressed, pedestal)?;
        }
    }
    Ok(())
}

/// Decode a waveform whose mode is a stored discriminant.
///
/// # Errors
/// [`CodecError::UnsupportedCompression`] for a discriminant with no
/// decoder.
pub fn uncompress_raw(
    adc: &[i16],
    uncompressed: &mut [i16],
    compression: i32,
) -> Result<(), CodecError> {
    uncompress(adc, uncompressed, Compression::try_from(compression)?)
}

/// Decode a waveform of `samples` ticks into a new vector.
pub fn uncompress_to_vec(
    adc: &[i16],
    compression: Compression,
    samples: usize,
    pedestal: i16,
) -> Result<Vec<i16>, CodecError> {
    let mut uncompressed = vec![0i16; samples];
    uncompress_with_pedestal(adc, &mut uncompressed, pedestal, compression)?;
    Ok(uncompressed)
}

//! # ADC Waveform Codec
//!
//! Compression of digitized detector waveforms, plus the small data
//! containers that travel with them through reconstruction.
//!
//! ## Design
//!
//! - **Safe Rust** - `#![forbid(unsafe_code)]`
//! - **In-place codecs** - compressors replace the caller's buffer
//! - **Stable formats** - 16-bit words, bit-compatible with stored data
//! - **Structured logging** - `tracing` events, no output of its own
//!
//! ## API Overview
//!
//! ### Codec
//!
//! - [`compress()`] / [`uncompress()`] - Dispatch on a [`Compression`] mode
//! - [`compress_huffman`] / [`uncompress_huffman`] - Run/delta Huffman coding
//! - [`zero_suppression`] / [`zero_unsuppression`] - Threshold block coding
//! - [`ZeroSuppressionSettings`] - Threshold, neighbour window, pedestal
//! - [`NeighborRing`] - Adjacent channels for neighbour-aware suppression
//! - [`ZeroSuppressedView`] - Validated view of a zero-suppressed layout
//! - [`RawDigit`] - Stored words of one channel with their decoding info
//!
//! ### Containers
//!
//! - [`LazyVector`] - Vector storing only a contiguous written window
//! - [`BitMask`] / [`FlagSet`] - Tri-state (undefined, set, unset) flags
//! - [`TrajectoryPointFlags`] - Quality flags of a track point
//!
//! ## Usage
//!
//! ```rust
//! use adcpack::{compress, uncompress, Compression, ZeroSuppressionSettings};
//!
//! let waveform: Vec<i16> = vec![0, 0, 0, 50, 60, 0, 0, 0];
//! let settings = ZeroSuppressionSettings::new(5, 0);
//!
//! let mut adc = waveform.clone();
//! compress(&mut adc, Compression::ZeroHuffman, &settings).unwrap();
//!
//! let mut decoded = vec![0i16; waveform.len()];
//! uncompress(&adc, &mut decoded, Compression::ZeroHuffman).unwrap();
//! assert_eq!(decoded, waveform);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod bitmask;
mod codebuffer;
mod codec;
mod codereader;
mod error;
mod flagset;
mod huffman;
mod lazy_vector;
mod mode;
mod neighbors;
mod raw_digit;
mod trajectory_point_flags;
mod zero_suppression;

pub use bitmask::{BitMask, BitStorage, Bits, Flag};
pub use codebuffer::CodeBuffer;
pub use codec::{
    compress, compress_with_neighbors, uncompress, uncompress_raw, uncompress_to_vec,
    uncompress_with_pedestal,
};
pub use codereader::CodeReader;
pub use error::{CodecError, FlagError, LazyVectorError};
pub use flagset::FlagSet;
pub use huffman::{compress_huffman, uncompress_huffman, uncompress_huffman_to_vec};
pub use lazy_vector::LazyVector;
pub use mode::Compression;
pub use neighbors::NeighborRing;
pub use raw_digit::RawDigit;
pub use trajectory_point_flags::{
    flag_name, flags as point_flags, PointFlagSet, TrajectoryPointFlags, INVALID_HIT_INDEX,
};
pub use zero_suppression::{
    adc_sticky_code_check, find_blocks, zero_suppression, zero_suppression_with_neighbors,
    zero_suppression_with_neighbors_and_pedestal, zero_suppression_with_pedestal,
    zero_unsuppression, zero_unsuppression_to_vec, zero_unsuppression_with_pedestal, Block,
    ZeroSuppressedView, ZeroSuppressionSettings, MAX_SAMPLES,
};

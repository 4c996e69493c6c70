//! Error types for the ADC codec and the data containers.

use thiserror::Error;

/// Errors that can occur during waveform compression or decompression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Stored compression discriminant has no decoder.
    #[error("unsupported compression #{0}")]
    UnsupportedCompression(i32),

    /// Waveform has more ticks than a 16-bit header word can describe.
    #[error("waveform too long: {0} samples (at most 65535 can be zero-suppressed)")]
    WaveformTooLong(usize),

    /// Zero-suppressed header word too large for a raw Huffman word.
    #[error("zero-suppressed header word {index} ({value}) exceeds the Huffman raw word range")]
    HeaderOutOfRange { index: usize, value: u16 },

    /// Zero-suppressed layout is inconsistent with its own header.
    #[error("malformed zero-suppressed data: {0}")]
    MalformedBlocks(String),

    /// Output buffer cannot hold the decoded waveform.
    #[error("output too short: need {needed} samples, got {actual}")]
    OutputTooShort { needed: usize, actual: usize },
}

/// Errors raised by checked [`LazyVector`](crate::LazyVector) access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LazyVectorError {
    /// Index is not smaller than the nominal size.
    #[error("index {index} out of range (size {size})")]
    OutOfRange { index: usize, size: usize },
}

/// Errors raised by [`FlagSet::test`](crate::FlagSet::test).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlagError {
    /// Flag index is not supported by the flag set.
    #[error("flag #{index} out of range (capacity {capacity})")]
    OutOfRange { index: u32, capacity: usize },

    /// Flag is supported but currently undefined.
    #[error("flag #{index} is not defined")]
    FlagNotDefined { index: u32 },
}

//! Compression mode discriminant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// How the ADC words of a waveform are encoded.
///
/// The numeric discriminants are the values stored alongside the data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(i32)]
pub enum Compression {
    /// Samples stored verbatim.
    #[default]
    None = 0,
    /// Lossless run/delta Huffman coding.
    Huffman = 1,
    /// Lossy zero suppression below a threshold.
    ZeroSuppression = 2,
    /// Zero suppression, then Huffman coding of the suppressed layout.
    ZeroHuffman = 3,
}

impl Compression {
    /// All supported modes, in discriminant order.
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::Huffman,
        Self::ZeroSuppression,
        Self::ZeroHuffman,
    ];

    /// Stored discriminant.
    #[inline]
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Whether zero-suppression settings affect this mode.
    #[inline]
    pub fn is_zero_suppressed(self) -> bool {
        matches!(self, Self::ZeroSuppression | Self::ZeroHuffman)
    }

    /// Whether decoding reproduces the input exactly.
    #[inline]
    pub fn is_lossless(self) -> bool {
        !self.is_zero_suppressed()
    }
}

impl TryFrom<i32> for Compression {
    type Error = CodecError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::None),
            1 => Ok(Self::Huffman),
            2 => Ok(Self::ZeroSuppression),
            3 => Ok(Self::ZeroHuffman),
            other => Err(CodecError::UnsupportedCompression(other)),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Huffman => "huffman",
            Self::ZeroSuppression => "zero-suppression",
            Self::ZeroHuffman => "zero-huffman",
        };
        f.pad(name)
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "huffman" => Ok(Self::Huffman),
            "zero-suppression" | "zs" => Ok(Self::ZeroSuppression),
            "zero-huffman" | "zs-huffman" => Ok(Self::ZeroHuffman),
            other => Err(format!(
                "unknown compression '{other}' (expected none, huffman, zero-suppression or zero-huffman)"
            )),
        }
    }
}

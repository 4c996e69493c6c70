//! Digitized waveform of one readout channel.

#![allow(clippy::cast_possible_truncation)]

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{compress, compress_with_neighbors, uncompress_to_vec};
use crate::error::CodecError;
use crate::mode::Compression;
use crate::neighbors::NeighborRing;
use crate::zero_suppression::ZeroSuppressionSettings;

/// Stored ADC words of a channel, with the information needed to decode
/// them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDigit {
    /// Readout channel.
    channel: u32,
    /// Number of ticks of the uncompressed waveform.
    samples: usize,
    /// Stored words, encoded per `compression`.
    adc: Vec<i16>,
    /// Pedestal in ADC counts.
    pedestal: f32,
    /// Pedestal RMS in ADC counts.
    sigma: f32,
    /// How `adc` is encoded.
    compression: Compression,
}

impl RawDigit {
    /// Wrap already-encoded words.
    ///
    /// # Arguments
    /// * `channel` - Readout channel
    /// * `samples` - Uncompressed tick count
    /// * `adc` - Stored words
    /// * `compression` - Encoding of `adc`
    pub fn new(channel: u32, samples: usize, adc: Vec<i16>, compression: Compression) -> Self {
        Self {
            channel,
            samples,
            adc,
            pedestal: 0.0,
            sigma: 0.0,
            compression,
        }
    }

    /// Encode an uncompressed waveform.
    ///
    /// If `settings` carries a pedestal it is also recorded on the digit.
    pub fn compress(
        channel: u32,
        waveform: Vec<i16>,
        compression: Compression,
        settings: &ZeroSuppressionSettings,
    ) -> Result<Self, CodecError> {
        Self::build(channel, waveform, compression, settings, None)
    }

    /// Encode an uncompressed waveform, with the channels in `neighbors`
    /// taking part in the zero-suppression threshold test.
    pub fn compress_with_neighbors(
        channel: u32,
        waveform: Vec<i16>,
        compression: Compression,
        settings: &ZeroSuppressionSettings,
        neighbors: &NeighborRing,
    ) -> Result<Self, CodecError> {
        Self::build(channel, waveform, compression, settings, Some(neighbors))
    }

    fn build(
        channel: u32,
        waveform: Vec<i16>,
        compression: Compression,
        settings: &ZeroSuppressionSettings,
        neighbors: Option<&NeighborRing>,
    ) -> Result<Self, CodecError> {
        let samples = waveform.len();
        let mut adc = waveform;
        match neighbors {
            Some(ring) => compress_with_neighbors(ring, &mut adc, compression, settings)?,
            None => compress(&mut adc, compression, settings)?,
        }

        debug!(channel, samples, words = adc.len(), %compression, "built raw digit");

        let mut digit = Self::new(channel, samples, adc, compression);
        if let Some(pedestal) = settings.pedestal {
            digit.pedestal = f32::from(pedestal);
        }
        Ok(digit)
    }

    /// Set pedestal and its RMS.
    pub fn set_pedestal(&mut self, pedestal: f32, sigma: f32) {
        self.pedestal = pedestal;
        self.sigma = sigma;
    }

    /// Channel number.
    #[inline]
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Uncompressed tick count.
    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Stored words.
    #[inline]
    pub fn adcs(&self) -> &[i16] {
        &self.adc
    }

    /// Number of stored words.
    #[inline]
    pub fn stored_len(&self) -> usize {
        self.adc.len()
    }

    /// Pedestal in ADC counts.
    #[inline]
    pub fn pedestal(&self) -> f32 {
        self.pedestal
    }

    /// Pedestal RMS.
    #[inline]
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Mode the stored words are encoded with.
    #[inline]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Decode the waveform; dropped zero-suppressed ticks read 0.
    pub fn uncompressed(&self) -> Result<Vec<i16>, CodecError> {
        uncompress_to_vec(&self.adc, self.compression, self.samples, 0)
    }

    /// Decode the waveform; dropped zero-suppressed ticks read the
    /// pedestal, rounded to the nearest count.
    pub fn uncompressed_with_pedestal(&self) -> Result<Vec<i16>, CodecError> {
        let pedestal = self.pedestal.round() as i16;
        uncompress_to_vec(&self.adc, self.compression, self.samples, pedestal)
    }
}

//! Fixed-depth ring of neighbouring channel waveforms.
//!
//! Zero suppression can keep a tick because a physically adjacent channel
//! saw signal there. The channels read just before the current one are kept
//! here; pushing past the depth evicts the oldest.

use std::collections::VecDeque;

use crate::zero_suppression::tick_value;

/// Ring buffer of neighbour channel waveforms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborRing {
    channels: VecDeque<Vec<i16>>,
    depth: usize,
}

impl NeighborRing {
    /// Create an empty ring holding at most `depth` channels.
    pub fn with_depth(depth: usize) -> Self {
        Self {
            channels: VecDeque::with_capacity(depth),
            depth,
        }
    }

    /// Maximum number of channels kept.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of channels currently buffered.
    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if no channel is buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Check if the next push evicts a channel.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.channels.len() >= self.depth
    }

    /// Buffer a channel waveform.
    ///
    /// # Returns
    /// The evicted oldest waveform, if the ring was full. With depth 0 the
    /// pushed waveform itself is handed back.
    pub fn push(&mut self, adc: Vec<i16>) -> Option<Vec<i16>> {
        if self.depth == 0 {
            return Some(adc);
        }

        let evicted = if self.is_full() {
            self.channels.pop_front()
        } else {
            None
        };
        self.channels.push_back(adc);
        evicted
    }

    /// Iterate over buffered waveforms, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &[i16]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Drop all buffered channels.
    pub fn clear(&mut self) {
        self.channels.clear();
    }

    /// Largest threshold test value among the buffered channels at `tick`.
    ///
    /// Channels shorter than `tick` do not contribute; an empty ring gives 0.
    pub fn max_abs_at(&self, tick: usize, pedestal: Option<i16>, sticky_code: bool) -> i32 {
        self.channels
            .iter()
            .filter_map(|channel| channel.get(tick))
            .map(|&sample| tick_value(sample, pedestal, sticky_code))
            .max()
            .unwrap_or(0)
    }
}

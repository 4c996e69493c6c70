//! End-to-end codec tests.
//!
//! Concrete layouts for known inputs, plus property tests of the round-trip
//! and lossy laws over random waveforms.

use adcpack::{
    compress, compress_huffman, uncompress, uncompress_huffman, uncompress_to_vec,
    zero_suppression, zero_suppression_with_pedestal, zero_unsuppression,
    zero_unsuppression_with_pedestal, CodecError, Compression, NeighborRing, ZeroSuppressedView,
    ZeroSuppressionSettings,
};
use proptest::prelude::*;

/// Largest magnitude a raw Huffman word stores exactly.
const RAW_LIMIT: i16 = 0x3FFF;

fn waveform(max_len: usize) -> impl Strategy<Value = Vec<i16>> {
    prop::collection::vec(-RAW_LIMIT..=RAW_LIMIT, 1..max_len)
}

/// Mostly quiet waveform with occasional large excursions.
fn pulsed_waveform(max_len: usize) -> impl Strategy<Value = Vec<i16>> {
    prop::collection::vec(
        prop_oneof![
            8 => -4i16..=4,
            1 => -2000i16..=2000,
        ],
        1..max_len,
    )
}

#[test]
fn test_huffman_scenario() {
    let samples = vec![10, 10, 10, 10, 10, 11];
    let mut adc = samples.clone();
    compress_huffman(&mut adc);

    assert_eq!(adc[0], 10);
    assert!(adc.len() < samples.len());

    let mut decoded = vec![0i16; samples.len()];
    assert_eq!(uncompress_huffman(&adc, &mut decoded), samples.len());
    assert_eq!(decoded, samples);
}

#[test]
fn test_huffman_raw_word_bounds() {
    let samples = vec![0, 16_383, -16_383, 16_384, 0, i16::MIN, i16::MAX];
    let mut adc = samples.clone();
    compress_huffman(&mut adc);

    // one literal, six raw words, the final empty coded word
    assert_eq!(adc.len(), 8);
    let mut decoded = vec![0i16; samples.len()];
    assert_eq!(uncompress_huffman(&adc, &mut decoded), samples.len());
    assert_eq!(decoded, vec![0, 16_383, -16_383, 16_383, 0, -16_383, 16_383]);
}

#[test]
fn test_huffman_small_steps_past_raw_range() {
    // reached through +1 codes, never stored raw
    let samples = vec![16_382, 16_383, 16_384, 16_385, 16_386, 16_386];
    let mut adc = samples.clone();
    compress_huffman(&mut adc);
    assert_eq!(adc[0], 16_382);
    assert_eq!(adc.len(), 2);

    let mut decoded = vec![0i16; samples.len()];
    uncompress_huffman(&adc, &mut decoded);
    assert_eq!(decoded, samples);
}

#[test]
fn test_zero_huffman_rejects_late_blocks() {
    let mut adc = vec![0i16; 20_000];
    adc[17_000] = 50;
    let settings = ZeroSuppressionSettings::new(5, 0);

    let result = compress(&mut adc, Compression::ZeroHuffman, &settings);
    assert_eq!(
        result,
        Err(CodecError::HeaderOutOfRange {
            index: 2,
            value: 17_000
        })
    );
    assert_eq!(adc.len(), 20_000);
    assert_eq!(adc[17_000], 50);
}

#[test]
fn test_zero_suppression_scenario() {
    let samples = vec![0, 0, 0, 50, 60, 0, 0, 0];
    let mut adc = samples.clone();
    zero_suppression(&mut adc, 5, 0).unwrap();

    assert_eq!(adc, vec![8, 1, 3, 2, 50, 60]);

    let view = ZeroSuppressedView::parse(&adc).unwrap();
    assert_eq!(view.samples(), 8);
    assert_eq!(view.block_count(), 1);
    let blocks: Vec<(usize, &[i16])> = view.blocks().collect();
    assert_eq!(blocks, vec![(3, &[50, 60][..])]);

    let mut decoded = vec![0i16; 8];
    zero_unsuppression(&adc, &mut decoded).unwrap();
    assert_eq!(decoded, samples);
}

#[test]
fn test_pedestal_and_sticky_codes() {
    // 448 = 0b1_1100_0000: low six bits all zero, 48 counts off pedestal
    let samples = vec![400, 400, 448, 400, 470, 400];
    let mut adc = samples.clone();
    zero_suppression_with_pedestal(&mut adc, 20, 400, 0, true).unwrap();

    let mut decoded = vec![0i16; samples.len()];
    zero_unsuppression_with_pedestal(&adc, &mut decoded, 400).unwrap();
    assert_eq!(decoded, vec![400, 400, 400, 400, 470, 400]);

    // the same tick survives when sticky codes are not filtered
    let mut adc = samples.clone();
    zero_suppression_with_pedestal(&mut adc, 20, 400, 0, false).unwrap();
    zero_unsuppression_with_pedestal(&adc, &mut decoded, 400).unwrap();
    assert_eq!(decoded, vec![400, 400, 448, 400, 470, 400]);
}

#[test]
fn test_neighbor_channels_keep_ticks() {
    let settings = ZeroSuppressionSettings::new(10, 1);
    let mut ring = NeighborRing::with_depth(2);
    ring.push(vec![0, 0, 0, 0, 0, 0, 0, 0]);
    ring.push(vec![0, 0, 0, 0, 0, 0, 90, 0]);

    let samples = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let mut adc = samples.clone();
    adcpack::compress_with_neighbors(&ring, &mut adc, Compression::ZeroSuppression, &settings)
        .unwrap();

    let decoded = uncompress_to_vec(&adc, Compression::ZeroSuppression, 8, 0).unwrap();
    assert_eq!(decoded, vec![0, 0, 0, 0, 0, 6, 7, 8]);
}

#[test]
fn test_corrupted_layout_is_rejected() {
    let mut adc = vec![0, 0, 0, 50, 60, 0, 0, 0];
    zero_suppression(&mut adc, 5, 0).unwrap();

    // drop a payload word
    adc.pop();
    let mut decoded = vec![0i16; 8];
    assert!(matches!(
        zero_unsuppression(&adc, &mut decoded),
        Err(CodecError::MalformedBlocks(_))
    ));

    let mut short = vec![0i16; 4];
    let adc = vec![8, 1, 3, 2, 50, 60];
    assert_eq!(
        zero_unsuppression(&adc, &mut short),
        Err(CodecError::OutputTooShort {
            needed: 8,
            actual: 4
        })
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_huffman_round_trip(samples in waveform(600)) {
        let mut adc = samples.clone();
        compress_huffman(&mut adc);

        let mut decoded = vec![0i16; samples.len()];
        prop_assert_eq!(uncompress_huffman(&adc, &mut decoded), samples.len());
        prop_assert_eq!(decoded, samples);
    }

    #[test]
    fn prop_huffman_saturates_only_raw_samples(
        samples in prop::collection::vec(any::<i16>(), 1..300),
    ) {
        let mut adc = samples.clone();
        compress_huffman(&mut adc);
        let mut decoded = vec![0i16; samples.len()];
        prop_assert_eq!(uncompress_huffman(&adc, &mut decoded), samples.len());

        for (&value, &original) in decoded.iter().zip(&samples) {
            if value != original {
                prop_assert!(original.unsigned_abs() > RAW_LIMIT.unsigned_abs());
                prop_assert_eq!(value, original.clamp(-RAW_LIMIT, RAW_LIMIT));
            }
        }
    }

    #[test]
    fn prop_huffman_round_trip_smooth(samples in pulsed_waveform(600)) {
        let mut adc = samples.clone();
        compress(&mut adc, Compression::Huffman, &ZeroSuppressionSettings::default()).unwrap();

        let decoded = uncompress_to_vec(&adc, Compression::Huffman, samples.len(), 0).unwrap();
        prop_assert_eq!(decoded, samples);
    }

    #[test]
    fn prop_identity(samples in prop::collection::vec(any::<i16>(), 0..300)) {
        let mut adc = samples.clone();
        compress(&mut adc, Compression::None, &ZeroSuppressionSettings::default()).unwrap();
        prop_assert_eq!(&adc, &samples);

        let mut decoded = vec![0i16; samples.len()];
        uncompress(&adc, &mut decoded, Compression::None).unwrap();
        prop_assert_eq!(decoded, samples);
    }

    #[test]
    fn prop_zero_suppression_lossy_law(
        samples in pulsed_waveform(400),
        threshold in 0u32..50,
        pedestal in prop::option::of(-3i16..=3),
    ) {
        let mut settings = ZeroSuppressionSettings::new(threshold, 0);
        if let Some(pedestal) = pedestal {
            settings = settings.with_pedestal(pedestal, false);
        }
        let fill = pedestal.unwrap_or(0);

        let mut adc = samples.clone();
        settings.suppress(&mut adc).unwrap();
        let decoded = uncompress_to_vec(&adc, Compression::ZeroSuppression, samples.len(), fill).unwrap();

        for (tick, (&original, &value)) in samples.iter().zip(&decoded).enumerate() {
            let magnitude = (i32::from(original) - i32::from(fill)).unsigned_abs();
            if magnitude > threshold {
                prop_assert_eq!(value, original, "tick {} above threshold", tick);
            } else {
                prop_assert_eq!(value, fill, "tick {} below threshold", tick);
            }
        }
    }

    #[test]
    fn prop_neighbor_window_only_adds_ticks(
        samples in pulsed_waveform(400),
        threshold in 0u32..50,
        nearest_neighbor in 0usize..6,
    ) {
        let mut adc = samples.clone();
        zero_suppression(&mut adc, threshold, nearest_neighbor).unwrap();
        let decoded = uncompress_to_vec(&adc, Compression::ZeroSuppression, samples.len(), 0).unwrap();

        for (&original, &value) in samples.iter().zip(&decoded) {
            prop_assert!(value == original || value == 0);
            if i32::from(original).unsigned_abs() > threshold {
                prop_assert_eq!(value, original);
            }
        }
    }

    #[test]
    fn prop_zero_suppression_layout(
        samples in pulsed_waveform(400),
        threshold in 0u32..50,
        nearest_neighbor in 0usize..6,
    ) {
        let mut adc = samples.clone();
        zero_suppression(&mut adc, threshold, nearest_neighbor).unwrap();

        prop_assert_eq!(usize::from(adc[0] as u16), samples.len());
        let blocks = usize::from(adc[1] as u16);
        let sizes: usize = adc[2 + blocks..2 + 2 * blocks]
            .iter()
            .map(|&size| usize::from(size as u16))
            .sum();
        prop_assert_eq!(sizes, adc.len() - 2 - 2 * blocks);

        let begins = &adc[2..2 + blocks];
        let ends: Vec<usize> = begins
            .iter()
            .zip(&adc[2 + blocks..2 + 2 * blocks])
            .map(|(&b, &s)| usize::from(b as u16) + usize::from(s as u16))
            .collect();
        for (next, end) in begins.iter().skip(1).zip(&ends) {
            prop_assert!(usize::from(*next as u16) >= *end);
        }
    }

    #[test]
    fn prop_zero_huffman_matches_zero_suppression(
        samples in pulsed_waveform(400),
        threshold in 0u32..50,
        nearest_neighbor in 0usize..4,
    ) {
        let settings = ZeroSuppressionSettings::new(threshold, nearest_neighbor);

        let mut zs = samples.clone();
        compress(&mut zs, Compression::ZeroSuppression, &settings).unwrap();
        let mut zh = samples.clone();
        compress(&mut zh, Compression::ZeroHuffman, &settings).unwrap();

        let from_zs = uncompress_to_vec(&zs, Compression::ZeroSuppression, samples.len(), 0).unwrap();
        let from_zh = uncompress_to_vec(&zh, Compression::ZeroHuffman, samples.len(), 0).unwrap();
        prop_assert_eq!(from_zs, from_zh);
    }
}

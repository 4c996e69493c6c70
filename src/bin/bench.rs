//! Performance benchmarks for the ADC waveform codec.
//!
//! Measures compression and decompression throughput of every mode on
//! synthetic waveforms, for regression testing during development.
//!
//! Usage:
//!   cargo run --release --bin bench          # Run with default 100 iterations
//!   cargo run --release --bin bench -- 1000  # Run with custom iteration count

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

use adcpack::{compress, uncompress_with_pedestal, Compression, ZeroSuppressionSettings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::time::Instant;

const DEFAULT_ITERATIONS: usize = 100;
const CHANNELS: usize = 64;
const SAMPLES: usize = 6000;
const PEDESTAL: i16 = 400;
const SEED: u64 = 0x00AD_C0DE;

struct BenchConfig {
    name: &'static str,
    /// Probability of a pulse starting at any tick.
    pulse_rate: f64,
    /// Peak pulse height above pedestal.
    pulse_height: i16,
}

const BENCHMARKS: &[BenchConfig] = &[
    BenchConfig {
        name: "quiet",
        pulse_rate: 0.0,
        pulse_height: 0,
    },
    BenchConfig {
        name: "sparse",
        pulse_rate: 0.001,
        pulse_height: 120,
    },
    BenchConfig {
        name: "busy",
        pulse_rate: 0.02,
        pulse_height: 600,
    },
];

/// Pedestal plus small noise, with triangular pulses.
fn synthesize(config: &BenchConfig, rng: &mut StdRng) -> Vec<Vec<i16>> {
    (0..CHANNELS)
        .map(|_| {
            let mut waveform: Vec<i16> = (0..SAMPLES)
                .map(|_| PEDESTAL + rng.gen_range(-2..=2))
                .collect();
            for tick in 0..SAMPLES {
                if config.pulse_rate > 0.0 && rng.gen_bool(config.pulse_rate) {
                    for (offset, sample) in waveform[tick..].iter_mut().take(20).enumerate() {
                        let rise = (20 - offset as i16) * config.pulse_height / 20;
                        *sample = sample.saturating_add(rise);
                    }
                }
            }
            waveform
        })
        .collect()
}

fn settings() -> ZeroSuppressionSettings {
    ZeroSuppressionSettings::new(10, 4).with_pedestal(PEDESTAL, true)
}

fn bench_compress(
    config: &BenchConfig,
    mode: Compression,
    waveforms: &[Vec<i16>],
    iterations: usize,
) {
    let settings = settings();
    let mut words = 0usize;

    let start = Instant::now();
    for _ in 0..iterations {
        words = 0;
        for waveform in waveforms {
            let mut adc = waveform.clone();
            if compress(&mut adc, mode, &settings).is_err() {
                println!("{:<20} {:<18} SKIP (compression failed)", config.name, mode);
                return;
            }
            words += adc.len();
        }
    }
    let elapsed = start.elapsed();

    report(config.name, mode, elapsed.as_secs_f64(), iterations, words);
}

fn bench_uncompress(
    config: &BenchConfig,
    mode: Compression,
    waveforms: &[Vec<i16>],
    iterations: usize,
) {
    let settings = settings();
    let mut encoded = Vec::with_capacity(waveforms.len());
    for waveform in waveforms {
        let mut adc = waveform.clone();
        if compress(&mut adc, mode, &settings).is_err() {
            println!("{:<20} {:<18} SKIP (compression failed)", config.name, mode);
            return;
        }
        encoded.push(adc);
    }
    let words = encoded.iter().map(Vec::len).sum();

    let mut out = vec![0i16; SAMPLES];
    let start = Instant::now();
    for _ in 0..iterations {
        for adc in &encoded {
            let _ = uncompress_with_pedestal(adc, &mut out, PEDESTAL, mode);
        }
    }
    let elapsed = start.elapsed();

    report(config.name, mode, elapsed.as_secs_f64(), iterations, words);
}

fn report(name: &str, mode: Compression, seconds: f64, iterations: usize, words: usize) {
    let per_iter_us = seconds * 1_000_000.0 / iterations as f64;
    let per_channel_us = per_iter_us / CHANNELS as f64;
    let msamples = (CHANNELS * SAMPLES) as f64 / per_iter_us;
    let ratio = (CHANNELS * SAMPLES) as f64 / words.max(1) as f64;

    println!(
        "{name:<20} {mode:<18} {per_iter_us:>10.2} µs/iter  {per_channel_us:>8.2} µs/ch  {msamples:>8.1} MS/s  {ratio:>6.2}x"
    );
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let iterations = if args.len() >= 2 {
        args[1].parse().unwrap_or(DEFAULT_ITERATIONS)
    } else {
        DEFAULT_ITERATIONS
    };

    println!("ADC Codec Benchmarks");
    println!("====================");
    println!("Iterations: {iterations}");
    println!("Waveforms:  {CHANNELS} channels x {SAMPLES} ticks, pedestal {PEDESTAL}\n");

    let mut rng = StdRng::seed_from_u64(SEED);
    let data: Vec<(&BenchConfig, Vec<Vec<i16>>)> = BENCHMARKS
        .iter()
        .map(|config| (config, synthesize(config, &mut rng)))
        .collect();

    println!("Compression:");
    for (config, waveforms) in &data {
        for mode in Compression::ALL {
            bench_compress(config, mode, waveforms, iterations);
        }
    }

    println!("\nDecompression:");
    for (config, waveforms) in &data {
        for mode in Compression::ALL {
            bench_uncompress(config, mode, waveforms, iterations);
        }
    }

    println!("\nUse these results for relative comparisons only.");
}

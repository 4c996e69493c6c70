//! ADC waveform codec command line interface.
//!
//! Compresses raw waveform files (little-endian `i16` samples, channels
//! laid out back to back) into a JSON list of channel digits, and back.
//!
//! Usage:
//!   adcpack compress data.raw --channel-size 6000 --mode zero-huffman -t 5
//!   adcpack decompress data.raw.adc

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use std::fs;
use std::path::{Path, PathBuf};

use adcpack::{Compression, NeighborRing, RawDigit, ZeroSuppressionSettings};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// ADC waveform compression (Huffman, zero suppression)
#[derive(Parser, Debug)]
#[command(name = "adcpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log codec details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress a raw waveform file into `<input>.adc`
    Compress {
        /// Raw little-endian i16 samples
        input: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Samples per channel (default: the whole file is one channel)
        #[arg(short = 'c', long, env = "ADCPACK_CHANNEL_SIZE")]
        channel_size: Option<usize>,

        /// Preceding channels taking part in zero suppression
        #[arg(long, env = "ADCPACK_NEIGHBORS", default_value_t = 0)]
        neighbors: usize,

        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Decompress a `.adc` file into raw little-endian i16 samples
    Decompress {
        /// Compressed digit file
        input: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fill suppressed ticks with each channel's pedestal instead of 0
        #[arg(long)]
        fill_pedestal: bool,
    },
}

#[derive(Args, Debug)]
struct CodecArgs {
    /// Compression mode
    #[arg(short, long, env = "ADCPACK_MODE", default_value_t = Compression::ZeroHuffman)]
    mode: Compression,

    /// JSON file with zero-suppression settings; flags override it
    #[arg(short, long, env = "ADCPACK_SETTINGS")]
    settings: Option<PathBuf>,

    /// Keep ticks whose magnitude exceeds this
    #[arg(short, long, env = "ADCPACK_THRESHOLD")]
    threshold: Option<u32>,

    /// Ticks kept around each kept excursion
    #[arg(short = 'n', long, env = "ADCPACK_NEAREST_NEIGHBOR")]
    nearest_neighbor: Option<usize>,

    /// Pedestal subtracted before the threshold test
    #[arg(short, long, env = "ADCPACK_PEDESTAL", allow_negative_numbers = true)]
    pedestal: Option<i16>,

    /// Ignore sticky ADC codes close to the pedestal
    #[arg(long, env = "ADCPACK_STICKY_CODE")]
    sticky_code: bool,
}

impl CodecArgs {
    /// Settings file, then command line flags.
    fn resolve(&self) -> Result<ZeroSuppressionSettings> {
        let mut settings = match &self.settings {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("cannot read settings file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid settings file {}", path.display()))?
            }
            None => ZeroSuppressionSettings::default(),
        };

        if let Some(threshold) = self.threshold {
            settings.threshold = threshold;
        }
        if let Some(nearest_neighbor) = self.nearest_neighbor {
            settings.nearest_neighbor = nearest_neighbor;
        }
        if let Some(pedestal) = self.pedestal {
            settings.pedestal = Some(pedestal);
        }
        settings.sticky_code |= self.sticky_code;

        if settings.sticky_code && settings.pedestal.is_none() {
            bail!("--sticky-code needs a pedestal");
        }
        Ok(settings)
    }
}

fn setup_logging(verbose: bool) {
    let dirs = if verbose {
        "info,adcpack=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(dirs)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Output name for decompression: strips `.adc`, appends `.raw`.
fn decompress_output(input: &Path) -> PathBuf {
    let name = input.to_string_lossy();
    match name.strip_suffix(".adc") {
        Some(stripped) => PathBuf::from(format!("{stripped}.raw")),
        None => PathBuf::from(format!("{name}.raw")),
    }
}

fn read_samples(path: &Path) -> Result<Vec<i16>> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    if bytes.is_empty() {
        bail!("input file {} is empty", path.display());
    }
    if bytes.len() % 2 != 0 {
        bail!("input size ({} bytes) is not a whole number of samples", bytes.len());
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

fn write_samples(path: &Path, samples: &[i16]) -> Result<()> {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))
}

fn do_compress(
    input: &Path,
    output: Option<PathBuf>,
    channel_size: Option<usize>,
    neighbors: usize,
    codec: &CodecArgs,
) -> Result<()> {
    let settings = codec.resolve()?;
    let samples = read_samples(input)?;
    let channel_size = channel_size.unwrap_or(samples.len());
    if channel_size == 0 {
        bail!("channel size must be positive");
    }
    if samples.len() % channel_size != 0 {
        bail!(
            "input ({} samples) not divisible by channel size ({channel_size})",
            samples.len()
        );
    }

    let mut ring = NeighborRing::with_depth(neighbors);
    let mut digits = Vec::with_capacity(samples.len() / channel_size);
    for (channel, waveform) in samples.chunks(channel_size).enumerate() {
        let channel = channel as u32;
        let digit = RawDigit::compress_with_neighbors(
            channel,
            waveform.to_vec(),
            codec.mode,
            &settings,
            &ring,
        )
        .with_context(|| format!("channel {channel}"))?;
        ring.push(waveform.to_vec());
        digits.push(digit);
    }

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.adc", input.display())));
    let json = serde_json::to_vec(&digits)?;
    fs::write(&output, &json).with_context(|| format!("cannot write {}", output.display()))?;

    let words: usize = digits.iter().map(RawDigit::stored_len).sum();
    let ratio = samples.len() as f64 / words.max(1) as f64;
    info!(channels = digits.len(), samples = samples.len(), words, "compressed");

    println!(
        "Input:       {} ({} samples, {} channels)",
        input.display(),
        samples.len(),
        digits.len()
    );
    println!("Output:      {} ({words} words)", output.display());
    println!("Ratio:       {ratio:.2}x");
    println!(
        "Parameters:  mode={}, threshold={}, nn={}, pedestal={:?}, sticky={}",
        codec.mode,
        settings.threshold,
        settings.nearest_neighbor,
        settings.pedestal,
        settings.sticky_code
    );
    Ok(())
}

fn do_decompress(input: &Path, output: Option<PathBuf>, fill_pedestal: bool) -> Result<()> {
    let text = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let digits: Vec<RawDigit> = serde_json::from_slice(&text)
        .with_context(|| format!("invalid digit file {}", input.display()))?;

    let mut samples = Vec::new();
    for digit in &digits {
        let waveform = if fill_pedestal {
            digit.uncompressed_with_pedestal()
        } else {
            digit.uncompressed()
        }
        .with_context(|| format!("channel {}", digit.channel()))?;
        debug!(channel = digit.channel(), samples = waveform.len(), "decoded channel");
        samples.extend(waveform);
    }

    let output = output.unwrap_or_else(|| decompress_output(input));
    write_samples(&output, &samples)?;

    let words: usize = digits.iter().map(RawDigit::stored_len).sum();
    let ratio = samples.len() as f64 / words.max(1) as f64;

    println!("Input:       {} ({words} words, {} channels)", input.display(), digits.len());
    println!("Output:      {} ({} samples)", output.display(), samples.len());
    println!("Expansion:   {ratio:.2}x");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Compress {
            input,
            output,
            channel_size,
            neighbors,
            codec,
        } => do_compress(&input, output, channel_size, neighbors, &codec),
        Commands::Decompress {
            input,
            output,
            fill_pedestal,
        } => do_decompress(&input, output, fill_pedestal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompress_output() {
        assert_eq!(
            decompress_output(Path::new("run1.raw.adc")),
            PathBuf::from("run1.raw.raw")
        );
        assert_eq!(decompress_output(Path::new("dump")), PathBuf::from("dump.raw"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "adcpack",
            "compress",
            "in.raw",
            "--mode",
            "zs",
            "-t",
            "7",
            "--pedestal",
            "-3",
        ])
        .unwrap();
        let Commands::Compress { codec, .. } = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(codec.mode, Compression::ZeroSuppression);

        let settings = codec.resolve().unwrap();
        assert_eq!(settings.threshold, 7);
        assert_eq!(settings.pedestal, Some(-3));
    }

    #[test]
    fn test_sticky_needs_pedestal() {
        let cli = Cli::try_parse_from(["adcpack", "compress", "in.raw", "--sticky-code"]).unwrap();
        let Commands::Compress { codec, .. } = cli.command else {
            panic!("expected compress");
        };
        assert!(codec.resolve().is_err());
    }
}

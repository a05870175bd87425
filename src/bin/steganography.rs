//! # Steganography Binary Entry Point
//!
//! Hides a message file in a PNG, or recovers it.
//!
//! ## Usage
//!
//! ```bash
//! # Encode: writes cover_out.png
//! cargo run --bin steganography -- cover.png message.txt
//!
//! # Decode: writes cover_out.png_decoded.txt
//! cargo run --bin steganography -- cover_out.png
//! ```
//!
//! Images written by the legacy tool use a zero terminator instead of a
//! length prefix:
//! ```bash
//! cargo run --bin steganography -- --framing sentinel old_out.png
//! ```

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::io::Write;
use std::path::{Path, PathBuf};

use lsb_stego::common::config::{load_config, StegoConfig};
use lsb_stego::common::metrics::{Operation, RunMetrics, RunReport};
use lsb_stego::processing::steganography::{decode_file, encode_file, load_grid};
use lsb_stego::{Framing, MessageCodec, OverflowPolicy, StegoError};

/// Command-line arguments for the steganography binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image to hide the message in, or to recover it from
    input: PathBuf,

    /// Message file to embed (omit to decode)
    message: Option<PathBuf>,

    /// Output path (default derived from the input name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to a configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How the end of the message is marked
    #[arg(long, value_enum)]
    framing: Option<Framing>,

    /// What to do when the message does not fit in the image
    #[arg(long, value_enum)]
    overflow: Option<OverflowPolicy>,

    /// Stop decoding after this many bytes
    #[arg(long)]
    max_message_bytes: Option<u64>,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print how many bytes the image can hold and exit
    #[arg(long)]
    capacity: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Format: `[HH:MM:SS] [LEVEL] message`
fn init_logger(level: LevelFilter) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .init();
}

fn load_settings(args: &Args) -> anyhow::Result<StegoConfig> {
    let mut config: StegoConfig = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StegoConfig::default(),
    };

    if let Some(framing) = args.framing {
        config.codec.framing = framing;
    }
    if let Some(overflow) = args.overflow {
        config.codec.overflow = overflow;
    }
    if let Some(max) = args.max_message_bytes {
        config.codec.max_message_bytes = max;
    }

    Ok(config)
}

fn print_capacity(input: &Path, codec: &MessageCodec) -> anyhow::Result<()> {
    let grid = load_grid(input)?;
    println!(
        "{}: {}x{}, {} bits, {} bytes usable with {:?} framing",
        input.display(),
        grid.width(),
        grid.height(),
        grid.capacity_bits(),
        codec.usable_bytes(&grid),
        codec.framing()
    );
    Ok(())
}

fn run(args: &Args, config: &StegoConfig, codec: &MessageCodec) -> anyhow::Result<RunReport> {
    match &args.message {
        Some(message) => {
            let metrics = RunMetrics::start(Operation::Encode);
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| config.output.encoded_path(&args.input));

            let embed = encode_file(&args.input, message, &output, codec)?;
            Ok(metrics.finish_encode(&args.input, &output, codec.framing(), &embed))
        }
        None => {
            let metrics = RunMetrics::start(Operation::Decode);
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| config.output.decoded_path(&args.input));

            let decoded = match decode_file(&args.input, &output, codec) {
                Err(StegoError::UnterminatedMessage { partial }) => {
                    info!(
                        "Read {} bytes without finding a terminator; try --framing length-prefixed",
                        partial.len()
                    );
                    return Err(StegoError::UnterminatedMessage { partial }.into());
                }
                other => other?,
            };
            Ok(metrics.finish_decode(&args.input, &output, codec.framing(), &decoded))
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    init_logger(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let config = load_settings(&args)?;
    let codec = config.codec.build();

    if args.capacity {
        return print_capacity(&args.input, &codec);
    }

    let report = run(&args, &config, &codec)?;
    report.log_summary();

    if let Some(path) = &args.report {
        report
            .export_to_json(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("Run report exported to: {}", path.display());
    }

    println!("Execution time: {:.6} seconds", report.elapsed_secs());

    Ok(())
}

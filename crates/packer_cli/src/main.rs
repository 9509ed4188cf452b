//! CLI orchestrator (component C9): choose a preset, pack it, write the
//! workbook.

mod presets;
mod workbook;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use packer_core::normalize::PackerConfig;
use packer_core::Packer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, ValueEnum)]
enum Preset {
    /// The built-in curated object list.
    Manual,
    /// Read objects from a workbook at `--input`.
    Excel,
}

#[derive(Debug, Parser)]
#[command(name = "framepack", about = "Cyclic frame-packing scheduler")]
struct Cli {
    /// Which object set to pack.
    #[arg(value_enum)]
    preset: Preset,

    /// Workbook to read objects from; required when `preset` is `excel`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the result workbook.
    #[arg(long, default_value = "packer_out.xlsx")]
    output: PathBuf,

    /// Bytes per frame.
    #[arg(long, default_value_t = 1000)]
    frame_size_bytes: u32,

    /// Number of frames in one full cycle.
    #[arg(long, default_value_t = 32)]
    num_frames: u32,

    /// Fail instead of appending a `_N` suffix when `--output` already
    /// exists.
    #[arg(long)]
    strict_output_path: bool,

    /// Increase log verbosity (info by default; pass twice for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let objects = match cli.preset {
        Preset::Manual => presets::manual_preset(),
        Preset::Excel => {
            let input = cli
                .input
                .context("--input <WORKBOOK> is required when preset is 'excel'")?;
            presets::excel_preset(&input)?
        }
    };
    info!(num_objects = objects.len(), "loaded input objects");

    let config = PackerConfig::new(cli.frame_size_bytes, cli.output.clone()).with_num_frames(cli.num_frames);
    let result = Packer::new(objects, config).pack()?;

    info!(
        total_util = result.outcome.total_util,
        max_end = result.outcome.max_end,
        stage1_proven = result.outcome.stage1_proven,
        stage2_proven = result.outcome.stage2_proven,
        "pack complete"
    );

    let written = workbook::write_workbook(&result.tables, &result.output_path, cli.strict_output_path)?;
    println!(
        "packed {} objects: utilization={} bits, peak end={} bits -> {}",
        result.tables.objects.len(),
        result.outcome.total_util,
        result.outcome.max_end,
        written.display()
    );

    Ok(())
}

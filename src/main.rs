use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use halo2ome::image_pipeline::ome::DEFAULT_PHYSICAL_SIZE_UM;
use halo2ome::image_pipeline::tiff::DEFAULT_TILE_SIZE;
use halo2ome::image_pipeline::{
    ConversionConfig, OmeTiffPipeline, PixelTypePolicy, SharedProgress, TiffCompression,
    TiffSourceReader,
};
use halo2ome::logger;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompressionArg {
    None,
    DeflateFast,
    Deflate,
    DeflateBest,
}

impl From<CompressionArg> for TiffCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => TiffCompression::None,
            CompressionArg::DeflateFast => TiffCompression::DeflateFast,
            CompressionArg::Deflate => TiffCompression::DeflateBalanced,
            CompressionArg::DeflateBest => TiffCompression::DeflateBest,
        }
    }
}

/// Convert multi-channel page containers into pyramidal OME-TIFF files.
///
/// Each INPUT is written next to itself as `<INPUT>.lossless.ome.tiff`.
#[derive(Debug, Parser)]
#[command(name = "halo2ome", version, about)]
struct Cli {
    /// Source containers to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Tile compression
    #[arg(long, value_enum, default_value_t = CompressionArg::Deflate)]
    compression: CompressionArg,

    /// Tile edge length in pixels (multiple of 16)
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    tile_size: u32,

    /// Physical pixel size in micrometres
    #[arg(long, default_value_t = DEFAULT_PHYSICAL_SIZE_UM)]
    physical_size: f64,

    /// Declare "uint8" for pixel types OME cannot name instead of failing
    #[arg(long)]
    pixel_type_fallback: bool,

    /// Delete the output file when a conversion fails
    #[arg(long)]
    remove_partial_output: bool,

    /// Skip the page dimension checks
    #[arg(long)]
    no_validate_dimensions: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ConversionConfig {
        let policy = if self.pixel_type_fallback {
            PixelTypePolicy::Fallback
        } else {
            PixelTypePolicy::Reject
        };
        ConversionConfig::builder()
            .compression(self.compression.into())
            .tile_size(self.tile_size)
            .physical_size_um(self.physical_size)
            .pixel_type_policy(policy)
            .validate_dimensions(!self.no_validate_dimensions)
            .remove_partial_output(self.remove_partial_output)
            .build()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_with_default(if cli.verbose { "debug" } else { "info" });

    info!("Starting halo2ome...");

    let pipeline = OmeTiffPipeline::new(cli.config()).context("invalid conversion settings")?;
    info!("Compression: {:?}", pipeline.config().compression);
    info!("Tile size: {}", pipeline.config().tile_size);

    let mut failed = 0usize;
    for input in &cli.inputs {
        match convert_with_progress(&pipeline, input) {
            Ok(output) => info!(output = %output.display(), "Conversion successful!"),
            Err(e) => {
                error!(input = %input.display(), "Conversion failed: {:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} conversions failed", failed, cli.inputs.len());
    }
    Ok(())
}

/// Runs one conversion on a worker thread and logs its progress until it ends.
fn convert_with_progress(pipeline: &OmeTiffPipeline<TiffSourceReader>, input: &Path) -> Result<PathBuf> {
    let progress = SharedProgress::new();

    thread::scope(|scope| {
        let worker = {
            let progress = progress.clone();
            scope.spawn(move || pipeline.convert_file(input, &progress))
        };

        let mut last_reported = None;
        while !worker.is_finished() {
            let (completed, total) = progress.snapshot();
            if total > 0 && last_reported != Some(completed) {
                info!(completed, total, stage = %progress.stage(), "{}", progress.status());
                last_reported = Some(completed);
            }
            thread::sleep(POLL_INTERVAL);
        }

        match worker.join() {
            Ok(result) => result.with_context(|| format!("converting {}", input.display())),
            Err(_) => bail!("conversion worker for {} panicked", input.display()),
        }
    })
}

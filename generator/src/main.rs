//! Optical OFDM Waveform Generator
//!
//! Command line entry point: resolves options, generates the waveform and
//! writes or prints the samples.

mod cli;

use anyhow::Result;
use clap::Parser;
use std::io::{BufWriter, Write};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use cli::Args;
use waveform::{Configuration, ConstellationView, Waveform, WaveformGenerator};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &args.config {
        info!("Configuration file: {}", path);
    }

    let options = args.to_options()?;
    let config = options.resolve()?;

    info!("Waveform configuration:");
    info!("  Variant: {}", config.variant);
    info!("  Subcarriers: {}", config.subcarriers);
    info!("  Data carriers per symbol: {}", config.data_carriers());
    info!("  Constellation size: {}", config.constellation.size());
    info!("  Scale: {}, offset: {}", config.scale, config.offset);
    info!(
        "  Std-dev offsets: DCO={}, ACO={}",
        config.dco_offset_sd, config.aco_offset_sd
    );
    info!("  Clip range: [{}, {}]", config.clip_low, config.clip_high);
    match config.seed {
        Some(seed) => info!("  Seed: {}", seed),
        None => info!("  Seed: none"),
    }

    let generator = WaveformGenerator::new(config);
    let waveform = generator.generate()?;
    let config = generator.config();

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    report(
        config,
        &waveform,
        args.print,
        &mut BufWriter::new(stdout.lock()),
        &mut stderr.lock(),
    )?;

    if let Some(plan) = &config.persistence {
        let path = interfaces::persist(plan, &waveform.samples)?;
        info!("Signal written to {}", path.display());
    }

    Ok(())
}

/// Write printed samples to `out` and the constellation listing to `diag`
///
/// Samples own `out` so they can be piped unmixed.
fn report<O: Write, D: Write>(
    config: &Configuration,
    waveform: &Waveform,
    print: bool,
    out: &mut O,
    diag: &mut D,
) -> Result<()> {
    if config.show_constellation {
        let view = ConstellationView::new(&waveform.symbols, &config.constellation);
        write!(diag, "{}", view.render_text())?;
    }

    if print {
        for sample in &waveform.samples {
            writeln!(out, "{}", sample)?;
        }
        out.flush()?;
    }

    Ok(())
}

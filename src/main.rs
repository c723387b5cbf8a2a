use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use collage_rs::config::CollageConfig;
use collage_rs::layout::LayoutEngine;
use collage_rs::render::{self, markup, raster};
use collage_rs::scanner::{self, types::ScanProgress};

/// Lay out a folder of photos into an aspect-preserving collage.
#[derive(Debug, Parser)]
#[command(name = "Collage-rs", version)]
struct Cli {
    /// Directory to scan (recursively) for images
    input: PathBuf,

    /// Raster output; .jpg/.jpeg is encoded with --quality, other extensions by format
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a responsive HTML fragment
    #[arg(long)]
    html: Option<PathBuf>,

    /// Write the layout as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Number of random trees to try
    #[arg(short, long)]
    attempts: Option<usize>,

    /// Pixels inset on each side of every image
    #[arg(short, long, allow_negative_numbers = true)]
    padding: Option<f32>,

    /// JPEG quality (1-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Seed for a reproducible layout
    #[arg(long)]
    seed: Option<u64>,

    /// Canvas background as RRGGBB hex
    #[arg(long, default_value = "ffffff", value_parser = parse_hex_color)]
    background: [u8; 3],

    /// Evaluate attempts on all cores
    #[arg(long)]
    parallel: bool,
}

fn parse_hex_color(s: &str) -> Result<[u8; 3], String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got '{s}'"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color '{s}': {e}"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("collage_rs=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let defaults = CollageConfig::default();
    let config = CollageConfig {
        attempts: cli.attempts.unwrap_or(defaults.attempts),
        padding: cli.padding.unwrap_or(defaults.padding),
        jpeg_quality: cli.quality.unwrap_or(defaults.jpeg_quality),
    };
    let engine = LayoutEngine::new(cli.width as f64, cli.height as f64, config)
        .context("invalid configuration")?;

    // Scan, logging progress from a side thread
    let (tx, rx) = mpsc::channel();
    let progress = thread::spawn(move || {
        for event in rx {
            match event {
                ScanProgress::Started { root } => {
                    tracing::info!("Scanning {}", root.display())
                }
                ScanProgress::Progress {
                    files_seen,
                    images_found,
                } => tracing::info!("  {} files seen, {} images", files_seen, images_found),
                ScanProgress::Error { path, message } => {
                    tracing::debug!("  {}: {}", path.display(), message)
                }
                ScanProgress::Completed { .. } => {}
            }
        }
    });
    let images = scanner::scan(&cli.input, tx)?;
    let _ = progress.join();

    if images.is_empty() {
        tracing::warn!("No images found under {}", cli.input.display());
    }

    let seed = cli.seed.unwrap_or_else(|| rand::thread_rng().gen());
    tracing::info!("Layout seed: {} (pass --seed to reproduce)", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let layout = if cli.parallel {
        engine.generate_best_layout_par(&images, &mut rng)
    } else {
        engine.generate_best_layout(&images, &mut rng)
    };

    let wants_raster = cli.output.is_some() || (cli.html.is_none() && cli.json.is_none());
    if wants_raster {
        let out = cli.output.clone().unwrap_or_else(|| PathBuf::from("collage.jpg"));
        let canvas = raster::rasterize(&layout, Rgb(cli.background))?;
        raster::save(&canvas, &out, config.jpeg_quality)
            .with_context(|| format!("failed to save {}", out.display()))?;
        tracing::info!("Wrote {}", out.display());
    }

    if let Some(path) = &cli.html {
        std::fs::write(path, markup::to_markup(&layout))
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
    }

    if let Some(path) = &cli.json {
        std::fs::write(path, render::to_json(&layout)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
    }

    Ok(())
}

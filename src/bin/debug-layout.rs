/// Diagnostic tool to verify scan → search → layout pipeline
use collage_rs::config::CollageConfig;
use collage_rs::layout::LayoutEngine;
use collage_rs::scanner;
use collage_rs::scanner::types::ImageRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::mpsc;

const CANVAS_W: f64 = 1920.0;
const CANVAS_H: f64 = 1080.0;

/// Random mix of landscape, portrait and square photo sizes.
fn synthetic_images(n: usize, rng: &mut StdRng) -> Vec<ImageRecord> {
    const SIZES: [(u32, u32); 6] = [
        (6000, 4000),
        (4000, 6000),
        (4032, 3024),
        (3024, 4032),
        (3000, 3000),
        (1920, 1080),
    ];
    (0..n)
        .map(|i| {
            let (w, h) = SIZES[rng.gen_range(0..SIZES.len())];
            ImageRecord::new(format!("synthetic/{i:04}.jpg"), w, h)
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("collage_rs=debug".parse()?),
        )
        .init();

    let scan_path = std::env::args().nth(1).map(PathBuf::from);
    let seed: u64 = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let mut rng = StdRng::seed_from_u64(seed);

    println!("=== DIAGNOSTIC: Scan → Search → Layout Pipeline ===");

    // Scan (or synthesize)
    let images = match &scan_path {
        Some(path) => {
            println!("Scanning: {}", path.display());
            let (tx, _rx) = mpsc::channel();
            scanner::scan(path, tx)?
        }
        None => {
            println!("No directory given, using 24 synthetic images");
            synthetic_images(24, &mut rng)
        }
    };
    println!("\n[1] Input: {} images (seed {})", images.len(), seed);

    let landscape = images.iter().filter(|i| i.aspect_ratio() > 1.0).count();
    let portrait = images.iter().filter(|i| i.aspect_ratio() < 1.0).count();
    println!(
        "    {} landscape, {} portrait, {} square",
        landscape,
        portrait,
        images.len() - landscape - portrait
    );

    // Search
    let config = CollageConfig::default();
    let engine = LayoutEngine::new(CANVAS_W, CANVAS_H, config)?;
    let start = std::time::Instant::now();
    let layout = engine.generate_best_layout(&images, &mut rng);
    println!(
        "\n[2] Search: {} attempts in {:.2}s, score {:.6} (target aspect {:.4})",
        layout.attempts_run,
        start.elapsed().as_secs_f64(),
        layout.score,
        engine.target_aspect()
    );

    // Largest placements
    println!("\n[3] Top 10 largest placements by area:");
    let mut sorted = layout.placements.clone();
    sorted.sort_by(|a, b| (b.width * b.height).total_cmp(&(a.width * a.height)));
    for (i, p) in sorted.iter().take(10).enumerate() {
        println!(
            "    [{}] '{}' - {:.1}x{:.1} at ({:.1}, {:.1}), aspect {:.3}",
            i,
            p.image.path,
            p.width,
            p.height,
            p.x,
            p.y,
            p.image.aspect_ratio()
        );
    }

    // Check for anomalies
    println!("\n[4] Checking for anomalies:");
    let eps = 1e-6;
    let mut out_of_bounds = 0;
    let mut distorted = 0;
    for p in &layout.placements {
        if p.x < -eps
            || p.y < -eps
            || p.x + p.width > CANVAS_W + eps
            || p.y + p.height > CANVAS_H + eps
        {
            out_of_bounds += 1;
        }
        if (p.width / p.height - p.image.aspect_ratio()).abs() > 1e-6 {
            distorted += 1;
        }
    }
    println!("    Out of bounds: {}", out_of_bounds);
    println!("    Distorted:     {}", distorted);
    println!("    Leaf count:    {} (expected {})", layout.placements.len(), images.len());

    let area_sum: f64 = layout.placements.iter().map(|p| p.width * p.height).sum();
    let canvas_area = CANVAS_W * CANVAS_H;
    println!("    Total area:    {:.0}px²", area_sum);
    println!("    Canvas area:   {:.0}px²", canvas_area);
    println!("    Coverage:      {:.1}%", area_sum / canvas_area * 100.0);

    if let Some(b) = layout.bounds() {
        println!(
            "    Bounds:        {:.1}x{:.1} at ({:.1}, {:.1})",
            b.w, b.h, b.x, b.y
        );
    }

    Ok(())
}

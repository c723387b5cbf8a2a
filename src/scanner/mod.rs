pub mod extensions;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{bail, Result};
use compact_str::CompactString;
use rayon::prelude::*;

use self::extensions::categorize_extension;
use self::types::{ImageRecord, ScanProgress};

/// How many walked files between two `ScanProgress::Progress` messages.
const PROGRESS_INTERVAL: u64 = 256;

/// Collect every supported raster image under `root` as an [`ImageRecord`].
///
/// Dimensions are read from the file headers only; nothing is decoded.
/// Files that cannot be identified are reported through `progress_tx` and
/// skipped. The result is sorted by path so the input order is stable.
pub fn scan(root: &Path, progress_tx: mpsc::Sender<ScanProgress>) -> Result<Vec<ImageRecord>> {
    if !root.is_dir() {
        bail!("'{}' is not a directory", root.display());
    }

    let start = Instant::now();
    let _ = progress_tx.send(ScanProgress::Started {
        root: root.to_path_buf(),
    });

    let mut candidates: Vec<PathBuf> = Vec::new();
    let mut files_seen = 0u64;
    for entry in jwalk::WalkDir::new(root).sort(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Walk error under {}: {}", root.display(), e);
                let _ = progress_tx.send(ScanProgress::Error {
                    path: root.to_path_buf(),
                    message: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        files_seen += 1;

        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(categorize_extension)
            .is_some();
        if is_image {
            candidates.push(path);
        }

        if files_seen % PROGRESS_INTERVAL == 0 {
            let _ = progress_tx.send(ScanProgress::Progress {
                files_seen,
                images_found: candidates.len() as u64,
            });
        }
    }

    // Header parsing is I/O bound and independent per file
    let identified: Vec<(PathBuf, Result<(u32, u32), String>)> = candidates
        .into_par_iter()
        .map(|path| {
            let dims = image::image_dimensions(&path).map_err(|e| e.to_string());
            (path, dims)
        })
        .collect();

    let mut records = Vec::with_capacity(identified.len());
    let mut skipped = 0u64;
    for (path, dims) in identified {
        match dims {
            Ok((w, h)) if w > 0 && h > 0 => {
                let handle = CompactString::new(path.to_string_lossy());
                records.push(ImageRecord::new(handle, w, h));
            }
            Ok((w, h)) => {
                tracing::warn!("Skipping {} with degenerate size {}x{}", path.display(), w, h);
                skipped += 1;
            }
            Err(message) => {
                tracing::warn!("Skipping unreadable image {}: {}", path.display(), message);
                let _ = progress_tx.send(ScanProgress::Error {
                    path: path.clone(),
                    message,
                });
                skipped += 1;
            }
        }
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));

    let elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Scanned {}: {} images ({} skipped) in {} ms",
        root.display(),
        records.len(),
        skipped,
        elapsed_ms
    );
    let _ = progress_tx.send(ScanProgress::Completed {
        total_images: records.len() as u64,
        skipped,
        elapsed_ms,
    });

    Ok(records)
}

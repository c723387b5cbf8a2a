use std::path::PathBuf;

use compact_str::CompactString;

/// One source image, described by its pixel dimensions. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Opaque handle to the pixel data (a filesystem path for the scanner)
    pub path: CompactString,
    /// Native width in pixels
    pub width: u32,
    /// Native height in pixels
    pub height: u32,
    /// Importance hint. Carried through the layout but not used by the geometry.
    pub weight: f64,
    /// width / height, computed once at construction
    aspect_ratio: f64,
}

impl ImageRecord {
    /// Create a record with the default weight of 1.0.
    ///
    /// A zero width or height yields a neutral aspect ratio of 1.0 instead of
    /// a division fault or a degenerate zero ratio.
    pub fn new(path: impl Into<CompactString>, width: u32, height: u32) -> Self {
        let aspect_ratio = if width == 0 || height == 0 {
            1.0
        } else {
            width as f64 / height as f64
        };
        Self {
            path: path.into(),
            width,
            height,
            weight: 1.0,
            aspect_ratio,
        }
    }

    /// Replace the importance weight. Non-positive or non-finite weights fall back to 1.0.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            1.0
        };
        self
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}

/// Progress updates emitted during scanning.
#[derive(Debug, Clone)]
pub enum ScanProgress {
    /// Starting scan of a directory
    Started { root: PathBuf },
    /// Periodic progress update
    Progress { files_seen: u64, images_found: u64 },
    /// Scan completed
    Completed {
        total_images: u64,
        skipped: u64,
        elapsed_ms: u64,
    },
    /// Error encountered (non-fatal)
    Error { path: PathBuf, message: String },
}

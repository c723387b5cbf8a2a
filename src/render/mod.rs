pub mod markup;
pub mod raster;

use std::path::PathBuf;

use thiserror::Error;

use crate::layout::Layout;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("canvas size {width}x{height} cannot be rasterized")]
    Canvas { width: f64, height: f64 },
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("layout serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a layout for renderers living outside this crate.
pub fn to_json(layout: &Layout) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(layout)?)
}

/// Destination box of one placement after insetting `padding` on every side.
/// Returns `None` when nothing is left to draw.
pub(crate) fn inset(x: f64, y: f64, w: f64, h: f64, padding: f32) -> Option<(f64, f64, f64, f64)> {
    let pad = padding as f64;
    let (iw, ih) = (w - 2.0 * pad, h - 2.0 * pad);
    if iw <= 0.0 || ih <= 0.0 {
        return None;
    }
    Some((x + pad, y + pad, iw, ih))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_shrinks_on_every_side() {
        assert_eq!(inset(10.0, 20.0, 100.0, 50.0, 5.0), Some((15.0, 25.0, 90.0, 40.0)));
    }

    #[test]
    fn inset_drops_boxes_smaller_than_padding() {
        assert_eq!(inset(0.0, 0.0, 10.0, 100.0, 5.0), None);
        assert_eq!(inset(0.0, 0.0, 100.0, 8.0, 4.0), None);
    }
}

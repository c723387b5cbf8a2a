use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rayon::prelude::*;

use super::{inset, RenderError};
use crate::layout::{Layout, PlacedImage};
use crate::scanner::extensions::{categorize_extension, ImageFormatKind};

/// Integer destination rectangle on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Snap a placement (inset by `padding`) to the pixel grid.
///
/// Edges are rounded independently so neighbouring boxes share a boundary
/// without gaps. Returns `None` for boxes with nothing left after padding.
pub fn pixel_rect(p: &PlacedImage, padding: f32) -> Option<PixelRect> {
    let (x, y, w, h) = inset(p.x, p.y, p.width, p.height, padding)?;
    let x0 = x.round().max(0.0);
    let y0 = y.round().max(0.0);
    let x1 = (x + w).round();
    let y1 = (y + h).round();
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect {
        x: x0 as u32,
        y: y0 as u32,
        w: (x1 - x0) as u32,
        h: (y1 - y0) as u32,
    })
}

/// Largest centered window of a `src_w`x`src_h` image with the aspect ratio
/// of `dst_w`x`dst_h`. The longer source axis is cropped.
/// Returns `(x, y, w, h)` in source pixels.
pub fn center_crop(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return (0, 0, src_w, src_h);
    }
    let src_ar = src_w as f64 / src_h as f64;
    let dst_ar = dst_w as f64 / dst_h as f64;

    if src_ar > dst_ar {
        let w = ((src_h as f64 * dst_ar).round() as u32).clamp(1, src_w);
        ((src_w - w) / 2, 0, w, src_h)
    } else {
        let h = ((src_w as f64 / dst_ar).round() as u32).clamp(1, src_h);
        (0, (src_h - h) / 2, src_w, h)
    }
}

/// A decoded, cropped and resized tile ready for compositing.
struct Tile {
    image: RgbImage,
    x: u32,
    y: u32,
}

fn load_tile(p: &PlacedImage, rect: PixelRect) -> Option<Tile> {
    let path = Path::new(p.image.path.as_str());
    let source = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let (cx, cy, cw, ch) = center_crop(source.width(), source.height(), rect.w, rect.h);
    let tile = source
        .crop_imm(cx, cy, cw, ch)
        .resize_exact(rect.w, rect.h, FilterType::Lanczos3)
        .to_rgb8();

    Some(Tile {
        image: tile,
        x: rect.x,
        y: rect.y,
    })
}

/// Render a layout into an RGB canvas.
///
/// Each placement is inset by the layout's padding, center-cropped from its
/// source to the box's aspect ratio and composited in draw order. Sources are
/// decoded in parallel. A placement whose source cannot be read, or whose box
/// vanishes after padding, is skipped.
pub fn rasterize(layout: &Layout, background: Rgb<u8>) -> Result<RgbImage, RenderError> {
    let (w, h) = (layout.canvas_width.round(), layout.canvas_height.round());
    if !(w >= 1.0 && h >= 1.0 && w <= u32::MAX as f64 && h <= u32::MAX as f64) {
        return Err(RenderError::Canvas {
            width: layout.canvas_width,
            height: layout.canvas_height,
        });
    }
    let mut canvas = RgbImage::from_pixel(w as u32, h as u32, background);

    let jobs: Vec<(&PlacedImage, PixelRect)> = layout
        .placements
        .iter()
        .filter_map(|p| match pixel_rect(p, layout.padding) {
            Some(rect) => Some((p, rect)),
            None => {
                tracing::debug!("Skipping {}: empty after padding", p.image.path);
                None
            }
        })
        .collect();

    let tiles: Vec<Option<Tile>> = jobs
        .par_iter()
        .map(|&(p, rect)| load_tile(p, rect))
        .collect();

    let mut drawn = 0usize;
    for tile in tiles.into_iter().flatten() {
        imageops::overlay(&mut canvas, &tile.image, tile.x as i64, tile.y as i64);
        drawn += 1;
    }

    tracing::info!(
        "Rasterized {}/{} images onto {}x{} canvas",
        drawn,
        layout.placements.len(),
        canvas.width(),
        canvas.height()
    );
    Ok(canvas)
}

/// Encode `canvas` to `path`. JPEG extensions use `jpeg_quality`; every other
/// extension is encoded in the format it names.
pub fn save(canvas: &RgbImage, path: &Path, jpeg_quality: u8) -> Result<(), RenderError> {
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(categorize_extension)
        == Some(ImageFormatKind::Jpeg);

    if !is_jpeg {
        canvas.save(path)?;
        return Ok(());
    }

    let io_err = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    canvas.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, jpeg_quality))?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

/// Raster formats the scanner hands to the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormatKind {
    Jpeg,
    Png,
    Webp,
    Gif,
    Bmp,
    Tiff,
}

/// Classify a file extension. Returns `None` for anything that is not a
/// supported raster image (vector formats and camera RAW files included).
pub fn categorize_extension(ext: &str) -> Option<ImageFormatKind> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => Some(ImageFormatKind::Jpeg),
        "png" => Some(ImageFormatKind::Png),
        "webp" => Some(ImageFormatKind::Webp),
        "gif" => Some(ImageFormatKind::Gif),
        "bmp" => Some(ImageFormatKind::Bmp),
        "tif" | "tiff" => Some(ImageFormatKind::Tiff),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(categorize_extension("JPG"), Some(ImageFormatKind::Jpeg));
        assert_eq!(categorize_extension("Png"), Some(ImageFormatKind::Png));
        assert_eq!(categorize_extension("tif"), Some(ImageFormatKind::Tiff));
    }

    #[test]
    fn non_raster_extensions_are_rejected() {
        assert_eq!(categorize_extension("svg"), None);
        assert_eq!(categorize_extension("cr2"), None);
        assert_eq!(categorize_extension(""), None);
    }
}

use thiserror::Error;

/// A configuration value that failed validation. Each variant names the field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("attempts must be at least 1 (got {0})")]
    Attempts(usize),
    #[error("padding must be a finite value >= 0 (got {0})")]
    Padding(f32),
    #[error("jpeg_quality must be within 1..=100 (got {0})")]
    JpegQuality(u8),
    #[error("canvas must have positive finite dimensions (got {width}x{height})")]
    Canvas { width: f64, height: f64 },
}

/// Tunables for the layout search and the renderers.
///
/// The layout engine reads only `attempts`; `padding` and `jpeg_quality`
/// pass through to the renderers untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollageConfig {
    /// Monte Carlo search budget (number of random trees tried)
    pub attempts: usize,
    /// Pixels inset on each side of every placed image
    pub padding: f32,
    /// JPEG encoder quality for raster output
    pub jpeg_quality: u8,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            attempts: 1000,
            padding: 0.0,
            jpeg_quality: 90,
        }
    }
}

impl CollageConfig {
    /// Check every field, reporting the first one out of range.
    ///
    /// `attempts == 0` is rejected rather than clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attempts < 1 {
            return Err(ConfigError::Attempts(self.attempts));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(ConfigError::Padding(self.padding));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::JpegQuality(self.jpeg_quality));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(CollageConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let config = CollageConfig {
            attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Attempts(0)));
    }

    #[test]
    fn negative_padding_is_rejected() {
        let config = CollageConfig {
            padding: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Padding(-1.0)));
    }

    #[test]
    fn jpeg_quality_bounds() {
        for bad in [0u8, 101, 255] {
            let config = CollageConfig {
                jpeg_quality: bad,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::JpegQuality(bad)));
        }
        for good in [1u8, 100] {
            let config = CollageConfig {
                jpeg_quality: good,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn error_message_names_the_field() {
        let msg = ConfigError::JpegQuality(0).to_string();
        assert!(msg.contains("jpeg_quality"));
    }
}

//! Error types for the background model.

use thiserror::Error;

use crate::image::ImageDesc;

/// Errors raised at the model's lifecycle boundary (construction,
/// initialization, per-frame entry). Nothing is checked per pixel.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Color distance threshold must be positive")]
    ZeroThreshold,

    #[error("Background sample count must be positive")]
    ZeroSamples,

    #[error("Required background samples must be in 1..={samples}, got {required}")]
    InvalidRequiredSamples { required: usize, samples: usize },

    #[error("Learning rate must be a power of two, got {0}")]
    LearningRateNotPowerOfTwo(u32),

    #[error("Unsupported channel count {0}, expected 1 or 3")]
    UnsupportedChannels(usize),

    #[error("Image buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Background model is not initialized")]
    NotInitialized,

    #[error("Frame layout {actual:?} does not match model layout {expected:?}")]
    LayoutMismatch {
        expected: ImageDesc,
        actual: ImageDesc,
    },

    #[error("Mask length mismatch: expected {expected} bytes, got {actual}")]
    MaskSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid tile count {tiles} for frame height {height}")]
    InvalidTileCount { tiles: usize, height: usize },

    #[error("Failed to parse parameters")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Channels;

    #[test]
    fn test_invalid_required_samples_message() {
        let err = Error::InvalidRequiredSamples {
            required: 5,
            samples: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("1..=4"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_learning_rate_message() {
        let err = Error::LearningRateNotPowerOfTwo(6);
        assert_eq!(err.to_string(), "Learning rate must be a power of two, got 6");
    }

    #[test]
    fn test_layout_mismatch_message() {
        let err = Error::LayoutMismatch {
            expected: ImageDesc::new(640, 480, Channels::Rgb),
            actual: ImageDesc::new(320, 240, Channels::Gray),
        };
        let msg = err.to_string();
        assert!(msg.contains("640"));
        assert!(msg.contains("320"));
        assert!(msg.contains("Gray"));
    }

    #[test]
    fn test_invalid_tile_count_message() {
        let err = Error::InvalidTileCount {
            tiles: 12,
            height: 8,
        };
        assert_eq!(
            err.to_string(),
            "Invalid tile count 12 for frame height 8"
        );
    }

    #[test]
    fn test_yaml_error_has_source() {
        use std::error::Error as StdError;

        let yaml_err = serde_yml::from_str::<u32>("[not, a, number]").unwrap_err();
        let err = Error::from(yaml_err);
        assert!(err.source().is_some());
    }
}

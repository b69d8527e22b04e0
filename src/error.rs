//! Error types for the ui_vision engine.
//!
//! Only failures attributable to the input (an image that cannot be opened or
//! decoded, a malformed RGBA buffer) or to the host (bad configuration, export
//! I/O, a stopped worker pool) are errors. Heuristic outcomes such as "no grid"
//! or "no components" are ordinary values inside an `AnalysisResult`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ui_vision operations
pub type Result<T> = std::result::Result<T, VisionError>;

#[derive(Error, Debug)]
pub enum VisionError {
    /// An image file could not be opened or decoded.
    #[error("Failed to load image {}: {source}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// In-memory encoded bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// A buffer could not be encoded for export.
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// The RGBA byte slice does not match the declared dimensions.
    #[error("RGBA buffer for {width}x{height} image must hold {expected} bytes, got {actual}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {parameter} {reason}")]
    InvalidConfig { parameter: String, reason: String },

    #[error("Failed to read configuration {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The batch worker pool is gone or one of its tasks died.
    #[error("Worker pool failure: {0}")]
    Worker(String),
}

impl VisionError {
    pub fn image_load(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::ImageLoad {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// True when the failure is caused by the supplied image rather than the host.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            VisionError::ImageLoad { .. }
                | VisionError::Decode(_)
                | VisionError::InvalidBuffer { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_error_is_an_input_error() {
        let err = VisionError::InvalidBuffer {
            width: 2,
            height: 2,
            expected: 16,
            actual: 3,
        };
        assert!(err.is_input_error());
        assert!(err.to_string().contains("16 bytes, got 3"));
    }

    #[test]
    fn encode_error_keeps_its_source() {
        use image::error::{ParameterError, ParameterErrorKind};
        use std::error::Error as _;

        let source = image::ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        ));
        let err = VisionError::Encode(source);
        assert!(!err.is_input_error());
        assert!(err.source().is_some_and(|s| s.is::<image::ImageError>()));
        assert!(err.to_string().starts_with("Failed to encode image:"));
    }

    #[test]
    fn config_error_is_not_an_input_error() {
        let err = VisionError::invalid_config("segmentation.seed_stride", "must be at least 1");
        assert!(!err.is_input_error());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: segmentation.seed_stride must be at least 1"
        );
    }
}

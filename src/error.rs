//! Error types for seg-eval operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for seg-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during segmentation evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Predicted and ground-truth grids disagree in pixel count.
    ///
    /// Fatal for the current evaluation pass: a malformed dataset entry
    /// invalidates trust in the accumulated statistic.
    #[error("Shape mismatch: expected {expected} pixels, got {actual}")]
    ShapeMismatch {
        /// Pixel count the caller declared or the other grid carries.
        expected: usize,
        /// Pixel count actually present.
        actual: usize,
    },

    /// Failed to load a ground-truth annotation file.
    #[error("Ground truth load failed: {path}: {reason}")]
    GroundTruthLoad {
        /// Path to the annotation that failed to load.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// The inference provider failed to produce a prediction.
    #[error("Prediction failed for sample {sample}: {message}")]
    Prediction {
        /// Sample identifier.
        sample: String,
        /// Error message from the provider.
        message: String,
    },

    /// Error enumerating or describing a dataset.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Error writing report files.
    #[error("Report error: {0}")]
    Report(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

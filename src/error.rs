//! Error types for training, models and checkpoints.

use thiserror::Error;

/// Everything that can abort a training call or a checkpoint operation.
///
/// Failures raised by a model or gradient provider are fatal to the training
/// call that triggered them; nothing is retried.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },

    #[error("gradient count mismatch: {expected} parameters but {found} gradients")]
    GradientCount { expected: usize, found: usize },

    #[error("learning rate must be positive and finite, got {0}")]
    InvalidLearningRate(f64),

    #[error("max_epochs must be at least 1, got {0}")]
    InvalidMaxEpochs(usize),

    #[error("min_tol must be a number, got {0}")]
    InvalidTolerance(f64),

    #[error("invalid checkpoint: {0}")]
    Checkpoint(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl TrainError {
    pub(crate) fn shape(expected: &[usize], found: &[usize]) -> Self {
        Self::ShapeMismatch { expected: expected.to_vec(), found: found.to_vec() }
    }
}

/// Result type for training operations.
pub type Result<T> = std::result::Result<T, TrainError>;

//! Error types for profile operations

use crate::api::types::ModelType;
use thiserror::Error;

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors that can occur while computing, merging or decoding profiles
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Length mismatch: {targets} targets, {predictions} predictions, {scores:?} scores")]
    LengthMismatch {
        targets: usize,
        predictions: usize,
        scores: Option<usize>,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Incompatible model types: {left:?} vs {right:?}")]
    IncompatibleModelType { left: ModelType, right: ModelType },

    #[error("Incompatible merge: {0}")]
    IncompatibleMerge(String),

    #[error("Too many labels: {count} exceeds the limit of {max}")]
    TooManyLabels { count: usize, max: usize },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

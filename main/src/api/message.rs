//! Wire messages for profiles
//!
//! These are flat, storage-oriented mirrors of the in-memory profile. They
//! carry no behaviour beyond encode/decode; conversion to and from the live
//! types (with validation) lives next to those types.

use crate::api::error::{ProfileError, ProfileResult};
use crate::api::types::ModelType;
use serde::{Deserialize, Serialize};

/// Upper bound on the memory a decoded message may claim.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Top-level profile message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct ModelProfileMessage {
    pub output_fields: Vec<String>,
    pub metrics: Option<ModelMetricsMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct ModelMetricsMessage {
    pub model_type: ModelType,
    pub scored_matrix: Option<ScoredMatrixMessage>,
    pub regression_metrics: Option<RegressionMetricsMessage>,
}

/// Confusion matrix: sorted labels plus a dense row-major cell table
/// (row = target label, column = predicted label).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct ScoredMatrixMessage {
    pub labels: Vec<String>,
    pub target_field: Option<String>,
    pub prediction_field: Option<String>,
    pub score_field: Option<String>,
    pub cells: Vec<CellMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct CellMessage {
    pub count: u64,
    pub score_count: u64,
    pub score_sum: f64,
    pub score_min: Option<f64>,
    pub score_max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct RegressionMetricsMessage {
    pub count: u64,
    pub sum_error: f64,
    pub sum_absolute_error: f64,
    pub sum_squared_error: f64,
    pub sum_targets: f64,
    pub sum_targets_squared: f64,
    pub sum_predictions: f64,
    pub sum_mape: f64,
    pub mape_count: u64,
    pub sum_smape: f64,
    pub target_field: Option<String>,
    pub prediction_field: Option<String>,
}

impl ModelProfileMessage {
    /// Encode with the bincode standard configuration.
    pub fn to_bytes(&self) -> ProfileResult<Vec<u8>> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| ProfileError::Encode(e.to_string()))
    }

    /// Decode a message produced by [`ModelProfileMessage::to_bytes`].
    ///
    /// Trailing bytes are rejected, and so is any length prefix that would
    /// claim more than [`MAX_MESSAGE_BYTES`].
    pub fn from_bytes(bytes: &[u8]) -> ProfileResult<Self> {
        let config = bincode::config::standard().with_limit::<MAX_MESSAGE_BYTES>();
        let (message, read): (ModelProfileMessage, usize) = bincode::decode_from_slice(bytes, config)
                .map_err(|e| ProfileError::Decode(e.to_string()))?;
        if read != bytes.len() {
            return Err(ProfileError::Decode(format!(
                "{} trailing bytes after profile message",
                bytes.len() - read
            )));
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_bytes_roundtrip() {
        let message = ModelProfileMessage::default();
        let bytes = message.to_bytes().unwrap();
        assert_eq!(ModelProfileMessage::from_bytes(&bytes).unwrap(), message);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let message = ModelProfileMessage {
            output_fields: vec!["test".into()],
            metrics: None,
        };
        let mut bytes = message.to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(
            ModelProfileMessage::from_bytes(&bytes),
            Err(ProfileError::Decode(_))
        ));
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let message = ModelProfileMessage {
            output_fields: vec!["predictions".into(), "scores".into()],
            metrics: Some(ModelMetricsMessage {
                model_type: ModelType::Classification,
                ..Default::default()
            }),
        };
        let bytes = message.to_bytes().unwrap();
        assert!(ModelProfileMessage::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn test_oversized_length_prefix_rejected() {
        // u64 length prefix for output_fields, far beyond the input.
        let huge = [0xFDu8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x0f];
        assert!(matches!(
            ModelProfileMessage::from_bytes(&huge),
            Err(ProfileError::Decode(_))
        ));

        // u32 length prefix: small enough to allocate, too large to claim.
        let large = [0xFCu8, 0xff, 0xff, 0xff, 0x0f];
        assert!(matches!(
            ModelProfileMessage::from_bytes(&large),
            Err(ProfileError::Decode(_))
        ));
    }
}

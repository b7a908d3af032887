// SAF (Simple API Facade): re-exports for convenient access

// API types, errors and wire messages
pub use crate::api::config::ProfileConfig;
pub use crate::api::error::*;
pub use crate::api::message::*;
pub use crate::api::types::*;

// Aggregators
pub use crate::core::confusion_matrix::{Cell, ConfusionMatrix};
pub use crate::core::regression::RegressionMetrics;

// Metrics and inference
pub use crate::core::inference::infer_model_type;
pub use crate::core::metrics::Metrics;

// Profiles
pub use crate::core::model_profile::ModelProfile;
pub use crate::core::parallel::profile_shards;

pub mod checks;
pub mod confusion_matrix;
pub mod inference;
pub mod metrics;
pub mod model_profile;
pub mod parallel;
pub mod regression;

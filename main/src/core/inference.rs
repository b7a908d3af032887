//! Model-type inference.
//!
//! The policy is a small decision table over the shape of the target and
//! prediction columns, evaluated top to bottom:
//!
//! | # | condition                                     | result           |
//! |---|-----------------------------------------------|------------------|
//! | 1 | empty batch                                   | `Unknown`        |
//! | 2 | targets or predictions contain text/booleans  | `Classification` |
//! | 3 | scores present and targets all integral       | `Classification` |
//! | 4 | otherwise                                     | `Regression`     |
//!
//! Row 3 is why integer-coded targets with real-valued predictions and
//! scores are treated as class labels. `Nlp` is never inferred.

use crate::api::types::{ModelType, Value, ValueKind};

pub fn infer_model_type(targets: &[Value], predictions: &[Value], has_scores: bool) -> ModelType {
    let (Some(target_kind), Some(prediction_kind)) =
        (ValueKind::of_column(targets), ValueKind::of_column(predictions))
    else {
        return ModelType::Unknown;
    };

    if target_kind == ValueKind::Categorical || prediction_kind == ValueKind::Categorical {
        return ModelType::Classification;
    }
    if has_scores && target_kind == ValueKind::Discrete {
        return ModelType::Classification;
    }
    ModelType::Regression
}

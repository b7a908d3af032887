use crate::api::error::{ProfileError, ProfileResult};
use crate::api::message::RegressionMetricsMessage;
use crate::api::types::{FieldNames, Value};
use crate::core::checks::{check_lengths, merge_field};

/// Error statistics for numeric model outputs.
///
/// Only running sums are kept, so two instances merge by addition and the
/// result is the same as profiling the concatenated batches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegressionMetrics {
    count: u64,
    sum_error: f64,
    sum_absolute_error: f64,
    sum_squared_error: f64,
    sum_targets: f64,
    sum_targets_squared: f64,
    sum_predictions: f64,
    sum_mape: f64,
    mape_count: u64,
    sum_smape: f64,
    target_field: Option<String>,
    prediction_field: Option<String>,
}

impl RegressionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: &FieldNames) -> Self {
        Self {
            target_field: fields.target_field.clone(),
            prediction_field: fields.prediction_field.clone(),
            ..Self::default()
        }
    }

    /// Build the statistics of a single batch.
    ///
    /// Every value must be a finite number; anything else is rejected before
    /// any sum is touched.
    pub fn from_batch(targets: &[Value], predictions: &[Value], fields: &FieldNames) -> ProfileResult<Self> {
        check_lengths(targets.len(), predictions.len(), None)?;
        let targets = numeric_column("target", targets)?;
        let predictions = numeric_column("prediction", predictions)?;
        let mut metrics = Self::with_fields(fields);
        metrics.update(&predictions, &targets);
        Ok(metrics)
    }

    fn update(&mut self, predictions: &[f64], targets: &[f64]) {
        debug_assert_eq!(predictions.len(), targets.len());
        for (&p, &t) in predictions.iter().zip(targets.iter()) {
            let diff = p - t;
            self.sum_error += diff;
            self.sum_squared_error += diff * diff;
            self.sum_absolute_error += diff.abs();
            self.sum_targets += t;
            self.sum_targets_squared += t * t;
            self.sum_predictions += p;
            self.count += 1;

            // MAPE: skip elements where target == 0
            if t != 0.0 {
                self.sum_mape += diff.abs() / t.abs();
                self.mape_count += 1;
            }

            // SMAPE: skip elements where both pred and target are 0
            let denom = p.abs() + t.abs();
            if denom != 0.0 {
                self.sum_smape += 2.0 * diff.abs() / denom;
            }
        }
    }

    /// Combine two sets of statistics into a new one.
    pub fn merge(&self, other: &RegressionMetrics) -> ProfileResult<RegressionMetrics> {
        Ok(RegressionMetrics {
            count: self.count + other.count,
            sum_error: self.sum_error + other.sum_error,
            sum_absolute_error: self.sum_absolute_error + other.sum_absolute_error,
            sum_squared_error: self.sum_squared_error + other.sum_squared_error,
            sum_targets: self.sum_targets + other.sum_targets,
            sum_targets_squared: self.sum_targets_squared + other.sum_targets_squared,
            sum_predictions: self.sum_predictions + other.sum_predictions,
            sum_mape: self.sum_mape + other.sum_mape,
            mape_count: self.mape_count + other.mape_count,
            sum_smape: self.sum_smape + other.sum_smape,
            target_field: merge_field("target_field", &self.target_field, &other.target_field)?,
            prediction_field: merge_field(
                "prediction_field",
                &self.prediction_field,
                &other.prediction_field,
            )?,
        })
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn target_field(&self) -> Option<&str> {
        self.target_field.as_deref()
    }

    pub fn prediction_field(&self) -> Option<&str> {
        self.prediction_field.as_deref()
    }

    pub fn mean_squared_error(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_squared_error / self.count as f64
    }

    pub fn mean_absolute_error(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_absolute_error / self.count as f64
    }

    pub fn root_mean_squared_error(&self) -> f64 {
        self.mean_squared_error().sqrt()
    }

    /// Mean signed error (prediction - target); positive means over-prediction.
    pub fn mean_error(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_error / self.count as f64
    }

    /// Coefficient of determination (R²).
    ///
    /// R² = 1 - SS_res / SS_tot where:
    /// - SS_res = sum of squared residuals (sum_squared_error)
    /// - SS_tot = total sum of squares of target variance
    ///
    /// Returns 0.0 when count is 0 or SS_tot is 0 (constant target).
    pub fn r_squared(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let ss_tot = self.sum_targets_squared
            - (self.sum_targets * self.sum_targets) / self.count as f64;
        if ss_tot == 0.0 {
            return 0.0;
        }
        1.0 - self.sum_squared_error / ss_tot
    }

    /// Mean Absolute Percentage Error (MAPE).
    ///
    /// MAPE = mean(|pred - target| / |target|) * 100
    ///
    /// Elements where target == 0 are excluded from the calculation.
    /// Returns 0.0 when no valid elements exist.
    pub fn mape(&self) -> f64 {
        if self.mape_count == 0 {
            return 0.0;
        }
        (self.sum_mape / self.mape_count as f64) * 100.0
    }

    /// Symmetric Mean Absolute Percentage Error (SMAPE).
    ///
    /// SMAPE = mean(2 * |pred - target| / (|pred| + |target|)) * 100
    ///
    /// Elements where both pred and target are 0 contribute zero.
    /// Returns 0.0 when count is 0.
    pub fn smape(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum_smape / self.count as f64) * 100.0
    }

    pub fn mean_target(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_targets / self.count as f64
    }

    pub fn mean_prediction(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_predictions / self.count as f64
    }

    pub fn to_message(&self) -> RegressionMetricsMessage {
        RegressionMetricsMessage {
            count: self.count,
            sum_error: self.sum_error,
            sum_absolute_error: self.sum_absolute_error,
            sum_squared_error: self.sum_squared_error,
            sum_targets: self.sum_targets,
            sum_targets_squared: self.sum_targets_squared,
            sum_predictions: self.sum_predictions,
            sum_mape: self.sum_mape,
            mape_count: self.mape_count,
            sum_smape: self.sum_smape,
            target_field: self.target_field.clone(),
            prediction_field: self.prediction_field.clone(),
        }
    }

    pub fn from_message(message: &RegressionMetricsMessage) -> ProfileResult<Self> {
        if message.mape_count > message.count {
            return Err(ProfileError::Decode(format!(
                "regression mape_count {} exceeds count {}",
                message.mape_count, message.count
            )));
        }
        Ok(Self {
            count: message.count,
            sum_error: message.sum_error,
            sum_absolute_error: message.sum_absolute_error,
            sum_squared_error: message.sum_squared_error,
            sum_targets: message.sum_targets,
            sum_targets_squared: message.sum_targets_squared,
            sum_predictions: message.sum_predictions,
            sum_mape: message.sum_mape,
            mape_count: message.mape_count,
            sum_smape: message.sum_smape,
            target_field: message.target_field.clone(),
            prediction_field: message.prediction_field.clone(),
        })
    }
}

fn numeric_column(name: &str, values: &[Value]) -> ProfileResult<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| match v.as_f64() {
            Some(x) if x.is_finite() => Ok(x),
            _ => Err(ProfileError::InvalidValue(format!(
                "{name} {i} is not a finite number: {v}"
            ))),
        })
        .collect()
}

use crate::api::config::ProfileConfig;
use crate::api::error::ProfileResult;
use crate::api::message::ModelProfileMessage;
use crate::api::types::{FieldNames, ModelType, Value};
use crate::core::metrics::Metrics;

/// Profile of a model's outputs: declared output fields plus metrics.
///
/// Profiles form a commutative monoid under [`ModelProfile::merge`] with
/// `ModelProfile::default()` as the identity (up to `output_fields` order,
/// which follows the operands).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelProfile {
    output_fields: Vec<String>,
    metrics: Metrics,
    config: ProfileConfig,
}

impl ModelProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output_fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: ProfileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.metrics = Metrics::with_model_type(model_type);
        self
    }

    pub fn output_fields(&self) -> &[String] {
        &self.output_fields
    }

    pub fn add_output_field(&mut self, field: impl Into<String>) {
        self.output_fields.push(field.into());
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut Metrics {
        &mut self.metrics
    }

    pub fn model_type(&self) -> ModelType {
        self.metrics.model_type()
    }

    pub fn set_model_type(&mut self, model_type: ModelType) -> ProfileResult<()> {
        self.metrics.set_model_type(model_type)
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Aggregate a batch of `(target, prediction[, score])` triples.
    ///
    /// Infers the model type on the first non-empty batch unless one was
    /// declared. On error the profile is left exactly as it was.
    pub fn compute_metrics<T, P>(
        &mut self,
        targets: &[T],
        predictions: &[P],
        scores: Option<&[f64]>,
    ) -> ProfileResult<()>
    where
        T: Clone + Into<Value>,
        P: Clone + Into<Value>,
    {
        self.compute_metrics_with_fields(targets, predictions, scores, &FieldNames::default())
    }

    /// Like [`ModelProfile::compute_metrics`], recording which columns the
    /// batch came from on the aggregator.
    pub fn compute_metrics_with_fields<T, P>(
        &mut self,
        targets: &[T],
        predictions: &[P],
        scores: Option<&[f64]>,
        fields: &FieldNames,
    ) -> ProfileResult<()>
    where
        T: Clone + Into<Value>,
        P: Clone + Into<Value>,
    {
        let targets: Vec<Value> = targets.iter().cloned().map(Into::into).collect();
        let predictions: Vec<Value> = predictions.iter().cloned().map(Into::into).collect();
        self.metrics.compute(&targets, &predictions, scores, fields, &self.config)
    }

    /// Combine two profiles into a new one. Neither input is modified.
    ///
    /// Output fields are concatenated (self's first). The result keeps
    /// self's configuration.
    pub fn merge(&self, other: &ModelProfile) -> ProfileResult<ModelProfile> {
        let metrics = self.metrics.merge(&other.metrics, &self.config)?;
        let mut output_fields = Vec::with_capacity(self.output_fields.len() + other.output_fields.len());
        output_fields.extend(self.output_fields.iter().cloned());
        output_fields.extend(other.output_fields.iter().cloned());
        log::debug!(
            "merged profiles: {} + {} -> {}",
            self.metrics.model_type(),
            other.metrics.model_type(),
            metrics.model_type()
        );
        Ok(ModelProfile {
            output_fields,
            metrics,
            config: self.config,
        })
    }

    /// Fold any number of profiles left to right. An empty input yields the
    /// empty profile.
    pub fn merge_all<'a, I>(profiles: I) -> ProfileResult<ModelProfile>
    where
        I: IntoIterator<Item = &'a ModelProfile>,
    {
        let mut iter = profiles.into_iter();
        let Some(first) = iter.next() else {
            return Ok(ModelProfile::default());
        };
        iter.try_fold(first.clone(), |acc, next| acc.merge(next))
    }

    pub fn to_message(&self) -> ModelProfileMessage {
        ModelProfileMessage {
            output_fields: self.output_fields.clone(),
            metrics: Some(self.metrics.to_message()),
        }
    }

    pub fn from_message(message: &ModelProfileMessage) -> ProfileResult<Self> {
        Self::from_message_with_config(message, ProfileConfig::default())
    }

    /// Decode a message. A message without metrics decodes to `Unknown`
    /// metrics.
    pub fn from_message_with_config(message: &ModelProfileMessage, config: ProfileConfig) -> ProfileResult<Self> {
        let metrics = match &message.metrics {
            Some(m) => Metrics::from_message(m)?,
            None => Metrics::new(),
        };
        Ok(Self {
            output_fields: message.output_fields.clone(),
            metrics,
            config,
        })
    }

    pub fn to_bytes(&self) -> ProfileResult<Vec<u8>> {
        self.to_message().to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> ProfileResult<Self> {
        Self::from_message(&ModelProfileMessage::from_bytes(bytes)?)
    }
}

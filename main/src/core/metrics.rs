use crate::api::config::ProfileConfig;
use crate::api::error::{ProfileError, ProfileResult};
use crate::api::message::ModelMetricsMessage;
use crate::api::types::{FieldNames, ModelType, Value};
use crate::core::checks::check_lengths;
use crate::core::confusion_matrix::ConfusionMatrix;
use crate::core::inference::infer_model_type;
use crate::core::regression::RegressionMetrics;

/// Model type together with the aggregator it owns. An aggregator can only
/// exist under its own model type.
#[derive(Debug, Clone, PartialEq, Default)]
enum State {
    #[default]
    Unknown,
    Classification(Option<ConfusionMatrix>),
    Regression(Option<RegressionMetrics>),
    Nlp,
}

impl State {
    fn model_type(&self) -> ModelType {
        match self {
            State::Unknown => ModelType::Unknown,
            State::Classification(_) => ModelType::Classification,
            State::Regression(_) => ModelType::Regression,
            State::Nlp => ModelType::Nlp,
        }
    }

    fn is_populated(&self) -> bool {
        matches!(self, State::Classification(Some(_)) | State::Regression(Some(_)))
    }

    fn empty(model_type: ModelType) -> State {
        match model_type {
            ModelType::Unknown => State::Unknown,
            ModelType::Classification => State::Classification(None),
            ModelType::Regression => State::Regression(None),
            ModelType::Nlp => State::Nlp,
        }
    }
}

/// Model metrics: the model-type tag and whichever aggregator applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metrics {
    state: State,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics with a declared model type and no data yet.
    pub fn with_model_type(model_type: ModelType) -> Self {
        Self { state: State::empty(model_type) }
    }

    pub fn model_type(&self) -> ModelType {
        self.state.model_type()
    }

    /// Declare the model type explicitly.
    ///
    /// Fails if an aggregator of a different type already holds data.
    pub fn set_model_type(&mut self, model_type: ModelType) -> ProfileResult<()> {
        let current = self.model_type();
        if current == model_type {
            return Ok(());
        }
        if self.state.is_populated() {
            return Err(ProfileError::IncompatibleModelType { left: current, right: model_type });
        }
        self.state = State::empty(model_type);
        Ok(())
    }

    pub fn confusion_matrix(&self) -> Option<&ConfusionMatrix> {
        match &self.state {
            State::Classification(cm) => cm.as_ref(),
            _ => None,
        }
    }

    pub fn regression_metrics(&self) -> Option<&RegressionMetrics> {
        match &self.state {
            State::Regression(rm) => rm.as_ref(),
            _ => None,
        }
    }

    /// True when an aggregator holds data.
    pub fn is_populated(&self) -> bool {
        self.state.is_populated()
    }

    /// Aggregate one batch.
    ///
    /// The batch is built into a scratch aggregator and merged with the
    /// existing one; state is only replaced once both steps succeed.
    pub fn compute(
        &mut self,
        targets: &[Value],
        predictions: &[Value],
        scores: Option<&[f64]>,
        fields: &FieldNames,
        config: &ProfileConfig,
    ) -> ProfileResult<()> {
        if self.model_type() == ModelType::Nlp {
            return Err(ProfileError::NotImplemented("NLP metric computation".into()));
        }
        check_lengths(targets.len(), predictions.len(), scores.map(<[f64]>::len))?;
        if targets.is_empty() {
            log::trace!("empty batch, nothing to aggregate");
            return Ok(());
        }

        let model_type = match self.model_type() {
            ModelType::Unknown => {
                let inferred = infer_model_type(targets, predictions, scores.is_some());
                log::debug!("inferred model type {inferred} from {} records", targets.len());
                inferred
            }
            declared => declared,
        };

        let next = match model_type {
            ModelType::Classification => {
                let batch = ConfusionMatrix::from_batch(targets, predictions, scores, fields, config)?;
                let merged = match self.confusion_matrix() {
                    Some(existing) => existing.merge(&batch, config)?,
                    None => batch,
                };
                State::Classification(Some(merged))
            }
            ModelType::Regression => {
                if scores.is_some() {
                    log::debug!("scores are ignored for regression outputs");
                }
                let batch = RegressionMetrics::from_batch(targets, predictions, fields)?;
                let merged = match self.regression_metrics() {
                    Some(existing) => existing.merge(&batch)?,
                    None => batch,
                };
                State::Regression(Some(merged))
            }
            ModelType::Nlp => {
                return Err(ProfileError::NotImplemented("NLP metric computation".into()));
            }
            ModelType::Unknown => return Ok(()),
        };
        log::trace!("aggregated {} records as {model_type}", targets.len());
        self.state = next;
        Ok(())
    }

    /// Combine two metrics objects into a new one.
    ///
    /// Only two populated aggregators of different types conflict. Otherwise
    /// a populated side wins over an empty one, whatever type the empty side
    /// declares. When neither side holds data, an `Unknown` side defers to
    /// the other and a declared type on self is kept.
    pub fn merge(&self, other: &Metrics, config: &ProfileConfig) -> ProfileResult<Metrics> {
        let state = match (&self.state, &other.state) {
            (State::Classification(Some(a)), State::Classification(Some(b))) => {
                State::Classification(Some(a.merge(b, config)?))
            }
            (State::Regression(Some(a)), State::Regression(Some(b))) => State::Regression(Some(a.merge(b)?)),
            (left, right) if left.is_populated() && right.is_populated() => {
                return Err(ProfileError::IncompatibleModelType {
                    left: left.model_type(),
                    right: right.model_type(),
                })
            }
            (left, right) if right.is_populated() || left.model_type().is_unknown() => {
                if !left.model_type().is_unknown() && left.model_type() != right.model_type() {
                    log::debug!(
                        "empty {} metrics defer to {} data",
                        left.model_type(),
                        right.model_type()
                    );
                }
                right.clone()
            }
            (left, _) => left.clone(),
        };
        Ok(Metrics { state })
    }

    pub fn to_message(&self) -> ModelMetricsMessage {
        ModelMetricsMessage {
            model_type: self.model_type(),
            scored_matrix: self.confusion_matrix().map(ConfusionMatrix::to_message),
            regression_metrics: self.regression_metrics().map(RegressionMetrics::to_message),
        }
    }

    pub fn from_message(message: &ModelMetricsMessage) -> ProfileResult<Self> {
        let state = match (message.model_type, &message.scored_matrix, &message.regression_metrics) {
            (ModelType::Classification, matrix, None) => State::Classification(
                matrix.as_ref().map(ConfusionMatrix::from_message).transpose()?,
            ),
            (ModelType::Regression, None, regression) => State::Regression(
                regression.as_ref().map(RegressionMetrics::from_message).transpose()?,
            ),
            (model_type, None, None) => State::empty(model_type),
            (model_type, matrix, regression) => {
                return Err(ProfileError::Decode(format!(
                    "model type {model_type} cannot carry confusion matrix={} regression metrics={}",
                    matrix.is_some(),
                    regression.is_some()
                )))
            }
        };
        Ok(Metrics { state })
    }
}

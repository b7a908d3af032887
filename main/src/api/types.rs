//! Types shared by profile operations

use crate::api::error::{ProfileError, ProfileResult};
use std::fmt;
use std::str::FromStr;

/// Kind of prediction task a profile describes
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Nothing computed yet and nothing declared
    #[default]
    Unknown,
    Classification,
    Regression,
    /// Declared only; never inferred and never computed
    Nlp,
}

impl ModelType {
    pub fn is_unknown(self) -> bool {
        self == ModelType::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Unknown => "unknown",
            ModelType::Classification => "classification",
            ModelType::Regression => "regression",
            ModelType::Nlp => "nlp",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" => Ok(ModelType::Unknown),
            "classification" => Ok(ModelType::Classification),
            "regression" => Ok(ModelType::Regression),
            "nlp" => Ok(ModelType::Nlp),
            other => Err(format!(
                "unknown model type '{other}' (expected classification, regression, nlp or unknown)"
            )),
        }
    }
}

/// A single target or prediction cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    /// Parse a raw text cell, preferring integer, then finite float, then boolean.
    pub fn parse(raw: &str) -> Value {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        match trimmed {
            "true" | "True" | "TRUE" => Value::Boolean(true),
            "false" | "False" | "FALSE" => Value::Boolean(false),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    /// Numeric view of the value; `None` for text and booleans.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) | Value::Boolean(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// True for integers and for floats with no fractional part.
    pub fn is_integral(&self) -> bool {
        match self {
            Value::Integer(_) => true,
            Value::Float(f) => f.is_finite() && f.fract() == 0.0,
            Value::Text(_) | Value::Boolean(_) => false,
        }
    }

    /// Canonical label used as a confusion-matrix key.
    ///
    /// Integral floats render like integers, so `219.0` and `219` share a label.
    pub fn to_label(&self) -> ProfileResult<String> {
        match self {
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(f) if !f.is_finite() => Err(ProfileError::InvalidValue(format!(
                "non-finite label {f}"
            ))),
            // -0.0 shares the label of 0
            Value::Float(f) if *f == 0.0 => Ok("0".to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Boolean(b) => Ok(b.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Shape of a whole column, as seen by model-type inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Contains at least one text or boolean value
    Categorical,
    /// All numeric and all integral
    Discrete,
    /// All numeric with at least one fractional value
    Continuous,
}

impl ValueKind {
    /// Classify a column. Returns `None` for an empty column.
    pub fn of_column(values: &[Value]) -> Option<ValueKind> {
        if values.is_empty() {
            return None;
        }
        let mut kind = ValueKind::Discrete;
        for v in values {
            if !v.is_numeric() {
                return Some(ValueKind::Categorical);
            }
            if !v.is_integral() {
                kind = ValueKind::Continuous;
            }
        }
        Some(kind)
    }
}

/// Column names a batch was read from, carried on the aggregators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldNames {
    pub target_field: Option<String>,
    pub prediction_field: Option<String>,
    pub score_field: Option<String>,
}

impl FieldNames {
    pub fn new(target: impl Into<String>, prediction: impl Into<String>) -> Self {
        Self {
            target_field: Some(target.into()),
            prediction_field: Some(prediction.into()),
            score_field: None,
        }
    }

    pub fn with_score(mut self, score: impl Into<String>) -> Self {
        self.score_field = Some(score.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.target_field.is_none() && self.prediction_field.is_none() && self.score_field.is_none()
    }
}

/// One shard of `(target, prediction[, score])` records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub targets: Vec<Value>,
    pub predictions: Vec<Value>,
    pub scores: Option<Vec<f64>>,
}

impl Batch {
    pub fn new<T, P>(targets: impl IntoIterator<Item = T>, predictions: impl IntoIterator<Item = P>) -> Self
    where
        T: Into<Value>,
        P: Into<Value>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            predictions: predictions.into_iter().map(Into::into).collect(),
            scores: None,
        }
    }

    pub fn with_scores(mut self, scores: impl IntoIterator<Item = f64>) -> Self {
        self.scores = Some(scores.into_iter().collect());
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Append another batch's records. Scores are kept only if both sides
    /// carry them.
    pub fn extend(&mut self, other: &Batch) {
        self.targets.extend(other.targets.iter().cloned());
        self.predictions.extend(other.predictions.iter().cloned());
        self.scores = match (self.scores.take(), &other.scores) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            _ => None,
        };
    }
}

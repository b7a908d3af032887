//! Confusion matrix aggregation for classification outputs.

use crate::api::config::ProfileConfig;
use crate::api::error::{ProfileError, ProfileResult};
use crate::api::message::{CellMessage, ScoredMatrixMessage};
use crate::api::types::{FieldNames, Value};
use crate::core::checks::{check_lengths, merge_field};

/// One (target, prediction) cell: how often the pair occurred and the
/// statistics of the scores attached to those occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    count: u64,
    score_count: u64,
    score_sum: f64,
    score_min: Option<f64>,
    score_max: Option<f64>,
}

impl Cell {
    fn record(&mut self, score: Option<f64>) {
        self.count += 1;
        if let Some(s) = score {
            self.score_count += 1;
            self.score_sum += s;
            self.score_min = Some(self.score_min.map_or(s, |m| m.min(s)));
            self.score_max = Some(self.score_max.map_or(s, |m| m.max(s)));
        }
    }

    fn absorb(&mut self, other: &Cell) {
        self.count += other.count;
        self.score_count += other.score_count;
        self.score_sum += other.score_sum;
        self.score_min = min_opt(self.score_min, other.score_min);
        self.score_max = max_opt(self.score_max, other.score_max);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn score_count(&self) -> u64 {
        self.score_count
    }

    pub fn score_sum(&self) -> f64 {
        self.score_sum
    }

    pub fn score_min(&self) -> Option<f64> {
        self.score_min
    }

    pub fn score_max(&self) -> Option<f64> {
        self.score_max
    }

    pub fn mean_score(&self) -> Option<f64> {
        if self.score_count == 0 {
            None
        } else {
            Some(self.score_sum / self.score_count as f64)
        }
    }

    fn to_message(self) -> CellMessage {
        CellMessage {
            count: self.count,
            score_count: self.score_count,
            score_sum: self.score_sum,
            score_min: self.score_min,
            score_max: self.score_max,
        }
    }

    fn from_message(message: &CellMessage) -> ProfileResult<Cell> {
        if message.score_count > message.count {
            return Err(ProfileError::Decode(format!(
                "cell score_count {} exceeds count {}",
                message.score_count, message.count
            )));
        }
        let has_range = message.score_min.is_some() && message.score_max.is_some();
        if has_range != (message.score_count > 0) {
            return Err(ProfileError::Decode(
                "cell score range must be present exactly when scores were recorded".into(),
            ));
        }
        Ok(Cell {
            count: message.count,
            score_count: message.score_count,
            score_sum: message.score_sum,
            score_min: message.score_min,
            score_max: message.score_max,
        })
    }
}

fn min_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn max_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Confusion matrix over a sorted label set.
///
/// Cells are stored densely, row-major, with rows indexed by the target label
/// and columns by the predicted label. Labels are kept sorted so that two
/// matrices built from the same data in any order, or merged in any order,
/// are identical.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    cells: Vec<Cell>,
    target_field: Option<String>,
    prediction_field: Option<String>,
    score_field: Option<String>,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: &FieldNames) -> Self {
        Self {
            target_field: fields.target_field.clone(),
            prediction_field: fields.prediction_field.clone(),
            score_field: fields.score_field.clone(),
            ..Self::default()
        }
    }

    /// Build the matrix of a single batch.
    ///
    /// Lengths, labels and scores are all validated before the table is
    /// allocated.
    pub fn from_batch(
        targets: &[Value],
        predictions: &[Value],
        scores: Option<&[f64]>,
        fields: &FieldNames,
        config: &ProfileConfig,
    ) -> ProfileResult<Self> {
        check_lengths(targets.len(), predictions.len(), scores.map(<[f64]>::len))?;
        let target_labels = targets.iter().map(Value::to_label).collect::<ProfileResult<Vec<_>>>()?;
        let prediction_labels = predictions.iter().map(Value::to_label).collect::<ProfileResult<Vec<_>>>()?;
        if let Some(scores) = scores {
            if let Some((i, s)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
                return Err(ProfileError::InvalidValue(format!("score {i} is not finite: {s}")));
            }
        }

        let mut labels: Vec<String> = target_labels.iter().chain(prediction_labels.iter()).cloned().collect();
        labels.sort();
        labels.dedup();
        check_label_count(labels.len(), config)?;

        let mut matrix = Self::with_fields(fields);
        matrix.cells = vec![Cell::default(); labels.len() * labels.len()];
        matrix.labels = labels;
        for (i, (t, p)) in target_labels.iter().zip(prediction_labels.iter()).enumerate() {
            let row = matrix.index_of(t).ok_or_else(|| missing_label(t))?;
            let col = matrix.index_of(p).ok_or_else(|| missing_label(p))?;
            let idx = matrix.flat(row, col);
            matrix.cells[idx].record(scores.map(|s| s[i]));
        }
        Ok(matrix)
    }

    /// Combine two matrices into a new one over the union of their labels.
    pub fn merge(&self, other: &ConfusionMatrix, config: &ProfileConfig) -> ProfileResult<ConfusionMatrix> {
        let target_field = merge_field("target_field", &self.target_field, &other.target_field)?;
        let prediction_field =
            merge_field("prediction_field", &self.prediction_field, &other.prediction_field)?;
        let score_field = merge_field("score_field", &self.score_field, &other.score_field)?;

        let mut labels: Vec<String> = self.labels.iter().chain(other.labels.iter()).cloned().collect();
        labels.sort();
        labels.dedup();
        check_label_count(labels.len(), config)?;

        let mut merged = ConfusionMatrix {
            cells: vec![Cell::default(); labels.len() * labels.len()],
            labels,
            target_field,
            prediction_field,
            score_field,
        };
        merged.absorb(self)?;
        merged.absorb(other)?;
        Ok(merged)
    }

    fn absorb(&mut self, source: &ConfusionMatrix) -> ProfileResult<()> {
        let remap = source
            .labels
            .iter()
            .map(|l| self.index_of(l).ok_or_else(|| missing_label(l)))
            .collect::<ProfileResult<Vec<_>>>()?;
        let n = source.labels.len();
        for row in 0..n {
            for col in 0..n {
                let cell = &source.cells[row * n + col];
                let idx = self.flat(remap[row], remap[col]);
                self.cells[idx].absorb(cell);
            }
        }
        Ok(())
    }

    fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
    }

    fn flat(&self, row: usize, col: usize) -> usize {
        row * self.labels.len() + col
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn target_field(&self) -> Option<&str> {
        self.target_field.as_deref()
    }

    pub fn prediction_field(&self) -> Option<&str> {
        self.prediction_field.as_deref()
    }

    pub fn score_field(&self) -> Option<&str> {
        self.score_field.as_deref()
    }

    /// Cell for a (target, prediction) label pair, if both labels are known.
    pub fn cell(&self, target: &str, prediction: &str) -> Option<&Cell> {
        let row = self.index_of(target)?;
        let col = self.index_of(prediction)?;
        Some(&self.cells[self.flat(row, col)])
    }

    /// Occurrence count for a (target, prediction) pair; 0 for unknown labels.
    pub fn count(&self, target: &str, prediction: &str) -> u64 {
        self.cell(target, prediction).map_or(0, Cell::count)
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(Cell::count).sum()
    }

    /// Counts as a square table, rows = target, columns = prediction.
    pub fn count_table(&self) -> Vec<Vec<u64>> {
        let n = self.labels.len();
        (0..n)
            .map(|row| (0..n).map(|col| self.cells[row * n + col].count).collect())
            .collect()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let n = self.labels.len();
        let correct: u64 = (0..n).map(|i| self.cells[i * n + i].count).sum();
        correct as f64 / total as f64
    }

    /// Number of records whose target is `label`.
    pub fn support(&self, label: &str) -> u64 {
        let Some(row) = self.index_of(label) else { return 0 };
        let n = self.labels.len();
        (0..n).map(|col| self.cells[row * n + col].count).sum()
    }

    pub fn precision(&self, label: &str) -> f64 {
        let Some(col) = self.index_of(label) else { return 0.0 };
        let n = self.labels.len();
        let tp = self.cells[col * n + col].count;
        let predicted: u64 = (0..n).map(|row| self.cells[row * n + col].count).sum();
        if predicted == 0 {
            0.0
        } else {
            tp as f64 / predicted as f64
        }
    }

    pub fn recall(&self, label: &str) -> f64 {
        let Some(row) = self.index_of(label) else { return 0.0 };
        let n = self.labels.len();
        let tp = self.cells[row * n + row].count;
        let actual = self.support(label);
        if actual == 0 {
            0.0
        } else {
            tp as f64 / actual as f64
        }
    }

    pub fn f1(&self, label: &str) -> f64 {
        let p = self.precision(label);
        let r = self.recall(label);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn macro_f1(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.labels.iter().map(|l| self.f1(l)).sum();
        sum / self.labels.len() as f64
    }

    pub fn to_message(&self) -> ScoredMatrixMessage {
        ScoredMatrixMessage {
            labels: self.labels.clone(),
            target_field: self.target_field.clone(),
            prediction_field: self.prediction_field.clone(),
            score_field: self.score_field.clone(),
            cells: self.cells.iter().map(|c| c.to_message()).collect(),
        }
    }

    pub fn from_message(message: &ScoredMatrixMessage) -> ProfileResult<Self> {
        if message.labels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ProfileError::Decode(
                "confusion matrix labels must be sorted and unique".into(),
            ));
        }
        let n = message.labels.len();
        if message.cells.len() != n * n {
            return Err(ProfileError::Decode(format!(
                "confusion matrix has {} cells for {} labels (expected {})",
                message.cells.len(),
                n,
                n * n
            )));
        }
        let cells = message
            .cells
            .iter()
            .map(Cell::from_message)
            .collect::<ProfileResult<Vec<_>>>()?;
        Ok(Self {
            labels: message.labels.clone(),
            cells,
            target_field: message.target_field.clone(),
            prediction_field: message.prediction_field.clone(),
            score_field: message.score_field.clone(),
        })
    }
}

fn check_label_count(count: usize, config: &ProfileConfig) -> ProfileResult<()> {
    if count > config.max_labels {
        return Err(ProfileError::TooManyLabels { count, max: config.max_labels });
    }
    if count > config.label_warning_threshold {
        log::warn!(
            "confusion matrix has {} labels (warning threshold {}); merges grow quadratically",
            count,
            config.label_warning_threshold
        );
    }
    Ok(())
}

fn missing_label(label: &str) -> ProfileError {
    ProfileError::InvalidValue(format!("label '{label}' missing from label set"))
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use rustml_profile::{FieldNames, ModelProfile, ModelProfileMessage, ModelType, ProfileConfig, Value};

/// RustML Profile CLI: build profiles from CSV files, then merge or inspect them.
#[derive(Parser)]
#[command(name = "rustml-profile-cli", version, about)]
struct Cli {
    /// JSON file with label limits (max_labels, label_warning_threshold).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a profile from a CSV file with a header row.
    Compute {
        /// CSV file holding targets, predictions and optional scores.
        input: PathBuf,

        /// Where to write the encoded profile.
        #[arg(long)]
        out: PathBuf,

        /// Declare the model type instead of inferring it.
        #[arg(long)]
        model_type: Option<ModelType>,

        /// Output field to declare on the profile (repeatable).
        #[arg(long = "output-field")]
        output_fields: Vec<String>,

        #[arg(long, default_value = "target")]
        target_column: String,

        #[arg(long, default_value = "prediction")]
        prediction_column: String,

        /// Score column; ignored when the header does not contain it.
        #[arg(long, default_value = "score")]
        score_column: String,
    },

    /// Merge encoded profiles left to right.
    Merge {
        /// Profiles to merge.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Where to write the merged profile.
        #[arg(long)]
        out: PathBuf,
    },

    /// Print a JSON summary of an encoded profile.
    Show {
        /// Profile to inspect.
        input: PathBuf,

        /// Print the full wire message instead of the summary.
        #[arg(long)]
        raw: bool,
    },
}

struct Columns {
    targets: Vec<Value>,
    predictions: Vec<Value>,
    scores: Option<Vec<f64>>,
    fields: FieldNames,
}

fn read_columns(path: &Path, target: &str, prediction: &str, score: &str) -> Result<Columns> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?;

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let find = |name: &str| headers.iter().position(|h| h == name);
    let target_idx = find(target).with_context(|| format!("Missing target column '{target}'"))?;
    let prediction_idx =
        find(prediction).with_context(|| format!("Missing prediction column '{prediction}'"))?;
    let score_idx = find(score);

    let mut fields = FieldNames::new(target, prediction);
    if score_idx.is_some() {
        fields = fields.with_score(score);
    }

    let mut columns = Columns {
        targets: Vec::new(),
        predictions: Vec::new(),
        scores: score_idx.map(|_| Vec::new()),
        fields,
    };

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("CSV row {}", row_idx + 1))?;
        let cell = |idx: usize| {
            record
                .get(idx)
                .with_context(|| format!("row {}: missing column {idx}", row_idx + 1))
        };
        columns.targets.push(Value::parse(cell(target_idx)?));
        columns.predictions.push(Value::parse(cell(prediction_idx)?));
        if let (Some(idx), Some(scores)) = (score_idx, columns.scores.as_mut()) {
            let raw = cell(idx)?;
            let score: f64 = raw
                .parse()
                .with_context(|| format!("row {}: bad score '{raw}'", row_idx + 1))?;
            scores.push(score);
        }
    }
    Ok(columns)
}

fn read_profile(path: &Path, config: ProfileConfig) -> Result<ModelProfile> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read profile: {}", path.display()))?;
    let message = ModelProfileMessage::from_bytes(&bytes)
        .with_context(|| format!("Failed to decode profile: {}", path.display()))?;
    ModelProfile::from_message_with_config(&message, config)
        .with_context(|| format!("Invalid profile: {}", path.display()))
}

fn write_profile(profile: &ModelProfile, path: &Path) -> Result<()> {
    let bytes = profile.to_bytes().context("Failed to encode profile")?;
    fs::write(path, bytes).with_context(|| format!("Failed to write profile: {}", path.display()))
}

fn summary(profile: &ModelProfile) -> serde_json::Value {
    let metrics = profile.metrics();
    let confusion_matrix = metrics.confusion_matrix().map(|cm| {
        json!({
            "labels": cm.labels(),
            "counts": cm.count_table(),
            "total": cm.total(),
            "accuracy": cm.accuracy(),
            "macro_f1": cm.macro_f1(),
        })
    });
    let regression = metrics.regression_metrics().map(|rm| {
        json!({
            "count": rm.count(),
            "mean_absolute_error": rm.mean_absolute_error(),
            "mean_squared_error": rm.mean_squared_error(),
            "root_mean_squared_error": rm.root_mean_squared_error(),
            "r_squared": rm.r_squared(),
        })
    });
    json!({
        "model_type": profile.model_type(),
        "output_fields": profile.output_fields(),
        "confusion_matrix": confusion_matrix,
        "regression_metrics": regression,
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ProfileConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ProfileConfig::default(),
    };

    match &cli.command {
        Command::Compute {
            input,
            out,
            model_type,
            output_fields,
            target_column,
            prediction_column,
            score_column,
        } => {
            let columns = read_columns(input, target_column, prediction_column, score_column)?;
            let mut profile = ModelProfile::with_output_fields(output_fields.iter().cloned()).with_config(config);
            if let Some(model_type) = model_type {
                profile.set_model_type(*model_type)?;
            }
            profile
                .compute_metrics_with_fields(
                    &columns.targets,
                    &columns.predictions,
                    columns.scores.as_deref(),
                    &columns.fields,
                )
                .with_context(|| format!("Failed to profile {}", input.display()))?;
            eprintln!(
                "Profiled {} records as {}",
                columns.targets.len(),
                profile.model_type()
            );
            write_profile(&profile, out)?;
            println!("{}", out.display());
        }

        Command::Merge { inputs, out } => {
            let profiles = inputs
                .iter()
                .map(|path| read_profile(path, config))
                .collect::<Result<Vec<_>>>()?;
            let merged = ModelProfile::merge_all(&profiles).context("Failed to merge profiles")?;
            eprintln!("Merged {} profiles", profiles.len());
            write_profile(&merged, out)?;
            println!("{}", out.display());
        }

        Command::Show { input, raw } => {
            let profile = read_profile(input, config)?;
            let rendered = if *raw {
                serde_json::to_value(profile.to_message())?
            } else {
                summary(&profile)
            };
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
    }

    Ok(())
}

//! Profile configuration

use crate::api::error::{ProfileError, ProfileResult};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Limits applied while aggregating classification outputs.
///
/// Loaded from JSON; missing keys fall back to their defaults:
///
/// ```json
/// { "max_labels": 256, "label_warning_threshold": 64 }
/// ```
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Hard cap on distinct confusion-matrix labels.
    #[serde(default = "default_max_labels")]
    pub max_labels: usize,
    /// Label count above which a warning is logged.
    #[serde(default = "default_label_warning_threshold")]
    pub label_warning_threshold: usize,
}

fn default_max_labels() -> usize { 256 }
fn default_label_warning_threshold() -> usize { 64 }

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            max_labels: default_max_labels(),
            label_warning_threshold: default_label_warning_threshold(),
        }
    }
}

impl ProfileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ProfileResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: ProfileConfig = serde_json::from_reader(reader)
            .map_err(|e| ProfileError::Config(format!("parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ProfileResult<()> {
        if self.max_labels == 0 {
            return Err(ProfileError::Config("max_labels must be positive".into()));
        }
        if self.label_warning_threshold > self.max_labels {
            return Err(ProfileError::Config(format!(
                "label_warning_threshold ({}) exceeds max_labels ({})",
                self.label_warning_threshold, self.max_labels
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ProfileConfig::default();
        assert_eq!(config.max_labels, 256);
        assert_eq!(config.label_warning_threshold, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"max_labels\": 10, \"label_warning_threshold\": 4}}").unwrap();
        let config = ProfileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_labels, 10);
        assert_eq!(config.label_warning_threshold, 4);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        assert_eq!(ProfileConfig::from_file(file.path()).unwrap(), ProfileConfig::default());
    }

    #[test]
    fn test_threshold_above_max_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"max_labels\": 8}}").unwrap();
        let err = ProfileConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ProfileError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ProfileConfig::from_file("/nonexistent/rustml-profile.json").unwrap_err();
        assert!(matches!(err, ProfileError::Io(_)));
    }
}

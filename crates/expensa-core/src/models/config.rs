//! Configuration structures for the expense pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for expensa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpensaConfig {
    /// Dataset, model and report locations.
    pub storage: StorageConfig,

    /// Category classifier configuration.
    pub classifier: ClassifierConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// File locations. Relative file names are resolved against `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the dataset and the models.
    pub data_dir: PathBuf,

    /// Labeled expense dataset (CSV).
    pub dataset_file: String,

    /// Batch classifier state (JSON).
    pub model_file: String,

    /// Online learner state (JSON).
    pub online_file: String,

    /// Default export destination.
    pub export_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            dataset_file: "expenses.csv".to_string(),
            model_file: "category_model.json".to_string(),
            online_file: "online_learner.json".to_string(),
            export_file: "expense_report.csv".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(&self.model_file)
    }

    pub fn online_path(&self) -> PathBuf {
        self.data_dir.join(&self.online_file)
    }

    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join(&self.export_file)
    }
}

/// Category classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Retrain the batch model whenever the dataset size is a multiple of this.
    pub retrain_every: usize,

    /// Additive (Laplace) smoothing for both naive Bayes models.
    pub alpha: f64,

    /// Keep online learner statistics across restarts.
    pub persist_online_learner: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            retrain_every: 5,
            alpha: 1.0,
            persist_online_learner: true,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Warn when a document yields less text than this.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 20 }
    }
}

impl ExpensaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check values the pipeline cannot work with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.classifier.retrain_every == 0 {
            return Err(crate::ExpensaError::Config(
                "classifier.retrain_every must be at least 1".to_string(),
            ));
        }
        if self.classifier.alpha.is_nan() || self.classifier.alpha <= 0.0 {
            return Err(crate::ExpensaError::Config(
                "classifier.alpha must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

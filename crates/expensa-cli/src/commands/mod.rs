//! Subcommand implementations and the helpers they share.

pub mod batch;
pub mod config;
pub mod confirm;
pub mod export;
pub mod process;
pub mod reset;
pub mod train;

use std::path::{Path, PathBuf};

use tracing::debug;

use expensa_core::error::ClassifierError;
use expensa_core::models::config::ExpensaConfig;
use expensa_core::{ClassificationService, ExpensaError, FileStore};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("expensa")
        .join("config.json")
}

/// The config file in use: the `--config` flag or the default location.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load and validate configuration.
///
/// An explicit path must exist; the default location falls back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ExpensaConfig> {
    let config = match config_path {
        Some(path) => ExpensaConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e))?,
        None => {
            let default = default_config_path();
            if default.exists() {
                ExpensaConfig::from_file(&default)?
            } else {
                ExpensaConfig::default()
            }
        }
    };

    config.validate()?;
    debug!("Data directory: {}", config.storage.data_dir.display());
    Ok(config)
}

/// Open the classification service over the configured files.
pub fn open_service(config: &ExpensaConfig) -> anyhow::Result<ClassificationService<FileStore>> {
    let store = FileStore::from_config(&config.storage);

    match ClassificationService::load(store, config.classifier.clone()) {
        Ok(service) => Ok(service),
        Err(ExpensaError::Classifier(ClassifierError::Unavailable(path))) => anyhow::bail!(
            "No trained category model found at {}.\n\n\
             Run 'expensa train --from <labeled.csv>' to train one.",
            path.display()
        ),
        Err(e) => Err(e.into()),
    }
}

//! File-backed store: CSV dataset and JSON model files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{ExpenseStore, Result, StoreLock};
use crate::classify::{BatchClassifier, OnlineLearner};
use crate::error::PersistenceError;
use crate::models::config::StorageConfig;
use crate::models::expense::ExpenseRecord;

const HEADER: [&str; 5] = ["file", "value", "date", "description", "category"];

/// Store keeping everything in plain files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dataset_path: PathBuf,
    model_path: PathBuf,
    online_path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    pub fn new(
        dataset_path: impl Into<PathBuf>,
        model_path: impl Into<PathBuf>,
        online_path: impl Into<PathBuf>,
    ) -> Self {
        let dataset_path = dataset_path.into();
        Self {
            lock_path: dataset_path.with_extension("lock"),
            dataset_path,
            model_path: model_path.into(),
            online_path: online_path.into(),
        }
    }

    /// Store at the locations named by the configuration.
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(
            storage.dataset_path(),
            storage.model_path(),
            storage.online_path(),
        )
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Advisory lock file shared by every process using this dataset.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Create the dataset with only its header when it does not exist yet.
    pub fn ensure_dataset(&self) -> Result<()> {
        if self.dataset_path.exists() {
            return Ok(());
        }
        self.write_header()
    }

    fn write_header(&self) -> Result<()> {
        ensure_parent(&self.dataset_path)?;
        let mut writer = csv::Writer::from_path(&self.dataset_path)?;
        writer.write_record(HEADER)?;
        writer.flush().map_err(|e| PersistenceError::io(&self.dataset_path, e))?;
        debug!("Created dataset {}", self.dataset_path.display());
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))
        }
        _ => Ok(()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write JSON next to the target and rename it into place.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let content = serde_json::to_vec(value)?;
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
    tmp.write_all(&content)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PersistenceError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| PersistenceError::AtomicWrite {
        path: path.to_path_buf(),
        reason: e.error.to_string(),
    })?;
    Ok(())
}

impl ExpenseStore for FileStore {
    fn model_location(&self) -> PathBuf {
        self.model_path.clone()
    }

    fn load_model(&self) -> Result<Option<BatchClassifier>> {
        read_json(&self.model_path)
    }

    fn save_model(&self, model: &BatchClassifier) -> Result<()> {
        write_json_atomic(&self.model_path, model)?;
        info!("Saved category model to {}", self.model_path.display());
        Ok(())
    }

    fn append_records(&self, records: &[ExpenseRecord]) -> Result<()> {
        self.ensure_dataset()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.dataset_path)
            .map_err(|e| PersistenceError::io(&self.dataset_path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|e| PersistenceError::io(&self.dataset_path, e))?;

        debug!(
            "Appended {} rows to {}",
            records.len(),
            self.dataset_path.display()
        );
        Ok(())
    }

    fn load_records(&self) -> Result<Vec<ExpenseRecord>> {
        if !self.dataset_path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.dataset_path)?;

        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    fn reset(&self) -> Result<()> {
        if self.dataset_path.exists() {
            fs::remove_file(&self.dataset_path)
                .map_err(|e| PersistenceError::io(&self.dataset_path, e))?;
            info!("Removed dataset {}", self.dataset_path.display());
        }
        self.write_header()
    }

    fn lock_exclusive(&self) -> Result<StoreLock> {
        ensure_parent(&self.lock_path)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| PersistenceError::io(&self.lock_path, e))?;

        debug!("Waiting for lock {}", self.lock_path.display());
        FileExt::lock_exclusive(&file).map_err(|e| PersistenceError::io(&self.lock_path, e))?;
        Ok(StoreLock::held(file))
    }

    fn load_learner(&self) -> Result<Option<OnlineLearner>> {
        read_json(&self.online_path)
    }

    fn save_learner(&self, learner: &OnlineLearner) -> Result<()> {
        write_json_atomic(&self.online_path, learner)
    }
}

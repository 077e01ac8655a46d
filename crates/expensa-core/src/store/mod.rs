//! Persistence for the labeled dataset and classifier state.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fs::File;
use std::path::PathBuf;

use crate::classify::{BatchClassifier, OnlineLearner};
use crate::error::PersistenceError;
use crate::models::expense::{ExpenseRecord, LabeledExample};

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Exclusive hold on a store, released on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct StoreLock {
    _file: Option<File>,
}

impl StoreLock {
    /// A guard for stores that have no other writers to exclude.
    pub fn unlocked() -> Self {
        Self { _file: None }
    }

    pub(crate) fn held(file: File) -> Self {
        Self { _file: Some(file) }
    }
}

/// Storage backend for expense rows and models.
///
/// The dataset is append-only. Model writes must replace the previous model
/// atomically so a failed write never leaves a damaged model behind.
pub trait ExpenseStore {
    /// Where the batch model lives, for error messages.
    fn model_location(&self) -> PathBuf;

    /// Load the persisted batch model, if any.
    fn load_model(&self) -> Result<Option<BatchClassifier>>;

    /// Replace the persisted batch model.
    fn save_model(&self, model: &BatchClassifier) -> Result<()>;

    /// Append confirmed rows to the dataset.
    fn append_records(&self, records: &[ExpenseRecord]) -> Result<()>;

    /// Every stored row, including incomplete ones.
    fn load_records(&self) -> Result<Vec<ExpenseRecord>>;

    /// Remove every stored row.
    fn reset(&self) -> Result<()>;

    /// Load persisted online learner state, if any.
    fn load_learner(&self) -> Result<Option<OnlineLearner>>;

    /// Replace persisted online learner state.
    fn save_learner(&self, learner: &OnlineLearner) -> Result<()>;

    /// Block until no other writer, in this or another process, holds the store.
    fn lock_exclusive(&self) -> Result<StoreLock> {
        Ok(StoreLock::unlocked())
    }

    /// Append bare labeled examples.
    fn append_examples(&self, examples: &[LabeledExample]) -> Result<()> {
        let records: Vec<ExpenseRecord> = examples
            .iter()
            .map(|e| ExpenseRecord {
                file: String::new(),
                value: String::new(),
                date: String::new(),
                description: e.description.clone(),
                category: e.category.clone(),
            })
            .collect();
        self.append_records(&records)
    }

    /// Complete rows as labeled examples, in insertion order.
    fn load_all_examples(&self) -> Result<Vec<LabeledExample>> {
        Ok(self
            .load_records()?
            .iter()
            .filter_map(ExpenseRecord::labeled)
            .collect())
    }

    /// Number of complete rows (both description and category present).
    fn dataset_size(&self) -> Result<usize> {
        Ok(self.load_all_examples()?.len())
    }
}

//! In-memory store for embedding and tests.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::{ExpenseStore, Result};
use crate::classify::{BatchClassifier, OnlineLearner};
use crate::models::expense::ExpenseRecord;

#[derive(Debug, Default)]
struct State {
    records: Vec<ExpenseRecord>,
    model: Option<BatchClassifier>,
    learner: Option<OnlineLearner>,
    model_saves: usize,
}

/// Store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with a model.
    pub fn with_model(model: BatchClassifier) -> Self {
        let store = Self::new();
        store.lock().model = Some(model);
        store
    }

    /// How many times a model was saved.
    pub fn model_saves(&self) -> usize {
        self.lock().model_saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ExpenseStore for MemoryStore {
    fn model_location(&self) -> PathBuf {
        PathBuf::from("<memory>")
    }

    fn load_model(&self) -> Result<Option<BatchClassifier>> {
        Ok(self.lock().model.clone())
    }

    fn save_model(&self, model: &BatchClassifier) -> Result<()> {
        let mut state = self.lock();
        state.model = Some(model.clone());
        state.model_saves += 1;
        Ok(())
    }

    fn append_records(&self, records: &[ExpenseRecord]) -> Result<()> {
        self.lock().records.extend_from_slice(records);
        Ok(())
    }

    fn load_records(&self) -> Result<Vec<ExpenseRecord>> {
        Ok(self.lock().records.clone())
    }

    fn reset(&self) -> Result<()> {
        self.lock().records.clear();
        Ok(())
    }

    fn load_learner(&self) -> Result<Option<OnlineLearner>> {
        Ok(self.lock().learner.clone())
    }

    fn save_learner(&self, learner: &OnlineLearner) -> Result<()> {
        self.lock().learner = Some(learner.clone());
        Ok(())
    }
}

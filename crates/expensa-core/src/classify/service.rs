//! Owned classification state shared by predictions and confirmations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::{BatchClassifier, FeatureVector, OnlineLearner, RetrainDecision, RetrainPolicy};
use crate::error::ClassifierError;
use crate::models::config::ClassifierConfig;
use crate::models::expense::{validate_confirmations, Confirmation, LabeledExample};
use crate::store::ExpenseStore;
use crate::Result;

/// What happened to the batch model after a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrainStatus {
    /// The dataset size did not hit the retraining threshold.
    Skipped,
    /// A new model was built, persisted and is now serving.
    Completed { trained_on: usize },
    /// Retraining was due but failed; the previous model keeps serving.
    Failed(String),
}

/// Result of applying a confirmation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOutcome {
    /// Rows appended to the dataset.
    pub appended: usize,
    /// Examples absorbed by the online learner.
    pub learned: usize,
    /// Complete rows in the dataset after the append.
    pub dataset_size: usize,
    pub retrain: RetrainStatus,
}

/// Classification service.
///
/// Predictions read an immutable model behind a read lock and never wait on
/// a retrain. Confirmations serialize on a writer mutex and on the store's
/// exclusive lock, which also covers other processes sharing the same files.
/// Inside that section they append, learn, decide, retrain, persist and
/// finally swap the model handle.
pub struct ClassificationService<S: ExpenseStore> {
    store: S,
    settings: ClassifierConfig,
    policy: RetrainPolicy,
    model: RwLock<Arc<BatchClassifier>>,
    learner: Mutex<OnlineLearner>,
    writer: Mutex<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: ExpenseStore> ClassificationService<S> {
    /// Start from the persisted model.
    ///
    /// Fails with [`ClassifierError::Unavailable`] when no model was trained yet.
    pub fn load(store: S, settings: ClassifierConfig) -> Result<Self> {
        let model = store
            .load_model()?
            .ok_or_else(|| ClassifierError::Unavailable(store.model_location()))?;
        model.check()?;

        info!(
            "Loaded category model ({} examples, {} terms, trained {})",
            model.trained_on(),
            model.vocabulary_len(),
            model.trained_at().format("%Y-%m-%d %H:%M")
        );

        Self::with_model(store, settings, model)
    }

    /// Train a model on the stored dataset, persist it and start serving it.
    pub fn bootstrap(store: S, settings: ClassifierConfig) -> Result<Self> {
        let examples = store.load_all_examples()?;
        let model = BatchClassifier::train(&examples, settings.alpha)?;
        store.save_model(&model)?;
        Self::with_model(store, settings, model)
    }

    fn with_model(store: S, settings: ClassifierConfig, model: BatchClassifier) -> Result<Self> {
        let learner = if settings.persist_online_learner {
            store.load_learner()?.unwrap_or_else(|| OnlineLearner::new(settings.alpha))
        } else {
            OnlineLearner::new(settings.alpha)
        };
        debug!("Online learner has seen {} examples", learner.examples_seen());

        Ok(Self {
            policy: RetrainPolicy::new(settings.retrain_every),
            store,
            settings,
            model: RwLock::new(Arc::new(model)),
            learner: Mutex::new(learner),
            writer: Mutex::new(()),
        })
    }

    /// The model currently serving predictions.
    pub fn current_model(&self) -> Arc<BatchClassifier> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Predict a category. Always returns one of the trained categories.
    pub fn predict(&self, text: &str) -> String {
        self.current_model().predict(text).to_string()
    }

    pub fn vectorize(&self, text: &str) -> FeatureVector {
        self.current_model().vectorize(text)
    }

    /// The online learner's opinion, if it has learned anything yet.
    pub fn suggest(&self, text: &str) -> Option<String> {
        let features = self.vectorize(text);
        lock(&self.learner).predict_one(&features)
    }

    /// Snapshot of the online learner.
    pub fn online_snapshot(&self) -> OnlineLearner {
        lock(&self.learner).clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> RetrainPolicy {
        self.policy
    }

    /// Apply a batch of human-confirmed documents.
    ///
    /// The whole batch is validated before anything is written. Once rows are
    /// appended, a failing retrain is reported in the outcome rather than as an
    /// error, and the previous model stays in place.
    pub fn confirm(&self, batch: &[Confirmation]) -> Result<ConfirmOutcome> {
        validate_confirmations(batch)?;

        let _writer = lock(&self.writer);
        let _store_lock = self.store.lock_exclusive()?;

        let records: Vec<_> = batch.iter().map(Confirmation::record).collect();
        self.store.append_records(&records)?;

        let learned = self.learn(batch);

        let dataset_size = self.store.dataset_size()?;
        let examples: Vec<LabeledExample> = batch.iter().map(Confirmation::example).collect();

        let retrain = match self.policy.on_batch_confirmed(&examples, dataset_size) {
            RetrainDecision::Skip => RetrainStatus::Skipped,
            RetrainDecision::Retrain => match self.rebuild() {
                Ok(model) => RetrainStatus::Completed {
                    trained_on: model.trained_on(),
                },
                Err(e) => {
                    warn!("Retraining at dataset size {} failed: {}", dataset_size, e);
                    RetrainStatus::Failed(e.to_string())
                }
            },
        };

        info!(
            "Confirmed {} documents (dataset size {}, retrain {:?})",
            records.len(),
            dataset_size,
            retrain
        );

        Ok(ConfirmOutcome {
            appended: records.len(),
            learned,
            dataset_size,
            retrain,
        })
    }

    /// Retrain from the full dataset right away.
    pub fn retrain_now(&self) -> Result<Arc<BatchClassifier>> {
        let _writer = lock(&self.writer);
        let _store_lock = self.store.lock_exclusive()?;
        self.rebuild()
    }

    fn learn(&self, batch: &[Confirmation]) -> usize {
        let model = self.current_model();
        let mut learner = lock(&self.learner);

        // Another process may have learned since this one started.
        if self.settings.persist_online_learner {
            match self.store.load_learner() {
                Ok(Some(stored)) => *learner = stored,
                Ok(None) => {}
                Err(e) => warn!("Failed to reload online learner: {}", e),
            }
        }

        let learned = batch
            .iter()
            .filter(|c| learner.learn_one(&model.vectorize(&c.full_description), &c.category))
            .count();

        if self.settings.persist_online_learner {
            if let Err(e) = self.store.save_learner(&learner) {
                warn!("Failed to save online learner: {}", e);
            }
        }

        learned
    }

    // Caller holds the writer and store locks.
    fn rebuild(&self) -> Result<Arc<BatchClassifier>> {
        let examples = self.store.load_all_examples()?;
        let model = self.current_model().retrain(&examples)?;
        self.store.save_model(&model)?;

        let model = Arc::new(model);
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&model);

        info!(
            "Retrained category model on {} examples ({} categories)",
            model.trained_on(),
            model.categories().len()
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CorrectionError, PersistenceError};
    use crate::models::expense::ExpenseRecord;
    use crate::store::{FileStore, MemoryStore};
    use crate::ExpensaError;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn seed() -> Vec<LabeledExample> {
        vec![
            LabeledExample::new("Lunch at the diner", "Food"),
            LabeledExample::new("Coffee and croissant", "Food"),
            LabeledExample::new("Taxi to the airport", "Transport"),
        ]
    }

    fn service() -> ClassificationService<MemoryStore> {
        let store = MemoryStore::new();
        store.append_examples(&seed()).unwrap();
        ClassificationService::bootstrap(store, ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn test_load_requires_model() {
        let result = ClassificationService::load(MemoryStore::new(), ClassifierConfig::default());
        assert!(matches!(
            result,
            Err(ExpensaError::Classifier(ClassifierError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_load_existing_model() {
        let model = BatchClassifier::train(&seed(), 1.0).unwrap();
        let service =
            ClassificationService::load(MemoryStore::with_model(model), ClassifierConfig::default())
                .unwrap();
        assert_eq!(service.predict("taxi"), "Transport");
    }

    #[test]
    fn test_invalid_batch_is_not_applied() {
        let service = service();
        let batch = vec![
            Confirmation::new("Bus ticket", "Transport"),
            Confirmation::new("   ", "Food"),
        ];

        let err = service.confirm(&batch).unwrap_err();
        assert!(matches!(
            err,
            ExpensaError::Correction(CorrectionError::MissingField { index: 1, .. })
        ));
        assert_eq!(service.store().dataset_size().unwrap(), 3);
        assert_eq!(service.online_snapshot().examples_seen(), 0);

        assert!(matches!(
            service.confirm(&[]),
            Err(ExpensaError::Correction(CorrectionError::EmptyBatch))
        ));
    }

    #[test]
    fn test_retrain_schedule() {
        let service = service();

        let outcome = service
            .confirm(&[Confirmation::new("Bus ticket downtown", "Transport")])
            .unwrap();
        assert_eq!(outcome.dataset_size, 4);
        assert_eq!(outcome.retrain, RetrainStatus::Skipped);
        // unknown terms: equal priors, first category
        assert_eq!(service.predict("printer paper box"), "Food");

        let outcome = service
            .confirm(&[Confirmation::new("Printer paper box", "Office")])
            .unwrap();
        assert_eq!(outcome.dataset_size, 5);
        assert_eq!(outcome.retrain, RetrainStatus::Completed { trained_on: 5 });
        assert_eq!(service.predict("printer paper box"), "Office");
        assert_eq!(service.store().model_saves(), 2);

        let outcome = service
            .confirm(&[Confirmation::new("Train ticket", "Transport")])
            .unwrap();
        assert_eq!(outcome.dataset_size, 6);
        assert_eq!(outcome.retrain, RetrainStatus::Skipped);

        let batch: Vec<_> = ["Pizza", "Sushi", "Salad", "Soup"]
            .iter()
            .map(|d| Confirmation::new(*d, "Food"))
            .collect();
        let outcome = service.confirm(&batch).unwrap();
        assert_eq!(outcome.appended, 4);
        assert_eq!(outcome.dataset_size, 10);
        assert_eq!(outcome.retrain, RetrainStatus::Completed { trained_on: 10 });
        assert_eq!(service.store().model_saves(), 3);
    }

    #[test]
    fn test_online_learner_absorbs_full_description() {
        let service = service();
        assert_eq!(service.suggest("taxi"), None);

        let mut taxi = Confirmation::new("Taxi", "Transport");
        taxi.full_description = "Taxi to the airport".to_string();
        let mut noise = Confirmation::new("Unreadable", "Food");
        noise.full_description = "?!".to_string();

        let outcome = service.confirm(&[taxi, noise]).unwrap();
        assert_eq!(outcome.appended, 2);
        assert_eq!(outcome.learned, 1);
        assert_eq!(service.suggest("airport taxi"), Some("Transport".to_string()));

        let saved = service.store().load_learner().unwrap().unwrap();
        assert_eq!(saved, service.online_snapshot());
    }

    #[test]
    fn test_online_learner_survives_retrain() {
        let service = service();
        service
            .confirm(&[Confirmation::new("Taxi downtown", "Transport")])
            .unwrap();
        let outcome = service
            .confirm(&[Confirmation::new("Coffee beans", "Food")])
            .unwrap();
        assert!(matches!(outcome.retrain, RetrainStatus::Completed { .. }));
        assert_eq!(service.online_snapshot().examples_seen(), 2);
    }

    #[test]
    fn test_retrain_now() {
        let service = service();
        service
            .store()
            .append_examples(&[LabeledExample::new("Printer paper box", "Office")])
            .unwrap();
        assert_eq!(service.predict("printer paper box"), "Food");

        let model = service.retrain_now().unwrap();
        assert_eq!(model.trained_on(), 4);
        assert_eq!(service.predict("printer paper box"), "Office");
    }

    /// Memory store with switchable write failures.
    #[derive(Default)]
    struct FaultyStore {
        inner: MemoryStore,
        fail_model_saves: bool,
        fail_appends: bool,
    }

    fn write_failure() -> PersistenceError {
        PersistenceError::AtomicWrite {
            path: PathBuf::from("<memory>"),
            reason: "read-only".to_string(),
        }
    }

    impl ExpenseStore for FaultyStore {
        fn model_location(&self) -> PathBuf {
            self.inner.model_location()
        }
        fn load_model(&self) -> crate::store::Result<Option<BatchClassifier>> {
            self.inner.load_model()
        }
        fn save_model(&self, model: &BatchClassifier) -> crate::store::Result<()> {
            if self.fail_model_saves {
                return Err(write_failure());
            }
            self.inner.save_model(model)
        }
        fn append_records(&self, records: &[ExpenseRecord]) -> crate::store::Result<()> {
            if self.fail_appends {
                return Err(write_failure());
            }
            self.inner.append_records(records)
        }
        fn load_records(&self) -> crate::store::Result<Vec<ExpenseRecord>> {
            self.inner.load_records()
        }
        fn reset(&self) -> crate::store::Result<()> {
            self.inner.reset()
        }
        fn load_learner(&self) -> crate::store::Result<Option<OnlineLearner>> {
            self.inner.load_learner()
        }
        fn save_learner(&self, learner: &OnlineLearner) -> crate::store::Result<()> {
            self.inner.save_learner(learner)
        }
    }

    #[test]
    fn test_failed_retrain_keeps_previous_model() {
        let inner = MemoryStore::with_model(BatchClassifier::train(&seed(), 1.0).unwrap());
        inner.append_examples(&seed()).unwrap();
        inner
            .append_examples(&[LabeledExample::new("Bus ticket downtown", "Transport")])
            .unwrap();
        let store = FaultyStore {
            inner,
            fail_model_saves: true,
            ..FaultyStore::default()
        };
        let service = ClassificationService::load(store, ClassifierConfig::default()).unwrap();

        let outcome = service
            .confirm(&[Confirmation::new("Printer paper box", "Office")])
            .unwrap();

        assert_eq!(outcome.dataset_size, 5);
        assert!(matches!(outcome.retrain, RetrainStatus::Failed(_)));
        assert_eq!(service.current_model().trained_on(), 3);
        assert_eq!(service.predict("printer paper box"), "Food");
        assert_eq!(service.store().dataset_size().unwrap(), 5);
    }

    #[test]
    fn test_failed_append_changes_nothing() {
        let inner = MemoryStore::with_model(BatchClassifier::train(&seed(), 1.0).unwrap());
        inner.append_examples(&seed()).unwrap();
        let store = FaultyStore {
            inner,
            fail_appends: true,
            ..FaultyStore::default()
        };
        let service = ClassificationService::load(store, ClassifierConfig::default()).unwrap();

        // one more row would hit the retrain threshold
        let batch = [
            Confirmation::new("Taxi downtown", "Transport"),
            Confirmation::new("Coffee beans", "Food"),
        ];
        let err = service.confirm(&batch).unwrap_err();

        assert!(matches!(err, ExpensaError::Persistence(_)));
        assert_eq!(service.online_snapshot().examples_seen(), 0);
        assert!(service.store().inner.load_learner().unwrap().is_none());
        assert_eq!(service.store().inner.model_saves(), 0);
        assert_eq!(service.store().dataset_size().unwrap(), 3);
    }

    #[test]
    fn test_services_sharing_files_keep_every_learned_example() {
        let dir = tempfile::TempDir::new().unwrap();
        let open_store = || {
            FileStore::new(
                dir.path().join("expenses.csv"),
                dir.path().join("model.json"),
                dir.path().join("online.json"),
            )
        };

        let store = open_store();
        store.append_examples(&seed()).unwrap();
        let first = ClassificationService::bootstrap(store, ClassifierConfig::default()).unwrap();
        let second =
            ClassificationService::load(open_store(), ClassifierConfig::default()).unwrap();

        first
            .confirm(&[Confirmation::new("Taxi downtown", "Transport")])
            .unwrap();
        let outcome = second
            .confirm(&[Confirmation::new("Coffee beans", "Food")])
            .unwrap();

        assert_eq!(outcome.dataset_size, 5);
        let persisted = open_store().load_learner().unwrap().unwrap();
        assert_eq!(persisted.examples_seen(), 2);
        assert_eq!(second.online_snapshot(), persisted);
    }

    #[test]
    fn test_concurrent_predictions_during_confirm() {
        let service = service();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let category = service.predict("taxi to the airport");
                        assert!(["Food", "Office", "Transport"].contains(&category.as_str()));
                    }
                });
            }
            scope.spawn(|| {
                service
                    .confirm(&[
                        Confirmation::new("Bus ticket downtown", "Transport"),
                        Confirmation::new("Printer paper box", "Office"),
                    ])
                    .unwrap();
            });
        });

        assert_eq!(service.current_model().trained_on(), 5);
    }
}

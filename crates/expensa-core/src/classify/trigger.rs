//! Retraining cadence for the batch classifier.

use tracing::debug;

use crate::models::expense::LabeledExample;

/// Outcome of a retraining decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrainDecision {
    Retrain,
    Skip,
}

/// Retrain whenever the dataset size reaches a positive multiple of `every`.
#[derive(Debug, Clone, Copy)]
pub struct RetrainPolicy {
    every: usize,
}

impl RetrainPolicy {
    /// Create a policy. A threshold of zero is treated as one.
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }

    pub fn every(&self) -> usize {
        self.every
    }

    /// Decide after a batch of confirmations has been appended.
    ///
    /// Only the dataset size after the append matters; the batch itself is
    /// only logged.
    pub fn on_batch_confirmed(
        &self,
        newly_confirmed: &[LabeledExample],
        dataset_size_after_append: usize,
    ) -> RetrainDecision {
        let decision =
            if dataset_size_after_append > 0 && dataset_size_after_append % self.every == 0 {
                RetrainDecision::Retrain
            } else {
                RetrainDecision::Skip
            };
        debug!(
            "{} newly confirmed, dataset size {}, every {}: {:?}",
            newly_confirmed.len(),
            dataset_size_after_append,
            self.every,
            decision
        );
        decision
    }
}

impl Default for RetrainPolicy {
    fn default() -> Self {
        Self::new(5)
    }
}

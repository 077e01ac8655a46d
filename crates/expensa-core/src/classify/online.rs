//! Incrementally trained multinomial naive Bayes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::FeatureVector;

/// Online learner absorbing one confirmed example at a time.
///
/// It shares the batch classifier's feature space but keeps its own counts,
/// so corrections show up immediately without a full retrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineLearner {
    alpha: f64,
    /// Examples seen per label.
    class_counts: BTreeMap<String, u64>,
    /// Accumulated weight per feature per label.
    feature_counts: BTreeMap<usize, BTreeMap<String, f64>>,
    /// Accumulated weight per label.
    class_totals: BTreeMap<String, f64>,
}

impl OnlineLearner {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            class_counts: BTreeMap::new(),
            feature_counts: BTreeMap::new(),
            class_totals: BTreeMap::new(),
        }
    }

    /// Update the counts with one labeled example.
    ///
    /// An empty vector carries no signal and is skipped. Returns whether the
    /// example was learned.
    pub fn learn_one(&mut self, features: &FeatureVector, label: &str) -> bool {
        if features.is_empty() {
            trace!("skipping empty feature vector for {:?}", label);
            return false;
        }

        *self.class_counts.entry(label.to_string()).or_insert(0) += 1;

        let total = self.class_totals.entry(label.to_string()).or_insert(0.0);
        for (&index, &weight) in features {
            *self
                .feature_counts
                .entry(index)
                .or_default()
                .entry(label.to_string())
                .or_insert(0.0) += weight;
            *total += weight;
        }

        true
    }

    /// Unnormalized log posterior per label learned so far.
    pub fn joint_log_likelihood(&self, features: &FeatureVector) -> BTreeMap<String, f64> {
        let n_examples = self.examples_seen() as f64;
        let n_terms = self.feature_counts.len() as f64;

        self.class_counts
            .iter()
            .map(|(label, &count)| {
                let total = self.class_totals.get(label).copied().unwrap_or(0.0);
                let denominator = total + self.alpha * n_terms;

                let likelihood: f64 = features
                    .iter()
                    .map(|(index, &weight)| {
                        let seen = self
                            .feature_counts
                            .get(index)
                            .and_then(|per_label| per_label.get(label))
                            .copied()
                            .unwrap_or(0.0);
                        weight * ((seen + self.alpha) / denominator).ln()
                    })
                    .sum();

                (label.clone(), (count as f64 / n_examples).ln() + likelihood)
            })
            .collect()
    }

    /// Most likely label, or `None` before anything was learned.
    pub fn predict_one(&self, features: &FeatureVector) -> Option<String> {
        self.joint_log_likelihood(features)
            .into_iter()
            .fold(None, |best: Option<(String, f64)>, (label, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((label, score)),
            })
            .map(|(label, _)| label)
    }

    /// Total number of examples learned.
    pub fn examples_seen(&self) -> u64 {
        self.class_counts.values().sum()
    }

    /// Examples learned for one label.
    pub fn label_count(&self, label: &str) -> u64 {
        self.class_counts.get(label).copied().unwrap_or(0)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.class_counts.keys().map(String::as_str)
    }
}

impl Default for OnlineLearner {
    fn default() -> Self {
        Self::new(1.0)
    }
}

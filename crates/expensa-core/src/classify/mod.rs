//! Category classification: batch model, online learner and retraining.

mod batch;
mod naive_bayes;
mod online;
mod service;
mod trigger;
mod vectorizer;

use std::collections::BTreeMap;

pub use batch::BatchClassifier;
pub use naive_bayes::MultinomialNb;
pub use online::OnlineLearner;
pub use service::{ClassificationService, ConfirmOutcome, RetrainStatus};
pub use trigger::{RetrainDecision, RetrainPolicy};
pub use vectorizer::{tokenize, TfidfVectorizer};

/// Sparse feature vector: vocabulary index to weight.
pub type FeatureVector = BTreeMap<usize, f64>;

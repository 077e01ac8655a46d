//! Batch classifier: TF-IDF vectorizer followed by multinomial naive Bayes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::naive_bayes::MultinomialNb;
use super::vectorizer::TfidfVectorizer;
use super::FeatureVector;
use crate::error::ClassifierError;
use crate::models::expense::LabeledExample;

/// Trained category classifier used for live predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchClassifier {
    vectorizer: TfidfVectorizer,
    model: MultinomialNb,
    /// Number of examples the model was trained on.
    trained_on: usize,
    /// Training time.
    trained_at: DateTime<Utc>,
}

impl BatchClassifier {
    /// Train from scratch on a labeled dataset.
    ///
    /// Duplicate descriptions and single-category datasets are accepted.
    pub fn train(examples: &[LabeledExample], alpha: f64) -> Result<Self, ClassifierError> {
        if examples.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }

        let vectorizer =
            TfidfVectorizer::fit(examples.iter().map(|e| e.description.as_str()))?;

        let samples: Vec<(FeatureVector, &str)> = examples
            .iter()
            .map(|e| (vectorizer.transform(&e.description), e.category.as_str()))
            .collect();

        let model = MultinomialNb::fit(&samples, vectorizer.len(), alpha)?;

        info!(
            "Trained category model on {} examples ({} terms, {} categories)",
            examples.len(),
            vectorizer.len(),
            model.classes().len()
        );

        Ok(Self {
            vectorizer,
            model,
            trained_on: examples.len(),
            trained_at: Utc::now(),
        })
    }

    /// Build a replacement model from the full dataset with the same settings.
    pub fn retrain(&self, dataset: &[LabeledExample]) -> Result<Self, ClassifierError> {
        Self::train(dataset, self.model.alpha())
    }

    /// Map text into this model's feature space.
    pub fn vectorize(&self, text: &str) -> FeatureVector {
        self.vectorizer.transform(text)
    }

    /// Predict the category of a document.
    pub fn predict(&self, text: &str) -> &str {
        let features = self.vectorize(text);
        let category = self.model.predict(&features);
        debug!(
            "Predicted {:?} from {} known terms",
            category,
            features.len()
        );
        category
    }

    /// Categories the model can predict, sorted.
    pub fn categories(&self) -> &[String] {
        self.model.classes()
    }

    pub fn trained_on(&self) -> usize {
        self.trained_on
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vectorizer.len()
    }

    /// Verify internal tables after deserialization.
    pub fn check(&self) -> Result<(), ClassifierError> {
        self.vectorizer.check()?;
        self.model.check(self.vectorizer.len())
    }

    /// Model parameters without training metadata, for comparisons.
    pub fn same_parameters(&self, other: &Self) -> bool {
        self.vectorizer == other.vectorizer && self.model == other.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Vec<LabeledExample> {
        vec![
            LabeledExample::new("Lunch at the diner", "Food"),
            LabeledExample::new("Coffee and croissant", "Food"),
            LabeledExample::new("Taxi to the airport", "Transport"),
            LabeledExample::new("Bus ticket downtown", "Transport"),
            LabeledExample::new("Office chair and desk lamp", "Office"),
            LabeledExample::new("Printer paper box", "Office"),
        ]
    }

    #[test]
    fn test_predicts_training_categories() {
        let model = BatchClassifier::train(&dataset(), 1.0).unwrap();
        assert_eq!(model.predict("taxi ride to the airport"), "Transport");
        assert_eq!(model.predict("coffee with a croissant"), "Food");
        assert_eq!(model.predict("new desk lamp"), "Office");
        assert_eq!(model.categories(), ["Food", "Office", "Transport"]);
        assert_eq!(model.trained_on(), 6);
    }

    #[test]
    fn test_unknown_text_still_predicts() {
        let model = BatchClassifier::train(&dataset(), 1.0).unwrap();
        // no known terms: equal priors, so the first category wins
        assert_eq!(model.predict(""), "Food");
        assert_eq!(model.predict("zzz qqq"), "Food");
    }

    #[test]
    fn test_training_is_deterministic() {
        let a = BatchClassifier::train(&dataset(), 1.0).unwrap();
        let b = BatchClassifier::train(&dataset(), 1.0).unwrap();
        assert!(a.same_parameters(&b));
    }

    #[test]
    fn test_degenerate_datasets() {
        let dupes = vec![
            LabeledExample::new("Taxi", "Transport"),
            LabeledExample::new("Taxi", "Transport"),
        ];
        let model = BatchClassifier::train(&dupes, 1.0).unwrap();
        assert_eq!(model.predict("anything at all"), "Transport");
        assert_eq!(model.categories().len(), 1);
    }

    #[test]
    fn test_retrain_replaces_vocabulary() {
        let model = BatchClassifier::train(&dataset()[..2], 1.0).unwrap();
        let retrained = model.retrain(&dataset()).unwrap();
        assert!(retrained.vocabulary_len() > model.vocabulary_len());
        assert_eq!(retrained.predict("taxi"), "Transport");
    }

    #[test]
    fn test_training_errors() {
        assert!(matches!(
            BatchClassifier::train(&[], 1.0),
            Err(ClassifierError::EmptyDataset)
        ));
        assert!(matches!(
            BatchClassifier::train(&[LabeledExample::new("!", "x")], 1.0),
            Err(ClassifierError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_model_survives_json() {
        let model = BatchClassifier::train(&dataset(), 1.0).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: BatchClassifier = serde_json::from_str(&json).unwrap();
        assert!(back.check().is_ok());
        assert!(back.same_parameters(&model));
    }
}

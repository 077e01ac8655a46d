//! Multinomial naive Bayes trained in one pass over a labeled corpus.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FeatureVector;
use crate::error::ClassifierError;

/// Batch multinomial naive Bayes.
///
/// Classes are kept in sorted order; ties are broken towards the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    /// `[class][feature]` log P(feature | class).
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fit from feature vectors and their labels.
    pub fn fit(
        samples: &[(FeatureVector, &str)],
        n_features: usize,
        alpha: f64,
    ) -> Result<Self, ClassifierError> {
        if samples.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }

        let mut counts: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
        for (features, label) in samples {
            let (seen, totals) = counts
                .entry(*label)
                .or_insert_with(|| (0, vec![0.0; n_features]));
            *seen += 1;
            for (&index, &weight) in features {
                if index < n_features {
                    totals[index] += weight;
                }
            }
        }

        let n_samples = samples.len() as f64;
        let mut classes = Vec::with_capacity(counts.len());
        let mut class_log_prior = Vec::with_capacity(counts.len());
        let mut feature_log_prob = Vec::with_capacity(counts.len());

        for (label, (seen, totals)) in counts {
            let denominator = totals.iter().sum::<f64>() + alpha * n_features as f64;
            classes.push(label.to_string());
            class_log_prior.push((seen as f64 / n_samples).ln());
            feature_log_prob.push(
                totals
                    .iter()
                    .map(|count| ((count + alpha) / denominator).ln())
                    .collect(),
            );
        }

        Ok(Self {
            alpha,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Unnormalized log posterior for every class, in [`classes`](Self::classes) order.
    pub fn joint_log_likelihood(&self, features: &FeatureVector) -> Vec<f64> {
        self.classes
            .iter()
            .enumerate()
            .map(|(c, _)| {
                let log_prob = &self.feature_log_prob[c];
                features
                    .iter()
                    .filter(|(index, _)| **index < log_prob.len())
                    .map(|(&index, &weight)| weight * log_prob[index])
                    .sum::<f64>()
                    + self.class_log_prior[c]
            })
            .collect()
    }

    /// Most likely class. With an empty vector this is the most frequent class.
    pub fn predict(&self, features: &FeatureVector) -> &str {
        let scores = self.joint_log_likelihood(features);
        let mut best = 0;
        for (c, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = c;
            }
        }
        &self.classes[best]
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub(crate) fn check(&self, n_features: usize) -> Result<(), ClassifierError> {
        let consistent = !self.classes.is_empty()
            && self.class_log_prior.len() == self.classes.len()
            && self.feature_log_prob.len() == self.classes.len()
            && self.feature_log_prob.iter().all(|row| row.len() == n_features);

        if consistent {
            Ok(())
        } else {
            Err(ClassifierError::Corrupt(
                "class tables do not match the vocabulary".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(usize, f64)]) -> FeatureVector {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_fit_and_predict() {
        let samples = vec![
            (vector(&[(0, 1.0)]), "food"),
            (vector(&[(0, 0.8), (1, 0.2)]), "food"),
            (vector(&[(2, 1.0)]), "transport"),
        ];
        let nb = MultinomialNb::fit(&samples, 3, 1.0).unwrap();

        assert_eq!(nb.classes(), ["food".to_string(), "transport".to_string()]);
        assert_eq!(nb.predict(&vector(&[(0, 1.0)])), "food");
        assert_eq!(nb.predict(&vector(&[(2, 1.0)])), "transport");
    }

    #[test]
    fn test_empty_vector_predicts_majority_class() {
        let samples = vec![
            (vector(&[(0, 1.0)]), "b"),
            (vector(&[(1, 1.0)]), "a"),
            (vector(&[(0, 1.0)]), "b"),
        ];
        let nb = MultinomialNb::fit(&samples, 2, 1.0).unwrap();
        assert_eq!(nb.predict(&FeatureVector::new()), "b");
    }

    #[test]
    fn test_single_class() {
        let samples = vec![(vector(&[(0, 1.0)]), "only"), (vector(&[(0, 1.0)]), "only")];
        let nb = MultinomialNb::fit(&samples, 1, 1.0).unwrap();
        assert_eq!(nb.predict(&vector(&[(0, 1.0)])), "only");
        assert_eq!(nb.class_log_prior, vec![0.0]);
    }

    #[test]
    fn test_feature_probabilities_are_smoothed() {
        let samples = vec![(vector(&[(0, 2.0)]), "x")];
        let nb = MultinomialNb::fit(&samples, 2, 1.0).unwrap();
        // (2 + 1) / (2 + 2) and (0 + 1) / (2 + 2)
        assert!((nb.feature_log_prob[0][0] - (0.75f64).ln()).abs() < 1e-12);
        assert!((nb.feature_log_prob[0][1] - (0.25f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_samples() {
        assert!(matches!(
            MultinomialNb::fit(&[], 3, 1.0),
            Err(ClassifierError::EmptyDataset)
        ));
    }
}

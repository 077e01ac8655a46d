//! TF-IDF text vectorizer.

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::FeatureVector;
use crate::error::ClassifierError;

lazy_static! {
    // Words of two or more word characters
    static ref TOKEN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

/// Lowercase and split text into terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Vocabulary plus smoothed inverse document frequencies.
///
/// Feature indices follow the alphabetical order of the vocabulary, so the
/// same corpus always yields the same feature space. Vectors are term counts
/// weighted by idf and L2-normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights from a corpus.
    pub fn fit<'a, I>(documents: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut n_documents = 0usize;

        for document in documents {
            n_documents += 1;
            let terms: BTreeSet<String> = tokenize(document).into_iter().collect();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if n_documents == 0 {
            return Err(ClassifierError::EmptyDataset);
        }
        if document_frequency.is_empty() {
            return Err(ClassifierError::EmptyVocabulary);
        }

        let n = n_documents as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self { vocabulary, idf })
    }

    /// Map text into the learned feature space.
    ///
    /// Unknown terms are ignored; text without known terms yields an empty
    /// vector.
    pub fn transform(&self, text: &str) -> FeatureVector {
        let mut vector = FeatureVector::new();

        for term in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *vector.entry(index).or_insert(0.0) += 1.0;
            }
        }

        for (index, weight) in vector.iter_mut() {
            *weight *= self.idf[*index];
        }

        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }

        vector
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    /// Index of a term, if it is part of the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub(crate) fn check(&self) -> Result<(), ClassifierError> {
        if self.vocabulary.len() != self.idf.len()
            || self.vocabulary.values().any(|&i| i >= self.idf.len())
        {
            return Err(ClassifierError::Corrupt(
                "vocabulary and idf table disagree".to_string(),
            ));
        }
        Ok(())
    }
}

//! Error types for the expensa-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the expensa library.
#[derive(Error, Debug)]
pub enum ExpensaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Category classifier error.
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Dataset or model persistence error.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Rejected confirmation batch.
    #[error("invalid correction payload: {0}")]
    Correction(#[from] CorrectionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to the category classifiers.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// No trained model is persisted; the service cannot start.
    #[error("no trained model found at {0}")]
    Unavailable(PathBuf),

    /// Training was requested on a dataset without usable rows.
    #[error("training dataset is empty")]
    EmptyDataset,

    /// Every description in the dataset vectorized to nothing.
    #[error("empty vocabulary; descriptions contain no usable terms")]
    EmptyVocabulary,

    /// The persisted model could not be interpreted.
    #[error("corrupt model: {0}")]
    Corrupt(String),
}

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Underlying file system error.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset CSV could not be read or written.
    #[error("dataset CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Model state could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The temporary file could not be moved into place.
    #[error("atomic write to {path} failed: {reason}")]
    AtomicWrite { path: PathBuf, reason: String },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reasons a confirmation batch is rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CorrectionError {
    /// An entry lacks a required field.
    #[error("entry {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// The batch contains no entries.
    #[error("confirmation batch is empty")]
    EmptyBatch,

    /// The payload is not shaped like a confirmation batch.
    #[error("{0}")]
    Malformed(String),
}

/// Result type for the expensa library.
pub type Result<T> = std::result::Result<T, ExpensaError>;

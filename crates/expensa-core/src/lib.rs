//! Core library for fiscal document expense tracking.
//!
//! This crate provides:
//! - PDF text extraction
//! - Rule-cascade field extraction (issue date, total value, description)
//! - Category classification with a periodically retrained batch model and
//!   an incrementally updated online learner
//! - A CSV-backed expense dataset and spreadsheet-style reports

pub mod classify;
pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod report;
pub mod store;

pub use classify::{
    BatchClassifier, ClassificationService, ConfirmOutcome, FeatureVector, OnlineLearner,
    RetrainDecision, RetrainPolicy, RetrainStatus,
};
pub use error::{ExpensaError, Result};
pub use invoice::{DocumentExtractor, ExtractionResult, FieldExtractionEngine};
pub use models::{
    Confirmation, ExpensaConfig, ExpenseRecord, Extracted, ExtractedFields, LabeledExample,
    NOT_FOUND,
};
pub use pdf::{
    document_content, extract_text_lossy, ContentKind, DocumentContent, PdfExtractor, PdfProcessor,
};
pub use report::Report;
pub use store::{ExpenseStore, FileStore, MemoryStore, StoreLock};

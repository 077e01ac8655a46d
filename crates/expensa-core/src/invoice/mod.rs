//! Fiscal document field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, FieldExtractionEngine};

use crate::models::fields::ExtractedFields;

/// Trait for document field extractors.
///
/// Extraction never fails: fields that cannot be recovered are reported with
/// the "not found" sentinel.
pub trait DocumentExtractor {
    /// Extract fields from plain document text.
    fn extract(&self, text: &str) -> ExtractedFields;
}

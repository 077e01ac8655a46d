//! Rule cascade parser producing [`ExtractedFields`] from document text.

use std::time::Instant;

use tracing::debug;

use crate::models::fields::{Extracted, ExtractedFields};

use super::rules::{
    DateExtractor, DescriptionExtractor, FieldExtractor, RuleMatch, ValueExtractor,
};
use super::DocumentExtractor;

/// Result of a traced extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: ExtractedFields,
    /// Rule that produced each field, in date/value/description order.
    pub matches: [Option<RuleMatch>; 3],
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Field extraction engine running the date, value and description cascades.
pub struct FieldExtractionEngine {
    dates: DateExtractor,
    values: ValueExtractor,
    descriptions: DescriptionExtractor,
}

impl FieldExtractionEngine {
    pub fn new() -> Self {
        Self {
            dates: DateExtractor::new(),
            values: ValueExtractor::new(),
            descriptions: DescriptionExtractor::new(),
        }
    }

    /// Extract all fields and report which rule fired for each.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        let date = self.dates.extract(text);
        let value = self.values.extract(text);
        let description = self.descriptions.extract(text);

        for (field, m) in [("date", &date), ("value", &value), ("description", &description)] {
            match m {
                Some(m) => debug!(
                    "{}: rule {} (rank {}, scope {:?}) -> {:?}",
                    field, m.rule, m.rank, m.scope, m.value
                ),
                None => debug!("{}: no rule matched", field),
            }
        }

        let fields = ExtractedFields {
            date: Extracted::from(date.as_ref().map(|m| m.value.clone())),
            value: Extracted::from(value.as_ref().map(|m| m.value.clone())),
            description: Extracted::from(description.as_ref().map(|m| m.value.clone())),
        };

        ExtractionResult {
            fields,
            matches: [date, value, description],
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for FieldExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for FieldExtractionEngine {
    fn extract(&self, text: &str) -> ExtractedFields {
        self.parse(text).fields
    }
}

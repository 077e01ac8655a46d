//! Rule-based field extractors for fiscal documents.

pub mod amounts;
pub mod dates;
pub mod description;
pub mod matcher;
pub mod patterns;

pub use amounts::{parse_locale_amount, ValueExtractor};
pub use dates::DateExtractor;
pub use description::DescriptionExtractor;
pub use matcher::{find_first_match, BlockScope, PatternSet, Rule};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// Extract the field from the full document text.
    fn extract(&self, text: &str) -> Option<RuleMatch>;
}

/// A captured value together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Trimmed captured text.
    pub value: String,
    /// Name of the rule that fired.
    pub rule: &'static str,
    /// Position of the rule within its cascade (0 = highest priority).
    pub rank: usize,
    /// Set when the rule ran inside a scoped block.
    pub scope: Option<&'static str>,
}

impl RuleMatch {
    pub fn new(value: impl Into<String>, rule: &'static str, rank: usize) -> Self {
        Self {
            value: value.into(),
            rule,
            rank,
            scope: None,
        }
    }

    pub fn within(mut self, scope: &'static str) -> Self {
        self.scope = Some(scope);
        self
    }
}

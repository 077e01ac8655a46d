//! Issue date extraction.

use super::matcher::{PatternSet, Rule};
use super::patterns::{DATE_BARE, DATE_ISSUED_INLINE, DATE_OF_ISSUE};
use super::{FieldExtractor, RuleMatch};

/// Issue date extractor.
///
/// Dates are returned exactly as printed (`DD/MM/YYYY`); they are not
/// validated or converted.
pub struct DateExtractor {
    cascade: PatternSet,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self {
            cascade: PatternSet::new(vec![
                Rule::new("date_of_issue", &DATE_OF_ISSUE),
                Rule::new("issued_inline", &DATE_ISSUED_INLINE),
                Rule::new("bare_date", &DATE_BARE),
            ]),
        }
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    fn extract(&self, text: &str) -> Option<RuleMatch> {
        self.cascade.find(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_date_beats_earlier_bare_date() {
        let text = "Printed 03/03/2024\nDATE OF ISSUE\nsomething\n15/01/2024";
        let m = DateExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "15/01/2024");
        assert_eq!(m.rule, "date_of_issue");
    }

    #[test]
    fn test_issued_inline() {
        let text = "Ref 01/01/2020 Issued: 20/05/2023";
        let m = DateExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "20/05/2023");
        assert_eq!(m.rank, 1);
    }

    #[test]
    fn test_issued_label_requires_adjacent_date() {
        // "Issued:" followed by text, so only the bare rule applies
        let text = "Issued: yesterday, on 07/08/2022";
        let m = DateExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "07/08/2022");
        assert_eq!(m.rule, "bare_date");
    }

    #[test]
    fn test_bare_date_without_label() {
        let text = "Receipt\nPaid on 31/12/2023 at the counter";
        let m = DateExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "31/12/2023");
    }

    #[test]
    fn test_portuguese_labels() {
        let text = "DATA DE EMISSÃO\n10/10/2021";
        assert_eq!(DateExtractor::new().extract(text).unwrap().value, "10/10/2021");

        let text = "Emissão: 11/11/2021";
        assert_eq!(DateExtractor::new().extract(text).unwrap().rank, 1);
    }

    #[test]
    fn test_no_date() {
        assert!(DateExtractor::new().extract("no dates at all 2024").is_none());
    }
}

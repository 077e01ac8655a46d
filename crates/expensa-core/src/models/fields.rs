//! Fields extracted from a single fiscal document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text stored and displayed in place of a field that was not found.
pub const NOT_FOUND: &str = "not found";

/// A single extracted field, or the "not found" sentinel.
///
/// Serialized as a plain string; the sentinel serializes as [`NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Extracted {
    Found(String),
    #[default]
    NotFound,
}

impl Extracted {
    pub fn is_found(&self) -> bool {
        matches!(self, Extracted::Found(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Extracted::Found(value) => Some(value),
            Extracted::NotFound => None,
        }
    }

    /// The found value, or [`NOT_FOUND`].
    pub fn as_str(&self) -> &str {
        self.as_deref().unwrap_or(NOT_FOUND)
    }
}

impl From<Option<String>> for Extracted {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Extracted::Found(v),
            _ => Extracted::NotFound,
        }
    }
}

/// Reverses the sentinel encoding used on the wire.
///
/// The text `"not found"` always maps back to [`Extracted::NotFound`], so a
/// document that literally printed that phrase in a field cannot be told
/// apart from a missed extraction once serialized.
impl From<String> for Extracted {
    fn from(value: String) -> Self {
        if value == NOT_FOUND {
            Extracted::NotFound
        } else {
            Some(value).into()
        }
    }
}

impl From<Extracted> for String {
    fn from(value: Extracted) -> Self {
        match value {
            Extracted::Found(v) => v,
            Extracted::NotFound => NOT_FOUND.to_string(),
        }
    }
}

impl fmt::Display for Extracted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields recovered from document text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Issue date as printed (`DD/MM/YYYY`).
    pub date: Extracted,

    /// Total value as printed, e.g. `1.234,56`. Not parsed.
    pub value: Extracted,

    /// Line items joined with ", ", or a vendor/party name.
    pub description: Extracted,
}

impl ExtractedFields {
    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        [&self.date, &self.value, &self.description]
            .iter()
            .filter(|f| f.is_found())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_capture_is_not_found() {
        assert_eq!(Extracted::from(Some("   ".to_string())), Extracted::NotFound);
        assert_eq!(Extracted::from(None), Extracted::NotFound);
        assert_eq!(
            Extracted::from(Some("12,00".to_string())),
            Extracted::Found("12,00".to_string())
        );
    }

    #[test]
    fn test_literal_sentinel_text_reads_back_as_not_found() {
        let captured = Extracted::from(Some(NOT_FOUND.to_string()));
        assert_eq!(captured, Extracted::Found(NOT_FOUND.to_string()));

        let json = serde_json::to_string(&captured).unwrap();
        let back: Extracted = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Extracted::NotFound);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let fields = ExtractedFields {
            date: Extracted::Found("01/02/2024".to_string()),
            value: Extracted::NotFound,
            description: Extracted::NotFound,
        };

        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(
            json,
            r#"{"date":"01/02/2024","value":"not found","description":"not found"}"#
        );

        let back: ExtractedFields = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fields);
        assert_eq!(back.found_count(), 1);
    }
}

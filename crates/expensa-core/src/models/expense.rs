//! Labeled examples, stored expense rows and confirmation payloads.

use serde::{Deserialize, Serialize};

use crate::error::CorrectionError;

use super::fields::NOT_FOUND;

/// A description paired with its human-confirmed category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub description: String,
    pub category: String,
}

impl LabeledExample {
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
        }
    }
}

/// One row of the persisted expense dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Source document name.
    #[serde(default, alias = "Arquivo")]
    pub file: String,

    /// Total value as extracted (locale formatted).
    #[serde(default, alias = "Valor")]
    pub value: String,

    /// Issue date as extracted.
    #[serde(default, alias = "Data")]
    pub date: String,

    /// Short description used for training.
    #[serde(default, alias = "Descricao")]
    pub description: String,

    /// Confirmed category.
    #[serde(default, alias = "Categoria")]
    pub category: String,
}

impl ExpenseRecord {
    /// The labeled example carried by this row, if it is complete.
    pub fn labeled(&self) -> Option<LabeledExample> {
        if self.description.trim().is_empty() || self.category.trim().is_empty() {
            return None;
        }
        Some(LabeledExample::new(&self.description, &self.category))
    }
}

/// A human-confirmed document, as received from the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub file: String,
    pub value: String,
    pub date: String,
    /// Short description that is stored and retrained on.
    pub description: String,
    /// Longer text the online learner learns from.
    pub full_description: String,
    pub category: String,
}

impl Confirmation {
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            file: String::new(),
            value: NOT_FOUND.to_string(),
            date: NOT_FOUND.to_string(),
            full_description: description.clone(),
            description,
            category: category.into(),
        }
    }

    pub fn record(&self) -> ExpenseRecord {
        ExpenseRecord {
            file: self.file.clone(),
            value: self.value.clone(),
            date: self.date.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
        }
    }

    pub fn example(&self) -> LabeledExample {
        LabeledExample::new(&self.description, &self.category)
    }
}

/// Wire shape of one confirmation entry.
///
/// Aliases accept the column names used by the spreadsheet front end.
#[derive(Debug, Deserialize)]
struct ConfirmationEntry {
    #[serde(default, alias = "Arquivo")]
    file: Option<String>,
    #[serde(default, alias = "Valor")]
    value: Option<String>,
    #[serde(default, alias = "Data")]
    date: Option<String>,
    #[serde(default, alias = "Descricao")]
    description: Option<String>,
    #[serde(default, alias = "DescricaoCompleta")]
    full_description: Option<String>,
    #[serde(default, alias = "Categoria")]
    category: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse and validate a `{"data": [...]}` confirmation payload.
///
/// The whole batch is rejected if any entry is invalid.
pub fn parse_confirmations(payload: &str) -> Result<Vec<Confirmation>, CorrectionError> {
    let json: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| CorrectionError::Malformed(format!("invalid JSON: {}", e)))?;

    let data = json
        .get("data")
        .ok_or_else(|| CorrectionError::Malformed("missing `data` key".to_string()))?;

    let entries: Vec<ConfirmationEntry> = serde_json::from_value(data.clone())
        .map_err(|e| CorrectionError::Malformed(format!("`data` is not a list of entries: {}", e)))?;

    validate_entries(entries)
}

fn validate_entries(entries: Vec<ConfirmationEntry>) -> Result<Vec<Confirmation>, CorrectionError> {
    if entries.is_empty() {
        return Err(CorrectionError::EmptyBatch);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let description = non_empty(entry.description)
                .ok_or(CorrectionError::MissingField { index, field: "description" })?;
            let category = non_empty(entry.category)
                .ok_or(CorrectionError::MissingField { index, field: "category" })?;

            Ok(Confirmation {
                file: entry.file.unwrap_or_default(),
                value: non_empty(entry.value).unwrap_or_else(|| NOT_FOUND.to_string()),
                date: non_empty(entry.date).unwrap_or_else(|| NOT_FOUND.to_string()),
                full_description: non_empty(entry.full_description)
                    .unwrap_or_else(|| description.clone()),
                description: description.trim().to_string(),
                category: category.trim().to_string(),
            })
        })
        .collect()
}

/// Check an already-built batch with the same rules as [`parse_confirmations`].
pub fn validate_confirmations(batch: &[Confirmation]) -> Result<(), CorrectionError> {
    if batch.is_empty() {
        return Err(CorrectionError::EmptyBatch);
    }

    for (index, c) in batch.iter().enumerate() {
        if c.description.trim().is_empty() {
            return Err(CorrectionError::MissingField { index, field: "description" });
        }
        if c.category.trim().is_empty() {
            return Err(CorrectionError::MissingField { index, field: "category" });
        }
    }

    Ok(())
}

//! Data models shared across the pipeline.

pub mod config;
pub mod expense;
pub mod fields;

pub use config::ExpensaConfig;
pub use expense::{Confirmation, ExpenseRecord, LabeledExample};
pub use fields::{Extracted, ExtractedFields, NOT_FOUND};

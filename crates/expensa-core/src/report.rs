//! Expense summaries and spreadsheet-style CSV export.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::invoice::rules::parse_locale_amount;
use crate::models::expense::ExpenseRecord;

/// Description of the closing row in exports.
pub const TOTAL_ROW_LABEL: &str = "Total expenses";

/// One stored expense with its value parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub record: ExpenseRecord,
    /// `None` when the stored value is the sentinel or unparseable.
    pub amount: Option<Decimal>,
}

/// Sum of the expenses filed under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub count: usize,
    pub total: Decimal,
}

/// Summary of the stored dataset.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    /// Per-category totals, sorted by category.
    pub categories: Vec<CategoryTotal>,
    pub total: Decimal,
    /// Rows whose value could not be parsed.
    pub skipped: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    file: &'a str,
    value: Option<Decimal>,
    date: &'a str,
    description: &'a str,
    category: &'a str,
}

impl Report {
    /// Parse every stored value and total them.
    pub fn build(records: &[ExpenseRecord]) -> Self {
        let mut per_category: BTreeMap<&str, (usize, Decimal)> = BTreeMap::new();
        let mut total = Decimal::ZERO;
        let mut skipped = 0;

        let rows: Vec<ReportRow> = records
            .iter()
            .map(|record| {
                let amount = parse_locale_amount(&record.value);
                match amount {
                    Some(amount) => {
                        let entry = per_category
                            .entry(record.category.as_str())
                            .or_insert((0, Decimal::ZERO));
                        entry.0 += 1;
                        entry.1 += amount;
                        total += amount;
                    }
                    None => {
                        debug!("Skipping unparseable value {:?} in {:?}", record.value, record.file);
                        skipped += 1;
                    }
                }
                ReportRow {
                    record: record.clone(),
                    amount,
                }
            })
            .collect();

        let categories = per_category
            .into_iter()
            .map(|(category, (count, total))| CategoryTotal {
                category: category.to_string(),
                count,
                total,
            })
            .collect();

        Self {
            rows,
            categories,
            total,
            skipped,
            generated_at: Utc::now(),
        }
    }

    /// Write every row with a numeric value column, then the total row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PersistenceError> {
        let mut csv = csv::Writer::from_writer(writer);

        for row in &self.rows {
            csv.serialize(ExportRow {
                file: &row.record.file,
                value: row.amount,
                date: &row.record.date,
                description: &row.record.description,
                category: &row.record.category,
            })?;
        }

        csv.serialize(ExportRow {
            file: "",
            value: Some(self.total),
            date: "",
            description: TOTAL_ROW_LABEL,
            category: "",
        })?;

        csv.flush()
            .map_err(|e| PersistenceError::io("<report>", e))?;
        Ok(())
    }

    /// Export to a CSV file.
    pub fn export(&self, path: &Path) -> Result<(), PersistenceError> {
        let file = std::fs::File::create(path).map_err(|e| PersistenceError::io(path, e))?;
        self.write_csv(file)?;
        info!(
            "Exported {} rows (total {}) to {}",
            self.rows.len(),
            self.total,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn record(value: &str, category: &str) -> ExpenseRecord {
        ExpenseRecord {
            file: "doc.pdf".to_string(),
            value: value.to_string(),
            date: "01/02/2024".to_string(),
            description: "something".to_string(),
            category: category.to_string(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_totals_per_category() {
        let report = Report::build(&[
            record("1.234,56", "Office"),
            record("99,90", "Food"),
            record("10,10", "Food"),
            record("not found", "Food"),
        ]);

        assert_eq!(report.total, dec("1344.56"));
        assert_eq!(report.skipped, 1);
        assert_eq!(
            report.categories,
            vec![
                CategoryTotal {
                    category: "Food".to_string(),
                    count: 2,
                    total: dec("110.00"),
                },
                CategoryTotal {
                    category: "Office".to_string(),
                    count: 1,
                    total: dec("1234.56"),
                },
            ]
        );
        assert_eq!(report.rows[3].amount, None);
    }

    #[test]
    fn test_csv_ends_with_total_row() {
        let report = Report::build(&[record("1.234,56", "Office"), record("not found", "Food")]);

        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "file,value,date,description,category");
        assert_eq!(lines[1], "doc.pdf,1234.56,01/02/2024,something,Office");
        assert_eq!(lines[2], "doc.pdf,,01/02/2024,something,Food");
        assert_eq!(lines[3], ",1234.56,,Total expenses,");
    }

    #[test]
    fn test_empty_dataset() {
        let report = Report::build(&[]);
        assert_eq!(report.total, Decimal::ZERO);
        assert!(report.categories.is_empty());

        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["file,value,date,description,category", ",0,,Total expenses,"]);
    }
}

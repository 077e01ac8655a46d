//! Total value extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::matcher::{BlockScope, PatternSet, Rule};
use super::patterns::{
    BLOCK_TOTAL, BLOCK_TOTAL_INVOICE, BLOCK_TOTAL_PRODUCTS, CURRENCY_AMOUNT, NET_VALUE,
    TAX_BLOCK, TOTAL_TO_PAY, TOTAL_VALUE_LABEL, TOTAL_WITH_CURRENCY,
};
use super::{FieldExtractor, RuleMatch};

/// Total value extractor.
///
/// Looks inside the tax calculation block first, where the invoice total is
/// unambiguous, and only scans the whole document when that block is absent
/// or holds no total. The captured amount is returned verbatim, e.g.
/// `"1.234,56"`.
pub struct ValueExtractor {
    tax_block: BlockScope,
    scoped: PatternSet,
    fallback: PatternSet,
}

impl ValueExtractor {
    pub fn new() -> Self {
        Self {
            tax_block: BlockScope::new("tax_calculation", &TAX_BLOCK),
            scoped: PatternSet::new(vec![
                Rule::new("total_invoice_value", &BLOCK_TOTAL_INVOICE),
                Rule::new("total_products_value", &BLOCK_TOTAL_PRODUCTS),
                Rule::new("block_total", &BLOCK_TOTAL),
            ]),
            fallback: PatternSet::new(vec![
                Rule::new("total_to_pay", &TOTAL_TO_PAY),
                Rule::new("total_value_label", &TOTAL_VALUE_LABEL),
                Rule::new("total", &TOTAL_WITH_CURRENCY),
                Rule::new("net_value", &NET_VALUE),
                Rule::new("currency_amount", &CURRENCY_AMOUNT),
            ]),
        }
    }
}

impl Default for ValueExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ValueExtractor {
    fn extract(&self, text: &str) -> Option<RuleMatch> {
        let scoped = self
            .tax_block
            .locate(text)
            .and_then(|block| self.scoped.find(block))
            .filter(|m| !m.value.is_empty())
            .map(|m| m.within(self.tax_block.name));

        scoped.or_else(|| self.fallback.find(text))
    }
}

/// Parse a locale-formatted amount (`"1.234,56"`, `"R$ 99,90"`).
///
/// Periods are thousands separators and the comma is the decimal separator.
/// Returns `None` for anything that is not a number after that normalization,
/// including the "not found" sentinel.
pub fn parse_locale_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = cleaned.replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).ok()
}

//! Item or vendor description extraction.

use regex::Regex;

use super::matcher::{BlockScope, PatternSet, Rule};
use super::patterns::{
    CORPORATE_NAME, NAME_LINE, PRODUCT_BLOCK, PRODUCT_ROW, RECIPIENT_NAME, TRANSPORTER_NAME,
};
use super::{FieldExtractor, RuleMatch};

/// Description extractor.
///
/// Prefers the product/service table, joining every line item it finds, and
/// otherwise falls back to the name of a party printed on the document.
pub struct DescriptionExtractor {
    product_block: BlockScope,
    row: &'static Regex,
    fallback: PatternSet,
}

impl DescriptionExtractor {
    pub fn new() -> Self {
        Self {
            product_block: BlockScope::new("product_service_data", &PRODUCT_BLOCK),
            row: &PRODUCT_ROW,
            fallback: PatternSet::new(vec![
                Rule::new("transporter_name", &TRANSPORTER_NAME),
                Rule::new("recipient_name", &RECIPIENT_NAME),
                Rule::new("corporate_name", &CORPORATE_NAME),
                Rule::new("name_line", &NAME_LINE),
            ]),
        }
    }

    /// Every `<number> <text> <number>` row inside the product block.
    pub fn line_items(&self, text: &str) -> Vec<String> {
        let Some(block) = self.product_block.locate(text) else {
            return Vec::new();
        };

        self.row
            .captures_iter(block)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }
}

impl Default for DescriptionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DescriptionExtractor {
    fn extract(&self, text: &str) -> Option<RuleMatch> {
        let items = self.line_items(text);
        let joined = items.join(", ");

        if !items.is_empty() && !joined.is_empty() {
            return Some(
                RuleMatch::new(joined, "product_rows", 0).within(self.product_block.name),
            );
        }

        self.fallback.find(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn description(text: &str) -> Option<String> {
        DescriptionExtractor::new().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_joins_every_product_row() {
        let text = "PRODUCT/SERVICE DATA\n1 Widget A 10\n2 Widget B 5\nISS TAX CALCULATION\n";
        assert_eq!(description(text), Some("Widget A, Widget B".to_string()));
    }

    #[test]
    fn test_rows_outside_block_are_ignored() {
        let text = "3 Stray item 4\nPRODUCT/SERVICE DATA\n1 Paper 2\nISS TAX CALCULATION\n5 Other 6";
        assert_eq!(
            DescriptionExtractor::new().line_items(text),
            vec!["Paper".to_string()]
        );
    }

    #[test]
    fn test_portuguese_product_block() {
        let text = "DADOS DO PRODUTO/SERVICOS\n1 Caneta azul 3\nCÁLCULO DO ISSQN";
        assert_eq!(description(text), Some("Caneta azul".to_string()));
    }

    #[test]
    fn test_falls_back_to_corporate_name() {
        let text = "Corporate Name  ACME Supplies Ltd\nAddress: Main St 1";
        let m = DescriptionExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "ACME Supplies Ltd");
        assert_eq!(m.rule, "corporate_name");
    }

    #[test]
    fn test_transporter_name_has_priority() {
        let text = "TRANSPORTER / VOLUMES\nNAME / CORPORATE NAME\nFast Freight SA\nFREIGHT PAID BY\nNAME: Someone Else\n";
        let m = DescriptionExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "Fast Freight SA");
        assert_eq!(m.rank, 0);
    }

    #[test]
    fn test_recipient_name_line() {
        let text = "RECIPIENT/SENDER\nNAME CORPORATE NAME\nJane Buyer\nADDRESS Elm Road";
        let m = DescriptionExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "Jane Buyer");
        assert_eq!(m.rule, "recipient_name");
    }

    #[test]
    fn test_name_line_fallback() {
        assert_eq!(description("NAME: Corner Bakery\nTotal"), Some("Corner Bakery".to_string()));
    }

    #[test]
    fn test_block_without_rows_falls_back() {
        let text = "PRODUCT/SERVICE DATA\nno rows\nISS TAX CALCULATION\nNAME: Vendor X\n";
        assert_eq!(description(text), Some("Vendor X".to_string()));
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(description("plain words only"), None);
    }
}

//! Regex patterns for fiscal document field extraction.
//!
//! Every label accepts its English form and the Portuguese form printed on
//! Brazilian NF-e/NFS-e layouts. All patterns are case-insensitive with
//! dot-matches-newline, and each one captures exactly one group.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Issue date
    pub static ref DATE_OF_ISSUE: Regex = Regex::new(
        r"(?is)(?:DATE OF ISSUE|DATA DE EMISSÃO).*?(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref DATE_ISSUED_INLINE: Regex = Regex::new(
        r"(?is)(?:Issued|Emissão):\s*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref DATE_BARE: Regex = Regex::new(
        r"(?is)(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // Tax calculation block
    pub static ref TAX_BLOCK: Regex = Regex::new(
        r"(?is)(?:TAX CALCULATION|CÁLCULO DO IMPOSTO)(.*?)(?:ADDITIONAL DATA|DADOS ADICIONAIS)"
    ).unwrap();

    pub static ref BLOCK_TOTAL_INVOICE: Regex = Regex::new(
        r"(?is)(?:TOTAL INVOICE VALUE|VALOR TOTAL DA NOTA)\s*([\d\.]+,\d{2})"
    ).unwrap();

    pub static ref BLOCK_TOTAL_PRODUCTS: Regex = Regex::new(
        r"(?is)(?:TOTAL PRODUCTS VALUE|VALOR TOTAL DOS PRODUTOS)\s*([\d\.]+,\d{2})"
    ).unwrap();

    pub static ref BLOCK_TOTAL: Regex = Regex::new(
        r"(?is)TOTAL\s*([\d\.]+,\d{2})"
    ).unwrap();

    // Whole-document amounts
    pub static ref TOTAL_TO_PAY: Regex = Regex::new(
        r"(?is)(?:TOTAL TO PAY|TOTAL A PAGAR)\s*R?\$\s*([\d\.,]+)"
    ).unwrap();

    pub static ref TOTAL_VALUE_LABEL: Regex = Regex::new(
        r"(?is)(?:Total Value|Valor Total):\s*([\d\.]+,\d{2})"
    ).unwrap();

    pub static ref TOTAL_WITH_CURRENCY: Regex = Regex::new(
        r"(?is)TOTAL\s*(?:\s*R\$)?\s*([\d\.]+,\d{2})"
    ).unwrap();

    pub static ref NET_VALUE: Regex = Regex::new(
        r"(?is)(?:NET VALUE|VALOR LÍQUIDO).*?([\d\.]+,\d{2})"
    ).unwrap();

    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"(?is)R\$\s*([\d\.]+,\d{2})"
    ).unwrap();

    // Product/service table
    pub static ref PRODUCT_BLOCK: Regex = Regex::new(
        r"(?is)(?:PRODUCT/SERVICE DATA|DADOS DO PRODUTO/SERVICOS)(.*?)(?:ISS TAX CALCULATION|CÁLCULO DO ISSQN)"
    ).unwrap();

    pub static ref PRODUCT_ROW: Regex = Regex::new(
        r"(?is)\d+\s+(.*?)\s+\d+"
    ).unwrap();

    // Vendor / party names
    pub static ref TRANSPORTER_NAME: Regex = Regex::new(
        r"(?is)(?:TRANSPORTER.*?NAME / CORPORATE NAME|TRANSPORTADOR.*?NOME / RAZÃO SOCIAL)\s*(.*?)\s*(?:FREIGHT PAID BY|FRETE POR CONTA)"
    ).unwrap();

    pub static ref RECIPIENT_NAME: Regex = Regex::new(
        r"(?is)(?:RECIPIENT/SENDER\s*NAME\s*CORPORATE\s*NAME|DESTINATARIO/REMETENTE\s*NOME\s*RAZÃO\s*SOCIAL)\s*\n(.*?)\s*(?:ADDRESS|ENDEREÇO)"
    ).unwrap();

    pub static ref CORPORATE_NAME: Regex = Regex::new(
        r"(?is)(?:Corporate Name|Razão Social)\s*(.*?)\s*(?:Address|Endereço):"
    ).unwrap();

    pub static ref NAME_LINE: Regex = Regex::new(
        r"(?is)(?:NAME|NOME):\s*(.*?)(?:\n|\r)"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_has_one_capture_group() {
        let all: [&Regex; 18] = [
            &*DATE_OF_ISSUE,
            &*DATE_ISSUED_INLINE,
            &*DATE_BARE,
            &*TAX_BLOCK,
            &*BLOCK_TOTAL_INVOICE,
            &*BLOCK_TOTAL_PRODUCTS,
            &*BLOCK_TOTAL,
            &*TOTAL_TO_PAY,
            &*TOTAL_VALUE_LABEL,
            &*TOTAL_WITH_CURRENCY,
            &*NET_VALUE,
            &*CURRENCY_AMOUNT,
            &*PRODUCT_BLOCK,
            &*PRODUCT_ROW,
            &*TRANSPORTER_NAME,
            &*RECIPIENT_NAME,
            &*CORPORATE_NAME,
            &*NAME_LINE,
        ];

        for re in all {
            // captures_len counts the implicit whole-match group
            assert_eq!(re.captures_len(), 2, "pattern {}", re.as_str());
        }
    }

    #[test]
    fn test_labels_match_both_layouts() {
        assert!(DATE_OF_ISSUE.is_match("DATE OF ISSUE\n01/02/2024"));
        assert!(DATE_OF_ISSUE.is_match("Data de Emissão 01/02/2024"));
        assert!(TAX_BLOCK.is_match("CÁLCULO DO IMPOSTO x DADOS ADICIONAIS"));
        assert!(TAX_BLOCK.is_match("tax calculation x additional data"));
    }
}

// src/utils/price.rs

//! Currency string helpers.
//!
//! Prices travel through the system as display strings ("R$ 12,34"); these
//! helpers convert between that form and numeric values for sorting and
//! range computation.

use crate::models::PriceFormat;

/// Format a numeric amount as a currency string, e.g. `12.34` → `"R$ 12,34"`.
pub fn format_amount(format: &PriceFormat, value: f64) -> String {
    let fixed = format!("{value:.2}").replace('.', &format.decimal_separator);
    format!("{} {}", format.prefix, fixed)
}

/// Parse a currency string back to a numeric amount.
///
/// Strips the currency prefix, drops grouping separators and converts the
/// decimal separator to a decimal point. Returns `None` for non-numeric
/// strings.
pub fn parse_amount(format: &PriceFormat, text: &str) -> Option<f64> {
    let grouping = if format.decimal_separator == "," {
        "."
    } else {
        ","
    };
    let cleaned = text
        .trim()
        .trim_start_matches(&format.prefix)
        .trim()
        .replace(grouping, "")
        .replace(&format.decimal_separator, ".");
    cleaned.parse::<f64>().ok()
}

/// Sort price strings ascending by their numeric value.
///
/// Unparseable strings sort after all numeric ones, keeping their relative
/// order.
pub fn sort_by_value(format: &PriceFormat, prices: &mut [String]) {
    prices.sort_by(|a, b| {
        let a = parse_amount(format, a).unwrap_or(f64::INFINITY);
        let b = parse_amount(format, b).unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        let format = PriceFormat::default();
        assert_eq!(format_amount(&format, 12.34), "R$ 12,34");
        assert_eq!(format_amount(&format, 9.9), "R$ 9,90");
        assert_eq!(format_amount(&format, 100.0), "R$ 100,00");
    }

    #[test]
    fn test_parse_amount() {
        let format = PriceFormat::default();
        assert_eq!(parse_amount(&format, "R$ 12,34"), Some(12.34));
        assert_eq!(parse_amount(&format, "R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_amount(&format, "12,34"), Some(12.34));
        assert_eq!(parse_amount(&format, "sob consulta"), None);
    }

    #[test]
    fn test_sort_by_value_is_numeric() {
        let format = PriceFormat::default();
        let mut prices = vec![
            "R$ 50,00".to_string(),
            "R$ 9,90".to_string(),
            "R$ 100,00".to_string(),
        ];
        sort_by_value(&format, &mut prices);
        assert_eq!(prices, vec!["R$ 9,90", "R$ 50,00", "R$ 100,00"]);
    }

    #[test]
    fn test_sort_keeps_unparseable_last() {
        let format = PriceFormat::default();
        let mut prices = vec!["sob consulta".to_string(), "R$ 5,00".to_string()];
        sort_by_value(&format, &mut prices);
        assert_eq!(prices, vec!["R$ 5,00", "sob consulta"]);
    }
}

//! Locale-neutral decimal normalization.

use crate::types::Cell;

const NULL_TOKENS: [&str; 3] = ["nan", "none", "null"];
const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '%'];

/// Normalize a cell into a locale-neutral decimal string.
///
/// - Nulls and NaN give `None`. So do booleans: outside an all-numeric column they are not
///   numbers, and numeric columns bypass this function.
/// - `Int64`/`Float64` cells return their canonical decimal representation.
/// - Everything else goes through [`normalize_str`] on the cell's text.
pub fn normalize(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null | Cell::Bool(_) => None,
        Cell::Float64(v) if v.is_nan() => None,
        Cell::Int64(v) => Some(v.to_string()),
        Cell::Float64(v) => Some(v.to_string()),
        Cell::Utf8(s) => normalize_str(s),
        Cell::Date(_) | Cell::DateTime(_) => cell.as_text().and_then(|t| normalize_str(&t)),
    }
}

/// Normalize a raw numeric-looking token.
///
/// Strips `R$`, currency and percent symbols and every whitespace character (including
/// non-breaking spaces), then resolves separators:
///
/// - exactly one comma and at least one period: periods are thousands separators, the comma
///   is the decimal point (`"1.234,56"` → `"1234.56"`)
/// - otherwise every comma becomes a period, periods are kept (`"1234,56"` → `"1234.56"`)
///
/// The second rule can yield a malformed numeral (`"1,234,567"` → `"1.234.567"`); callers must
/// treat that as unparseable.
pub fn normalize_str(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() || NULL_TOKENS.iter().any(|t| text.eq_ignore_ascii_case(t)) {
        return None;
    }

    let mut cleaned = text.replace("R$", "");
    cleaned.retain(|c| !c.is_whitespace() && !c.is_control() && !CURRENCY_SYMBOLS.contains(&c));
    if cleaned.is_empty() {
        return None;
    }

    let commas = cleaned.matches(',').count();
    let periods = cleaned.matches('.').count();
    if commas == 1 && periods >= 1 {
        cleaned = cleaned.replace('.', "").replace(',', ".");
    } else if commas > 0 {
        cleaned = cleaned.replace(',', ".");
    }

    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::{normalize, normalize_str};
    use crate::types::Cell;

    #[test]
    fn brazilian_thousands_and_decimal() {
        assert_eq!(normalize_str("1.234,56").as_deref(), Some("1234.56"));
        assert_eq!(normalize_str("1234,56").as_deref(), Some("1234.56"));
        assert_eq!(normalize_str("R$ 1.234,56").as_deref(), Some("1234.56"));
        assert_eq!(normalize_str("1.234.567,89").as_deref(), Some("1234567.89"));
    }

    #[test]
    fn null_tokens_and_blanks() {
        assert_eq!(normalize_str("nan"), None);
        assert_eq!(normalize_str("NaN"), None);
        assert_eq!(normalize_str("None"), None);
        assert_eq!(normalize_str("NULL"), None);
        assert_eq!(normalize_str("   "), None);
        assert_eq!(normalize_str("R$"), None);
        assert_eq!(normalize(&Cell::Null), None);
    }

    #[test]
    fn strips_symbols_and_all_whitespace() {
        assert_eq!(normalize_str("45%").as_deref(), Some("45"));
        assert_eq!(normalize_str("$ 12.50").as_deref(), Some("12.50"));
        assert_eq!(normalize_str("1\u{a0}234,5").as_deref(), Some("1234.5"));
        assert_eq!(normalize_str("\t3,5\r\n").as_deref(), Some("3.5"));
        assert_eq!(normalize_str("€ 9").as_deref(), Some("9"));
    }

    #[test]
    fn legacy_rule_reinterprets_us_grouping() {
        // One comma plus a period: the comma always wins as decimal point.
        assert_eq!(normalize_str("1,234.56").as_deref(), Some("1.23456"));
    }

    #[test]
    fn multiple_commas_yield_malformed_numeral() {
        assert_eq!(normalize_str("1,234,567").as_deref(), Some("1.234.567"));
        assert!(normalize_str("1,234,567").unwrap().parse::<f64>().is_err());
    }

    #[test]
    fn numeric_cells_pass_through() {
        assert_eq!(normalize(&Cell::Int64(42)).as_deref(), Some("42"));
        assert_eq!(normalize(&Cell::Float64(2.5)).as_deref(), Some("2.5"));
        assert_eq!(normalize(&Cell::Float64(f64::NAN)), None);
        assert_eq!(normalize(&Cell::Bool(true)), None);
    }
}

//! Price text parsing.
//!
//! Prices arrive as display text scraped from a listings page
//! (`"12,800円"`, `"¥1,980"`). Comparison needs a number; storage keeps
//! the original text. Parsing is integer-only - the currency has no
//! fractional minor units.

/// Characters stripped before parsing: currency symbols and the
/// thousands separators of the deployment locale, plus whitespace.
const STRIPPED: &[char] = &['円', '¥', '￥', ',', ' ', '\u{3000}'];

/// Parse observed price text into a non-negative integer amount.
///
/// Returns `None` for anything that is not a plain integer after
/// stripping - malformed price text is an expected, non-fatal case and
/// simply excludes the listing from price comparison.
pub fn parse_price(text: &str) -> Option<u64> {
    let cleaned: String = text.chars().filter(|c| !STRIPPED.contains(c)).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_digits() {
        assert_eq!(parse_price("800"), Some(800));
    }

    #[test]
    fn strips_currency_symbol_and_separators() {
        assert_eq!(parse_price("12,800円"), Some(12_800));
        assert_eq!(parse_price("¥1,980"), Some(1_980));
        assert_eq!(parse_price(" 1 000 円 "), Some(1_000));
    }

    #[test]
    fn rejects_malformed_text() {
        assert_eq!(parse_price("???"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("円"), None);
        assert_eq!(parse_price("sold out"), None);
    }

    #[test]
    fn rejects_fractional_and_negative_amounts() {
        assert_eq!(parse_price("1.5"), None);
        assert_eq!(parse_price("-500"), None);
    }
}

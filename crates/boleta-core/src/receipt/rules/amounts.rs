//! Amount predicates and normalization.
//!
//! Receipts in the target currencies print integer amounts with `.`, `,` or
//! space as thousand separators. Separators are discarded, never interpreted
//! positionally: `12.000`, `12,000` and `12 000` all read as 12000.

/// Keep only ASCII digits.
pub fn normalize_amount(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Number of ASCII digits in `s`.
pub fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Whether `s` carries enough digits to be a price.
pub fn is_amount_like(s: &str, min_digits: usize) -> bool {
    digit_count(s) >= min_digits
}

/// Whether a token belongs to a price column: digits, separators and `$` only.
pub fn is_price_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '$') || c.is_whitespace())
}

/// Strip separators and parse. Returns `None` for zero, empty or overflowing values.
pub fn parse_amount(s: &str) -> Option<u64> {
    let digits = normalize_amount(s);
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok().filter(|&v| v > 0)
}

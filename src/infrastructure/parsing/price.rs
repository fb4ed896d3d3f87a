//! Localized price text normalization
//!
//! Finds the first numeric run in free text and infers which separator is
//! the decimal point. Currency symbols and words around the number are
//! ignored. Text without any digit yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;

// A space only groups thousands when exactly three digits follow it
static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]{1,3}(?:[ \u{a0}\u{202f}][0-9]{3})+(?:[.,][0-9]+)?|[0-9](?:[0-9.,']*[0-9])?")
        .expect("amount pattern is valid")
});

/// Parse a price string such as `"$1,234.56"` or `"12,99 €"` into a number
pub fn parse_price(text: &str) -> Option<f64> {
    let raw = AMOUNT.find(text)?.as_str();

    let compact: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    normalize_separators(&compact)?.parse::<f64>().ok()
}

/// Rewrite a digits-and-separators run into a plain `1234.56` literal
fn normalize_separators(amount: &str) -> Option<String> {
    let last_dot = amount.rfind('.');
    let last_comma = amount.rfind(',');

    let decimal = match (last_dot, last_comma) {
        (None, None) => None,
        // both present: whichever comes last separates the decimals
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(pos), None) => single_separator_role(amount, '.', pos),
        (None, Some(pos)) => single_separator_role(amount, ',', pos),
    };

    let mut out = String::with_capacity(amount.len());
    let mut seen_decimal = false;
    for (idx, c) in amount.char_indices() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if Some(c) == decimal && Some(idx) == amount.rfind(c) && !seen_decimal {
            out.push('.');
            seen_decimal = true;
        }
    }

    if out.is_empty() { None } else { Some(out) }
}

/// With only one kind of separator, decide between decimal and thousands
fn single_separator_role(amount: &str, sep: char, last_pos: usize) -> Option<char> {
    let occurrences = amount.matches(sep).count();
    let trailing_digits = amount.len() - last_pos - 1;

    if occurrences > 1 || trailing_digits == 3 {
        None
    } else {
        Some(sep)
    }
}

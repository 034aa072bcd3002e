use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::DocumentScale;

/// Whole-token currency/number shape: optional `$`/`(`, digit groups,
/// optional decimals, optional B/M/K suffix or trailing `)`.
static NUMERIC_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?-?\$?\s*\(?-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?\s*[BMKbmk]?\)?$").unwrap()
});

/// The same shape found inside a line of text.
static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(?-?(?:\$\s?)?\(?-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?(?:\s?[BMKbmk]\b)?\)?").unwrap()
});

pub fn is_numeric_token(text: &str) -> bool {
    NUMERIC_SHAPE.is_match(text.trim())
}

/// A bare four-digit year such as `2024`, which headings use for periods.
pub fn is_year_like(token: &str) -> bool {
    let token = token.trim();
    token.len() == 4
        && token.chars().all(|c| c.is_ascii_digit())
        && token
            .parse::<u32>()
            .map(|y| (1990..=2100).contains(&y))
            .unwrap_or(false)
}

/// Numeric tokens in `line`, left to right. Tokens glued to letters
/// (`Q3`, `10-K`, `FY2024`) and percentages are skipped.
pub fn numeric_tokens(line: &str) -> Vec<&str> {
    NUMERIC_TOKEN
        .find_iter(line)
        .filter(|m| {
            let before = line[..m.start()].chars().next_back();
            let after = line[m.end()..].chars().next();
            let glued_before = before.map(|c| c.is_alphanumeric()).unwrap_or(false);
            let glued_after = after
                .map(|c| c.is_alphanumeric() || matches!(c, '-' | '/' | '%'))
                .unwrap_or(false);
            !glued_before && !glued_after
        })
        .map(|m| m.as_str().trim())
        .collect()
}

/// Converts a numeral token into a signed amount in absolute currency units.
///
/// Parentheses or a leading minus mark a negative value. An explicit
/// B/M/K suffix overrides the document scale; otherwise the scale applies.
/// Returns `None` for zero or anything that does not parse.
pub fn parse_amount(token: &str, scale: &DocumentScale) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let negative = token.contains('(') || token.ends_with(')') || token.contains('-');

    let mut digits: String = token
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')' | '-') && !c.is_whitespace())
        .collect();

    let multiplier = match digits.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('B') => 1e9,
        Some('M') => 1e6,
        Some('K') => 1e3,
        _ => scale.multiplier,
    };
    if digits.ends_with(|c: char| c.is_ascii_alphabetic()) {
        digits.pop();
    }

    let magnitude = digits.parse::<f64>().ok()?;
    if !magnitude.is_finite() || magnitude == 0.0 {
        return None;
    }

    let value = magnitude * multiplier;
    Some(if negative { -value } else { value })
}

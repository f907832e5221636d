//! German-locale price normalization ("1.234,56" -> 1234.56)

use regex::Regex;

/// Convert a price string with `.` thousands separators and a decimal comma
pub fn normalize_price(raw: &str) -> Option<f64> {
    raw.trim()
        .replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
}

/// Finds the first price-looking substring in free text and normalizes it
#[derive(Debug, Clone)]
pub struct PriceExtractor {
    pattern: Regex,
}

impl PriceExtractor {
    pub const fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// `None` when the text has no match or the match does not parse
    pub fn extract(&self, text: &str) -> Option<f64> {
        let captures = self.pattern.captures(text)?;
        let matched = captures.get(1).or_else(|| captures.get(0))?;
        normalize_price(matched.as_str())
    }
}

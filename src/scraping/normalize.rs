//! Conversion of locale-formatted strings into typed values.

use crate::scraping::error::ParseError;
use serde::{Deserialize, Serialize};

/// Locale conventions for numbers shown on a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Currency symbol stripped from prices, e.g. `R$`
    pub currency_symbol: String,
    /// Thousands separator, e.g. `.` in `1.234,56`
    pub thousands_separator: char,
    /// Decimal separator, e.g. `,` in `1.234,56`
    pub decimal_separator: char,
    /// Word abbreviating thousands in sold counts, e.g. `mil`
    pub thousands_marker: String,
}

impl NumberFormat {
    /// Brazilian Portuguese: `R$ 1.234,56`, `2 mil vendidos`.
    pub fn pt_br() -> Self {
        Self {
            currency_symbol: "R$".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            thousands_marker: "mil".to_string(),
        }
    }

    fn to_canonical_decimal(&self, text: &str) -> String {
        text.chars()
            .filter(|c| *c != self.thousands_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect()
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::pt_br()
    }
}

/// Parses a price such as `R$ 1.234,56` into `1234.56`.
pub fn parse_price(text: &str, format: &NumberFormat) -> Result<f64, ParseError> {
    let stripped: String = text.replace(&format.currency_symbol, "");
    let stripped: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Err(ParseError::Empty);
    }

    let canonical = format.to_canonical_decimal(&stripped);
    let price: f64 = canonical.parse().map_err(|_| ParseError::Malformed(text.to_string()))?;

    if !price.is_finite() || price < 0.0 {
        return Err(ParseError::OutOfRange(text.to_string()));
    }
    Ok(price)
}

/// Parses the leading number of a rating such as `4,5 de 5 estrelas`. Returns 0 when unknown.
pub fn parse_rating(text: &str, format: &NumberFormat) -> f32 {
    let Some(token) = text.split_whitespace().next() else {
        return 0.0;
    };

    let token = token.replace(format.decimal_separator, ".");
    match token.parse::<f32>() {
        Ok(stars) if stars.is_finite() => stars.clamp(0.0, 5.0),
        _ => 0.0,
    }
}

/// Parses a sold count such as `2 mil vendidos` into `2000`. Returns 0 when unknown.
pub fn parse_sold_count(text: &str, format: &NumberFormat) -> u64 {
    let marker = format.thousands_marker.as_str();
    let expanded = if !marker.is_empty() && text.contains(marker) {
        text.replace(&format!(" {}", marker), "000").replace(marker, "000")
    } else {
        text.to_string()
    };

    expanded.split_whitespace().next().and_then(|token| token.parse().ok()).unwrap_or(0)
}

/// Makes a site-relative link absolute and drops its query string.
pub fn canonicalize_link(link: &str, origin: &str) -> String {
    let absolute =
        if link.starts_with('/') { format!("{}{}", origin, link) } else { link.to_string() };

    match absolute.find('?') {
        Some(idx) => absolute[..idx].to_string(),
        None => absolute,
    }
}

//! Field extraction with ordered selector fallbacks.
//!
//! Candidates are listed most reliable first. The first selector producing a
//! non-empty value wins; an empty string means the field is absent.

use crate::scraping::engine::HtmlElement;
use scraper::Selector;

/// Returns the text of the first candidate that matches with non-empty text.
pub fn extract_text(element: &HtmlElement<'_>, candidates: &[Selector]) -> String {
    candidates
        .iter()
        .map(|selector| element.child_text(selector))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Returns `attr` from the first candidate that matches with a non-empty value.
pub fn extract_attr(element: &HtmlElement<'_>, candidates: &[Selector], attr: &str) -> String {
    candidates
        .iter()
        .map(|selector| element.child_attr(selector, attr))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

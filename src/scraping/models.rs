//! Data models for products, search requests and search outcomes.

use crate::scraping::error::ScrapeError;
use serde::{Deserialize, Serialize};

/// A product listing extracted from a search results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product name, trimmed
    pub name: String,
    /// Price in the site's currency
    pub price: f64,
    /// Star rating (0.0 - 5.0), 0 when unknown
    pub rating: f32,
    /// Units sold, 0 when unknown
    pub sold_count: u64,
    /// Absolute product URL without query string
    pub link: String,
    /// Display name of the source site
    pub site: String,
}

/// Inclusive price range a product must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    /// Creates bounds. Callers are expected to pass `min <= max`.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns true if the price lies within the bounds.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self { min: 0.0, max: f64::MAX }
    }
}

/// A single search query with its price range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub bounds: PriceBounds,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, min_price: f64, max_price: f64) -> Self {
        Self { query: query.into(), bounds: PriceBounds::new(min_price, max_price) }
    }
}

/// Result of a multi-page search.
///
/// Both fields may be populated at once: some pages succeeded and at least one
/// failed. Only the first page error is kept.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub products: Vec<Product>,
    pub error: Option<ScrapeError>,
}

impl SearchOutcome {
    /// Every page was fetched.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Some pages failed, but products were gathered from the others.
    pub fn is_partial(&self) -> bool {
        self.error.is_some() && !self.products.is_empty()
    }

    /// Pages failed and nothing was gathered.
    pub fn is_total_failure(&self) -> bool {
        self.error.is_some() && self.products.is_empty()
    }

    /// Returns the number of products.
    pub fn count(&self) -> usize {
        self.products.len()
    }

    /// Splits into products and the surfaced error.
    pub fn into_parts(self) -> (Vec<Product>, Option<ScrapeError>) {
        (self.products, self.error)
    }
}

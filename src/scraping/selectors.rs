//! Per-site scraper configuration and CSS selector candidate lists.
//!
//! Each field has an ordered list of selectors, most specific first. Update
//! the site presets when a site changes its HTML structure.

use crate::scraping::error::ScrapeError;
use crate::scraping::normalize::NumberFormat;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Selector candidate lists, one per extracted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Listing containers; every match of every entry is assembled
    pub containers: Vec<String>,
    pub name: Vec<String>,
    pub link: Vec<String>,
    pub price: Vec<String>,
    pub rating: Vec<String>,
    pub sold_count: Vec<String>,
}

impl SelectorConfig {
    /// Parses every selector, failing on the first invalid one.
    pub fn compile(&self) -> Result<CompiledSelectors, ScrapeError> {
        Ok(CompiledSelectors {
            containers: compile_all(&self.containers)?,
            name: compile_all(&self.name)?,
            link: compile_all(&self.link)?,
            price: compile_all(&self.price)?,
            rating: compile_all(&self.rating)?,
            sold_count: compile_all(&self.sold_count)?,
        })
    }
}

/// Parsed selector candidate lists.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub containers: Vec<Selector>,
    pub name: Vec<Selector>,
    pub link: Vec<Selector>,
    pub price: Vec<Selector>,
    pub rating: Vec<Selector>,
    pub sold_count: Vec<Selector>,
}

fn compile_all(list: &[String]) -> Result<Vec<Selector>, ScrapeError> {
    list.iter()
        .map(|css| {
            Selector::parse(css).map_err(|e| ScrapeError::Selector {
                selector: css.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Static configuration of one site scraper.
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    /// Display name stamped on every product
    pub site_name: String,
    /// Search URL prefix; the encoded query is appended
    pub base_url: String,
    /// Scheme and host prepended to site-relative links
    pub origin: String,
    /// Host pattern the rate limit applies to
    pub domain_glob: String,
    /// Upper bound of the random delay before each page request
    pub rate_limit: Duration,
    /// Number of result pages fetched per search
    pub page_count: u32,
    /// Maximum pages fetched concurrently
    pub concurrency: usize,
    pub selectors: SelectorConfig,
    pub number_format: NumberFormat,
}

impl ScraperConfig {
    /// Builds the URLs of the first `page_count` result pages for `query`.
    pub fn page_urls(&self, query: &str) -> Vec<String> {
        let encoded = urlencoding::encode(query.trim()).replace("%20", "+");
        let first = format!("{}{}", self.base_url, encoded);

        (1..=self.page_count)
            .map(|page| if page == 1 { first.clone() } else { format!("{}&page={}", first, page) })
            .collect()
    }
}

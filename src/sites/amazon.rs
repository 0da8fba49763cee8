//! Amazon Brazil search results.

use crate::config::Config;
use crate::scraping::{
    FetchEngine, NumberFormat, ScrapeError, Scraper, ScraperConfig, SearchOutcome, SelectorConfig,
    SiteScraper,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const SITE_NAME: &str = "Amazon";
pub const ORIGIN: &str = "https://www.amazon.com.br";

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Selector candidates for Amazon result cards, most reliable first.
pub fn selectors() -> SelectorConfig {
    SelectorConfig {
        containers: strings(&[
            "div[data-component-type='s-search-result']",
            "div.s-result-item:not([data-component-type='s-search-result'])",
        ]),
        name: strings(&["h2 a span", "h2 span", "a[href*='/dp/'] span"]),
        link: strings(&["h2 a", "a[href*='/dp/']"]),
        price: strings(&[
            "span.a-price span.a-offscreen",
            ".a-price .a-offscreen",
            "span.a-price-whole",
        ]),
        rating: strings(&[
            "i.a-icon-star-small span",
            "span[aria-label*='estrelas']",
            "i.a-icon-star span",
        ]),
        sold_count: strings(&["span[aria-label*='vendidos']", "span[aria-label*='comprados']"]),
    }
}

/// Scraper configuration for amazon.com.br, with limits taken from `config`.
pub fn scraper_config(config: &Config) -> ScraperConfig {
    ScraperConfig {
        site_name: SITE_NAME.to_string(),
        base_url: format!("{}/s?k=", ORIGIN),
        origin: ORIGIN.to_string(),
        domain_glob: "*amazon.com.br*".to_string(),
        rate_limit: Duration::from_millis(config.delay_ms),
        page_count: config.pages,
        concurrency: config.concurrency,
        selectors: selectors(),
        number_format: NumberFormat::pt_br(),
    }
}

/// Amazon Brazil scraper.
pub struct AmazonScraper {
    inner: SiteScraper,
}

impl AmazonScraper {
    pub fn new(config: &Config, engine: Arc<dyn FetchEngine>) -> Result<Self, ScrapeError> {
        Self::with_config(scraper_config(config), engine)
    }

    /// Creates the scraper from an explicit configuration (e.g. a different origin for testing).
    pub fn with_config(
        config: ScraperConfig,
        engine: Arc<dyn FetchEngine>,
    ) -> Result<Self, ScrapeError> {
        Ok(Self { inner: SiteScraper::new(config, engine)? })
    }
}

#[async_trait]
impl Scraper for AmazonScraper {
    async fn search(&self, product_name: &str, min_price: f64, max_price: f64) -> SearchOutcome {
        self.inner.search(product_name, min_price, max_price).await
    }

    fn site_name(&self) -> &str {
        self.inner.site_name()
    }
}

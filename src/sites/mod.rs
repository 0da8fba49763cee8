//! Site-specific scraper presets.

pub mod amazon;

use crate::config::Config;
use crate::scraping::{FetchEngine, ScrapeError, Scraper};
use std::sync::Arc;

pub use amazon::AmazonScraper;

/// Site ids accepted in `Config::sites`.
pub const SUPPORTED: &[&str] = &["amazon"];

/// Builds the scraper registered under `id`, or `None` for an unknown id.
pub fn build(
    id: &str,
    config: &Config,
    engine: Arc<dyn FetchEngine>,
) -> Option<Result<Arc<dyn Scraper>, ScrapeError>> {
    match id.to_lowercase().as_str() {
        "amazon" => Some(AmazonScraper::new(config, engine).map(|s| Arc::new(s) as Arc<dyn Scraper>)),
        _ => None,
    }
}

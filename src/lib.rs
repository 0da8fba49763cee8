//! shop-crawler - concurrent e-commerce search scraper
//!
//! Fetches the first few search result pages of a site in parallel, extracts
//! product listings with fallback selectors and keeps those within a price range.

pub mod commands;
pub mod config;
pub mod format;
pub mod scraping;
pub mod sites;

pub use config::Config;
pub use scraping::{PriceBounds, Product, ScrapeError, Scraper, SearchOutcome, SiteScraper};

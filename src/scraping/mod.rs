//! Fetch/extract pipeline: page fetching, field extraction, normalization and search orchestration.

pub mod assembler;
pub mod engine;
pub mod error;
pub mod extract;
pub mod http;
pub mod limit;
pub mod models;
pub mod normalize;
pub mod page;
pub mod search;
pub mod selectors;

pub use assembler::ProductAssembler;
pub use engine::{Collector, FetchEngine, HtmlElement};
pub use error::{FetchError, ParseError, ScrapeError};
pub use http::HttpEngine;
pub use limit::LimitRule;
pub use models::{PriceBounds, Product, SearchOutcome, SearchRequest};
pub use normalize::NumberFormat;
pub use page::PageScraper;
pub use search::{Scraper, SiteScraper};
pub use selectors::{CompiledSelectors, ScraperConfig, SelectorConfig};

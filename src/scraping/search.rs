//! Multi-page search: fans page scrapes out under a concurrency cap and merges them.

use crate::scraping::assembler::ProductAssembler;
use crate::scraping::engine::FetchEngine;
use crate::scraping::error::ScrapeError;
use crate::scraping::limit::LimitRule;
use crate::scraping::models::{Product, SearchOutcome, SearchRequest};
use crate::scraping::page::PageScraper;
use crate::scraping::selectors::ScraperConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Common capability of every site scraper.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Searches the site for `product_name`, keeping products priced in `[min_price, max_price]`.
    async fn search(&self, product_name: &str, min_price: f64, max_price: f64) -> SearchOutcome;

    /// Returns the display name of the site.
    fn site_name(&self) -> &str;
}

/// Searches one site by scraping its first few result pages in parallel.
pub struct SiteScraper {
    config: ScraperConfig,
    pages: PageScraper,
}

impl SiteScraper {
    /// Creates a scraper, compiling the configured selectors.
    pub fn new(config: ScraperConfig, engine: Arc<dyn FetchEngine>) -> Result<Self, ScrapeError> {
        let assembler = ProductAssembler::new(
            config.site_name.clone(),
            config.origin.clone(),
            config.selectors.compile()?,
            config.number_format.clone(),
        );
        let rule = LimitRule::new(config.domain_glob.clone(), config.rate_limit, 1);
        let pages = PageScraper::new(engine, assembler, rule);

        Ok(Self { config, pages })
    }

    /// Scrapes every result page for `request` and merges the products.
    ///
    /// Products arrive in page completion order. If any page fails, the
    /// outcome carries the first error alongside whatever the other pages
    /// produced.
    pub async fn search_pages(&self, request: &SearchRequest) -> SearchOutcome {
        let urls = self.config.page_urls(&request.query);
        info!("Searching {} for '{}' ({} pages)", self.config.site_name, request.query, urls.len());
        let bounds = request.bounds;

        let capacity = urls.len().max(1);
        let (results_tx, mut results_rx) = mpsc::channel::<Vec<Product>>(capacity);
        let (errors_tx, mut errors_rx) = mpsc::channel::<ScrapeError>(capacity);
        let admission = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for url in urls {
            let pages = self.pages.clone();
            let admission = Arc::clone(&admission);
            let results_tx = results_tx.clone();
            let errors_tx = errors_tx.clone();

            tasks.spawn(async move {
                let Ok(_permit) = admission.acquire_owned().await else {
                    return;
                };

                match pages.scrape_page(&url, bounds).await {
                    Ok(products) => {
                        debug!("Page {} returned {} products", url, products.len());
                        let _ = results_tx.send(products).await;
                    }
                    Err(e) => {
                        warn!("Page {} failed: {}", url, e);
                        let _ = errors_tx.send(e).await;
                    }
                }
            });
        }

        // Channels close once every task has dropped its senders.
        drop(results_tx);
        drop(errors_tx);

        let mut products = Vec::new();
        while let Some(page) = results_rx.recv().await {
            products.extend(page);
        }

        // A task that panicked reported nothing on either channel.
        let mut task_errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Page task failed: {}", e);
                task_errors.push(ScrapeError::Task(e.to_string()));
            }
        }

        let mut errors = std::iter::from_fn(|| errors_rx.try_recv().ok()).chain(task_errors);
        let error = errors.next();
        let dropped = errors.count();
        if dropped > 0 {
            debug!("{} additional page errors not surfaced", dropped);
        }

        info!(
            "Found {} products on {}{}",
            products.len(),
            self.config.site_name,
            if error.is_some() { " (partial)" } else { "" }
        );

        SearchOutcome { products, error }
    }
}

#[async_trait]
impl Scraper for SiteScraper {
    async fn search(&self, product_name: &str, min_price: f64, max_price: f64) -> SearchOutcome {
        self.search_pages(&SearchRequest::new(product_name, min_price, max_price)).await
    }

    fn site_name(&self) -> &str {
        &self.config.site_name
    }
}

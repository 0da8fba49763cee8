//! Search command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::scraping::{FetchEngine, HttpEngine, Product, Scraper};
use crate::sites;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Runs a search across every configured site.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, query: &str, min_price: f64, max_price: f64) -> Result<String> {
        let engine: Arc<dyn FetchEngine> =
            Arc::new(HttpEngine::new(&self.config).context("Failed to create HTTP client")?);
        let scrapers = self.build_scrapers(engine)?;

        self.execute_with_scrapers(scrapers, query, min_price, max_price).await
    }

    /// Builds the scrapers listed in `Config::sites`.
    pub fn build_scrapers(&self, engine: Arc<dyn FetchEngine>) -> Result<Vec<Arc<dyn Scraper>>> {
        self.config
            .sites
            .iter()
            .map(|id| {
                sites::build(id, &self.config, Arc::clone(&engine))
                    .with_context(|| {
                        format!("Unknown site: {}. Supported: {}", id, sites::SUPPORTED.join(", "))
                    })?
                    .with_context(|| format!("Failed to configure site: {}", id))
            })
            .collect()
    }

    /// Executes the search with the provided scrapers (for testing).
    pub async fn execute_with_scrapers(
        &self,
        scrapers: Vec<Arc<dyn Scraper>>,
        query: &str,
        min_price: f64,
        max_price: f64,
    ) -> Result<String> {
        let products = self.collect(scrapers, query, min_price, max_price).await?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_products(&products))
    }

    /// Searches every site concurrently and merges the products, cheapest first.
    ///
    /// Fails only when every site failed and nothing was found.
    pub async fn collect(
        &self,
        scrapers: Vec<Arc<dyn Scraper>>,
        query: &str,
        min_price: f64,
        max_price: f64,
    ) -> Result<Vec<Product>> {
        validate_range(min_price, max_price)?;
        info!("Searching {} site(s) for: {}", scrapers.len(), query);

        let mut tasks = JoinSet::new();
        for scraper in scrapers {
            let query = query.to_string();
            tasks.spawn(async move {
                let outcome = scraper.search(&query, min_price, max_price).await;
                (scraper.site_name().to_string(), outcome)
            });
        }

        let mut products = Vec::new();
        let mut first_error = None;
        let mut failed_sites = 0;
        let mut site_count = 0;

        while let Some(joined) = tasks.join_next().await {
            site_count += 1;
            let (site, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!("Site task failed: {}", e);
                    failed_sites += 1;
                    first_error.get_or_insert_with(|| anyhow::anyhow!("Site task failed: {}", e));
                    continue;
                }
            };

            let (found, error) = outcome.into_parts();
            debug!("{} returned {} products", site, found.len());

            if let Some(e) = error {
                if found.is_empty() {
                    warn!("{} search failed: {}", site, e);
                    failed_sites += 1;
                } else {
                    warn!("{} returned partial results: {}", site, e);
                }
                first_error.get_or_insert_with(|| {
                    anyhow::Error::new(e).context(format!("{} search failed", site))
                });
            }

            products.extend(found);
        }

        if site_count > 0 && failed_sites == site_count && products.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        products.sort_by(|a, b| a.price.total_cmp(&b.price));
        info!("Found {} products matching criteria", products.len());
        Ok(products)
    }
}

fn validate_range(min_price: f64, max_price: f64) -> Result<()> {
    if min_price.is_nan() || max_price.is_nan() || min_price < 0.0 {
        anyhow::bail!("Invalid price range: {} - {}", min_price, max_price);
    }
    if min_price > max_price {
        anyhow::bail!(
            "Minimum price ({:.2}) must not exceed maximum price ({:.2})",
            min_price,
            max_price
        );
    }
    Ok(())
}

//! Scraping of a single search results page.

use crate::scraping::assembler::ProductAssembler;
use crate::scraping::engine::{Collector, FetchEngine};
use crate::scraping::error::ScrapeError;
use crate::scraping::limit::LimitRule;
use crate::scraping::models::{PriceBounds, Product};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Fetches one page and assembles every listing on it. Cheap to clone.
#[derive(Clone)]
pub struct PageScraper {
    engine: Arc<dyn FetchEngine>,
    assembler: Arc<ProductAssembler>,
    rule: LimitRule,
}

impl PageScraper {
    pub fn new(engine: Arc<dyn FetchEngine>, assembler: ProductAssembler, rule: LimitRule) -> Self {
        Self { engine, assembler: Arc::new(assembler), rule }
    }

    /// Scrapes `url`, keeping products priced within `bounds`.
    ///
    /// A transport failure discards anything collected from the page.
    pub async fn scrape_page(
        &self,
        url: &str,
        bounds: PriceBounds,
    ) -> Result<Vec<Product>, ScrapeError> {
        let products: Arc<Mutex<Vec<Product>>> = Arc::new(Mutex::new(Vec::new()));

        let mut collector = Collector::new(Arc::clone(&self.engine));
        collector.limit(self.rule.clone());

        for container in &self.assembler.selectors().containers {
            let assembler = Arc::clone(&self.assembler);
            let products = Arc::clone(&products);
            collector.on_html(container.clone(), move |element| {
                if let Some(product) = assembler.assemble(element, bounds) {
                    products.lock().unwrap_or_else(PoisonError::into_inner).push(product);
                }
            });
        }

        collector.visit(url).await?;

        let collected = std::mem::take(&mut *products.lock().unwrap_or_else(PoisonError::into_inner));
        debug!("Collected {} products from {}", collected.len(), url);
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::error::FetchError;
    use crate::scraping::normalize::NumberFormat;
    use crate::scraping::selectors::SelectorConfig;
    use async_trait::async_trait;
    use std::time::Duration;

    struct PageEngine {
        body: Option<String>,
    }

    #[async_trait]
    impl FetchEngine for PageEngine {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.body.clone().ok_or_else(|| FetchError::Other("connection reset".to_string()))
        }
    }

    fn make_scraper(body: Option<&str>) -> PageScraper {
        let selectors = SelectorConfig {
            containers: vec!["div.card".to_string(), "li.legacy".to_string()],
            name: vec!["h2".to_string()],
            link: vec!["a".to_string()],
            price: vec![".price".to_string()],
            rating: vec![],
            sold_count: vec![],
        };
        let assembler = ProductAssembler::new(
            "Loja",
            "https://loja.test",
            selectors.compile().unwrap(),
            NumberFormat::pt_br(),
        );
        PageScraper::new(
            Arc::new(PageEngine { body: body.map(String::from) }),
            assembler,
            LimitRule::new("*loja.test*", Duration::ZERO, 1),
        )
    }

    const PAGE: &str = r#"
        <html><body>
            <div class="card"><h2>Mouse</h2><a href="/p/1">x</a><span class="price">R$ 50,00</span></div>
            <div class="card"><h2>Teclado</h2><a href="/p/2">x</a><span class="price">R$ 250,00</span></div>
            <div class="card"><h2>Brinde</h2><a href="/p/3">x</a><span class="price">grátis</span></div>
            <ul><li class="legacy"><h2>Monitor</h2><a href="/p/4">x</a><span class="price">R$ 900,00</span></li></ul>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_scrape_page_all_containers() {
        let scraper = make_scraper(Some(PAGE));
        let products =
            scraper.scrape_page("https://loja.test/s?k=x", PriceBounds::default()).await.unwrap();

        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mouse", "Teclado", "Monitor"]);
    }

    #[tokio::test]
    async fn test_scrape_page_filters_by_price() {
        let scraper = make_scraper(Some(PAGE));
        let products = scraper
            .scrape_page("https://loja.test/s?k=x", PriceBounds::new(100.0, 500.0))
            .await
            .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Teclado");
        assert_eq!(products[0].link, "https://loja.test/p/2");
    }

    #[tokio::test]
    async fn test_scrape_page_empty_document() {
        let scraper = make_scraper(Some("<html></html>"));
        let products =
            scraper.scrape_page("https://loja.test/s?k=x", PriceBounds::default()).await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_page_transport_failure() {
        let scraper = make_scraper(None);
        let err = scraper
            .scrape_page("https://loja.test/s?k=x", PriceBounds::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::Transport { .. }));
        assert!(err.to_string().contains("connection reset"));
    }
}

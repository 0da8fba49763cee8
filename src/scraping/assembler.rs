//! Turns one listing element into a validated product.

use crate::scraping::engine::HtmlElement;
use crate::scraping::extract::{extract_attr, extract_text};
use crate::scraping::models::{PriceBounds, Product};
use crate::scraping::normalize::{
    canonicalize_link, parse_price, parse_rating, parse_sold_count, NumberFormat,
};
use crate::scraping::selectors::CompiledSelectors;
use tracing::trace;

/// Builds products from listing elements of a single site.
#[derive(Debug, Clone)]
pub struct ProductAssembler {
    site: String,
    origin: String,
    selectors: CompiledSelectors,
    number_format: NumberFormat,
}

impl ProductAssembler {
    pub fn new(
        site: impl Into<String>,
        origin: impl Into<String>,
        selectors: CompiledSelectors,
        number_format: NumberFormat,
    ) -> Self {
        Self { site: site.into(), origin: origin.into(), selectors, number_format }
    }

    pub fn selectors(&self) -> &CompiledSelectors {
        &self.selectors
    }

    /// Returns the product in `element`, or `None` if it lacks a name, link or
    /// usable price, or if the price falls outside `bounds`.
    pub fn assemble(&self, element: &HtmlElement<'_>, bounds: PriceBounds) -> Option<Product> {
        let name = extract_text(element, &self.selectors.name);
        let link = extract_attr(element, &self.selectors.link, "href");
        let price_text = extract_text(element, &self.selectors.price);

        if name.is_empty() || link.is_empty() || price_text.is_empty() {
            trace!("Skipping listing without name, link or price");
            return None;
        }

        let link = canonicalize_link(&link, &self.origin);

        let price = match parse_price(&price_text, &self.number_format) {
            Ok(price) if bounds.contains(price) => price,
            Ok(price) => {
                trace!("Skipping {}: price {} outside range", link, price);
                return None;
            }
            Err(e) => {
                trace!("Skipping {}: {}", link, e);
                return None;
            }
        };

        let rating = parse_rating(
            &extract_text(element, &self.selectors.rating),
            &self.number_format,
        );
        let sold_count = parse_sold_count(
            &extract_text(element, &self.selectors.sold_count),
            &self.number_format,
        );

        Some(Product {
            name: name.trim().to_string(),
            price,
            rating,
            sold_count,
            link,
            site: self.site.clone(),
        })
    }
}

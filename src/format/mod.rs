//! Output formatting for products (table, JSON, CSV).

use crate::config::OutputFormat;
use crate::scraping::Product;

const NAME_WIDTH: usize = 50;

/// Formats products for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats multiple products.
    pub fn format_products(&self, products: &[Product]) -> String {
        if products.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::csv_header(),
                OutputFormat::Table => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_products(products),
            OutputFormat::Table => self.table_products(products),
            OutputFormat::Csv => self.csv_products(products),
        }
    }

    fn json_products(&self, products: &[Product]) -> String {
        serde_json::to_string_pretty(products).unwrap_or_else(|_| "[]".to_string())
    }

    fn table_products(&self, products: &[Product]) -> String {
        let site_width = 10;
        let price_width = 12;
        let rating_width = 6;
        let sold_width = 8;
        let name_width = NAME_WIDTH;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<site_width$}  {:<price_width$}  {:<rating_width$}  {:<sold_width$}  {}",
            "Site", "Price", "Rating", "Sold", "Name"
        ));
        lines.push(format!(
            "{:-<site_width$}  {:-<price_width$}  {:-<rating_width$}  {:-<sold_width$}  {:-<name_width$}",
            "", "", "", "", ""
        ));

        for product in products {
            let rating = if product.rating > 0.0 {
                format!("{:.1}", product.rating)
            } else {
                "-".to_string()
            };
            let sold = if product.sold_count > 0 {
                product.sold_count.to_string()
            } else {
                "-".to_string()
            };

            lines.push(format!(
                "{:<site_width$}  {:>price_width$.2}  {:>rating_width$}  {:>sold_width$}  {}",
                product.site,
                product.price,
                rating,
                sold,
                truncate(&product.name, name_width)
            ));
            lines.push(format!("{:site_width$}  {}", "", product.link));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", products.len()));

        lines.join("\n")
    }

    fn csv_header() -> String {
        "site,name,price,rating,sold_count,link".to_string()
    }

    fn csv_products(&self, products: &[Product]) -> String {
        let mut lines = vec![Self::csv_header()];

        for product in products {
            lines.push(format!(
                "{},{},{:.2},{},{},{}",
                csv_escape(&product.site),
                csv_escape(&product.name),
                product.price,
                product.rating,
                product.sold_count,
                csv_escape(&product.link)
            ));
        }

        lines.join("\n")
    }
}

/// Shortens `s` to at most `width` characters, marking the cut with `...`.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

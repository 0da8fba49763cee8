//! shop-crawler - concurrent e-commerce search scraper

use anyhow::Result;
use clap::{Parser, Subcommand};
use shop_crawler::commands::SearchCommand;
use shop_crawler::config::{Config, OutputFormat};
use shop_crawler::sites;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shop-crawler",
    version,
    about = "Search e-commerce sites for products within a price range"
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "SHOP_PROXY")]
    proxy: Option<String>,

    /// Upper bound of the random delay between requests in milliseconds
    #[arg(long, global = true)]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for products
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Minimum price
        #[arg(long, default_value = "0")]
        min_price: f64,

        /// Maximum price
        #[arg(long, default_value_t = f64::MAX)]
        max_price: f64,

        /// Result pages fetched per site
        #[arg(short, long)]
        pages: Option<u32>,

        /// Sites to search (comma-separated)
        #[arg(long, value_delimiter = ',')]
        sites: Option<Vec<String>>,
    },

    /// List supported sites
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Search { query, min_price, max_price, pages, sites } => {
            if let Some(pages) = pages {
                config.pages = pages;
            }
            if let Some(sites) = sites {
                config.sites = sites;
            }

            let cmd = SearchCommand::new(config);
            let output = cmd.execute(&query, min_price, max_price).await?;
            println!("{}", output);
        }

        Commands::Sites => {
            println!("Supported sites:\n");
            for site in sites::SUPPORTED {
                println!("  {}", site);
            }
        }
    }

    Ok(())
}

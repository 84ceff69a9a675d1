//! trendyol-crawler - Headless-browser product extractor for Trendyol
//!
//! Scrapes a single product page and prints a normalized record.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{warn, Level};
use tracing_subscriber::EnvFilter;
use trendyol_crawler::commands::ProductCommand;
use trendyol_crawler::config::{Config, OutputFormat};
use trendyol_crawler::trendyol::{CancelSignal, Country};

#[derive(Parser)]
#[command(
    name = "trendyol-crawler",
    version,
    about = "Headless-browser product extractor for Trendyol",
    long_about = "Drives Chromium through Trendyol's consent and country prompts and prints the product data embedded in the page."
)]
struct Cli {
    /// Storefront country (ae, sa)
    #[arg(long, global = true)]
    country: Option<Country>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Attempts per product, each in a fresh browser
    #[arg(long, global = true)]
    attempts: Option<u32>,

    /// Show the browser window
    #[arg(long, global = true)]
    headful: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a product by URL or SKU id
    #[command(alias = "p")]
    Product {
        /// Product URL or SKU id
        input: String,

        /// Read a saved product page instead of launching a browser
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,
    },

    /// List supported countries
    Countries,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(country) = cli.country {
        config.country = country;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(attempts) = cli.attempts {
        config.max_attempts = attempts;
    }
    if cli.headful {
        config.headless = false;
    }

    match cli.command {
        Commands::Product { input, html } => {
            let cmd = ProductCommand::new(config);

            let output = match html {
                Some(path) => cmd.execute_html(&path)?,
                None => {
                    let (handle, signal) = CancelSignal::pair();
                    tokio::spawn(async move {
                        if tokio::signal::ctrl_c().await.is_ok() {
                            warn!("Interrupted, closing browser");
                            handle.cancel();
                        }
                    });
                    cmd.with_cancel(signal).execute(&input).await?
                }
            };

            println!("{}", output);
        }

        Commands::Countries => {
            println!("Supported countries:\n");
            println!("{:<6} {:<24}", "Code", "Name");
            println!("{:-<6} {:-<24}", "", "");

            for country in Country::all() {
                println!("{:<6} {:<24}", country.code(), country.display_name());
            }
        }
    }

    Ok(())
}

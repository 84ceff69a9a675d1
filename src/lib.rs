//! trendyol-crawler - Headless-browser product extractor for Trendyol
//!
//! Drives Chromium through the storefront's consent and country prompts,
//! reads the product state embedded in the page and normalizes it into a
//! flat record.

pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod trendyol;

pub use config::Config;
pub use error::ScrapeError;
pub use trendyol::{Country, ProductOutput, ProductScraper};

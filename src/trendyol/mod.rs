//! Trendyol product page scraping.

pub mod chromium;
pub mod countries;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod payload;
pub mod scraper;
pub mod selectors;
pub mod sequence;
pub mod session;

pub use chromium::ChromiumLauncher;
pub use countries::Country;
pub use extract::{extract_from_html, extract_raw_payload};
pub use models::{Field, ProductOutput, VariantRecord, Variants};
pub use normalize::normalize;
pub use scraper::ProductScraper;
pub use session::{CancelHandle, CancelSignal, LaunchOptions, PageSession, SessionLauncher};

//! CSS selectors for Trendyol product pages.
//!
//! Every selector the crawler depends on lives here. Update this file when
//! Trendyol changes its markup.
//!
//! **Update process**: when a scrape fails, save the page HTML, fix the
//! selector and add the page under `tests/fixtures/`.

use scraper::Selector;
use std::sync::LazyLock;

/// OneTrust "Reject All" button on the cookie consent banner.
pub const CONSENT_REJECT: &str = r#"button[id="onetrust-reject-all-handler"]"#;

/// Country `<select>` in the geo prompt.
pub const COUNTRY_SELECT: &str = r#"select[id="country-select"]"#;

/// Confirm button of the geo prompt (desktop layout).
pub const COUNTRY_CONFIRM: &str = r#"button[data-testid="country-select-btn-desktop"]"#;

/// Inline script carrying the product state assignment.
pub const PRODUCT_SCRIPT: &str = r#"div[fragment-partial="flash-sales-banner"] script"#;

/// [`PRODUCT_SCRIPT`] compiled for offline HTML snapshots.
pub static PRODUCT_SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(PRODUCT_SCRIPT).unwrap());

//! Product scrape command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::trendyol::extract::extract_from_html;
use crate::trendyol::normalize::normalize;
use crate::trendyol::session::{CancelSignal, SessionLauncher};
use crate::trendyol::{ChromiumLauncher, ProductScraper};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Product page used when only a SKU id is given. The slug is ignored by the
/// storefront; the `-p-<sku>` suffix selects the product.
const SKU_URL_PREFIX: &str = "https://www.trendyol.com/en/ispartalilar/9999-full-orthopedic-black-white-high-sole-women-s-sports-shoes-water-resistant-p-";

/// Executes a product scrape by URL or SKU id.
pub struct ProductCommand {
    config: Config,
    cancel: CancelSignal,
}

impl ProductCommand {
    /// Creates a new product command.
    pub fn new(config: Config) -> Self {
        Self { config, cancel: CancelSignal::never() }
    }

    /// Aborts the scrape when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Scrapes a product in Chromium and returns formatted output.
    pub async fn execute(&self, input: &str) -> Result<String> {
        self.execute_with_launcher(ChromiumLauncher::new(), input).await
    }

    /// Scrapes a product with a provided launcher (for testing).
    pub async fn execute_with_launcher(
        &self,
        launcher: impl SessionLauncher,
        input: &str,
    ) -> Result<String> {
        let url = product_url(input)?;
        let country = self.config.country;

        info!("Scraping {} for {}", url, country.display_name());

        let scraper =
            ProductScraper::new(launcher, &self.config).with_cancel(self.cancel.clone());
        let product = scraper
            .scrape_product(&url, country)
            .await
            .with_context(|| format!("Failed to scrape {}", url))?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_product(&product))
    }

    /// Normalizes a saved product page without launching a browser.
    pub fn execute_html(&self, path: &Path) -> Result<String> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;

        let payload = extract_from_html(&html)
            .with_context(|| format!("Failed to extract product data from {}", path.display()))?;
        let product = normalize(&payload);

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_product(&product))
    }
}

/// Turns a SKU id into a product URL; full URLs pass through.
pub fn product_url(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        anyhow::bail!("Empty product reference. Pass a Trendyol product URL or SKU id.");
    }

    if input.contains("trendyol.com") {
        return Ok(input.to_string());
    }

    if input.contains(char::is_whitespace) {
        anyhow::bail!("Invalid SKU: '{}'. SKU ids contain no whitespace.", input);
    }

    Ok(format!("{}{}", SKU_URL_PREFIX, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::ScrapeError;
    use crate::trendyol::session::mock::{Call, MockLauncher, PageScript};
    use crate::trendyol::Country;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCRIPT: &str = r#"window["__PROPS__"] = {"product":{"englishTranslation":{"productName":"Sports Shoes","brandName":"Ispartalilar","webBrandCategoryGenders":{"categories":[{"name":"Shoes"},{"name":"Women"}]}},"ratingScore":{"averageRating":4.25,"totalCount":8}}};window.TYPE = "PDP";"#;

    fn make_test_config() -> Config {
        let mut config = Config::default();
        config.timeouts.settle_ms = 0;
        config
    }

    #[test]
    fn test_product_url_from_sku() {
        let url = product_url(" 123456789 ").unwrap();
        assert!(url.starts_with("https://www.trendyol.com/en/"));
        assert!(url.ends_with("-p-123456789"));
    }

    #[test]
    fn test_product_url_passthrough() {
        let url = "https://www.trendyol.com/en/brand/item-p-42?boutiqueId=1";
        assert_eq!(product_url(url).unwrap(), url);
    }

    #[test]
    fn test_product_url_invalid() {
        assert!(product_url("").unwrap_err().to_string().contains("Empty product reference"));
        assert!(product_url("red shoes").unwrap_err().to_string().contains("Invalid SKU"));
    }

    #[tokio::test]
    async fn test_product_command_json() {
        let launcher = MockLauncher::new(vec![PageScript::with_script(SCRIPT)]);
        let cmd = ProductCommand::new(make_test_config());

        let output = cmd.execute_with_launcher(launcher, "42").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["product_title"], "Sports Shoes");
        assert_eq!(value["category_path"], "Women/Shoes");
        assert_eq!(value["rating"], 4.2);
        assert_eq!(value["review"], 8);
        assert_eq!(value["price"], "-");
    }

    #[tokio::test]
    async fn test_product_command_uses_configured_country() {
        let mut script = PageScript::with_script(SCRIPT);
        script.present.push(crate::trendyol::selectors::COUNTRY_SELECT);
        let launcher = MockLauncher::new(vec![script]);
        let journal = std::sync::Arc::clone(&launcher.journal);

        let mut config = make_test_config();
        config.country = Country::Sa;
        ProductCommand::new(config).execute_with_launcher(launcher, "42").await.unwrap();

        let calls = journal.lock().unwrap().calls.clone();
        assert!(calls.iter().any(|c| matches!(c, Call::Select(_, label) if label == "Saudi Arabia")));
        assert!(calls.iter().any(|c| matches!(c, Call::Goto(url) if url.ends_with("-p-42"))));
    }

    #[tokio::test]
    async fn test_product_command_markdown() {
        let launcher = MockLauncher::new(vec![PageScript::with_script(SCRIPT)]);
        let mut config = make_test_config();
        config.format = OutputFormat::Markdown;

        let output =
            ProductCommand::new(config).execute_with_launcher(launcher, "42").await.unwrap();
        assert!(output.contains("## Sports Shoes"));
        assert!(output.contains("- **Brand:** Ispartalilar"));
    }

    #[tokio::test]
    async fn test_product_command_failure() {
        let launcher = MockLauncher::new(vec![PageScript::without_data()]);
        let cmd = ProductCommand::new(make_test_config());

        let err = cmd.execute_with_launcher(launcher, "42").await.unwrap_err();
        assert!(err.to_string().contains("Failed to scrape"));

        let scrape_err = err.downcast_ref::<ScrapeError>().unwrap();
        assert!(matches!(scrape_err.root_cause(), ScrapeError::DataNotReady { .. }));
    }

    #[tokio::test]
    async fn test_product_command_invalid_input_launches_nothing() {
        let launcher = MockLauncher::new(vec![PageScript::with_script(SCRIPT)]);
        let journal = std::sync::Arc::clone(&launcher.journal);

        let result =
            ProductCommand::new(make_test_config()).execute_with_launcher(launcher, "  ").await;
        assert!(result.is_err());
        assert_eq!(journal.lock().unwrap().launches, 0);
    }

    #[test]
    fn test_product_command_html_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"<html><body><div fragment-partial="flash-sales-banner"><script>{}</script></div></body></html>"#,
            SCRIPT
        )
        .unwrap();

        let output = ProductCommand::new(make_test_config()).execute_html(file.path()).unwrap();
        assert!(output.contains("\"product_title\": \"Sports Shoes\""));
    }

    #[test]
    fn test_product_command_html_missing_file() {
        let err = ProductCommand::new(make_test_config())
            .execute_html(Path::new("/nonexistent/page.html"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read HTML file"));
    }
}

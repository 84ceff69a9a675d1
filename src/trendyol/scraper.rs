//! Retrying product scraper.
//!
//! Each attempt owns exactly one browser session from launch to close. A
//! failed attempt is torn down completely before the next one launches a new
//! session, so nothing carries over between attempts.

use crate::config::{Config, Timeouts};
use crate::error::ScrapeError;
use crate::trendyol::countries::Country;
use crate::trendyol::extract::extract_raw_payload;
use crate::trendyol::models::ProductOutput;
use crate::trendyol::normalize::normalize;
use crate::trendyol::sequence::prepare_page;
use crate::trendyol::session::{CancelSignal, LaunchOptions, PageSession, SessionLauncher};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info, warn};

/// Scrapes single products through sessions obtained from `L`.
pub struct ProductScraper<L: SessionLauncher> {
    launcher: L,
    options: LaunchOptions,
    timeouts: Timeouts,
    max_attempts: u32,
    cancel: CancelSignal,
}

impl<L: SessionLauncher> ProductScraper<L> {
    /// Creates a scraper using the browser and retry settings from `config`.
    pub fn new(launcher: L, config: &Config) -> Self {
        Self {
            launcher,
            options: LaunchOptions::from_config(config),
            timeouts: config.timeouts.clone(),
            max_attempts: config.max_attempts,
            cancel: CancelSignal::never(),
        }
    }

    /// Observes `cancel` at every step of every attempt.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Number of attempts actually made; zero is treated as one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Scrapes the product at `url` for the `country` storefront.
    ///
    /// Fails with [`ScrapeError::RetryExhausted`] wrapping the last error once
    /// every attempt has failed, or [`ScrapeError::Cancelled`] as soon as
    /// cancellation is observed.
    pub async fn scrape_product(
        &self,
        url: &str,
        country: Country,
    ) -> Result<ProductOutput, ScrapeError> {
        let attempts = self.attempts();

        for attempt in 1..=attempts {
            if self.cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }

            info!("Attempt {}/{} for {} ({})", attempt, attempts, url, country);

            match self.attempt(url, country).await {
                Ok(output) => return Ok(output),
                Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
                Err(e) if attempt == attempts => {
                    error!("Got error while getting the data: {}", e);
                    return Err(ScrapeError::RetryExhausted { attempts, source: Box::new(e) });
                }
                Err(e) => warn!("Attempt {} failed: {}. Retrying with a new session", attempt, e),
            }
        }

        unreachable!("the final attempt always returns")
    }

    /// One full pass: launch, interact, extract, normalize, close.
    async fn attempt(&self, url: &str, country: Country) -> Result<ProductOutput, ScrapeError> {
        let session = self.launcher.launch(&self.options).await?;

        let outcome = AssertUnwindSafe(self.run(session.as_ref(), url, country))
            .catch_unwind()
            .await;

        debug!("Closing browser session");
        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn run(
        &self,
        page: &dyn PageSession,
        url: &str,
        country: Country,
    ) -> Result<ProductOutput, ScrapeError> {
        prepare_page(page, url, country, &self.timeouts, &self.cancel).await?;
        let payload = self.cancel.guard(extract_raw_payload(page)).await?;
        Ok(normalize(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trendyol::session::mock::{Call, MockLauncher, PageScript};

    const URL: &str = "https://www.trendyol.com/en/brand/item-p-123";
    const SCRIPT: &str = r#"window.__s = {"product":{"name":"Sneaker","ratingScore":{"averageRating":4.33}}};"#;

    fn make_test_config() -> Config {
        let mut config = Config::default();
        config.timeouts.settle_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let launcher = MockLauncher::new(vec![PageScript::with_script(SCRIPT)]);
        let scraper = ProductScraper::new(launcher, &make_test_config());

        let output = scraper.scrape_product(URL, Country::Ae).await.unwrap();
        assert_eq!(output.product_title, "Sneaker");
        assert_eq!(output.rating.as_f64(), Some(4.3));

        assert_eq!(scraper.launcher.launches(), 1);
        assert_eq!(scraper.launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_second_attempt() {
        let launcher = MockLauncher::new(vec![
            PageScript::without_data(),
            PageScript::with_script(SCRIPT),
        ]);
        let scraper = ProductScraper::new(launcher, &make_test_config());

        let output = scraper.scrape_product(URL, Country::Ae).await.unwrap();
        assert_eq!(output.product_title, "Sneaker");

        assert_eq!(scraper.launcher.launches(), 2);
        assert_eq!(scraper.launcher.closes(), 2);

        // The first session is closed before the second one navigates.
        let calls = scraper.launcher.journal.lock().unwrap().calls.clone();
        let first_close = calls.iter().position(|c| *c == Call::Close).unwrap();
        let second_goto = calls.iter().rposition(|c| matches!(c, Call::Goto(_))).unwrap();
        assert!(first_close < second_goto);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let launcher = MockLauncher::new(vec![PageScript::without_data()]);
        let scraper = ProductScraper::new(launcher, &make_test_config());

        let err = scraper.scrape_product(URL, Country::Ae).await.unwrap_err();

        match &err {
            ScrapeError::RetryExhausted { attempts, source } => {
                assert_eq!(*attempts, 2);
                assert!(matches!(**source, ScrapeError::DataNotReady { .. }));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
        assert_eq!(scraper.launcher.launches(), 2);
        assert_eq!(scraper.launcher.closes(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_wraps_last_error() {
        let launcher = MockLauncher::new(vec![
            PageScript::without_data(),
            PageScript::with_script("not an assignment"),
        ]);
        let scraper = ProductScraper::new(launcher, &make_test_config());

        let err = scraper.scrape_product(URL, Country::Ae).await.unwrap_err();
        assert!(matches!(err.root_cause(), ScrapeError::PayloadParse(_)));
    }

    #[tokio::test]
    async fn test_configured_attempts() {
        let mut config = make_test_config();
        config.max_attempts = 3;
        let launcher = MockLauncher::new(vec![PageScript::without_data()]);
        let scraper = ProductScraper::new(launcher, &config);

        let err = scraper.scrape_product(URL, Country::Ae).await.unwrap_err();
        assert!(matches!(err, ScrapeError::RetryExhausted { attempts: 3, .. }));
        assert_eq!(scraper.launcher.launches(), 3);
        assert_eq!(scraper.launcher.closes(), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_runs_once() {
        let mut config = make_test_config();
        config.max_attempts = 0;
        let launcher = MockLauncher::new(vec![PageScript::without_data()]);
        let scraper = ProductScraper::new(launcher, &config);

        assert_eq!(scraper.attempts(), 1);
        assert!(scraper.scrape_product(URL, Country::Ae).await.is_err());
        assert_eq!(scraper.launcher.launches(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (handle, signal) = CancelSignal::pair();
        handle.cancel();

        let launcher = MockLauncher::new(vec![PageScript::with_script(SCRIPT)]);
        let scraper = ProductScraper::new(launcher, &make_test_config()).with_cancel(signal);

        let err = scraper.scrape_product(URL, Country::Ae).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Cancelled));
        assert_eq!(scraper.launcher.launches(), 0);
    }

    #[tokio::test]
    async fn test_cancel_mid_attempt_closes_session_without_retry() {
        let (handle, signal) = CancelSignal::pair();
        let script = PageScript {
            hang_on: Some(crate::trendyol::selectors::CONSENT_REJECT),
            ..PageScript::with_script(SCRIPT)
        };
        let launcher = MockLauncher::new(vec![script]);
        let scraper = ProductScraper::new(launcher, &make_test_config()).with_cancel(signal);

        let (result, _) = tokio::join!(scraper.scrape_product(URL, Country::Ae), async {
            tokio::task::yield_now().await;
            handle.cancel();
        });

        assert!(matches!(result, Err(ScrapeError::Cancelled)));
        assert_eq!(scraper.launcher.launches(), 1);
        assert_eq!(scraper.launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_session_closed_on_panic() {
        let script = PageScript { panic_on_text: true, ..PageScript::with_script(SCRIPT) };
        let launcher = MockLauncher::new(vec![script]);
        let scraper = ProductScraper::new(launcher, &make_test_config());

        let outcome = AssertUnwindSafe(scraper.scrape_product(URL, Country::Ae))
            .catch_unwind()
            .await;

        assert!(outcome.is_err());
        assert_eq!(scraper.launcher.closes(), 1);
    }
}

//! Browser capability used by the scrape pipeline.
//!
//! The pipeline only needs a handful of page operations; [`SessionLauncher`]
//! and [`PageSession`] describe them so the orchestration can be exercised
//! without a real browser. The Chromium implementation lives in
//! [`crate::trendyol::chromium`].

use crate::config::Config;
use crate::error::ScrapeError;
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

/// Chromium flags that hide the most obvious automation fingerprints.
pub const FINGERPRINT_ARGS: &[&str] =
    &["--disable-blink-features=AutomationControlled", "--no-sandbox", "--disable-dev-shm-usage"];

/// Result of waiting for an element. A timeout is not an error at this level:
/// the caller decides whether a missing element is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Attached,
    TimedOut,
}

/// Settings for a newly launched session.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub user_agent: String,
    pub locale: String,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub args: Vec<String>,
}

impl LaunchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            locale: config.locale.clone(),
            headless: config.headless,
            chrome_path: config.chrome_path.clone(),
            args: FINGERPRINT_ARGS.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

/// Starts isolated browsing sessions.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Launches a fresh session with no state shared with earlier ones.
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn PageSession>, ScrapeError>;
}

/// A single page inside a launched session.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigates and waits until the document has been parsed (not until all
    /// resources have loaded). Fails with [`ScrapeError::NavigationTimeout`]
    /// when the budget runs out.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Waits until an element matching `selector` is attached to the DOM.
    async fn wait_for_attached(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<WaitOutcome, ScrapeError>;

    /// Clicks the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), ScrapeError>;

    /// Selects the option labelled `label` in the `<select>` matching `selector`.
    async fn select_option_by_label(&self, selector: &str, label: &str)
        -> Result<(), ScrapeError>;

    /// Text content of the first element matching `selector`, `None` if no
    /// element matches.
    async fn text_content(&self, selector: &str) -> Result<Option<String>, ScrapeError>;

    /// Closes the session and releases the browser.
    async fn close(self: Box<Self>) -> Result<(), ScrapeError>;
}

/// Triggers a [`CancelSignal`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cooperative cancellation observed at every suspension point of a scrape.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Creates a connected handle/signal pair.
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelSignal { rx })
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the handle
    /// is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Runs `fut` unless cancellation wins the race.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, ScrapeError>
    where
        F: Future<Output = Result<T, ScrapeError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ScrapeError::Cancelled),
            result = fut => result,
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}
